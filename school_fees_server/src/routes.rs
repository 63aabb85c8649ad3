//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions, which are executed
//! concurrently by worker threads and thus don't block execution.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use school_fees_engine::{
    db_types::PaymentRef,
    payment_objects::{ExamFeesPaymentRequest, SchoolFeesPaymentRequest, VerifyStatus, WebhookEvent},
    traits::{LedgerStore, PaymentGateway},
    ExamApi,
    PaymentFlowApi,
    PaymentFlowError,
};

use crate::{
    data_objects::{PopulateResult, VerifyResult, WebhookAck},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(initialize_school_fees => Post "/initialize" impl LedgerStore, PaymentGateway);
/// Route handler for school fees checkouts.
///
/// Validates the claimed amount against the fee schedule, creates the split with the gateway, and hands
/// back the checkout URL. The payment is recorded as Pending; nothing is settled until the gateway
/// confirms the charge.
pub async fn initialize_school_fees<B, G>(
    body: web::Json<SchoolFeesPaymentRequest>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    G: PaymentGateway,
{
    let req = body.into_inner();
    debug!("💻️ POST checkout for parent {} covering {} student(s)", req.parent_id, req.student_ids.len());
    let response = api.initiate_school_fees(req).await?;
    Ok(HttpResponse::Ok().json(response))
}

route!(initialize_exam_fees => Post "/exams/initialize" impl LedgerStore, PaymentGateway);
/// Route handler for exam fees checkouts. Installment amounts are validated against each exam's
/// outstanding balance before a checkout session is created.
pub async fn initialize_exam_fees<B, G>(
    body: web::Json<ExamFeesPaymentRequest>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    G: PaymentGateway,
{
    let req = body.into_inner();
    debug!("💻️ POST exam checkout for student {} ({} exam(s))", req.student_id, req.exam_payments.len());
    let response = api.initiate_exam_fees(req).await?;
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Verify  ----------------------------------------------------
route!(verify_payment => Post "/verify/{reference}" impl LedgerStore, PaymentGateway);
/// Route handler for on-demand verification.
///
/// Asks the gateway for the authoritative transaction status and reconciles the ledger to it. If the
/// gateway is unreachable the locally recorded status is reported instead, so clients polling after a
/// checkout always get an answer.
pub async fn verify_payment<B, G>(
    path: web::Path<String>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    G: PaymentGateway,
{
    let reference = PaymentRef::from(path.into_inner());
    debug!("💻️ POST verify [{reference}]");
    let status = api.verify(&reference).await?;
    Ok(HttpResponse::Ok().json(VerifyResult { status: status.to_string(), reference: reference.to_string() }))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(paystack_webhook => Post "/webhook" impl LedgerStore, PaymentGateway);
/// Route handler for gateway webhook deliveries. The HMAC middleware has already verified the
/// `x-paystack-signature` header against the raw body by the time this handler runs.
///
/// Webhook responses must always be in the 200 range, otherwise the gateway will keep retrying: events
/// the server cannot act on are acknowledged with a "failed" status rather than an error.
pub async fn paystack_webhook<B, G>(
    body: web::Json<WebhookEvent>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> HttpResponse
where
    B: LedgerStore,
    G: PaymentGateway,
{
    let event = body.into_inner();
    trace!("💻️ Received webhook event \"{}\" for [{}]", event.event, event.data.reference);
    let ack = match api.handle_webhook(event).await {
        Ok(VerifyStatus::Completed) => WebhookAck::processed(),
        Ok(_) => WebhookAck::ignored(),
        Err(PaymentFlowError::Conflict(msg)) => {
            warn!("💻️ Webhook conflicts with local state. {msg}");
            WebhookAck::ignored()
        },
        Err(e) => {
            warn!("💻️ Could not process webhook. {e}");
            WebhookAck::ignored()
        },
    };
    HttpResponse::Ok().json(ack)
}

//----------------------------------------------   Exams  ----------------------------------------------------
route!(populate_exam_fees => Post "/{exam_id}/populate" impl LedgerStore);
/// Route handler for the exam enrolment population routine. Safe to re-run; students already enrolled
/// are skipped.
pub async fn populate_exam_fees<B>(
    path: web::Path<String>,
    api: web::Data<ExamApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
{
    let exam_id = path.into_inner();
    debug!("💻️ POST populate enrolments for exam {exam_id}");
    let created = api.populate_student_exam_fees(&exam_id).await?;
    Ok(HttpResponse::Ok().json(PopulateResult { exam_id, created }))
}
