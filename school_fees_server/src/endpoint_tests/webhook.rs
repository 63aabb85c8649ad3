use actix_web::{http::StatusCode, web, web::ServiceConfig};
use paystack_tools::{VerifyData, VerifyResponse};
use school_fees_engine::{traits::ConfirmationOutcome, PaymentFlowApi};
use sfp_common::Secret;

use super::{
    helpers::{flow_config, pending_payment, post_request, WEBHOOK_SECRET},
    mocks::{MockGateway, MockLedger},
};
use crate::{
    helpers::calculate_hmac,
    middleware::HmacMiddlewareFactory,
    routes::PaystackWebhookRoute,
};

const CHARGE_SUCCESS: &str = r#"{"event":"charge.success","data":{"reference":"ref-1"}}"#;

fn configure(
    ledger: MockLedger,
    gateway: MockGateway,
    signature_checks: bool,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = PaymentFlowApi::new(ledger, gateway, flow_config());
        let scope = web::scope("/paystack")
            .wrap(HmacMiddlewareFactory::new(
                "x-paystack-signature",
                Secret::new(WEBHOOK_SECRET.to_string()),
                signature_checks,
            ))
            .service(PaystackWebhookRoute::<MockLedger, MockGateway>::new());
        cfg.app_data(web::Data::new(api)).service(scope);
    }
}

#[actix_web::test]
async fn webhook_without_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    // No expectations: the ledger mock panics if any call reaches it.
    let err = post_request("/paystack/webhook", CHARGE_SUCCESS, &[], configure(MockLedger::new(), MockGateway::new(), true))
        .await
        .expect_err("Expected the middleware to reject the request");
    assert_eq!(err, "No HMAC signature found.");
}

#[actix_web::test]
async fn webhook_with_bad_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let bad_sig = calculate_hmac("wrong-secret", CHARGE_SUCCESS.as_bytes());
    let headers = [("x-paystack-signature", bad_sig.as_str())];
    let err = post_request(
        "/paystack/webhook",
        CHARGE_SUCCESS,
        &headers,
        configure(MockLedger::new(), MockGateway::new(), true),
    )
    .await
    .expect_err("Expected the middleware to reject the request");
    assert_eq!(err, "Invalid HMAC signature.");
}

#[actix_web::test]
async fn signed_charge_success_is_verified_and_confirmed() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_payment_by_reference().returning(|r| Ok(Some(pending_payment(r.as_str()))));
    ledger
        .expect_confirm_school_fees_payment()
        .times(1)
        .returning(|_, _| Ok(ConfirmationOutcome::Confirmed(Default::default())));
    let mut gateway = MockGateway::new();
    gateway.expect_verify_transaction().times(1).returning(|_| {
        Ok(VerifyResponse {
            status: true,
            message: "Verification successful".to_string(),
            data: VerifyData { status: "success".to_string(), metadata: None },
        })
    });
    let sig = calculate_hmac(WEBHOOK_SECRET, CHARGE_SUCCESS.as_bytes());
    let headers = [("x-paystack-signature", sig.as_str())];
    let (status, body) =
        post_request("/paystack/webhook", CHARGE_SUCCESS, &headers, configure(ledger, gateway, true))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"success"}"#);
}

#[actix_web::test]
async fn other_events_are_acknowledged_but_not_processed() {
    let _ = env_logger::try_init().ok();
    let event = r#"{"event":"charge.dispute.create","data":{"reference":"ref-1"}}"#;
    let sig = calculate_hmac(WEBHOOK_SECRET, event.as_bytes());
    let headers = [("x-paystack-signature", sig.as_str())];
    // No ledger or gateway expectations: nothing may be touched for an unhandled event.
    let (status, body) =
        post_request("/paystack/webhook", event, &headers, configure(MockLedger::new(), MockGateway::new(), true))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"failed"}"#);
}

#[actix_web::test]
async fn signature_checks_can_be_disabled_for_test_environments() {
    let _ = env_logger::try_init().ok();
    let event = r#"{"event":"charge.dispute.create","data":{"reference":"ref-1"}}"#;
    let (status, body) =
        post_request("/paystack/webhook", event, &[], configure(MockLedger::new(), MockGateway::new(), false))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"failed"}"#);
}
