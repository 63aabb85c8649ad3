use std::time::Duration;

use actix_web::{http::KeepAlive, middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use log::info;
use paystack_tools::PaystackApi;
use school_fees_engine::{ExamApi, PaymentFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    middleware::HmacMiddlewareFactory,
    routes::{
        health,
        InitializeExamFeesRoute,
        InitializeSchoolFeesRoute,
        PaystackWebhookRoute,
        PopulateExamFeesRoute,
        VerifyPaymentRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let gateway =
        PaystackApi::new(config.paystack.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Gateway client ready for {}", config.paystack.api_url);
    let srv = HttpServer::new(move || {
        let payments_api = PaymentFlowApi::new(db.clone(), gateway.clone(), config.flow.clone());
        let exams_api = ExamApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sfs::access_log"))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(exams_api));
        let payments_scope = web::scope("/payments")
            .service(InitializeSchoolFeesRoute::<SqliteDatabase, PaystackApi>::new())
            .service(InitializeExamFeesRoute::<SqliteDatabase, PaystackApi>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, PaystackApi>::new());
        // Webhook deliveries are signed over the raw body, so the signature check wraps the whole scope.
        let webhook_scope = web::scope("/paystack")
            .wrap(HmacMiddlewareFactory::new(
                "x-paystack-signature",
                config.paystack.secret_key.clone(),
                config.webhook_signature_checks,
            ))
            .service(PaystackWebhookRoute::<SqliteDatabase, PaystackApi>::new());
        let exams_scope = web::scope("/exams").service(PopulateExamFeesRoute::<SqliteDatabase>::new());
        app.service(health).service(payments_scope).service(webhook_scope).service(exams_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
