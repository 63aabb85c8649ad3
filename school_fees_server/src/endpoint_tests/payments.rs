use actix_web::{http::StatusCode, web, web::ServiceConfig};
use paystack_tools::{InitializeResponse, SplitResponse};
use school_fees_engine::{db_types::ExamFee, ExamApi, PaymentFlowApi};

use super::{
    helpers::{flow_config, post_request, test_parent, test_student, tuition_fee},
    mocks::{MockGateway, MockLedger},
};
use crate::routes::{InitializeSchoolFeesRoute, PopulateExamFeesRoute, VerifyPaymentRoute};

fn configure_payments(ledger: MockLedger, gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = PaymentFlowApi::new(ledger, gateway, flow_config());
        let scope = web::scope("/payments")
            .service(InitializeSchoolFeesRoute::<MockLedger, MockGateway>::new())
            .service(VerifyPaymentRoute::<MockLedger, MockGateway>::new());
        cfg.app_data(web::Data::new(api)).service(scope);
    }
}

fn configure_exams(ledger: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = ExamApi::new(ledger);
        let scope = web::scope("/exams").service(PopulateExamFeesRoute::<MockLedger>::new());
        cfg.app_data(web::Data::new(api)).service(scope);
    }
}

#[actix_web::test]
async fn initialize_returns_the_checkout_session() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_parent().returning(|_| Ok(Some(test_parent())));
    ledger.expect_fetch_fee_schedule().returning(|| Ok(vec![tuition_fee(350_000.0)]));
    ledger.expect_fetch_students().returning(|_| Ok(vec![test_student("s1")]));
    ledger.expect_insert_pending_payment().times(1).returning(|_, _| Ok(1));
    let mut gateway = MockGateway::new();
    gateway.expect_create_split().returning(|_| Ok(SplitResponse { split_code: "SPL_1".to_string() }));
    gateway.expect_initialize_transaction().returning(|_| {
        Ok(InitializeResponse {
            authorization_url: "https://checkout.test/ref-1".to_string(),
            access_code: "AC_1".to_string(),
            reference: "ref-1".to_string(),
        })
    });

    let body = r#"{"parent_id":"p1","student_ids":["s1"],"amount":350000}"#;
    let (status, body) = post_request("/payments/initialize", body, &[], configure_payments(ledger, gateway))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("https://checkout.test/ref-1"));
    assert!(body.contains("ref-1"));
}

#[actix_web::test]
async fn initialize_with_mismatched_amount_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_parent().returning(|_| Ok(Some(test_parent())));
    ledger.expect_fetch_fee_schedule().returning(|| Ok(vec![tuition_fee(350_000.0)]));
    ledger.expect_fetch_students().returning(|_| Ok(vec![test_student("s1")]));
    // The gateway must never be contacted and nothing may be persisted.
    let gateway = MockGateway::new();

    let body = r#"{"parent_id":"p1","student_ids":["s1"],"amount":123}"#;
    let (status, body) = post_request("/payments/initialize", body, &[], configure_payments(ledger, gateway))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Amount mismatch"));
}

#[actix_web::test]
async fn initialize_for_unknown_parent_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_parent().returning(|_| Ok(None));

    let body = r#"{"parent_id":"ghost","student_ids":["s1"],"amount":350000}"#;
    let (status, body) =
        post_request("/payments/initialize", body, &[], configure_payments(ledger, MockGateway::new()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Parent does not exist"));
}

#[actix_web::test]
async fn verifying_an_unknown_reference_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_payment_by_reference().returning(|_| Ok(None));
    ledger.expect_fetch_exam_payments_by_reference().returning(|_| Ok(vec![]));

    let (status, body) =
        post_request("/payments/verify/no-such-ref", "", &[], configure_payments(ledger, MockGateway::new()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No payment with reference no-such-ref"));
}

#[actix_web::test]
async fn populate_reports_the_number_of_enrolments_created() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_exam_fee().returning(|id| {
        Ok(Some(ExamFee {
            id: id.to_string(),
            exam_name: "IGCSE May 2026".to_string(),
            amount: 150_000.0,
            extra_fees: None,
            allows_installments: true,
            applicable_grades: vec!["Year 11".to_string()],
        }))
    });
    ledger.expect_populate_student_exam_fees().times(1).returning(|_| Ok(3));

    let (status, body) =
        post_request("/exams/e1/populate", "", &[], configure_exams(ledger)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"exam_id":"e1","created":3}"#);
}
