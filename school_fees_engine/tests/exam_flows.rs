//! Exam fee installments, overpayment protection, and enrolment population.

use school_fees_engine::{
    db_types::{PaymentRef, PaymentStatus},
    payment_objects::{ExamFeesPaymentRequest, ExamPaymentDetail, VerifyStatus, WebhookData, WebhookEvent},
    ExamApi,
    PaymentFlowApi,
    PaymentFlowError,
    SqliteDatabase,
    traits::FeeManagement,
};
use tokio::runtime::Runtime;

mod support;

use support::{flow_config, gateway_accepting, gateway_reporting, new_test_db, seed_school};

fn installment(amount: f64) -> ExamFeesPaymentRequest {
    ExamFeesPaymentRequest {
        parent_id: "p1".to_string(),
        student_id: "s1".to_string(),
        amount,
        exam_payments: vec![ExamPaymentDetail { exam_id: "e1".to_string(), amount_paid: amount }],
    }
}

async fn confirm(db: &SqliteDatabase, reference: &str) {
    let api = PaymentFlowApi::new(db.clone(), gateway_reporting("success", None), flow_config());
    let event = WebhookEvent {
        event: "charge.success".to_string(),
        data: WebhookData { reference: reference.to_string(), metadata: None },
    };
    assert_eq!(api.handle_webhook(event).await.unwrap(), VerifyStatus::Completed);
}

#[test]
fn installments_accumulate_until_the_fee_is_settled() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let db = new_test_db().await;
        seed_school(&db).await;

        // First half.
        let api = PaymentFlowApi::new(db.clone(), gateway_accepting("exam-001"), flow_config());
        api.initiate_exam_fees(installment(75_000.0)).await.unwrap();
        confirm(&db, "exam-001").await;

        let enrolment = db.fetch_student_exam_fee("s1", "e1").await.unwrap().unwrap();
        let status = db.exam_fee_status(&enrolment.id).await.unwrap();
        assert_eq!(status.total_paid, 75_000.0);
        assert_eq!(status.amount_due, 150_000.0);
        assert!(!status.is_fully_paid);
        assert!(!enrolment.paid);

        // Second half settles the fee.
        let api = PaymentFlowApi::new(db.clone(), gateway_accepting("exam-002"), flow_config());
        api.initiate_exam_fees(installment(75_000.0)).await.unwrap();
        confirm(&db, "exam-002").await;

        let enrolment = db.fetch_student_exam_fee("s1", "e1").await.unwrap().unwrap();
        let status = db.exam_fee_status(&enrolment.id).await.unwrap();
        assert_eq!(status.total_paid, 150_000.0);
        assert!(status.is_fully_paid);
        assert!(enrolment.paid);
        assert_eq!(enrolment.payment_reference.as_deref(), Some("exam-002"));
    });
}

#[test]
fn full_payment_settles_in_one_step() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let db = new_test_db().await;
        seed_school(&db).await;
        let api = PaymentFlowApi::new(db.clone(), gateway_accepting("exam-010"), flow_config());
        api.initiate_exam_fees(installment(150_000.0)).await.unwrap();
        confirm(&db, "exam-010").await;

        let enrolment = db.fetch_student_exam_fee("s1", "e1").await.unwrap().unwrap();
        assert!(enrolment.paid);
    });
}

#[test]
fn claimed_total_must_match_the_installment_sum() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let db = new_test_db().await;
        seed_school(&db).await;
        let api = PaymentFlowApi::new(db.clone(), gateway_accepting("exam-020"), flow_config());

        let mut req = installment(75_000.0);
        req.amount = 80_000.0;
        let err = api.initiate_exam_fees(req).await.unwrap_err();
        assert!(matches!(err, PaymentFlowError::InvalidAmount { .. }));
        let rows = db.fetch_exam_payments_by_reference(&PaymentRef::from("exam-020".to_string())).await.unwrap();
        assert!(rows.is_empty());
    });
}

#[test]
fn payments_beyond_the_outstanding_balance_are_rejected() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let db = new_test_db().await;
        seed_school(&db).await;

        let api = PaymentFlowApi::new(db.clone(), gateway_accepting("exam-030"), flow_config());
        api.initiate_exam_fees(installment(100_000.0)).await.unwrap();
        confirm(&db, "exam-030").await;

        // Only ₦50k remains due.
        let api = PaymentFlowApi::new(db.clone(), gateway_accepting("exam-031"), flow_config());
        let err = api.initiate_exam_fees(installment(60_000.0)).await.unwrap_err();
        match err {
            PaymentFlowError::ExcessExamPayment { exam_id, remaining_due, got } => {
                assert_eq!(exam_id, "e1");
                assert_eq!(remaining_due, 50_000.0);
                assert_eq!(got, 60_000.0);
            },
            other => panic!("Expected ExcessExamPayment, got {other}"),
        }
    });
}

#[test]
fn abandoned_exam_checkouts_are_marked_failed() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let db = new_test_db().await;
        seed_school(&db).await;
        let api = PaymentFlowApi::new(db.clone(), gateway_accepting("exam-050"), flow_config());
        api.initiate_exam_fees(installment(75_000.0)).await.unwrap();

        let api = PaymentFlowApi::new(db.clone(), gateway_reporting("abandoned", None), flow_config());
        let reference = PaymentRef::from("exam-050".to_string());
        assert_eq!(api.verify(&reference).await.unwrap(), VerifyStatus::Failed);

        // The failure is durable: a fresh read sees the terminal status and nothing counts as paid.
        let rows = db.fetch_exam_payments_by_reference(&reference).await.unwrap();
        assert!(rows.iter().all(|r| r.status == PaymentStatus::Failed));
        let enrolment = db.fetch_student_exam_fee("s1", "e1").await.unwrap().unwrap();
        let status = db.exam_fee_status(&enrolment.id).await.unwrap();
        assert_eq!(status.total_paid, 0.0);
    });
}

#[test]
fn unknown_exams_are_rejected() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let db = new_test_db().await;
        seed_school(&db).await;
        let api = PaymentFlowApi::new(db, gateway_accepting("exam-040"), flow_config());

        let mut req = installment(10_000.0);
        req.exam_payments[0].exam_id = "no-such-exam".to_string();
        let err = api.initiate_exam_fees(req).await.unwrap_err();
        assert!(matches!(err, PaymentFlowError::ExamFeeNotFound(_)));
    });
}

#[test]
fn populate_enrols_eligible_students_exactly_once() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let db = new_test_db().await;
        seed_school(&db).await;
        let api = ExamApi::new(db.clone());

        // Only s1 is in Year 11.
        let created = api.populate_student_exam_fees("e1").await.unwrap();
        assert_eq!(created, 1);
        let enrolment = db.fetch_student_exam_fee("s1", "e1").await.unwrap().unwrap();
        assert_eq!(enrolment.amount, 150_000.0);
        assert!(db.fetch_student_exam_fee("s2", "e1").await.unwrap().is_none());

        // Rerunning creates nothing new.
        let created = api.populate_student_exam_fees("e1").await.unwrap();
        assert_eq!(created, 0);

        let err = api.populate_student_exam_fees("no-such-exam").await.unwrap_err();
        assert!(matches!(err, PaymentFlowError::ExamFeeNotFound(_)));
    });
}
