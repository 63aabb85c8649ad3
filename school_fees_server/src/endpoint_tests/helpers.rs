use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Utc;
use school_fees_engine::{
    db_types::{Fee, Parent, Payment, PaymentRef, PaymentStatus, Student},
    helpers::{CallbackConfig, FlowConfig, SubaccountConfig},
};

pub const WEBHOOK_SECRET: &str = "sk_test_hooks";

pub fn flow_config() -> FlowConfig {
    FlowConfig {
        accounts: SubaccountConfig {
            tuition_account: Some("ACCT_tuition".to_string()),
            club_account: Some("ACCT_clubs".to_string()),
            exam_account: Some("ACCT_exams".to_string()),
            sat_account: Some("ACCT_sat".to_string()),
        },
        callbacks: CallbackConfig {
            school_fees_url: Some("https://school.test/fees/callback".to_string()),
            exam_fees_url: Some("https://school.test/exams/callback".to_string()),
        },
    }
}

pub fn test_parent() -> Parent {
    Parent {
        id: "p1".to_string(),
        first_name: "Grace".to_string(),
        last_name: "Adeyemi".to_string(),
        email: "grace@example.com".to_string(),
        phone: None,
    }
}

pub fn test_student(id: &str) -> Student {
    Student {
        id: id.to_string(),
        first_name: "Tolu".to_string(),
        last_name: "Adeyemi".to_string(),
        year_group: Some("Year 11".to_string()),
        parent_id: Some("p1".to_string()),
        school_fees_paid: false,
    }
}

pub fn tuition_fee(amount: f64) -> Fee {
    Fee {
        id: "f1".to_string(),
        name: "Tuition".to_string(),
        code: "TUITION".to_string(),
        amount,
        extra_fees: None,
        description: None,
    }
}

pub fn pending_payment(reference: &str) -> Payment {
    Payment {
        id: 1,
        student_ids: vec!["s1".to_string()],
        student_fee_ids: vec!["sf1".to_string()],
        amount: 350_000.0,
        status: PaymentStatus::Pending,
        payment_reference: PaymentRef::from(reference.to_string()),
        description: None,
        payer_id: "p1".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Sends a JSON POST to an app built from `configure`, returning the status and raw body. Extra headers
/// (e.g. webhook signatures) are applied verbatim. Requests rejected before reaching a handler (for
/// example by the signature middleware) surface as `Err` with the rejection message.
pub async fn post_request(
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
    configure: impl FnOnce(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post()
        .uri(path)
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    for (name, value) in headers {
        req = req.insert_header((name.to_string(), value.to_string()));
    }
    let req = req.to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
