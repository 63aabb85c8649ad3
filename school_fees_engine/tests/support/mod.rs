//! Shared helpers for the payment flow integration tests: a seeded school database and a scripted
//! gateway mock.

use mockall::mock;
use paystack_tools::{
    InitializeRequest,
    InitializeResponse,
    PaystackApiError,
    SplitResponse,
    SubaccountShare,
    VerifyData,
    VerifyResponse,
};
use school_fees_engine::{
    helpers::{CallbackConfig, FlowConfig, SubaccountConfig},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::PaymentGateway,
    SqliteDatabase,
};

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn initialize_transaction(&self, req: &InitializeRequest) -> Result<InitializeResponse, PaystackApiError>;
        async fn verify_transaction(&self, reference: &str) -> Result<VerifyResponse, PaystackApiError>;
        async fn create_split(&self, shares: &[SubaccountShare]) -> Result<SplitResponse, PaystackApiError>;
    }
}

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

/// Scripts the gateway to accept a checkout and hand back the given reference.
pub fn gateway_accepting(reference: &str) -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_split()
        .returning(|_| Ok(SplitResponse { split_code: "SPL_test".to_string() }));
    let reference = reference.to_string();
    gateway.expect_initialize_transaction().returning(move |_| {
        Ok(InitializeResponse {
            authorization_url: format!("https://checkout.test/{reference}"),
            access_code: "AC_test".to_string(),
            reference: reference.clone(),
        })
    });
    gateway
}

/// Scripts the gateway to report the given status (and metadata) for every verification call.
pub fn gateway_reporting(status: &str, metadata: Option<serde_json::Value>) -> MockGateway {
    let mut gateway = MockGateway::new();
    let status = status.to_string();
    gateway.expect_verify_transaction().returning(move |_| {
        Ok(VerifyResponse {
            status: true,
            message: "Verification successful".to_string(),
            data: VerifyData { status: status.clone(), metadata: metadata.clone() },
        })
    });
    gateway
}

pub fn gateway_unreachable() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify_transaction()
        .returning(|_| Err(PaystackApiError::TransportError("connection refused".to_string())));
    gateway
}

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

/// Seeds one parent with two students, a two-line fee schedule (₦250k tuition, ₦100k boarding per
/// student), unpaid fee rows for both students, a chess club, and an IGCSE exam for Year 11.
pub async fn seed_school(db: &SqliteDatabase) {
    let pool = db.pool();
    sqlx::raw_sql(
        r#"
        INSERT INTO parents (id, first_name, last_name, email, phone)
        VALUES ('p1', 'Grace', 'Adeyemi', 'grace@example.com', '+2348000000000');

        INSERT INTO students (id, first_name, last_name, year_group, parent_id) VALUES
            ('s1', 'Tolu', 'Adeyemi', 'Year 11', 'p1'),
            ('s2', 'Seun', 'Adeyemi', 'Year 9', 'p1');

        INSERT INTO fees (id, name, code, amount, extra_fees) VALUES
            ('f1', 'Tuition', 'TUITION', 250000, NULL),
            ('f2', 'Boarding', 'BOARDING', 100000, NULL);

        INSERT INTO student_fees (id, student_id, fee_id, amount) VALUES
            ('sf1', 's1', 'f1', 250000),
            ('sf2', 's1', 'f2', 100000),
            ('sf3', 's2', 'f1', 250000),
            ('sf4', 's2', 'f2', 100000);

        INSERT INTO clubs (id, name, price) VALUES ('c1', 'Chess Club', 20000);

        INSERT INTO exam_fees (id, exam_name, amount, allows_installments, applicable_grades)
        VALUES ('e1', 'IGCSE May 2026', 150000, 1, '["Year 11"]');
        "#,
    )
    .execute(pool)
    .await
    .expect("Error seeding test data");
}
