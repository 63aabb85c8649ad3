use std::collections::HashMap;

use mockall::mock;
use paystack_tools::{
    InitializeRequest,
    InitializeResponse,
    PaystackApiError,
    SplitResponse,
    SubaccountShare,
    VerifyResponse,
};
use school_fees_engine::{
    db_types::{
        Club,
        ClubMembership,
        ExamFee,
        ExamPayment,
        Fee,
        NewExamPayment,
        NewPayment,
        Parent,
        Payment,
        PaymentItem,
        PaymentRef,
        Student,
        StudentExamFee,
        StudentExamFeeStatus,
        StudentFee,
    },
    payment_objects::SchoolFeesMetadata,
    traits::{ConfirmationOutcome, FeeApiError, FeeManagement, LedgerError, LedgerStore, PaymentGateway},
};

mock! {
    pub Ledger {}
    impl Clone for Ledger {
        fn clone(&self) -> Self;
    }
    impl FeeManagement for Ledger {
        async fn fetch_fee_schedule(&self) -> Result<Vec<Fee>, FeeApiError>;
        async fn fetch_parent(&self, parent_id: &str) -> Result<Option<Parent>, FeeApiError>;
        async fn fetch_students(&self, student_ids: &[String]) -> Result<Vec<Student>, FeeApiError>;
        async fn fetch_student_fees_for_students(&self, student_ids: &[String]) -> Result<Vec<StudentFee>, FeeApiError>;
        async fn fetch_exam_fee(&self, exam_fee_id: &str) -> Result<Option<ExamFee>, FeeApiError>;
        async fn fetch_student_exam_fee(&self, student_id: &str, exam_fee_id: &str) -> Result<Option<StudentExamFee>, FeeApiError>;
        async fn exam_fee_status(&self, student_exam_fee_id: &str) -> Result<StudentExamFeeStatus, FeeApiError>;
        async fn fetch_payment_by_reference(&self, reference: &PaymentRef) -> Result<Option<Payment>, FeeApiError>;
        async fn fetch_exam_payments_by_reference(&self, reference: &PaymentRef) -> Result<Vec<ExamPayment>, FeeApiError>;
        async fn fetch_payment_items(&self, payment_id: i64) -> Result<Vec<PaymentItem>, FeeApiError>;
        async fn fetch_club(&self, club_id: &str) -> Result<Option<Club>, FeeApiError>;
        async fn fetch_club_memberships_for_student(&self, student_id: &str) -> Result<Vec<ClubMembership>, FeeApiError>;
    }
    impl LedgerStore for Ledger {
        fn url(&self) -> &str;
        async fn insert_pending_payment(&self, payment: NewPayment, club_selection: &HashMap<String, Vec<String>>) -> Result<i64, LedgerError>;
        async fn insert_pending_exam_payments(&self, payments: &[NewExamPayment]) -> Result<usize, LedgerError>;
        async fn confirm_school_fees_payment<'a>(&self, reference: &PaymentRef, metadata: Option<&'a SchoolFeesMetadata>) -> Result<ConfirmationOutcome, LedgerError>;
        async fn confirm_exam_payments(&self, reference: &PaymentRef) -> Result<ConfirmationOutcome, LedgerError>;
        async fn mark_payment_failed(&self, reference: &PaymentRef) -> Result<(), LedgerError>;
        async fn mark_exam_payments_failed(&self, reference: &PaymentRef) -> Result<(), LedgerError>;
        async fn populate_student_exam_fees(&self, exam_fee_id: &str) -> Result<usize, LedgerError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn initialize_transaction(&self, req: &InitializeRequest) -> Result<InitializeResponse, PaystackApiError>;
        async fn verify_transaction(&self, reference: &str) -> Result<VerifyResponse, PaystackApiError>;
        async fn create_split(&self, shares: &[SubaccountShare]) -> Result<SplitResponse, PaystackApiError>;
    }
}
