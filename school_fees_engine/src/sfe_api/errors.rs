use paystack_tools::PaystackApiError;
use thiserror::Error;

use crate::traits::{FeeApiError, LedgerError};

#[derive(Debug, Error)]
pub enum PaymentFlowError {
    #[error("Parent does not exist: {0}")]
    ParentNotFound(String),
    #[error("Student does not exist: {0}")]
    StudentNotFound(String),
    #[error("Exam fee does not exist: {0}")]
    ExamFeeNotFound(String),
    #[error("No payment with reference {0} exists")]
    PaymentNotFound(String),
    #[error("No fee schedule has been configured")]
    FeeScheduleEmpty,
    #[error("Amount mismatch. Expected ₦{expected:0.2}, got ₦{got:0.2}")]
    InvalidAmount { expected: f64, got: f64 },
    #[error("The student list contains duplicates")]
    DuplicateStudents,
    #[error("Payment for exam {exam_id} exceeds the outstanding balance of ₦{remaining_due:0.2} (got ₦{got:0.2})")]
    ExcessExamPayment { exam_id: String, remaining_due: f64, got: f64 },
    #[error("Server configuration error: {0}")]
    ConfigError(String),
    #[error("The payment gateway rejected the request: {0}")]
    UpstreamError(String),
    #[error("Could not reach the payment gateway: {0}")]
    TransportError(String),
    #[error("Conflicting payment state: {0}")]
    Conflict(String),
    #[error("Ledger error: {0}")]
    StoreError(#[from] LedgerError),
    #[error("Fee query error: {0}")]
    QueryError(#[from] FeeApiError),
}

impl From<PaystackApiError> for PaymentFlowError {
    fn from(e: PaystackApiError) -> Self {
        if e.is_transport() {
            Self::TransportError(e.to_string())
        } else {
            Self::UpstreamError(e.to_string())
        }
    }
}
