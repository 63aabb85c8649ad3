use std::collections::HashMap;

use thiserror::Error;

use crate::{
    db_types::{NewExamPayment, NewPayment, PaymentRef},
    sfe_api::SchoolFeesMetadata,
    traits::{data_objects::ConfirmationOutcome, fee_management::FeeApiError, FeeManagement},
};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A payment with reference {0} already exists")]
    PaymentAlreadyExists(PaymentRef),
    #[error("No payment with reference {0} exists")]
    PaymentNotFound(PaymentRef),
    #[error("Exam fee does not exist: {0}")]
    ExamFeeNotFound(String),
    #[error("Student does not exist: {0}")]
    StudentNotFound(String),
    #[error("The requested status change is not permitted. {0}")]
    IllegalStatusChange(String),
    #[error("Fee query error: {0}")]
    FeeApiError(#[from] FeeApiError),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The persistence seam for the payment lifecycle.
///
/// Implementations must make every confirmation and failure transition atomic: either the status flip and
/// all of its dependent updates commit together, or none of them do. Status transitions are one-way. A
/// record leaves Pending exactly once, and terminal records are never flipped back.
#[allow(async_fn_in_trait)]
pub trait LedgerStore: Clone + FeeManagement {
    /// The connection URL for the database.
    fn url(&self) -> &str;

    /// Record a freshly initialized school-fees payment in Pending status.
    ///
    /// If `payment.student_fee_ids` is empty, every unpaid [`crate::db_types::StudentFee`] row owned by the
    /// payment's students is linked instead. `club_selection` maps student ids to the club ids they signed
    /// up for; a Pending membership row is created for each pair unless one already exists.
    ///
    /// Returns [`LedgerError::PaymentAlreadyExists`] if the reference has been seen before.
    async fn insert_pending_payment(
        &self,
        payment: NewPayment,
        club_selection: &HashMap<String, Vec<String>>,
    ) -> Result<i64, LedgerError>;

    /// Record one Pending exam payment row per installment, all carrying the same gateway reference.
    ///
    /// Creates the [`crate::db_types::StudentExamFee`] assignment row on the fly when the student has not
    /// been enrolled for the exam yet.
    async fn insert_pending_exam_payments(&self, payments: &[NewExamPayment]) -> Result<usize, LedgerError>;

    /// Confirm a school-fees payment: flip it to Completed and apply every dependent update in one
    /// transaction (student fee marking, club membership confirmation, school_fees_paid flags, and the
    /// aggregated breakdown items derived from `metadata` when present).
    ///
    /// Idempotent. Replays on a Completed record return [`ConfirmationOutcome::AlreadyConfirmed`].
    /// Confirming a Failed or Refunded record is an [`LedgerError::IllegalStatusChange`].
    async fn confirm_school_fees_payment(
        &self,
        reference: &PaymentRef,
        metadata: Option<&SchoolFeesMetadata>,
    ) -> Result<ConfirmationOutcome, LedgerError>;

    /// Confirm every exam payment row carrying the given reference and recompute the paid state of the
    /// affected student exam fees. Same idempotency contract as [`Self::confirm_school_fees_payment`].
    async fn confirm_exam_payments(&self, reference: &PaymentRef) -> Result<ConfirmationOutcome, LedgerError>;

    /// Mark a school-fees payment as Failed. Only a Pending record may fail; a Completed record stays
    /// Completed and the call returns [`LedgerError::IllegalStatusChange`].
    async fn mark_payment_failed(&self, reference: &PaymentRef) -> Result<(), LedgerError>;

    /// Mark every exam payment row carrying the given reference as Failed, with the same transition rules
    /// as [`Self::mark_payment_failed`].
    async fn mark_exam_payments_failed(&self, reference: &PaymentRef) -> Result<(), LedgerError>;

    /// Create a [`crate::db_types::StudentExamFee`] row for every student whose year group appears in the
    /// exam's applicable grades and who does not have one yet. Returns the number of rows created.
    /// Idempotent; reruns create nothing new.
    async fn populate_student_exam_fees(&self, exam_fee_id: &str) -> Result<usize, LedgerError>;

    /// Close the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}
