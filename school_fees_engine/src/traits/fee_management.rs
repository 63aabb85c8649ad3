use thiserror::Error;

use crate::db_types::{
    Club,
    ClubMembership,
    ExamFee,
    ExamPayment,
    Fee,
    Parent,
    Payment,
    PaymentItem,
    PaymentRef,
    Student,
    StudentExamFee,
    StudentExamFeeStatus,
    StudentFee,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeeApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Ill-formed query: {0}")]
    QueryError(String),
    #[error("Student does not exist: {0}")]
    StudentNotFound(String),
    #[error("No fee schedule has been configured")]
    FeeScheduleEmpty,
}

impl From<sqlx::Error> for FeeApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The read-only queries the engine needs against the school records.
#[allow(async_fn_in_trait)]
pub trait FeeManagement {
    /// Fetch every fee template in the schedule, ordered by code.
    async fn fetch_fee_schedule(&self) -> Result<Vec<Fee>, FeeApiError>;

    /// Fetch a parent by id, or None if no such parent exists.
    async fn fetch_parent(&self, parent_id: &str) -> Result<Option<Parent>, FeeApiError>;

    /// Fetch the given students. Returns [`FeeApiError::StudentNotFound`] naming the first missing id if any
    /// id does not resolve.
    async fn fetch_students(&self, student_ids: &[String]) -> Result<Vec<Student>, FeeApiError>;

    /// Fetch the unpaid fee assignments for the given students.
    async fn fetch_student_fees_for_students(&self, student_ids: &[String]) -> Result<Vec<StudentFee>, FeeApiError>;

    /// Fetch an exam fee definition by id.
    async fn fetch_exam_fee(&self, exam_fee_id: &str) -> Result<Option<ExamFee>, FeeApiError>;

    /// Fetch the assignment row linking one student to one exam fee, if any.
    async fn fetch_student_exam_fee(
        &self,
        student_id: &str,
        exam_fee_id: &str,
    ) -> Result<Option<StudentExamFee>, FeeApiError>;

    /// Derive the installment status (total paid vs amount due) of one student exam fee.
    async fn exam_fee_status(&self, student_exam_fee_id: &str) -> Result<StudentExamFeeStatus, FeeApiError>;

    /// Fetch a school-fees payment by its gateway reference.
    async fn fetch_payment_by_reference(&self, reference: &PaymentRef) -> Result<Option<Payment>, FeeApiError>;

    /// Fetch every exam payment row carrying the given gateway reference.
    async fn fetch_exam_payments_by_reference(&self, reference: &PaymentRef) -> Result<Vec<ExamPayment>, FeeApiError>;

    /// Fetch the breakdown items recorded for a completed payment.
    async fn fetch_payment_items(&self, payment_id: i64) -> Result<Vec<PaymentItem>, FeeApiError>;

    /// Fetch a club by id.
    async fn fetch_club(&self, club_id: &str) -> Result<Option<Club>, FeeApiError>;

    /// Fetch the club memberships recorded for one student.
    async fn fetch_club_memberships_for_student(&self, student_id: &str) -> Result<Vec<ClubMembership>, FeeApiError>;
}
