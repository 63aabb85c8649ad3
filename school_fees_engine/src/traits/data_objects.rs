use serde::{Deserialize, Serialize};

/// The result of asking the store to confirm a payment.
///
/// Confirmation is idempotent. The first call flips the pending record to Completed and applies every
/// dependent update; replays observe the terminal status and report [`ConfirmationOutcome::AlreadyConfirmed`]
/// without touching any row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed(ConfirmationSummary),
    AlreadyConfirmed,
}

/// A tally of the dependent records updated while confirming a payment. Used for logging and for
/// assertions in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationSummary {
    /// StudentFee rows marked paid.
    pub student_fees_marked: usize,
    /// Club memberships confirmed.
    pub memberships_confirmed: usize,
    /// Students whose school_fees_paid flag was set.
    pub students_flagged: usize,
    /// Exam payment rows flipped to Completed.
    pub exam_payments_completed: usize,
    /// StudentExamFee rows that became fully paid as a result.
    pub exam_fees_settled: usize,
}
