use log::info;

use crate::{sfe_api::PaymentFlowError, traits::LedgerStore};

/// Exam fee enrollment management.
#[derive(Debug, Clone)]
pub struct ExamApi<B> {
    db: B,
}

impl<B: LedgerStore> ExamApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Enroll every eligible student (by year group) for the given exam. Students already enrolled are
    /// skipped, so the call may be repeated safely. Returns the number of enrollments created.
    pub async fn populate_student_exam_fees(&self, exam_fee_id: &str) -> Result<usize, PaymentFlowError> {
        let exam = self
            .db
            .fetch_exam_fee(exam_fee_id)
            .await?
            .ok_or_else(|| PaymentFlowError::ExamFeeNotFound(exam_fee_id.to_string()))?;
        let created = self.db.populate_student_exam_fees(exam_fee_id).await?;
        info!("📝 Enrolled {created} student(s) for exam \"{}\"", exam.exam_name);
        Ok(created)
    }
}
