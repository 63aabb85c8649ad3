use crate::{
    helpers::{calculate_fees, FeeCalculation},
    sfe_api::PaymentFlowError,
    traits::{FeeApiError, FeeManagement},
};

/// Read-only fee schedule queries.
#[derive(Debug, Clone)]
pub struct FeeApi<B> {
    db: B,
}

impl<B: FeeManagement> FeeApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Itemize the fee schedule for the given students and return the expected total.
    pub async fn calculate_for_students(&self, student_ids: &[String]) -> Result<FeeCalculation, PaymentFlowError> {
        let schedule = self.db.fetch_fee_schedule().await?;
        if schedule.is_empty() {
            return Err(PaymentFlowError::FeeScheduleEmpty);
        }
        let students = self.db.fetch_students(student_ids).await.map_err(|e| match e {
            FeeApiError::StudentNotFound(id) => PaymentFlowError::StudentNotFound(id),
            other => PaymentFlowError::QueryError(other),
        })?;
        Ok(calculate_fees(&students, &schedule))
    }
}
