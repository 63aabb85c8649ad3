//! `SqliteDatabase` is a concrete implementation of a school fees engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::{collections::HashMap, fmt::Debug};

use log::*;
use sqlx::SqlitePool;

use super::db::{clubs, db_url, exams, fees, new_pool, payments, student_fees, students};
use crate::{
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
        PaymentItemType,
        PaymentRef,
        PaymentStatus,
        Student,
        StudentExamFee,
        StudentExamFeeStatus,
        StudentFee,
    },
    sfe_api::SchoolFeesMetadata,
    traits::{ConfirmationOutcome, ConfirmationSummary, FeeApiError, FeeManagement, LedgerError, LedgerStore},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API instance, using the database URL from the `SFS_DATABASE_URL` environment
    /// variable.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl FeeManagement for SqliteDatabase {
    async fn fetch_fee_schedule(&self) -> Result<Vec<Fee>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fees::fetch_fee_schedule(&mut conn).await?)
    }

    async fn fetch_parent(&self, parent_id: &str) -> Result<Option<Parent>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(students::fetch_parent(parent_id, &mut conn).await?)
    }

    async fn fetch_students(&self, student_ids: &[String]) -> Result<Vec<Student>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        students::fetch_students(student_ids, &mut conn).await
    }

    async fn fetch_student_fees_for_students(&self, student_ids: &[String]) -> Result<Vec<StudentFee>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(student_fees::fetch_unpaid_for_students(student_ids, &mut conn).await?)
    }

    async fn fetch_exam_fee(&self, exam_fee_id: &str) -> Result<Option<ExamFee>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(exams::fetch_exam_fee(exam_fee_id, &mut conn).await?)
    }

    async fn fetch_student_exam_fee(
        &self,
        student_id: &str,
        exam_fee_id: &str,
    ) -> Result<Option<StudentExamFee>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(exams::fetch_student_exam_fee(student_id, exam_fee_id, &mut conn).await?)
    }

    async fn exam_fee_status(&self, student_exam_fee_id: &str) -> Result<StudentExamFeeStatus, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        exams::exam_fee_status(student_exam_fee_id, &mut conn).await.map_err(|e| match e {
            LedgerError::ExamFeeNotFound(id) => FeeApiError::QueryError(format!("No such student exam fee: {id}")),
            other => FeeApiError::DatabaseError(other.to_string()),
        })
    }

    async fn fetch_payment_by_reference(&self, reference: &PaymentRef) -> Result<Option<Payment>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::fetch_payment_by_reference(reference, &mut conn).await?)
    }

    async fn fetch_exam_payments_by_reference(&self, reference: &PaymentRef) -> Result<Vec<ExamPayment>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(exams::fetch_exam_payments_by_reference(reference, &mut conn).await?)
    }

    async fn fetch_payment_items(&self, payment_id: i64) -> Result<Vec<PaymentItem>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::fetch_payment_items(payment_id, &mut conn).await?)
    }

    async fn fetch_club(&self, club_id: &str) -> Result<Option<Club>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(clubs::fetch_club(club_id, &mut conn).await?)
    }

    async fn fetch_club_memberships_for_student(&self, student_id: &str) -> Result<Vec<ClubMembership>, FeeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(clubs::fetch_memberships_for_student(student_id, &mut conn).await?)
    }
}

impl LedgerStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_pending_payment(
        &self,
        mut payment: NewPayment,
        club_selection: &HashMap<String, Vec<String>>,
    ) -> Result<i64, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if payment.student_fee_ids.is_empty() {
            let unpaid = student_fees::fetch_unpaid_for_students(&payment.student_ids, &mut tx).await?;
            payment.student_fee_ids = unpaid.into_iter().map(|f| f.id).collect();
        }
        let reference = payment.payment_reference.clone();
        let inserted = payments::insert_payment(payment, &mut tx).await?;
        for (student_id, club_ids) in club_selection {
            for club_id in club_ids {
                clubs::idempotent_insert_membership(student_id, club_id, &mut tx).await?;
            }
        }
        tx.commit().await?;
        debug!("📝️ Pending payment [{reference}] recorded with {} fee row(s)", inserted.student_fee_ids.len());
        Ok(inserted.id)
    }

    async fn insert_pending_exam_payments(&self, new_payments: &[NewExamPayment]) -> Result<usize, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let mut count = 0;
        for payment in new_payments {
            let enrolment =
                exams::get_or_create_student_exam_fee(&payment.student_id, &payment.exam_fee_id, &mut tx).await?;
            exams::insert_exam_payment(payment, &enrolment.id, &mut tx).await?;
            count += 1;
        }
        tx.commit().await?;
        Ok(count)
    }

    async fn confirm_school_fees_payment(
        &self,
        reference: &PaymentRef,
        metadata: Option<&SchoolFeesMetadata>,
    ) -> Result<ConfirmationOutcome, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let Some(payment) = payments::transition_from_pending(reference, PaymentStatus::Completed, &mut tx).await?
        else {
            // The compare-and-set found no Pending row. Work out why without holding the transaction open.
            tx.rollback().await?;
            let mut conn = self.pool.acquire().await?;
            return match payments::fetch_payment_by_reference(reference, &mut conn).await? {
                None => Err(LedgerError::PaymentNotFound(reference.clone())),
                Some(p) if p.status == PaymentStatus::Completed => Ok(ConfirmationOutcome::AlreadyConfirmed),
                Some(p) => Err(LedgerError::IllegalStatusChange(format!(
                    "Cannot confirm payment [{reference}] in status {}",
                    p.status
                ))),
            };
        };
        let mut summary = ConfirmationSummary::default();
        summary.student_fees_marked =
            student_fees::mark_paid(&payment.student_fee_ids, reference, &mut tx).await?;
        match metadata {
            Some(meta) => {
                for (student_id, club_ids) in &meta.student_clubs {
                    summary.memberships_confirmed +=
                        clubs::confirm_memberships(student_id, Some(club_ids.as_slice()), &mut tx).await?;
                }
            },
            None => {
                for student_id in &payment.student_ids {
                    summary.memberships_confirmed += clubs::confirm_memberships(student_id, None, &mut tx).await?;
                }
            },
        }
        summary.students_flagged = students::mark_school_fees_paid(&payment.student_ids, &mut tx).await?;
        match metadata {
            Some(meta) => {
                payments::idempotent_insert_payment_item(
                    payment.id,
                    PaymentItemType::SchoolFees,
                    meta.tuition_share_naira,
                    &mut tx,
                )
                .await?;
                if meta.club_share_naira > 0.0 {
                    payments::idempotent_insert_payment_item(
                        payment.id,
                        PaymentItemType::ClubFees,
                        meta.club_share_naira,
                        &mut tx,
                    )
                    .await?;
                }
            },
            // Without a verified breakdown the whole amount is recorded as school fees.
            None => {
                payments::idempotent_insert_payment_item(
                    payment.id,
                    PaymentItemType::SchoolFees,
                    payment.amount,
                    &mut tx,
                )
                .await?;
            },
        }
        tx.commit().await?;
        info!("✅ Payment [{reference}] completed. {} fee row(s) settled.", summary.student_fees_marked);
        Ok(ConfirmationOutcome::Confirmed(summary))
    }

    async fn confirm_exam_payments(&self, reference: &PaymentRef) -> Result<ConfirmationOutcome, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let completed = exams::transition_from_pending(reference, PaymentStatus::Completed, &mut tx).await?;
        if completed.is_empty() {
            tx.rollback().await?;
            let mut conn = self.pool.acquire().await?;
            let existing = exams::fetch_exam_payments_by_reference(reference, &mut conn).await?;
            return if existing.is_empty() {
                Err(LedgerError::PaymentNotFound(reference.clone()))
            } else if existing.iter().all(|p| p.status == PaymentStatus::Completed) {
                Ok(ConfirmationOutcome::AlreadyConfirmed)
            } else {
                Err(LedgerError::IllegalStatusChange(format!(
                    "Cannot confirm exam payments [{reference}] that are no longer pending"
                )))
            };
        }
        let mut summary = ConfirmationSummary { exam_payments_completed: completed.len(), ..Default::default() };
        for payment in &completed {
            if exams::recompute_paid_state(&payment.student_exam_fee_id, reference, &mut tx).await? {
                summary.exam_fees_settled += 1;
            }
        }
        tx.commit().await?;
        info!(
            "✅ Exam payment [{reference}] completed. {} installment(s), {} fee(s) fully settled.",
            summary.exam_payments_completed, summary.exam_fees_settled
        );
        Ok(ConfirmationOutcome::Confirmed(summary))
    }

    async fn mark_payment_failed(&self, reference: &PaymentRef) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;
        if payments::transition_from_pending(reference, PaymentStatus::Failed, &mut tx).await?.is_some() {
            tx.commit().await?;
            info!("❌ Payment [{reference}] marked as failed");
            return Ok(());
        }
        tx.rollback().await?;
        let mut conn = self.pool.acquire().await?;
        match payments::fetch_payment_by_reference(reference, &mut conn).await? {
            None => Err(LedgerError::PaymentNotFound(reference.clone())),
            // Marking an already-failed payment failed again is a no-op.
            Some(p) if p.status == PaymentStatus::Failed => Ok(()),
            Some(p) => Err(LedgerError::IllegalStatusChange(format!(
                "Cannot mark payment [{reference}] as failed from status {}",
                p.status
            ))),
        }
    }

    async fn mark_exam_payments_failed(&self, reference: &PaymentRef) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;
        let failed = exams::transition_from_pending(reference, PaymentStatus::Failed, &mut tx).await?;
        if !failed.is_empty() {
            tx.commit().await?;
            info!("❌ {} exam payment(s) [{reference}] marked as failed", failed.len());
            return Ok(());
        }
        tx.rollback().await?;
        let mut conn = self.pool.acquire().await?;
        let existing = exams::fetch_exam_payments_by_reference(reference, &mut conn).await?;
        if existing.is_empty() {
            Err(LedgerError::PaymentNotFound(reference.clone()))
        } else if existing.iter().all(|p| p.status == PaymentStatus::Failed) {
            Ok(())
        } else {
            Err(LedgerError::IllegalStatusChange(format!(
                "Cannot mark exam payments [{reference}] as failed once they have completed"
            )))
        }
    }

    async fn populate_student_exam_fees(&self, exam_fee_id: &str) -> Result<usize, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let created = exams::populate_student_exam_fees(exam_fee_id, &mut tx).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}
