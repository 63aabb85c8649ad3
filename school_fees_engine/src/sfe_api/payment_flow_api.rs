use std::collections::HashSet;

use log::{debug, info, warn};
use paystack_tools::{InitializeRequest, InitializeResponse};
use sfp_common::Kobo;

use crate::{
    db_types::{NewExamPayment, NewPayment, PaymentRef, PaymentStatus},
    helpers::{
        calculate_fees,
        exam_fees_split,
        school_fees_split,
        ExamShareLine,
        FlowConfig,
        AMOUNT_TOLERANCE,
    },
    sfe_api::{
        payment_objects::{
            ExamFeesMetadata,
            ExamFeesPaymentRequest,
            PaymentMetadata,
            SchoolFeesMetadata,
            SchoolFeesPaymentRequest,
            VerifyStatus,
            WebhookEvent,
        },
        PaymentFlowError,
    },
    traits::{ConfirmationOutcome, FeeApiError, LedgerError, LedgerStore, PaymentGateway},
};

/// The payment orchestrator. Validates checkout requests, obtains checkout sessions from the gateway, and
/// reconciles gateway outcomes back into the ledger.
///
/// Nothing is persisted until the gateway has accepted the transaction, so a gateway rejection leaves no
/// pending record behind.
pub struct PaymentFlowApi<B, G> {
    db: B,
    gateway: G,
    config: FlowConfig,
}

impl<B, G> PaymentFlowApi<B, G>
where
    B: LedgerStore,
    G: PaymentGateway,
{
    pub fn new(db: B, gateway: G, config: FlowConfig) -> Self {
        Self { db, gateway, config }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Start a school-fees checkout.
    ///
    /// The claimed amount must match the fee schedule total for the students plus the claimed club amount,
    /// within the float tolerance. The split routes the tuition and club portions to their subaccounts.
    pub async fn initiate_school_fees(
        &self,
        req: SchoolFeesPaymentRequest,
    ) -> Result<InitializeResponse, PaymentFlowError> {
        let unique = req.student_ids.iter().collect::<HashSet<_>>();
        if unique.len() != req.student_ids.len() {
            return Err(PaymentFlowError::DuplicateStudents);
        }
        let parent = self
            .db
            .fetch_parent(&req.parent_id)
            .await?
            .ok_or_else(|| PaymentFlowError::ParentNotFound(req.parent_id.clone()))?;
        let schedule = self.db.fetch_fee_schedule().await?;
        if schedule.is_empty() {
            return Err(PaymentFlowError::FeeScheduleEmpty);
        }
        let students = self.db.fetch_students(&req.student_ids).await.map_err(flatten_fee_err)?;
        let calc = calculate_fees(&students, &schedule);
        let expected = calc.total_amount + req.club_amount;
        if (req.amount - expected).abs() > AMOUNT_TOLERANCE {
            return Err(PaymentFlowError::InvalidAmount { expected, got: req.amount });
        }
        let tuition_share = req.amount - req.club_amount;
        let shares =
            school_fees_split(Kobo::from_naira(tuition_share), Kobo::from_naira(req.club_amount), &self.config.accounts)?;
        let split = self.gateway.create_split(&shares).await?;
        let metadata = PaymentMetadata::SchoolFees(SchoolFeesMetadata {
            parent_id: req.parent_id.clone(),
            student_ids: req.student_ids.clone(),
            student_clubs: req.student_club_ids.clone(),
            tuition_share_naira: tuition_share,
            club_share_naira: req.club_amount,
        });
        let init = InitializeRequest {
            email: parent.email.clone(),
            amount: Kobo::from_naira(req.amount),
            metadata: serde_json::to_value(&metadata)
                .map_err(|e| PaymentFlowError::ConfigError(format!("Could not serialize metadata: {e}")))?,
            callback_url: self.config.callbacks.school_fees_url.clone(),
            split_code: Some(split.split_code),
        };
        let response = self.gateway.initialize_transaction(&init).await?;
        let payment = NewPayment {
            student_ids: req.student_ids,
            student_fee_ids: req.student_fee_ids,
            amount: req.amount,
            payment_reference: PaymentRef::from(response.reference.clone()),
            description: req.description,
            payer_id: req.parent_id,
        };
        let id = self.db.insert_pending_payment(payment, &req.student_club_ids).await?;
        info!("💰 School fees checkout [{}] created for {} (payment #{id})", response.reference, parent.email);
        Ok(response)
    }

    /// Start an exam-fees checkout for one student.
    ///
    /// The claimed total must equal the sum of the per-exam installments, and no installment may exceed
    /// the outstanding balance for its exam.
    pub async fn initiate_exam_fees(
        &self,
        req: ExamFeesPaymentRequest,
    ) -> Result<InitializeResponse, PaymentFlowError> {
        let installment_sum = req.exam_payments.iter().map(|p| p.amount_paid).sum::<f64>();
        if req.exam_payments.is_empty() || (req.amount - installment_sum).abs() > AMOUNT_TOLERANCE {
            return Err(PaymentFlowError::InvalidAmount { expected: installment_sum, got: req.amount });
        }
        let parent = self
            .db
            .fetch_parent(&req.parent_id)
            .await?
            .ok_or_else(|| PaymentFlowError::ParentNotFound(req.parent_id.clone()))?;
        let student_ids = [req.student_id.clone()];
        self.db.fetch_students(&student_ids).await.map_err(flatten_fee_err)?;
        let mut lines = Vec::with_capacity(req.exam_payments.len());
        for detail in &req.exam_payments {
            let exam = self
                .db
                .fetch_exam_fee(&detail.exam_id)
                .await?
                .ok_or_else(|| PaymentFlowError::ExamFeeNotFound(detail.exam_id.clone()))?;
            let remaining_due = match self.db.fetch_student_exam_fee(&req.student_id, &detail.exam_id).await? {
                Some(assigned) => {
                    let status = self.db.exam_fee_status(&assigned.id).await?;
                    status.amount_due - status.total_paid
                },
                None => exam.amount + exam.extra_fees.unwrap_or(0.0),
            };
            if detail.amount_paid > remaining_due + AMOUNT_TOLERANCE {
                return Err(PaymentFlowError::ExcessExamPayment {
                    exam_id: detail.exam_id.clone(),
                    remaining_due,
                    got: detail.amount_paid,
                });
            }
            lines.push(ExamShareLine {
                exam_id: exam.id.clone(),
                exam_name: exam.exam_name.clone(),
                share: Kobo::from_naira(detail.amount_paid),
            });
        }
        let shares = exam_fees_split(&lines, &self.config.accounts)?;
        let split = self.gateway.create_split(&shares).await?;
        let metadata = PaymentMetadata::ExamFees(ExamFeesMetadata {
            parent_id: req.parent_id.clone(),
            student_id: req.student_id.clone(),
            exam_payments: req.exam_payments.clone(),
            exam_shares: lines.iter().map(Into::into).collect(),
        });
        let init = InitializeRequest {
            email: parent.email.clone(),
            amount: Kobo::from_naira(req.amount),
            metadata: serde_json::to_value(&metadata)
                .map_err(|e| PaymentFlowError::ConfigError(format!("Could not serialize metadata: {e}")))?,
            callback_url: self.config.callbacks.exam_fees_url.clone(),
            split_code: Some(split.split_code),
        };
        let response = self.gateway.initialize_transaction(&init).await?;
        let reference = PaymentRef::from(response.reference.clone());
        let rows = req
            .exam_payments
            .iter()
            .map(|detail| NewExamPayment {
                student_id: req.student_id.clone(),
                exam_fee_id: detail.exam_id.clone(),
                amount_paid: detail.amount_paid,
                payment_reference: reference.clone(),
                payer_id: req.parent_id.clone(),
            })
            .collect::<Vec<_>>();
        let n = self.db.insert_pending_exam_payments(&rows).await?;
        info!("💰 Exam fees checkout [{reference}] created for {} ({n} installment(s))", parent.email);
        Ok(response)
    }

    /// Check the status of a payment against the gateway and reconcile the ledger to it.
    ///
    /// If the gateway cannot be reached, the locally recorded status is returned unchanged so that a
    /// gateway outage never blocks a status query.
    pub async fn verify(&self, reference: &PaymentRef) -> Result<VerifyStatus, PaymentFlowError> {
        let local = self.local_payment_kind(reference).await?;
        let verification = match self.gateway.verify_transaction(reference.as_str()).await {
            Ok(v) => v,
            Err(e) if e.is_transport() => {
                warn!("🚨 Gateway unreachable while verifying [{reference}]: {e}. Reporting local status.");
                return Ok(VerifyStatus::from(local.status()));
            },
            Err(e) => return Err(e.into()),
        };
        match verification.data.status.as_str() {
            "success" => {
                self.confirm(reference, &local, verification.data.metadata).await?;
                Ok(VerifyStatus::Completed)
            },
            "pending" | "ongoing" | "processing" | "queued" => Ok(VerifyStatus::Pending),
            other => {
                debug!("Gateway reports [{reference}] as \"{other}\". Marking failed.");
                self.mark_failed(reference, &local).await?;
                Ok(VerifyStatus::Failed)
            },
        }
    }

    /// Process a gateway webhook delivery. The event body is never trusted; a `charge.success` event only
    /// triggers a fresh verification against the gateway, and confirmation follows the verified result.
    pub async fn handle_webhook(&self, event: WebhookEvent) -> Result<VerifyStatus, PaymentFlowError> {
        if event.event != "charge.success" {
            debug!("Ignoring webhook event \"{}\"", event.event);
            return Ok(VerifyStatus::Failed);
        }
        let reference = PaymentRef::from(event.data.reference.clone());
        let local = match self.local_payment_kind(&reference).await {
            Ok(kind) => kind,
            Err(PaymentFlowError::PaymentNotFound(_)) => {
                warn!("🚨 Webhook delivered for unknown reference [{reference}]. Ignoring.");
                return Ok(VerifyStatus::Failed);
            },
            Err(e) => return Err(e),
        };
        let verification = self.gateway.verify_transaction(reference.as_str()).await?;
        if verification.data.status != "success" {
            warn!(
                "🚨 Webhook claimed success for [{reference}] but the gateway reports \"{}\". Not confirming.",
                verification.data.status
            );
            return Ok(VerifyStatus::Failed);
        }
        self.confirm(&reference, &local, verification.data.metadata).await?;
        Ok(VerifyStatus::Completed)
    }

    async fn local_payment_kind(&self, reference: &PaymentRef) -> Result<LocalPayment, PaymentFlowError> {
        if let Some(payment) = self.db.fetch_payment_by_reference(reference).await? {
            return Ok(LocalPayment::SchoolFees(payment.status));
        }
        let exam_payments = self.db.fetch_exam_payments_by_reference(reference).await?;
        match exam_payments.first() {
            Some(p) => Ok(LocalPayment::ExamFees(p.status)),
            None => Err(PaymentFlowError::PaymentNotFound(reference.to_string())),
        }
    }

    async fn confirm(
        &self,
        reference: &PaymentRef,
        local: &LocalPayment,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), PaymentFlowError> {
        let outcome = match local {
            LocalPayment::SchoolFees(_) => {
                let meta = metadata.and_then(|value| match serde_json::from_value::<PaymentMetadata>(value) {
                    Ok(PaymentMetadata::SchoolFees(m)) => Some(m),
                    Ok(PaymentMetadata::ExamFees(_)) => {
                        warn!("🚨 Metadata for [{reference}] is tagged exam_fees but the record is school fees");
                        None
                    },
                    Err(e) => {
                        warn!("🚨 Could not parse metadata for [{reference}]: {e}. Confirming without a breakdown.");
                        None
                    },
                });
                self.db.confirm_school_fees_payment(reference, meta.as_ref()).await?
            },
            LocalPayment::ExamFees(_) => self.db.confirm_exam_payments(reference).await?,
        };
        match outcome {
            ConfirmationOutcome::Confirmed(summary) => {
                info!("✅ Payment [{reference}] confirmed ({summary:?})");
            },
            ConfirmationOutcome::AlreadyConfirmed => {
                debug!("Payment [{reference}] was already confirmed. Nothing to do.");
            },
        }
        Ok(())
    }

    async fn mark_failed(&self, reference: &PaymentRef, local: &LocalPayment) -> Result<(), PaymentFlowError> {
        if local.status() == PaymentStatus::Completed {
            return Err(PaymentFlowError::Conflict(format!(
                "Gateway reports [{reference}] as failed, but it has already been confirmed locally"
            )));
        }
        let result = match local {
            LocalPayment::SchoolFees(_) => self.db.mark_payment_failed(reference).await,
            LocalPayment::ExamFees(_) => self.db.mark_exam_payments_failed(reference).await,
        };
        match result {
            Ok(()) => Ok(()),
            Err(LedgerError::IllegalStatusChange(msg)) => Err(PaymentFlowError::Conflict(msg)),
            Err(e) => Err(e.into()),
        }
    }
}

enum LocalPayment {
    SchoolFees(PaymentStatus),
    ExamFees(PaymentStatus),
}

impl LocalPayment {
    fn status(&self) -> PaymentStatus {
        match self {
            LocalPayment::SchoolFees(s) | LocalPayment::ExamFees(s) => *s,
        }
    }
}

fn flatten_fee_err(e: FeeApiError) -> PaymentFlowError {
    match e {
        FeeApiError::StudentNotFound(id) => PaymentFlowError::StudentNotFound(id),
        FeeApiError::FeeScheduleEmpty => PaymentFlowError::FeeScheduleEmpty,
        other => PaymentFlowError::QueryError(other),
    }
}
