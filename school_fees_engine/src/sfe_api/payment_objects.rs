use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::{db_types::PaymentStatus, helpers::ExamShareLine};

//--------------------------------------  Payment requests   ---------------------------------------------------------
/// A payer's request to check out school fees for one or more children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolFeesPaymentRequest {
    pub parent_id: String,
    pub student_ids: Vec<String>,
    /// The total the payer claims to be paying, in Naira, including the club amount.
    pub amount: f64,
    /// The portion of `amount` covering club signups, in Naira.
    #[serde(default)]
    pub club_amount: f64,
    /// Student id to the club ids that student signed up for.
    #[serde(default)]
    pub student_club_ids: HashMap<String, Vec<String>>,
    /// The specific fee rows being settled. Empty means all unpaid fees owned by the students.
    #[serde(default)]
    pub student_fee_ids: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamPaymentDetail {
    pub exam_id: String,
    /// The installment amount for this exam, in Naira.
    pub amount_paid: f64,
}

/// A payer's request to check out one or more exam fee installments for one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamFeesPaymentRequest {
    pub parent_id: String,
    pub student_id: String,
    /// The total the payer claims to be paying, in Naira. Must equal the sum of the installments.
    pub amount: f64,
    pub exam_payments: Vec<ExamPaymentDetail>,
}

//--------------------------------------      Metadata       ---------------------------------------------------------
/// The payload attached to every gateway transaction. The `payment_type` tag tells the reconciliation
/// handler which confirmation path the reference belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "payment_type", rename_all = "snake_case")]
pub enum PaymentMetadata {
    SchoolFees(SchoolFeesMetadata),
    ExamFees(ExamFeesMetadata),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolFeesMetadata {
    pub parent_id: String,
    pub student_ids: Vec<String>,
    pub student_clubs: HashMap<String, Vec<String>>,
    pub tuition_share_naira: f64,
    pub club_share_naira: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamFeesMetadata {
    pub parent_id: String,
    pub student_id: String,
    pub exam_payments: Vec<ExamPaymentDetail>,
    pub exam_shares: Vec<ExamShare>,
}

/// One exam's routed share, recorded in the metadata for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamShare {
    pub exam_id: String,
    pub share_naira: f64,
}

impl From<&ExamShareLine> for ExamShare {
    fn from(line: &ExamShareLine) -> Self {
        Self { exam_id: line.exam_id.clone(), share_naira: line.share.to_naira() }
    }
}

//--------------------------------------   Verify results    ---------------------------------------------------------
/// The client-facing status of a verification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyStatus {
    Pending,
    Completed,
    Failed,
}

impl Display for VerifyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyStatus::Pending => write!(f, "pending"),
            VerifyStatus::Completed => write!(f, "completed"),
            VerifyStatus::Failed => write!(f, "failed"),
        }
    }
}

impl From<PaymentStatus> for VerifyStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => VerifyStatus::Pending,
            PaymentStatus::Completed | PaymentStatus::Refunded => VerifyStatus::Completed,
            PaymentStatus::Failed => VerifyStatus::Failed,
        }
    }
}

//--------------------------------------      Webhooks       ---------------------------------------------------------
/// A gateway webhook delivery. Only the fields the reconciliation handler inspects are modelled; the rest
/// of the body is ignored. The embedded metadata is never trusted for confirmation; the handler re-verifies
/// the reference with the gateway instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookData {
    pub reference: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}
