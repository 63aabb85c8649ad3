use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

//--------------------------------------   PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// The gateway transaction has been initialized but not yet confirmed.
    Pending,
    /// The gateway confirmed the charge and all dependent records have been updated. Terminal.
    Completed,
    /// The gateway reported the charge as failed or abandoned. Terminal.
    Failed,
    /// Reached from Completed via an out-of-band administrative action. Terminal.
    Refunded,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Completed => write!(f, "Completed"),
            PaymentStatus::Failed => write!(f, "Failed"),
            PaymentStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            "Refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. But this conversion cannot fail. Defaulting to Pending");
            PaymentStatus::Pending
        })
    }
}

//--------------------------------------  PaymentItemType    ---------------------------------------------------------
/// The breakdown category of an aggregated [`PaymentItem`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentItemType {
    SchoolFees,
    ClubFees,
}

impl Display for PaymentItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentItemType::SchoolFees => write!(f, "SchoolFees"),
            PaymentItemType::ClubFees => write!(f, "ClubFees"),
        }
    }
}

impl FromStr for PaymentItemType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SchoolFees" => Ok(Self::SchoolFees),
            "ClubFees" => Ok(Self::ClubFees),
            s => Err(ConversionError(format!("Invalid payment item type: {s}"))),
        }
    }
}

//--------------------------------------    PaymentRef       ---------------------------------------------------------
/// A lightweight wrapper around the gateway-issued transaction reference. Unique and immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct PaymentRef(pub String);

impl FromStr for PaymentRef {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for PaymentRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for PaymentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PaymentRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        Fee          ---------------------------------------------------------
/// A named, coded charge template. The `code` is unique (e.g. "TUITION", "BOARDING").
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Fee {
    pub id: String,
    pub name: String,
    pub code: String,
    pub amount: f64,
    pub extra_fees: Option<f64>,
    pub description: Option<String>,
}

//--------------------------------------     StudentFee      ---------------------------------------------------------
/// An instance of a [`Fee`] assigned to one student, carrying its own due/paid state.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentFee {
    pub id: String,
    pub student_id: String,
    pub fee_id: String,
    pub amount: f64,
    pub discount_percentage: f64,
    pub paid: bool,
    pub payment_reference: Option<String>,
    pub due_date: Option<String>,
}

impl StudentFee {
    /// The amount actually owed after the row's discount is applied.
    pub fn discounted_amount(&self) -> f64 {
        self.amount * (1.0 - self.discount_percentage / 100.0)
    }
}

//--------------------------------------      ExamFee        ---------------------------------------------------------
/// An exam definition. `applicable_grades` holds the year-group names whose students are auto-enrolled; it is
/// persisted as a JSON array and validated when the row is decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamFee {
    pub id: String,
    pub exam_name: String,
    pub amount: f64,
    pub extra_fees: Option<f64>,
    pub allows_installments: bool,
    pub applicable_grades: Vec<String>,
}

#[cfg(feature = "sqlite")]
impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for ExamFee {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        let grades: Option<String> = row.try_get("applicable_grades")?;
        let applicable_grades = match grades {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| sqlx::Error::ColumnDecode { index: "applicable_grades".into(), source: Box::new(e) })?,
            None => Vec::new(),
        };
        Ok(Self {
            id: row.try_get("id")?,
            exam_name: row.try_get("exam_name")?,
            amount: row.try_get("amount")?,
            extra_fees: row.try_get("extra_fees")?,
            allows_installments: row.try_get("allows_installments")?,
            applicable_grades,
        })
    }
}

//--------------------------------------  StudentExamFee     ---------------------------------------------------------
/// An instance of an [`ExamFee`] assigned to one student. The paid state is derived from the sum of Completed
/// [`ExamPayment`] rows against it, so installment payments are supported.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentExamFee {
    pub id: String,
    pub student_id: String,
    pub exam_fee_id: String,
    pub amount: f64,
    pub discount_percentage: f64,
    pub paid: bool,
    pub payment_reference: Option<String>,
    pub due_date: Option<String>,
}

impl StudentExamFee {
    pub fn discounted_amount(&self) -> f64 {
        self.amount * (1.0 - self.discount_percentage / 100.0)
    }
}

/// The derived installment state of one [`StudentExamFee`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentExamFeeStatus {
    pub student_exam_fee_id: String,
    pub total_paid: f64,
    pub amount_due: f64,
    pub is_fully_paid: bool,
}

//--------------------------------------      Payment        ---------------------------------------------------------
/// A school-fees transaction. `student_ids` and `student_fee_ids` are persisted as JSON arrays; decoding validates
/// them at the persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub student_ids: Vec<String>,
    pub student_fee_ids: Vec<String>,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_reference: PaymentRef,
    pub description: Option<String>,
    pub payer_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "sqlite")]
impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for Payment {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        let student_ids: String = row.try_get("student_ids")?;
        let student_ids = serde_json::from_str(&student_ids)
            .map_err(|e| sqlx::Error::ColumnDecode { index: "student_ids".into(), source: Box::new(e) })?;
        let student_fee_ids: String = row.try_get("student_fee_ids")?;
        let student_fee_ids = serde_json::from_str(&student_fee_ids)
            .map_err(|e| sqlx::Error::ColumnDecode { index: "student_fee_ids".into(), source: Box::new(e) })?;
        Ok(Self {
            id: row.try_get("id")?,
            student_ids,
            student_fee_ids,
            amount: row.try_get("amount")?,
            status: row.try_get("status")?,
            payment_reference: row.try_get("payment_reference")?,
            description: row.try_get("description")?,
            payer_id: row.try_get("payer_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

//--------------------------------------     NewPayment      ---------------------------------------------------------
/// A school-fees payment as it is persisted straight after the gateway confirms initialization.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// The students this transaction covers.
    pub student_ids: Vec<String>,
    /// The fee rows the payment settles. May be empty, in which case every [`StudentFee`] row currently owned by
    /// the students is linked at insertion time.
    pub student_fee_ids: Vec<String>,
    pub amount: f64,
    /// The gateway-issued reference.
    pub payment_reference: PaymentRef,
    pub description: Option<String>,
    pub payer_id: String,
}

//--------------------------------------    PaymentItem      ---------------------------------------------------------
/// An aggregated breakdown line for a completed payment, used for analytics. At most one row exists per item type
/// per payment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentItem {
    pub id: i64,
    pub payment_id: i64,
    pub item_type: PaymentItemType,
    pub amount: f64,
}

//--------------------------------------    ExamPayment      ---------------------------------------------------------
/// One gateway-confirmed-or-pending contribution toward a [`StudentExamFee`]. Several rows may accumulate against
/// the same fee (installments).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExamPayment {
    pub id: i64,
    pub student_exam_fee_id: String,
    pub amount_paid: f64,
    pub status: PaymentStatus,
    pub payment_reference: PaymentRef,
    pub payer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExamPayment {
    pub student_id: String,
    pub exam_fee_id: String,
    pub amount_paid: f64,
    pub payment_reference: PaymentRef,
    pub payer_id: String,
}

//--------------------------------------  Reference entities ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Parent {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub year_group: Option<String>,
    pub parent_id: Option<String>,
    pub school_fees_paid: bool,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Club {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClubMembership {
    pub id: i64,
    pub student_id: String,
    pub club_id: String,
    pub payment_confirmed: bool,
    pub status: String,
}
