use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment, PaymentItem, PaymentItemType, PaymentRef, PaymentStatus},
    traits::LedgerError,
};

pub async fn fetch_payment_by_reference(
    reference: &PaymentRef,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE payment_reference = $1")
        .bind(reference.as_str())
        .fetch_optional(conn)
        .await
}

/// Inserts a new payment in Pending status. The reference is unique, so replaying an insertion surfaces
/// as [`LedgerError::PaymentAlreadyExists`] rather than a second row.
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, LedgerError> {
    let student_ids = serde_json::to_string(&payment.student_ids)
        .map_err(|e| LedgerError::DatabaseError(format!("Could not encode student ids: {e}")))?;
    let student_fee_ids = serde_json::to_string(&payment.student_fee_ids)
        .map_err(|e| LedgerError::DatabaseError(format!("Could not encode student fee ids: {e}")))?;
    let inserted: Payment = sqlx::query_as(
        r#"
            INSERT INTO payments (
                student_ids,
                student_fee_ids,
                amount,
                status,
                payment_reference,
                description,
                payer_id
            ) VALUES ($1, $2, $3, 'Pending', $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(student_ids)
    .bind(student_fee_ids)
    .bind(payment.amount)
    .bind(payment.payment_reference.as_str())
    .bind(payment.description)
    .bind(payment.payer_id)
    .fetch_one(conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            LedgerError::PaymentAlreadyExists(payment.payment_reference.clone())
        },
        _ => LedgerError::from(e),
    })?;
    debug!("📝️ Payment [{}] inserted with id {}", payment.payment_reference, inserted.id);
    Ok(inserted)
}

/// Atomically flips a Pending payment to the given terminal status. Returns the updated row, or None if
/// the payment was not in Pending status (including when it does not exist).
///
/// Call this inside a transaction. The RETURNING row is produced before the statement completes, so the
/// update only becomes durable when the caller commits.
pub async fn transition_from_pending(
    reference: &PaymentRef,
    to: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE payments
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE payment_reference = $2 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(reference.as_str())
    .fetch_optional(conn)
    .await
}

/// Records an aggregated breakdown line for a completed payment. At most one row per item type per
/// payment; replays leave the existing row untouched.
pub async fn idempotent_insert_payment_item(
    payment_id: i64,
    item_type: PaymentItemType,
    amount: f64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO payment_items (payment_id, item_type, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (payment_id, item_type) DO NOTHING;
        "#,
    )
    .bind(payment_id)
    .bind(item_type)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_payment_items(payment_id: i64, conn: &mut SqliteConnection) -> Result<Vec<PaymentItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payment_items WHERE payment_id = $1 ORDER BY item_type")
        .bind(payment_id)
        .fetch_all(conn)
        .await
}
