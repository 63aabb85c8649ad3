use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{ExamFee, ExamPayment, NewExamPayment, PaymentRef, PaymentStatus, StudentExamFee, StudentExamFeeStatus},
    sqlite::db::new_row_id,
    traits::LedgerError,
};

/// Paid-state recomputation treats the fee as settled when the completed total is within this margin of
/// the discounted amount due.
const SETTLEMENT_TOLERANCE: f64 = 0.01;

pub async fn fetch_exam_fee(exam_fee_id: &str, conn: &mut SqliteConnection) -> Result<Option<ExamFee>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM exam_fees WHERE id = $1").bind(exam_fee_id).fetch_optional(conn).await
}

pub async fn fetch_student_exam_fee(
    student_id: &str,
    exam_fee_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<StudentExamFee>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM student_exam_fees WHERE student_id = $1 AND exam_fee_id = $2")
        .bind(student_id)
        .bind(exam_fee_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_student_exam_fee_by_id(
    id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<StudentExamFee>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM student_exam_fees WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// Returns the student's enrolment for the exam, creating it at the exam's list price if the student has
/// not been enrolled yet.
pub async fn get_or_create_student_exam_fee(
    student_id: &str,
    exam_fee_id: &str,
    conn: &mut SqliteConnection,
) -> Result<StudentExamFee, LedgerError> {
    if let Some(existing) = fetch_student_exam_fee(student_id, exam_fee_id, conn).await? {
        return Ok(existing);
    }
    let exam = fetch_exam_fee(exam_fee_id, conn)
        .await?
        .ok_or_else(|| LedgerError::ExamFeeNotFound(exam_fee_id.to_string()))?;
    let amount = exam.amount + exam.extra_fees.unwrap_or(0.0);
    let row = sqlx::query_as(
        r#"
            INSERT INTO student_exam_fees (id, student_id, exam_fee_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(new_row_id())
    .bind(student_id)
    .bind(exam_fee_id)
    .bind(amount)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Student {student_id} enrolled for exam {exam_fee_id}");
    Ok(row)
}

pub async fn insert_exam_payment(
    payment: &NewExamPayment,
    student_exam_fee_id: &str,
    conn: &mut SqliteConnection,
) -> Result<ExamPayment, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO exam_payments (student_exam_fee_id, amount_paid, status, payment_reference, payer_id)
            VALUES ($1, $2, 'Pending', $3, $4)
            RETURNING *;
        "#,
    )
    .bind(student_exam_fee_id)
    .bind(payment.amount_paid)
    .bind(payment.payment_reference.as_str())
    .bind(payment.payer_id.as_str())
    .fetch_one(conn)
    .await
}

pub async fn fetch_exam_payments_by_reference(
    reference: &PaymentRef,
    conn: &mut SqliteConnection,
) -> Result<Vec<ExamPayment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM exam_payments WHERE payment_reference = $1 ORDER BY id")
        .bind(reference.as_str())
        .fetch_all(conn)
        .await
}

/// Atomically flips the Pending exam payment rows for a reference to the given terminal status. Returns
/// the updated rows; an empty result means no row was Pending.
///
/// Call this inside a transaction. The RETURNING rows are produced before the statement completes, so the
/// update only becomes durable when the caller commits.
pub async fn transition_from_pending(
    reference: &PaymentRef,
    to: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Vec<ExamPayment>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE exam_payments
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE payment_reference = $2 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(reference.as_str())
    .fetch_all(conn)
    .await
}

/// Derives the installment status of one enrolment: the completed total against the discounted amount due.
pub async fn exam_fee_status(
    student_exam_fee_id: &str,
    conn: &mut SqliteConnection,
) -> Result<StudentExamFeeStatus, LedgerError> {
    let fee = fetch_student_exam_fee_by_id(student_exam_fee_id, &mut *conn)
        .await?
        .ok_or_else(|| LedgerError::ExamFeeNotFound(student_exam_fee_id.to_string()))?;
    let total_paid = completed_total(student_exam_fee_id, conn).await?;
    let amount_due = fee.discounted_amount();
    Ok(StudentExamFeeStatus {
        student_exam_fee_id: fee.id,
        total_paid,
        amount_due,
        is_fully_paid: total_paid + SETTLEMENT_TOLERANCE >= amount_due,
    })
}

async fn completed_total(student_exam_fee_id: &str, conn: &mut SqliteConnection) -> Result<f64, sqlx::Error> {
    let (total,): (f64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount_paid), 0.0) FROM exam_payments WHERE student_exam_fee_id = $1 AND status = 'Completed'",
    )
    .bind(student_exam_fee_id)
    .fetch_one(conn)
    .await?;
    Ok(total)
}

/// Recomputes and persists the paid flag of one enrolment from its completed payments. Returns true if
/// the enrolment is now fully settled.
pub async fn recompute_paid_state(
    student_exam_fee_id: &str,
    reference: &PaymentRef,
    conn: &mut SqliteConnection,
) -> Result<bool, LedgerError> {
    let status = exam_fee_status(student_exam_fee_id, &mut *conn).await?;
    if status.is_fully_paid {
        sqlx::query(
            "UPDATE student_exam_fees SET paid = 1, payment_reference = $1 WHERE id = $2 AND paid = 0",
        )
        .bind(reference.as_str())
        .bind(student_exam_fee_id)
        .execute(conn)
        .await?;
    }
    Ok(status.is_fully_paid)
}

/// Enrols every student whose year group appears in the exam's applicable grades and who has no enrolment
/// yet. Returns the number of enrolments created.
pub async fn populate_student_exam_fees(exam_fee_id: &str, conn: &mut SqliteConnection) -> Result<usize, LedgerError> {
    let exam = fetch_exam_fee(exam_fee_id, &mut *conn)
        .await?
        .ok_or_else(|| LedgerError::ExamFeeNotFound(exam_fee_id.to_string()))?;
    if exam.applicable_grades.is_empty() {
        return Ok(0);
    }
    let mut builder = sqlx::QueryBuilder::new("SELECT id FROM students WHERE year_group IN (");
    let mut values = builder.separated(", ");
    for grade in &exam.applicable_grades {
        values.push_bind(grade);
    }
    builder.push(
        ") AND id NOT IN (SELECT student_id FROM student_exam_fees WHERE exam_fee_id = ",
    );
    builder.push_bind(exam_fee_id);
    builder.push(")");
    let eligible: Vec<(String,)> = builder.build_query_as().fetch_all(&mut *conn).await?;
    let amount = exam.amount + exam.extra_fees.unwrap_or(0.0);
    let mut created = 0;
    for (student_id,) in eligible {
        sqlx::query(
            r#"
                INSERT INTO student_exam_fees (id, student_id, exam_fee_id, amount)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (student_id, exam_fee_id) DO NOTHING;
            "#,
        )
        .bind(new_row_id())
        .bind(&student_id)
        .bind(exam_fee_id)
        .bind(amount)
        .execute(&mut *conn)
        .await?;
        created += 1;
    }
    Ok(created)
}
