use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{PaymentRef, StudentFee};

/// Fetches the unpaid fee assignments for the given students.
pub async fn fetch_unpaid_for_students(
    student_ids: &[String],
    conn: &mut SqliteConnection,
) -> Result<Vec<StudentFee>, sqlx::Error> {
    if student_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM student_fees WHERE paid = 0 AND student_id IN (");
    let mut values = builder.separated(", ");
    for id in student_ids {
        values.push_bind(id);
    }
    builder.push(")");
    builder.build_query_as().fetch_all(conn).await
}

/// Marks the given fee rows paid, recording the reference that settled them. Rows already paid are left
/// untouched so that the settling reference is never overwritten. Returns the number marked.
pub async fn mark_paid(
    student_fee_ids: &[String],
    reference: &PaymentRef,
    conn: &mut SqliteConnection,
) -> Result<usize, sqlx::Error> {
    if student_fee_ids.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::new("UPDATE student_fees SET paid = 1, payment_reference = ");
    builder.push_bind(reference.as_str());
    builder.push(" WHERE paid = 0 AND id IN (");
    let mut values = builder.separated(", ");
    for id in student_fee_ids {
        values.push_bind(id);
    }
    builder.push(")");
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected() as usize)
}
