use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Parent, Student},
    traits::FeeApiError,
};

pub async fn fetch_parent(parent_id: &str, conn: &mut SqliteConnection) -> Result<Option<Parent>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM parents WHERE id = $1").bind(parent_id).fetch_optional(conn).await
}

/// Fetches the given students, preserving the order of `student_ids`. Every id must resolve; the first id
/// without a matching row is reported as [`FeeApiError::StudentNotFound`].
pub async fn fetch_students(student_ids: &[String], conn: &mut SqliteConnection) -> Result<Vec<Student>, FeeApiError> {
    if student_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM students WHERE id IN (");
    let mut values = builder.separated(", ");
    for id in student_ids {
        values.push_bind(id);
    }
    builder.push(")");
    let rows: Vec<Student> = builder.build_query_as().fetch_all(conn).await?;
    let mut result = Vec::with_capacity(student_ids.len());
    for id in student_ids {
        let student = rows
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| FeeApiError::StudentNotFound(id.clone()))?;
        result.push(student);
    }
    Ok(result)
}

/// Sets the `school_fees_paid` flag on the given students. Returns the number of students flagged for the
/// first time.
pub async fn mark_school_fees_paid(student_ids: &[String], conn: &mut SqliteConnection) -> Result<usize, sqlx::Error> {
    if student_ids.is_empty() {
        return Ok(0);
    }
    let mut builder =
        QueryBuilder::new("UPDATE students SET school_fees_paid = 1 WHERE school_fees_paid = 0 AND id IN (");
    let mut values = builder.separated(", ");
    for id in student_ids {
        values.push_bind(id);
    }
    builder.push(")");
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected() as usize)
}
