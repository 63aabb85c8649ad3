use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{Club, ClubMembership};

pub async fn fetch_club(club_id: &str, conn: &mut SqliteConnection) -> Result<Option<Club>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM clubs WHERE id = $1").bind(club_id).fetch_optional(conn).await
}

pub async fn fetch_memberships_for_student(
    student_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<ClubMembership>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM club_memberships WHERE student_id = $1 ORDER BY id")
        .bind(student_id)
        .fetch_all(conn)
        .await
}

/// Records a pending club signup. A student holds at most one membership per club, so a repeated signup
/// leaves the existing row (and its confirmation state) untouched.
pub async fn idempotent_insert_membership(
    student_id: &str,
    club_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO club_memberships (student_id, club_id, payment_confirmed, status)
            VALUES ($1, $2, 0, 'pending')
            ON CONFLICT (student_id, club_id) DO NOTHING;
        "#,
    )
    .bind(student_id)
    .bind(club_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Confirms memberships for one student. When `club_ids` is given, only those clubs are confirmed;
/// otherwise every unconfirmed membership of the student is. Returns the number confirmed.
pub async fn confirm_memberships(
    student_id: &str,
    club_ids: Option<&[String]>,
    conn: &mut SqliteConnection,
) -> Result<usize, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        "UPDATE club_memberships SET payment_confirmed = 1, status = 'active' WHERE payment_confirmed = 0 AND student_id = ",
    );
    builder.push_bind(student_id);
    if let Some(clubs) = club_ids {
        if clubs.is_empty() {
            return Ok(0);
        }
        builder.push(" AND club_id IN (");
        let mut values = builder.separated(", ");
        for id in clubs {
            values.push_bind(id);
        }
        builder.push(")");
    }
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected() as usize)
}
