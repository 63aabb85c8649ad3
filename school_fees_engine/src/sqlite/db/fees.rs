use sqlx::SqliteConnection;

use crate::db_types::Fee;

pub async fn fetch_fee_schedule(conn: &mut SqliteConnection) -> Result<Vec<Fee>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM fees ORDER BY code").fetch_all(conn).await
}
