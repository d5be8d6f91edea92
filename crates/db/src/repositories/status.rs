use crate::models::DbStatus;
use sqlx::PgExecutor;

pub async fn list_statuses<'e>(executor: impl PgExecutor<'e>) -> sqlx::Result<Vec<DbStatus>> {
    sqlx::query_as::<_, DbStatus>(
        r#"
        SELECT id, name
        FROM service_statuses
        ORDER BY id ASC
        "#,
    )
    .fetch_all(executor)
    .await
}
