use crate::models::DbDealer;
use chrono::Utc;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_dealer<'e>(
    executor: impl PgExecutor<'e>,
    name: &str,
    username: &str,
    address: &str,
    password_hash: &str,
) -> sqlx::Result<DbDealer> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(%id, username, "creating dealer");

    sqlx::query_as::<_, DbDealer>(
        r#"
        INSERT INTO dealers (id, name, username, address, password_hash, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING id, name, username, address, password_hash, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(username)
    .bind(address)
    .bind(password_hash)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn get_dealer_by_username<'e>(
    executor: impl PgExecutor<'e>,
    username: &str,
) -> sqlx::Result<Option<DbDealer>> {
    sqlx::query_as::<_, DbDealer>(
        r#"
        SELECT id, name, username, address, password_hash, created_at, updated_at
        FROM dealers
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(executor)
    .await
}

pub async fn get_dealer_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> sqlx::Result<Option<DbDealer>> {
    sqlx::query_as::<_, DbDealer>(
        r#"
        SELECT id, name, username, address, password_hash, created_at, updated_at
        FROM dealers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
