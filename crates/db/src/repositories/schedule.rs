use super::SCHEDULE_RECORD_COLUMNS;
use crate::models::{DbSchedule, DbScheduleBooking, DbScheduleRecord, DbScheduleUsage};
use chrono::{NaiveDate, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_schedule<'e>(
    executor: impl PgExecutor<'e>,
    dealer_id: Uuid,
    schedule_date: NaiveDate,
    quota: i32,
) -> sqlx::Result<DbScheduleRecord> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(%id, %dealer_id, %schedule_date, quota, "creating schedule");

    let sql = format!(
        r#"
        WITH s AS (
            INSERT INTO service_schedules (id, dealer_id, schedule_date, quota, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
        )
        SELECT {SCHEDULE_RECORD_COLUMNS}
        FROM s
        JOIN dealers d ON d.id = s.dealer_id
        "#
    );

    sqlx::query_as::<_, DbScheduleRecord>(&sql)
        .bind(id)
        .bind(dealer_id)
        .bind(schedule_date)
        .bind(quota)
        .bind(now)
        .fetch_one(executor)
        .await
}

pub async fn get_schedule_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> sqlx::Result<Option<DbScheduleRecord>> {
    let sql = format!(
        r#"
        SELECT {SCHEDULE_RECORD_COLUMNS}
        FROM service_schedules s
        JOIN dealers d ON d.id = s.dealer_id
        WHERE s.id = $1
        "#
    );

    sqlx::query_as::<_, DbScheduleRecord>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Overwrites only the provided fields.
pub async fn update_schedule<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    schedule_date: Option<NaiveDate>,
    quota: Option<i32>,
) -> sqlx::Result<Option<DbScheduleRecord>> {
    let sql = format!(
        r#"
        WITH s AS (
            UPDATE service_schedules
            SET schedule_date = COALESCE($2, schedule_date),
                quota = COALESCE($3, quota),
                updated_at = $4
            WHERE id = $1
            RETURNING *
        )
        SELECT {SCHEDULE_RECORD_COLUMNS}
        FROM s
        JOIN dealers d ON d.id = s.dealer_id
        "#
    );

    sqlx::query_as::<_, DbScheduleRecord>(&sql)
        .bind(id)
        .bind(schedule_date)
        .bind(quota)
        .bind(Utc::now())
        .fetch_optional(executor)
        .await
}

pub async fn get_available_schedules<'e>(
    executor: impl PgExecutor<'e>,
    from: NaiveDate,
    until: Option<NaiveDate>,
) -> sqlx::Result<Vec<DbScheduleRecord>> {
    let sql = format!(
        r#"
        SELECT {SCHEDULE_RECORD_COLUMNS}
        FROM service_schedules s
        JOIN dealers d ON d.id = s.dealer_id
        WHERE s.quota > 0
          AND s.schedule_date >= $1
          AND ($2::date IS NULL OR s.schedule_date < $2)
        ORDER BY s.schedule_date ASC, s.quota ASC
        "#
    );

    sqlx::query_as::<_, DbScheduleRecord>(&sql)
        .bind(from)
        .bind(until)
        .fetch_all(executor)
        .await
}

pub async fn get_dealer_schedules<'e>(
    executor: impl PgExecutor<'e>,
    dealer_id: Uuid,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<DbScheduleUsage>> {
    let sql = format!(
        r#"
        SELECT {SCHEDULE_RECORD_COLUMNS}, COUNT(b.id) AS booking_count
        FROM service_schedules s
        JOIN dealers d ON d.id = s.dealer_id
        LEFT JOIN service_bookings b ON b.service_schedule_id = s.id
        WHERE s.dealer_id = $1
        GROUP BY s.id, d.id
        ORDER BY s.schedule_date ASC
        LIMIT $2 OFFSET $3
        "#
    );

    sqlx::query_as::<_, DbScheduleUsage>(&sql)
        .bind(dealer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn count_dealer_schedules<'e>(
    executor: impl PgExecutor<'e>,
    dealer_id: Uuid,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM service_schedules WHERE dealer_id = $1")
        .bind(dealer_id)
        .fetch_one(executor)
        .await
}

pub async fn get_dealer_schedule<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    dealer_id: Uuid,
) -> sqlx::Result<Option<DbScheduleRecord>> {
    let sql = format!(
        r#"
        SELECT {SCHEDULE_RECORD_COLUMNS}
        FROM service_schedules s
        JOIN dealers d ON d.id = s.dealer_id
        WHERE s.id = $1 AND s.dealer_id = $2
        "#
    );

    sqlx::query_as::<_, DbScheduleRecord>(&sql)
        .bind(id)
        .bind(dealer_id)
        .fetch_optional(executor)
        .await
}

pub async fn get_schedule_bookings<'e>(
    executor: impl PgExecutor<'e>,
    schedule_id: Uuid,
) -> sqlx::Result<Vec<DbScheduleBooking>> {
    sqlx::query_as::<_, DbScheduleBooking>(
        r#"
        SELECT id, service_status_id
        FROM service_bookings
        WHERE service_schedule_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(schedule_id)
    .fetch_all(executor)
    .await
}

/// Reads a schedule and holds a row lock on it until the transaction ends.
pub async fn lock_schedule<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> sqlx::Result<Option<DbSchedule>> {
    sqlx::query_as::<_, DbSchedule>(
        r#"
        SELECT id, dealer_id, schedule_date, quota, created_at, updated_at
        FROM service_schedules
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Decrements the quota only while it is positive. `None` means nothing was left.
pub async fn take_quota_unit<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> sqlx::Result<Option<i32>> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE service_schedules
        SET quota = quota - 1, updated_at = $2
        WHERE id = $1 AND quota > 0
        RETURNING quota
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

pub async fn return_quota_unit<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE service_schedules
        SET quota = quota + 1, updated_at = $2
        WHERE id = $1
        RETURNING quota
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

pub async fn count_schedule_bookings<'e>(
    executor: impl PgExecutor<'e>,
    schedule_id: Uuid,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM service_bookings WHERE service_schedule_id = $1",
    )
    .bind(schedule_id)
    .fetch_one(executor)
    .await
}

pub async fn delete_schedule<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM service_schedules WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}
