use super::BOOKING_RECORD_COLUMNS;
use crate::models::{DbBooking, DbBookingRecord};
use chrono::Utc;
use dealerbook_core::models::NewBooking;
use sqlx::PgExecutor;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = r#"
    id, name, phone_no, vehicle_type, license_plate, vehicle_problem,
    service_schedule_id, service_time, service_status_id, created_at, updated_at
"#;

pub async fn create_booking<'e>(
    executor: impl PgExecutor<'e>,
    booking: &NewBooking,
    status_id: i32,
) -> sqlx::Result<DbBooking> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let sql = format!(
        r#"
        INSERT INTO service_bookings (
            id, name, phone_no, vehicle_type, license_plate, vehicle_problem,
            service_schedule_id, service_time, service_status_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING {BOOKING_COLUMNS}
        "#
    );

    sqlx::query_as::<_, DbBooking>(&sql)
        .bind(id)
        .bind(&booking.name)
        .bind(&booking.phone_no)
        .bind(&booking.vehicle_type)
        .bind(&booking.license_plate)
        .bind(&booking.vehicle_problem)
        .bind(booking.service_schedule_id)
        .bind(&booking.service_time)
        .bind(status_id)
        .bind(now)
        .fetch_one(executor)
        .await
}

/// Newest first. `license_plate` is matched case-insensitively as a literal
/// substring; `%` and `_` carry no pattern meaning.
pub async fn get_bookings<'e>(
    executor: impl PgExecutor<'e>,
    license_plate: Option<&str>,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<DbBookingRecord>> {
    let sql = format!(
        r#"
        SELECT {BOOKING_RECORD_COLUMNS}
        FROM service_bookings b
        JOIN service_schedules s ON s.id = b.service_schedule_id
        JOIN dealers d ON d.id = s.dealer_id
        WHERE ($1::text IS NULL OR strpos(lower(b.license_plate), lower($1)) > 0)
        ORDER BY b.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );

    sqlx::query_as::<_, DbBookingRecord>(&sql)
        .bind(license_plate)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn count_bookings<'e>(
    executor: impl PgExecutor<'e>,
    license_plate: Option<&str>,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM service_bookings
        WHERE ($1::text IS NULL OR strpos(lower(license_plate), lower($1)) > 0)
        "#,
    )
    .bind(license_plate)
    .fetch_one(executor)
    .await
}

pub async fn get_booking_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> sqlx::Result<Option<DbBookingRecord>> {
    let sql = format!(
        r#"
        SELECT {BOOKING_RECORD_COLUMNS}
        FROM service_bookings b
        JOIN service_schedules s ON s.id = b.service_schedule_id
        JOIN dealers d ON d.id = s.dealer_id
        WHERE b.id = $1
        "#
    );

    sqlx::query_as::<_, DbBookingRecord>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Reads a booking and holds a row lock on it until the transaction ends.
pub async fn lock_booking<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> sqlx::Result<Option<DbBooking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM service_bookings WHERE id = $1 FOR UPDATE");

    sqlx::query_as::<_, DbBooking>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn update_booking_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status_id: i32,
) -> sqlx::Result<DbBooking> {
    let sql = format!(
        r#"
        UPDATE service_bookings
        SET service_status_id = $2, updated_at = $3
        WHERE id = $1
        RETURNING {BOOKING_COLUMNS}
        "#
    );

    sqlx::query_as::<_, DbBooking>(&sql)
        .bind(id)
        .bind(status_id)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
}

pub async fn delete_booking<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM service_bookings WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}
