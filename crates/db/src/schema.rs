use dealerbook_core::StatusTable;
use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create dealers table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dealers (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            username VARCHAR(255) NOT NULL UNIQUE,
            address TEXT NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create service_statuses table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_statuses (
            id INTEGER PRIMARY KEY,
            name VARCHAR(64) NOT NULL UNIQUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create service_schedules table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_schedules (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
            schedule_date DATE NOT NULL,
            quota INTEGER NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT service_schedules_dealer_id_schedule_date_key UNIQUE (dealer_id, schedule_date),
            CONSTRAINT non_negative_quota CHECK (quota >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create service_bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            phone_no VARCHAR(64) NOT NULL,
            vehicle_type VARCHAR(128) NOT NULL,
            license_plate VARCHAR(32) NOT NULL,
            vehicle_problem TEXT NOT NULL,
            service_schedule_id UUID NOT NULL REFERENCES service_schedules(id),
            service_time VARCHAR(64) NOT NULL,
            service_status_id INTEGER NOT NULL REFERENCES service_statuses(id),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_service_schedules_date ON service_schedules(schedule_date)",
        "CREATE INDEX IF NOT EXISTS idx_service_bookings_schedule_id ON service_bookings(service_schedule_id)",
        "CREATE INDEX IF NOT EXISTS idx_service_bookings_created_at ON service_bookings(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_service_bookings_license_plate ON service_bookings(license_plate)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    seed_statuses(pool).await?;

    info!("Database schema initialized successfully.");
    Ok(())
}

/// Writes the booking status reference rows. Existing rows are left untouched.
pub async fn seed_statuses(pool: &Pool<Postgres>) -> Result<()> {
    for row in StatusTable::seed_rows() {
        sqlx::query(
            r#"
            INSERT INTO service_statuses (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .execute(pool)
        .await?;
    }

    info!("Booking statuses seeded.");
    Ok(())
}
