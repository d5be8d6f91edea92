use chrono::{DateTime, NaiveDate, Utc};
use dealerbook_core::models::{
    BookingRecord, Dealer, ScheduleBookingRow, ScheduleRecord, ScheduleUsage, ServiceBooking,
    ServiceSchedule, StatusRow,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDealer {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub address: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStatus {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSchedule {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub schedule_date: NaiveDate,
    pub quota: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A schedule row joined with its dealer.
#[derive(Debug, Clone, FromRow)]
pub struct DbScheduleRecord {
    #[sqlx(flatten)]
    pub schedule: DbSchedule,
    pub dealer_name: String,
    pub dealer_address: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbScheduleUsage {
    #[sqlx(flatten)]
    pub record: DbScheduleRecord,
    pub booking_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub name: String,
    pub phone_no: String,
    pub vehicle_type: String,
    pub license_plate: String,
    pub vehicle_problem: String,
    pub service_schedule_id: Uuid,
    pub service_time: String,
    pub service_status_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booking row joined with its schedule date and dealer.
#[derive(Debug, Clone, FromRow)]
pub struct DbBookingRecord {
    #[sqlx(flatten)]
    pub booking: DbBooking,
    pub schedule_date: NaiveDate,
    pub dealer_name: String,
    pub dealer_address: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbScheduleBooking {
    pub id: Uuid,
    pub service_status_id: i32,
}

impl From<DbDealer> for Dealer {
    fn from(row: DbDealer) -> Self {
        Self {
            id: row.id,
            name: row.name,
            username: row.username,
            address: row.address,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DbStatus> for StatusRow {
    fn from(row: DbStatus) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

impl From<DbSchedule> for ServiceSchedule {
    fn from(row: DbSchedule) -> Self {
        Self {
            id: row.id,
            dealer_id: row.dealer_id,
            schedule_date: row.schedule_date,
            quota: row.quota,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DbScheduleRecord> for ScheduleRecord {
    fn from(row: DbScheduleRecord) -> Self {
        Self {
            schedule: row.schedule.into(),
            dealer_name: row.dealer_name,
            dealer_address: row.dealer_address,
        }
    }
}

impl From<DbScheduleUsage> for ScheduleUsage {
    fn from(row: DbScheduleUsage) -> Self {
        Self {
            record: row.record.into(),
            booking_count: row.booking_count,
        }
    }
}

impl From<DbBooking> for ServiceBooking {
    fn from(row: DbBooking) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone_no: row.phone_no,
            vehicle_type: row.vehicle_type,
            license_plate: row.license_plate,
            vehicle_problem: row.vehicle_problem,
            service_schedule_id: row.service_schedule_id,
            service_time: row.service_time,
            service_status_id: row.service_status_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DbBookingRecord> for BookingRecord {
    fn from(row: DbBookingRecord) -> Self {
        Self {
            booking: row.booking.into(),
            schedule_date: row.schedule_date,
            dealer_name: row.dealer_name,
            dealer_address: row.dealer_address,
        }
    }
}

impl From<DbScheduleBooking> for ScheduleBookingRow {
    fn from(row: DbScheduleBooking) -> Self {
        Self {
            id: row.id,
            service_status_id: row.service_status_id,
        }
    }
}
