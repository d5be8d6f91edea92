use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::BookingStatus;

/// A dated capacity slot published by one dealer.
///
/// `quota` is the remaining number of reservable units: it is decremented on
/// admission and incremented when a booking stops consuming capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchedule {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub schedule_date: NaiveDate,
    pub quota: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A schedule joined with its owning dealer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRecord {
    pub schedule: ServiceSchedule,
    pub dealer_name: String,
    pub dealer_address: String,
}

/// A schedule joined with its dealer and the number of bookings referencing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleUsage {
    pub record: ScheduleRecord,
    pub booking_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleBookingRow {
    pub id: Uuid,
    pub service_status_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub schedule_date: String,
    pub quota: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateScheduleRequest {
    pub schedule_date: Option<String>,
    pub quota: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSchedule {
    pub id: Uuid,
    pub schedule_date: NaiveDate,
    pub quota: i32,
    pub dealer_name: String,
    pub dealer_address: String,
}

impl From<ScheduleRecord> for AvailableSchedule {
    fn from(record: ScheduleRecord) -> Self {
        Self {
            id: record.schedule.id,
            schedule_date: record.schedule.schedule_date,
            quota: record.schedule.quota,
            dealer_name: record.dealer_name,
            dealer_address: record.dealer_address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub schedule_date: NaiveDate,
    pub quota: i32,
    pub dealer_name: String,
    pub dealer_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduleRecord> for ScheduleResponse {
    fn from(record: ScheduleRecord) -> Self {
        Self {
            id: record.schedule.id,
            schedule_date: record.schedule.schedule_date,
            quota: record.schedule.quota,
            dealer_name: record.dealer_name,
            dealer_address: record.dealer_address,
            created_at: record.schedule.created_at,
            updated_at: record.schedule.updated_at,
        }
    }
}

/// A dealer's own schedule with derived usage figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealerScheduleSummary {
    pub id: Uuid,
    pub schedule_date: NaiveDate,
    /// Remaining reservable units.
    pub quota: i32,
    /// Bookings of any status that reference the schedule.
    pub used_quota: i64,
    /// `quota - used_quota`. `quota` already excludes active bookings, so they
    /// are counted twice here. This is the published figure and is intended.
    pub available_quota: i64,
    pub dealer_name: String,
    pub dealer_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduleUsage> for DealerScheduleSummary {
    fn from(usage: ScheduleUsage) -> Self {
        let ScheduleUsage { record, booking_count } = usage;
        Self {
            id: record.schedule.id,
            schedule_date: record.schedule.schedule_date,
            quota: record.schedule.quota,
            used_quota: booking_count,
            available_quota: i64::from(record.schedule.quota) - booking_count,
            dealer_name: record.dealer_name,
            dealer_address: record.dealer_address,
            created_at: record.schedule.created_at,
            updated_at: record.schedule.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleBookingEntry {
    pub id: Uuid,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDetail {
    pub id: Uuid,
    pub schedule_date: NaiveDate,
    pub quota: i32,
    pub used_quota: i64,
    /// Same derivation as [`DealerScheduleSummary::available_quota`]: bookings
    /// are deliberately subtracted from the already-decremented `quota`.
    pub available_quota: i64,
    pub dealer_name: String,
    pub dealer_address: String,
    pub bookings: Vec<ScheduleBookingEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleDetail {
    pub fn new(record: ScheduleRecord, bookings: Vec<ScheduleBookingEntry>) -> Self {
        let used = bookings.len() as i64;
        Self {
            id: record.schedule.id,
            schedule_date: record.schedule.schedule_date,
            quota: record.schedule.quota,
            used_quota: used,
            available_quota: i64::from(record.schedule.quota) - used,
            dealer_name: record.dealer_name,
            dealer_address: record.dealer_address,
            bookings,
            created_at: record.schedule.created_at,
            updated_at: record.schedule.updated_at,
        }
    }
}
