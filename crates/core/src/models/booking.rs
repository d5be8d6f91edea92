use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::BookingStatus;
use crate::errors::{ServiceError, ServiceResult};

/// A customer reservation against one schedule, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBooking {
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

/// A booking joined with its schedule date and the schedule's dealer.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub booking: ServiceBooking,
    pub schedule_date: NaiveDate,
    pub dealer_name: String,
    pub dealer_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_no: String,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub vehicle_problem: String,
    #[serde(default)]
    pub service_schedule_id: Option<Uuid>,
    #[serde(default)]
    pub service_time: String,
}

/// Validated booking input with every text field trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub name: String,
    pub phone_no: String,
    pub vehicle_type: String,
    pub license_plate: String,
    pub vehicle_problem: String,
    pub service_schedule_id: Uuid,
    pub service_time: String,
}

impl CreateBookingRequest {
    /// Trims every field and reports all missing ones at once.
    pub fn validate(self) -> ServiceResult<NewBooking> {
        let mut missing = Vec::new();
        let mut take = |field: &'static str, value: String| {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                missing.push(field);
            }
            trimmed
        };

        let name = take("name", self.name);
        let phone_no = take("phone_no", self.phone_no);
        let vehicle_type = take("vehicle_type", self.vehicle_type);
        let license_plate = take("license_plate", self.license_plate);
        let vehicle_problem = take("vehicle_problem", self.vehicle_problem);
        let service_time = take("service_time", self.service_time);

        if self.service_schedule_id.is_none() {
            missing.push("service_schedule_id");
        }

        match self.service_schedule_id {
            Some(service_schedule_id) if missing.is_empty() => Ok(NewBooking {
                name,
                phone_no,
                vehicle_type,
                license_plate,
                vehicle_problem,
                service_schedule_id,
                service_time,
            }),
            _ => Err(ServiceError::InvalidInput(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// A booking enriched with its resolved status and schedule date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingView {
    pub id: Uuid,
    pub name: String,
    pub phone_no: String,
    pub vehicle_type: String,
    pub license_plate: String,
    pub vehicle_problem: String,
    pub service_schedule_id: Uuid,
    pub service_time: String,
    pub status: BookingStatus,
    pub schedule_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingView {
    pub fn new(booking: ServiceBooking, status: BookingStatus, schedule_date: NaiveDate) -> Self {
        Self {
            id: booking.id,
            name: booking.name,
            phone_no: booking.phone_no,
            vehicle_type: booking.vehicle_type,
            license_plate: booking.license_plate,
            vehicle_problem: booking.vehicle_problem,
            service_schedule_id: booking.service_schedule_id,
            service_time: booking.service_time,
            status,
            schedule_date,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// A booking view that also names the dealer running the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: BookingView,
    pub dealer_name: String,
    pub dealer_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusResponse {
    pub id: Uuid,
    pub status: BookingStatus,
    pub updated_at: DateTime<Utc>,
}
