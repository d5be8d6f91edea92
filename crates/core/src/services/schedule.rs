//! Schedule publication and the availability read side.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate};
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::{storage, ServiceError, ServiceResult, StoreError};
use crate::models::{
    AvailableSchedule, CreateScheduleRequest, DealerScheduleSummary, Page, Pagination,
    ScheduleBookingEntry, ScheduleDetail, ScheduleResponse, UpdateScheduleRequest,
};
use crate::registry::StatusTable;
use crate::store::SharedStore;

#[derive(Clone)]
pub struct ScheduleService {
    store: SharedStore,
    statuses: Arc<StatusTable>,
    clock: Clock,
}

impl ScheduleService {
    pub fn new(store: SharedStore, statuses: Arc<StatusTable>, clock: Clock) -> Self {
        Self {
            store,
            statuses,
            clock,
        }
    }

    /// Schedules that can still take a booking, from today onwards.
    ///
    /// With a `date` filter only that calendar day is listed. Ordered by date,
    /// then by remaining quota so the most contested slots come first.
    pub async fn get_available_schedules(
        &self,
        date: Option<&str>,
    ) -> ServiceResult<Vec<AvailableSchedule>> {
        let today = self.clock.today();
        let (from, until) = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => {
                let day = parse_date(raw)?;
                (day.max(today), day.checked_add_days(Days::new(1)))
            }
            None => (today, None),
        };

        let records = self
            .store
            .list_available_schedules(from, until)
            .await
            .map_err(storage("get_available_schedules"))?;

        Ok(records.into_iter().map(AvailableSchedule::from).collect())
    }

    pub async fn create_schedule(
        &self,
        dealer_id: Uuid,
        request: CreateScheduleRequest,
    ) -> ServiceResult<ScheduleResponse> {
        let schedule_date = parse_date(&request.schedule_date)?;
        self.ensure_not_past(schedule_date)?;

        if request.quota <= 0 {
            return Err(ServiceError::InvalidInput(
                "Quota must be a positive integer".to_string(),
            ));
        }
        let quota = quota_value(request.quota)?;

        let record = self
            .store
            .insert_schedule(dealer_id, schedule_date, quota)
            .await
            .map_err(|err| duplicate_date(err, "create_schedule"))?;

        info!(schedule_id = %record.schedule.id, %dealer_id, %schedule_date, quota, "schedule created");
        Ok(record.into())
    }

    /// Partial update of date and quota. The quota is taken as given; it is not
    /// compared with how many bookings the schedule already holds.
    pub async fn update_schedule(
        &self,
        id: Uuid,
        dealer_id: Uuid,
        request: UpdateScheduleRequest,
    ) -> ServiceResult<ScheduleResponse> {
        const OP: &str = "update_schedule";
        let owned = self
            .store
            .find_schedule(id)
            .await
            .map_err(storage(OP))?
            .filter(|record| record.schedule.dealer_id == dealer_id);
        if owned.is_none() {
            return Err(schedule_not_found(id));
        }

        let schedule_date = match request.schedule_date.as_deref() {
            Some(raw) => {
                let date = parse_date(raw)?;
                self.ensure_not_past(date)?;
                Some(date)
            }
            None => None,
        };

        let quota = match request.quota {
            Some(q) if q < 0 => {
                return Err(ServiceError::InvalidInput(
                    "Quota must be a non-negative integer".to_string(),
                ))
            }
            Some(q) => Some(quota_value(q)?),
            None => None,
        };

        let record = self
            .store
            .update_schedule(id, schedule_date, quota)
            .await
            .map_err(|err| duplicate_date(err, OP))?
            .ok_or_else(|| schedule_not_found(id))?;

        info!(schedule_id = %id, quota = record.schedule.quota, "schedule updated");
        Ok(record.into())
    }

    /// Removes a schedule that no booking references, whatever the booking's status.
    pub async fn delete_schedule(&self, id: Uuid, dealer_id: Uuid) -> ServiceResult<()> {
        const OP: &str = "delete_schedule";
        let mut tx = self.store.begin().await.map_err(storage(OP))?;

        tx.lock_schedule(id)
            .await
            .map_err(storage(OP))?
            .filter(|schedule| schedule.dealer_id == dealer_id)
            .ok_or_else(|| schedule_not_found(id))?;

        let bookings = tx.count_schedule_bookings(id).await.map_err(storage(OP))?;
        if bookings > 0 {
            return Err(ServiceError::InvalidState(format!(
                "Schedule has {bookings} booking(s) and cannot be deleted"
            )));
        }

        tx.delete_schedule(id).await.map_err(storage(OP))?;
        tx.commit().await.map_err(storage(OP))?;

        info!(schedule_id = %id, %dealer_id, "schedule deleted");
        Ok(())
    }

    pub async fn get_all_schedules(
        &self,
        dealer_id: Uuid,
        pagination: Pagination,
    ) -> ServiceResult<Page<DealerScheduleSummary>> {
        let (rows, total) = self
            .store
            .list_dealer_schedules(dealer_id, pagination.limit, pagination.offset())
            .await
            .map_err(storage("get_all_schedules"))?;

        let rows = rows.into_iter().map(DealerScheduleSummary::from).collect();
        Ok(pagination.page_of(rows, total))
    }

    /// A dealer's own schedule with its bookings. Someone else's schedule is
    /// reported exactly like a missing one.
    pub async fn get_schedule_by_id(&self, id: Uuid, dealer_id: Uuid) -> ServiceResult<ScheduleDetail> {
        let (record, rows) = self
            .store
            .find_dealer_schedule(id, dealer_id)
            .await
            .map_err(storage("get_schedule_by_id"))?
            .ok_or_else(|| schedule_not_found(id))?;

        let bookings = rows
            .into_iter()
            .map(|row| {
                Ok(ScheduleBookingEntry {
                    id: row.id,
                    status: self.statuses.status_of(row.service_status_id)?,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(ScheduleDetail::new(record, bookings))
    }

    fn ensure_not_past(&self, date: NaiveDate) -> ServiceResult<()> {
        if date < self.clock.today() {
            return Err(ServiceError::InvalidInput(
                "Schedule date cannot be in the past".to_string(),
            ));
        }
        Ok(())
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only its date.
pub fn parse_date(raw: &str) -> ServiceResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.date_naive()))
        .map_err(|_| ServiceError::InvalidInput(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

fn quota_value(quota: i64) -> ServiceResult<i32> {
    i32::try_from(quota).map_err(|_| ServiceError::InvalidInput(format!("Quota {quota} is too large")))
}

fn duplicate_date(err: StoreError, operation: &'static str) -> ServiceError {
    match err {
        StoreError::UniqueViolation(_) => {
            ServiceError::Conflict("Schedule already exists for this date".to_string())
        }
        other => storage(operation)(other),
    }
}

fn schedule_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Service schedule {id} not found"))
}
