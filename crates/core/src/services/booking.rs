//! Booking Workflow Engine.
//!
//! Every operation that changes a schedule's remaining quota runs inside one
//! [`QuotaTx`](crate::store::QuotaTx): the schedule row is locked before its
//! quota is read, so two admissions against the last unit cannot both pass.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::{storage, ServiceError, ServiceResult, StoreError};
use crate::models::{
    BookingDetail, BookingStatus, BookingStatusResponse, BookingView, CreateBookingRequest, Page,
    Pagination, UpdateBookingStatusRequest,
};
use crate::registry::{QuotaEffect, StatusTable};
use crate::store::SharedStore;

#[derive(Clone)]
pub struct BookingWorkflow {
    store: SharedStore,
    statuses: Arc<StatusTable>,
    clock: Clock,
}

impl BookingWorkflow {
    pub fn new(store: SharedStore, statuses: Arc<StatusTable>, clock: Clock) -> Self {
        Self {
            store,
            statuses,
            clock,
        }
    }

    /// Admits a booking against its schedule and takes one unit of quota.
    ///
    /// Checked in order: the schedule exists, it is dated after today, and it
    /// still has quota. The insert and the decrement commit together.
    pub async fn create_booking(&self, request: CreateBookingRequest) -> ServiceResult<BookingView> {
        const OP: &str = "create_booking";
        let booking = request.validate()?;
        let today = self.clock.today();

        let mut tx = self.store.begin().await.map_err(storage(OP))?;

        let schedule = tx
            .lock_schedule(booking.service_schedule_id)
            .await
            .map_err(storage(OP))?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Service schedule {} not found",
                    booking.service_schedule_id
                ))
            })?;

        if schedule.schedule_date <= today {
            return Err(ServiceError::InvalidState(
                "Bookings are only accepted for the next day or later".to_string(),
            ));
        }

        let remaining = tx
            .reserve_unit(schedule.id)
            .await
            .map_err(storage(OP))?
            .ok_or_else(|| ServiceError::CapacityExhausted("Service schedule quota is full".to_string()))?;

        let status = BookingStatus::INITIAL;
        let created = tx
            .insert_booking(&booking, self.statuses.id_of(status))
            .await
            .map_err(|err| match err {
                StoreError::UniqueViolation(_) => {
                    ServiceError::Conflict("A booking already exists for this schedule".to_string())
                }
                other => storage(OP)(other),
            })?;

        tx.commit().await.map_err(storage(OP))?;

        info!(
            booking_id = %created.id,
            schedule_id = %schedule.id,
            remaining,
            "booking admitted"
        );

        Ok(BookingView::new(created, status, schedule.schedule_date))
    }

    /// Newest bookings first, optionally narrowed by a partial license plate.
    pub async fn get_bookings(
        &self,
        pagination: Pagination,
        license_plate: Option<&str>,
    ) -> ServiceResult<Page<BookingView>> {
        let filter = license_plate
            .map(str::trim)
            .filter(|plate| !plate.is_empty())
            .map(str::to_string);

        let (records, total) = self
            .store
            .list_bookings(filter, pagination.limit, pagination.offset())
            .await
            .map_err(storage("get_bookings"))?;

        let rows = records
            .into_iter()
            .map(|record| {
                let status = self.statuses.status_of(record.booking.service_status_id)?;
                Ok(BookingView::new(record.booking, status, record.schedule_date))
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(pagination.page_of(rows, total))
    }

    pub async fn get_booking_by_id(&self, id: Uuid) -> ServiceResult<BookingDetail> {
        let record = self
            .store
            .find_booking(id)
            .await
            .map_err(storage("get_booking_by_id"))?
            .ok_or_else(|| booking_not_found(id))?;

        let status = self.statuses.status_of(record.booking.service_status_id)?;

        Ok(BookingDetail {
            booking: BookingView::new(record.booking, status, record.schedule_date),
            dealer_name: record.dealer_name,
            dealer_address: record.dealer_address,
        })
    }

    /// Moves a booking to `request.status` and reconciles the schedule quota.
    ///
    /// Leaving the cancelled state re-reserves through the same guarded
    /// primitive as admission, so it fails with `CapacityExhausted` instead of
    /// driving the quota below zero.
    pub async fn update_booking_status(
        &self,
        id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> ServiceResult<BookingStatusResponse> {
        const OP: &str = "update_booking_status";
        let next = BookingStatus::parse(&request.status).ok_or_else(|| {
            ServiceError::InvalidInput(format!("Invalid booking status '{}'", request.status))
        })?;

        let mut tx = self.store.begin().await.map_err(storage(OP))?;

        let booking = tx
            .lock_booking(id)
            .await
            .map_err(storage(OP))?
            .ok_or_else(|| booking_not_found(id))?;
        let previous = self.statuses.status_of(booking.service_status_id)?;
        let schedule_id = booking.service_schedule_id;

        match QuotaEffect::of_transition(previous, next) {
            QuotaEffect::Release => {
                tx.lock_schedule(schedule_id).await.map_err(storage(OP))?;
                let quota = tx.release_unit(schedule_id).await.map_err(storage(OP))?;
                debug!(%schedule_id, quota, "quota released by cancellation");
            }
            QuotaEffect::Reserve => {
                tx.lock_schedule(schedule_id).await.map_err(storage(OP))?;
                let quota = tx
                    .reserve_unit(schedule_id)
                    .await
                    .map_err(storage(OP))?
                    .ok_or_else(|| {
                        ServiceError::CapacityExhausted(
                            "Service schedule quota is full; booking cannot be reinstated".to_string(),
                        )
                    })?;
                debug!(%schedule_id, quota, "quota re-reserved by reinstatement");
            }
            QuotaEffect::Unchanged => {}
        }

        let updated = tx
            .set_booking_status(id, self.statuses.id_of(next))
            .await
            .map_err(storage(OP))?;

        tx.commit().await.map_err(storage(OP))?;

        info!(booking_id = %id, from = %previous, to = %next, "booking status changed");

        Ok(BookingStatusResponse {
            id: updated.id,
            status: next,
            updated_at: updated.updated_at,
        })
    }

    /// Hard-deletes a booking. A booking that still held a unit of quota gives
    /// it back in the same transaction.
    pub async fn delete_booking(&self, id: Uuid) -> ServiceResult<()> {
        const OP: &str = "delete_booking";
        let mut tx = self.store.begin().await.map_err(storage(OP))?;

        let booking = tx
            .lock_booking(id)
            .await
            .map_err(storage(OP))?
            .ok_or_else(|| booking_not_found(id))?;
        let status = self.statuses.status_of(booking.service_status_id)?;

        if status.is_quota_consuming() {
            let schedule_id = booking.service_schedule_id;
            tx.lock_schedule(schedule_id).await.map_err(storage(OP))?;
            let quota = tx.release_unit(schedule_id).await.map_err(storage(OP))?;
            debug!(%schedule_id, quota, "quota released by deletion");
        }

        tx.delete_booking(id).await.map_err(storage(OP))?;
        tx.commit().await.map_err(storage(OP))?;

        info!(booking_id = %id, "booking deleted");
        Ok(())
    }
}

fn booking_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Booking {id} not found"))
}
