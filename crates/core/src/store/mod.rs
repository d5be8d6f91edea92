//! Persistence boundary.
//!
//! The engines only ever touch storage through these traits. Reads go through
//! the repository traits; every write that affects a schedule's quota or its
//! booking set goes through a [`QuotaTx`], which holds row locks on what it has
//! read until [`QuotaTx::commit`] and discards its writes if dropped.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::models::{
    BookingRecord, Dealer, NewBooking, NewDealer, ScheduleBookingRow, ScheduleRecord,
    ScheduleUsage, ServiceBooking, ServiceSchedule, StatusRow,
};

pub use memory::MemoryStore;

#[async_trait]
pub trait DealerRepository: Send + Sync {
    async fn insert_dealer(&self, dealer: NewDealer) -> StoreResult<Dealer>;

    async fn find_dealer_by_username(&self, username: &str) -> StoreResult<Option<Dealer>>;

    async fn find_dealer_by_id(&self, id: Uuid) -> StoreResult<Option<Dealer>>;
}

#[async_trait]
pub trait StatusRepository: Send + Sync {
    async fn list_statuses(&self) -> StoreResult<Vec<StatusRow>>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn insert_schedule(
        &self,
        dealer_id: Uuid,
        schedule_date: NaiveDate,
        quota: i32,
    ) -> StoreResult<ScheduleRecord>;

    async fn find_schedule(&self, id: Uuid) -> StoreResult<Option<ScheduleRecord>>;

    /// Applies the provided fields. Returns `None` when the schedule is gone.
    async fn update_schedule(
        &self,
        id: Uuid,
        schedule_date: Option<NaiveDate>,
        quota: Option<i32>,
    ) -> StoreResult<Option<ScheduleRecord>>;

    /// Schedules with `quota > 0` dated in `[from, until)`, or from `from`
    /// onwards when `until` is `None`. Ordered by date, then remaining quota.
    async fn list_available_schedules(
        &self,
        from: NaiveDate,
        until: Option<NaiveDate>,
    ) -> StoreResult<Vec<ScheduleRecord>>;

    /// One page of a dealer's schedules ordered by date, plus the total count.
    async fn list_dealer_schedules(
        &self,
        dealer_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> StoreResult<(Vec<ScheduleUsage>, u64)>;

    async fn find_dealer_schedule(
        &self,
        id: Uuid,
        dealer_id: Uuid,
    ) -> StoreResult<Option<(ScheduleRecord, Vec<ScheduleBookingRow>)>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// One page of bookings, newest first, plus the total matching count.
    /// `license_plate` matches case-insensitively and literally anywhere in the plate.
    async fn list_bookings(
        &self,
        license_plate: Option<String>,
        limit: u32,
        offset: u64,
    ) -> StoreResult<(Vec<BookingRecord>, u64)>;

    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<BookingRecord>>;
}

/// Opens quota transactions.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn QuotaTx>>;
}

/// A single atomic unit of work over schedules and bookings.
///
/// The remaining-quota counter is only changed through [`QuotaTx::reserve_unit`]
/// and [`QuotaTx::release_unit`].
#[async_trait]
pub trait QuotaTx: Send {
    /// Reads a schedule and locks it for the rest of the transaction.
    async fn lock_schedule(&mut self, id: Uuid) -> StoreResult<Option<ServiceSchedule>>;

    /// Reads a booking and locks it for the rest of the transaction.
    async fn lock_booking(&mut self, id: Uuid) -> StoreResult<Option<ServiceBooking>>;

    /// Takes one unit of quota if any remain and returns what is left, or
    /// `None` when the schedule is exhausted (nothing is written then).
    async fn reserve_unit(&mut self, schedule_id: Uuid) -> StoreResult<Option<i32>>;

    /// Gives one unit of quota back and returns the new remaining quota.
    async fn release_unit(&mut self, schedule_id: Uuid) -> StoreResult<i32>;

    async fn insert_booking(&mut self, booking: &NewBooking, status_id: i32) -> StoreResult<ServiceBooking>;

    async fn set_booking_status(&mut self, id: Uuid, status_id: i32) -> StoreResult<ServiceBooking>;

    async fn delete_booking(&mut self, id: Uuid) -> StoreResult<()>;

    /// Bookings of any status that reference the schedule.
    async fn count_schedule_bookings(&mut self, schedule_id: Uuid) -> StoreResult<i64>;

    async fn delete_schedule(&mut self, id: Uuid) -> StoreResult<()>;

    /// Makes every write visible at once. Dropping the transaction without
    /// committing discards them.
    async fn commit(&mut self) -> StoreResult<()>;
}

/// Everything the application needs from persistence.
pub trait Store:
    DealerRepository + StatusRepository + ScheduleRepository + BookingRepository + QuotaStore
{
}

impl<T> Store for T where
    T: DealerRepository + StatusRepository + ScheduleRepository + BookingRepository + QuotaStore
{
}

pub type SharedStore = Arc<dyn Store>;
