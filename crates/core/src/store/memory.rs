//! In-process store with the same transactional guarantees as the database.
//!
//! A single async mutex guards all tables. A [`QuotaTx`] holds that mutex for
//! its whole lifetime and works on a private copy that replaces the shared
//! tables only on commit, so transactions are serialized and a dropped
//! transaction leaves no trace.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use eyre::eyre;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
    BookingRepository, DealerRepository, QuotaStore, QuotaTx, ScheduleRepository, StatusRepository,
};
use crate::errors::{StoreError, StoreResult};
use crate::models::{
    BookingRecord, Dealer, NewBooking, NewDealer, ScheduleBookingRow, ScheduleRecord,
    ScheduleUsage, ServiceBooking, ServiceSchedule, StatusRow,
};
use crate::registry::StatusTable;

#[derive(Debug, Clone, Default)]
struct Tables {
    dealers: Vec<Dealer>,
    statuses: Vec<StatusRow>,
    schedules: Vec<ServiceSchedule>,
    // Kept in insertion order, which is also creation order.
    bookings: Vec<ServiceBooking>,
}

impl Tables {
    fn schedule_record(&self, schedule: &ServiceSchedule) -> StoreResult<ScheduleRecord> {
        let dealer = self
            .dealers
            .iter()
            .find(|d| d.id == schedule.dealer_id)
            .ok_or_else(|| eyre!("schedule {} references missing dealer", schedule.id))?;

        Ok(ScheduleRecord {
            schedule: schedule.clone(),
            dealer_name: dealer.name.clone(),
            dealer_address: dealer.address.clone(),
        })
    }

    fn booking_record(&self, booking: &ServiceBooking) -> StoreResult<BookingRecord> {
        let schedule = self
            .schedules
            .iter()
            .find(|s| s.id == booking.service_schedule_id)
            .ok_or_else(|| eyre!("booking {} references missing schedule", booking.id))?;
        let record = self.schedule_record(schedule)?;

        Ok(BookingRecord {
            booking: booking.clone(),
            schedule_date: schedule.schedule_date,
            dealer_name: record.dealer_name,
            dealer_address: record.dealer_address,
        })
    }

    fn booking_count(&self, schedule_id: Uuid) -> i64 {
        self.bookings
            .iter()
            .filter(|b| b.service_schedule_id == schedule_id)
            .count() as i64
    }

    fn schedule_mut(&mut self, id: Uuid) -> StoreResult<&mut ServiceSchedule> {
        self.schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::Backend(eyre!("schedule {id} does not exist")))
    }

    fn date_taken(&self, dealer_id: Uuid, date: NaiveDate, except: Option<Uuid>) -> bool {
        self.schedules.iter().any(|s| {
            s.dealer_id == dealer_id && s.schedule_date == date && Some(s.id) != except
        })
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// An empty store with the booking statuses seeded.
    pub fn new() -> Self {
        let tables = Tables {
            statuses: StatusTable::seed_rows(),
            ..Tables::default()
        };
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DealerRepository for MemoryStore {
    async fn insert_dealer(&self, dealer: NewDealer) -> StoreResult<Dealer> {
        let mut tables = self.tables.lock().await;
        if tables.dealers.iter().any(|d| d.username == dealer.username) {
            return Err(StoreError::UniqueViolation("dealers_username_key".to_string()));
        }

        let now = Utc::now();
        let dealer = Dealer {
            id: Uuid::new_v4(),
            name: dealer.name,
            username: dealer.username,
            address: dealer.address,
            password_hash: dealer.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.dealers.push(dealer.clone());
        Ok(dealer)
    }

    async fn find_dealer_by_username(&self, username: &str) -> StoreResult<Option<Dealer>> {
        let tables = self.tables.lock().await;
        Ok(tables.dealers.iter().find(|d| d.username == username).cloned())
    }

    async fn find_dealer_by_id(&self, id: Uuid) -> StoreResult<Option<Dealer>> {
        let tables = self.tables.lock().await;
        Ok(tables.dealers.iter().find(|d| d.id == id).cloned())
    }
}

#[async_trait]
impl StatusRepository for MemoryStore {
    async fn list_statuses(&self) -> StoreResult<Vec<StatusRow>> {
        Ok(self.tables.lock().await.statuses.clone())
    }
}

#[async_trait]
impl ScheduleRepository for MemoryStore {
    async fn insert_schedule(
        &self,
        dealer_id: Uuid,
        schedule_date: NaiveDate,
        quota: i32,
    ) -> StoreResult<ScheduleRecord> {
        let mut tables = self.tables.lock().await;
        if tables.date_taken(dealer_id, schedule_date, None) {
            return Err(StoreError::UniqueViolation(
                "service_schedules_dealer_id_schedule_date_key".to_string(),
            ));
        }

        let now = Utc::now();
        let schedule = ServiceSchedule {
            id: Uuid::new_v4(),
            dealer_id,
            schedule_date,
            quota,
            created_at: now,
            updated_at: now,
        };
        let record = tables.schedule_record(&schedule)?;
        tables.schedules.push(schedule);
        Ok(record)
    }

    async fn find_schedule(&self, id: Uuid) -> StoreResult<Option<ScheduleRecord>> {
        let tables = self.tables.lock().await;
        tables
            .schedules
            .iter()
            .find(|s| s.id == id)
            .map(|s| tables.schedule_record(s))
            .transpose()
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        schedule_date: Option<NaiveDate>,
        quota: Option<i32>,
    ) -> StoreResult<Option<ScheduleRecord>> {
        let mut tables = self.tables.lock().await;
        let Some(current) = tables.schedules.iter().find(|s| s.id == id).cloned() else {
            return Ok(None);
        };

        if let Some(date) = schedule_date {
            if tables.date_taken(current.dealer_id, date, Some(id)) {
                return Err(StoreError::UniqueViolation(
                    "service_schedules_dealer_id_schedule_date_key".to_string(),
                ));
            }
        }

        let schedule = tables.schedule_mut(id)?;
        if let Some(date) = schedule_date {
            schedule.schedule_date = date;
        }
        if let Some(quota) = quota {
            schedule.quota = quota;
        }
        schedule.updated_at = Utc::now();
        let updated = schedule.clone();

        tables.schedule_record(&updated).map(Some)
    }

    async fn list_available_schedules(
        &self,
        from: NaiveDate,
        until: Option<NaiveDate>,
    ) -> StoreResult<Vec<ScheduleRecord>> {
        let tables = self.tables.lock().await;
        let mut schedules: Vec<&ServiceSchedule> = tables
            .schedules
            .iter()
            .filter(|s| s.quota > 0 && s.schedule_date >= from)
            .filter(|s| until.map_or(true, |until| s.schedule_date < until))
            .collect();
        schedules.sort_by_key(|s| (s.schedule_date, s.quota));

        schedules
            .into_iter()
            .map(|s| tables.schedule_record(s))
            .collect()
    }

    async fn list_dealer_schedules(
        &self,
        dealer_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> StoreResult<(Vec<ScheduleUsage>, u64)> {
        let tables = self.tables.lock().await;
        let mut schedules: Vec<&ServiceSchedule> = tables
            .schedules
            .iter()
            .filter(|s| s.dealer_id == dealer_id)
            .collect();
        schedules.sort_by_key(|s| s.schedule_date);
        let total = schedules.len() as u64;

        let rows = schedules
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|s| {
                Ok(ScheduleUsage {
                    record: tables.schedule_record(s)?,
                    booking_count: tables.booking_count(s.id),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((rows, total))
    }

    async fn find_dealer_schedule(
        &self,
        id: Uuid,
        dealer_id: Uuid,
    ) -> StoreResult<Option<(ScheduleRecord, Vec<ScheduleBookingRow>)>> {
        let tables = self.tables.lock().await;
        let Some(schedule) = tables
            .schedules
            .iter()
            .find(|s| s.id == id && s.dealer_id == dealer_id)
        else {
            return Ok(None);
        };

        let bookings = tables
            .bookings
            .iter()
            .filter(|b| b.service_schedule_id == id)
            .map(|b| ScheduleBookingRow {
                id: b.id,
                service_status_id: b.service_status_id,
            })
            .collect();

        Ok(Some((tables.schedule_record(schedule)?, bookings)))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn list_bookings(
        &self,
        license_plate: Option<String>,
        limit: u32,
        offset: u64,
    ) -> StoreResult<(Vec<BookingRecord>, u64)> {
        let tables = self.tables.lock().await;
        let needle = license_plate.map(|p| p.to_lowercase());

        let mut matching: Vec<&ServiceBooking> = tables
            .bookings
            .iter()
            .rev()
            .filter(|b| {
                needle
                    .as_deref()
                    .map_or(true, |n| b.license_plate.to_lowercase().contains(n))
            })
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;

        let rows = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|b| tables.booking_record(b))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((rows, total))
    }

    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<BookingRecord>> {
        let tables = self.tables.lock().await;
        tables
            .bookings
            .iter()
            .find(|b| b.id == id)
            .map(|b| tables.booking_record(b))
            .transpose()
    }
}

#[async_trait]
impl QuotaStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn QuotaTx>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl QuotaTx for MemoryTx {
    async fn lock_schedule(&mut self, id: Uuid) -> StoreResult<Option<ServiceSchedule>> {
        Ok(self.working.schedules.iter().find(|s| s.id == id).cloned())
    }

    async fn lock_booking(&mut self, id: Uuid) -> StoreResult<Option<ServiceBooking>> {
        Ok(self.working.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn reserve_unit(&mut self, schedule_id: Uuid) -> StoreResult<Option<i32>> {
        let schedule = self.working.schedule_mut(schedule_id)?;
        if schedule.quota <= 0 {
            return Ok(None);
        }
        schedule.quota -= 1;
        schedule.updated_at = Utc::now();
        Ok(Some(schedule.quota))
    }

    async fn release_unit(&mut self, schedule_id: Uuid) -> StoreResult<i32> {
        let schedule = self.working.schedule_mut(schedule_id)?;
        schedule.quota += 1;
        schedule.updated_at = Utc::now();
        Ok(schedule.quota)
    }

    async fn insert_booking(&mut self, booking: &NewBooking, status_id: i32) -> StoreResult<ServiceBooking> {
        self.working.schedule_mut(booking.service_schedule_id)?;
        if !self.working.statuses.iter().any(|s| s.id == status_id) {
            return Err(StoreError::Backend(eyre!("status {status_id} does not exist")));
        }

        let now = Utc::now();
        let created = ServiceBooking {
            id: Uuid::new_v4(),
            name: booking.name.clone(),
            phone_no: booking.phone_no.clone(),
            vehicle_type: booking.vehicle_type.clone(),
            license_plate: booking.license_plate.clone(),
            vehicle_problem: booking.vehicle_problem.clone(),
            service_schedule_id: booking.service_schedule_id,
            service_time: booking.service_time.clone(),
            service_status_id: status_id,
            created_at: now,
            updated_at: now,
        };
        self.working.bookings.push(created.clone());
        Ok(created)
    }

    async fn set_booking_status(&mut self, id: Uuid, status_id: i32) -> StoreResult<ServiceBooking> {
        let booking = self
            .working
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| eyre!("booking {id} does not exist"))?;
        booking.service_status_id = status_id;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn delete_booking(&mut self, id: Uuid) -> StoreResult<()> {
        self.working.bookings.retain(|b| b.id != id);
        Ok(())
    }

    async fn count_schedule_bookings(&mut self, schedule_id: Uuid) -> StoreResult<i64> {
        Ok(self.working.booking_count(schedule_id))
    }

    async fn delete_schedule(&mut self, id: Uuid) -> StoreResult<()> {
        if self.working.booking_count(id) > 0 {
            return Err(StoreError::Backend(eyre!(
                "schedule {id} is still referenced by bookings"
            )));
        }
        self.working.schedules.retain(|s| s.id != id);
        Ok(())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.guard.clone_from(&self.working);
        Ok(())
    }
}
