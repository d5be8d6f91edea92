//! PostgreSQL implementation of the store traits.
//!
//! Quota transactions are plain `sqlx` transactions. Reads that precede a quota
//! change use `SELECT ... FOR UPDATE`, so concurrent admissions against the same
//! schedule queue on its row lock.

use async_trait::async_trait;
use chrono::NaiveDate;
use dealerbook_core::errors::{StoreError, StoreResult};
use dealerbook_core::models::{
    BookingRecord, Dealer, NewBooking, NewDealer, ScheduleBookingRow, ScheduleRecord,
    ScheduleUsage, ServiceBooking, ServiceSchedule, StatusRow,
};
use dealerbook_core::store::{
    BookingRepository, DealerRepository, QuotaStore, QuotaTx, ScheduleRepository, StatusRepository,
};
use sqlx::{PgConnection, Postgres, Transaction};
use uuid::Uuid;

use crate::repositories::{booking, dealer, schedule, status};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Classifies a driver error for the engines.
pub fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation(
                db.constraint().unwrap_or("unique constraint").to_string(),
            );
        }
    }
    StoreError::Backend(eyre::Report::new(err))
}

fn to_i64(value: impl TryInto<i64>) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

fn to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl DealerRepository for PgStore {
    async fn insert_dealer(&self, new: NewDealer) -> StoreResult<Dealer> {
        let row = dealer::create_dealer(
            &self.pool,
            &new.name,
            &new.username,
            &new.address,
            &new.password_hash,
        )
        .await
        .map_err(map_sqlx)?;

        Ok(row.into())
    }

    async fn find_dealer_by_username(&self, username: &str) -> StoreResult<Option<Dealer>> {
        let row = dealer::get_dealer_by_username(&self.pool, username)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Into::into))
    }

    async fn find_dealer_by_id(&self, id: Uuid) -> StoreResult<Option<Dealer>> {
        let row = dealer::get_dealer_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl StatusRepository for PgStore {
    async fn list_statuses(&self) -> StoreResult<Vec<StatusRow>> {
        let rows = status::list_statuses(&self.pool).await.map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ScheduleRepository for PgStore {
    async fn insert_schedule(
        &self,
        dealer_id: Uuid,
        schedule_date: NaiveDate,
        quota: i32,
    ) -> StoreResult<ScheduleRecord> {
        let row = schedule::create_schedule(&self.pool, dealer_id, schedule_date, quota)
            .await
            .map_err(map_sqlx)?;
        Ok(row.into())
    }

    async fn find_schedule(&self, id: Uuid) -> StoreResult<Option<ScheduleRecord>> {
        let row = schedule::get_schedule_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Into::into))
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        schedule_date: Option<NaiveDate>,
        quota: Option<i32>,
    ) -> StoreResult<Option<ScheduleRecord>> {
        let row = schedule::update_schedule(&self.pool, id, schedule_date, quota)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Into::into))
    }

    async fn list_available_schedules(
        &self,
        from: NaiveDate,
        until: Option<NaiveDate>,
    ) -> StoreResult<Vec<ScheduleRecord>> {
        let rows = schedule::get_available_schedules(&self.pool, from, until)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_dealer_schedules(
        &self,
        dealer_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> StoreResult<(Vec<ScheduleUsage>, u64)> {
        let rows = schedule::get_dealer_schedules(&self.pool, dealer_id, to_i64(limit), to_i64(offset))
            .await
            .map_err(map_sqlx)?;
        let total = schedule::count_dealer_schedules(&self.pool, dealer_id)
            .await
            .map_err(map_sqlx)?;

        Ok((rows.into_iter().map(Into::into).collect(), to_u64(total)))
    }

    async fn find_dealer_schedule(
        &self,
        id: Uuid,
        dealer_id: Uuid,
    ) -> StoreResult<Option<(ScheduleRecord, Vec<ScheduleBookingRow>)>> {
        let Some(record) = schedule::get_dealer_schedule(&self.pool, id, dealer_id)
            .await
            .map_err(map_sqlx)?
        else {
            return Ok(None);
        };

        let bookings = schedule::get_schedule_bookings(&self.pool, id)
            .await
            .map_err(map_sqlx)?;

        Ok(Some((
            record.into(),
            bookings.into_iter().map(Into::into).collect(),
        )))
    }
}

#[async_trait]
impl BookingRepository for PgStore {
    async fn list_bookings(
        &self,
        license_plate: Option<String>,
        limit: u32,
        offset: u64,
    ) -> StoreResult<(Vec<BookingRecord>, u64)> {
        let plate = license_plate.as_deref();
        let rows = booking::get_bookings(&self.pool, plate, to_i64(limit), to_i64(offset))
            .await
            .map_err(map_sqlx)?;
        let total = booking::count_bookings(&self.pool, plate)
            .await
            .map_err(map_sqlx)?;

        Ok((rows.into_iter().map(Into::into).collect(), to_u64(total)))
    }

    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<BookingRecord>> {
        let row = booking::get_booking_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl QuotaStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn QuotaTx>> {
        let tx = self.pool.begin().await.map_err(map_sqlx)?;
        Ok(Box::new(PgTx { tx: Some(tx) }))
    }
}

/// An open database transaction. Dropping it without `commit` rolls back.
pub struct PgTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgTx {
    fn conn(&mut self) -> StoreResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| StoreError::Backend(eyre::eyre!("transaction already committed")))
    }
}

#[async_trait]
impl QuotaTx for PgTx {
    async fn lock_schedule(&mut self, id: Uuid) -> StoreResult<Option<ServiceSchedule>> {
        let row = schedule::lock_schedule(self.conn()?, id)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Into::into))
    }

    async fn lock_booking(&mut self, id: Uuid) -> StoreResult<Option<ServiceBooking>> {
        let row = booking::lock_booking(self.conn()?, id)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Into::into))
    }

    async fn reserve_unit(&mut self, schedule_id: Uuid) -> StoreResult<Option<i32>> {
        schedule::take_quota_unit(self.conn()?, schedule_id)
            .await
            .map_err(map_sqlx)
    }

    async fn release_unit(&mut self, schedule_id: Uuid) -> StoreResult<i32> {
        schedule::return_quota_unit(self.conn()?, schedule_id)
            .await
            .map_err(map_sqlx)
    }

    async fn insert_booking(&mut self, new: &NewBooking, status_id: i32) -> StoreResult<ServiceBooking> {
        let row = booking::create_booking(self.conn()?, new, status_id)
            .await
            .map_err(map_sqlx)?;
        Ok(row.into())
    }

    async fn set_booking_status(&mut self, id: Uuid, status_id: i32) -> StoreResult<ServiceBooking> {
        let row = booking::update_booking_status(self.conn()?, id, status_id)
            .await
            .map_err(map_sqlx)?;
        Ok(row.into())
    }

    async fn delete_booking(&mut self, id: Uuid) -> StoreResult<()> {
        booking::delete_booking(self.conn()?, id)
            .await
            .map_err(map_sqlx)
    }

    async fn count_schedule_bookings(&mut self, schedule_id: Uuid) -> StoreResult<i64> {
        schedule::count_schedule_bookings(self.conn()?, schedule_id)
            .await
            .map_err(map_sqlx)
    }

    async fn delete_schedule(&mut self, id: Uuid) -> StoreResult<()> {
        schedule::delete_schedule(self.conn()?, id)
            .await
            .map_err(map_sqlx)
    }

    async fn commit(&mut self) -> StoreResult<()> {
        match self.tx.take() {
            Some(tx) => tx.commit().await.map_err(map_sqlx),
            None => Err(StoreError::Backend(eyre::eyre!("transaction already committed"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::create_test_pool;
    use chrono::{Days, Utc};
    use dealerbook_core::models::CreateBookingRequest;
    use dealerbook_core::services::BookingWorkflow;
    use dealerbook_core::{Clock, ServiceError, StatusTable};
    use pretty_assertions::assert_eq;

    async fn store_with_schedule(quota: i32) -> (PgStore, Uuid) {
        let store = PgStore::new(create_test_pool().await);
        let username = format!("dealer-{}", Uuid::new_v4());
        let dealer = store
            .insert_dealer(NewDealer {
                name: "Bengkel Uji".to_string(),
                username,
                address: "Jl. Gatot Subroto 5, Surabaya".to_string(),
                password_hash: "$argon2id$unused".to_string(),
            })
            .await
            .unwrap();

        // Dates are unique per dealer, and every test uses a fresh dealer.
        let tomorrow = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(1))
            .unwrap();
        let record = store
            .insert_schedule(dealer.id, tomorrow, quota)
            .await
            .unwrap();

        (store, record.schedule.id)
    }

    async fn workflow(store: &PgStore) -> BookingWorkflow {
        let rows = store.list_statuses().await.unwrap();
        let statuses = Arc::new(StatusTable::load(&rows).unwrap());
        BookingWorkflow::new(Arc::new(store.clone()), statuses, Clock::default())
    }

    fn request(schedule_id: Uuid, plate: &str) -> CreateBookingRequest {
        CreateBookingRequest {
            name: "Agus Salim".to_string(),
            phone_no: "081377778888".to_string(),
            vehicle_type: "Motorcycle".to_string(),
            license_plate: plate.to_string(),
            vehicle_problem: "Chain slipping".to_string(),
            service_schedule_id: Some(schedule_id),
            service_time: "08:00 - 09:00".to_string(),
        }
    }

    async fn remaining(store: &PgStore, schedule_id: Uuid) -> i32 {
        store
            .find_schedule(schedule_id)
            .await
            .unwrap()
            .unwrap()
            .schedule
            .quota
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn concurrent_admission_takes_the_last_unit_once() {
        let (store, schedule_id) = store_with_schedule(1).await;
        let workflow = workflow(&store).await;

        let attempts: Vec<_> = (0..8)
            .map(|n| {
                let workflow = workflow.clone();
                tokio::spawn(async move {
                    workflow
                        .create_booking(request(schedule_id, &format!("L {n} RC")))
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        let mut exhausted = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(ServiceError::CapacityExhausted(_)) => exhausted += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(exhausted, 7);
        assert_eq!(remaining(&store, schedule_id).await, 0);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn quota_units_are_guarded() {
        let (store, schedule_id) = store_with_schedule(1).await;

        let mut tx = store.begin().await.unwrap();
        let locked = tx.lock_schedule(schedule_id).await.unwrap().unwrap();
        assert_eq!(locked.quota, 1);
        assert_eq!(tx.reserve_unit(schedule_id).await.unwrap(), Some(0));
        assert_eq!(tx.reserve_unit(schedule_id).await.unwrap(), None);
        assert_eq!(tx.release_unit(schedule_id).await.unwrap(), 1);
        tx.commit().await.unwrap();
        assert!(tx.commit().await.is_err());
        assert_eq!(remaining(&store, schedule_id).await, 1);

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.reserve_unit(schedule_id).await.unwrap(), Some(0));
        drop(tx);
        assert_eq!(remaining(&store, schedule_id).await, 1);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn plate_filter_is_literal() {
        let (store, schedule_id) = store_with_schedule(2).await;
        let workflow = workflow(&store).await;
        let tag = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        let plate = format!("T{tag} 9");
        workflow
            .create_booking(request(schedule_id, &plate))
            .await
            .unwrap();

        let (_, exact) = store
            .list_bookings(Some(format!("t{tag} 9").to_lowercase()), 10, 0)
            .await
            .unwrap();
        let (_, wildcard) = store
            .list_bookings(Some(format!("T{tag}%9")), 10, 0)
            .await
            .unwrap();

        assert_eq!(exact, 1);
        assert_eq!(wildcard, 0);
    }

    #[test]
    fn non_database_errors_are_backend_failures() {
        let err = map_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(err.to_string().contains("no rows returned"));
    }

    #[test]
    fn counts_saturate() {
        assert_eq!(to_u64(-1), 0);
        assert_eq!(to_u64(15), 15);
        assert_eq!(to_i64(u64::MAX), i64::MAX);
        assert_eq!(to_i64(20u32), 20);
    }
}
