//! # Dealerbook Core
//!
//! Domain types and business rules for the dealer service-booking backend.
//!
//! The crate is storage-agnostic: persistence is reached through the traits in
//! [`store`], and the two engines in [`services`] hold every rule about how a
//! schedule's quota is reserved and released.
//!
//! - [`services::booking::BookingWorkflow`] admits, transitions and deletes bookings.
//! - [`services::schedule::ScheduleService`] publishes schedules and reports availability.

pub mod clock;
pub mod errors;
pub mod models;
pub mod registry;
pub mod services;
pub mod store;

pub use clock::Clock;
pub use errors::{ErrorKind, ServiceError, ServiceResult, StoreError, StoreResult};
pub use registry::{QuotaEffect, StatusTable};
