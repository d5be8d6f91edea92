pub mod booking;
pub mod schedule;

pub use booking::BookingWorkflow;
pub use schedule::ScheduleService;
