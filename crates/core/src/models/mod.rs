pub mod booking;
pub mod dealer;
pub mod response;
pub mod schedule;
pub mod status;

pub use booking::{
    BookingDetail, BookingRecord, BookingStatusResponse, BookingView, CreateBookingRequest,
    NewBooking, ServiceBooking, UpdateBookingStatusRequest,
};
pub use dealer::{Dealer, DealerResponse, LoginRequest, LoginResponse, NewDealer, RegisterDealerRequest};
pub use response::{ApiResponse, ErrorBody, Page, PageMeta, Pagination};
pub use schedule::{
    AvailableSchedule, CreateScheduleRequest, DealerScheduleSummary, ScheduleBookingEntry,
    ScheduleBookingRow, ScheduleDetail, ScheduleRecord, ScheduleResponse, ScheduleUsage,
    ServiceSchedule, UpdateScheduleRequest,
};
pub use status::{BookingStatus, StatusRow};
