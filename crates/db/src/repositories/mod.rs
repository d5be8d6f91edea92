pub mod booking;
pub mod dealer;
pub mod schedule;
pub mod status;

/// Columns of a schedule joined with its dealer, for `DbScheduleRecord`.
pub(crate) const SCHEDULE_RECORD_COLUMNS: &str = r#"
    s.id, s.dealer_id, s.schedule_date, s.quota, s.created_at, s.updated_at,
    d.name AS dealer_name, d.address AS dealer_address
"#;

/// Columns of a booking joined with its schedule and dealer, for `DbBookingRecord`.
pub(crate) const BOOKING_RECORD_COLUMNS: &str = r#"
    b.id, b.name, b.phone_no, b.vehicle_type, b.license_plate, b.vehicle_problem,
    b.service_schedule_id, b.service_time, b.service_status_id, b.created_at, b.updated_at,
    s.schedule_date, d.name AS dealer_name, d.address AS dealer_address
"#;
