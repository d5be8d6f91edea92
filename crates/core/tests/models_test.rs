use chrono::{NaiveDate, Utc};
use dealerbook_core::models::{
    ApiResponse, BookingDetail, BookingStatus, BookingView, CreateBookingRequest, Dealer,
    DealerResponse, DealerScheduleSummary, Pagination, ScheduleRecord, ScheduleUsage,
    ServiceBooking, ServiceSchedule, UpdateBookingStatusRequest,
};
use pretty_assertions::assert_eq;
use serde_json::{from_str, json, to_value};
use uuid::Uuid;

fn schedule_record(quota: i32) -> ScheduleRecord {
    let now = Utc::now();
    ScheduleRecord {
        schedule: ServiceSchedule {
            id: Uuid::new_v4(),
            dealer_id: Uuid::new_v4(),
            schedule_date: NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            quota,
            created_at: now,
            updated_at: now,
        },
        dealer_name: "Astra Motor".to_string(),
        dealer_address: "Jl. Gatot Subroto 12".to_string(),
    }
}

#[test]
fn test_status_wire_names() {
    let json = to_value(BookingStatus::ArrivalConfirmed).unwrap();
    assert_eq!(json, json!("ARRIVAL_CONFIRMED"));

    let parsed: BookingStatus = from_str("\"NO_SHOW\"").unwrap();
    assert_eq!(parsed, BookingStatus::NoShow);
    assert_eq!(BookingStatus::INITIAL, BookingStatus::PendingConfirmation);
}

#[test]
fn test_create_booking_request_trims_fields() {
    let schedule_id = Uuid::new_v4();
    let request: CreateBookingRequest = from_str(&format!(
        r#"{{
            "name": " Andi ",
            "phone_no": "0811 ",
            "vehicle_type": "Car",
            "license_plate": " L 99 AB",
            "vehicle_problem": "Oil leak",
            "service_schedule_id": "{schedule_id}",
            "service_time": "08:00"
        }}"#
    ))
    .unwrap();

    let booking = request.validate().unwrap();
    assert_eq!(booking.name, "Andi");
    assert_eq!(booking.phone_no, "0811");
    assert_eq!(booking.license_plate, "L 99 AB");
    assert_eq!(booking.service_schedule_id, schedule_id);
}

#[test]
fn test_create_booking_request_lists_missing_fields() {
    let request: CreateBookingRequest = from_str(r#"{"name": "Andi", "phone_no": "  "}"#).unwrap();
    let err = request.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required fields: phone_no, vehicle_type, license_plate, vehicle_problem, service_time, service_schedule_id"
    );
}

#[test]
fn test_booking_detail_flattens_booking() {
    let now = Utc::now();
    let booking = ServiceBooking {
        id: Uuid::new_v4(),
        name: "Andi".to_string(),
        phone_no: "0811".to_string(),
        vehicle_type: "Car".to_string(),
        license_plate: "L 99 AB".to_string(),
        vehicle_problem: "Oil leak".to_string(),
        service_schedule_id: Uuid::new_v4(),
        service_time: "08:00".to_string(),
        service_status_id: 1,
        created_at: now,
        updated_at: now,
    };
    let detail = BookingDetail {
        booking: BookingView::new(
            booking,
            BookingStatus::PendingConfirmation,
            NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
        ),
        dealer_name: "Astra Motor".to_string(),
        dealer_address: "Jl. Gatot Subroto 12".to_string(),
    };

    let json = to_value(&detail).unwrap();
    assert_eq!(json["status"], json!("PENDING_CONFIRMATION"));
    assert_eq!(json["schedule_date"], json!("2030-01-02"));
    assert_eq!(json["dealer_name"], json!("Astra Motor"));
    assert_eq!(json["license_plate"], json!("L 99 AB"));
}

#[test]
fn test_dealer_summary_derives_usage() {
    let summary = DealerScheduleSummary::from(ScheduleUsage {
        record: schedule_record(3),
        booking_count: 5,
    });

    assert_eq!(summary.used_quota, 5);
    assert_eq!(summary.available_quota, -2);
    assert!(to_value(&summary).unwrap().get("booking_count").is_none());
}

#[test]
fn test_dealer_response_omits_hash() {
    let now = Utc::now();
    let dealer = Dealer {
        id: Uuid::new_v4(),
        name: "Astra Motor".to_string(),
        username: "astra".to_string(),
        address: "Jl. Gatot Subroto 12".to_string(),
        password_hash: "$argon2id$v=19$secret".to_string(),
        created_at: now,
        updated_at: now,
    };

    let json = to_value(DealerResponse::from(dealer)).unwrap();
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["username"], json!("astra"));
}

#[test]
fn test_envelope_shapes() {
    let ok = to_value(ApiResponse::ok(UpdateBookingStatusRequest {
        status: "ARRIVED".to_string(),
    }))
    .unwrap();
    assert_eq!(ok, json!({ "success": true, "data": { "status": "ARRIVED" } }));

    let pagination = Pagination::new(1, 2);
    let paged = to_value(ApiResponse::paged(pagination.page_of(vec![1, 2], 3))).unwrap();
    assert_eq!(
        paged,
        json!({
            "success": true,
            "data": [1, 2],
            "pageMeta": { "page": 1, "perPage": 2, "totalPages": 2, "totalRows": 3 }
        })
    );
}
