use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use dealerbook_core::models::{
    ApiResponse, BookingDetail, BookingStatusResponse, BookingView, CreateBookingRequest,
    Pagination, UpdateBookingStatusRequest,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{
        auth::AuthDealer,
        error_handling::{ApiJson, ApiPath, AppError},
    },
    ApiState,
};

#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub license_plate: Option<String>,
}

/// Public booking form submission.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingView>>), AppError> {
    let booking = state.bookings.create_booking(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(booking))))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_bookings(
    _dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<Vec<BookingView>>>, AppError> {
    let pagination = Pagination::parse(query.page.as_deref(), query.limit.as_deref());
    let page = state
        .bookings
        .get_bookings(pagination, query.license_plate.as_deref())
        .await?;

    Ok(Json(ApiResponse::paged(page)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_booking(
    _dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<BookingDetail>>, AppError> {
    let booking = state.bookings.get_booking_by_id(id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn update_booking_status(
    dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateBookingStatusRequest>,
) -> Result<Json<ApiResponse<BookingStatusResponse>>, AppError> {
    tracing::debug!(booking_id = %id, dealer = %dealer.username, status = %payload.status, "status change requested");
    let updated = state.bookings.update_booking_status(id, payload).await?;
    Ok(Json(ApiResponse::ok(updated)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn delete_booking(
    _dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.bookings.delete_booking(id).await?;
    Ok(Json(ApiResponse::ok(())))
}
