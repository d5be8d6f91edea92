use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use dealerbook_core::models::{
    ApiResponse, AvailableSchedule, CreateScheduleRequest, DealerScheduleSummary, Pagination,
    ScheduleDetail, ScheduleResponse, UpdateScheduleRequest,
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
pub struct AvailableQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Public listing of schedules that still have quota.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn available_schedules(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<ApiResponse<Vec<AvailableSchedule>>>, AppError> {
    let schedules = state
        .schedules
        .get_available_schedules(query.date.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(schedules)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_schedules(
    dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<DealerScheduleSummary>>>, AppError> {
    let pagination = Pagination::parse(query.page.as_deref(), query.limit.as_deref());
    let page = state.schedules.get_all_schedules(dealer.id, pagination).await?;

    Ok(Json(ApiResponse::paged(page)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_schedule(
    dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ScheduleDetail>>, AppError> {
    let schedule = state.schedules.get_schedule_by_id(id, dealer.id).await?;
    Ok(Json(ApiResponse::ok(schedule)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn create_schedule(
    dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ScheduleResponse>>), AppError> {
    let schedule = state.schedules.create_schedule(dealer.id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(schedule))))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn update_schedule(
    dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateScheduleRequest>,
) -> Result<Json<ApiResponse<ScheduleResponse>>, AppError> {
    let schedule = state.schedules.update_schedule(id, dealer.id, payload).await?;
    Ok(Json(ApiResponse::ok(schedule)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn delete_schedule(
    dealer: AuthDealer,
    State(state): State<Arc<ApiState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.schedules.delete_schedule(id, dealer.id).await?;
    Ok(Json(ApiResponse::ok(())))
}
