use axum::{extract::State, http::StatusCode, Json};
use dealerbook_core::models::{
    ApiResponse, DealerResponse, LoginRequest, LoginResponse, RegisterDealerRequest,
};
use std::sync::Arc;

use crate::{
    middleware::error_handling::{ApiJson, AppError},
    ApiState,
};

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<RegisterDealerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DealerResponse>>), AppError> {
    let dealer = state.accounts.register(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(dealer))))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let login = state.accounts.login(payload).await?;
    Ok(Json(ApiResponse::ok(login)))
}
