//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and the uniform JSON envelope, so
//! every failure leaves the API in the same shape.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError, Json,
};
use dealerbook_core::{
    models::ApiResponse,
    ErrorKind, ServiceError,
};

/// Application error wrapper that provides HTTP status code mapping.
///
/// Handlers return `Result<_, AppError>` and use `?` on anything producing a
/// [`ServiceError`].
#[derive(Debug)]
pub struct AppError(pub ServiceError);

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidInput
        | ErrorKind::InvalidState
        | ErrorKind::CapacityExhausted
        | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Timeout => StatusCode::REQUEST_TIMEOUT,
        ErrorKind::ConfigurationError | ErrorKind::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        (status, Json(ApiResponse::<()>::failure(&self.0))).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(ServiceError::InvalidInput(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(ServiceError::InvalidInput(rejection.body_text()))
    }
}

/// JSON body extractor whose rejection is reported in the envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejection is reported in the envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Turns a failure raised by the timeout layer into an envelope response.
pub async fn handle_timeout_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError(ServiceError::Timeout("Request timed out".to_string()))
    } else {
        AppError(ServiceError::Internal(eyre::eyre!("middleware error: {err}")))
    }
}
