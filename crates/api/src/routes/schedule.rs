use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/schedules/available",
            get(handlers::schedule::available_schedules),
        )
        .route(
            "/api/schedules",
            get(handlers::schedule::list_schedules).post(handlers::schedule::create_schedule),
        )
        .route(
            "/api/schedules/:id",
            get(handlers::schedule::get_schedule)
                .put(handlers::schedule::update_schedule)
                .delete(handlers::schedule::delete_schedule),
        )
}
