#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Days, Duration, NaiveDate};
use dealerbook_api::{middleware::auth::TokenKeys, router, ApiState};
use dealerbook_core::{store::{MemoryStore, SharedStore}, Clock};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";

/// The date every test treats as today.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 10).unwrap()
}

/// `today() + offset` days, formatted as the API expects.
pub fn day(offset: u64) -> String {
    today().checked_add_days(Days::new(offset)).unwrap().to_string()
}

pub fn token_keys() -> TokenKeys {
    TokenKeys::new(JWT_SECRET, Duration::hours(24))
}

pub async fn build_router(store: SharedStore) -> Router {
    let state = ApiState::initialize(store, Clock::Fixed(today()), token_keys())
        .await
        .expect("state initializes");
    router(Arc::new(state))
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = build_router(store.clone()).await;
        Self { router, store }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send(&self.router, method, uri, token, body).await
    }

    /// Registers a dealer and returns a bearer token for it.
    pub async fn dealer_token(&self, username: &str) -> String {
        let (status, _) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "name": format!("Dealer {username}"),
                    "username": username,
                    "password": "password123",
                    "address": "Jl. Merdeka 17, Bandung"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Creates a schedule for the token's dealer and returns its id.
    pub async fn schedule(&self, token: &str, offset: u64, quota: i64) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/schedules",
                Some(token),
                Some(json!({ "schedule_date": day(offset), "quota": quota })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn book(&self, schedule_id: &str, plate: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/bookings",
            None,
            Some(booking_form(schedule_id, plate)),
        )
        .await
    }
}

pub fn booking_form(schedule_id: &str, plate: &str) -> Value {
    json!({
        "name": "Rina Wijaya",
        "phone_no": "081298765432",
        "vehicle_type": "Scooter",
        "license_plate": plate,
        "vehicle_problem": "Periodic service",
        "service_schedule_id": schedule_id,
        "service_time": "10:00 - 11:00"
    })
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };

    (status, json)
}
