mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    error_handling::HandleErrorLayer,
    http::{Method, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;
use dealerbook_api::{
    middleware::error_handling::{handle_timeout_error, AppError},
    ApiState,
};
use dealerbook_core::{
    models::{Dealer, StatusRow},
    Clock, ServiceError, StatusTable, StoreError,
};
use dealerbook_db::mock::MockStore;
use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use test_utils::{build_router, send, today, token_keys};
use tower::{ServiceBuilder, ServiceExt};
use uuid::Uuid;

async fn body_of(error: ServiceError) -> (StatusCode, Value) {
    let response = AppError(error).into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[rstest]
#[case(ServiceError::NotFound("gone".into()), StatusCode::NOT_FOUND)]
#[case(ServiceError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST)]
#[case(ServiceError::InvalidState("too late".into()), StatusCode::BAD_REQUEST)]
#[case(ServiceError::CapacityExhausted("full".into()), StatusCode::BAD_REQUEST)]
#[case(ServiceError::Conflict("dup".into()), StatusCode::BAD_REQUEST)]
#[case(ServiceError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED)]
#[case(ServiceError::Timeout("slow".into()), StatusCode::REQUEST_TIMEOUT)]
#[case(ServiceError::Configuration("rows".into()), StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn test_error_status_mapping(#[case] error: ServiceError, #[case] expected: StatusCode) {
    let message = error.to_string();
    let (status, body) = body_of(error).await;

    assert_eq!(status, expected);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["message"], json!(message));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_internal_errors_are_not_described() {
    let (status, body) = body_of(ServiceError::Internal(eyre::eyre!("relation \"dealers\" does not exist"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": { "message": "Internal Server Error", "kind": "InternalError" }
        })
    );
}

#[tokio::test]
async fn test_elapsed_requests_report_timeout_kind() {
    let app = Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                "done"
            }),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_millis(10)),
        );

    let response = app
        .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": { "message": "Request timed out", "kind": "Timeout" }
        })
    );
}

#[tokio::test]
async fn test_incomplete_status_table_fails_startup() {
    let mut store = MockStore::new();
    store.expect_list_statuses().returning(|| {
        Ok(vec![StatusRow {
            id: 1,
            name: "PENDING_CONFIRMATION".to_string(),
        }])
    });

    let result = ApiState::initialize(Arc::new(store), Clock::Fixed(today()), token_keys()).await;

    let err = result.err().expect("initialization must fail");
    assert!(matches!(err, ServiceError::Configuration(_)));
    assert!(err.to_string().contains("CANCEL_CONFIRMED"));
}

#[tokio::test]
async fn test_store_failure_becomes_internal_error() {
    let dealer = Dealer {
        id: Uuid::new_v4(),
        name: "Mock Dealer".to_string(),
        username: "mock".to_string(),
        address: "Mock Street".to_string(),
        password_hash: "unused".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let (token, _) = token_keys().issue(dealer.id, &dealer.username).unwrap();

    let mut store = MockStore::new();
    store
        .expect_list_statuses()
        .returning(|| Ok(StatusTable::seed_rows()));
    store
        .expect_find_dealer_by_id()
        .returning(move |_| Ok(Some(dealer.clone())));
    store
        .expect_list_bookings()
        .with(eq(None::<String>), eq(10u32), eq(0u64))
        .returning(|_, _, _| Err(StoreError::Backend(eyre::eyre!("connection reset by peer"))));
    store
        .expect_begin()
        .returning(|| Err(StoreError::Backend(eyre::eyre!("pool exhausted"))));

    let router = build_router(Arc::new(store)).await;

    let (status, body) = send(&router, Method::GET, "/api/bookings", Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], json!("Internal Server Error"));

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/bookings",
        None,
        Some(test_utils::booking_form(&Uuid::new_v4().to_string(), "B 9 Z")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["kind"], json!("InternalError"));
}

#[tokio::test]
async fn test_unknown_status_is_rejected_before_touching_the_store() {
    let mut store = MockStore::new();
    store
        .expect_list_statuses()
        .returning(|| Ok(StatusTable::seed_rows()));
    store
        .expect_find_dealer_by_id()
        .returning(|id| {
            Ok(Some(Dealer {
                id,
                name: "Mock Dealer".to_string(),
                username: "mock".to_string(),
                address: "Mock Street".to_string(),
                password_hash: "unused".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });
    store.expect_begin().never();

    let (token, _) = token_keys().issue(Uuid::new_v4(), "mock").unwrap();
    let router = build_router(Arc::new(store)).await;

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/api/bookings/{}/status", Uuid::new_v4()),
        Some(&token),
        Some(json!({ "status": "COMPLETED" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], json!("InvalidInput"));
}
