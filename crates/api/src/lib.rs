//! # Dealerbook API
//!
//! The web server for the dealer service-booking backend: public booking
//! submission and availability search, plus dealer-authenticated management of
//! schedules and bookings.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into engine calls
//! - **Middleware**: Authentication and error-to-response mapping
//! - **Config**: Environment configuration
//!
//! Business rules live in `dealerbook-core`; this crate only wires them to axum.

/// Dealer registration, login and token authentication
pub mod accounts;
/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{error_handling::HandleErrorLayer, http::HeaderValue, Router};
use dealerbook_core::{
    errors::storage,
    services::{BookingWorkflow, ScheduleService},
    store::SharedStore,
    Clock, ServiceResult, StatusTable,
};
use dealerbook_db::{DbPool, PgStore};
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::{accounts::AccountService, middleware::auth::TokenKeys};

/// Shared application state that is accessible to all request handlers.
#[derive(Clone)]
pub struct ApiState {
    pub bookings: BookingWorkflow,
    pub schedules: ScheduleService,
    pub accounts: AccountService,
}

impl ApiState {
    /// Resolves the booking status table and wires the engines to `store`.
    ///
    /// Fails with a configuration error when the status table is incomplete,
    /// so a misconfigured database is caught before any request is served.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence shared by every engine
    /// * `clock` - Source of the business-local "today"
    /// * `tokens` - Keys for issuing and verifying dealer tokens
    ///
    /// # Returns
    ///
    /// * `ServiceResult<ApiState>` - The wired state, or `Configuration` when a status row is missing
    pub async fn initialize(store: SharedStore, clock: Clock, tokens: TokenKeys) -> ServiceResult<Self> {
        let rows = store
            .list_statuses()
            .await
            .map_err(storage("load_statuses"))?;
        let statuses = Arc::new(StatusTable::load(&rows)?);

        Ok(Self {
            bookings: BookingWorkflow::new(store.clone(), statuses.clone(), clock),
            schedules: ScheduleService::new(store.clone(), statuses, clock),
            accounts: AccountService::new(store, tokens),
        })
    }
}

/// Builds the application router with all routes attached to `state`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use dealerbook_api::{middleware::auth::TokenKeys, router, ApiState};
/// use dealerbook_core::{store::memory::MemoryStore, Clock};
///
/// async fn example() -> eyre::Result<()> {
///     let tokens = TokenKeys::new("secret", chrono::Duration::hours(1));
///     let state = ApiState::initialize(Arc::new(MemoryStore::new()), Clock::default(), tokens).await?;
///     let app = router(Arc::new(state));
///     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
///     axum::serve(listener, app).await?;
///     Ok(())
/// }
/// ```
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Dealer registration and login
        .merge(routes::auth::routes())
        // Booking submission and management
        .merge(routes::booking::routes())
        // Schedule publication and availability
        .merge(routes::schedule::routes())
        .with_state(state)
}

/// Installs the global fmt subscriber at `level`.
///
/// # Returns
///
/// * `Result<()>` - Fails when a global subscriber is already installed
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Starts the API server on the configured address.
///
/// The booking status table is loaded before the listener is bound; a missing
/// status row aborts startup.
///
/// # Arguments
///
/// * `config` - API configuration including host, port, token and timezone settings
/// * `db_pool` - PostgreSQL connection pool backing the store
///
/// # Returns
///
/// * `Result<()>` - Returns only when the server stops or fails to start
///
/// # Example
///
/// ```no_run
/// use dealerbook_api::{config::ApiConfig, start_server};
///
/// async fn example() -> eyre::Result<()> {
///     let config = ApiConfig::from_env()?;
///     let db_pool = dealerbook_db::create_pool(&config.database_url, config.database_max_connections).await?;
///     start_server(config, db_pool).await
/// }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    let store: SharedStore = Arc::new(PgStore::new(db_pool));
    let tokens = TokenKeys::new(&config.jwt_secret, chrono::Duration::hours(config.jwt_ttl_hours));
    let state = ApiState::initialize(store, Clock::Zoned(config.timezone), tokens)
        .await
        .wrap_err("Failed to initialize application state")?;

    let app = router(Arc::new(state));

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    // Add request timeout and tracing middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(HandleErrorLayer::new(middleware::error_handling::handle_timeout_error))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(timezone = %config.timezone, "Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
