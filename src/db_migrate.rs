use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use dealerbook_db::schema::initialize_database;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    // Load environment variables
    dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable must be set")?;
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    info!("Connecting to database...");
    let db_pool = dealerbook_db::create_pool(&database_url, max_connections).await?;

    // Create tables, indexes and the booking status rows
    initialize_database(&db_pool).await?;

    Ok(())
}
