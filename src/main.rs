use color_eyre::eyre::Result;
use dotenv::dotenv;
use dealerbook_api::config::ApiConfig;
use dealerbook_db::{create_pool, schema::initialize_database};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    dealerbook_api::init_tracing(config.log_level)?;

    // Create database connection pool
    info!(max_connections = config.database_max_connections, "connecting to database");
    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Start API server
    dealerbook_api::start_server(config, db_pool).await?;

    Ok(())
}
