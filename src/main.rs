use dotenvy::dotenv;
use pocketledger::{config, errors::Result, scheduler};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::settings::load_default_config()
        .inspect_err(|e| error!("Failed to load application configuration: {e}"))?;
    info!("Application configuration loaded.");

    // 4. Initialize the database
    let database_url = app_config.resolve_database_url();
    let db = config::database::create_connection(&database_url)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to initialize database schema: {e}"))?;

    // 5. Run the periodic jobs
    scheduler::run(db, &app_config, scheduler::LogNotifier).await;

    Ok(())
}
