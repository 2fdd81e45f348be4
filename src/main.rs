use dotenvy::dotenv;
use guildkit::bot;
use guildkit::config;
use guildkit::database::Database;
use guildkit::errors::{Error, Result};
use std::env;
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
    info!("Attempted to load .env file.");

    // 3. Load config.toml plus DATABASE_* overrides
    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(backend = ?app_config.database.backend, "Successfully processed application configuration.");

    // 4. Connect to the configured backend
    let database = Database::connect(&app_config.database)
        .await
        .inspect(|_| info!("Database connected successfully."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    // 5. Run the bot; the token is read right before use and never stored in the config
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(&token, &app_config, database).await?;

    Ok(())
}
