use super::{BotData, PrefixProvider, commands};
use crate::config::AppConfig;
use crate::database::Database;
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use tracing::{error, info, instrument};

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Resolves the prefix for an incoming message.
async fn dynamic_prefix(
    ctx: poise::PartialContext<'_, BotData, Error>,
) -> Result<Option<String>> {
    let prefixes = &ctx.data.prefixes;
    let prefix = match ctx.guild_id {
        Some(guild_id) => prefixes.guild_prefix(guild_id.get()).await,
        None => prefixes.private_prefix().to_string(),
    };
    Ok(Some(prefix))
}

/// Runs the bot until the gateway connection ends.
///
/// Creates the guild table if it is missing, then registers all commands
/// globally once the client is ready.
///
/// # Errors
/// Returns an error if the guild table cannot be created or the client fails.
#[instrument(skip(token, config, database))]
pub async fn run_bot(token: &str, config: &AppConfig, database: Database) -> Result<()> {
    database
        .create_table(&config.bot.guild_table, &config.bot.guild_table_columns())
        .await?;
    let prefixes = PrefixProvider::cached(database.clone(), &config.bot, &config.cache);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                dynamic_prefix: Some(|ctx| Box::pin(dynamic_prefix(ctx))),
                mention_as_prefix: true,
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, prefixes))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
