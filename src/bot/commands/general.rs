//! General Discord commands - ping, help and version.
//! These commands answer without touching the database, apart from `help`
//! which shows the prefix of the current guild.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
        util::{Version, strings},
    };

    const HELP_TEMPLATE: &str = "**guildkit Help**\n\
        Commands work as slash commands or with the prefix `{0}`.\n\n\
        **Prefix Commands**\n\
        • `{0}prefix` - Shows the prefix of this server.\n\
        • `{0}setprefix <prefix>` - Changes the prefix (requires Manage Server).\n\n\
        **Utility Commands**\n\
        • `{0}ping` - Checks if the bot is responsive.\n\
        • `{0}version` - Shows the running version.\n\
        • `{0}help` - Shows this help message.";

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let prefixes = &ctx.data().prefixes;
        let prefix = match ctx.guild_id() {
            Some(guild_id) => prefixes.guild_prefix(guild_id.get()).await,
            None => prefixes.private_prefix().to_string(),
        };
        let help = strings::format(HELP_TEMPLATE, &[&prefix]);
        ctx.say(help).await?;
        Ok(())
    }

    /// Shows the running bot version.
    #[poise::command(slash_command, prefix_command)]
    pub async fn version(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let version = Version::parse(env!("CARGO_PKG_VERSION"));
        ctx.say(format!("guildkit v{version}")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
