//! Prefix commands - show and change the command prefix of a guild.

mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
        util::strings,
    };
    use tracing::info;

    /// Shows the command prefix used here.
    #[poise::command(slash_command, prefix_command)]
    pub async fn prefix(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let prefixes = &ctx.data().prefixes;
        let prefix = match ctx.guild_id() {
            Some(guild_id) => prefixes.guild_prefix(guild_id.get()).await,
            None => prefixes.private_prefix().to_string(),
        };
        let reply = strings::format("The current prefix is `{0}`", &[&prefix]);
        ctx.say(reply).await?;
        Ok(())
    }

    /// Changes the command prefix of this server.
    #[poise::command(
        slash_command,
        prefix_command,
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn setprefix(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "The new prefix (1-100 characters)"] new_prefix: String,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        match ctx
            .data()
            .prefixes
            .set_guild_prefix(guild_id.get(), &new_prefix)
            .await
        {
            Ok(stored) => {
                info!(guild = guild_id.get(), prefix = %stored, "Changed guild prefix");
                let reply = strings::format("The prefix is now `{0}`", &[&stored]);
                ctx.say(reply).await?;
            }
            Err(Error::InvalidArgument { message }) => {
                ctx.say(message).await?;
            }
            Err(error) => return Err(error),
        }
        Ok(())
    }
}

pub use inner::*;
