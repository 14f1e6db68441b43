use crate::prelude::*;
use crate::render::ThemeName;
use crate::tg;
use crate::util::DynResult;
use itertools::Itertools;
use std::sync::Arc;
use strum::IntoEnumIterator;
use teloxide::macros::BotCommands;
use teloxide::prelude::*;
use teloxide::types::{ReplyParameters, User};
use teloxide::utils::command::BotCommands as _;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub(crate) enum Cmd {
    #[command(description = "show the welcome message")]
    Start,

    #[command(description = "how to use this bot")]
    Help,
}

pub(crate) async fn handle(ctx: Arc<tg::Ctx>, msg: Message, cmd: Cmd) -> DynResult {
    let span = info_span!(
        "handle_command",
        sender = msg.from.as_ref().map(User::debug_id).as_deref(),
        chat = %msg.chat.debug_id(),
        cmd = ?cmd
    );

    async {
        debug!("Processing command");

        let text = match cmd {
            Cmd::Start => welcome_text(),
            Cmd::Help => help_text(),
        };

        ctx.bot
            .send_message(msg.chat.id, text)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;

        Ok(())
    }
    .instrument(span)
    .await
}

fn welcome_text() -> String {
    let commands = Cmd::descriptions();

    format!(
        "Welcome to WallOfX!\n\n\
        Turn any tweet into a beautiful, high-quality image ready for sharing or printing.\n\n\
        Just send me a tweet URL and I'll do the rest.\n\n\
        {commands}"
    )
}

fn help_text() -> String {
    let themes = ThemeName::iter().join(", ");

    format!(
        "How to use WallOfX:\n\n\
        1. Find a tweet on Twitter/X\n\
        2. Copy the tweet URL\n\
        3. Paste and send it here\n\
        4. Get your image!\n\n\
        Supported URLs:\n\
        twitter.com/user/status/...\n\
        x.com/user/status/...\n\
        fxtwitter.com, vxtwitter.com and fixupx.com links work too.\n\n\
        Add a theme name after the URL to change the colors: {themes}.\n\
        Example: https://x.com/user/status/123456 light\n\n\
        The images are high resolution (300 DPI) - perfect for printing or sharing."
    )
}
