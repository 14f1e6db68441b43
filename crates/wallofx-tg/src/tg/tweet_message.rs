use crate::pipeline::{Replier, Request};
use crate::prelude::*;
use crate::render::{RenderedImage, ThemeName};
use crate::tg::{self, Bot};
use crate::util::DynResult;
use crate::{tweet, Result};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId, ReplyParameters, User};

const USAGE_HINT: &str = "Please send a valid tweet URL.\nExample: https://x.com/user/status/123456";

/// Text of the message that isn't a command
pub(crate) fn filter_map(msg: Message) -> Option<String> {
    let text = msg.text()?;
    (!text.starts_with('/')).then(|| text.to_owned())
}

/// Finds the first tweet URL in the message. The word right after it may
/// name the theme.
fn parse_request(text: &str) -> Option<Request> {
    let (url, _) = tweet::find_tweet_url(text)?;

    let rest = text.split_once(url).map(|(_, rest)| rest).unwrap_or_default();

    let theme = rest.split_whitespace().next().and_then(|word| {
        word.trim_matches(|ch: char| !ch.is_alphanumeric())
            .parse::<ThemeName>()
            .ok()
    });

    Some(Request {
        url: url.to_owned(),
        theme,
    })
}

pub(crate) async fn handle(ctx: Arc<tg::Ctx>, msg: Message, text: String) -> DynResult {
    let Some(request) = parse_request(&text) else {
        // Groups are full of unrelated messages
        if msg.chat.is_private() {
            ctx.bot
                .send_message(msg.chat.id, USAGE_HINT)
                .reply_parameters(ReplyParameters::new(msg.id))
                .await?;
        }
        return Ok(());
    };

    let span = info_span!(
        "handle_tweet",
        sender = msg.from.as_ref().map(User::debug_id).as_deref(),
        chat = %msg.chat.debug_id(),
        url = %request.url,
        theme = ?request.theme
    );

    async {
        let replier = TgReplier {
            bot: ctx.bot.clone(),
            chat_id: msg.chat.id,
            reply_to: msg.id,
        };

        let result = ctx
            .pipeline
            .process(&replier, &request)
            .with_duration_log("Processed tweet request")
            .await;

        // The user already got the failure notice, so the error stops here
        if let Err(err) = result {
            error!(
                err = tracing_err(&err),
                id = err.id(),
                kind = err.kind_label(),
                "Failed to process tweet request"
            );
        }

        Ok(())
    }
    .instrument(span)
    .await
}

struct TgReplier {
    bot: Bot,
    chat_id: ChatId,
    reply_to: MessageId,
}

#[async_trait]
impl Replier for TgReplier {
    async fn send_progress(&self, text: &str) -> Result<MessageId> {
        let msg = self
            .bot
            .send_message(self.chat_id, text)
            .reply_parameters(ReplyParameters::new(self.reply_to))
            .await?;

        Ok(msg.id)
    }

    async fn edit_progress(&self, progress: MessageId, text: &str) -> Result {
        self.bot
            .edit_message_text(self.chat_id, progress, text)
            .await?;
        Ok(())
    }

    async fn delete_progress(&self, progress: MessageId) -> Result {
        self.bot.delete_message(self.chat_id, progress).await?;
        Ok(())
    }

    async fn send_image(&self, image: &RenderedImage, caption: &str) -> Result {
        let photo = InputFile::memory(image.png.clone()).file_name("tweet.png");

        self.bot
            .send_photo(self.chat_id, photo)
            .caption(caption)
            .reply_parameters(ReplyParameters::new(self.reply_to))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};

    #[track_caller]
    fn assert_request(text: &str, expected: Expect) {
        let actual = match parse_request(text) {
            Some(request) => format!("{} {:?}", request.url, request.theme),
            None => "None".to_owned(),
        };
        expected.assert_eq(&actual);
    }

    #[test]
    fn parses_requests() {
        assert_request(
            "https://x.com/user/status/123",
            expect!["https://x.com/user/status/123 None"],
        );
        assert_request(
            "look at this https://twitter.com/user/status/123?s=20 please",
            expect!["https://twitter.com/user/status/123?s=20 None"],
        );
        assert_request(
            "https://x.com/user/status/123 LIGHT",
            expect!["https://x.com/user/status/123 Some(Light)"],
        );
        assert_request(
            "https://x.com/user/status/123 sepia, please",
            expect!["https://x.com/user/status/123 Some(Sepia)"],
        );
        assert_request("hello there", expect!["None"]);
    }

    #[test]
    fn theme_in_prose_is_ignored() {
        assert_request(
            "https://x.com/user/status/1 this is a light read",
            expect!["https://x.com/user/status/1 None"],
        );
        assert_request(
            "https://x.com/user/status/1 in sepia, please",
            expect!["https://x.com/user/status/1 None"],
        );
    }

    #[test]
    fn theme_before_the_url_is_ignored() {
        assert_request(
            "light https://x.com/user/status/123 neon",
            expect!["https://x.com/user/status/123 None"],
        );
    }
}
