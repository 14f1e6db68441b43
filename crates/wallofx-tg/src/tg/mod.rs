//! Telegram commands root module

mod cmd;
mod config;
mod tweet_message;

use crate::pipeline::Pipeline;
use crate::prelude::*;
use crate::Result;
use dptree::di::DependencyMap;
use std::sync::Arc;
use teloxide::adaptors::{CacheMe, Throttle, Trace};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub(crate) use config::*;

pub(crate) type Bot = Trace<CacheMe<Throttle<teloxide::Bot>>>;

pub(crate) struct Ctx {
    bot: Bot,
    pipeline: Pipeline,
}

pub(crate) struct RunBotOptions {
    pub(crate) tg_cfg: Config,
    pub(crate) pipeline: Pipeline,
}

pub(crate) async fn run_bot(opts: RunBotOptions) -> Result {
    let mut di = DependencyMap::new();

    let bot: Bot = teloxide::Bot::new(opts.tg_cfg.token)
        .throttle(Default::default())
        .cache_me()
        .trace(teloxide::adaptors::trace::Settings::all());

    di.insert(Arc::new(Ctx {
        bot: bot.clone(),
        pipeline: opts.pipeline,
    }));

    info!("Connecting to Telegram...");

    bot.set_my_commands(cmd::Cmd::bot_commands()).await?;

    let handler = dptree::entry()
        .inspect(|update: Update| {
            metrics::counter!("tg_updates_total", "kind" => update.kind.discriminator())
                .increment(1);
        })
        .branch(
            Update::filter_message()
                .filter_command::<cmd::Cmd>()
                .endpoint(cmd::handle),
        )
        .branch(
            Update::filter_message()
                .chain(dptree::filter_map(tweet_message::filter_map))
                .endpoint(tweet_message::handle),
        )
        .inspect(|update: Update| {
            metrics::counter!("tg_updates_skipped_total", "kind" => update.kind.discriminator())
                .increment(1);
        });

    Dispatcher::builder(bot, handler)
        .dependencies(di)
        // We don't handle all possible updates that users send,
        // so to suppress the warning that we don't do this we have
        // a noop default handler here
        .default_handler(|_| std::future::ready(()))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");

    Ok(())
}
