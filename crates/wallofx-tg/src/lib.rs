mod config;
mod error;
mod http;
mod observability;
mod pipeline;
mod tg;

pub mod render;
pub mod tweet;
mod util;

pub use crate::error::*;
pub use config::*;
pub use observability::*;

use std::sync::Arc;

#[allow(unused_imports)]
mod prelude {
    pub(crate) use crate::error::prelude::*;
    pub(crate) use crate::http::prelude::*;
    pub(crate) use crate::observability::logging::prelude::*;
    pub(crate) use crate::util::prelude::*;
}

/// Run the telegram bot processing loop
pub async fn run(config: Config) -> Result<()> {
    tracing::info!(
        default_theme = %config.render.theme,
        output_dir = ?config.render.output_dir,
        api_url = %config.tweet.api_url,
        "Starting WallOfX bot"
    );

    let http = http::create_client();

    let pipeline = pipeline::Pipeline::new(pipeline::PipelineOptions {
        extractor: Arc::new(tweet::Client::new(config.tweet, http.clone())),
        blobs: Arc::new(http),
        renderer: Arc::new(render::Renderer::from_config(&config.render)),
        default_theme: config.render.theme,
        output_dir: config.render.output_dir,
    });

    let opts = tg::RunBotOptions {
        tg_cfg: config.tg,
        pipeline,
    };

    tg::run_bot(opts).await
}
