//! Processing of a single tweet request from the URL to the delivered image.

use crate::http::FetchBlob;
use crate::prelude::*;
use crate::render::{self, RenderedImage, Renderer, ThemeName};
use crate::tweet::{Extract, TweetRecord};
use crate::{util, Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use teloxide::types::MessageId;

const FETCHING_TEXT: &str = "Fetching tweet...";
const RENDERING_TEXT: &str = "Creating image...";
const FAILURE_TEXT: &str = "Something went wrong. Please try again later.";

const CAPTION_TEXT_MAX_CHARS: usize = 150;

/// The way back to the user who sent the request
#[async_trait]
pub(crate) trait Replier: Send + Sync {
    /// Sends a message that is edited as the request makes progress
    async fn send_progress(&self, text: &str) -> Result<MessageId>;

    async fn edit_progress(&self, progress: MessageId, text: &str) -> Result;

    async fn delete_progress(&self, progress: MessageId) -> Result;

    async fn send_image(&self, image: &RenderedImage, caption: &str) -> Result;
}

#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub(crate) url: String,

    /// Overrides the default theme
    pub(crate) theme: Option<ThemeName>,
}

#[derive(Debug, Clone, Copy, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum Stage {
    Extract,
    Render,
    Send,
}

pub(crate) struct PipelineOptions {
    pub(crate) extractor: Arc<dyn Extract>,
    pub(crate) blobs: Arc<dyn FetchBlob>,
    pub(crate) renderer: Arc<Renderer>,
    pub(crate) default_theme: ThemeName,
    pub(crate) output_dir: Option<PathBuf>,
}

/// Shared between all concurrent requests
pub(crate) struct Pipeline {
    opts: PipelineOptions,
}

impl Pipeline {
    pub(crate) fn new(opts: PipelineOptions) -> Self {
        Self { opts }
    }

    /// Either an image or exactly one failure notice is delivered to the
    /// user. The error is returned only for logging.
    pub(crate) async fn process(&self, replier: &dyn Replier, request: &Request) -> Result {
        let progress = replier.send_progress(FETCHING_TEXT).await?;

        let Err((stage, err)) = self.try_process(replier, progress, request).await else {
            return Ok(());
        };

        let stage: &'static str = stage.into();
        metrics::counter!("pipeline_failures_total", "stage" => stage).increment(1);

        if let Err(err) = replier.edit_progress(progress, FAILURE_TEXT).await {
            warn!(err = tracing_err(&err), "Failed to report the failure to the user");
        }

        Err(err)
    }

    async fn try_process(
        &self,
        replier: &dyn Replier,
        progress: MessageId,
        request: &Request,
    ) -> Result<(), (Stage, Error)> {
        let record = self
            .opts
            .extractor
            .extract(&request.url)
            .await
            .map_err(|err| (Stage::Extract, err))?;

        if let Err(err) = replier.edit_progress(progress, RENDERING_TEXT).await {
            warn!(err = tracing_err(&err), "Failed to update the progress message");
        }

        let theme = request.theme.unwrap_or(self.opts.default_theme);

        let (record, image) = self
            .render(record, theme)
            .await
            .map_err(|err| (Stage::Render, err))?;

        if let Some(dir) = &self.opts.output_dir {
            save(dir, &record, theme, &image).await;
        }

        replier
            .send_image(&image, &caption(&record))
            .await
            .map_err(|err| (Stage::Send, err))?;

        if let Err(err) = replier.delete_progress(progress).await {
            warn!(err = tracing_err(&err), "Failed to delete the progress message");
        }

        Ok(())
    }

    async fn render(
        &self,
        record: TweetRecord,
        theme: ThemeName,
    ) -> Result<(TweetRecord, RenderedImage)> {
        let media = render::load_media(self.opts.blobs.as_ref(), &record)
            .instrument(info_span!("load_media"))
            .await;

        let media_label = media.images.len().to_string();
        let theme_label: &'static str = theme.into();

        let renderer = self.opts.renderer.clone();
        let span = info_span!("render", theme = theme_label);

        let image = util::tokio::spawn_blocking(move || {
            span.in_scope(|| renderer.render(&record, &media, theme))
                .map(|image| (record, image))
        })
        .await?;

        metrics::counter!(
            "tweets_rendered_total",
            "theme" => theme_label,
            "media" => media_label
        )
        .increment(1);

        Ok(image)
    }
}

/// Copy of the image for the operator. Failures don't affect the user.
async fn save(dir: &Path, record: &TweetRecord, theme: ThemeName, image: &RenderedImage) {
    let path = dir.join(format!("tweet_{}_{theme}.png", record.id));

    let result = async {
        fs_err::tokio::create_dir_all(dir).await?;
        fs_err::tokio::write(&path, &image.png).await
    };

    match result.await {
        Ok(()) => debug!(path = %path.display(), "Saved the image"),
        Err(err) => warn!(
            path = %path.display(),
            err = tracing_err(&err),
            "Failed to save the image"
        ),
    }
}

fn caption(record: &TweetRecord) -> String {
    let text = record.text.truncate_chars(CAPTION_TEXT_MAX_CHARS, "...");
    format!("@{}: {text}", record.author_username)
}
