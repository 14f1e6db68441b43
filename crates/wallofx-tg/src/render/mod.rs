//! Rendering of tweets into high resolution PNG images.
//!
//! The rendering happens in two stages. First, [`layout::plan`] measures
//! every block of the image and produces a [`layout::LayoutPlan`]. Then the
//! painter draws the plan on a canvas of exactly the planned size.

mod encode;
mod fonts;
mod format;
mod media;
mod paint;
mod text;
mod theme;

pub(crate) mod layout;

pub use fonts::Fonts;
pub use theme::{Theme, ThemeName};

pub(crate) use media::load_media;

use crate::prelude::*;
use crate::tweet::TweetRecord;
use crate::{err, Result};
use bytes::Bytes;
use image::RgbaImage;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Instant;

/// Ratio between the physical and the logical pixels. Everything is drawn
/// at this scale, and the output is not downsampled.
pub(crate) const SCALE: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Config {
    /// Used when the message doesn't specify a theme
    #[serde(default)]
    pub(crate) theme: ThemeName,

    pub(crate) font_regular: Option<PathBuf>,
    pub(crate) font_bold: Option<PathBuf>,

    /// Directory where the copies of the rendered images are saved
    pub(crate) output_dir: Option<PathBuf>,
}

/// Downloaded and decoded media of a tweet
#[derive(Debug, Default)]
pub struct TweetMedia {
    pub avatar: Option<RgbaImage>,

    /// Only the images that were loaded successfully, in the original order
    pub images: Vec<RgbaImage>,
}

#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub png: Bytes,
    pub width: u32,
    pub height: u32,
    pub dpi: u32,

    /// `None` if the tweet has no media
    pub(crate) arrangement: Option<layout::Arrangement>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum RenderError {
    #[error("Tweet has an empty `{field}`")]
    MissingField { field: &'static str },

    #[error("Failed to decode image")]
    DecodeImage { source: image::ImageError },

    #[error("Failed to encode PNG")]
    EncodePng { source: png::EncodingError },
}

/// Stateless renderer that owns the fonts. It is cheap to share between
/// concurrent requests behind an `Arc`.
pub struct Renderer {
    fonts: Fonts,
}

impl Renderer {
    pub fn new(fonts: Fonts) -> Self {
        Self { fonts }
    }

    pub(crate) fn from_config(config: &Config) -> Self {
        Self::new(Fonts::load(
            config.font_regular.as_deref(),
            config.font_bold.as_deref(),
        ))
    }

    /// Pure function of its inputs. The same record, media and theme always
    /// produce byte-identical images.
    pub fn render(
        &self,
        record: &TweetRecord,
        media: &TweetMedia,
        theme: ThemeName,
    ) -> Result<RenderedImage> {
        let start = Instant::now();

        if record.author_name.trim().is_empty() {
            return Err(err!(RenderError::MissingField { field: "author_name" }));
        }
        if record.author_username.trim().is_empty() {
            return Err(err!(RenderError::MissingField {
                field: "author_username"
            }));
        }

        let images: Vec<_> = media.images.iter().map(RgbaImage::dimensions).collect();
        let plan = layout::plan(record, &images, &self.fonts);

        let canvas = paint::Painter::new(&plan, theme.palette(), &self.fonts).draw(&plan, media);

        let png = encode::encode_png(&canvas)?;

        let elapsed = start.elapsed();
        let theme_label: &'static str = theme.into();
        let arrangement = plan.arrangement();

        metrics::histogram!("render_duration_seconds", "theme" => theme_label).record(elapsed);

        info!(
            duration = tracing_duration(elapsed),
            theme = theme_label,
            width = plan.width,
            height = plan.height,
            media = arrangement.map(<&'static str>::from),
            size = %humansize::format_size(png.len(), humansize::BINARY),
            "Rendered tweet"
        );

        Ok(RenderedImage {
            png: png.into(),
            width: plan.width,
            height: plan.height,
            dpi: encode::DPI,
            arrangement,
        })
    }
}
