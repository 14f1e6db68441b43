//! The measure stage of the renderer. Computes the positions and sizes of
//! everything on the canvas without drawing anything.

use super::fonts::{MeasureText, TextStyle};
use super::{format, text, SCALE};
use crate::tweet::TweetRecord;

const fn px(logical: u32) -> u32 {
    logical * SCALE
}

pub(crate) const CANVAS_WIDTH: u32 = px(1200);
pub(crate) const PADDING_X: u32 = px(72);
const PADDING_TOP: u32 = px(72);
const PADDING_BOTTOM: u32 = px(64);
pub(crate) const CONTENT_WIDTH: u32 = CANVAS_WIDTH - 2 * PADDING_X;
const BLOCK_GAP: u32 = px(32);

pub(crate) const AVATAR_SIZE: u32 = px(96);
pub(crate) const AVATAR_TEXT_GAP: u32 = px(20);
pub(crate) const BADGE_SIZE: u32 = px(28);
pub(crate) const BADGE_GAP: u32 = px(10);

const LINE_HEIGHT: u32 = px(56);
const BLANK_LINE_HEIGHT: u32 = LINE_HEIGHT / 2;

pub(crate) const MEDIA_GAP: u32 = px(8);
pub(crate) const MEDIA_RADIUS: u32 = px(16);

/// Tall single images are cropped to this height relative to the width
const MAX_ASPECT_NUM: u32 = 5;
const MAX_ASPECT_DEN: u32 = 4;

/// Grid cells are 4:3
const GRID_ASPECT_NUM: u32 = 3;
const GRID_ASPECT_DEN: u32 = 4;

pub(crate) const MAX_IMAGES: usize = 4;

pub(crate) const DIVIDER_THICKNESS: u32 = px(1);
const FOOTER_GAP: u32 = px(24);
pub(crate) const METRICS_ROW_HEIGHT: u32 = px(40);
pub(crate) const BRANDING_ROW_HEIGHT: u32 = px(32);
pub(crate) const ICON_SIZE: u32 = px(26);
pub(crate) const ICON_GAP: u32 = px(10);
pub(crate) const LOGO_SIZE: u32 = px(24);

pub(crate) const BRANDING: &str = "Posted on X";

/// Everything on the canvas, positions are absolute
#[derive(Debug)]
pub(crate) struct LayoutPlan {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) blocks: Vec<PlacedBlock>,
}

#[derive(Debug)]
pub(crate) struct PlacedBlock {
    pub(crate) y: u32,
    pub(crate) height: u32,
    pub(crate) block: Block,
}

#[derive(Debug)]
pub(crate) enum Block {
    Header(Header),
    Body(Body),
    Media(Media),
    Footer(Footer),
}

#[derive(Debug)]
pub(crate) struct Header {
    pub(crate) name: String,
    pub(crate) name_width: u32,
    pub(crate) verified: bool,

    /// `@username · Mon DD, YYYY`
    pub(crate) meta: String,

    /// Drawn instead of the avatar when it's unavailable
    pub(crate) initials: String,
}

#[derive(Debug)]
pub(crate) struct Body {
    pub(crate) lines: Vec<PlacedLine>,
}

#[derive(Debug)]
pub(crate) struct PlacedLine {
    pub(crate) y: u32,
    pub(crate) height: u32,
    pub(crate) line: text::Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Arrangement {
    Single,
    TwoUp,
    Grid,
}

#[derive(Debug)]
pub(crate) struct Media {
    pub(crate) arrangement: Arrangement,
    pub(crate) cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cell {
    /// Index of the image in the media list
    pub(crate) image: usize,
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetricIcon {
    Reply,
    Repost,
    Like,
    Views,
}

#[derive(Debug)]
pub(crate) struct MetricSlot {
    pub(crate) icon: MetricIcon,
    pub(crate) x: u32,
    pub(crate) label: String,
}

#[derive(Debug)]
pub(crate) struct Footer {
    pub(crate) metrics_y: u32,
    pub(crate) metrics: Vec<MetricSlot>,
    pub(crate) branding_y: u32,
    pub(crate) timestamp: String,
    pub(crate) timestamp_x: u32,
}

/// `images` are the dimensions of the images that will be drawn, in order
pub(crate) fn plan(
    record: &TweetRecord,
    images: &[(u32, u32)],
    measure: &dyn MeasureText,
) -> LayoutPlan {
    let mut stack = Stack {
        y: PADDING_TOP,
        blocks: vec![],
    };

    stack.push(AVATAR_SIZE, |_| Block::Header(plan_header(record, measure)));

    if !record.text.trim().is_empty() {
        let lines = text::wrap(&record.text, TextStyle::Body, CONTENT_WIDTH, measure);
        let height = lines.iter().map(line_height).sum();
        stack.push(height, |y| Block::Body(place_lines(y, lines)));
    }

    let images = &images[..images.len().min(MAX_IMAGES)];
    if let Some((arrangement, height)) = measure_media(images) {
        stack.push(height, |y| {
            Block::Media(Media {
                arrangement,
                cells: place_cells(arrangement, images, y),
            })
        });
    }

    stack.push(footer_height(), |y| Block::Footer(plan_footer(record, y, measure)));

    LayoutPlan {
        width: CANVAS_WIDTH,
        height: stack.y + PADDING_BOTTOM,
        blocks: stack.blocks,
    }
}

struct Stack {
    /// Bottom edge of the last block
    y: u32,
    blocks: Vec<PlacedBlock>,
}

impl Stack {
    fn push(&mut self, height: u32, block: impl FnOnce(u32) -> Block) {
        if !self.blocks.is_empty() {
            self.y += BLOCK_GAP;
        }

        let y = self.y;
        self.blocks.push(PlacedBlock {
            y,
            height,
            block: block(y),
        });
        self.y += height;
    }
}

fn plan_header(record: &TweetRecord, measure: &dyn MeasureText) -> Header {
    let text_width = CONTENT_WIDTH - AVATAR_SIZE - AVATAR_TEXT_GAP;
    let badge_width = if record.verified { BADGE_GAP + BADGE_SIZE } else { 0 };

    let name = text::ellipsize(
        &record.author_name,
        TextStyle::Name,
        text_width - badge_width,
        measure,
    );

    let meta = format!(
        "@{} · {}",
        record.author_username,
        format::format_short_date(record.created_at)
    );

    Header {
        name_width: measure.text_width(TextStyle::Name, &name),
        name,
        verified: record.verified,
        meta: text::ellipsize(&meta, TextStyle::Meta, text_width, measure),
        initials: format::initials(&record.author_name),
    }
}

fn line_height(line: &text::Line) -> u32 {
    if line.is_blank() {
        BLANK_LINE_HEIGHT
    } else {
        LINE_HEIGHT
    }
}

fn place_lines(mut y: u32, lines: Vec<text::Line>) -> Body {
    let lines = lines
        .into_iter()
        .map(|line| {
            let height = line_height(&line);
            let placed = PlacedLine { y, height, line };
            y += height;
            placed
        })
        .collect();

    Body { lines }
}

/// Height of the image scaled to the given width, at least 1 px
fn scaled_height((width, height): (u32, u32), target_width: u32) -> u32 {
    let scaled = u64::from(target_width) * u64::from(height) / u64::from(width.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

fn half_width() -> u32 {
    (CONTENT_WIDTH - MEDIA_GAP) / 2
}

fn max_height(width: u32) -> u32 {
    width * MAX_ASPECT_NUM / MAX_ASPECT_DEN
}

fn grid_cell_height() -> u32 {
    half_width() * GRID_ASPECT_NUM / GRID_ASPECT_DEN
}

fn two_up_height(images: &[(u32, u32)]) -> u32 {
    let width = half_width();
    images
        .iter()
        .map(|&image| scaled_height(image, width))
        .min()
        .unwrap_or(1)
        .min(max_height(width))
}

fn arrangement(count: usize) -> Option<Arrangement> {
    match count {
        0 => None,
        1 => Some(Arrangement::Single),
        2 => Some(Arrangement::TwoUp),
        _ => Some(Arrangement::Grid),
    }
}

fn measure_media(images: &[(u32, u32)]) -> Option<(Arrangement, u32)> {
    let arrangement = arrangement(images.len())?;

    let height = match arrangement {
        Arrangement::Single => scaled_height(images[0], CONTENT_WIDTH).min(max_height(CONTENT_WIDTH)),
        Arrangement::TwoUp => two_up_height(images),
        Arrangement::Grid => 2 * grid_cell_height() + MEDIA_GAP,
    };

    Some((arrangement, height))
}

fn place_cells(arrangement: Arrangement, images: &[(u32, u32)], y: u32) -> Vec<Cell> {
    match arrangement {
        Arrangement::Single => vec![Cell {
            image: 0,
            x: PADDING_X,
            y,
            width: CONTENT_WIDTH,
            height: scaled_height(images[0], CONTENT_WIDTH).min(max_height(CONTENT_WIDTH)),
        }],
        Arrangement::TwoUp => {
            let height = two_up_height(images);
            (0..2)
                .map(|i| Cell {
                    image: i,
                    x: PADDING_X + i as u32 * (half_width() + MEDIA_GAP),
                    y,
                    width: half_width(),
                    height,
                })
                .collect()
        }
        Arrangement::Grid => {
            let height = grid_cell_height();
            (0..images.len())
                .map(|i| {
                    let (row, col) = (i as u32 / 2, i as u32 % 2);
                    Cell {
                        image: i,
                        x: PADDING_X + col * (half_width() + MEDIA_GAP),
                        y: y + row * (height + MEDIA_GAP),
                        width: half_width(),
                        height,
                    }
                })
                .collect()
        }
    }
}

fn footer_height() -> u32 {
    DIVIDER_THICKNESS + FOOTER_GAP + METRICS_ROW_HEIGHT + FOOTER_GAP + BRANDING_ROW_HEIGHT
}

fn plan_footer(record: &TweetRecord, y: u32, measure: &dyn MeasureText) -> Footer {
    let metrics = &record.metrics;

    let slot_width = CONTENT_WIDTH / 4;
    let label_width = slot_width - ICON_SIZE - ICON_GAP;

    let metrics = [
        (MetricIcon::Reply, metrics.replies),
        (MetricIcon::Repost, metrics.retweets),
        (MetricIcon::Like, metrics.likes),
        (MetricIcon::Views, metrics.views),
    ]
    .into_iter()
    .zip(0..)
    .map(|((icon, count), i)| MetricSlot {
        icon,
        x: PADDING_X + i * slot_width,
        label: text::ellipsize(
            &format::format_count(count),
            TextStyle::Metric,
            label_width,
            measure,
        ),
    })
    .collect();

    let timestamp = format::format_full_date(record.created_at);
    let timestamp_width = measure.text_width(TextStyle::Small, &timestamp);

    Footer {
        metrics_y: y + DIVIDER_THICKNESS + FOOTER_GAP,
        metrics,
        branding_y: y + footer_height() - BRANDING_ROW_HEIGHT,
        timestamp_x: (CANVAS_WIDTH - PADDING_X).saturating_sub(timestamp_width),
        timestamp,
    }
}

impl LayoutPlan {
    /// How the images are placed, `None` if the tweet has no media
    pub(crate) fn arrangement(&self) -> Option<Arrangement> {
        self.blocks.iter().find_map(|placed| match &placed.block {
            Block::Media(media) => Some(media.arrangement),
            _ => None,
        })
    }
}

impl Block {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Header(_) => "header",
            Self::Body(_) => "body",
            Self::Media(_) => "media",
            Self::Footer(_) => "footer",
        }
    }
}
