//! The draw stage of the renderer. Follows the [`LayoutPlan`] exactly,
//! nothing is measured here except for the vertical alignment of glyphs.

mod icons;
mod shapes;

use super::fonts::{Face, Fonts, TextStyle};
use super::layout::*;
use super::{media, Theme, TweetMedia};
use crate::prelude::*;
use image::{Rgb, RgbImage, RgbaImage};

pub(crate) struct Painter<'a> {
    canvas: RgbImage,
    theme: &'a Theme,
    fonts: &'a Fonts,
}

impl<'a> Painter<'a> {
    pub(crate) fn new(plan: &LayoutPlan, theme: &'a Theme, fonts: &'a Fonts) -> Self {
        Self {
            canvas: RgbImage::from_pixel(plan.width, plan.height, theme.background),
            theme,
            fonts,
        }
    }

    pub(crate) fn draw(mut self, plan: &LayoutPlan, media: &TweetMedia) -> RgbImage {
        for placed in &plan.blocks {
            trace!(block = placed.block.kind(), y = placed.y, height = placed.height, "Drawing block");

            match &placed.block {
                Block::Header(header) => self.header(placed.y, header, media.avatar.as_ref()),
                Block::Body(body) => self.body(body),
                Block::Media(layout) => self.media(layout, &media.images),
                Block::Footer(footer) => self.footer(placed.y, footer),
            }
        }

        self.canvas
    }

    fn text(&mut self, style: TextStyle, x: u32, y: f32, color: Rgb<u8>, text: &str) {
        let face = self.fonts.face(style);

        for glyph in face.layout(text, x as f32, y) {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };

            glyph.draw(|gx, gy, coverage| {
                let x = bounds.min.x + gx as i32;
                let y = bounds.min.y + gy as i32;
                if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
                    shapes::blend(&mut self.canvas, x, y, color, coverage);
                }
            });
        }
    }

    /// Top of the text that is vertically centered in the row
    fn centered_text_top(&self, style: TextStyle, row_y: u32, row_height: u32) -> f32 {
        text_top(&self.fonts.face(style), row_y, row_height)
    }

    fn header(&mut self, y: u32, header: &Header, avatar: Option<&RgbaImage>) {
        let avatar = avatar.and_then(|avatar| {
            media::cover(avatar, AVATAR_SIZE, AVATAR_SIZE)
                .map_err(|err| warn!(err = tracing_err(&err), "Failed to resize the avatar"))
                .ok()
        });

        let radius = AVATAR_SIZE as f32 / 2.0;

        match avatar {
            Some(avatar) => {
                let circle = shapes::circle((radius, radius), radius);
                shapes::draw_image(&mut self.canvas, &avatar, (PADDING_X, y), |point| {
                    shapes::coverage(circle(point))
                });
            }
            None => self.avatar_placeholder(y, &header.initials),
        }

        let text_x = PADDING_X + AVATAR_SIZE + AVATAR_TEXT_GAP;
        let row_height = AVATAR_SIZE / 2;

        let name_y = self.centered_text_top(TextStyle::Name, y, row_height);
        self.text(TextStyle::Name, text_x, name_y, self.theme.text, &header.name);

        if header.verified {
            icons::verified_badge(
                &mut self.canvas,
                text_x + header.name_width + BADGE_GAP,
                y + (row_height - BADGE_SIZE) / 2,
                BADGE_SIZE,
                self.theme.accent,
                self.theme.on_accent,
            );
        }

        let meta_y = self.centered_text_top(TextStyle::Meta, y + row_height, row_height);
        self.text(TextStyle::Meta, text_x, meta_y, self.theme.secondary, &header.meta);
    }

    fn avatar_placeholder(&mut self, y: u32, initials: &str) {
        let radius = AVATAR_SIZE as f32 / 2.0;
        let center = (PADDING_X as f32 + radius, y as f32 + radius);
        let min = (PADDING_X as f32, y as f32);
        let max = (min.0 + AVATAR_SIZE as f32, min.1 + AVATAR_SIZE as f32);

        shapes::fill(&mut self.canvas, min, max, self.theme.accent, shapes::circle(center, radius));

        let width = self.fonts.face(TextStyle::Initials).width(initials);
        let x = (PADDING_X + AVATAR_SIZE / 2).saturating_sub(width / 2);
        let text_y = self.centered_text_top(TextStyle::Initials, y, AVATAR_SIZE);

        self.text(TextStyle::Initials, x, text_y, self.theme.on_accent, initials);
    }

    fn body(&mut self, body: &Body) {
        for placed in &body.lines {
            let y = self.centered_text_top(TextStyle::Body, placed.y, placed.height);

            for fragment in &placed.line.fragments {
                let color = if fragment.kind.is_entity() {
                    self.theme.accent
                } else {
                    self.theme.text
                };

                self.text(TextStyle::Body, PADDING_X + fragment.x, y, color, &fragment.text);
            }
        }
    }

    fn media(&mut self, layout: &Media, images: &[RgbaImage]) {
        for cell in &layout.cells {
            let Some(image) = images.get(cell.image) else {
                continue;
            };

            let image = match media::cover(image, cell.width, cell.height) {
                Ok(image) => image,
                Err(err) => {
                    warn!(err = tracing_err(&err), image = cell.image, "Failed to resize image");
                    continue;
                }
            };

            let size = (cell.width as f32, cell.height as f32);
            let rect = shapes::rounded_rect((0.0, 0.0), size, MEDIA_RADIUS as f32);

            shapes::draw_image(&mut self.canvas, &image, (cell.x, cell.y), |point| {
                shapes::coverage(rect(point))
            });
        }
    }

    fn footer(&mut self, y: u32, footer: &Footer) {
        let theme = self.theme;

        shapes::fill_rect(
            &mut self.canvas,
            PADDING_X,
            y,
            CONTENT_WIDTH,
            DIVIDER_THICKNESS,
            theme.divider,
        );

        for slot in &footer.metrics {
            icons::metric(
                &mut self.canvas,
                slot.icon,
                slot.x,
                footer.metrics_y + (METRICS_ROW_HEIGHT - ICON_SIZE) / 2,
                ICON_SIZE,
                theme.icon,
            );

            let label_y = self.centered_text_top(TextStyle::Metric, footer.metrics_y, METRICS_ROW_HEIGHT);
            let label_x = slot.x + ICON_SIZE + ICON_GAP;
            self.text(TextStyle::Metric, label_x, label_y, theme.secondary, &slot.label);
        }

        icons::x_logo(
            &mut self.canvas,
            PADDING_X,
            footer.branding_y + (BRANDING_ROW_HEIGHT - LOGO_SIZE) / 2,
            LOGO_SIZE,
            theme.text,
        );

        let text_y = self.centered_text_top(TextStyle::Small, footer.branding_y, BRANDING_ROW_HEIGHT);
        let branding_x = PADDING_X + LOGO_SIZE + ICON_GAP;

        self.text(TextStyle::Small, branding_x, text_y, theme.secondary, BRANDING);
        self.text(TextStyle::Small, footer.timestamp_x, text_y, theme.secondary, &footer.timestamp);
    }
}

fn text_top(face: &Face<'_>, row_y: u32, row_height: u32) -> f32 {
    let metrics = face.v_metrics();
    let text_height = metrics.ascent - metrics.descent;
    row_y as f32 + (row_height as f32 - text_height) / 2.0
}
