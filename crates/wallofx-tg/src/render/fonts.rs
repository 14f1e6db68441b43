use super::SCALE;
use crate::prelude::*;
use rusttype::{point, Font, PositionedGlyph, Scale, VMetrics};
use std::path::Path;

const BUNDLED_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Text width oracle used by the layout. Production code measures with the
/// real fonts, tests may use a simpler fixed-advance implementation.
pub(crate) trait MeasureText {
    /// Width of the text in physical pixels
    fn text_width(&self, style: TextStyle, text: &str) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextStyle {
    Name,
    Meta,
    Body,
    Metric,
    Small,
    Initials,
}

impl TextStyle {
    /// Font size in physical pixels
    pub(crate) fn size(self) -> f32 {
        let logical = match self {
            Self::Name => 34,
            Self::Meta | Self::Metric => 24,
            Self::Body => 40,
            Self::Small => 22,
            Self::Initials => 36,
        };
        (logical * SCALE) as f32
    }

    fn is_bold(self) -> bool {
        matches!(self, Self::Name | Self::Initials)
    }
}

/// The immutable font set loaded once at startup
pub struct Fonts {
    regular: Font<'static>,
    bold: Font<'static>,
}

impl Fonts {
    /// DejaVu Sans compiled into the binary
    pub fn bundled() -> Self {
        Self {
            regular: bundled_font(BUNDLED_REGULAR),
            bold: bundled_font(BUNDLED_BOLD),
        }
    }

    /// Loads the fonts from the given files. A file that is missing or is not
    /// a valid font is replaced with the bundled one.
    pub(crate) fn load(regular: Option<&Path>, bold: Option<&Path>) -> Self {
        Self {
            regular: load_or_bundled(regular, BUNDLED_REGULAR),
            bold: load_or_bundled(bold, BUNDLED_BOLD),
        }
    }

    pub(crate) fn face(&self, style: TextStyle) -> Face<'_> {
        let font = if style.is_bold() { &self.bold } else { &self.regular };

        Face {
            font,
            scale: Scale::uniform(style.size()),
        }
    }
}

impl MeasureText for Fonts {
    fn text_width(&self, style: TextStyle, text: &str) -> u32 {
        self.face(style).width(text)
    }
}

fn bundled_font(bytes: &'static [u8]) -> Font<'static> {
    Font::try_from_bytes(bytes).expect("BUG: the bundled font is invalid")
}

fn load_or_bundled(path: Option<&Path>, bundled: &'static [u8]) -> Font<'static> {
    let Some(path) = path else {
        return bundled_font(bundled);
    };

    match fs_err::read(path) {
        Ok(bytes) => match Font::try_from_vec(bytes) {
            Some(font) => {
                info!(path = %path.display(), "Loaded font");
                return font;
            }
            None => warn!(
                path = %path.display(),
                "The file is not a valid font, falling back to the bundled one"
            ),
        },
        Err(err) => warn!(
            err = tracing_err(&err),
            "Failed to read the font, falling back to the bundled one"
        ),
    }

    bundled_font(bundled)
}

/// A font at a specific size
pub(crate) struct Face<'f> {
    font: &'f Font<'static>,
    scale: Scale,
}

impl Face<'_> {
    pub(crate) fn v_metrics(&self) -> VMetrics {
        self.font.v_metrics(self.scale)
    }

    /// Lays out a single line of text with its top-left corner at `(x, y)`.
    /// Kerning is applied the same way as in [`Face::width`].
    pub(crate) fn layout(&self, text: &str, x: f32, y: f32) -> Vec<PositionedGlyph<'static>> {
        let baseline = y + self.v_metrics().ascent;
        let mut caret = x;
        let mut prev = None;

        text.chars()
            .map(|ch| {
                let glyph = self.font.glyph(ch).scaled(self.scale);
                if let Some(prev) = prev {
                    caret += self.font.pair_kerning(self.scale, prev, glyph.id());
                }
                prev = Some(glyph.id());

                let advance = glyph.h_metrics().advance_width;
                let glyph = glyph.positioned(point(caret, baseline));
                caret += advance;
                glyph
            })
            .collect()
    }

    pub(crate) fn width(&self, text: &str) -> u32 {
        let mut width = 0.0;
        let mut prev = None;

        for ch in text.chars() {
            let glyph = self.font.glyph(ch).scaled(self.scale);
            if let Some(prev) = prev {
                width += self.font.pair_kerning(self.scale, prev, glyph.id());
            }
            prev = Some(glyph.id());
            width += glyph.h_metrics().advance_width;
        }

        width.ceil().max(0.0) as u32
    }
}

/// Every character has the same advance which is proportional to the font
/// size. Makes the layout predictable in tests.
#[cfg(test)]
pub(crate) struct FixedAdvance;

#[cfg(test)]
impl MeasureText for FixedAdvance {
    fn text_width(&self, style: TextStyle, text: &str) -> u32 {
        let advance = (style.size() / 2.0) as u32;
        text.chars().count() as u32 * advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_text() {
        let fonts = Fonts::bundled();

        assert_eq!(fonts.text_width(TextStyle::Body, ""), 0);

        let short = fonts.text_width(TextStyle::Body, "Hello");
        let long = fonts.text_width(TextStyle::Body, "Hello, world");
        assert!(0 < short && short < long, "{short} < {long}");

        let regular = fonts.text_width(TextStyle::Meta, "Some User");
        let bold = fonts.text_width(TextStyle::Name, "Some User");
        assert!(regular < bold, "{regular} < {bold}");
    }

    #[test_log::test]
    fn missing_font_falls_back_to_bundled() {
        let missing = Path::new("/definitely/not/a/font.ttf");
        let fonts = Fonts::load(Some(missing), Some(missing));

        assert_eq!(
            fonts.text_width(TextStyle::Body, "fallback"),
            Fonts::bundled().text_width(TextStyle::Body, "fallback"),
        );
    }

    #[test]
    fn layout_matches_width() {
        let fonts = Fonts::bundled();
        let face = fonts.face(TextStyle::Body);
        let text = "AVATAR wave";

        let glyphs = face.layout(text, 0.0, 0.0);
        let last = glyphs.last().unwrap();
        let end = last.position().x + last.unpositioned().h_metrics().advance_width;

        assert_eq!(end.ceil() as u32, face.width(text));
    }
}
