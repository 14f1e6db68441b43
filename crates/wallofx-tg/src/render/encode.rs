use super::RenderError;
use crate::{err_ctx, Result};
use image::RgbImage;

pub(crate) const DPI: u32 = 300;

/// 300 DPI expressed in pixels per meter as required by the `pHYs` chunk
const PIXELS_PER_METER: u32 = 11811;

/// Encodes the canvas as an RGB PNG that declares its physical resolution
pub(crate) fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: PIXELS_PER_METER,
            yppu: PIXELS_PER_METER,
            unit: png::Unit::Meter,
        }));

        let mut writer = encoder
            .write_header()
            .map_err(err_ctx!(RenderError::EncodePng))?;

        writer
            .write_image_data(canvas.as_raw())
            .map_err(err_ctx!(RenderError::EncodePng))?;

        writer.finish().map_err(err_ctx!(RenderError::EncodePng))?;
    }
    Ok(buffer)
}
