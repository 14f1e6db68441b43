use super::layout::{AVATAR_SIZE, CANVAS_WIDTH, MAX_IMAGES};
use super::{RenderError, TweetMedia};
use crate::http::FetchBlob;
use crate::prelude::*;
use crate::tweet::TweetRecord;
use crate::{err_ctx, fatal, util, Result};
use fast_image_resize as fr;
use futures::StreamExt;
use image::RgbaImage;
use std::sync::OnceLock;
use url::Url;

/// Decoded images are downscaled to fit into these boxes right away to keep
/// the memory usage of concurrent requests low.
const AVATAR_BOX: u32 = AVATAR_SIZE * 2;
const IMAGE_BOX: u32 = CANVAS_WIDTH;

/// Downloads and decodes the avatar and the images of the tweet. The media
/// that can't be loaded is skipped, so this never fails. The images after a
/// broken one move up to take its slot.
pub(crate) async fn load_media(blobs: &dyn FetchBlob, record: &TweetRecord) -> TweetMedia {
    let avatar = async {
        let url = record.author_avatar_url.as_ref()?;
        load_image(blobs, url, AVATAR_BOX).await
    };

    let images = futures::stream::iter(&record.images)
        .map(|url| load_image(blobs, url, IMAGE_BOX))
        .buffered(MAX_IMAGES)
        .boxed()
        .filter_map(futures::future::ready)
        .take(MAX_IMAGES)
        .collect::<Vec<_>>();

    let (avatar, images) = futures::join!(avatar, images);

    TweetMedia { avatar, images }
}

async fn load_image(blobs: &dyn FetchBlob, url: &Url, box_side: u32) -> Option<RgbaImage> {
    let result = async {
        let bytes = blobs.fetch_blob(url).await?;
        util::tokio::spawn_blocking(move || decode(&bytes, box_side)).await
    };

    result
        .await
        .map_err(|err| warn!(%url, err = tracing_err(&err), "Skipping media that failed to load"))
        .ok()
}

fn decode(bytes: &[u8], box_side: u32) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes)
        .map_err(err_ctx!(RenderError::DecodeImage))?
        .into_rgba8();

    fit_into_box(image, box_side)
}

/// Scales the image down so that it fits into the square box. Images that
/// already fit are returned as is.
pub(crate) fn fit_into_box(image: RgbaImage, box_side: u32) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    if width <= box_side && height <= box_side {
        return Ok(image);
    }

    let factor = (f64::from(box_side) / f64::from(width)).min(f64::from(box_side) / f64::from(height));
    let dest_width = ((f64::from(width) * factor).floor() as u32).max(1);
    let dest_height = ((f64::from(height) * factor).floor() as u32).max(1);

    resize(image, dest_width, dest_height, &resize_options())
}

/// Scales the image to cover the whole `width x height` box preserving the
/// aspect ratio. The parts that stick out of the box are cut off evenly from
/// both sides.
pub(crate) fn cover(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    let (src_width, src_height) = image.dimensions();

    if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
        return Err(fatal!(
            "Can't resize an image of {src_width}x{src_height} to {width}x{height}"
        ));
    }

    let (src_width, src_height) = (f64::from(src_width), f64::from(src_height));
    let target_aspect = f64::from(width) / f64::from(height);

    let (crop_width, crop_height) = if src_width / src_height > target_aspect {
        (src_height * target_aspect, src_height)
    } else {
        (src_width, src_width / target_aspect)
    };

    let options = resize_options().crop(
        (src_width - crop_width) / 2.0,
        (src_height - crop_height) / 2.0,
        crop_width,
        crop_height,
    );

    resize(image.clone(), width, height, &options)
}

fn resize_options() -> fr::ResizeOptions {
    // Lanczos3 is the best algorithm for downsampling
    // https://en.wikipedia.org/wiki/Lanczos_resampling
    fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3))
}

fn resize(
    image: RgbaImage,
    width: u32,
    height: u32,
    options: &fr::ResizeOptions,
) -> Result<RgbaImage> {
    let (src_width, src_height) = image.dimensions();

    let mut src =
        fr::images::Image::from_vec_u8(src_width, src_height, image.into_raw(), fr::PixelType::U8x4)
            .fatal_ctx(|| "Failed to create source image pixels container")?;

    // Resizing must happen in the linear colorspace
    srgb_mapper()
        .forward_map_inplace(&mut src)
        .fatal_ctx(|| "Failed to map the image from sRGB to linear colorspace")?;

    let mul_div = fr::MulDiv::default();

    mul_div
        .multiply_alpha_inplace(&mut src)
        .fatal_ctx(|| "Failed to multiply color channels by alpha")?;

    let mut dest = fr::images::Image::new(width, height, fr::PixelType::U8x4);

    fr::Resizer::new()
        .resize(&src, &mut dest, options)
        .fatal_ctx(|| "Failed to resize image")?;

    drop(src);

    mul_div
        .divide_alpha_inplace(&mut dest)
        .fatal_ctx(|| "Failed to divide color channels by alpha")?;

    srgb_mapper()
        .backward_map_inplace(&mut dest)
        .fatal_ctx(|| "Failed to map the image from linear to sRGB colorspace")?;

    RgbaImage::from_raw(width, height, dest.buffer().to_vec())
        .fatal_ctx(|| "Resized image buffer has unexpected size")
}

fn srgb_mapper() -> &'static fr::PixelComponentMapper {
    static GLOBAL: OnceLock<fr::PixelComponentMapper> = OnceLock::new();
    GLOBAL.get_or_init(fr::create_srgb_mapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::{png_bytes, record, FakeBlobs};
    use image::Rgba;

    #[test]
    fn covers_the_box() {
        // Left half is red and right half is blue
        let image = RgbaImage::from_fn(400, 100, |x, _| {
            if x < 200 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });

        let covered = cover(&image, 50, 50).unwrap();
        assert_eq!(covered.dimensions(), (50, 50));

        // The center is cropped out, so both colors are visible
        assert_eq!(covered.get_pixel(2, 25).0, [255, 0, 0, 255]);
        assert_eq!(covered.get_pixel(47, 25).0, [0, 0, 255, 255]);
    }

    #[test]
    fn fits_into_box() {
        let image = RgbaImage::from_pixel(3000, 1500, Rgba([1, 2, 3, 255]));
        assert_eq!(fit_into_box(image, 1000).unwrap().dimensions(), (1000, 500));

        let image = RgbaImage::from_pixel(30, 15, Rgba([1, 2, 3, 255]));
        assert_eq!(fit_into_box(image, 1000).unwrap().dimensions(), (30, 15));
    }

    #[test]
    fn rejects_empty_images() {
        let image = RgbaImage::new(0, 0);
        cover(&image, 10, 10).unwrap_err();
    }

    #[test_log::test(tokio::test)]
    async fn broken_media_is_skipped() {
        let mut record = record();
        record.author_avatar_url = Some("https://media.test/avatar.png".parse().unwrap());
        record.images = [
            "https://media.test/1.png",
            "https://media.test/missing.png",
            "https://media.test/garbage.png",
            "https://media.test/2.png",
            "https://media.test/3.png",
            "https://media.test/4.png",
            "https://media.test/5.png",
        ]
        .iter()
        .map(|url| url.parse().unwrap())
        .collect();

        let blobs = FakeBlobs::new([
            ("https://media.test/avatar.png", png_bytes(10, 10)),
            ("https://media.test/1.png", png_bytes(40, 30)),
            ("https://media.test/garbage.png", b"not an image".to_vec()),
            ("https://media.test/2.png", png_bytes(30, 40)),
            ("https://media.test/3.png", png_bytes(20, 20)),
            ("https://media.test/4.png", png_bytes(10, 20)),
            ("https://media.test/5.png", png_bytes(1, 1)),
        ]);

        let media = load_media(&blobs, &record).await;

        assert_eq!(media.avatar.map(|avatar| avatar.dimensions()), Some((10, 10)));

        // The images after the broken ones fill the free slots
        let dimensions: Vec<_> = media.images.iter().map(RgbaImage::dimensions).collect();
        assert_eq!(dimensions, [(40, 30), (30, 40), (20, 20), (10, 20)]);
    }
}
