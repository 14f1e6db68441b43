//! Anti-aliased rasterization of shapes described by signed distance
//! functions. The distance is negative inside of the shape, and the coverage
//! of a pixel is estimated from the distance at its center.

use image::{Rgb, RgbImage, RgbaImage};

pub(crate) type Point = (f32, f32);

/// Blends `color` over the pixel with the given opacity in `0..=1`.
/// Pixels outside of the canvas are ignored.
pub(crate) fn blend(canvas: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>, alpha: f32) {
    if alpha <= 0.0 || x >= canvas.width() || y >= canvas.height() {
        return;
    }

    let alpha = alpha.min(1.0);
    let pixel = canvas.get_pixel_mut(x, y);

    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (f32::from(*dst) * (1.0 - alpha) + f32::from(src) * alpha).round() as u8;
    }
}

/// Distance to coverage of a pixel with the side of 1
pub(crate) fn coverage(distance: f32) -> f32 {
    (0.5 - distance).clamp(0.0, 1.0)
}

/// Fills the shape visiting only the pixels inside of the `min..max` box
pub(crate) fn fill(
    canvas: &mut RgbImage,
    min: Point,
    max: Point,
    color: Rgb<u8>,
    sdf: impl Fn(Point) -> f32,
) {
    let clamp = |value: f32, limit: u32| (value.max(0.0) as u32).min(limit);

    let (x0, y0) = (clamp(min.0.floor() - 1.0, canvas.width()), clamp(min.1.floor() - 1.0, canvas.height()));
    let (x1, y1) = (clamp(max.0.ceil() + 1.0, canvas.width()), clamp(max.1.ceil() + 1.0, canvas.height()));

    for y in y0..y1 {
        for x in x0..x1 {
            let alpha = coverage(sdf((x as f32 + 0.5, y as f32 + 0.5)));
            blend(canvas, x, y, color, alpha);
        }
    }
}

/// Non anti-aliased rectangle for the pixel-aligned parts of the layout
pub(crate) fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x1 = (x + width).min(canvas.width());
    let y1 = (y + height).min(canvas.height());

    for y in y..y1 {
        for x in x..x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Draws the image with its top-left corner at `origin`. The `mask`
/// receives the coordinates of the pixel center relative to the image and
/// returns the coverage of the pixel.
pub(crate) fn draw_image(
    canvas: &mut RgbImage,
    image: &RgbaImage,
    origin: (u32, u32),
    mask: impl Fn(Point) -> f32,
) {
    for (x, y, pixel) in image.enumerate_pixels() {
        let coverage = mask((x as f32 + 0.5, y as f32 + 0.5));
        if coverage <= 0.0 {
            continue;
        }

        let [r, g, b, a] = pixel.0;
        let alpha = coverage * f32::from(a) / 255.0;

        blend(canvas, origin.0 + x, origin.1 + y, Rgb([r, g, b]), alpha);
    }
}

fn length((x, y): Point) -> f32 {
    x.hypot(y)
}

pub(crate) fn circle(center: Point, radius: f32) -> impl Fn(Point) -> f32 {
    move |(x, y)| length((x - center.0, y - center.1)) - radius
}

/// A circle outline of the given thickness
pub(crate) fn ring(center: Point, radius: f32, thickness: f32) -> impl Fn(Point) -> f32 {
    let circle = circle(center, radius);
    move |point| circle(point).abs() - thickness / 2.0
}

/// A line segment with round caps
pub(crate) fn segment(a: Point, b: Point, width: f32) -> impl Fn(Point) -> f32 {
    move |(x, y)| segment_distance((x, y), a, b) - width / 2.0
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let pa = (p.0 - a.0, p.1 - a.1);
    let ba = (b.0 - a.0, b.1 - a.1);
    let len2 = ba.0 * ba.0 + ba.1 * ba.1;

    let t = if len2 == 0.0 {
        0.0
    } else {
        ((pa.0 * ba.0 + pa.1 * ba.1) / len2).clamp(0.0, 1.0)
    };

    length((pa.0 - ba.0 * t, pa.1 - ba.1 * t))
}

/// Connected line segments with round joins
pub(crate) fn polyline(points: Vec<Point>, width: f32) -> impl Fn(Point) -> f32 {
    move |p| {
        points
            .windows(2)
            .map(|pair| segment_distance(p, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
            - width / 2.0
    }
}

/// Axis-aligned rectangle with the top-left corner at `min`
pub(crate) fn rounded_rect(min: Point, size: Point, radius: f32) -> impl Fn(Point) -> f32 {
    let half = (size.0 / 2.0, size.1 / 2.0);
    let center = (min.0 + half.0, min.1 + half.1);
    let radius = radius.min(half.0).min(half.1);

    move |(x, y)| {
        let qx = (x - center.0).abs() - half.0 + radius;
        let qy = (y - center.1).abs() - half.1 + radius;
        length((qx.max(0.0), qy.max(0.0))) + qx.max(qy).min(0.0) - radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        let circle = circle((10.0, 10.0), 5.0);
        assert_eq!(circle((10.0, 10.0)), -5.0);
        assert_eq!(circle((10.0, 20.0)), 5.0);

        let rect = rounded_rect((0.0, 0.0), (100.0, 50.0), 10.0);
        assert!(rect((50.0, 25.0)) < 0.0);
        assert!(rect((0.5, 0.5)) > 0.0, "corners are cut off");
        assert!(rect((50.0, 0.75)) < 0.0, "edges are kept");

        let segment = segment((0.0, 0.0), (10.0, 0.0), 2.0);
        assert_eq!(segment((5.0, 0.0)), -1.0);
        assert_eq!(segment((15.0, 0.0)), 4.0);
    }

    #[test]
    fn fills_with_anti_aliasing() {
        let mut canvas = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        let white = Rgb([255, 255, 255]);

        fill(&mut canvas, (2.0, 2.0), (18.0, 18.0), white, circle((10.0, 10.0), 8.0));

        assert_eq!(canvas.get_pixel(10, 10), &white);
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([0, 0, 0]));

        // The edge is partially covered
        let edge = canvas.get_pixel(10, 2).0[0];
        assert!(0 < edge && edge < 255, "{edge}");
    }

    #[test]
    fn masks_images() {
        let mut canvas = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let image = RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));

        draw_image(&mut canvas, &image, (1, 1), |(x, _)| if x < 1.0 { 1.0 } else { 0.0 });

        assert_eq!(canvas.get_pixel(1, 1), &Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(2, 1), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }
}
