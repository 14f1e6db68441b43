//! Icons drawn from primitives, so no image assets are needed. Every icon
//! is described in the unit square and is scaled into the `size` box.

use super::shapes::{self, Point};
use crate::render::layout::MetricIcon;
use image::{Rgb, RgbImage};

struct Frame {
    x: f32,
    y: f32,
    size: f32,
}

impl Frame {
    fn new(x: u32, y: u32, size: u32) -> Self {
        Self {
            x: x as f32,
            y: y as f32,
            size: size as f32,
        }
    }

    fn at(&self, (u, v): Point) -> Point {
        (self.x + u * self.size, self.y + v * self.size)
    }

    fn len(&self, unit: f32) -> f32 {
        unit * self.size
    }

    fn fill(&self, canvas: &mut RgbImage, color: Rgb<u8>, sdf: impl Fn(Point) -> f32) {
        let max = (self.x + self.size, self.y + self.size);
        shapes::fill(canvas, (self.x, self.y), max, color, sdf);
    }

    fn stroke(&self, canvas: &mut RgbImage, color: Rgb<u8>, points: &[Point], width: f32) {
        let points = points.iter().map(|&point| self.at(point)).collect();
        self.fill(canvas, color, shapes::polyline(points, self.len(width)));
    }
}

const STROKE: f32 = 0.09;

pub(crate) fn metric(canvas: &mut RgbImage, icon: MetricIcon, x: u32, y: u32, size: u32, color: Rgb<u8>) {
    let frame = Frame::new(x, y, size);

    match icon {
        MetricIcon::Reply => reply(canvas, &frame, color),
        MetricIcon::Repost => repost(canvas, &frame, color),
        MetricIcon::Like => like(canvas, &frame, color),
        MetricIcon::Views => views(canvas, &frame, color),
    }
}

/// Speech bubble
fn reply(canvas: &mut RgbImage, frame: &Frame, color: Rgb<u8>) {
    let bubble = shapes::ring(frame.at((0.5, 0.45)), frame.len(0.38), frame.len(STROKE));
    let tail = shapes::polyline(
        vec![frame.at((0.24, 0.72)), frame.at((0.14, 0.95)), frame.at((0.42, 0.82))],
        frame.len(STROKE),
    );

    frame.fill(canvas, color, |point| bubble(point).min(tail(point)));
}

/// Two arrows chasing each other
fn repost(canvas: &mut RgbImage, frame: &Frame, color: Rgb<u8>) {
    let paths: [&[Point]; 4] = [
        &[(0.15, 0.6), (0.15, 0.25), (0.75, 0.25)],
        &[(0.62, 0.12), (0.75, 0.25), (0.62, 0.38)],
        &[(0.85, 0.4), (0.85, 0.75), (0.25, 0.75)],
        &[(0.38, 0.62), (0.25, 0.75), (0.38, 0.88)],
    ];

    for path in paths {
        frame.stroke(canvas, color, path, STROKE);
    }
}

/// Heart outline sampled from the parametric heart curve
fn like(canvas: &mut RgbImage, frame: &Frame, color: Rgb<u8>) {
    const SAMPLES: usize = 48;

    let points: Vec<Point> = (0..=SAMPLES)
        .map(|i| {
            let t = i as f32 / SAMPLES as f32 * std::f32::consts::TAU;
            let x = 16.0 * t.sin().powi(3);
            let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();

            // The curve spans x in -16..16 and y in -17..12
            (0.5 + x / 36.0, 0.45 - y / 36.0)
        })
        .collect();

    frame.stroke(canvas, color, &points, STROKE);
}

/// Bar chart
fn views(canvas: &mut RgbImage, frame: &Frame, color: Rgb<u8>) {
    let bars = [(0.2, 0.55), (0.5, 0.15), (0.8, 0.4)];

    for (x, top) in bars {
        frame.stroke(canvas, color, &[(x, top), (x, 0.9)], STROKE * 1.2);
    }
}

pub(crate) fn x_logo(canvas: &mut RgbImage, x: u32, y: u32, size: u32, color: Rgb<u8>) {
    let frame = Frame::new(x, y, size);

    let thick = shapes::segment(frame.at((0.12, 0.08)), frame.at((0.88, 0.92)), frame.len(0.16));
    let thin = shapes::segment(frame.at((0.88, 0.08)), frame.at((0.12, 0.92)), frame.len(0.08));

    frame.fill(canvas, color, |point| thick(point).min(thin(point)));
}

pub(crate) fn verified_badge(
    canvas: &mut RgbImage,
    x: u32,
    y: u32,
    size: u32,
    background: Rgb<u8>,
    foreground: Rgb<u8>,
) {
    let frame = Frame::new(x, y, size);

    frame.fill(canvas, background, shapes::circle(frame.at((0.5, 0.5)), frame.len(0.5)));
    frame.stroke(canvas, foreground, &[(0.28, 0.52), (0.44, 0.68), (0.74, 0.36)], 0.11);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted_pixels(draw: impl FnOnce(&mut RgbImage)) -> usize {
        let mut canvas = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        draw(&mut canvas);
        canvas.pixels().filter(|pixel| pixel.0 != [0, 0, 0]).count()
    }

    #[test]
    fn icons_stay_inside_of_their_box() {
        let white = Rgb([255, 255, 255]);
        let icons = [
            MetricIcon::Reply,
            MetricIcon::Repost,
            MetricIcon::Like,
            MetricIcon::Views,
        ];

        for icon in icons {
            let mut canvas = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
            metric(&mut canvas, icon, 16, 16, 32, white);

            let painted: Vec<_> = canvas
                .enumerate_pixels()
                .filter(|(_, _, pixel)| pixel.0 != [0, 0, 0])
                .map(|(x, y, _)| (x, y))
                .collect();

            assert!(!painted.is_empty(), "{icon:?}");
            assert!(
                painted.iter().all(|&(x, y)| (14..50).contains(&x) && (14..50).contains(&y)),
                "{icon:?}"
            );
        }
    }

    #[test]
    fn badge_has_a_checkmark() {
        let accent = Rgb([29, 155, 240]);
        let mut canvas = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        verified_badge(&mut canvas, 0, 0, 64, accent, Rgb([255, 255, 255]));

        assert_eq!(canvas.get_pixel(28, 43), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(10, 32), &accent);

        assert!(painted_pixels(|canvas| x_logo(canvas, 0, 0, 64, accent)) > 0);
    }
}
