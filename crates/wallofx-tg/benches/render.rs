use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use std::hint::black_box;
use wallofx_tg::render::{Fonts, Renderer, ThemeName, TweetMedia};
use wallofx_tg::tweet::{TweetId, TweetMetrics, TweetRecord};

fn record(images: usize) -> TweetRecord {
    TweetRecord {
        id: TweetId::from_raw(1580661436132757506),
        url: "https://x.com/user/status/1580661436132757506".parse().unwrap(),
        author_name: "Some User".to_owned(),
        author_username: "user".to_owned(),
        author_avatar_url: None,
        text: "Rendering benchmark with a @mention, a #hashtag and a link https://example.com\n\n\
            The second paragraph is long enough to be wrapped into several lines by the layout \
            so that the word wrapping is measured too."
            .to_owned(),
        created_at: Utc.with_ymd_and_hms(2022, 10, 13, 20, 47, 8).unwrap(),
        images: (0..images)
            .map(|i| format!("https://media.test/{i}.png").parse().unwrap())
            .collect(),
        metrics: TweetMetrics {
            likes: 123_456,
            retweets: 7_890,
            replies: 321,
            views: 9_876_543,
        },
        verified: true,
    }
}

fn media(images: usize) -> TweetMedia {
    TweetMedia {
        avatar: Some(RgbaImage::from_pixel(400, 400, Rgba([29, 155, 240, 255]))),
        images: (0..images)
            .map(|_| RgbaImage::from_pixel(1600, 1200, Rgba([200, 100, 50, 255])))
            .collect(),
    }
}

pub fn criterion_benchmark(criterion: &mut Criterion) {
    let renderer = Renderer::new(Fonts::bundled());

    for images in [0, 1, 4] {
        let record = record(images);
        let media = media(images);

        criterion.bench_function(&format!("render_tweet_with_{images}_images"), |bencher| {
            bencher.iter(|| {
                renderer
                    .render(black_box(&record), black_box(&media), ThemeName::Dark)
                    .unwrap()
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
