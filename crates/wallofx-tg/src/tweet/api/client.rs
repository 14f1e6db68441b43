use super::model::{self, Envelope, TweetId};
use crate::http::HttpClientError;
use crate::prelude::*;
use crate::tweet::{parse_tweet_id, text, Config, Extract, ExtractError, TweetMetrics, TweetRecord};
use crate::{err, err_ctx, util, Result};
use async_trait::async_trait;
use chrono::prelude::*;
use reqwest::StatusCode;
use url::Url;

pub(crate) struct Client {
    http: crate::http::Client,
    api_url: Url,
}

impl Client {
    pub(crate) fn new(config: Config, http: crate::http::Client) -> Self {
        Self {
            http,
            api_url: config.api_url,
        }
    }

    pub(crate) async fn get_tweet(&self, id: TweetId) -> Result<TweetRecord> {
        let url = util::url::with_segments(&self.api_url, ["status", &id.to_string()]);

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send_for_status()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(HttpClientError::BadResponseStatusCode { status, body })
                if matches!(status, StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED) =>
            {
                return Err(err!(ExtractError::NotFound {
                    id,
                    code: status.as_u16(),
                    message: body,
                }));
            }
            Err(source) => return Err(err!(ExtractError::Upstream { id, source })),
        };

        let body = response.bytes().await.map_err(|source| {
            err!(ExtractError::Upstream {
                id,
                source: HttpClientError::ReadPayload {
                    source: source.into()
                },
            })
        })?;

        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(err_ctx!(ExtractError::Parse { id }))?;

        let tweet = match envelope.code {
            200 => envelope.tweet.ok_or_else(|| {
                let source = <serde_json::Error as serde::de::Error>::missing_field("tweet");
                err!(ExtractError::Parse { id, source })
            })?,
            401 | 404 => {
                return Err(err!(ExtractError::NotFound {
                    id,
                    code: envelope.code,
                    message: envelope.message,
                }))
            }
            code => {
                return Err(err!(ExtractError::UpstreamCode {
                    id,
                    code,
                    message: envelope.message,
                }))
            }
        };

        into_record(id, tweet)
    }
}

#[async_trait]
impl Extract for Client {
    async fn extract(&self, url: &str) -> Result<TweetRecord> {
        let id = parse_tweet_id(url).ok_or_else(|| err!(ExtractError::InvalidUrl { input: url }))?;

        self.get_tweet(id)
            .instrument(info_span!("get_tweet", %id))
            .with_duration_log("Fetching the tweet from the API")
            .await
    }
}

fn into_record(id: TweetId, tweet: model::Tweet) -> Result<TweetRecord> {
    let created_at = parse_created_at(&tweet).ok_or_else(|| {
        err!(ExtractError::Timestamp {
            id,
            created_at: tweet.created_at.clone(),
        })
    })?;

    let author = tweet.author;

    let url = tweet
        .url
        .as_deref()
        .and_then(|url| parse_remote_url(url, "tweet"))
        .unwrap_or_else(|| canonical_tweet_url(&author.screen_name, id));

    let images = tweet
        .media
        .map(|media| media.photos)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|photo| parse_remote_url(photo.url.as_deref()?, "photo"))
        .collect();

    Ok(TweetRecord {
        id,
        url,
        author_avatar_url: author
            .avatar_url
            .as_deref()
            .and_then(|url| parse_remote_url(url, "avatar")),
        author_name: author.name,
        author_username: author.screen_name,
        text: text::normalize_text(&tweet.text),
        created_at,
        images,
        metrics: TweetMetrics {
            likes: tweet.likes.unwrap_or(0),
            retweets: tweet.retweets.unwrap_or(0),
            replies: tweet.replies.unwrap_or(0),
            views: tweet.views.unwrap_or(0),
        },
        verified: author.verification.is_some_and(|it| it.verified),
    })
}

fn parse_created_at(tweet: &model::Tweet) -> Option<DateTime<Utc>> {
    if let Some(timestamp) = tweet.created_timestamp {
        return Utc.timestamp_opt(timestamp, 0).single();
    }

    let created_at = tweet.created_at.as_deref()?;

    DateTime::parse_from_str(created_at, "%a %b %d %H:%M:%S %z %Y")
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Media URLs that can't be parsed are dropped, the tweet is still rendered
fn parse_remote_url(url: &str, kind: &str) -> Option<Url> {
    Url::parse(url)
        .map_err(|err| warn!(url, kind, err = tracing_err(&err), "Skipping malformed URL"))
        .ok()
}

fn canonical_tweet_url(username: &str, id: TweetId) -> Url {
    let base = Url::parse("https://x.com").expect("BUG: the X base URL is invalid");
    util::url::with_segments(&base, [username, "status", &id.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use assert_matches::assert_matches;
    use expect_test::expect;
    use std::thread::JoinHandle;

    const TWEET_JSON: &str = r#"{
        "code": 200,
        "message": "OK",
        "tweet": {
            "url": "https://x.com/user/status/1609634286050623492",
            "id": "1609634286050623492",
            "text": "Hello  world\r\n\r\nsecond   line @mention #tag",
            "author": {
                "name": "Some User",
                "screen_name": "user",
                "avatar_url": "https://pbs.twimg.com/profile_images/1/avatar.jpg",
                "verification": { "verified": true }
            },
            "created_at": "Thu Oct 13 20:47:08 +0000 2022",
            "created_timestamp": 1665694028,
            "likes": 1234,
            "retweets": 56,
            "replies": 7,
            "views": null,
            "media": {
                "photos": [
                    { "url": "https://pbs.twimg.com/media/a.jpg" },
                    { "url": "not a url" },
                    { "url": "https://pbs.twimg.com/media/b.jpg" }
                ],
                "videos": [{ "url": "https://video.twimg.com/v.mp4" }]
            }
        }
    }"#;

    /// Serves a single request and returns the path that was requested
    fn serve_once(status: u16, body: &'static str) -> (Client, JoinHandle<String>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();

        let handle = std::thread::spawn(move || {
            let request = server.recv().unwrap();
            let path = request.url().to_owned();
            let header: tiny_http::Header = "Content-Type: application/json".parse().unwrap();
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            request.respond(response).unwrap();
            path
        });

        let config = Config {
            api_url: format!("http://{addr}").parse().unwrap(),
        };

        (Client::new(config, crate::http::create_client()), handle)
    }

    fn extract_error(err: &crate::Error) -> &ExtractError {
        match err.kind() {
            ErrorKind::Extract { source } => source,
            kind => panic!("Unexpected error kind: {kind:#?}"),
        }
    }

    #[test_log::test(tokio::test)]
    async fn extracts_tweet() {
        let (client, server) = serve_once(200, TWEET_JSON);

        let tweet = client
            .extract("https://twitter.com/user/status/1609634286050623492?s=20")
            .await
            .unwrap();

        assert_eq!(server.join().unwrap(), "/status/1609634286050623492");

        let actual = format!(
            "url: {}\nauthor: {} (@{})\navatar: {:?}\ntext: {:?}\ncreated_at: {}\n\
            images: {:?}\nmetrics: {:?}\nverified: {}",
            tweet.url,
            tweet.author_name,
            tweet.author_username,
            tweet.author_avatar_url.as_ref().map(Url::as_str),
            tweet.text,
            tweet.created_at.to_rfc3339(),
            tweet.images.iter().map(Url::as_str).collect::<Vec<_>>(),
            tweet.metrics,
            tweet.verified,
        );

        expect![[r#"
            url: https://x.com/user/status/1609634286050623492
            author: Some User (@user)
            avatar: Some("https://pbs.twimg.com/profile_images/1/avatar.jpg")
            text: "Hello world\n\nsecond line @mention #tag"
            created_at: 2022-10-13T20:47:08+00:00
            images: ["https://pbs.twimg.com/media/a.jpg", "https://pbs.twimg.com/media/b.jpg"]
            metrics: TweetMetrics { likes: 1234, retweets: 56, replies: 7, views: 0 }
            verified: true"#]]
        .assert_eq(&actual);
    }

    #[test_log::test(tokio::test)]
    async fn not_found() {
        let (client, _server) = serve_once(404, r#"{ "code": 404, "message": "NOT_FOUND" }"#);
        let err = client.extract("https://x.com/user/status/1").await.unwrap_err();
        assert_matches!(extract_error(&err), ExtractError::NotFound { code: 404, .. });

        let (client, _server) = serve_once(200, r#"{ "code": 401, "message": "PRIVATE_TWEET" }"#);
        let err = client.extract("https://x.com/user/status/1").await.unwrap_err();
        assert_matches!(extract_error(&err), ExtractError::NotFound { code: 401, .. });
    }

    #[test_log::test(tokio::test)]
    async fn upstream_failure() {
        let (client, _server) = serve_once(500, r#"{ "code": 500, "message": "API_FAIL" }"#);
        let err = client.extract("https://x.com/user/status/1").await.unwrap_err();
        assert_matches!(extract_error(&err), ExtractError::Upstream { .. });
        assert_eq!(err.kind_label(), "upstream");
    }

    #[test_log::test(tokio::test)]
    async fn unexpected_shape() {
        let (client, _server) = serve_once(200, r#"{ "tweets": [] }"#);
        let err = client.extract("https://x.com/user/status/1").await.unwrap_err();
        assert_matches!(extract_error(&err), ExtractError::Parse { .. });

        let (client, _server) = serve_once(200, r#"{ "code": 200, "message": "OK" }"#);
        let err = client.extract("https://x.com/user/status/1").await.unwrap_err();
        assert_matches!(extract_error(&err), ExtractError::Parse { .. });
    }

    #[test_log::test(tokio::test)]
    async fn invalid_url() {
        let config = Config {
            api_url: "http://127.0.0.1:1".parse().unwrap(),
        };
        let client = Client::new(config, crate::http::create_client());

        let err = client.extract("https://example.com/post/1").await.unwrap_err();
        assert_matches!(extract_error(&err), ExtractError::InvalidUrl { .. });
    }

    #[test]
    fn timestamp_fallback() {
        let json = r#"{
            "text": "",
            "author": { "name": "a", "screen_name": "b" },
            "created_at": "Thu Oct 13 20:47:08 +0000 2022"
        }"#;
        let tweet: model::Tweet = serde_json::from_str(json).unwrap();
        let record = into_record(TweetId::from_raw(5), tweet).unwrap();

        assert_eq!(record.created_at.to_rfc3339(), "2022-10-13T20:47:08+00:00");
        assert_eq!(record.url.as_str(), "https://x.com/b/status/5");
        assert_eq!(record.metrics, TweetMetrics::default());
        assert!(!record.verified);
        assert!(record.images.is_empty());

        let json = r#"{ "author": { "name": "a", "screen_name": "b" }, "created_at": "yesterday" }"#;
        let tweet: model::Tweet = serde_json::from_str(json).unwrap();
        let err = into_record(TweetId::from_raw(5), tweet).unwrap_err();
        assert_matches!(extract_error(&err), ExtractError::Timestamp { .. });
    }
}
