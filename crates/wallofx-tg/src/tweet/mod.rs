//! Extraction of tweet metadata from the FixTweet API.

mod api;
mod text;
mod url;

pub(crate) use api::Client;
pub use api::TweetId;
pub(crate) use url::{find_tweet_url, parse_tweet_id};

use crate::http::HttpClientError;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub(crate) struct Config {
    #[serde(default = "default_api_url")]
    pub(crate) api_url: ::url::Url,
}

fn default_api_url() -> ::url::Url {
    ::url::Url::parse("https://api.fxtwitter.com").expect("BUG: the default API URL is invalid")
}

/// Normalized tweet, fully populated before it reaches the renderer.
#[derive(Debug, Clone)]
pub struct TweetRecord {
    pub id: TweetId,
    pub url: ::url::Url,
    pub author_name: String,

    /// Handle without the leading `@`
    pub author_username: String,
    pub author_avatar_url: Option<::url::Url>,

    /// Line breaks are always `\n`, they are preserved as in the original tweet
    pub text: String,
    pub created_at: DateTime<Utc>,

    /// Photos only, in the order they appear in the tweet
    pub images: Vec<::url::Url>,
    pub metrics: TweetMetrics,
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TweetMetrics {
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub views: u64,
}

/// Source of tweet records. The pipeline talks to the tweet service only
/// through this trait.
#[async_trait]
pub(crate) trait Extract: Send + Sync {
    /// Accepts any of the supported URL shapes, see [`parse_tweet_id`]
    async fn extract(&self, url: &str) -> Result<TweetRecord>;
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExtractError {
    #[error("No tweet ID could be found in the input: {input:?}")]
    InvalidUrl { input: String },

    #[error("Tweet {id} doesn't exist or is private (code: {code}): {message}")]
    NotFound {
        id: TweetId,
        code: u16,
        message: String,
    },

    #[error("Tweet service failed to return tweet {id}")]
    Upstream { id: TweetId, source: HttpClientError },

    #[error("Tweet service returned code {code} for tweet {id}: {message}")]
    UpstreamCode {
        id: TweetId,
        code: u16,
        message: String,
    },

    #[error("Tweet service returned a response of unexpected shape for tweet {id}")]
    Parse {
        id: TweetId,
        source: serde_json::Error,
    },

    #[error("Tweet {id} has no parsable creation timestamp (created_at: {created_at:?})")]
    Timestamp {
        id: TweetId,
        created_at: Option<String>,
    },
}

impl ExtractError {
    /// Short label of the failure used in metrics
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::NotFound { .. } => "not_found",
            Self::Upstream { .. } | Self::UpstreamCode { .. } => "upstream",
            Self::Parse { .. } | Self::Timestamp { .. } => "parse",
        }
    }
}
