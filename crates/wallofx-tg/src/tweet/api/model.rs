use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

#[serde_as]
#[derive(
    derive_more::Display, derive_more::FromStr, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize,
)]
#[serde(transparent)]
pub struct TweetId(#[serde_as(as = "DisplayFromStr")] u64);

impl TweetId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Every response of the API is wrapped into this envelope, including
/// the error ones.
///
/// API docs: <https://github.com/FixTweet/FxTwitter>
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub(crate) code: u16,

    #[serde(default)]
    pub(crate) message: String,

    /// Present only when `code` is 200
    pub(crate) tweet: Option<Tweet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Tweet {
    pub(crate) url: Option<String>,

    #[serde(default)]
    pub(crate) text: String,

    pub(crate) author: Author,

    /// Twitter-style date: `Thu Oct 13 20:47:08 +0000 2022`
    pub(crate) created_at: Option<String>,

    /// Unix timestamp in seconds, preferred over `created_at`
    pub(crate) created_timestamp: Option<i64>,

    // Counters may be missing or `null` for old or restricted tweets
    pub(crate) likes: Option<u64>,
    pub(crate) retweets: Option<u64>,
    pub(crate) replies: Option<u64>,
    pub(crate) views: Option<u64>,

    pub(crate) media: Option<Media>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Author {
    /// Display name that can contain special characters
    #[serde(default)]
    pub(crate) name: String,

    /// Handle without the `@`
    #[serde(default)]
    pub(crate) screen_name: String,

    pub(crate) avatar_url: Option<String>,

    pub(crate) verification: Option<Verification>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Verification {
    #[serde(default)]
    pub(crate) verified: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Media {
    /// Videos and GIFs are listed separately and are not rendered
    #[serde(default)]
    pub(crate) photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Photo {
    pub(crate) url: Option<String>,
}
