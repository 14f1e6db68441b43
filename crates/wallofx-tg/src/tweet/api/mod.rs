mod client;
mod model;

pub(crate) use client::*;
pub use model::TweetId;
