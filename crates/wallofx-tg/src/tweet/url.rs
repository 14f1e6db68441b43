use super::TweetId;

/// Finds the first tweet URL in arbitrary text. Returns the matched URL
/// text and the tweet ID in it.
///
/// Supported shapes:
/// - with or without the `http(s)://` scheme
/// - `x.com` and `twitter.com` with any subdomain (`www.`, `mobile.`)
/// - `fxtwitter.com`, `vxtwitter.com`, `fixupx.com` and `fixvx.com` mirrors
/// - any path before `/status/{id}` (`/user/`, `/i/web/`)
/// - a trailing path (`/photo/1`) and query string (`?s=20`) which are ignored
///
/// The URL must start at the beginning of the text, after whitespace or
/// after an opening bracket, so paths of other hosts' URLs don't match.
pub(crate) fn find_tweet_url(text: &str) -> Option<(&str, TweetId)> {
    let (_, url, id) = lazy_regex::regex_captures!(
        r"(?i)(?:^|[\s(<\[])((?:https?://)?(?:[a-z0-9-]+\.)*(?:x|twitter|fxtwitter|vxtwitter|fixupx|fixvx)\.com/(?:[^/?#\s]+/)*?status(?:es)?/(\d+)[^\s]*)",
        text
    )?;

    Some((url, id.parse().ok()?))
}

/// Same as [`find_tweet_url`], but the whole input must be a single URL
/// with optional surrounding whitespace.
pub(crate) fn parse_tweet_id(input: &str) -> Option<TweetId> {
    let input = input.trim();
    let (url, id) = find_tweet_url(input)?;
    (url == input).then_some(id)
}
