/// Appends path segments to the given base URL.
///
/// Pushing segments instead of formatting them into a string lets the `url`
/// crate do the escaping and keeps a trailing slash in the base from
/// producing an empty segment.
pub(crate) fn with_segments<T: AsRef<str>>(
    base: &::url::Url,
    segments: impl IntoIterator<Item = T>,
) -> ::url::Url {
    let mut url = base.clone();

    // A URL that can't be a base is rejected at config parsing time
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }

    url
}
