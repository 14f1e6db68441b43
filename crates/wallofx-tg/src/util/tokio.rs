/// Same as [`tokio::task::spawn_blocking`], but propagates panics in the
/// spawned task to the caller that will await the returned future.
///
/// Use it for CPU-bound work (e.g. rasterization) so that it doesn't stall
/// the async runtime workers.
pub(crate) async fn spawn_blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .unwrap_or_else(|err| panic!("Blocking task finished with an error: {err:#?}"))
}
