mod basic_ext;

use crate::prelude::*;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::{Duration, Instant};
use url::Url;

pub(crate) mod prelude {
    pub(crate) use super::basic_ext::RequestBuilderBasicExt;
}

pub(crate) type Client = reqwest_middleware::ClientWithMiddleware;

/// Total time budget for a single request including reading the body.
/// There are no retries, so this is the upper bound of a fetch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) fn create_client() -> Client {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!(
            "WallOfXTelegramBot/",
            env!("CARGO_PKG_VERSION"),
            " (+https://github.com/wallofx/wallofx)",
        ))
        .build()
        .expect("BUG: failed to create an HTTP client");

    reqwest_middleware::ClientBuilder::new(client)
        .with(ObservingMiddleware)
        .build()
}

/// Source of raw bytes by URL. The network is hidden behind this trait so
/// that media loading can be tested without a server.
#[async_trait]
pub(crate) trait FetchBlob: Send + Sync {
    async fn fetch_blob(&self, url: &Url) -> Result<Bytes>;
}

#[async_trait]
impl FetchBlob for Client {
    async fn fetch_blob(&self, url: &Url) -> Result<Bytes> {
        self.get(url.clone()).read_bytes().await
    }
}

struct ObservingMiddleware;

#[async_trait]
impl reqwest_middleware::Middleware for ObservingMiddleware {
    async fn handle(
        &self,
        request: reqwest::Request,
        extensions: &mut http::Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let span = info_span!(
            "request",
            method = %request.method(),
            url = %request.url(),
        );

        observe_request(request, extensions, next)
            .instrument(span)
            .await
    }
}

async fn observe_request(
    request: reqwest::Request,
    extensions: &mut http::Extensions,
    next: reqwest_middleware::Next<'_>,
) -> reqwest_middleware::Result<reqwest::Response> {
    let method = request.method().to_string();
    let host = request.url().host_str().unwrap_or("{unknown}").to_owned();

    let start = Instant::now();
    let result = next.run(request, extensions).await;
    let elapsed = start.elapsed();

    let status = match &result {
        Ok(response) => response.status().to_string(),
        Err(_) => "{fatal}".to_owned(),
    };

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "host" => host,
        "status" => status
    )
    .record(elapsed);

    let duration = tracing_duration(elapsed);

    let response = match &result {
        Ok(response) => response,
        Err(err) => {
            error!(duration, err = tracing_err(err), "Network request failed");
            return result;
        }
    };

    let status = response.status();

    let Err(err) = response.error_for_status_ref() else {
        info!(duration, %status, "Network request succeeded");
        return result;
    };

    warn!(
        err = tracing_err(&err),
        duration,
        %status,
        "Network request failed (error status)"
    );

    result
}

/// Errors at the layer of the HTTP API
#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpClientError {
    #[error("HTTP request failed")]
    Request { source: reqwest_middleware::Error },

    #[error("Failed to read HTTP response")]
    ReadPayload { source: reqwest_middleware::Error },

    #[error("HTTP request has failed (HTTP status code: {status}):\n{body}")]
    BadResponseStatusCode {
        status: reqwest::StatusCode,
        body: String,
    },
}
