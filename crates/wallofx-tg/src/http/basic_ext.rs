use super::HttpClientError;
use crate::prelude::*;
use crate::{err, Result};
use async_trait::async_trait;
use bytes::Bytes;
use easy_ext::ext;
use reqwest::Response;
use reqwest_middleware::RequestBuilder;

#[ext(RequestBuilderBasicExt)]
#[async_trait]
pub(crate) impl RequestBuilder {
    /// Better version of [`RequestBuilder::send`] that returns an error
    /// if the error response status code is returned.
    async fn try_send(self) -> Result<Response> {
        Ok(self.send_for_status().await?)
    }

    /// Same as [`Self::try_send`], but returns the domain-specific HTTP error,
    /// so that callers can react to specific status codes.
    async fn send_for_status(self) -> Result<Response, HttpClientError> {
        let response = self
            .send()
            .await
            .map_err(|source| HttpClientError::Request { source })?;

        let status = response.status();

        if !status.is_client_error() && !status.is_server_error() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_else(|err| {
            format!(
                "Could not collect the error response body text: {}",
                err.display_chain()
            )
        });

        Err(HttpClientError::BadResponseStatusCode { status, body })
    }

    async fn read_bytes(self) -> Result<Bytes> {
        self.try_send()
            .await?
            .bytes()
            .await
            .map_err(|source| err!(HttpClientError::ReadPayload { source }))
    }
}
