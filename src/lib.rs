#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod routes;
pub(crate) mod serde_helpers;
pub mod types;

use reqwest::{Client as ReqwestClient, Request};
use serde::de::DeserializeOwned;

pub use auth::{AuthHeaders, Credentials, Nonce, SigningRequest, sign};
pub use client::{ApiRequest, Client, PreparedRequest};
pub use config::Config;
pub use error::{Error, Kind};
pub use routes::{Endpoint, Route};

pub type Result<T> = std::result::Result<T, Error>;

/// Milliseconds since the Unix epoch, as carried by the `timestamp` header.
pub type Timestamp = i64;

/// Dispatches an already signed request and decodes the JSON response.
///
/// Non-success statuses become [`Kind::Status`] errors carrying the response text, so a
/// rejected signature is reported here and never by the signer.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request),
        fields(method, path, status_code)
    )
)]
pub(crate) async fn request<Response: DeserializeOwned>(
    client: &ReqwestClient,
    request: Request,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    #[cfg(feature = "tracing")]
    {
        let span = tracing::Span::current();
        span.record("method", method.as_str());
        span.record("path", path.as_str());
    }

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = status_message(response.text().await);

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let json_value = response.json::<serde_json::Value>().await?;
    serde_helpers::deserialize_with_warnings(json_value)
}

/// Text of an error response. A body that cannot be read is reported in its place.
fn status_message(body: reqwest::Result<String>) -> String {
    match body {
        Ok(text) => text,
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %e, "failed to read error response body");

            format!("failed to read response body: {e}")
        }
    }
}
