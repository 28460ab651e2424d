//! Request authentication for the service API.
//!
//! Every authenticated call carries four headers:
//!
//! | Header            | Value                                                  |
//! |-------------------|--------------------------------------------------------|
//! | `service-api-key` | the public API key                                     |
//! | `nonce`           | 8 random alphanumeric characters, fresh per request    |
//! | `timestamp`       | milliseconds since the Unix epoch, taken when signing  |
//! | `Signature`       | `base64(HMAC-SHA512(secret, canonical string))`        |
//!
//! The canonical string is built by [`SigningRequest::canonicalize`]; [`sign`] turns it into
//! [`AuthHeaders`]. HTTP header names are case-insensitive and are transmitted lowercased.

mod canonical;
mod nonce;
mod signer;

use reqwest::header::HeaderName;
use secrecy::{ExposeSecret as _, SecretString};

pub use canonical::SigningRequest;
pub use nonce::{NONCE_LENGTH, Nonce, now_millis};
pub use signer::{AuthHeaders, sign};

use crate::Result;
use crate::error::Error;

pub const SERVICE_API_KEY: &str = "service-api-key";
pub const NONCE: &str = "nonce";
pub const TIMESTAMP: &str = "timestamp";
pub const SIGNATURE: &str = "Signature";

pub(crate) const SERVICE_API_KEY_HEADER: HeaderName = HeaderName::from_static("service-api-key");
pub(crate) const NONCE_HEADER: HeaderName = HeaderName::from_static("nonce");
pub(crate) const TIMESTAMP_HEADER: HeaderName = HeaderName::from_static("timestamp");
pub(crate) const SIGNATURE_HEADER: HeaderName = HeaderName::from_static("signature");

/// Service API key and secret issued by the developer console.
///
/// The secret is only ever used as the MAC key. It is never sent, and its `Debug` output is
/// redacted.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Credentials {
    pub(crate) key: String,
    pub(crate) secret: SecretString,
}

impl Credentials {
    /// Creates validated credentials.
    ///
    /// Fails with [`Kind::InvalidCredential`](crate::Kind::InvalidCredential) if either half
    /// is blank or contains characters that cannot travel in a header.
    pub fn new<K: Into<String>>(key: K, secret: SecretString) -> Result<Self> {
        let credentials = Self {
            key: key.into(),
            secret,
        };
        credentials.validate()?;
        Ok(credentials)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::invalid_credential("service-api-key is blank"));
        }
        if !self.key.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::invalid_credential(
                "service-api-key must be visible ASCII without whitespace",
            ));
        }

        let secret = self.secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(Error::invalid_credential("service-api-secret is blank"));
        }
        if secret.chars().any(char::is_control) || secret.trim() != secret {
            return Err(Error::invalid_credential(
                "service-api-secret contains control characters or surrounding whitespace",
            ));
        }

        Ok(())
    }
}
