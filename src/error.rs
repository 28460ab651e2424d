use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use reqwest::header::InvalidHeaderValue;
use reqwest::{Method, StatusCode};

/// Broad category of an [`Error`].
///
/// `InvalidCredential`, `Encoding` and `Clock` are raised locally while signing and always
/// prevent the request from being dispatched. `Status` means the request reached the server
/// and was rejected, which includes the server refusing our signature.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Missing or malformed API key or secret.
    InvalidCredential,
    /// The request could not be canonicalized for signing.
    Encoding,
    /// The system clock could not produce a usable timestamp.
    Clock,
    /// Invalid input supplied by the caller.
    Validation,
    /// Non-success HTTP status returned by the service.
    Status,
    /// Transport, URL or (de)serialization failure.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let error = self.source.as_deref()?;
        error.downcast_ref::<E>()
    }

    /// Returns `true` when the request was never sent because signing failed locally.
    #[must_use]
    pub fn is_signing_failure(&self) -> bool {
        matches!(self.kind, Kind::InvalidCredential | Kind::Encoding | Kind::Clock)
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Validation {
            reason: message.into(),
        }
        .into()
    }

    pub fn invalid_credential<S: Into<String>>(message: S) -> Self {
        Self::with_source(
            Kind::InvalidCredential,
            Message {
                reason: message.into(),
            },
        )
    }

    pub fn encoding<S: Into<String>>(message: S) -> Self {
        Self::with_source(
            Kind::Encoding,
            Message {
                reason: message.into(),
            },
        )
    }

    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Status {
            status_code,
            method,
            path,
            message: message.into(),
        }
        .into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Non-success response from the service, including signature rejections.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for Status {}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

/// Plain-text reason attached to locally raised signing errors.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub reason: String,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl StdError for Message {}

impl From<Status> for Error {
    fn from(err: Status) -> Self {
        Error::with_source(Kind::Status, err)
    }
}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<InvalidHeaderValue> for Error {
    fn from(e: InvalidHeaderValue) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_failures_are_distinguished_from_status() {
        assert!(
            Error::invalid_credential("empty").is_signing_failure(),
            "credential errors are local"
        );
        assert!(
            Error::encoding("bad body").is_signing_failure(),
            "encoding errors are local"
        );

        let rejected = Error::status(
            StatusCode::UNAUTHORIZED,
            Method::GET,
            "/v1/wallets".to_owned(),
            "signature mismatch",
        );
        assert_eq!(rejected.kind(), Kind::Status);
        assert!(
            !rejected.is_signing_failure(),
            "a server rejection is not a local signing failure"
        );
    }

    #[test]
    fn status_is_downcastable() {
        let err = Error::status(
            StatusCode::BAD_REQUEST,
            Method::POST,
            "/v1/memos".to_owned(),
            "boom",
        );
        let status = err.downcast_ref::<Status>().expect("status source");
        assert_eq!(status.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Status: error(400 Bad Request) making POST call to /v1/memos with boom"
        );
    }

    #[test]
    fn validation_message_is_displayed() {
        let err = Error::validation("missing path parameter `walletAddress`");
        assert_eq!(err.kind(), Kind::Validation);
        assert_eq!(
            err.to_string(),
            "Validation: invalid: missing path parameter `walletAddress`"
        );
    }
}
