use std::env;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::auth::Credentials;
use crate::error::Error;

pub const BASE_URL_ENV: &str = "LINK_API_BASE_URL";
pub const API_KEY_ENV: &str = "LINK_SERVICE_API_KEY";
pub const API_SECRET_ENV: &str = "LINK_SERVICE_API_SECRET";

/// Client configuration.
///
/// Credentials are validated when they are created, so a `Config` always carries a usable
/// key pair.
#[non_exhaustive]
#[derive(Clone, Debug, bon::Builder)]
pub struct Config {
    pub host: Url,
    pub credentials: Credentials,
    pub timeout: Option<Duration>,
}

impl Config {
    /// Builds a configuration from plain strings, typically read from app-level settings.
    pub fn from_raw(host: &str, api_key: &str, api_secret: SecretString) -> Result<Self> {
        let host = parse_host(host)?;
        let credentials = Credentials::new(api_key, api_secret)?;

        Ok(Self::builder().host(host).credentials(credentials).build())
    }

    /// Reads [`BASE_URL_ENV`], [`API_KEY_ENV`] and [`API_SECRET_ENV`].
    pub fn from_env() -> Result<Self> {
        let host = read_env(BASE_URL_ENV)?;
        let api_key = read_env(API_KEY_ENV)?;
        let api_secret = SecretString::from(read_env(API_SECRET_ENV)?);

        Self::from_raw(&host, &api_key, api_secret)
    }
}

fn read_env(name: &str) -> Result<String> {
    env::var(name).map_err(|e| Error::validation(format!("environment variable {name}: {e}")))
}

fn parse_host(host: &str) -> Result<Url> {
    if host.trim().is_empty() {
        return Err(Error::validation("invalid api-base-url: blank"));
    }

    let url = Url::parse(host)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::validation(format!(
            "api-base-url must be http or https, got `{}`",
            url.scheme()
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::validation(
            "api-base-url must not carry a query or fragment",
        ));
    }

    Ok(url)
}
