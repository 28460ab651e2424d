use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distr::{Alphanumeric, SampleString as _};

use crate::error::{Error, Kind};
use crate::{Result, Timestamp};

pub const NONCE_LENGTH: usize = 8;

/// Single-use request nonce of [`NONCE_LENGTH`] ASCII alphanumerics.
///
/// Uniqueness is probabilistic; the server decides what counts as a replay.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Nonce(String);

impl Nonce {
    /// Draws a fresh nonce from the thread-local CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        Self(Alphanumeric.sample_string(&mut rand::rng(), NONCE_LENGTH))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Nonce {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.len() != NONCE_LENGTH || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::validation(format!(
                "nonce must be {NONCE_LENGTH} ASCII alphanumeric characters, got `{s}`"
            )));
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current wall-clock time in whole milliseconds since the Unix epoch.
pub fn now_millis() -> Result<Timestamp> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::with_source(Kind::Clock, e))?;

    Timestamp::try_from(elapsed.as_millis()).map_err(|e| Error::with_source(Kind::Clock, e))
}
