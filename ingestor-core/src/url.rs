//! Normalized URL value type.
//!
//! Replaces the runtime-validated `HttpUrl` the source relied on with an
//! explicit type: parse once, enforce `scheme ∈ {http, https}`, normalize an
//! empty path to `/`, and expose a canonical string form used as the unique
//! store key.

use std::fmt;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid url: {0}")]
    Parse(String),
    #[error("unsupported scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),
    #[error("url has no host")]
    MissingHost,
}

/// An absolute `http(s)` URL, normalized so that two textually different
/// inputs which denote the same resource compare equal and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let mut parsed = url::Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(UrlError::UnsupportedScheme(other.to_string())),
        }

        if parsed.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }

        if parsed.path().is_empty() {
            parsed.set_path("/");
        }

        Ok(Self(parsed.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for NormalizedUrl {
    type Error = UrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NormalizedUrl> for String {
    fn from(value: NormalizedUrl) -> Self {
        value.0
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
