//! Small environment-variable parsing helpers shared by both binaries'
//! configuration loaders.

use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

/// Parses `name` from the environment, falling back to `default` and
/// logging a warning if the value is present but unparsable.
pub fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match std::env::var(name) {
        Err(_) => default,
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(name, raw, default = %default, "invalid env var, using default");
                default
            }
        },
    }
}

/// Parses a `Duration` (in whole seconds) from the environment.
pub fn env_secs(name: &str, default_secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(env_or(name, default_secs))
}

pub fn env_string(name: &str, default: impl Into<String>) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}
