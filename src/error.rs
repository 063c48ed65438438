//! Unified error type.

use std::fmt;

use crate::config::ConfigError;

/// The error type returned by joist's fallible operations.
///
/// Application-level failures (404, 413, etc.) are expressed through the
/// response sink, not as `Error`s. This type surfaces infrastructure
/// failures: configuration, binding a port, accepting a connection, or a
/// request blowing its write deadline.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(ConfigError),
    /// A request ran past the configured write timeout; the connection is
    /// closed without a response.
    Deadline,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Deadline => write!(f, "request deadline exceeded"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Deadline => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
