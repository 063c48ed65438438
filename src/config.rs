//! Server settings loaded from environment variables.
//!
//! Every variable has a default suitable for local development:
//!
//! | Variable        | Default | Meaning                                  |
//! |-----------------|---------|------------------------------------------|
//! | `ENVIRONMENT`   | `local` | `local`, `test`, or `production`         |
//! | `VERBOSE`       | `false` | Debug-level logging when `true`          |
//! | `PORT`          | `8080`  | TCP port to bind                         |
//! | `READ_TIMEOUT`  | `15`    | Seconds to wait for request headers      |
//! | `WRITE_TIMEOUT` | `15`    | Per-request handler + write deadline (s) |
//! | `IDLE_TIMEOUT`  | `60`    | Keep-alive idle allowance (s)            |

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

// ── Environment ───────────────────────────────────────────────────────────────

/// Which environment the application is running in.
///
/// Drives log formatting (plain text locally, JSON elsewhere) and is echoed
/// in startup log events.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Environment {
    Local,
    Test,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Test => "test",
            Self::Production => "production",
        })
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            other => Err(format!("{other} (must be local, test or production)")),
        }
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

/// Validated, read-only server configuration.
///
/// Load once at startup with [`Settings::from_env`] and pass by value; it is
/// cheap to clone and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Settings {
    pub environment: Environment,
    pub verbose: bool,
    pub port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Settings {
    /// Loads settings from the process environment, reading a `.env` file
    /// first if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is the normal case, not an error.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            environment: parse(&lookup, "ENVIRONMENT", Environment::Local)?,
            verbose: parse(&lookup, "VERBOSE", false)?,
            port: parse(&lookup, "PORT", 8080)?,
            read_timeout: Duration::from_secs(parse(&lookup, "READ_TIMEOUT", 15)?),
            write_timeout: Duration::from_secs(parse(&lookup, "WRITE_TIMEOUT", 15)?),
            idle_timeout: Duration::from_secs(parse(&lookup, "IDLE_TIMEOUT", 60)?),
        })
    }

    /// The all-interfaces address the server binds.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Parses one variable, falling back to `default` when unset.
fn parse<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value.parse().map_err(|e| ConfigError::invalid(name, e)),
        None => Ok(default),
    }
}

// ── ConfigError ───────────────────────────────────────────────────────────────

/// A configuration variable failed to parse or validate.
#[derive(Debug)]
pub struct ConfigError {
    name: String,
    reason: String,
}

impl ConfigError {
    fn invalid(name: &str, reason: impl fmt::Display) -> Self {
        Self { name: name.to_owned(), reason: reason.to_string() }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.name, self.reason)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = from_map(&[]).unwrap();
        assert_eq!(settings.environment, Environment::Local);
        assert!(!settings.verbose);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.read_timeout, Duration::from_secs(15));
        assert_eq!(settings.write_timeout, Duration::from_secs(15));
        assert_eq!(settings.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let settings = from_map(&[
            ("ENVIRONMENT", "production"),
            ("VERBOSE", "true"),
            ("PORT", "3000"),
            ("IDLE_TIMEOUT", "120"),
        ])
        .unwrap();
        assert_eq!(settings.environment, Environment::Production);
        assert!(settings.verbose);
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.idle_timeout, Duration::from_secs(120));
        assert_eq!(settings.socket_addr().port(), 3000);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = from_map(&[("ENVIRONMENT", "staging")]).unwrap_err();
        assert!(err.to_string().contains("ENVIRONMENT"));
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn environment_parsing_ignores_case() {
        let settings = from_map(&[("ENVIRONMENT", "Production")]).unwrap();
        assert_eq!(settings.environment, Environment::Production);
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let err = from_map(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn environment_display_round_trips() {
        for env in [Environment::Local, Environment::Test, Environment::Production] {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }
}
