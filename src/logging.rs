//! Global tracing subscriber setup.
//!
//! Log level comes from the settings (`VERBOSE` ⇒ debug, otherwise info),
//! with `RUST_LOG` taking precedence when set. Output is human-readable for
//! the local environment and JSON everywhere else, so production log lines
//! are machine-parseable without local development paying for it.

use tracing_subscriber::EnvFilter;

use crate::config::{Environment, Settings};

/// Installs the global tracing subscriber.
///
/// Sets process-wide dispatcher state; call exactly once during startup,
/// before any request-handling tasks are spawned. Panics if a global
/// subscriber is already installed.
pub fn init(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.environment == Environment::Local {
        builder.init();
    } else {
        builder.json().init();
    }
}

fn default_directive(settings: &Settings) -> &'static str {
    if settings.verbose { "debug" } else { "info" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(verbose: bool) -> Settings {
        Settings {
            environment: Environment::Test,
            verbose,
            port: 0,
            read_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(1),
            idle_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn verbose_selects_debug_level() {
        assert_eq!(default_directive(&settings(true)), "debug");
        assert_eq!(default_directive(&settings(false)), "info");
    }
}
