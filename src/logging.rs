//! Tracing setup for the binary.
//!
//! Logs go to stderr so they never interleave with the menus on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "YOYO_LOG";

fn default_level(debug: bool) -> &'static str {
    if debug { "debug" } else { "warn" }
}

/// `YOYO_LOG` wins; otherwise `warn`, or `debug` with `--debug`.
pub fn build_env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level(debug)))
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(debug))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), "warn");
        assert_eq!(default_level(true), "debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
