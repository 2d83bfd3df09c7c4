//! Diagnostic logging setup.
//!
//! Logs go to stderr so tailed lines on stdout stay clean. `RUST_LOG`
//! takes precedence over the level passed in:
//! ```bash
//! RUST_LOG=glob_tail=debug glob-tail 'logs/*.log'
//! ```

use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Default filter when neither `RUST_LOG` nor a level is given.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global subscriber. Only the first call takes effect.
pub fn init(directive: &str) {
    INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_filter(build_filter(directive));

        // A subscriber set elsewhere (e.g. by an embedding application) wins.
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}

fn build_filter(directive: &str) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("debug");
        init("trace");
        tracing::debug!("logging initialised twice without panicking");
    }

    #[test]
    fn test_bad_directive_falls_back() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = build_filter("glob_tail=notalevel");
        assert_eq!(filter.to_string(), EnvFilter::new(DEFAULT_DIRECTIVE).to_string());
    }
}
