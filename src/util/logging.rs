//! Logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the embedding application. [`init_logging`] is the convenience path.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive used when the caller passes an empty string.
pub const DEFAULT_LOG_FILTER: &str = "mtlx_synth=info";

/// Install a global fmt subscriber filtered by `filter` (e.g. `"mtlx_synth=debug"`).
///
/// Returns `false` if the directive does not parse or a global subscriber is
/// already installed; calling it twice is harmless.
pub fn init_logging(filter: &str) -> bool {
    let directive = if filter.trim().is_empty() {
        DEFAULT_LOG_FILTER
    } else {
        filter
    };
    let Ok(env_filter) = EnvFilter::try_new(directive) else {
        return false;
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true));
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        let _ = init_logging("mtlx_synth=debug");
        // Second install always loses to whichever subscriber came first.
        assert!(!init_logging(""));
    }
}
