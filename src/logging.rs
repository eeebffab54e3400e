//! Tracing subscriber setup for the `doclib` binary.
//!
//! Events go to stderr so stdout stays clean for listings and JSON.
//! `RUST_LOG` overrides the default level.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive: `doclib=info`, or `doclib=debug` when verbose.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "doclib=debug" } else { "doclib=info" }
}

/// Build the filter, preferring `RUST_LOG` when it is set and valid.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(verbose: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
}
