//! Tracing subscriber setup.
//!
//! Logs go to stderr so JSON printed on stdout stays machine-readable.
//! `RUST_LOG` takes precedence over the verbosity flag.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for a `-v` count.
#[must_use]
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "shingetsu=warn",
        1 => "shingetsu=info",
        2 => "shingetsu=debug",
        _ => "shingetsu=trace",
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init(verbosity: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbosity).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
