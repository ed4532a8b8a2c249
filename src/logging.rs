// src/logging.rs
// =============================================================================
// Sets up the global tracing subscriber.
//
// RUST_LOG takes precedence; otherwise the level from the settings file is
// used. Output goes to stderr so it never mixes with report output on
// stdout.
// =============================================================================

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LogSettings};

pub fn init(settings: &LogSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    // Only fails when a subscriber is already installed (e.g. in tests)
    if let Err(e) = result {
        eprintln!("Warning: logging already initialised: {}", e);
    }
}
