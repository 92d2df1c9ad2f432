//! Logging setup
//!
//! `RUST_LOG` wins when set; otherwise `career_tree=<log-level>,info`.
//! `--log-json` switches output to one JSON object per line.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Args;
use crate::types::{CareerError, Result};

/// Filter directive used when `RUST_LOG` is unset
pub fn default_directive(log_level: &str) -> String {
    format!("career_tree={},info", log_level)
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(&args.log_level)))
        .map_err(|e| CareerError::Config(format!("invalid log level '{}': {}", args.log_level, e)))?;

    let json = args.log_json.then(|| fmt::layer().json());
    let text = (!args.log_json).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()
        .map_err(|e| CareerError::Config(format!("logging already initialised: {}", e)))
}
