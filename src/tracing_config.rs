//! Tracing setup for hosts debugging the peer layer.
//!
//! Output format is chosen by `ES2PANDA_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `json`: one JSON object per event
//!
//! ```bash
//! ES2PANDA_LOG=debug node driver.js
//! ES2PANDA_LOG="es2panda_native::arena=trace" ES2PANDA_LOG_FORMAT=json node driver.js
//! ```
//!
//! Nothing is installed unless `ES2PANDA_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("ES2PANDA_LOG_FORMAT").unwrap_or_default())
    }
}

/// `ES2PANDA_LOG` wins over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("ES2PANDA_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// Returns `false` when logging was not requested or a subscriber is already
/// installed; calling it more than once is harmless.
pub fn init_tracing() -> bool {
    let has_own_log = std::env::var("ES2PANDA_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_own_log && !has_rust_log {
        return false;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("tree"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
    }
}
