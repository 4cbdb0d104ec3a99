//! Tracing subscriber setup for binaries and tools embedding the client.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use mr_common::{LoggingConfig, MrError, MrResult};

/// Map a configured level name to a tracing level. Unknown names fall back to INFO.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global fmt subscriber.
///
/// Fails with `Config` if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> MrResult<()> {
    let level = parse_level(&config.level);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.pretty().finish())
    };

    result.map_err(|e| MrError::Config(format!("Failed to install tracing subscriber: {}", e)))
}
