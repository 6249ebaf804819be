//! Diagnostic logging through `tracing-subscriber`.
//!
//! Diagnostics go to stderr so stdout carries only wire records.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "FACEGATE_LOG";

/// Quiet third-party targets.
const NOISY_TARGETS: &[(&str, &str)] = &[("rusqlite", "warn")];

/// Builds the filter from `FACEGATE_LOG` when set, otherwise from the
/// `-v` count.
pub fn build_env_filter(verbosity: u8) -> anyhow::Result<EnvFilter> {
    let base = match std::env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => level_for(verbosity).to_string(),
    };

    let mut directives = vec![base];
    for (target, level) in NOISY_TARGETS {
        directives.push(format!("{}={}", target, level));
    }

    let filter = directives.join(",");
    EnvFilter::try_new(&filter)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter, e))
}

pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = build_env_filter(verbosity)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
    Ok(())
}
