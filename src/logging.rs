//! Structured logging: every component logs through the standard
//! `log` facade — `trace!` per-message dispatch, `debug!` lifecycle
//! transitions, `warn!` recoverable anomalies, `error!` anything that aborts
//! an operation's promise. This module just wires up a backend so example
//! binaries and tests get readable output without every caller hand-rolling
//! one.

use log::LevelFilter;

use crate::config::LogConfig;

/// Installs an `env_logger` backend. Honors `PORTER_LOG` first, falling
/// back to `cfg.level`; safe to call more than once (e.g. across tests)
/// since it uses `try_init` rather than panicking on a second call.
pub fn init_logging(cfg: &LogConfig) {
    let level = std::env::var("PORTER_LOG").unwrap_or_else(|_| cfg.level.clone());
    let filter: LevelFilter = level.parse().unwrap_or(LevelFilter::Info);

    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        let cfg = LogConfig {
            level: "debug".to_string(),
            format: "{date} {time} {level} [{module}] {body}".to_string(),
        };
        init_logging(&cfg);
        init_logging(&cfg);
    }
}
