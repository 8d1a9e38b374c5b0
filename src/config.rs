//! Layered configuration: compiled-in defaults, then an optional TOML
//! file, then environment variable overrides, each layer winning over the
//! last, built on the `config` crate instead of hand-rolled TOML merging.

use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub pool_size: usize,
    pub frequency_millis: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailboxConfig {
    pub msg_process_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub mailbox: MailboxConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scheduler: SchedulerConfig {
                pool_size: num_cpus::get(),
                frequency_millis: 50,
            },
            mailbox: MailboxConfig {
                msg_process_limit: 1000,
            },
            log: LogConfig {
                level: "info".to_string(),
                format: "{date} {time} {level} [{module}] {body}".to_string(),
            },
        }
    }
}

impl Config {
    /// Builds a `Config` from compiled-in defaults, an optional TOML file
    /// (`PORTER_CONF`, defaulting to `config/porter.toml`), and
    /// `PORTER_<SECTION>_<KEY>` environment overrides, in that precedence
    /// order.
    pub fn load() -> Result<Config, Error> {
        let defaults = Config::default();
        let path = std::env::var("PORTER_CONF").unwrap_or_else(|_| "config/porter.toml".into());

        let mut builder = config::Config::builder()
            .set_default("scheduler.pool_size", defaults.scheduler.pool_size as i64)?
            .set_default(
                "scheduler.frequency_millis",
                defaults.scheduler.frequency_millis as i64,
            )?
            .set_default(
                "mailbox.msg_process_limit",
                defaults.mailbox.msg_process_limit as i64,
            )?
            .set_default("log.level", defaults.log.level.clone())?
            .set_default("log.format", defaults.log.format.clone())?;

        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::from(std::path::PathBuf::from(&path)));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("PORTER")
                .separator("_")
                .try_parsing(true),
        );

        let raw = builder.build()?;
        Ok(raw.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    /// `PORTER_CONF` is process-wide state; cargo runs unit tests in this
    /// file on separate threads of the same binary, so every test that
    /// touches it must hold this lock for the duration of the mutation.
    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn defaults_are_self_consistent() {
        let cfg = Config::default();
        assert!(cfg.scheduler.pool_size >= 1);
        assert_eq!(cfg.scheduler.frequency_millis, 50);
        assert_eq!(cfg.mailbox.msg_process_limit, 1000);
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn load_falls_back_to_defaults_without_a_config_file() {
        let _guard = env_lock().lock().unwrap();
        std::env::set_var("PORTER_CONF", "config/does-not-exist.toml");
        let cfg = Config::load().expect("defaults alone should build a valid config");
        assert_eq!(cfg.mailbox.msg_process_limit, 1000);
        std::env::remove_var("PORTER_CONF");
    }

    #[test]
    fn load_picks_up_overrides_from_a_toml_file() {
        let _guard = env_lock().lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("porter.toml");
        std::fs::write(
            &path,
            "[scheduler]\npool_size = 3\nfrequency_millis = 50\n\n[mailbox]\nmsg_process_limit = 1000\n\n[log]\nlevel = \"warn\"\nformat = \"{date} {time} {level} [{module}] {body}\"\n",
        )
        .unwrap();

        std::env::set_var("PORTER_CONF", &path);
        let cfg = Config::load().expect("file-backed config should build");
        assert_eq!(cfg.scheduler.pool_size, 3);
        assert_eq!(cfg.log.level, "warn");
        std::env::remove_var("PORTER_CONF");
    }
}
