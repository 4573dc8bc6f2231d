//! Multi-file logging.
//!
//! Every event goes to the console and to the root `supermanager.log`.
//! Events are also routed by their `tracing` target into one file per
//! component, rotated daily:
//!
//! | Log File          | Component                         | Target Prefixes                              |
//! |-------------------|-----------------------------------|----------------------------------------------|
//! | supermanager.log  | Root logger (all components)      | (all)                                        |
//! | core-auth.log     | Accounts, tokens, access control  | supermanager_auth, server middleware and auth API |
//! | inventory.log     | Catalogs, devices, locations      | supermanager_inventory, server resource API  |
//! | persistence.log   | Database access and migrations    | supermanager_persistence, supermanager_migration, sea_orm |
//! | access.log        | HTTP access log                   | actix_web::middleware::logger                |
//!
//! `RUST_LOG` overrides the configured level for the console and the root file.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use supermanager_server_common::Configuration;

const ROOT_LOG_FILE: &str = "supermanager.log";

struct ComponentLogDef {
    file_name: &'static str,
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "core-auth.log",
        targets: &[
            "supermanager_auth",
            "supermanager_server_common::secured",
            "supermanager_server::middleware",
            "supermanager_server::api::auth",
        ],
    },
    ComponentLogDef {
        file_name: "inventory.log",
        targets: &["supermanager_inventory", "supermanager_server::api::resource"],
    },
    ComponentLogDef {
        file_name: "persistence.log",
        targets: &[
            "supermanager_persistence",
            "supermanager_migration",
            "sea_orm",
            "sea_orm_migration",
        ],
    },
    ComponentLogDef {
        file_name: "access.log",
        targets: &["actix_web::middleware::logger"],
    },
];

#[derive(Debug, Clone, Copy)]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl LogRotation {
    /// `minutely`, `hourly`, `daily` or `never`; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minutely" => Some(LogRotation::Minutely),
            "hourly" => Some(LogRotation::Hourly),
            "daily" => Some(LogRotation::Daily),
            "never" => Some(LogRotation::Never),
            _ => None,
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Minutely => Rotation::MINUTELY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Logging configuration for the entire application.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub console_output: bool,
    pub file_logging: bool,
    pub level: Level,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            console_output: true,
            file_logging: true,
            level: Level::INFO,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// Reads the `logging.*` keys. An unknown level falls back to `info`,
    /// an unknown rotation to daily.
    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self {
            log_dir: PathBuf::from(configuration.log_dir()),
            console_output: configuration.log_console(),
            file_logging: configuration.log_file(),
            level: configuration.log_level().parse().unwrap_or(Level::INFO),
            rotation: LogRotation::parse(&configuration.log_rotation()).unwrap_or(LogRotation::Daily),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
    }
}

/// Keeps the non-blocking file writers alive; buffered output is flushed on drop.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

fn file_writer(config: &LoggingConfig, file_name: &str, guards: &mut Vec<WorkerGuard>) -> NonBlocking {
    let appender = RollingFileAppender::new(config.rotation.into(), &config.log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);
    writer
}

/// Installs the global subscriber: console, root file and component files.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    let mut guards: Vec<WorkerGuard> = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_filter(config.env_filter());
        layers.push(Box::new(console_layer));
    }

    if config.file_logging {
        let root_layer = fmt::layer()
            .with_writer(file_writer(config, ROOT_LOG_FILE, &mut guards))
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_filter(config.env_filter());
        layers.push(Box::new(root_layer));

        for component in COMPONENT_LOGS {
            // Component files take everything from their targets at the configured level
            let level = LevelFilter::from_level(config.level);
            let targets = component
                .targets
                .iter()
                .fold(Targets::new(), |t, target| t.with_target(*target, level));

            let layer = fmt::layer()
                .with_writer(file_writer(config, component.file_name, &mut guards))
                .with_target(true)
                .with_thread_names(true)
                .with_ansi(false)
                .with_filter(targets);
            layers.push(Box::new(layer));
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            "File logging initialized: {} (root) + {} component log files",
            ROOT_LOG_FILE,
            COMPONENT_LOGS.len()
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}

#[cfg(test)]
mod tests {
    use config::Config;

    use super::*;

    #[test]
    fn test_logging_config_from_configuration() {
        let config = Config::builder()
            .set_override("logging.dir", "/tmp/supermanager-logs")
            .unwrap()
            .set_override("logging.level", "debug")
            .unwrap()
            .set_override("logging.console", false)
            .unwrap()
            .set_override("logging.rotation", "Hourly")
            .unwrap()
            .build()
            .unwrap();

        let logging = LoggingConfig::from_configuration(&Configuration::from_config(config));
        assert_eq!(logging.log_dir, PathBuf::from("/tmp/supermanager-logs"));
        assert!(!logging.console_output);
        assert!(logging.file_logging);
        assert_eq!(logging.level, Level::DEBUG);
        assert!(matches!(logging.rotation, LogRotation::Hourly));
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = Config::builder()
            .set_override("logging.level", "chatty")
            .unwrap()
            .build()
            .unwrap();

        let logging = LoggingConfig::from_configuration(&Configuration::from_config(config));
        assert_eq!(logging.level, Level::INFO);
        assert!(matches!(logging.rotation, LogRotation::Daily));
    }

    #[test]
    fn test_log_rotation_conversion() {
        assert_eq!(Rotation::from(LogRotation::Daily), Rotation::DAILY);
        assert_eq!(Rotation::from(LogRotation::Never), Rotation::NEVER);
        assert!(LogRotation::parse("weekly").is_none());
    }

    #[test]
    fn test_component_log_definitions() {
        for component in COMPONENT_LOGS {
            assert!(component.file_name.ends_with(".log"));
            assert_ne!(component.file_name, ROOT_LOG_FILE);
            assert!(!component.targets.is_empty());
        }
    }
}
