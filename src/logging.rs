//! Per-component logging.
//!
//! Each component gets its own `tracing` dispatcher with a rotating file sink
//! under the logs directory and, optionally, a console sink on stderr.
//! Events emitted through a [`ComponentLogger`] never reach the global
//! subscriber, so nothing is written twice.
//!
//! Levels use the application's own [`LogLevel`] names (`DEBUG`, `INFO`,
//! `WARNING`, `ERROR`, `CRITICAL`) so configuration files stay readable.

use crate::config::{ConfigStore, LoggingSettings};
use crate::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{Dispatch, Level};
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Severity accepted in configuration and used by component loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, String> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Convert a LogLevel to the tracing Level it is emitted at.
pub fn log_level_to_tracing(level: LogLevel) -> Level {
    match level {
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warning => Level::WARN,
        LogLevel::Error | LogLevel::Critical => Level::ERROR,
    }
}

/// File rotation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl std::str::FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "midnight" | "daily" | "d" => Ok(Rotation::Daily),
            "hourly" | "h" => Ok(Rotation::Hourly),
            "minutely" | "m" => Ok(Rotation::Minutely),
            "never" | "none" => Ok(Rotation::Never),
            other => Err(format!("unknown rotation '{}'", other)),
        }
    }
}

impl From<Rotation> for tracing_appender::rolling::Rotation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Minutely => tracing_appender::rolling::Rotation::MINUTELY,
            Rotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
            Rotation::Daily => tracing_appender::rolling::Rotation::DAILY,
            Rotation::Never => tracing_appender::rolling::Rotation::NEVER,
        }
    }
}

impl Rotation {
    /// Date suffix of the active file, matching tracing-appender's naming.
    fn date_suffix(self) -> Option<String> {
        let now = chrono::Utc::now();
        match self {
            Rotation::Minutely => Some(now.format("%Y-%m-%d-%H-%M").to_string()),
            Rotation::Hourly => Some(now.format("%Y-%m-%d-%H").to_string()),
            Rotation::Daily => Some(now.format("%Y-%m-%d").to_string()),
            Rotation::Never => None,
        }
    }
}

/// Logger bound to one component.
///
/// Outputs to:
/// 1. `<logs>/<component>[.<date>].log` at the component's level - always
/// 2. stderr at the console level - if console echo is enabled
pub struct ComponentLogger {
    name: String,
    level: LogLevel,
    log_dir: PathBuf,
    rotation: Rotation,
    dispatch: Dispatch,
}

impl std::fmt::Debug for ComponentLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLogger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("log_file", &self.log_file())
            .finish()
    }
}

impl ComponentLogger {
    fn build(name: &str, logs_dir: &Path, settings: &LoggingSettings) -> Result<Self> {
        let level = settings.level_for(name);
        let (rotation, _) = settings.rotation();

        let appender = RollingFileAppender::builder()
            .rotation(rotation.into())
            .filename_prefix(name)
            .filename_suffix("log")
            .max_log_files(settings.backup_count + 1)
            .build(logs_dir)
            .map_err(|e| {
                Error::new(
                    ErrorCode::IoError,
                    format!("Cannot create log file for '{}': {}", name, e),
                )
                .with_path(logs_dir)
            })?;

        let file_layer = fmt::layer()
            .with_writer(appender)
            .with_ansi(false)
            .with_target(false)
            .with_filter(LevelFilter::from_level(log_level_to_tracing(level)));

        let console_layer = settings.enable_console.then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_filter(LevelFilter::from_level(log_level_to_tracing(
                    settings.console_level,
                )))
        });

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer);

        Ok(Self {
            name: name.to_string(),
            level,
            log_dir: logs_dir.to_path_buf(),
            rotation,
            dispatch: Dispatch::new(subscriber),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level applied to the file sink.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Path of the file currently being written.
    pub fn log_file(&self) -> PathBuf {
        let file_name = match self.rotation.date_suffix() {
            Some(date) => format!("{}.{}.log", self.name, date),
            None => format!("{}.log", self.name),
        };
        self.log_dir.join(file_name)
    }

    /// Log a message through this component's sinks only.
    pub fn log(&self, level: LogLevel, message: &str) {
        let name = self.name.as_str();
        tracing::dispatcher::with_default(&self.dispatch, || match level {
            LogLevel::Critical => {
                tracing::error!(component = %name, severity = "CRITICAL", "{}", message)
            }
            LogLevel::Error => tracing::error!(component = %name, "{}", message),
            LogLevel::Warning => tracing::warn!(component = %name, "{}", message),
            LogLevel::Info => tracing::info!(component = %name, "{}", message),
            LogLevel::Debug => tracing::debug!(component = %name, "{}", message),
        });
    }

    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    pub fn warning(&self, msg: &str) {
        self.log(LogLevel::Warning, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }

    pub fn critical(&self, msg: &str) {
        self.log(LogLevel::Critical, msg);
    }
}

/// Log through `logger` when one was injected, else through the global dispatcher.
pub fn emit(logger: Option<&ComponentLogger>, level: LogLevel, message: &str) {
    match logger {
        Some(logger) => logger.log(level, message),
        None => match level {
            LogLevel::Critical | LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
        },
    }
}

/// Registry of component loggers sharing one logs directory and one set of settings.
#[derive(Debug)]
pub struct LoggerFactory {
    logs_dir: PathBuf,
    settings: LoggingSettings,
    loggers: Mutex<HashMap<String, Arc<ComponentLogger>>>,
}

static GLOBAL_FACTORY: OnceLock<Arc<LoggerFactory>> = OnceLock::new();
static GLOBAL_INIT: Mutex<()> = Mutex::new(());

impl LoggerFactory {
    /// Create the logs directory and resolve settings from `store`.
    ///
    /// Settings problems never fail initialization; they are reported on
    /// stderr and the built-in defaults apply.
    pub fn init(logs_dir: impl Into<PathBuf>, store: Option<&ConfigStore>) -> Result<Self> {
        Self::with_settings(logs_dir, resolve_settings(store))
    }

    /// Create a factory with explicit settings.
    pub fn with_settings(logs_dir: impl Into<PathBuf>, settings: LoggingSettings) -> Result<Self> {
        let logs_dir = logs_dir.into();
        std::fs::create_dir_all(&logs_dir).map_err(|e| Error::io(&logs_dir, e))?;

        if !settings.rotation().1 {
            eprintln!(
                "Warning: Unknown log rotation '{}', rotating daily",
                settings.rotation_when
            );
        }

        Ok(Self {
            logs_dir,
            settings,
            loggers: Mutex::new(HashMap::new()),
        })
    }

    /// The process-wide factory, initialized on the first call only.
    ///
    /// Later calls ignore their arguments and return the same instance.
    pub fn global(logs_dir: impl Into<PathBuf>, store: Option<&ConfigStore>) -> Result<Arc<Self>> {
        if let Some(factory) = GLOBAL_FACTORY.get() {
            return Ok(Arc::clone(factory));
        }
        let _guard = GLOBAL_INIT.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(factory) = GLOBAL_FACTORY.get() {
            return Ok(Arc::clone(factory));
        }
        let factory = Arc::new(Self::init(logs_dir, store)?);
        let _ = GLOBAL_FACTORY.set(Arc::clone(&factory));
        Ok(factory)
    }

    /// The process-wide factory, if [`LoggerFactory::global`] has run.
    pub fn try_global() -> Option<Arc<Self>> {
        GLOBAL_FACTORY.get().cloned()
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn settings(&self) -> &LoggingSettings {
        &self.settings
    }

    /// Get or create the logger for `component`.
    ///
    /// The same name always yields the same `Arc`.
    pub fn get_logger(&self, component: &str) -> Result<Arc<ComponentLogger>> {
        let mut loggers = self.loggers.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(logger) = loggers.get(component) {
            return Ok(Arc::clone(logger));
        }

        let logger = Arc::new(ComponentLogger::build(
            component,
            &self.logs_dir,
            &self.settings,
        )?);
        loggers.insert(component.to_string(), Arc::clone(&logger));
        drop(loggers);

        logger.info(&format!(
            "Logger initialized for component '{}' with level '{}'",
            component,
            logger.level()
        ));
        Ok(logger)
    }

    /// Names of the components created so far, sorted.
    pub fn components(&self) -> Vec<String> {
        let loggers = self.loggers.lock().unwrap_or_else(|p| p.into_inner());
        let mut names: Vec<String> = loggers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Write the startup block through the `main` component.
    pub fn log_startup_banner(&self) {
        let main = match self.get_logger("main") {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("Warning: Cannot write startup banner: {}", e);
                return;
            }
        };
        let settings = serde_json::to_string(&self.settings)
            .unwrap_or_else(|_| format!("{:?}", self.settings));

        main.info(&"=".repeat(60));
        main.info("GuitarTrainer Application Started");
        main.info(&format!("Timestamp: {}", chrono::Local::now().to_rfc3339()));
        main.info(&format!("Logs directory: {}", self.logs_dir.display()));
        main.info(&format!("Logging config: {}", settings));
        main.info(&"=".repeat(60));
    }
}

/// Logging settings from the infrastructure config, or the defaults.
fn resolve_settings(store: Option<&ConfigStore>) -> LoggingSettings {
    let Some(store) = store else {
        return LoggingSettings::default();
    };
    match store.infrastructure() {
        Ok(infra) => {
            let (settings, warning) = LoggingSettings::from_section(&infra.logging);
            if let Some(warning) = warning {
                eprintln!("Warning: {}", warning);
            }
            settings
        }
        Err(e) => {
            eprintln!("Warning: Error loading logging config from hierarchy: {}", e);
            LoggingSettings::default()
        }
    }
}
