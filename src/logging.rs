//! Optional file logging for tool hosts.
//!
//! A host only installs a subscriber when its configuration carries a
//! `[logging]` table; otherwise the embedding application owns tracing
//! setup. When enabled, events are written through a non-blocking rolling
//! file appender under the platform data directory, e.g.
//! `~/.local/share/acton-tools/logs/acton-tools.log.2026-10-16`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_DIR_NAME: &str = "acton-tools";

/// Host file logging settings, usually read from the `[logging]` table.
///
/// ```rust
/// use acton_tool_rendezvous::logging::{LogLevel, LogRotation, LoggingConfig};
///
/// let config = LoggingConfig::new()
///     .with_app_name("coding-agent")
///     .with_level(LogLevel::Debug)
///     .with_rotation(LogRotation::Hourly)
///     .with_filter("acton_tool_rendezvous=trace");
/// assert_eq!(config.file_prefix(), "coding-agent.log");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Prefix of the log file name: `{app_name}.log`
    pub app_name: String,
    /// Overrides the data-dir location
    pub log_dir: Option<PathBuf>,
    pub level: LogLevel,
    /// `EnvFilter` directives; take precedence over `level`
    pub filter: Option<String>,
    pub rotation: LogRotation,
}

impl LoggingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A config that installs nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets filter directives such as `"acton_tool_rendezvous::coordinator=debug"`.
    #[must_use]
    pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// The file name the appender rolls, before any date suffix.
    #[must_use]
    pub fn file_prefix(&self) -> String {
        format!("{}.log", self.app_name)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: LOG_DIR_NAME.to_string(),
            log_dir: None,
            level: LogLevel::default(),
            filter: None,
            rotation: LogRotation::default(),
        }
    }
}

/// Minimum level written to the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// How often a new log file is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// One file, never rolled
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Flushes buffered log lines when dropped.
pub struct LoggingGuard {
    _worker: tracing_appender::non_blocking::WorkerGuard,
}

impl fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingGuard").finish_non_exhaustive()
    }
}

static PROCESS_GUARD: OnceLock<LoggingGuard> = OnceLock::new();

/// Why file logging could not be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingError {
    pub kind: LoggingErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingErrorKind {
    /// No `log_dir` was configured and the platform has no data directory
    NoDataDir,
    CreateDirFailed { path: PathBuf, reason: String },
    InvalidFilter { directives: String, reason: String },
    /// Usually another global subscriber is already installed
    SubscriberInitFailed { reason: String },
}

impl LoggingError {
    #[must_use]
    pub fn new(kind: LoggingErrorKind) -> Self {
        Self { kind }
    }

    #[must_use]
    pub fn no_data_dir() -> Self {
        Self::new(LoggingErrorKind::NoDataDir)
    }

    #[must_use]
    pub fn create_dir_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::CreateDirFailed {
            path,
            reason: reason.into(),
        })
    }

    #[must_use]
    pub fn invalid_filter(directives: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::InvalidFilter {
            directives: directives.into(),
            reason: reason.into(),
        })
    }

    #[must_use]
    pub fn subscriber_init_failed(reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::SubscriberInitFailed {
            reason: reason.into(),
        })
    }

    #[must_use]
    pub fn is_no_data_dir(&self) -> bool {
        matches!(self.kind, LoggingErrorKind::NoDataDir)
    }

    #[must_use]
    pub fn is_invalid_filter(&self) -> bool {
        matches!(self.kind, LoggingErrorKind::InvalidFilter { .. })
    }

    #[must_use]
    pub fn is_subscriber_init_failed(&self) -> bool {
        matches!(self.kind, LoggingErrorKind::SubscriberInitFailed { .. })
    }
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LoggingErrorKind::NoDataDir => f.write_str(
                "no platform data directory for tool host logs; set logging.log_dir",
            ),
            LoggingErrorKind::CreateDirFailed { path, reason } => {
                write!(f, "cannot create log directory '{}': {}", path.display(), reason)
            }
            LoggingErrorKind::InvalidFilter { directives, reason } => {
                write!(f, "invalid log filter '{}': {}", directives, reason)
            }
            LoggingErrorKind::SubscriberInitFailed { reason } => {
                write!(f, "tracing subscriber not installed: {}", reason)
            }
        }
    }
}

impl std::error::Error for LoggingError {}

/// Returns the directory log files are written to.
///
/// # Errors
///
/// Fails when no `log_dir` is set and the platform data dir is unknown.
pub fn get_log_dir(config: &LoggingConfig) -> Result<PathBuf, LoggingError> {
    match config.log_dir {
        Some(ref dir) => Ok(dir.clone()),
        None => dirs::data_local_dir()
            .map(|dir| dir.join(LOG_DIR_NAME).join("logs"))
            .ok_or_else(LoggingError::no_data_dir),
    }
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    let Some(ref directives) = config.filter else {
        return Ok(EnvFilter::default().add_directive(LevelFilter::from(config.level).into()));
    };
    EnvFilter::try_new(directives)
        .map_err(|e| LoggingError::invalid_filter(directives.clone(), e.to_string()))
}

/// Installs the file subscriber described by `config`.
///
/// Returns `Ok(None)` when `config.enabled` is false. Logging stops once
/// the returned guard is dropped.
///
/// # Errors
///
/// See [`LoggingErrorKind`].
pub fn init_file_logging(config: &LoggingConfig) -> Result<Option<LoggingGuard>, LoggingError> {
    if !config.enabled {
        return Ok(None);
    }

    let filter = build_filter(config)?;
    let dir = get_log_dir(config)?;
    std::fs::create_dir_all(&dir)
        .map_err(|e| LoggingError::create_dir_failed(dir.clone(), e.to_string()))?;

    let appender = RollingFileAppender::new(config.rotation.into(), &dir, config.file_prefix());
    let (writer, worker) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| LoggingError::subscriber_init_failed(e.to_string()))?;

    Ok(Some(LoggingGuard { _worker: worker }))
}

/// Like [`init_file_logging`], but parks the guard in a process-wide slot.
///
/// Only the first successful call installs anything; later calls, and calls
/// with logging disabled, return `Ok(false)`.
///
/// # Errors
///
/// Same as [`init_file_logging`].
pub fn init_and_store_logging(config: &LoggingConfig) -> Result<bool, LoggingError> {
    if PROCESS_GUARD.get().is_some() {
        return Ok(false);
    }
    let Some(guard) = init_file_logging(config)? else {
        return Ok(false);
    };
    Ok(PROCESS_GUARD.set(guard).is_ok())
}
