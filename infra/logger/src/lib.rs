//! # Logger
//!
//! A centralized logging utility for the workspace.
//! It configures console and file logging with rotation, non-blocking I/O,
//! and environment-based filtering on top of `tracing-subscriber`.
//!
//! * A non-empty `RUST_LOG` wins over [`LoggerBuilder::env_filter`].
//! * Use [`LoggerBuilder::env_filter`] to set module-directed defaults
//!   (e.g., `"moringa_contacts=debug,tower_http=info"`).
//!
//! ## Example
//!
//! ```rust
//! # use moringa_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::LoggerError;
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Console line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line, colored output for terminals.
    #[default]
    Compact,
    /// Multi-line, human-oriented output.
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

#[derive(Debug)]
struct FileOutput {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

/// A builder for configuring and initializing the global tracing subscriber.
#[must_use = "The builder must be configured before it can be used to initialize the logger."]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    console: bool,
    format: LogFormat,
    level: LevelFilter,
    env_filter: Option<String>,
    file: Option<FileOutput>,
}

impl LoggerBuilder {
    /// Sets the name of the logger, used as the log file prefix.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Configures the minimum log level to be emitted.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `moringa=debug,hyper=info`).
    ///
    /// Invalid filters will cause [`LoggerBuilder::init`] to return an error.
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables or disables console logging.
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Selects the console line format.
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Writes logs to rolling files inside `dir` in addition to the console.
    pub fn path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file = Some(FileOutput {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        });
        self
    }

    /// Configures the log file rotation strategy. No effect without [`path`](Self::path).
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    /// Configures maximum number of log files to keep. No effect without [`path`](Self::path).
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.max_files = max;
        }
        self
    }

    /// Writes log files as JSON lines. No effect without [`path`](Self::path).
    pub fn json_files(mut self) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.json = true;
        }
        self
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle. It owns the non-blocking writer's [`WorkerGuard`],
    /// so keep it alive for the duration of the program or buffered lines are lost.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;

        let env_filter = self.build_env_filter()?;
        let mut layers = Vec::new();

        if self.console {
            let console = match self.format {
                LogFormat::Compact => layer().compact().with_ansi(true).boxed(),
                LogFormat::Pretty => layer().pretty().boxed(),
                LogFormat::Json => layer().json().boxed(),
            };
            layers.push(console);
        }

        let guard = if let Some(file) = self.file {
            fs::create_dir_all(&file.dir).map_err(|source| LoggerError::Io {
                source,
                context: Some(format!("Failed to create path: {}", file.dir.display()).into()),
            })?;

            let appender = RollingFileAppender::builder()
                .rotation(file.rotation)
                .filename_prefix(&self.name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(file.max_files)
                .build(&file.dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = layer().with_writer(non_blocking).with_ansi(false);
            layers.push(if file.json { file_layer.json().boxed() } else { file_layer.boxed() });

            Some(guard)
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }

        if self.file.as_ref().is_some_and(|file| file.max_files == 0) {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }

        Ok(())
    }

    fn build_env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        self.env_filter_with(from_env.as_deref())
    }

    /// A non-empty `from_env` replaces the programmatic filter, which is still parsed
    /// so that a broken default is reported either way.
    fn env_filter_with(&self, from_env: Option<&str>) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());

        let programmatic = match &self.env_filter {
            None => None,
            Some(filter) => Some(builder.parse(filter).map_err(|e| {
                LoggerError::InvalidConfiguration {
                    message: format!("Invalid env filter '{filter}': {e}").into(),
                    context: None,
                }
            })?),
        };

        match from_env.map(str::trim).filter(|env| !env.is_empty()) {
            Some(env) => Ok(builder.parse_lossy(env)),
            None => Ok(programmatic.unwrap_or_else(|| builder.parse_lossy(""))),
        }
    }
}

/// A handle to the initialized logging system.
///
/// Holds the background worker guard. Drop it only when the application is shutting down.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`] with console output at `INFO`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use moringa_logger::{LevelFilter, Logger};
    ///
    /// let _logger = Logger::builder()
    ///     .name("my-app")
    ///     .level(LevelFilter::DEBUG)
    ///     .init()
    ///     .unwrap();
    /// ```
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            name: String::new(),
            console: true,
            format: LogFormat::default(),
            level: LevelFilter::INFO,
            env_filter: None,
            file: None,
        }
    }

    /// Returns a reference to the underlying worker guard, if file output is enabled.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_initial_state() {
        let builder = Logger::builder().name("test-app").env_filter("moringa=debug");
        assert!(builder.console);
        assert_eq!(builder.format, LogFormat::Compact);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert_eq!(builder.env_filter.as_deref(), Some("moringa=debug"));
        assert!(builder.file.is_none());
    }

    #[test]
    fn file_options_require_a_path() {
        let builder = Logger::builder().name("test-app").max_files(3).json_files();
        assert!(builder.file.is_none());

        let builder = Logger::builder().name("test-app").path("logs").max_files(3).json_files();
        let file = builder.file.expect("file output configured");
        assert_eq!(file.max_files, 3);
        assert!(file.json);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Logger::builder().init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn zero_max_files_is_rejected() {
        let err = Logger::builder().name("test-app").path("logs").max_files(0).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn rust_log_overrides_programmatic_filter() {
        let builder = Logger::builder().name("test-app").env_filter("moringa=debug");

        let filter = builder.env_filter_with(Some("warn")).expect("filter").to_string();
        assert!(filter.contains("warn"));
        assert!(!filter.contains("moringa"));

        let filter = builder.env_filter_with(None).expect("filter");
        assert!(filter.to_string().contains("moringa=debug"));

        let filter = builder.env_filter_with(Some("  ")).expect("filter");
        assert!(filter.to_string().contains("moringa=debug"));
    }

    #[test]
    fn invalid_programmatic_filter_is_rejected_even_with_rust_log() {
        let builder = Logger::builder().name("test-app").env_filter("moringa=verbose");
        assert!(matches!(
            builder.env_filter_with(Some("info")),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn invalid_env_filter_is_rejected() {
        let err = Logger::builder().name("test-app").env_filter("moringa=verbose").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn no_layers_is_rejected() {
        let err = Logger::builder().name("test-app").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
