//! # Logger
//!
//! Installs the global `tracing` subscriber for the phonebook binaries: a compact
//! console layer and, optionally, a non-blocking rolling file layer (plain or JSON).
//!
//! Filtering follows an explicit filter first, then `RUST_LOG`; failing both, the configured
//! level applies with the storage engine's chatty internals held at `warn`.
//!
//! ## Example
//!
//! ```rust
//! use phonebook_logger::{FileOutput, LevelFilter, Logger};
//!
//! let dir = std::env::temp_dir().join("phonebook-logs");
//! let _logger = Logger::builder("phonebook")
//!     .level(LevelFilter::DEBUG)
//!     .file(FileOutput::new(dir).json())
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use phonebook_domain::config::LoggingConfig;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_SUFFIX: &str = "log";
/// Added to the default level when neither an explicit filter nor `RUST_LOG` is present.
const QUIET_DIRECTIVES: [&str; 3] = ["surrealdb=warn", "surrealdb_core=warn", "hyper=warn"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Where and how rolling log files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutput {
    directory: PathBuf,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

impl FileOutput {
    /// Daily files in `directory`, ten kept, plain text.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into(), rotation: Rotation::DAILY, max_files: 10, json: false }
    }

    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.max_files = max;
        self
    }

    /// Writes one JSON object per event.
    #[must_use]
    pub const fn json(mut self) -> Self {
        self.json = true;
        self
    }

    fn layer(&self, prefix: &str) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
        if self.max_files == 0 {
            return Err(LoggerError::Setting {
                message: "max_files must be greater than zero".into(),
            });
        }

        std::fs::create_dir_all(&self.directory)
            .context(format!("Creating {}", self.directory.display()))?;

        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.clone())
            .filename_prefix(prefix)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(self.max_files)
            .build(&self.directory)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let plain = layer().with_writer(writer).with_ansi(false);
        let layer = if self.json { plain.json().boxed() } else { plain.boxed() };
        Ok((layer, guard))
    }
}

/// Settings for the global subscriber, gathered before [`LoggerBuilder::init`].
#[must_use = "call .init() to install the subscriber"]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    level: LevelFilter,
    filter: Option<String>,
    console: bool,
    file: Option<FileOutput>,
}

impl LoggerBuilder {
    /// Takes level, filter and outputs from a [`LoggingConfig`] section.
    ///
    /// # Errors
    /// [`LoggerError::Setting`] when `level` is not a tracing level.
    pub fn config(mut self, cfg: &LoggingConfig) -> Result<Self, LoggerError> {
        self.level = LevelFilter::from_str(&cfg.level).map_err(|e| LoggerError::Setting {
            message: format!("unknown level '{}': {e}", cfg.level).into(),
        })?;
        self.filter.clone_from(&cfg.filter);
        self.console = cfg.console;
        self.file = cfg.directory.as_ref().map(|dir| {
            let file = FileOutput::new(dir).max_files(cfg.max_files);
            if cfg.json { file.json() } else { file }
        });
        Ok(self)
    }

    /// Minimum level emitted when no filter says otherwise.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Explicit directives (e.g. `phonebook_persons=debug`); these win over `RUST_LOG`.
    pub fn filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Adds a rolling file output; the logger name prefixes the file names.
    pub fn file(mut self, output: FileOutput) -> Self {
        self.file = Some(output);
        self
    }

    /// Installs the subscriber for the whole process.
    ///
    /// Keep the returned [`Logger`] alive until exit; dropping it stops the file writer.
    ///
    /// # Errors
    /// * [`LoggerError::Setting`] for an empty name, a bad filter or no output at all.
    /// * [`LoggerError::Directory`] or [`LoggerError::Appender`] when the file output fails.
    /// * [`LoggerError::AlreadyInstalled`] when a subscriber was installed before.
    pub fn init(self) -> Result<Logger, LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::Setting { message: "logger name cannot be empty".into() });
        }
        if !self.console && self.file.is_none() {
            return Err(LoggerError::Setting {
                message: "no output enabled, turn on the console or a log directory".into(),
            });
        }

        let filter = self.env_filter()?;

        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }
        let guard = match &self.file {
            Some(output) => {
                let (file_layer, guard) = output.layer(&self.name)?;
                layers.push(file_layer);
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger { guard })
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());

        if let Some(directives) = &self.filter {
            return builder.parse(directives).map_err(|e| LoggerError::Setting {
                message: format!("invalid filter '{directives}': {e}").into(),
            });
        }

        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return Ok(builder.from_env_lossy());
        }

        Ok(QUIET_DIRECTIVES
            .iter()
            .filter_map(|d| d.parse().ok())
            .fold(builder.parse_lossy(""), EnvFilter::add_directive))
    }
}

/// The installed logging system.
#[must_use = "dropping the logger stops the background file writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder; `name` prefixes rolling log files (`phonebook.2026-10-16.log`).
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            level: LevelFilter::INFO,
            filter: None,
            console: true,
            file: None,
        }
    }

    /// Whether a file writer is running behind this handle.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Flushing log files");
        }
    }
}
