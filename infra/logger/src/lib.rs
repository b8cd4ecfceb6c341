//! # Logger
//!
//! Builds explicit [`Telemetry`] handles instead of installing a process-wide subscriber.
//!
//! A handle wraps a [`tracing::Dispatch`] composed from `tracing-subscriber` layers (console,
//! optional rolling file, optional JSON) and is passed to the components that should report
//! through it. Work executed inside [`Telemetry::in_scope`] is routed to that dispatcher only,
//! so several independently configured cores can live in one process.
//!
//! * Use [`TelemetryBuilder::env_filter`] to set module-directed filters
//!   (e.g., `"sigil_auth=debug"`), in addition to `RUST_LOG`.
//! * [`Telemetry::disabled`] is a handle that discards everything. It is the default.
//!
//! ## Example
//!
//! ```rust
//! # use sigil_logger::{LevelFilter, Telemetry};
//!
//! let telemetry = Telemetry::builder()
//!     .name("my-app")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .build()
//!     .unwrap();
//!
//! telemetry.in_scope(|| tracing::info!("routed to this handle only"));
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
pub struct TelemetryConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring a [`Telemetry`] handle.
#[derive(Debug)]
pub struct TelemetryBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: TelemetryConfig,
    name: N,
    file_state: std::marker::PhantomData<F>,
}

impl<F: Sealed> TelemetryBuilder<NoName, F> {
    /// Sets the name of the handle, also used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> TelemetryBuilder<WithName, F> {
        TelemetryBuilder {
            name: WithName(name.into()),
            config: self.config,
            file_state: std::marker::PhantomData,
        }
    }
}

impl TelemetryBuilder<WithName, WithFile> {
    /// Configures maximum number of log files to keep.
    #[must_use = "The builder must be configured before it can be used to build telemetry."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// Configures the log file rotation strategy.
    #[must_use = "The builder must be configured before it can be used to build telemetry."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Writes the file output as JSON lines.
    #[must_use = "The builder must be configured before it can be used to build telemetry."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }
}

impl<F: Sealed> TelemetryBuilder<WithName, F> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to build telemetry."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `sigil_auth=debug`).
    ///
    /// Invalid filters will cause [`TelemetryBuilder::build`] to return an error.
    #[must_use = "The builder must be configured before it can be used to build telemetry."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables console output.
    #[must_use = "The builder must be configured before it can be used to build telemetry."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Sets the directory for rolling log files.
    pub fn path(self, path: impl Into<PathBuf>) -> TelemetryBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        TelemetryBuilder { config, name: self.name, file_state: std::marker::PhantomData }
    }

    /// Consumes the builder and composes the dispatcher.
    ///
    /// Nothing is installed globally; the returned handle must be passed to the components
    /// that should log through it.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings or when no
    /// output is enabled.
    /// Returns [`LoggerError::Appender`] if the rolling file appender cannot be created.
    pub fn build(self) -> Result<Telemetry, LoggerError> {
        validate_config(&self.config, &self.name.0)?;

        let env_filter = build_env_filter(&self.config)?;

        let mut layers = Vec::new();

        if self.config.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = if let Some(path) = self.config.path {
            fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
                message: e.to_string().into(),
                context: Some(format!("Failed to create path: {}", path.display()).into()),
            })?;

            let file_appender = RollingFileAppender::builder()
                .rotation(self.config.rotation)
                .filename_prefix(&self.name.0)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(self.config.max_files)
                .build(path)?;

            let (non_blocking, g) = tracing_appender::non_blocking(file_appender);

            let file_layer = layer().with_writer(non_blocking).with_ansi(false);

            let boxed =
                if self.config.json { file_layer.json().boxed() } else { file_layer.boxed() };

            layers.push(boxed);
            Some(Arc::new(g))
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        let subscriber = tracing_subscriber::registry().with(env_filter).with(layers);

        Ok(Telemetry { dispatch: Dispatch::new(subscriber), guard })
    }
}

/// An explicitly passed observability handle.
///
/// Clones share the same dispatcher and file worker. Buffered file output is flushed when the
/// last clone is dropped.
#[derive(Clone, Debug)]
pub struct Telemetry {
    dispatch: Dispatch,
    guard: Option<Arc<WorkerGuard>>,
}

impl Telemetry {
    /// Returns a new [`TelemetryBuilder`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use sigil_logger::{LevelFilter, Telemetry};
    ///
    /// let telemetry = Telemetry::builder()
    ///     .name("my-app")
    ///     .level(LevelFilter::DEBUG)
    ///     .build()
    ///     .unwrap();
    /// assert!(!telemetry.has_file_output());
    /// ```
    #[must_use = "The builder must be configured before it can be used to build telemetry."]
    pub fn builder() -> TelemetryBuilder {
        TelemetryBuilder {
            config: TelemetryConfig::default(),
            name: NoName,
            file_state: std::marker::PhantomData,
        }
    }

    /// A handle that discards every event and span.
    #[must_use]
    pub fn disabled() -> Self {
        Self { dispatch: Dispatch::none(), guard: None }
    }

    /// Wraps a dispatcher built elsewhere, e.g. by a host application or a test.
    #[must_use]
    pub const fn from_dispatch(dispatch: Dispatch) -> Self {
        Self { dispatch, guard: None }
    }

    /// Runs `f` with this handle as the thread's default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    #[must_use]
    pub const fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Whether a rolling file writer backs this handle.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::disabled()
    }
}

fn validate_config(config: &TelemetryConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Telemetry name cannot be empty".into(),
            context: None,
        });
    }

    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &TelemetryConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}
