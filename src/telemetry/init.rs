// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry initialization and configuration.

use std::io;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::{AgentConfig, LogFormat};

/// Log files kept on disk, the active one included.
pub const MAX_LOG_FILES: usize = 5;

/// Configuration for telemetry initialization.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Default log level if neither RUST_LOG nor a directive is set.
    pub default_level: Level,

    /// Filter directive used when RUST_LOG is not set.
    pub filter_directive: Option<String>,

    /// Output format.
    pub format: LogFormat,

    /// Write to this file instead of stdout. Rotated daily; the date is
    /// appended to the file name.
    pub log_file: Option<PathBuf>,

    /// Whether to include span close events with timings.
    pub include_span_events: bool,

    /// Whether to include file/line information.
    pub include_file_line: bool,

    /// Whether to include target module path.
    pub include_target: bool,

    /// Whether to use ANSI colors in output. Ignored when writing to a file.
    pub ansi_colors: bool,

    /// Whether to use the compact text format.
    pub compact: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            filter_directive: None,
            format: LogFormat::Text,
            log_file: None,
            include_span_events: false,
            include_file_line: false,
            include_target: true,
            ansi_colors: true,
            compact: true,
        }
    }
}

impl TelemetryConfig {
    /// Verbose output for local work.
    pub fn development() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_span_events: true,
            include_file_line: true,
            compact: false,
            ..Self::default()
        }
    }

    /// Machine-readable output for deployed processes.
    pub fn production() -> Self {
        Self {
            default_level: Level::WARN,
            format: LogFormat::Json,
            include_target: false,
            ansi_colors: false,
            ..Self::default()
        }
    }

    /// Trace-level output for tests.
    pub fn testing() -> Self {
        Self {
            default_level: Level::TRACE,
            filter_directive: Some("prodwatch=trace".to_string()),
            include_span_events: true,
            include_file_line: true,
            ansi_colors: false,
            compact: false,
            ..Self::default()
        }
    }

    /// Derive logging settings from the agent configuration.
    pub fn from_agent_config(config: &AgentConfig) -> Self {
        Self {
            filter_directive: Some(config.log_level.clone()),
            format: config.log_format,
            log_file: config.log_file.clone(),
            ansi_colors: config.log_file.is_none(),
            ..Self::default()
        }
    }

    /// Set the default log level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set a custom filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_directive = Some(filter.into());
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi_colors = ansi;
        self
    }

    /// Build the event filter. RUST_LOG wins, then the directive, then the level.
    fn env_filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.default_level.to_string());
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match &self.filter_directive {
            Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|_| fallback()),
            None => fallback(),
        })
    }

    /// Build a non-blocking writer; events are written by a background thread.
    fn make_writer(&self) -> io::Result<(NonBlocking, WorkerGuard)> {
        match &self.log_file {
            Some(path) => Ok(tracing_appender::non_blocking(rolling_appender(path)?)),
            None => Ok(tracing_appender::non_blocking(io::stdout())),
        }
    }
}

fn rolling_appender(path: &Path) -> io::Result<RollingFileAppender> {
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid log file path: {}", path.display()),
            )
        })?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(MAX_LOG_FILES)
        .build(directory)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

/// Flushes buffered log lines when dropped.
///
/// Keep this guard alive for the duration of your program.
#[must_use = "dropping the guard stops log output"]
pub struct TelemetryGuard {
    _worker: WorkerGuard,
}

/// Initialize telemetry with the given configuration.
///
/// Call once at startup. Fails if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> io::Result<TelemetryGuard> {
    let span_events = if config.include_span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let (writer, worker) = config.make_writer()?;
    let ansi = config.ansi_colors && config.log_file.is_none();

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match (config.format, config.compact) {
        (LogFormat::Json, _) => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(config.include_target)
            .with_file(config.include_file_line)
            .with_line_number(config.include_file_line)
            .with_span_events(span_events)
            .boxed(),
        (LogFormat::Text, true) => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(config.include_target)
            .with_file(config.include_file_line)
            .with_line_number(config.include_file_line)
            .with_span_events(span_events)
            .boxed(),
        (LogFormat::Text, false) => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(config.include_target)
            .with_file(config.include_file_line)
            .with_line_number(config.include_file_line)
            .with_span_events(span_events)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(config.env_filter())
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(TelemetryGuard { _worker: worker })
}
