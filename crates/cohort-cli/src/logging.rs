//! Logging setup for the transform binary.
//!
//! Workspace crates log at the configured level and dependencies stay at
//! `warn`. Levels used by the pipeline:
//!
//! - `warn`: degraded lookups (missing reference columns)
//! - `info`: stage progress and summary counts
//! - `debug`: per-sheet detail and identifiers not found in reference sheets
//!
//! Identifiers are personal data. They only appear in logs when
//! `--log-data` is given; otherwise [`redact_value`] replaces them.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder logged in place of an identifier.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Crates whose events follow the configured level.
const WORKSPACE_TARGETS: [&str; 6] = [
    "cohort_cli",
    "cohort_common",
    "cohort_ingest",
    "cohort_model",
    "cohort_report",
    "cohort_transform",
];

/// Returns true once `--log-data` has enabled identifier logging.
pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns the identifier when identifier logging is enabled, otherwise [`REDACTED_VALUE`].
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

/// Logging options resolved from the command line.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Maximum level emitted by workspace crates.
    pub level_filter: LevelFilter,
    /// Whether `RUST_LOG` may replace `level_filter`.
    pub use_env_filter: bool,
    /// Prefix pretty and compact lines with a timestamp. JSON lines always carry one.
    pub with_timestamps: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
    /// Whether identifiers may be logged.
    pub log_data: bool,
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field human-readable lines.
    #[default]
    Pretty,
    /// Single-line human-readable format.
    Compact,
    /// One JSON object per event, with span close events.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

/// Install the global subscriber. Call once, before the first stage runs.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let writer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    tracing_subscriber::registry()
        .with(build_env_filter(config.level_filter, config.use_env_filter))
        .with(output_layer(config, writer))
        .init();
    Ok(())
}

/// The formatting layer for `config.format`, writing to `writer`.
fn output_layer<S>(config: &LogConfig, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    let base = fmt::layer().with_writer(writer).with_target(false);
    match (config.format, config.with_timestamps) {
        (LogFormat::Json, _) => base
            .with_ansi(false)
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        (LogFormat::Compact, true) => base.with_ansi(config.with_ansi).compact().boxed(),
        (LogFormat::Compact, false) => base
            .with_ansi(config.with_ansi)
            .compact()
            .without_time()
            .boxed(),
        (LogFormat::Pretty, true) => base.with_ansi(config.with_ansi).boxed(),
        (LogFormat::Pretty, false) => base.with_ansi(config.with_ansi).without_time().boxed(),
    }
}

/// Directive string applying `level` to every workspace crate.
fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let mut directives = String::from("warn");
    for target in WORKSPACE_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// `RUST_LOG` when allowed and set, otherwise the workspace directives.
fn build_env_filter(level: LevelFilter, use_env: bool) -> EnvFilter {
    if use_env && let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(default_directives(level))
}
