use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set. SQL statement logging stays quiet
/// unless asked for explicitly.
const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm=warn";

/// Output format selected by `logging.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Unknown values fall back to `Compact`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, writing to stdout. A second call is a no-op.
pub fn init_logging(format: LogFormat) {
    let builder = fmt().with_env_filter(env_filter()).with_writer(io::stdout);
    let _ = match format {
        LogFormat::Compact => builder.with_target(false).compact().try_init(),
        // span fields (user_id, order_id, ...) ride along on every event
        LogFormat::Json => builder.with_target(true).json().with_current_span(true).try_init(),
    };
}

pub fn init_logging_default() {
    init_logging(LogFormat::Compact);
}

pub fn init_logging_json() {
    init_logging(LogFormat::Json);
}

pub fn init_logging_with_format(format: &str) {
    init_logging(LogFormat::parse(format));
}
