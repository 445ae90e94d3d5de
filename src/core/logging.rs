use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    /// Single-line records, for log collectors that split on newlines.
    Compact,
}

/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(log_level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let output = match format {
        LogFormat::Full => fmt::layer().with_target(false).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_ansi(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(output)
        .init();

    tracing::info!("Logging initialized at level: {} ({:?})", log_level, format);
}
