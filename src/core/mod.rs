pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;

pub use self::config::Config;
pub use self::health::HealthChecker;
pub use self::metrics::PredictionMetrics;
