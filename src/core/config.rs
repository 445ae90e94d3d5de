use anyhow::{bail, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use super::logging::LogFormat;
use crate::ai::features::EncodingScheme;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub prediction: PredictionConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub dir: PathBuf,
    /// Comma separated; order here is the roster order.
    pub names: String,
    pub probabilities_output: usize,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    pub encoding: EncodingScheme,
    pub min_votes: usize,
    pub max_consensus: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl ModelsConfig {
    pub fn model_names(&self) -> Vec<String> {
        self.names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn model_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("model_{}.onnx", name))
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("models.dir", "./models")?
            .set_default(
                "models.names",
                "logistic_regression,random_forest,lightgbm,catboost",
            )?
            .set_default("models.probabilities_output", 1)?
            .set_default("models.timeout_ms", 2000)?
            .set_default("prediction.encoding", "direct_identity")?
            .set_default("prediction.min_votes", 3)?
            .set_default("prediction.max_consensus", 10)?
            .set_default("monitoring.log_level", "info")?
            .set_default("monitoring.log_format", "full")?
            .add_source(config::File::with_name("predictor").required(false))
            .add_source(
                config::Environment::with_prefix("PREDICTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        // Container platforms hand the listening port over as plain PORT
        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let names = self.models.model_names();
        if names.is_empty() {
            bail!("no models configured (models.names is empty)");
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name) {
                bail!("model {} is listed more than once", name);
            }
        }

        if self.prediction.min_votes == 0 {
            bail!("prediction.min_votes must be at least 1");
        }
        if self.prediction.max_consensus == 0 {
            bail!("prediction.max_consensus must be at least 1");
        }
        if self.server.port == 0 {
            bail!("server.port must not be 0");
        }
        if self.prediction.min_votes > names.len() {
            tracing::warn!(
                "⚠️  min_votes ({}) exceeds roster size ({}); consensus will always be empty",
                self.prediction.min_votes,
                names.len()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            models: ModelsConfig {
                dir: PathBuf::from("/srv/models"),
                names: " logistic_regression, random_forest ,,lightgbm".to_string(),
                probabilities_output: 1,
                timeout_ms: 2000,
            },
            prediction: PredictionConfig {
                encoding: EncodingScheme::DirectIdentity,
                min_votes: 2,
                max_consensus: 10,
            },
            monitoring: MonitoringConfig {
                log_level: "info".to_string(),
                log_format: LogFormat::Compact,
            },
        }
    }

    #[test]
    fn test_model_names_are_trimmed_in_order() {
        let config = sample();
        assert_eq!(
            config.models.model_names(),
            vec!["logistic_regression", "random_forest", "lightgbm"]
        );
        assert_eq!(
            config.models.model_path("lightgbm"),
            PathBuf::from("/srv/models/model_lightgbm.onnx")
        );
    }

    #[test]
    fn test_validation() {
        assert!(sample().validate().is_ok());

        let mut duplicate = sample();
        duplicate.models.names = "a,b,a".to_string();
        assert!(duplicate.validate().is_err());

        let mut empty = sample();
        empty.models.names = " , ".to_string();
        assert!(empty.validate().is_err());

        let mut zero_votes = sample();
        zero_votes.prediction.min_votes = 0;
        assert!(zero_votes.validate().is_err());

        let mut zero_output = sample();
        zero_output.prediction.max_consensus = 0;
        assert!(zero_output.validate().is_err());
    }
}
