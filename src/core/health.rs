use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ai::roster::ModelRoster;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub models_loaded: usize,
    pub models_configured: usize,
    pub components: BTreeMap<String, bool>,
}

#[derive(Clone)]
pub struct HealthChecker {
    start_time: std::time::Instant,
    status: Arc<RwLock<BTreeMap<String, bool>>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            status: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Seeds one component per roster entry.
    pub async fn register_roster(&self, roster: &ModelRoster) {
        let mut status = self.status.write().await;
        for entry in roster.entries() {
            status.insert(entry.id.clone(), entry.is_loaded());
        }
    }

    pub async fn update_component(&self, component: &str, healthy: bool) {
        let mut status = self.status.write().await;
        status.insert(component.to_string(), healthy);
    }

    pub async fn get_status(&self) -> HealthStatus {
        let components = self.status.read().await.clone();
        let loaded = components.values().filter(|healthy| **healthy).count();

        let status = if components.is_empty() || loaded == 0 {
            "unhealthy"
        } else if loaded == components.len() {
            "healthy"
        } else {
            "degraded"
        };

        HealthStatus {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            models_loaded: loaded,
            models_configured: components.len(),
            components,
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::model::MockProbabilityModel;

    #[tokio::test]
    async fn test_status_levels() {
        let checker = HealthChecker::new();
        assert_eq!(checker.get_status().await.status, "unhealthy");

        let roster = ModelRoster::new()
            .with_model("lightgbm", Arc::new(MockProbabilityModel::new()))
            .with_unavailable("catboost", "missing");
        checker.register_roster(&roster).await;

        let status = checker.get_status().await;
        assert_eq!(status.status, "degraded");
        assert_eq!(status.models_loaded, 1);
        assert_eq!(status.models_configured, 2);

        checker.update_component("catboost", true).await;
        assert_eq!(checker.get_status().await.status, "healthy");
    }

    #[test]
    fn test_status_from_sync_context() {
        let checker = HealthChecker::new();
        tokio_test::block_on(checker.update_component("lightgbm", false));
        let status = tokio_test::block_on(checker.get_status());
        assert_eq!(status.status, "unhealthy");
        assert_eq!(status.components.get("lightgbm"), Some(&false));
    }
}
