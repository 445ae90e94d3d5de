use anyhow::Result;
use std::sync::Arc;

use super::model::ProbabilityModel;
use super::onnx::{build_environment, OnnxClassifier};
use crate::core::config::ModelsConfig;

#[derive(Clone)]
pub enum ModelHandle {
    Loaded(Arc<dyn ProbabilityModel>),
    Unavailable { reason: String },
}

#[derive(Clone)]
pub struct RosterEntry {
    pub id: String,
    pub handle: ModelHandle,
}

impl RosterEntry {
    pub fn is_loaded(&self) -> bool {
        matches!(self.handle, ModelHandle::Loaded(_))
    }
}

/// Fixed, ordered set of models consulted for every request.
///
/// Built once at startup and never mutated. Entry order drives the order
/// of per-model reports in every response.
#[derive(Clone, Default)]
pub struct ModelRoster {
    entries: Vec<RosterEntry>,
}

impl ModelRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, id: impl Into<String>, model: Arc<dyn ProbabilityModel>) -> Self {
        self.entries.push(RosterEntry {
            id: id.into(),
            handle: ModelHandle::Loaded(model),
        });
        self
    }

    pub fn with_unavailable(mut self, id: impl Into<String>, reason: impl Into<String>) -> Self {
        self.entries.push(RosterEntry {
            id: id.into(),
            handle: ModelHandle::Unavailable {
                reason: reason.into(),
            },
        });
        self
    }

    /// Loads every configured ONNX model. A model that fails to load is kept
    /// in the roster as unavailable; only a broken runtime aborts startup.
    pub fn load(config: &ModelsConfig) -> Result<Self> {
        let environment = build_environment()?;
        let mut roster = Self::new();

        tracing::info!("📦 Loading models from {}...", config.dir.display());

        for name in config.model_names() {
            let path = config.model_path(&name);
            match OnnxClassifier::load(&environment, &path, config.probabilities_output) {
                Ok(classifier) => {
                    tracing::info!("✅ Model {} loaded from {}", name, path.display());
                    roster = roster.with_model(name, Arc::new(classifier));
                }
                Err(e) => {
                    tracing::error!("❌ Failed to load model {}: {:#}", name, e);
                    roster = roster.with_unavailable(name, format!("{:#}", e));
                }
            }
        }

        Ok(roster)
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loaded_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_loaded()).count()
    }
}
