use anyhow::Context;
use biosignal_core::MonitoringDomain;
use measurement_store::{GeoLocation, StoreConfig};
use monitor_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Everything the host reads from `--config`. Every field is optional in the
/// file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub store: StoreConfig,
    pub sessions: BTreeMap<MonitoringDomain, SessionConfig>,
    pub seed: Option<u64>,
    /// Geotag for saved records when `--lat`/`--lon` are not given.
    pub location: Option<GeoLocation>,
}

impl MonitorConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn session(&self, domain: MonitoringDomain) -> SessionConfig {
        self.sessions.get(&domain).cloned().unwrap_or_default()
    }
}
