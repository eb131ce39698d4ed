use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::comparison::{ComparisonPolicy, DEFAULT_TOLERANCE};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContinuousConfig {
    /// Coarser tolerance for detecting a new change-epoch; falls back to the global tolerance.
    #[serde(default)]
    pub change_tolerance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "SyncConfig::default_tolerance")]
    pub tolerance: f64,
    /// Make each target active before re-framing it and restore the original active view afterwards.
    #[serde(default)]
    pub activate_targets: bool,
    #[serde(default)]
    pub continuous: ContinuousConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncConfigOverrides {
    pub tolerance: Option<f64>,
    pub activate_targets: Option<bool>,
    pub change_tolerance: Option<f64>,
}

impl SyncConfig {
    const fn default_tolerance() -> f64 {
        DEFAULT_TOLERANCE
    }

    pub fn comparison(&self) -> ComparisonPolicy {
        ComparisonPolicy::new(self.tolerance)
    }

    pub fn change_comparison(&self) -> ComparisonPolicy {
        self.continuous.change_tolerance.map(ComparisonPolicy::new).unwrap_or_else(|| self.comparison())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &SyncConfigOverrides) {
        if let Some(tolerance) = overrides.tolerance {
            self.tolerance = tolerance;
        }
        if let Some(activate) = overrides.activate_targets {
            self.activate_targets = activate;
        }
        if let Some(change_tolerance) = overrides.change_tolerance {
            self.continuous.change_tolerance = Some(change_tolerance);
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::default_tolerance(),
            activate_targets: false,
            continuous: ContinuousConfig::default(),
        }
    }
}

impl SyncConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.tolerance.is_none() && self.activate_targets.is_none() && self.change_tolerance.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.tolerance.is_some() {
            fields.push("tolerance");
        }
        if self.activate_targets.is_some() {
            fields.push("activate_targets");
        }
        if self.change_tolerance.is_some() {
            fields.push("change_tolerance");
        }
        fields
    }
}
