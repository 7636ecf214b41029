//! Layer configuration and validation errors.

use crate::indicators::Indicator;
use crate::lod::LodPolicy;
use crate::viewport::Spacing;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{indicator}: {field} must be at least 1")]
    ZeroPeriod {
        indicator: &'static str,
        field: &'static str,
    },

    #[error("{indicator}: {field} must be finite and positive, got {value}")]
    InvalidFactor {
        indicator: &'static str,
        field: &'static str,
        value: f64,
    },

    #[error("lod density factor must be finite and positive, got {0}")]
    InvalidDensity(f64),
}

/// Per-layer rendering configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Extra indices kept on each side of the visible window.
    pub overscan: usize,
    pub spacing: Spacing,
    pub lod: LodPolicy,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            overscan: 2,
            spacing: Spacing::Auto,
            lod: LodPolicy::default(),
        }
    }
}

impl LayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = self.lod.density_factor;
        if !(d.is_finite() && d > 0.0) {
            return Err(ConfigError::InvalidDensity(d));
        }
        Ok(())
    }
}

/// One indicator layer as it appears in a config file:
///
/// ```toml
/// [[layer]]
/// type = "bollinger"
/// period = 20
///
/// [layer.render]
/// overscan = 4
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    #[serde(flatten)]
    pub indicator: Indicator,
    #[serde(default)]
    pub render: LayerConfig,
}

impl LayerSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicator.validate()?;
        self.render.validate()
    }
}
