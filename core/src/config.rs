//! Runtime configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buffer::COPY_ROW_ALIGNMENT;
use crate::spectrum::MAX_SPECTRAL_DIMENSION;

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row_alignment must be a non-zero multiple of 256, got {0}")]
    RowAlignment(u32),
}

/// Adapter power preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    #[default]
    HighPerformance,
    LowPower,
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(pref: PowerPreference) -> Self {
        match pref {
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
        }
    }
}

/// Options applied when acquiring a compute device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Debug label attached to the device.
    pub label: String,
    pub power_preference: PowerPreference,
    /// Raise `max_texture_dimension_2d` to whatever the adapter supports.
    pub use_adapter_texture_limit: bool,
    /// Use a software adapter (useful on CI).
    pub force_fallback_adapter: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            label: "liveeffect".to_string(),
            power_preference: PowerPreference::HighPerformance,
            use_adapter_texture_limit: true,
            force_fallback_adapter: false,
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub device: DeviceConfig,
    /// Row byte quantum for texture copies; a multiple of 256.
    pub row_alignment: u32,
    /// Largest edge used by the spectral path.
    pub spectral_max_dimension: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            row_alignment: COPY_ROW_ALIGNMENT,
            spectral_max_dimension: MAX_SPECTRAL_DIMENSION,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.row_alignment == 0 || self.row_alignment % COPY_ROW_ALIGNMENT != 0 {
            return Err(ConfigError::RowAlignment(self.row_alignment));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.row_alignment, 256);
        assert_eq!(config.row_alignment, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        assert_eq!(config.spectral_max_dimension, 512);
        assert_eq!(config.device.power_preference, PowerPreference::HighPerformance);
    }

    #[test]
    fn test_partial_json() {
        let config = RuntimeConfig::from_json(
            r#"{"device": {"power_preference": "low-power"}, "spectral_max_dimension": 256}"#,
        )
        .unwrap();
        assert_eq!(config.device.power_preference, PowerPreference::LowPower);
        assert_eq!(config.device.label, "liveeffect");
        assert_eq!(config.spectral_max_dimension, 256);
        assert_eq!(config.row_alignment, 256);
    }

    #[test]
    fn test_rejects_bad_alignment() {
        assert!(matches!(
            RuntimeConfig::from_json(r#"{"row_alignment": 100}"#),
            Err(ConfigError::RowAlignment(100))
        ));
        assert!(RuntimeConfig::from_json(r#"{"row_alignment": 512}"#).is_ok());
        assert!(matches!(RuntimeConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"device": {{"label": "test"}}}}"#).unwrap();
        let config = RuntimeConfig::from_path(file.path()).unwrap();
        assert_eq!(config.device.label, "test");
    }
}
