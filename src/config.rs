use serde::{Deserialize, Serialize};

use scanner_util::result_ext::ResultExt as _;

const DEFAULT_SDK_VERSION: u32 = 34;
const DEFAULT_ANALYSIS_QUEUE_DEPTH: u32 = 1;

#[derive(
    Debug, Copy, Clone, Hash, Eq, PartialEq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

/// Settings shared by every scan started from one scanner
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct ScannerConfig {
    /// Platform SDK level, decides which permissions are required
    pub sdk_version: u32,
    pub camera_facing: CameraFacing,
    /// Frames waiting for the analyzer, extra frames are dropped
    pub analysis_queue_depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum ConfigError {
    #[error("unable to parse scanner config: {0}")]
    Parse(String),

    #[error("analysis queue depth must be at least 1")]
    InvalidQueueDepth,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            sdk_version: DEFAULT_SDK_VERSION,
            camera_facing: CameraFacing::default(),
            analysis_queue_depth: DEFAULT_ANALYSIS_QUEUE_DEPTH,
        }
    }
}

impl ScannerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err_str(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis_queue_depth == 0 {
            return Err(ConfigError::InvalidQueueDepth);
        }

        Ok(())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[uniffi::export]
fn scanner_config_default() -> ScannerConfig {
    ScannerConfig::default()
}

#[uniffi::export]
fn scanner_config_from_json(json: String) -> Result<ScannerConfig, ConfigError> {
    ScannerConfig::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = ScannerConfig::from_json(r#"{"sdk_version": 28}"#).unwrap();

        assert_eq!(
            config,
            ScannerConfig { sdk_version: 28, ..ScannerConfig::default() }
        );
    }

    #[test]
    fn test_front_camera() {
        let config = ScannerConfig::from_json(r#"{"camera_facing": "front"}"#).unwrap();
        assert_eq!(config.camera_facing, CameraFacing::Front);
    }

    #[test]
    fn test_zero_queue_depth_rejected() {
        let error = ScannerConfig::from_json(r#"{"analysis_queue_depth": 0}"#).unwrap_err();
        assert_eq!(error, ConfigError::InvalidQueueDepth);
    }

    #[test]
    fn test_bad_json() {
        let error = scanner_config_from_json("{not json".into()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ScannerConfig { analysis_queue_depth: 3, ..Default::default() };
        assert_eq!(ScannerConfig::from_json(&config.to_json()).unwrap(), config);
    }
}
