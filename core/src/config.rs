//! Marshal configuration.
//!
//! `None` fields fall back to the defaults in `constants`; configs can be
//! built in code or loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_SLICES, MAX_SLICES_LIMIT};
use crate::stream::EncodingVersion;
use crate::types::MarshalError;

/// What the reader does with slices of unknown types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceMode {
    /// Skip and drop them; the instance decodes as its known ancestor.
    #[default]
    Sliced,
    /// Skip them but keep the bytes on the instance for re-emission.
    Preserve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshalConfig {
    pub slice_mode: Option<SliceMode>,

    /// Write compact ids for levels that declare one.
    /// - `None` or `Some(false)` → always write string ids (default).
    pub compact_ids: Option<bool>,

    /// Upper bound on slices per exception (known + skipped).
    pub max_slices: Option<usize>,

    pub encoding: EncodingVersion,

    /// Log a telemetry snapshot at debug level after each operation.
    pub collect_metrics: Option<bool>,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            slice_mode: Some(SliceMode::Sliced),
            compact_ids: Some(false),
            max_slices: Some(DEFAULT_MAX_SLICES),
            encoding: EncodingVersion::V1_1,
            collect_metrics: Some(false),
        }
    }
}

impl MarshalConfig {
    pub fn new(slice_mode: Option<SliceMode>, compact_ids: Option<bool>) -> Self {
        Self {
            slice_mode: slice_mode.or(Some(SliceMode::Sliced)),
            compact_ids: compact_ids.or(Some(false)),
            ..Self::default()
        }
    }

    pub fn preserving() -> Self {
        Self::new(Some(SliceMode::Preserve), None)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn slice_mode(&self) -> SliceMode {
        self.slice_mode.unwrap_or_default()
    }

    pub fn preserve_slices(&self) -> bool {
        self.slice_mode() == SliceMode::Preserve
    }

    pub fn compact_ids_enabled(&self) -> bool {
        self.compact_ids.unwrap_or(false)
    }

    pub fn metrics_enabled(&self) -> bool {
        self.collect_metrics.unwrap_or(false)
    }

    /// Effective slice limit, clamped to `MAX_SLICES_LIMIT`.
    pub fn max_slices(&self) -> usize {
        self.max_slices
            .unwrap_or(DEFAULT_MAX_SLICES)
            .min(MAX_SLICES_LIMIT)
    }

    pub fn validate(&self) -> Result<(), MarshalError> {
        if !self.encoding.is_supported() {
            return Err(MarshalError::InvalidConfig(format!(
                "unsupported encoding {}",
                self.encoding
            )));
        }
        if self.max_slices == Some(0) {
            return Err(MarshalError::InvalidConfig("max_slices must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MarshalConfig::default();
        assert_eq!(config.slice_mode(), SliceMode::Sliced);
        assert!(!config.compact_ids_enabled());
        assert_eq!(config.max_slices(), DEFAULT_MAX_SLICES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MarshalConfig::from_json(r#"{ "slice_mode": "preserve" }"#).unwrap();
        assert!(config.preserve_slices());
        assert_eq!(config.encoding, EncodingVersion::V1_1);
        assert_eq!(config.max_slices(), DEFAULT_MAX_SLICES);
    }

    #[test]
    fn max_slices_is_clamped() {
        let config = MarshalConfig { max_slices: Some(usize::MAX), ..Default::default() };
        assert_eq!(config.max_slices(), MAX_SLICES_LIMIT);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let zero = MarshalConfig { max_slices: Some(0), ..Default::default() };
        assert!(matches!(zero.validate(), Err(MarshalError::InvalidConfig(_))));

        let old = MarshalConfig {
            encoding: EncodingVersion { major: 1, minor: 0 },
            ..Default::default()
        };
        assert!(matches!(old.validate(), Err(MarshalError::InvalidConfig(_))));
    }
}
