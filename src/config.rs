// src/config.rs

use crate::converter::ConvertOptions;
use crate::error::Result;
use crate::validation::CompareOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Most components fetched or written in one batch.
pub const MAX_BATCH: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library root holding `symbols/`, the `.pretty` and the `.3dshapes` directories.
    pub output_dir: PathBuf,
    /// Concurrent API fetches in a batch.
    pub parallel: usize,
    pub download_3d_models: bool,
    pub convert: ConvertOptions,
    pub validation: CompareOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            parallel: 4,
            download_3d_models: true,
            convert: ConvertOptions::default(),
            validation: CompareOptions::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(json)?;
        config.parallel = config.parallel.clamp(1, MAX_BATCH);
        Ok(config)
    }

    /// Reads a JSON config file; keys it leaves out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = Config::from_json_str(r#"{"output_dir": "/tmp/lib"}"#).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/lib"));
        assert_eq!(config.parallel, 4);
        assert!(config.convert.symbol.include_datasheet);
        assert_eq!(config.validation.position_tolerance, 0.05);
    }

    #[test]
    fn test_parallel_is_clamped() {
        assert_eq!(Config::from_json_str(r#"{"parallel": 0}"#).unwrap().parallel, 1);
        assert_eq!(Config::from_json_str(r#"{"parallel": 64}"#).unwrap().parallel, MAX_BATCH);
    }

    #[test]
    fn test_nested_options() {
        let config = Config::from_json_str(
            r#"{"convert": {"footprint": {"include_3d_model": false}}, "validation": {"size_as_error": true}}"#,
        )
        .unwrap();
        assert!(!config.convert.footprint.include_3d_model);
        assert!(config.validation.size_as_error);
        assert!(config.validation.report_extra);
    }
}
