use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::FoldError;

/// How the positions of one sub-pass are swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Sequential,
    #[default]
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldConfig {
    /// Temperature in °C.
    pub temperature: f64,
    pub schedule: Schedule,
    /// Helices shorter than this are removed from extracted structures.
    pub min_helix_length: usize,
}

impl Default for FoldConfig {
    fn default() -> Self {
        FoldConfig {
            temperature: 37.0,
            schedule: Schedule::Parallel,
            min_helix_length: 3,
        }
    }
}

impl FoldConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, FoldError> {
        let content = fs::read_to_string(path).map_err(|e| FoldError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FoldConfig = serde_json::from_str(r#"{"schedule": "sequential"}"#).unwrap();
        assert_eq!(config.schedule, Schedule::Sequential);
        assert_eq!(config.temperature, 37.0);
        assert_eq!(config.min_helix_length, 3);
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fold.json");
        fs::write(&path, r#"{"temperature": 25.0, "min_helix_length": 1}"#).unwrap();
        let config = FoldConfig::from_json_file(&path).unwrap();
        assert_eq!(config.temperature, 25.0);
        assert_eq!(config.min_helix_length, 1);
        assert_eq!(config.schedule, Schedule::Parallel);
    }
}
