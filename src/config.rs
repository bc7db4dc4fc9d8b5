use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a threshold graph is populated when it is first requested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphBuild {
    /// One k-d tree radius query per vertex.
    #[default]
    Indexed,
    /// Test every unordered pair.
    Scan,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Largest threshold the catalog will answer; larger ones are rejected
    /// with `Error::OutOfRange`. Unbounded when `None`.
    pub max_query_radius: Option<f64>,
    pub graph_build: GraphBuild,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl CatalogConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CatalogConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max) = self.max_query_radius {
            if max.is_nan() || max < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "max_query_radius must be a non-negative number, got {max}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = CatalogConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.graph_build, GraphBuild::Indexed);
        assert_eq!(config.max_query_radius, None);
    }

    #[test]
    fn parses_all_fields() {
        let config =
            CatalogConfig::from_json_str(r#"{"max_query_radius": 12.5, "graph_build": "scan"}"#)
                .unwrap();
        assert_eq!(config.max_query_radius, Some(12.5));
        assert_eq!(config.graph_build, GraphBuild::Scan);
    }

    #[test]
    fn rejects_negative_radius_and_unknown_fields() {
        assert!(matches!(
            CatalogConfig::from_json_str(r#"{"max_query_radius": -1.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CatalogConfig::from_json_str(r#"{"radius": 1.0}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn reads_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"graph_build": "indexed"}"#).unwrap();
        let config = CatalogConfig::from_path(file.path()).unwrap();
        assert_eq!(config.graph_build, GraphBuild::Indexed);
    }
}
