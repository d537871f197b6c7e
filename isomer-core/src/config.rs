//! Mapper configuration.
//!
//! The policy of a mapper (strict or lenient, which name suffixes to ignore
//! when pairing accessors with mutators) is fixed when the mapper is built.
//! It can be written in code or loaded from TOML:
//!
//! ```toml
//! strict = true
//! suffixes = ["_dto", "_bo", "_view"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Suffixes ignored by default when pairing accessor and mutator names.
pub const DEFAULT_SUFFIXES: &[&str] = &["_dto", "_bo"];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Fail on the first unmappable field instead of skipping it.
    pub strict: bool,
    /// Name suffixes stripped before comparing accessor and mutator names.
    pub suffixes: Vec<String>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            strict: false,
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl MapperConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded mapper config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let config = MapperConfig::default();
        assert!(!config.strict);
        assert_eq!(config.suffixes, vec!["_dto", "_bo"]);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = MapperConfig::from_toml_str("strict = true").unwrap();
        assert!(config.strict);
        assert_eq!(config.suffixes, MapperConfig::default().suffixes);
    }

    #[test]
    fn full_toml() {
        let config = MapperConfig::from_toml_str(
            r#"
            strict = false
            suffixes = ["_view"]
            "#,
        )
        .unwrap();
        assert_eq!(config.suffixes, vec!["_view"]);
    }

    #[test]
    fn invalid_toml() {
        assert!(matches!(
            MapperConfig::from_toml_str("strict = \"yes\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            MapperConfig::load("/nonexistent/isomer.toml"),
            Err(ConfigError::IoError(_))
        ));
    }
}
