//! Bundler configuration

use form_types::{FormError, FormResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings applied while compiling control trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    /// Name used for the root control identifier
    pub root_name: String,

    /// Log unresolved executables at `warn` instead of `debug`
    pub warn_on_missing_executable: bool,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            root_name: "root".to_string(),
            warn_on_missing_executable: false,
        }
    }
}

impl BundlerConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> FormResult<Self> {
        toml::from_str(contents).map_err(|e| FormError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> FormResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FormError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BundlerConfig::default();
        assert_eq!(config.root_name, "root");
        assert!(!config.warn_on_missing_executable);
    }

    #[test]
    fn test_partial_toml() {
        let config = BundlerConfig::from_toml_str("warn_on_missing_executable = true").unwrap();
        assert_eq!(config.root_name, "root");
        assert!(config.warn_on_missing_executable);
    }

    #[test]
    fn test_invalid_toml() {
        let err = BundlerConfig::from_toml_str("root_name = [").unwrap_err();
        assert!(matches!(err, FormError::Config(_)));
    }

    #[test]
    fn test_load_missing_config() {
        let config = BundlerConfig::load("/nonexistent/path/form.toml").unwrap();
        assert_eq!(config, BundlerConfig::default());
    }
}
