//! Optional on-disk RHI configuration.
//!
//! The RHI itself has no environment-variable or CLI surface. The only persisted state it reads
//! is a small JSON file carrying the validation toggle; everything else (pipeline-cache blobs)
//! is read/written at caller-chosen paths via explicit calls, not through this module.

use serde::Deserialize;
use std::path::Path;

/// Factory-wide configuration loaded from an optional JSON file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RhiConfig {
    /// Whether the factory should install a validation/debug-report callback.
    #[serde(rename = "EnableValidation", default)]
    pub enable_validation: bool,
}

impl Default for RhiConfig {
    fn default() -> Self {
        RhiConfig { enable_validation: false }
    }
}

impl RhiConfig {
    /// Loads configuration from `path`. A missing file is not an error: validation defaults to
    /// off, matching "if absent, validation defaults to off".
    pub fn load(path: impl AsRef<Path>) -> RhiConfig {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!(
                        "Failed to parse RHI config at {}: {}. Falling back to defaults.",
                        path.as_ref().display(),
                        err
                    );
                    RhiConfig::default()
                }
            },
            Err(_) => RhiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_defaults_validation_off() {
        let config = RhiConfig::load("/nonexistent/path/that/should/never/exist.json");
        assert!(!config.enable_validation);
    }

    #[test]
    fn parses_enable_validation() {
        let dir = std::env::temp_dir().join("vkrhi-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{ "EnableValidation": true }"#).unwrap();

        let config = RhiConfig::load(&path);
        assert!(config.enable_validation);

        std::fs::remove_file(&path).ok();
    }
}
