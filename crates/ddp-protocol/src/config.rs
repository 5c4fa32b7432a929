//! Codec configuration

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default maximum frame size (16MB - 1)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 0x00FF_FFFF;

/// Configuration for [`MessageCodec`](crate::codec::MessageCodec)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest encoded message accepted or produced, in bytes, excluding
    /// the frame delimiter
    pub max_frame_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl CodecConfig {
    /// Check the configuration for values the codec cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_size == 0 {
            return Err(ConfigError::Invalid(
                "max_frame_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a codec configuration from a TOML file.
    ///
    /// Keys left out of the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(e) => {
                return Err(ConfigError::Invalid(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            max_frame_size = config.max_frame_size,
            "Loaded codec config"
        );
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Invalid(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| ConfigError::Invalid(format!("Failed to write {}: {}", path.display(), e)))
    }
}
