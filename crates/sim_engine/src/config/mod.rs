//! Configuration system
//!
//! Settings cross into the core as plain values only: the fixed physics
//! step and the initial window size. Files are TOML or RON, dispatched on
//! extension; partial files fall back to field defaults.

pub use serde::{Deserialize, Serialize};

/// Configuration trait for serde-backed settings types
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a file, dispatching on its extension
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// has an unsupported extension.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to a file, dispatching on its extension
    ///
    /// # Errors
    /// Returns [`ConfigError`] when serialization or the write fails, or
    /// the extension is unsupported.
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Initial window parameters, handed to the external windowing
/// collaborator as plain values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window width in pixels
    #[serde(default = "defaults::window_width")]
    pub width: u32,

    /// Window height in pixels
    #[serde(default = "defaults::window_height")]
    pub height: u32,

    /// Window title
    #[serde(default = "defaults::window_title")]
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: defaults::window_width(),
            height: defaults::window_height(),
            title: defaults::window_title(),
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixed physics step in seconds
    #[serde(default = "defaults::physics_step")]
    pub physics_step: f32,

    /// Initial window parameters
    #[serde(default)]
    pub window: WindowConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            physics_step: defaults::physics_step(),
            window: WindowConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Check that all values are usable before any subsystem consumes
    /// them; configuration mistakes are fatal at startup, never recovered
    /// silently at runtime.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a non-positive or non-finite
    /// physics step or a zero window dimension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.physics_step.is_finite() || self.physics_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "physics_step must be a positive number of seconds, got {}",
                self.physics_step
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window dimensions must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        Ok(())
    }
}

mod defaults {
    pub fn physics_step() -> f32 {
        1.0 / 60.0
    }

    pub fn window_width() -> u32 {
        1280
    }

    pub fn window_height() -> u32 {
        720
    }

    pub fn window_title() -> String {
        String::from("sim_engine")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.physics_step - 1.0 / 60.0).abs() < f32::EPSILON);
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: EngineConfig = toml::from_str("physics_step = 0.02").unwrap();
        assert!((config.physics_step - 0.02).abs() < f32::EPSILON);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_toml_file_roundtrip() {
        let path = std::env::temp_dir().join("sim_engine_config_test.toml");
        let path = path.to_str().unwrap().to_string();

        let mut config = EngineConfig::default();
        config.physics_step = 1.0 / 120.0;
        config.window.width = 640;
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert!((loaded.physics_step - 1.0 / 120.0).abs() < f32::EPSILON);
        assert_eq!(loaded.window.width, 640);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = EngineConfig::load_from_file("settings.ini").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_) | ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.physics_step = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.physics_step = -1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());
    }
}
