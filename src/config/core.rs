use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::context::{ContextHints, ContextRequest, GlVersion, Profile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Couldn't determine the user config directory")]
    NoConfigDir,
    #[error("OpenGL {0} is not a supported context version")]
    UnsupportedVersion(GlVersion),
    #[error("Window size {width}x{height} must be positive")]
    InvalidSize { width: u32, height: u32 },
    #[error("Invalid OpenGL version: {0}")]
    InvalidVersion(String),
    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    /// Overrides the demo's own title when set.
    pub title: Option<String>,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: None,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub major: u8,
    pub minor: u8,
    pub profile: Profile,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 3,
            profile: Profile::Core,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<String>,
    pub vsync: Option<bool>,
    pub gl_version: Option<String>,
    pub profile: Option<Profile>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub context: ContextConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.window.width,
                height: self.window.height,
            });
        }

        let version = GlVersion::new(self.context.major, self.context.minor);
        if !version.is_supported() {
            return Err(ConfigError::UnsupportedVersion(version));
        }

        self.log_level()?;
        Ok(())
    }

    pub fn context_request(&self) -> ContextRequest {
        ContextRequest::new(self.context.major, self.context.minor, self.context.profile)
    }

    pub fn context_hints(&self) -> ContextHints {
        ContextHints::from_request(self.context_request())
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        self.logging
            .level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.logging.level.clone()))
    }

    pub fn set_version(&mut self, version: &str) -> Result<(), ConfigError> {
        let version: GlVersion = version.parse().map_err(ConfigError::InvalidVersion)?;
        self.context.major = version.major;
        self.context.minor = version.minor;
        Ok(())
    }

    /// Applies `overrides` and validates the result.
    pub fn apply(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(title) = overrides.title {
            self.window.title = Some(title);
        }
        if let Some(vsync) = overrides.vsync {
            self.window.vsync = vsync;
        }
        if let Some(version) = overrides.gl_version {
            self.set_version(&version)?;
        }
        if let Some(profile) = overrides.profile {
            self.context.profile = profile;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }

        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.context_request(), ContextRequest::new(3, 3, Profile::Core));
        assert_eq!(config.log_level().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_rejects_zero_size() {
        let mut config = AppConfig::default();
        config.window.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSize { width: 800, height: 0 })
        ));
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let mut config = AppConfig::default();
        config.set_version("3.9").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedVersion(v)) if v == GlVersion::new(3, 9)
        ));
        assert!(matches!(config.set_version("latest"), Err(ConfigError::InvalidVersion(_))));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "chatty".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AppConfig::default();
        config
            .apply(Overrides {
                width: Some(1280),
                gl_version: Some("4.1".to_string()),
                profile: Some(Profile::Compatibility),
                vsync: Some(false),
                ..Overrides::default()
            })
            .unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert!(!config.window.vsync);
        assert_eq!(config.context_request(), ContextRequest::new(4, 1, Profile::Compatibility));
    }

    #[test]
    fn test_apply_validates() {
        let mut config = AppConfig::default();
        let err = config
            .apply(Overrides {
                gl_version: Some("1.1".to_string()),
                ..Overrides::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [window]
            title = "Triangles"

            [context]
            profile = "compatibility"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.title.as_deref(), Some("Triangles"));
        assert_eq!(config.context.profile, Profile::Compatibility);
        assert_eq!(config.context.major, 3);
    }
}
