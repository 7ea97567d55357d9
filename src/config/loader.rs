use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::core::{AppConfig, ConfigError};

pub const CONFIG_FILE_NAME: &str = "hello-triangle.toml";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads and validates a config file that must already exist.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Reads the config at `path`, writing the defaults there first if the file
/// does not exist yet.
pub fn load_or_create_at(path: &Path) -> Result<AppConfig, ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    if !path.exists() {
        let default_config = AppConfig::default();
        let toml_content = toml::to_string_pretty(&default_config)?;
        fs::write(path, toml_content).map_err(io_error(path))?;
        log::info!("Wrote default config to {}", path.display());
        return Ok(default_config);
    }

    load_from_path(path)
}

/// [`load_or_create_at`] on the per-user config location.
pub fn load_or_create_default() -> Result<AppConfig, ConfigError> {
    load_or_create_at(&default_config_path()?)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "MetroManDevTeam", "hello-triangle")
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Profile;
    use tempfile::tempdir;

    #[test]
    fn test_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = load_or_create_at(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        // Second call reads the file it wrote.
        assert_eq!(load_or_create_at(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
            [window]
            width = 1024
            height = 768
            vsync = false

            [context]
            major = 4
            minor = 1
            profile = "core"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.window.width, 1024);
        assert!(!config.window.vsync);
        assert_eq!(config.context.major, 4);
        assert_eq!(config.context.profile, Profile::Core);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&path, "[context]\nmajor = 9\n").unwrap();
        assert!(matches!(load_from_path(&path), Err(ConfigError::UnsupportedVersion(_))));

        fs::write(&path, "[window\nwidth = ").unwrap();
        assert!(matches!(load_from_path(&path), Err(ConfigError::Parse(_))));
    }
}
