//! User configuration.

use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::encoder::PngFileEncoder;

const DIRECTORY_NAME: &str = "window-capture";
const FILE_NAME: &str = "window-capture.toml";
const CAPTURE_FILE_NAME: &str = "windowcapture.png";

/// Window capture settings, stored as TOML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where captures are written.
    pub output_path: PathBuf,

    /// If captures are trimmed to the window's visible bounds.
    pub trim: bool,

    /// If binaries log at debug level.
    pub debug_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: std::env::temp_dir().join(CAPTURE_FILE_NAME),
            trim: true,
            debug_logging: false,
        }
    }
}

impl Config {
    /// The per-user config file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(DIRECTORY_NAME).join(FILE_NAME))
    }

    /// Load the config at `path`, writing the default config there if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, LoadError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                info!("No config at {}, creating default", path.display());
                let config = Self::default();
                config.save(path)?;
                return Ok(config);
            }
            Err(error) => return Err(LoadError::ReadFile(error)),
        };

        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write the config to `path`, creating its directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        let toml_string = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// The encoder writing captures to [`Self::output_path`].
    pub fn encoder(&self) -> PngFileEncoder {
        PngFileEncoder::new(&self.output_path)
    }
}

/// Config loading error variants.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file:\n{0}")]
    ReadFile(#[source] io::Error),

    /// The default config could not be saved.
    #[error("Failed to save default config file:\n{0}")]
    SaveFile(#[from] SaveError),

    /// The config file is invalid.
    #[error("Failed to deserialize config:\n{0}")]
    Deserialize(#[from] toml::de::Error),
}

/// Config saving error variants.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The config could not be serialized.
    #[error("Failed to serialize config:\n{0}")]
    Serialize(#[from] toml::ser::Error),

    /// The config file could not be written.
    #[error("Failed to write file:\n{0}")]
    Write(#[from] io::Error),
}

#[cfg(test)]
mod test {
    use std::{fs, path::PathBuf};

    use super::{Config, LoadError};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "window-capture-config-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_config_is_created() {
        let dir = scratch_dir("missing");
        let path = dir.join("window-capture.toml");

        let config = Config::load_or_create(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load_or_create(&path).unwrap(), config);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn saved_config_loads() {
        let dir = scratch_dir("saved");
        let path = dir.join("window-capture.toml");
        let config = Config {
            output_path: PathBuf::from("/captures/window.png"),
            trim: false,
            debug_logging: true,
        };

        config.save(&path).unwrap();

        assert_eq!(Config::load_or_create(&path).unwrap(), config);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = toml::from_str("trim = false").unwrap();

        assert!(!config.trim);
        assert_eq!(config.output_path, Config::default().output_path);
    }

    #[test]
    fn invalid_config_fails() {
        let dir = scratch_dir("invalid");
        let path = dir.join("window-capture.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "trim = \"sometimes\"").unwrap();

        let result = Config::load_or_create(&path);

        assert!(matches!(result, Err(LoadError::Deserialize(_))));
        fs::remove_dir_all(dir).unwrap();
    }
}
