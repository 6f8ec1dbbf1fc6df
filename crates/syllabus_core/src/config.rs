//! Configuration types for Syllabus.
//!
//! [`Config`] stores where courses live and how navigation behaves. It is
//! persisted as TOML (typically at `~/.config/syllabus/config.toml` on Unix
//! systems).
//!
//! # Key Configuration Fields
//!
//! - `courses_dir`: directory holding one folder per course
//! - `data_dir`: where progress files and attachments are kept
//! - `auto_expand_on_select`: expand the ancestors of a selected lesson
//! - `persist_position`: remember the current lesson between sessions
//!
//! # Example
//!
//! ```ignore
//! use syllabus_core::config::Config;
//! use std::path::PathBuf;
//!
//! let config = Config::new(PathBuf::from("/home/user/courses"));
//! let progress_dir = config.progress_dir();
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SyllabusError};
use crate::fs::FileSystem;

/// User-configurable settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory containing course folders
    pub courses_dir: PathBuf,

    /// Directory for progress files and attachments.
    /// Falls back to the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Expand collapsed chapters when a lesson inside them is selected
    #[serde(default = "default_true")]
    pub auto_expand_on_select: bool,

    /// Save the current lesson every time the cursor moves
    #[serde(default = "default_true")]
    pub persist_position: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Create a config for the given courses directory
    pub fn new(courses_dir: PathBuf) -> Self {
        Self {
            courses_dir,
            data_dir: None,
            auto_expand_on_select: true,
            persist_position: true,
        }
    }

    /// Effective data directory
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir(),
        }
    }

    /// Where `<course>.progress.json` files go
    pub fn progress_dir(&self) -> PathBuf {
        self.data_dir().join("progress")
    }

    /// Root of the attachment store
    pub fn attachments_dir(&self) -> PathBuf {
        self.data_dir().join("attachments")
    }

    /// Load config from a specific path through a FileSystem.
    pub fn load_from<FS: FileSystem>(fs: &FS, path: &Path) -> Result<Self> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| SyllabusError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path through a FileSystem.
    pub fn save_to<FS: FileSystem>(&self, fs: &FS, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs.write_file(path, &contents)
            .map_err(|e| SyllabusError::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Load config, returning `default` if it is missing or unreadable.
    pub fn load_from_or_default<FS: FileSystem>(fs: &FS, path: &Path, default: Config) -> Self {
        match Self::load_from(fs, path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default config ({})", e);
                default
            }
        }
    }
}

// ============================================================================
// Native-only implementation (not available in WASM)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("syllabus")
}

#[cfg(target_arch = "wasm32")]
fn default_data_dir() -> PathBuf {
    PathBuf::from("/data")
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for Config {
    fn default() -> Self {
        let courses_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("courses");
        Self::new(courses_dir)
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for Config {
    fn default() -> Self {
        Self::new(PathBuf::from("/courses"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Config {
    /// Get the config file path (~/.config/syllabus/config.toml)
    /// Only available on native platforms
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("syllabus").join("config.toml"))
    }

    /// Load config from default location, or return default if file doesn't exist
    /// Only available on native platforms
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            let contents = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            return Ok(config);
        }

        Ok(Config::default())
    }

    /// Save config to default location
    /// Only available on native platforms
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or(SyllabusError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        Ok(())
    }

    /// Initialize config with the courses directory and save it
    /// Only available on native platforms
    pub fn init(courses_dir: PathBuf) -> Result<Self> {
        let config = Config::new(courses_dir);
        config.save()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;

    #[test]
    fn test_config_round_trip_through_fs() {
        let fs = InMemoryFileSystem::new();
        let path = Path::new("config/syllabus/config.toml");
        let mut config = Config::new(PathBuf::from("/srv/courses"));
        config.data_dir = Some(PathBuf::from("/srv/data"));
        config.persist_position = false;

        config.save_to(&fs, path).unwrap();
        let loaded = Config::load_from(&fs, path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.progress_dir(), PathBuf::from("/srv/data/progress"));
    }

    #[test]
    fn test_missing_flags_default_to_true() {
        let fs = InMemoryFileSystem::with_files(vec![("c.toml", "courses_dir = \"/c\"\n")]);
        let config = Config::load_from(&fs, Path::new("c.toml")).unwrap();
        assert!(config.auto_expand_on_select);
        assert!(config.persist_position);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_load_from_or_default_on_bad_toml() {
        let fs = InMemoryFileSystem::with_files(vec![("c.toml", "courses_dir = [")]);
        let fallback = Config::new(PathBuf::from("/fallback"));
        let config = Config::load_from_or_default(&fs, Path::new("c.toml"), fallback.clone());
        assert_eq!(config, fallback);
    }
}
