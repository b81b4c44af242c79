//! Directory layout of dronevox applications.

use std::io;
use std::path::PathBuf;

use crate::config::{DEFAULT_BASE_DIR, DEFAULT_CONFIG_FILE};

/// Voiceprint store file name.
pub const STORE_FILE: &str = "voice_commands.json";
/// Saved command bindings file name.
pub const BINDINGS_FILE: &str = "bindings.yaml";
/// Compiled missions directory name.
pub const MISSIONS_DIR: &str = "missions";

/// Provides access to the dronevox directory structure.
#[derive(Debug, Clone)]
pub struct Paths {
    pub app_name: String,
    pub home_dir: PathBuf,
}

impl Paths {
    pub fn new(app_name: impl Into<String>) -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self::with_home(app_name, home_dir))
    }

    /// Uses `home_dir` instead of the user's home directory.
    pub fn with_home(app_name: impl Into<String>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_name: app_name.into(),
            home_dir: home_dir.into(),
        }
    }

    /// Returns the base directory (~/.dronevox).
    pub fn base_dir(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_BASE_DIR)
    }

    /// Returns the app-specific directory (~/.dronevox/<app>).
    pub fn app_dir(&self) -> PathBuf {
        self.base_dir().join(&self.app_name)
    }

    pub fn config_file(&self) -> PathBuf {
        self.app_dir().join(DEFAULT_CONFIG_FILE)
    }

    /// Returns the data directory (~/.dronevox/<app>/data).
    pub fn data_dir(&self) -> PathBuf {
        self.app_dir().join("data")
    }

    pub fn store_file(&self) -> PathBuf {
        self.data_dir().join(STORE_FILE)
    }

    pub fn bindings_file(&self) -> PathBuf {
        self.data_dir().join(BINDINGS_FILE)
    }

    pub fn missions_dir(&self) -> PathBuf {
        self.app_dir().join(MISSIONS_DIR)
    }
}
