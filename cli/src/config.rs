//! Configuration management for the dronevox CLI.
//!
//! Configuration is stored in ~/.dronevox/{app_name}/config.yaml and holds
//! named contexts, one per vehicle or workspace, switched kubectl-style.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".dronevox";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Name of the currently active context.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_context: String,

    /// Map of context name to context configuration.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub contexts: HashMap<String, Context>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// Settings of one context. Unset fields use the library defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Voiceprint store file (default: <app dir>/data/voice_commands.json).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,

    /// Feature vector length of the reference extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,

    /// Audio samples required to train a command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples_per_command: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_threshold: Option<f32>,

    /// Duration used for steps without a valid duration, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_step_ms: Option<u64>,

    /// Device node or file receiving directives (unset: simulated channel).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Simulated transmission time per directive, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_latency_ms: Option<u64>,

    /// Output directory of compiled missions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_dir: Option<String>,

    /// Pause between batch items, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_pause_ms: Option<u64>,

    /// Altitude of movement waypoints, in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
}

impl Config {
    /// Gets the default config directory.
    pub fn default_config_dir(app_name: &str) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(app_name))
    }

    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Self::default_config_dir(app_name).map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn dir(&self) -> Option<&Path> {
        self.config_path.parent()
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Adds or replaces a context.
    pub fn add_context(&mut self, name: &str, mut ctx: Context) -> anyhow::Result<()> {
        ctx.name = name.to_string();
        self.contexts.insert(name.to_string(), ctx);
        self.save()
    }

    pub fn delete_context(&mut self, name: &str) -> anyhow::Result<()> {
        if self.contexts.remove(name).is_none() {
            anyhow::bail!("context '{}' not found", name);
        }
        if self.current_context == name {
            self.current_context.clear();
        }
        self.save()
    }

    pub fn use_context(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.contexts.contains_key(name) {
            anyhow::bail!("context '{}' not found", name);
        }
        self.current_context = name.to_string();
        self.save()
    }

    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    pub fn get_current_context(&self) -> Option<&Context> {
        if self.current_context.is_empty() {
            return None;
        }
        self.contexts.get(&self.current_context)
    }

    /// Resolves the context by name, or the current context if no name is given.
    ///
    /// Without a named or current context the defaults apply. Naming a
    /// missing context is an error.
    pub fn resolve_context(&self, name: Option<&str>) -> anyhow::Result<Context> {
        match name {
            Some(n) if !n.is_empty() => self
                .get_context(n)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("context '{}' not found", n)),
            _ => Ok(self.get_current_context().cloned().unwrap_or_default()),
        }
    }

    /// Lists all context names, sorted.
    pub fn list_contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contexts.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

fn config_path(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<PathBuf> {
    match custom_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path")),
    }
}

/// Loads configuration for the specified app, creating an empty file if needed.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = config_path(app_name, custom_path)?;

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        let cfg = Config::default();
        std::fs::write(&config_path, serde_yaml::to_string(&cfg)?)?;
        cfg
    };

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(dir: &tempfile::TempDir) -> Config {
        let path = dir.path().join("nested").join("config.yaml");
        load_config("dronevox", path.to_str()).unwrap()
    }

    #[test]
    fn test_load_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(&dir);
        assert!(cfg.path().exists());
        assert_eq!(cfg.app_name, "dronevox");
        assert!(cfg.contexts.is_empty());
    }

    #[test]
    fn test_context_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = load(&dir);

        let ctx = Context {
            device: Some("/dev/ttyUSB0".into()),
            altitude_m: Some(25.0),
            ..Default::default()
        };
        cfg.add_context("field", ctx).unwrap();
        cfg.add_context("bench", Context::default()).unwrap();
        cfg.use_context("field").unwrap();

        let reloaded = load(&dir);
        assert_eq!(reloaded.current_context, "field");
        assert_eq!(reloaded.list_contexts(), vec!["bench", "field"]);
        let current = reloaded.resolve_context(None).unwrap();
        assert_eq!(current.name, "field");
        assert_eq!(current.device.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(current.altitude_m, Some(25.0));

        cfg.delete_context("field").unwrap();
        let reloaded = load(&dir);
        assert!(reloaded.current_context.is_empty());
        assert!(reloaded.get_context("field").is_none());
    }

    #[test]
    fn test_resolve_context() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(&dir);
        assert_eq!(cfg.resolve_context(None).unwrap(), Context::default());
        assert!(cfg.resolve_context(Some("nope")).is_err());
    }

    #[test]
    fn test_unset_fields_are_not_serialized() {
        let yaml = serde_yaml::to_string(&Context {
            name: "x".into(),
            batch_pause_ms: Some(0),
            ..Default::default()
        })
        .unwrap();
        assert!(yaml.contains("batch_pause_ms: 0"));
        assert!(!yaml.contains("device"));
    }
}
