use crate::confirm::RenderMode;
use crate::node::TypeMask;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub prompt: PromptSettings,

    #[serde(default)]
    pub traversal: TraversalSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub remote: RemoteSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptSettings {
    #[serde(default)]
    pub no_prompt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalSettings {
    #[serde(default = "default_type_mask")]
    pub type_mask: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub render: RenderMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// JSON snapshot backing the in-memory remote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            type_mask: default_type_mask(),
            max_depth: None,
        }
    }
}

fn default_type_mask() -> Vec<String> {
    vec!["all".to_string()]
}

impl Config {
    /// Config directory for this tool, e.g. `~/.config/rtrash` on Linux.
    pub fn config_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "rtrash")
            .context("Could not determine a home directory for the config file")?;
        Ok(dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default snapshot location next to the config file.
    pub fn default_snapshot_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("remote.json"))
    }

    /// Load config from the default location or return defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Self::default(),
        }
    }

    /// Load config from `path`. Unreadable or invalid files fall back to
    /// defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml).context("Failed to write config file")?;

        Ok(())
    }

    /// Apply CLI option overrides
    pub fn apply_cli_overrides(
        &mut self,
        no_prompt: bool,
        type_mask: &[String],
        max_depth: Option<u32>,
        summary: bool,
        snapshot: Option<PathBuf>,
    ) {
        if no_prompt {
            self.prompt.no_prompt = true;
        }
        if !type_mask.is_empty() {
            self.traversal.type_mask = type_mask.to_vec();
        }
        if let Some(depth) = max_depth {
            self.traversal.max_depth = Some(depth);
        }
        if summary {
            self.display.render = RenderMode::Summary;
        }
        if let Some(path) = snapshot {
            self.remote.snapshot = Some(path);
        }
    }

    pub fn type_mask(&self) -> Result<TypeMask> {
        TypeMask::from_names(&self.traversal.type_mask).map_err(anyhow::Error::msg)
    }

    pub fn snapshot_path(&self) -> Result<PathBuf> {
        match &self.remote.snapshot {
            Some(path) => Ok(path.clone()),
            None => Self::default_snapshot_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(!config.prompt.no_prompt);
        assert_eq!(config.traversal.type_mask, vec!["all"]);
        assert_eq!(config.traversal.max_depth, None);
        assert_eq!(config.display.render, RenderMode::Detailed);
        assert_eq!(config.type_mask().unwrap(), TypeMask::ALL);
    }

    #[test]
    fn test_config_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [traversal]
            type_mask = ["file"]

            [display]
            render = "summary"
            "#,
        )
        .unwrap();
        assert_eq!(config.type_mask().unwrap(), TypeMask::FILE);
        assert_eq!(config.display.render, RenderMode::Summary);
        assert!(!config.prompt.no_prompt);
    }

    #[test]
    fn test_config_apply_cli_overrides() {
        let mut config = Config::default();
        config.apply_cli_overrides(
            true,
            &["folder".to_string()],
            Some(2),
            true,
            Some(PathBuf::from("/tmp/tree.json")),
        );

        assert!(config.prompt.no_prompt);
        assert_eq!(config.type_mask().unwrap(), TypeMask::FOLDER);
        assert_eq!(config.traversal.max_depth, Some(2));
        assert_eq!(config.display.render, RenderMode::Summary);
        assert_eq!(config.snapshot_path().unwrap(), PathBuf::from("/tmp/tree.json"));
    }

    #[test]
    fn test_config_partial_overrides() {
        let mut config = Config::default();
        config.apply_cli_overrides(false, &[], None, false, None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_type_mask() {
        let mut config = Config::default();
        config.traversal.type_mask = vec!["socket".to_string()];
        assert!(config.type_mask().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let mut config = Config::default();
        config.prompt.no_prompt = true;
        config.traversal.max_depth = Some(3);
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_load_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
