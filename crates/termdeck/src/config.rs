use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::navigation::{Action, KeyMap};
use crate::settings::{self, SettingValue, Settings};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "termdeck";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeysConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Presentation options applied before a document's frontmatter.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_slide: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<Vec<String>>,
}

impl KeysConfig {
    fn slot(&mut self, action: Action) -> Option<&mut Option<Vec<String>>> {
        match action {
            Action::Next => Some(&mut self.next),
            Action::Previous => Some(&mut self.previous),
            Action::Exit => Some(&mut self.exit),
            Action::Help => Some(&mut self.help),
            Action::None => None,
        }
    }

    fn get(&self, action: Action) -> Option<&Vec<String>> {
        match action {
            Action::Next => self.next.as_ref(),
            Action::Previous => self.previous.as_ref(),
            Action::Exit => self.exit.as_ref(),
            Action::Help => self.help.as_ref(),
            Action::None => None,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `termdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// The user config, or defaults when it is missing. A broken file is
    /// reported and otherwise ignored.
    pub fn load_or_default() -> Self {
        let Ok(path) = Self::path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("{e:#}");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# termdeck configuration\n{yaml}");
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if key == "defaults.start_slide" {
            let n: usize = value
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow::anyhow!("Invalid start_slide: {value}. Must be a slide number (1 or more)."))?;
            self.defaults
                .get_or_insert_with(DefaultsConfig::default)
                .start_slide = Some(n);
        } else if let Some(option) = key.strip_prefix("defaults.") {
            let spec = settings::lookup(option).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown option: {option}. Valid options: {}",
                    option_names().join(", ")
                )
            })?;
            Settings::default()
                .set(spec.key, SettingValue::parse(value))
                .map_err(|e| anyhow::anyhow!("Invalid value: {e}"))?;
            self.defaults
                .get_or_insert_with(DefaultsConfig::default)
                .settings
                .insert(spec.key.to_string(), value.to_string());
        } else if let Some(name) = key.strip_prefix("keys.") {
            let action = Action::from_name(name).ok_or_else(|| {
                anyhow::anyhow!("Unknown action: {name}. Must be 'next', 'previous', 'exit', or 'help'.")
            })?;
            let names: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if names.is_empty() {
                anyhow::bail!("No keys given for {name}");
            }
            KeyMap::parse_keys(&names).map_err(|e| anyhow::anyhow!("Invalid key list: {e}"))?;
            if let Some(slot) = self.keys.get_or_insert_with(KeysConfig::default).slot(action) {
                *slot = Some(names);
            }
        } else {
            anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.<option>, defaults.start_slide, keys.next, keys.previous, keys.exit, keys.help"
            );
        }
        Ok(())
    }

    /// Built-in defaults with the configured options applied. Invalid
    /// entries are skipped with a warning.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        let Some(defaults) = &self.defaults else {
            return settings;
        };
        for (key, value) in &defaults.settings {
            if let Err(e) = settings.set(key, SettingValue::parse(value)) {
                tracing::warn!("config: {e}");
            }
        }
        settings
    }

    pub fn start_slide(&self) -> Option<usize> {
        self.defaults.as_ref().and_then(|d| d.start_slide)
    }

    pub fn keymap(&self) -> Result<KeyMap> {
        let mut keymap = KeyMap::default();
        let Some(keys) = &self.keys else {
            return Ok(keymap);
        };
        for action in Action::BOUND {
            if let Some(names) = keys.get(action) {
                let parsed = KeyMap::parse_keys(names)
                    .map_err(|e| anyhow::anyhow!("Invalid keys.{}: {e}", action.name()))?;
                keymap.bind(action, parsed);
            }
        }
        Ok(keymap)
    }
}

fn option_names() -> Vec<&'static str> {
    settings::OPTIONS.iter().map(|spec| spec.key).collect()
}
