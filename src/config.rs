use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

/// Root configuration structure, deserialized from `.dep-miner/config.toml`.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Mining defaults; every field can be overridden on the command line.
    #[serde(default)]
    pub mining: MiningConfig,
}

#[derive(Debug, Deserialize)]
pub struct MiningConfig {
    /// Manifest path tracked through history.
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// CSV output path.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Count `<dependencyManagement>` entries as declarations.
    #[serde(default)]
    pub include_management: bool,
}

fn default_manifest() -> String {
    "pom.xml".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("dependency-changes.csv")
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            output: default_output(),
            include_management: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mining: MiningConfig::default(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `./.dep-miner/config.toml`
/// 3. `~/.config/dep-miner/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = Path::new(".dep-miner").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("dep-miner").join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}
