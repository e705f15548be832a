//! Application configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub filtering: FilteringConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Frame record source; "-" reads stdin
    pub frames: Option<PathBuf>,
    pub schema_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// Car tag attached to every emitted point
    #[serde(default = "default_car")]
    pub car: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { car: default_car() }
    }
}

fn default_car() -> String {
    "car".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SinkConfig {
    /// Line-protocol destination; stdout when unset
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilteringConfig {
    pub identifiers: Option<Vec<u16>>,
    #[serde(default)]
    pub skip_unknown: bool,
    pub max_frames: Option<usize>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            frames = "frames.log"
            schema_files = ["bus.json"]

            [link]
            car = "daybreak"

            [filtering]
            identifiers = [0x100, 0x200]
            skip_unknown = true
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.schema_files.len(), 1);
        assert_eq!(config.link.car, "daybreak");
        assert_eq!(config.filtering.identifiers, Some(vec![0x100, 0x200]));
        assert!(config.filtering.skip_unknown);
        assert!(config.sink.output.is_none());
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            schema_files = ["bus.toml"]
        "#,
        )
        .unwrap();

        assert_eq!(config.link.car, "car");
        assert!(!config.filtering.skip_unknown);
        assert!(config.input.frames.is_none());
    }
}
