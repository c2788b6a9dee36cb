//! Initialize the configuration directory: create `~/.hookguard` and a default
//! `tts_config.json` with every setting spelled out.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::TtsConfig;

/// Create the config directory and write the default config if none exists.
/// An existing config file is left untouched. Returns the config directory.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if config_path.exists() {
        log::debug!("config already exists at {}, skipping", config_path.display());
        return Ok(config_dir.to_path_buf());
    }

    let body = serde_json::to_string_pretty(&TtsConfig::default())
        .context("serializing default config")?;
    std::fs::write(config_path, body)
        .with_context(|| format!("writing default config to {}", config_path.display()))?;
    log::info!("created default config at {}", config_path.display());

    Ok(config_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    #[test]
    fn writes_defaults_once() {
        let dir = std::env::temp_dir().join(format!("hookguard-init-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("sub").join("tts_config.json");

        let created = init_config_dir(&path).unwrap();
        assert_eq!(created, dir.join("sub"));
        let (config, _) = load_config(Some(path.clone()));
        assert_eq!(config.provider_priority, TtsConfig::default().provider_priority);
        assert!(config.providers["offline"].enabled);

        std::fs::write(&path, r#"{"enabled": false}"#).unwrap();
        init_config_dir(&path).unwrap();
        let (config, _) = load_config(Some(path));
        assert!(!config.is_enabled());
    }
}
