//! Game configuration loader.

use std::path::Path;

use anyhow::Context;
use lair_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
///
/// Every key is optional; missing keys keep their [`GameConfig::default`] value.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig =
            toml::from_str(content).context("Failed to parse config TOML")?;

        let cap = GameConfig::MAX_OPPONENTS;
        if usize::from(config.melee_opponents_limit) > cap
            || usize::from(config.ranged_opponents_limit) > cap
        {
            tracing::warn!(
                melee = config.melee_opponents_limit,
                ranged = config.ranged_opponents_limit,
                cap,
                "opponent limits above slot capacity will be clamped"
            );
        }
        if config.battle_check_interval == 0 || config.salary_interval == 0 {
            tracing::warn!("zero intervals are treated as one turn");
        }

        tracing::debug!(?config, "loaded game config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let config = ConfigLoader::parse("salary_interval = 600\n").unwrap();
        assert_eq!(config.salary_interval, 600);
        assert_eq!(config.fear_sentinel, GameConfig::DEFAULT_FEAR_SENTINEL);
        assert_eq!(config.melee_opponents_limit, GameConfig::DEFAULT_OPPONENTS_LIMIT);
    }

    #[test]
    fn empty_file_is_the_default_config() {
        assert_eq!(ConfigLoader::parse("").unwrap(), GameConfig::default());
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(ConfigLoader::parse("flee_zone_radius = \"far\"\n").is_err());
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ranged_opponents_limit = -1\n").unwrap();

        let error = ConfigLoader::load(&path).unwrap_err();
        assert!(format!("{error:#}").contains("config.toml"));
    }
}
