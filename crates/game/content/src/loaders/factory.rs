//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use lair_core::GameConfig;

use crate::loaders::{ConfigLoader, LoadResult, ModelCatalog, ModelLoader};

/// Everything a host needs from the data directory to drive the engine.
#[derive(Debug, Clone)]
pub struct Content {
    pub config: GameConfig,
    pub models: ModelCatalog,
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── models.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`. A missing file means the
    /// default configuration.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the creature model catalog from `models.ron`.
    pub fn load_models(&self) -> LoadResult<ModelCatalog> {
        let path = self.data_dir.join("models.ron");
        ModelLoader::load(&path)
    }

    pub fn load_all(&self) -> LoadResult<Content> {
        let content = Content {
            config: self.load_config()?,
            models: self.load_models()?,
        };
        tracing::info!(
            data_dir = %self.data_dir.display(),
            models = content.models.len(),
            "loaded content"
        );
        Ok(content)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use lair_core::ModelOracle;

    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_a_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "fight_fear_delay = 40\n").unwrap();
        std::fs::write(
            dir.path().join("models.ron"),
            r#"(
                instances: [(id: 1, name: "bite", kind: Melee, range_max: 256, action_turns: 1)],
                models: [(id: 5, name: "spider", instances: ["bite"])],
            )"#,
        )
        .unwrap();

        let content = ContentFactory::new(dir.path()).load_all().unwrap();
        assert_eq!(content.config.fight_fear_delay, 40);
        assert_eq!(content.models.model_id("spider"), Some(lair_core::ModelId(5)));
        assert!(content.models.model(lair_core::ModelId(5)).is_some());
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentFactory::new(dir.path()).load_config().unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn missing_models_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = ContentFactory::new(dir.path()).load_models().unwrap_err();
        assert!(format!("{error:#}").contains("models.ron"));
    }

    #[test]
    fn bundled_data_loads() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let content = ContentFactory::new(data).load_all().unwrap();
        assert!(content.models.model_id("troll").is_some());
        assert!(content.models.model_id("knight").is_some());
    }
}
