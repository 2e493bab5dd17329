//! Content loaders for reading game data from files.
//!
//! Each loader turns one TOML or RON file into a value the core engine
//! consumes: the balance configuration or the creature model catalog.

pub mod config;
pub mod factory;
pub mod models;

pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory};
pub use models::{InstanceSpec, ModelCatalog, ModelLoader, ModelSpec};

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}
