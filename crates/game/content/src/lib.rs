//! Data-driven content for the lair engine.
//!
//! Loads the balance configuration (`config.toml`) and the creature model
//! catalog (`models.ron`) that `lair-core` consumes through its oracles.
//! Content never appears in world state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, Content, ContentFactory, InstanceSpec, LoadResult, ModelCatalog, ModelLoader,
    ModelSpec,
};
