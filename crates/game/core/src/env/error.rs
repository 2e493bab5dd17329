//! Oracle access errors.
//!
//! Errors related to collaborator availability and data lookup.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{InstanceId, ModelId};

/// Errors that occur when accessing oracle data.
///
/// A missing oracle is fatal for the operation that needed it; an unknown
/// model or instance is a validation error on the creature that references it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("NavigationOracle not available")]
    NavigationNotAvailable,

    #[error("RoomOracle not available")]
    RoomsNotAvailable,

    #[error("EffectOracle not available")]
    EffectsNotAvailable,

    #[error("ModelOracle not available")]
    ModelsNotAvailable,

    #[error("ConfigOracle not available")]
    ConfigNotAvailable,

    #[error("RngOracle not available")]
    RngNotAvailable,

    /// Creature model was not found by ID.
    #[error("creature model {0} not found")]
    ModelNotFound(ModelId),

    /// Instance definition was not found by ID.
    #[error("instance {0} not found")]
    InstanceNotFound(InstanceId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            NavigationNotAvailable | RoomsNotAvailable | EffectsNotAvailable
            | ModelsNotAvailable | ConfigNotAvailable | RngNotAvailable => ErrorSeverity::Fatal,

            ModelNotFound(_) | InstanceNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            NavigationNotAvailable => "ORACLE_NAVIGATION_NOT_AVAILABLE",
            RoomsNotAvailable => "ORACLE_ROOMS_NOT_AVAILABLE",
            EffectsNotAvailable => "ORACLE_EFFECTS_NOT_AVAILABLE",
            ModelsNotAvailable => "ORACLE_MODELS_NOT_AVAILABLE",
            ConfigNotAvailable => "ORACLE_CONFIG_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            ModelNotFound(_) => "ORACLE_MODEL_NOT_FOUND",
            InstanceNotFound(_) => "ORACLE_INSTANCE_NOT_FOUND",
        }
    }
}
