//! Error types surfaced by the state machine.

use crate::behavior::{NeedCategory, StateId};
use crate::combat::CombatError;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{CreatureId, LinkError, PoolError, Position};

/// A requested state change that did not happen.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionError {
    #[error("{creature} in {current} may not be preempted by {need} (requested {requested})")]
    Refused {
        creature: CreatureId,
        current: StateId,
        requested: StateId,
        need: NeedCategory,
    },

    #[error("creature {0} does not exist")]
    NoSuchCreature(CreatureId),

    #[error("{creature} cannot navigate to {destination:?}")]
    Unreachable {
        creature: CreatureId,
        destination: Position,
    },
}

impl GameError for TransitionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            TransitionError::Refused { .. } => ErrorSeverity::Validation,
            TransitionError::NoSuchCreature(_) => ErrorSeverity::Validation,
            TransitionError::Unreachable { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            TransitionError::Refused { .. } => "TRANSITION_REFUSED",
            TransitionError::NoSuchCreature(_) => "TRANSITION_NO_SUCH_CREATURE",
            TransitionError::Unreachable { .. } => "TRANSITION_UNREACHABLE",
        }
    }
}

/// Errors surfaced while running the behavior engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Combat(#[from] CombatError),
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Oracle(error) => error.severity(),
            EngineError::Pool(error) => error.severity(),
            EngineError::Link(error) => error.severity(),
            EngineError::Transition(error) => error.severity(),
            EngineError::Combat(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            EngineError::Oracle(error) => error.error_code(),
            EngineError::Pool(error) => error.error_code(),
            EngineError::Link(error) => error.error_code(),
            EngineError::Transition(error) => error.error_code(),
            EngineError::Combat(error) => error.error_code(),
        }
    }
}
