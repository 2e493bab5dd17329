//! Errors raised by the pools and intrusive lists.

use crate::error::{ErrorSeverity, GameError};

use super::{BattleId, CreatureId, RoomId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolError {
    #[error("pool exhausted ({capacity} slots in use)")]
    Exhausted { capacity: usize },

    #[error("index {0} does not refer to a live record")]
    StaleIndex(usize),

    #[error("creature {0} does not exist")]
    NoSuchCreature(CreatureId),
}

impl GameError for PoolError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PoolError::Exhausted { .. } => ErrorSeverity::Recoverable,
            PoolError::StaleIndex(_) | PoolError::NoSuchCreature(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PoolError::Exhausted { .. } => "POOL_EXHAUSTED",
            PoolError::StaleIndex(_) => "POOL_STALE_INDEX",
            PoolError::NoSuchCreature(_) => "POOL_NO_SUCH_CREATURE",
        }
    }
}

/// Inconsistencies found while walking an intrusive list.
///
/// The walk stops at the fault and leaves the links untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkError {
    #[error("battle {battle} list exceeds {budget} links")]
    BattleOverrun { battle: BattleId, budget: usize },

    #[error("battle {battle} links to missing creature {creature}")]
    BattleBroken { battle: BattleId, creature: CreatureId },

    #[error("room {room} worker list exceeds {budget} links")]
    RoomOverrun { room: RoomId, budget: usize },

    #[error("room {room} links to missing creature {creature}")]
    RoomBroken { room: RoomId, creature: CreatureId },
}

impl GameError for LinkError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            LinkError::BattleOverrun { .. } => "LINK_BATTLE_OVERRUN",
            LinkError::BattleBroken { .. } => "LINK_BATTLE_BROKEN",
            LinkError::RoomOverrun { .. } => "LINK_ROOM_OVERRUN",
            LinkError::RoomBroken { .. } => "LINK_ROOM_BROKEN",
        }
    }
}
