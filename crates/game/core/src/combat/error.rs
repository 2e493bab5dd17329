//! Combat precondition failures.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{AttackType, BattleId, CreatureId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatError {
    #[error("{0} is already in combat")]
    AlreadyInCombat(CreatureId),

    #[error("{fighter} cannot fight {enemy}")]
    InvalidEnemy {
        fighter: CreatureId,
        enemy: CreatureId,
    },

    #[error("no free battle")]
    NoFreeBattle,

    #[error("{victim} has no free {attack_type} slot")]
    NoSlot {
        victim: CreatureId,
        attack_type: AttackType,
    },

    #[error("{0} is not in a battle")]
    NotInBattle(CreatureId),

    #[error("{creature} is still linked into battle {battle}")]
    StillInBattle {
        creature: CreatureId,
        battle: BattleId,
    },

    #[error("no flee position for {0}")]
    NoFleePosition(CreatureId),
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CombatError::AlreadyInCombat(_) | CombatError::InvalidEnemy { .. } => {
                ErrorSeverity::Validation
            }
            CombatError::NoFreeBattle | CombatError::NoSlot { .. } => ErrorSeverity::Recoverable,
            CombatError::NotInBattle(_)
            | CombatError::StillInBattle { .. }
            | CombatError::NoFleePosition(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CombatError::AlreadyInCombat(_) => "COMBAT_ALREADY_IN_COMBAT",
            CombatError::InvalidEnemy { .. } => "COMBAT_INVALID_ENEMY",
            CombatError::NoFreeBattle => "COMBAT_NO_FREE_BATTLE",
            CombatError::NoSlot { .. } => "COMBAT_NO_SLOT",
            CombatError::NotInBattle(_) => "COMBAT_NOT_IN_BATTLE",
            CombatError::StillInBattle { .. } => "COMBAT_STILL_IN_BATTLE",
            CombatError::NoFleePosition(_) => "COMBAT_NO_FLEE_POSITION",
        }
    }
}
