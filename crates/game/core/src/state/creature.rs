use crate::behavior::StateId;

use super::{ControlIndex, GameTurn, ModelId, PlayerId, Position};

/// A creature entity: identity, placement, health and the state machine slots.
///
/// Behavior bookkeeping lives in the [`super::CreatureControl`] record at
/// `control`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Creature {
    pub model: ModelId,
    pub owner: PlayerId,
    pub position: Position,
    pub health: u32,
    pub max_health: u32,
    pub level: u8,
    pub created: GameTurn,
    pub active_state: StateId,
    /// State to resume when `active_state` is a move composition.
    pub continue_state: StateId,
    pub control: ControlIndex,
}

impl Creature {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Spawn parameters for [`crate::GameEngine::create_creature`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatureSpawn {
    pub model: ModelId,
    pub owner: PlayerId,
    pub position: Position,
    pub max_health: u32,
    pub level: u8,
}

impl CreatureSpawn {
    pub fn new(model: ModelId, owner: PlayerId, position: Position) -> Self {
        Self {
            model,
            owner,
            position,
            max_health: 100,
            level: 1,
        }
    }

    pub fn with_health(mut self, max_health: u32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }
}
