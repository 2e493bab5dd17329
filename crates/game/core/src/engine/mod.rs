//! Per-turn creature processing.
//!
//! The [`GameEngine`] is the only writer of [`World`]. It pairs the world with
//! the collaborator bundle ([`GameEnv`]) and exposes the state machine entry
//! points: the per-turn sweep, single-creature ticks, transitions and
//! creature lifecycle. State behaviors and the combat sub-engine extend it
//! with further `impl GameEngine` blocks in their own modules.

mod dispatch;
mod errors;
mod instances;
mod movement;
mod transition;
mod turns;

pub use errors::{EngineError, TransitionError};
pub use turns::TurnSummary;

use crate::behavior::StateReturn;
use crate::env::{CombatRules, CreatureModel, GameEnv};
use crate::state::{CreatureId, World};

/// Result of a state callback.
pub type StateResult = Result<StateReturn, EngineError>;

/// Behavior engine bound to one world and one set of collaborators.
pub struct GameEngine<'a> {
    pub(crate) world: &'a mut World,
    pub(crate) env: GameEnv<'a>,
}

impl<'a> GameEngine<'a> {
    pub fn new(world: &'a mut World, env: GameEnv<'a>) -> Self {
        Self { world, env }
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    pub fn env(&self) -> GameEnv<'a> {
        self.env
    }

    /// Combat thresholds from the rules collaborator.
    pub(crate) fn rules(&self) -> Result<CombatRules, EngineError> {
        Ok(self.env.combat_rules()?)
    }

    /// Model of a live creature.
    pub(crate) fn model_of(&self, creature: CreatureId) -> Result<&'a CreatureModel, EngineError> {
        Ok(self.env.creature_model(self.world.creature(creature).model)?)
    }
}
