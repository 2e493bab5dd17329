use arrayvec::ArrayVec;

use crate::behavior::StateReturn;
use crate::config::GameConfig;
use crate::error::{ErrorContext, GameError};
use crate::state::{CreatureId, CreatureSpawn, GameTurn, Position};

use super::instances::InstanceOutcome;
use super::{EngineError, GameEngine, StateResult, TransitionError};

/// Dispositions produced by one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnSummary {
    pub turn: GameTurn,
    pub deleted: u32,
    pub unchanged: u32,
    pub modified: u32,
    pub reset_ok: u32,
    pub reset_fail: u32,
    /// Ticks that failed with an error and were skipped.
    pub errors: u32,
}

impl TurnSummary {
    fn record(&mut self, disposition: StateReturn) {
        match disposition {
            StateReturn::Deleted => self.deleted += 1,
            StateReturn::Unchanged => self.unchanged += 1,
            StateReturn::Modified => self.modified += 1,
            StateReturn::ResetOk => self.reset_ok += 1,
            StateReturn::ResetFail => self.reset_fail += 1,
        }
    }

    pub fn ticks(&self) -> u32 {
        self.deleted + self.unchanged + self.modified + self.reset_ok + self.reset_fail
    }
}

impl<'a> GameEngine<'a> {
    pub fn turn(&self) -> GameTurn {
        self.world.turn
    }

    /// Advances the game turn and gives every live creature exactly one tick,
    /// in index order. Creatures destroyed earlier in the sweep are skipped.
    pub fn process_turn(&mut self) -> TurnSummary {
        self.world.turn = self.world.turn + 1;
        let mut summary = TurnSummary {
            turn: self.world.turn,
            ..TurnSummary::default()
        };
        let creatures: ArrayVec<CreatureId, { GameConfig::MAX_CREATURES }> =
            self.world.creature_ids().collect();
        for creature in creatures {
            if !self.world.creature_exists(creature) {
                continue;
            }
            match self.run_creature_tick(creature) {
                Ok(disposition) => summary.record(disposition),
                Err(error) => {
                    let context = ErrorContext::new(summary.turn)
                        .with_creature(creature)
                        .with_position(self.world.creature(creature).position);
                    tracing::error!(
                        ?context,
                        severity = error.severity().as_str(),
                        code = error.error_code(),
                        %error,
                        "creature tick failed"
                    );
                    summary.errors += 1;
                }
            }
        }
        tracing::debug!(turn = %summary.turn, ticks = summary.ticks(), "turn processed");
        summary
    }

    /// Runs one turn of `creature`: advances its instance, then dispatches its
    /// active state.
    ///
    /// After `Deleted` the creature's records are gone and must not be used.
    pub fn run_creature_tick(&mut self, creature: CreatureId) -> StateResult {
        if !self.world.creature_exists(creature) {
            return Err(TransitionError::NoSuchCreature(creature).into());
        }
        if let InstanceOutcome::Fired { .. } = self.process_creature_instance(creature)? {
            if !self.world.creature_exists(creature) {
                return Ok(StateReturn::Deleted);
            }
        }
        let state = self.world.creature(creature).active_state;
        let disposition = self.process_state(state, creature)?;
        if disposition != StateReturn::Deleted && !self.world.creature_exists(creature) {
            tracing::error!(%creature, %state, "state removed creature without reporting it");
            return Ok(StateReturn::Deleted);
        }
        Ok(disposition)
    }

    /// Creates a creature and puts it into its start state.
    pub fn create_creature(&mut self, spawn: CreatureSpawn) -> Result<CreatureId, EngineError> {
        let creature = self.world.allocate_creature(spawn)?;
        self.set_start_state(creature);
        tracing::debug!(%creature, model = %spawn.model, owner = %spawn.owner, "creature created");
        Ok(creature)
    }

    /// Removes every trace of `creature` (combat, battle, work room) and frees
    /// its records.
    pub fn destroy_creature(&mut self, creature: CreatureId) -> Result<(), EngineError> {
        if !self.world.creature_exists(creature) {
            return Err(TransitionError::NoSuchCreature(creature).into());
        }
        self.cleanup_current_state(creature);
        self.remove_all_traces_of_combat(creature);
        self.world.remove_creature_from_work_room(creature);
        self.world.release_creature(creature)?;
        tracing::debug!(%creature, "creature destroyed");
        Ok(())
    }

    /// Places a creature picked up by its keeper. Fear is ignored for a while
    /// after a drop.
    pub fn drop_creature(&mut self, creature: CreatureId, position: Position) {
        let turn = self.world.turn;
        if let Some((record, control)) = self.world.creature_and_control_mut(creature) {
            record.position = position;
            control.dropped_turn = Some(turn);
        }
    }
}
