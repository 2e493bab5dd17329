//! Leaving the dungeon and being knocked out.

use crate::behavior::{StateId, StateReturn};
use crate::engine::{EngineError, GameEngine, StateResult};
use crate::env::MoveStep;
use crate::state::{CreatureId, JobData};

/// Fraction of maximum health a creature wakes up with.
const WAKE_HEALTH_DIVISOR: u32 = 4;

impl<'a> GameEngine<'a> {
    /// Walks to the nearest exit and vanishes there. A creature with no way
    /// out vanishes on the spot.
    pub(crate) fn creature_leaves(&mut self, creature: CreatureId) -> StateResult {
        let exit = match self.world.control(creature).job {
            JobData::Leaving { exit } => Some(exit),
            _ => {
                let here = self.world.creature(creature).position;
                let exit = self.env.navigation()?.find_hero_gate(creature, here);
                if let (Some(exit), Some(control)) = (exit, self.world.control_mut(creature)) {
                    control.job = JobData::Leaving { exit };
                }
                exit
            }
        };
        let Some(exit) = exit else {
            tracing::info!(%creature, "left the dungeon");
            self.destroy_creature(creature)?;
            return Ok(StateReturn::Deleted);
        };
        match self.creature_move_to(creature, exit)? {
            MoveStep::Progressing(_) => Ok(StateReturn::Modified),
            MoveStep::Arrived | MoveStep::Blocked => {
                tracing::info!(%creature, "left the dungeon");
                self.destroy_creature(creature)?;
                Ok(StateReturn::Deleted)
            }
        }
    }

    /// Knocks `creature` out for `turns` turns, ending whatever it was doing.
    pub fn knock_out_creature(&mut self, creature: CreatureId, turns: u32) -> Result<(), EngineError> {
        self.set_state(creature, StateId::CreatureUnconscious)?;
        if let Some(control) = self.world.control_mut(creature) {
            control.job = JobData::Unconscious {
                remaining_turns: turns,
            };
        }
        tracing::debug!(%creature, turns, "knocked out");
        Ok(())
    }

    pub(crate) fn creature_unconscious(&mut self, creature: CreatureId) -> StateResult {
        let remaining_turns = match self.world.control(creature).job {
            JobData::Unconscious { remaining_turns } => remaining_turns,
            _ => 0,
        };
        if remaining_turns > 0 {
            if let Some(control) = self.world.control_mut(creature) {
                control.job = JobData::Unconscious {
                    remaining_turns: remaining_turns - 1,
                };
            }
            return Ok(StateReturn::Unchanged);
        }
        if let Some(record) = self.world.creature_mut(creature) {
            let floor = (record.max_health / WAKE_HEALTH_DIVISOR).max(1);
            record.health = record.health.max(floor);
        }
        tracing::debug!(%creature, "regained consciousness");
        self.set_start_state(creature);
        Ok(StateReturn::ResetOk)
    }
}
