//! Rallying to a keeper's call to arms.

use crate::behavior::{StateId, StateReturn};
use crate::engine::{EngineError, GameEngine, StateResult};
use crate::state::{CreatureId, JobData, MoveFlags, Position};

impl<'a> GameEngine<'a> {
    /// Sends `creature` to `rally`. Fails when its current state doesn't let
    /// the call preempt it or the rally point is out of reach.
    pub fn creature_answer_call_to_arms(
        &mut self,
        creature: CreatureId,
        rally: Position,
    ) -> Result<(), EngineError> {
        self.external_set_thing_state(creature, StateId::ArriveAtCallToArms)?;
        if let Some(control) = self.world.control_mut(creature) {
            control.job = JobData::CallToArms { rally_point: rally };
        }
        if let Err(error) =
            self.setup_move_to_position(creature, rally, MoveFlags::empty(), StateId::ArriveAtCallToArms)
        {
            self.set_start_state(creature);
            return Err(error);
        }
        Ok(())
    }

    pub(crate) fn arrive_at_call_to_arms(&mut self, creature: CreatureId) -> StateResult {
        if self.creature_look_for_combat(creature)? {
            return Ok(StateReturn::Modified);
        }
        let JobData::CallToArms { rally_point } = self.world.control(creature).job else {
            tracing::debug!(%creature, "no rally point");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        };
        let here = self.world.creature(creature).position;
        if here.distance_to(rally_point) <= Position::UNITS_PER_SLAB {
            return Ok(StateReturn::Unchanged);
        }
        match self.setup_move_to_position(creature, rally_point, MoveFlags::empty(), StateId::ArriveAtCallToArms) {
            Ok(()) => Ok(StateReturn::Modified),
            Err(error) => {
                tracing::debug!(%creature, %error, "rally point lost");
                self.set_start_state(creature);
                Ok(StateReturn::ResetFail)
            }
        }
    }

    /// Releases a creature from the call. Creatures doing something else are
    /// left alone.
    pub fn end_call_to_arms(&mut self, creature: CreatureId) {
        if self.get_creature_state_besides_move(creature) == StateId::ArriveAtCallToArms {
            self.set_start_state(creature);
        }
    }
}
