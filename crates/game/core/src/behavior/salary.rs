//! Payday.

use crate::behavior::{MoveCheck, StateId, StateReturn};
use crate::engine::{EngineError, GameEngine, StateResult};
use crate::env::RoomJob;
use crate::state::{AnnoyReason, CreatureId};

impl<'a> GameEngine<'a> {
    /// Whether a salaried keeper creature has gone a full interval without
    /// pay and without trying to collect it.
    pub fn creature_is_due_salary(&self, creature: CreatureId) -> Result<bool, EngineError> {
        if self.model_of(creature)?.salary == 0 {
            return Ok(false);
        }
        if !self.world.player(self.world.creature(creature).owner).has_dungeon() {
            return Ok(false);
        }
        let interval = self.env.config()?.salary_interval();
        let turn = self.world.turn;
        let control = self.world.control(creature);
        Ok(turn.since(control.last_paid) >= interval && turn.since(control.last_salary_check) >= interval)
    }

    pub(crate) fn creature_wants_salary(&mut self, creature: CreatureId) -> StateResult {
        let turn = self.world.turn;
        if let Some(control) = self.world.control_mut(creature) {
            control.last_salary_check = turn;
        }
        if self.send_creature_to_room(creature, RoomJob::TakeSalary, StateId::CreatureTakeSalary)? {
            return Ok(StateReturn::Modified);
        }
        self.creature_not_paid(creature)?;
        self.set_start_state(creature);
        Ok(StateReturn::ResetFail)
    }

    pub(crate) fn creature_take_salary(&mut self, creature: CreatureId) -> StateResult {
        let room = self.world.control(creature).target_room;
        if !self.creature_room_valid(creature, room, RoomJob::TakeSalary)? {
            self.creature_not_paid(creature)?;
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        let turn = self.world.turn;
        if let Some(control) = self.world.control_mut(creature) {
            control.last_paid = turn;
        }
        self.anger_set_creature_anger(creature, 0, AnnoyReason::NotPaid);
        tracing::debug!(%creature, %room, "salary taken");
        self.set_start_state(creature);
        Ok(StateReturn::ResetOk)
    }

    fn creature_not_paid(&mut self, creature: CreatureId) -> Result<(), EngineError> {
        let annoyance = self.model_of(creature)?.annoy_no_salary;
        tracing::debug!(%creature, "no treasury to collect salary from");
        self.anger_increase_creature_anger(creature, annoyance, AnnoyReason::NotPaid);
        Ok(())
    }

    pub(crate) fn move_check_at_treasury(&mut self, creature: CreatureId) -> Result<MoveCheck, EngineError> {
        self.move_check_room_still_valid(creature, RoomJob::TakeSalary)
    }
}
