//! Idle states and the need evaluation that runs from them.

use crate::behavior::{StateId, StateReturn};
use crate::engine::{EngineError, GameEngine, StateResult};
use crate::state::{ControlFlags, CreatureId, JobData};

/// Turns between two random walks of an idle creature.
const WANDER_INTERVAL: u64 = 16;

impl<'a> GameEngine<'a> {
    pub(crate) fn creature_doing_nothing(&mut self, creature: CreatureId) -> StateResult {
        if self.world.control(creature).flags.contains(ControlFlags::NO_COMP_CONTROL) {
            return Ok(StateReturn::Unchanged);
        }
        if self.creature_look_for_combat(creature)? {
            return Ok(StateReturn::Modified);
        }
        let owner = self.world.creature(creature).owner;
        if self.world.player(owner).has_dungeon() && self.process_creature_needs(creature)? {
            return Ok(StateReturn::Modified);
        }
        self.creature_wander(creature, StateId::CreatureDoingNothing)
    }

    /// Heroes only look for fights and roam.
    pub(crate) fn good_doing_nothing(&mut self, creature: CreatureId) -> StateResult {
        if self.creature_look_for_combat(creature)? {
            return Ok(StateReturn::Modified);
        }
        self.creature_wander(creature, StateId::GoodDoingNothing)
    }

    /// Dormant creatures stay put until someone attacks them.
    pub(crate) fn creature_dormant(&mut self, creature: CreatureId) -> StateResult {
        if self.world.control(creature).has_attackers() && self.creature_look_for_combat(creature)? {
            return Ok(StateReturn::Modified);
        }
        Ok(StateReturn::Unchanged)
    }

    /// Picks the first pressing need of a keeper creature and switches to the
    /// state serving it. Order: pay, anger, sleep, training.
    fn process_creature_needs(&mut self, creature: CreatureId) -> Result<bool, EngineError> {
        if self.creature_is_due_salary(creature)?
            && self
                .external_set_thing_state(creature, StateId::CreatureWantsSalary)
                .is_ok()
        {
            return Ok(true);
        }
        if self.process_anger_need(creature)? {
            return Ok(true);
        }
        if self.creature_wants_sleep(creature)?
            && self
                .external_set_thing_state(creature, StateId::CreatureGoingHomeToSleep)
                .is_ok()
        {
            return Ok(true);
        }
        self.creature_go_train(creature)
    }

    fn creature_wander(&mut self, creature: CreatureId, idle_state: StateId) -> StateResult {
        let turn = self.world.turn;
        if let JobData::Idle { next_wander_turn, .. } = self.world.control(creature).job {
            if turn < next_wander_turn {
                return Ok(StateReturn::Unchanged);
            }
        }
        if !self.creature_choose_random_destination_nearby(creature, idle_state)? {
            return Ok(StateReturn::Unchanged);
        }
        if let Some(control) = self.world.control_mut(creature) {
            let wander_target = control.moveto_pos;
            control.job = JobData::Idle {
                wander_target,
                next_wander_turn: turn + WANDER_INTERVAL,
            };
        }
        Ok(StateReturn::Modified)
    }
}
