//! Resolution of a state id to its callbacks.

use crate::behavior::{MoveCheck, StateId, StateReturn};
use crate::state::CreatureId;

use super::{EngineError, GameEngine, StateResult};

impl<'a> GameEngine<'a> {
    /// Runs the process callback of `state` for one turn.
    pub(crate) fn process_state(&mut self, state: StateId, creature: CreatureId) -> StateResult {
        match state {
            StateId::Unused => {
                self.set_start_state(creature);
                Ok(StateReturn::ResetFail)
            }
            StateId::MoveToPosition => self.move_to_position(creature),
            StateId::CreatureDoingNothing => self.creature_doing_nothing(creature),
            StateId::GoodDoingNothing => self.good_doing_nothing(creature),
            StateId::CreatureDormant => self.creature_dormant(creature),
            StateId::CreatureGoingHomeToSleep => self.creature_going_home_to_sleep(creature),
            StateId::AtLairToSleep => self.at_lair_to_sleep(creature),
            StateId::CreatureSleep => self.creature_sleep(creature),
            StateId::AtTrainingRoom => self.at_training_room(creature),
            StateId::Training => self.creature_training(creature),
            StateId::CreatureWantsSalary => self.creature_wants_salary(creature),
            StateId::CreatureTakeSalary => self.creature_take_salary(creature),
            StateId::PersonSulkHeadForLair => self.person_sulk_head_for_lair(creature),
            StateId::PersonSulking => self.person_sulking(creature),
            StateId::ArriveAtCallToArms => self.arrive_at_call_to_arms(creature),
            StateId::CreatureInCombat => self.creature_in_combat(creature),
            StateId::CreatureCombatFlee => self.creature_combat_flee(creature),
            StateId::CreatureObjectCombat => self.creature_object_combat(creature),
            StateId::CreatureDoorCombat => self.creature_door_combat(creature),
            StateId::CreatureLeaves => self.creature_leaves(creature),
            StateId::CreatureUnconscious => self.creature_unconscious(creature),
        }
    }

    /// Releases what `state` holds. Runs on every transition away from it.
    pub(crate) fn cleanup_state(&mut self, state: StateId, creature: CreatureId) {
        match state {
            StateId::CreatureInCombat => self.cleanup_combat(creature),
            StateId::CreatureObjectCombat => self.cleanup_object_combat(creature),
            StateId::CreatureDoorCombat => self.cleanup_door_combat(creature),
            StateId::AtLairToSleep | StateId::CreatureSleep => self.cleanup_sleep(creature),
            StateId::AtTrainingRoom | StateId::Training => self.cleanup_training(creature),
            StateId::PersonSulking => self.cleanup_sulking(creature),
            StateId::CreatureCombatFlee => self.cleanup_combat_flee(creature),
            _ => {}
        }
    }

    /// Lets the continue state of a move composition confirm or veto it.
    pub(crate) fn move_check(
        &mut self,
        state: StateId,
        creature: CreatureId,
    ) -> Result<MoveCheck, EngineError> {
        match state {
            StateId::AtLairToSleep => self.move_check_at_lair(creature),
            StateId::AtTrainingRoom => self.move_check_at_training_room(creature),
            StateId::CreatureTakeSalary => self.move_check_at_treasury(creature),
            StateId::PersonSulking => self.move_check_at_lair(creature),
            StateId::GoodDoingNothing | StateId::ArriveAtCallToArms => {
                self.move_check_attack_any_creature(creature)
            }
            _ => Ok(MoveCheck::Available),
        }
    }
}
