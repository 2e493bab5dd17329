//! State transitions and state queries.
//!
//! Three setters with different guarantees:
//! - [`GameEngine::internal_set_thing_state`] is used by state callbacks to
//!   hop between their own states. No cleanup runs.
//! - [`GameEngine::initialise_thing_state`] (aliased as
//!   [`GameEngine::set_state`]) is the explicit transition. It always succeeds
//!   and runs the cleanup of the state being left.
//! - [`GameEngine::external_set_thing_state`] is the need-driven transition.
//!   It is refused unless the current state's override flags let the
//!   requested need through.

use crate::behavior::{NeedCategory, StateId, StateType, state_info};
use crate::state::{ControlFlags, CreatureId, JobData, PlayerKind, RoomId};

use super::{GameEngine, TransitionError};

impl<'a> GameEngine<'a> {
    // ===== queries =====

    /// Active state, or the continue state while moving.
    pub fn get_creature_state_besides_move(&self, creature: CreatureId) -> StateId {
        let record = self.world.creature(creature);
        if state_info(record.active_state).state_type == StateType::Move {
            record.continue_state
        } else {
            record.active_state
        }
    }

    /// Like [`Self::get_creature_state_besides_move`], but also looks through
    /// fights and flight to the job they interrupted.
    pub fn get_creature_state_besides_interruptions(&self, creature: CreatureId) -> StateId {
        let record = self.world.creature(creature);
        let state_type = state_info(record.active_state).state_type;
        if state_type == StateType::Move || state_type.is_interruption() {
            record.continue_state
        } else {
            record.active_state
        }
    }

    pub fn get_creature_state_type(&self, creature: CreatureId) -> StateType {
        state_info(self.get_creature_state_besides_move(creature)).state_type
    }

    pub fn creature_is_doing_combat(&self, creature: CreatureId) -> bool {
        self.get_creature_state_besides_move(creature) == StateId::CreatureInCombat
    }

    /// Whether the current state lets `need` interrupt it.
    pub fn can_preempt(&self, creature: CreatureId, need: NeedCategory) -> bool {
        state_info(self.get_creature_state_besides_move(creature)).allows(need)
    }

    /// Whether a need-driven request for `requested` would be accepted.
    pub fn can_change_to_state(&self, creature: CreatureId, requested: StateId) -> bool {
        match state_info(requested).state_type.need() {
            Some(need) => self.can_preempt(creature, need),
            None => true,
        }
    }

    // ===== setters =====

    /// Switches state without cleanup. Drops the continue state and any
    /// in-progress instance.
    pub(crate) fn internal_set_thing_state(&mut self, creature: CreatureId, state: StateId) {
        let Some((record, control)) = self.world.creature_and_control_mut(creature) else {
            tracing::error!(%creature, %state, "cannot set state of missing creature");
            return;
        };
        record.active_state = state;
        record.continue_state = StateId::Unused;
        control.clear_instance();
    }

    /// Explicit transition: cleans up the state being left, then enters
    /// `state` with fresh per-state bookkeeping.
    pub fn initialise_thing_state(
        &mut self,
        creature: CreatureId,
        state: StateId,
    ) -> Result<(), TransitionError> {
        if !self.world.creature_exists(creature) {
            return Err(TransitionError::NoSuchCreature(creature));
        }
        self.cleanup_current_state(creature);

        let Some((record, control)) = self.world.creature_and_control_mut(creature) else {
            return Err(TransitionError::NoSuchCreature(creature));
        };
        tracing::debug!(%creature, from = %record.active_state, to = %state, "state change");
        record.active_state = state;
        record.continue_state = StateId::Unused;
        control.clear_instance();
        control.target_room = RoomId::NONE;
        control.job = JobData::None;
        control.turns_at_job = 0;
        let still_listed = control.flags.contains(ControlFlags::IN_ROOM_LIST);
        if still_listed {
            tracing::warn!(%creature, room = %control.work_room, "creature still in room list after cleanup");
            self.world.remove_creature_from_work_room(creature);
        }
        Ok(())
    }

    /// Explicit transition used by scripts and players. Always succeeds for a
    /// live creature.
    pub fn set_state(&mut self, creature: CreatureId, state: StateId) -> Result<(), TransitionError> {
        self.initialise_thing_state(creature, state)
    }

    /// Need-driven transition. Refused, with the creature left untouched,
    /// unless the current state's override flags allow the request's need.
    pub fn external_set_thing_state(
        &mut self,
        creature: CreatureId,
        state: StateId,
    ) -> Result<(), TransitionError> {
        if !self.world.creature_exists(creature) {
            return Err(TransitionError::NoSuchCreature(creature));
        }
        if let Some(need) = state_info(state).state_type.need() {
            if !self.can_preempt(creature, need) {
                let current = self.get_creature_state_besides_move(creature);
                tracing::warn!(%creature, %current, requested = %state, %need, "state change refused");
                return Err(TransitionError::Refused {
                    creature,
                    current,
                    requested: state,
                    need,
                });
            }
        }
        self.initialise_thing_state(creature, state)
    }

    /// Sends a creature back to its owner-dependent default state.
    pub fn set_start_state(&mut self, creature: CreatureId) {
        let owner = self.world.creature(creature).owner;
        let player = self.world.player(owner);
        let state = match player.kind {
            PlayerKind::Neutral => StateId::CreatureDormant,
            _ if !player.active => StateId::CreatureDormant,
            kind => match self.model_of(creature) {
                Ok(model) if kind == PlayerKind::Hero => model.good_start_state,
                Ok(model) => model.evil_start_state,
                Err(error) => {
                    tracing::error!(%creature, %error, "no model for start state");
                    if kind == PlayerKind::Hero {
                        StateId::GoodDoingNothing
                    } else {
                        StateId::CreatureDoingNothing
                    }
                }
            },
        };
        if let Err(error) = self.initialise_thing_state(creature, state) {
            tracing::error!(%creature, %error, "cannot set start state");
        }
    }

    /// Runs the cleanup of the state the creature is leaving.
    pub(crate) fn cleanup_current_state(&mut self, creature: CreatureId) {
        let state = self.get_creature_state_besides_move(creature);
        self.cleanup_state(state, creature);
    }
}
