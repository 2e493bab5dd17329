//! Training room work.

use crate::behavior::{MoveCheck, StateId, StateReturn};
use crate::config::GameConfig;
use crate::engine::{EngineError, GameEngine, StateResult};
use crate::env::RoomJob;
use crate::state::{CreatureId, JobData};

/// Turns between two practice swings.
const TRAINING_SWING_INTERVAL: u64 = 8;
/// Swings needed to gain a level.
const SWINGS_PER_LEVEL: u32 = 32;

impl<'a> GameEngine<'a> {
    /// Sends the creature to the nearest training room of its owner.
    pub fn creature_go_train(&mut self, creature: CreatureId) -> Result<bool, EngineError> {
        if self.world.creature(creature).level >= GameConfig::MAX_LEVEL {
            return Ok(false);
        }
        self.send_creature_to_room(creature, RoomJob::Train, StateId::AtTrainingRoom)
    }

    pub(crate) fn at_training_room(&mut self, creature: CreatureId) -> StateResult {
        let room = self.world.control(creature).target_room;
        if !self.creature_room_valid(creature, room, RoomJob::Train)? {
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        let capacity = self.env.rooms()?.room(room).map_or(0, |info| info.capacity);
        if self.world.rooms.get(room).workers_num >= capacity {
            tracing::debug!(%creature, %room, capacity, "training room full");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        if !self.world.add_creature_to_work_room(creature, room) {
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        let turn = self.world.turn;
        self.internal_set_thing_state(creature, StateId::Training);
        if let Some(control) = self.world.control_mut(creature) {
            control.job = JobData::Training {
                turns_trained: 0,
                next_swing_turn: turn + TRAINING_SWING_INTERVAL,
            };
        }
        Ok(StateReturn::Modified)
    }

    pub(crate) fn creature_training(&mut self, creature: CreatureId) -> StateResult {
        let room = self.world.control(creature).work_room;
        if !self.creature_room_valid(creature, room, RoomJob::Train)? {
            tracing::debug!(%creature, %room, "training room gone");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        if self.creature_look_for_combat(creature)? {
            return Ok(StateReturn::Modified);
        }
        let turn = self.world.turn;
        let JobData::Training {
            turns_trained,
            next_swing_turn,
        } = self.world.control(creature).job
        else {
            tracing::error!(%creature, "training without training data");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        };
        if turn < next_swing_turn {
            return Ok(StateReturn::Unchanged);
        }

        let turns_trained = turns_trained.saturating_add(1);
        let Some((record, control)) = self.world.creature_and_control_mut(creature) else {
            return Ok(StateReturn::Deleted);
        };
        control.turns_at_job = control.turns_at_job.saturating_add(1);
        if turns_trained < SWINGS_PER_LEVEL {
            control.job = JobData::Training {
                turns_trained,
                next_swing_turn: turn + TRAINING_SWING_INTERVAL,
            };
            return Ok(StateReturn::Modified);
        }
        record.level = (record.level + 1).min(GameConfig::MAX_LEVEL);
        let level = record.level;
        tracing::debug!(%creature, level, "level gained in training");
        self.set_start_state(creature);
        Ok(StateReturn::ResetOk)
    }

    pub(crate) fn cleanup_training(&mut self, creature: CreatureId) {
        self.world.remove_creature_from_work_room(creature);
    }

    pub(crate) fn move_check_at_training_room(&mut self, creature: CreatureId) -> Result<MoveCheck, EngineError> {
        self.move_check_room_still_valid(creature, RoomJob::Train)
    }
}
