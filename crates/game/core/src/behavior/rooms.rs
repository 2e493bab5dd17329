//! Shared plumbing of room-bound jobs.

use crate::behavior::{MoveCheck, StateId};
use crate::engine::{EngineError, GameEngine};
use crate::env::RoomJob;
use crate::state::{CreatureId, MoveFlags, Position, RoomId};

impl<'a> GameEngine<'a> {
    /// Whether `room` still belongs to the creature's owner and still hosts `job`.
    pub fn creature_room_valid(&self, creature: CreatureId, room: RoomId, job: RoomJob) -> Result<bool, EngineError> {
        if room.is_none() {
            return Ok(false);
        }
        let owner = self.world.creature(creature).owner;
        Ok(self.env.rooms()?.still_valid_for_job(room, owner, job))
    }

    /// Centre of `room` while it is still valid for `job`.
    pub(crate) fn creature_room_center(
        &self,
        creature: CreatureId,
        room: RoomId,
        job: RoomJob,
    ) -> Result<Option<Position>, EngineError> {
        if !self.creature_room_valid(creature, room, job)? {
            return Ok(None);
        }
        Ok(self.env.rooms()?.room(room).map(|info| info.center))
    }

    /// Picks a room for `job` and walks there, resuming `arrival` on the spot.
    /// Returns false, leaving the creature as it was, when there is no
    /// reachable room.
    pub(crate) fn send_creature_to_room(
        &mut self,
        creature: CreatureId,
        job: RoomJob,
        arrival: StateId,
    ) -> Result<bool, EngineError> {
        let rooms = self.env.rooms()?;
        let record = self.world.creature(creature);
        let Some(room) = rooms.find_room_for_job(record.owner, job, record.position) else {
            tracing::debug!(%creature, %job, "no room for job");
            return Ok(false);
        };
        let Some(center) = rooms.room(room).map(|info| info.center) else {
            return Ok(false);
        };
        let previous = self.world.control(creature).target_room;
        if let Some(control) = self.world.control_mut(creature) {
            control.target_room = room;
        }
        if let Err(error) = self.setup_move_to_position(creature, center, MoveFlags::empty(), arrival) {
            tracing::debug!(%creature, %room, %error, "room unreachable");
            if let Some(control) = self.world.control_mut(creature) {
                control.target_room = previous;
            }
            return Ok(false);
        }
        Ok(true)
    }

    /// Move check of room-bound arrival states: the target room must survive
    /// the walk.
    pub(crate) fn move_check_room_still_valid(
        &mut self,
        creature: CreatureId,
        job: RoomJob,
    ) -> Result<MoveCheck, EngineError> {
        let room = self.world.control(creature).target_room;
        if self.creature_room_valid(creature, room, job)? {
            return Ok(MoveCheck::Available);
        }
        tracing::debug!(%creature, %room, %job, "room lost on the way");
        self.set_start_state(creature);
        Ok(MoveCheck::Continue)
    }
}
