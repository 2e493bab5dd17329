//! Per-room worker lists.
//!
//! Rooms themselves belong to the room collaborator; the engine only tracks
//! which creatures are currently working in each room, using the same
//! intrusive-link scheme as battles (`room_prev`/`room_next` on the control).

use arrayvec::ArrayVec;

use crate::config::GameConfig;

use super::{ControlFlags, CreatureId, LinkError, RoomId, World};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomWorkers {
    pub first_worker: CreatureId,
    pub workers_num: u16,
}

pub type RoomMembers = ArrayVec<CreatureId, { GameConfig::MAX_CREATURES }>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomRoster {
    rooms: Vec<RoomWorkers>,
}

impl RoomRoster {
    pub fn new() -> Self {
        Self {
            rooms: vec![RoomWorkers::default(); GameConfig::MAX_ROOMS],
        }
    }

    pub fn is_valid(&self, id: RoomId) -> bool {
        id.is_some() && id.index() < self.rooms.len()
    }

    pub fn get(&self, id: RoomId) -> &RoomWorkers {
        if self.is_valid(id) {
            &self.rooms[id.index()]
        } else {
            &self.rooms[0]
        }
    }

    fn get_mut(&mut self, id: RoomId) -> Option<&mut RoomWorkers> {
        if self.is_valid(id) {
            self.rooms.get_mut(id.index())
        } else {
            None
        }
    }

    pub fn initialise(&mut self) {
        self.rooms.fill(RoomWorkers::default());
    }
}

impl Default for RoomRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Links `creature` at the head of `room`'s worker list and records the
    /// room as its work room.
    pub fn add_creature_to_work_room(&mut self, creature: CreatureId, room: RoomId) -> bool {
        if self.control(creature).flags.contains(ControlFlags::IN_ROOM_LIST) {
            tracing::warn!(%creature, %room, "creature already in a room list");
            return false;
        }
        let old_head = self.rooms.get(room).first_worker;
        let Some(record) = self.rooms.get_mut(room) else {
            tracing::error!(%creature, %room, "cannot work in invalid room");
            return false;
        };
        record.first_worker = creature;
        record.workers_num += 1;

        if let Some(control) = self.control_mut(creature) {
            control.work_room = room;
            control.room_prev = CreatureId::NONE;
            control.room_next = old_head;
            control.flags.insert(ControlFlags::IN_ROOM_LIST);
        }
        if old_head.is_some() {
            if let Some(head) = self.control_mut(old_head) {
                head.room_prev = creature;
            }
        }
        true
    }

    /// Unlinks `creature` from its work room list. No-op when not listed.
    pub fn remove_creature_from_work_room(&mut self, creature: CreatureId) {
        let control = self.control(creature);
        if !control.flags.contains(ControlFlags::IN_ROOM_LIST) {
            return;
        }
        let room = control.work_room;
        let prev = control.room_prev;
        let next = control.room_next;

        if prev.is_some() {
            if let Some(prev_control) = self.control_mut(prev) {
                prev_control.room_next = next;
            }
        } else if let Some(record) = self.rooms.get_mut(room) {
            record.first_worker = next;
        }
        if next.is_some() {
            if let Some(next_control) = self.control_mut(next) {
                next_control.room_prev = prev;
            }
        }
        if let Some(record) = self.rooms.get_mut(room) {
            if record.workers_num > 0 {
                record.workers_num -= 1;
            } else {
                tracing::error!(%creature, %room, "removing worker, but counter is 0");
            }
        }
        if let Some(control) = self.control_mut(creature) {
            control.room_prev = CreatureId::NONE;
            control.room_next = CreatureId::NONE;
            control.work_room = RoomId::NONE;
            control.flags.remove(ControlFlags::IN_ROOM_LIST);
        }
    }

    /// Walks the worker list of `room`, bounded by the creature pool size.
    pub fn room_workers(&self, room: RoomId) -> Result<RoomMembers, LinkError> {
        let mut members = RoomMembers::new();
        let budget = GameConfig::MAX_CREATURES;
        let mut cursor = self.rooms.get(room).first_worker;
        while cursor.is_some() {
            if !self.creature_exists(cursor) {
                tracing::error!(%room, creature = %cursor, "jump to invalid creature in room list");
                return Err(LinkError::RoomBroken {
                    room,
                    creature: cursor,
                });
            }
            if members.try_push(cursor).is_err() {
                tracing::error!(%room, budget, "infinite loop detected when sweeping room list");
                return Err(LinkError::RoomOverrun { room, budget });
            }
            cursor = self.control(cursor).room_next;
        }
        Ok(members)
    }
}
