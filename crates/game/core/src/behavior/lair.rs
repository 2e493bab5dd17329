//! Going home to sleep.

use crate::behavior::{MoveCheck, StateId, StateReturn};
use crate::engine::{EngineError, GameEngine, StateResult};
use crate::env::RoomJob;
use crate::state::{AnnoyReason, CreatureId, JobData, MoveFlags, RoomId};

/// A sleeper wakes up once healed and rested for at least this many turns.
const MIN_SLEEP_TURNS: u32 = 200;
/// Health regained per turn asleep, as a fraction of maximum health.
const SLEEP_HEAL_DIVISOR: u32 = 64;
/// Creatures without a lair look for one once per this many turns.
const LAIR_SEARCH_INTERVAL: u64 = 64;

impl<'a> GameEngine<'a> {
    pub(crate) fn creature_going_home_to_sleep(&mut self, creature: CreatureId) -> StateResult {
        let mut lair = self.world.control(creature).lair_room;
        if !self.creature_room_valid(creature, lair, RoomJob::Sleep)? {
            lair = self.claim_lair(creature)?;
        }
        let Some(center) = self.creature_room_center(creature, lair, RoomJob::Sleep)? else {
            let annoyance = self.model_of(creature)?.annoy_no_lair;
            self.anger_increase_creature_anger(creature, annoyance, AnnoyReason::NoLair);
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        };
        if let Err(error) =
            self.setup_move_to_position(creature, center, MoveFlags::empty(), StateId::AtLairToSleep)
        {
            tracing::debug!(%creature, room = %lair, %error, "lair unreachable");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        Ok(StateReturn::Modified)
    }

    /// Picks a new lair room. Returns `RoomId::NONE` if there is none.
    fn claim_lair(&mut self, creature: CreatureId) -> Result<RoomId, EngineError> {
        let record = self.world.creature(creature);
        let lair = self
            .env
            .rooms()?
            .find_room_for_job(record.owner, RoomJob::Sleep, record.position)
            .unwrap_or(RoomId::NONE);
        if let Some(control) = self.world.control_mut(creature) {
            control.lair_room = lair;
        }
        if lair.is_some() {
            tracing::debug!(%creature, room = %lair, "lair claimed");
        }
        Ok(lair)
    }

    pub(crate) fn at_lair_to_sleep(&mut self, creature: CreatureId) -> StateResult {
        let lair = self.world.control(creature).lair_room;
        if !self.creature_room_valid(creature, lair, RoomJob::Sleep)? {
            if let Some(control) = self.world.control_mut(creature) {
                control.lair_room = RoomId::NONE;
            }
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        if !self.world.add_creature_to_work_room(creature, lair) {
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        self.anger_set_creature_anger(creature, 0, AnnoyReason::NoLair);
        self.internal_set_thing_state(creature, StateId::CreatureSleep);
        if let Some(control) = self.world.control_mut(creature) {
            control.job = JobData::Sleep { turns_asleep: 0 };
        }
        Ok(StateReturn::Modified)
    }

    pub(crate) fn creature_sleep(&mut self, creature: CreatureId) -> StateResult {
        let lair = self.world.control(creature).work_room;
        if !self.creature_room_valid(creature, lair, RoomJob::Sleep)? {
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        if self.world.control(creature).has_attackers() && self.creature_look_for_combat(creature)? {
            return Ok(StateReturn::Modified);
        }
        let turns_asleep = match self.world.control(creature).job {
            JobData::Sleep { turns_asleep } => turns_asleep.saturating_add(1),
            _ => 1,
        };
        let Some((record, control)) = self.world.creature_and_control_mut(creature) else {
            return Ok(StateReturn::Deleted);
        };
        control.job = JobData::Sleep { turns_asleep };
        let heal = (record.max_health / SLEEP_HEAL_DIVISOR).max(1);
        record.health = record.health.saturating_add(heal).min(record.max_health);
        if record.health >= record.max_health && turns_asleep >= MIN_SLEEP_TURNS {
            tracing::debug!(%creature, turns_asleep, "woke up");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetOk);
        }
        Ok(StateReturn::Modified)
    }

    pub(crate) fn cleanup_sleep(&mut self, creature: CreatureId) {
        self.world.remove_creature_from_work_room(creature);
    }

    pub(crate) fn move_check_at_lair(&mut self, creature: CreatureId) -> Result<MoveCheck, EngineError> {
        let lair = self.world.control(creature).lair_room;
        if lair.is_none() || self.creature_room_valid(creature, lair, RoomJob::Sleep)? {
            return Ok(MoveCheck::Available);
        }
        tracing::debug!(%creature, room = %lair, "lair lost on the way");
        if let Some(control) = self.world.control_mut(creature) {
            control.lair_room = RoomId::NONE;
        }
        self.set_start_state(creature);
        Ok(MoveCheck::Continue)
    }

    /// Whether the creature should head home: it owns no lair yet, or it is
    /// badly hurt.
    pub(crate) fn creature_wants_sleep(&self, creature: CreatureId) -> Result<bool, EngineError> {
        if !self.model_of(creature)?.needs_lair {
            return Ok(false);
        }
        let record = self.world.creature(creature);
        if self.world.control(creature).lair_room.is_none() {
            return Ok((self.world.turn.0 + u64::from(creature.0)) % LAIR_SEARCH_INTERVAL == 0);
        }
        Ok(record.health < record.max_health / 2)
    }
}
