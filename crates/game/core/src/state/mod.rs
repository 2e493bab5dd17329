//! Authoritative simulation state.
//!
//! [`World`] owns every pool the behavior engine touches: creatures, their
//! control records, the battle roster, room worker lists and player slots.
//! All pools reserve index 0 as a sentinel, so lookups by a stale or zero id
//! read a zeroed record instead of failing. Mutation goes through
//! [`crate::GameEngine`]; the list primitives here keep links consistent but
//! make no game decisions.
mod battle;
mod control;
mod creature;
mod error;
mod ids;
mod player;
mod pool;
mod rooms;

pub use battle::{BattleMembers, BattleRoster, CreatureBattle};
pub use control::{
    ActiveInstance, AnnoyReason, AttackType, CombatData, CombatFlags, CombatState, ControlFlags,
    CreatureControl, InstanceCooldown, JobData, MoodFlags, MoveFlags, OpponentSlots,
    SlotAdmission,
};
pub use creature::{Creature, CreatureSpawn};
pub use error::{LinkError, PoolError};
pub use ids::{
    BattleId, ControlIndex, CreatureId, GameTurn, InstanceId, ModelId, PlayerId, Position, RoomId,
};
pub use player::{BattleSides, BattlerList, PlayerKind, PlayerState, PlayerTendencies, Players};
pub use pool::{PoolIndex, SlotPool};
pub use rooms::{RoomMembers, RoomRoster, RoomWorkers};

use crate::config::GameConfig;

#[derive(Clone, Debug)]
pub struct World {
    /// RNG seed, fixed at level start.
    pub game_seed: u64,
    pub turn: GameTurn,
    pub creatures: SlotPool<CreatureId, Creature>,
    pub controls: SlotPool<ControlIndex, CreatureControl>,
    pub battles: BattleRoster,
    pub rooms: RoomRoster,
    pub players: Players,
}

impl World {
    pub fn new(game_seed: u64) -> Self {
        Self {
            game_seed,
            turn: GameTurn::ZERO,
            creatures: SlotPool::new(GameConfig::MAX_CREATURES),
            controls: SlotPool::new(GameConfig::MAX_CREATURES),
            battles: BattleRoster::new(),
            rooms: RoomRoster::new(),
            players: Players::new(),
        }
    }

    pub fn with_player(mut self, id: PlayerId, player: PlayerState) -> Self {
        self.players.set(id, player);
        self
    }

    /// Creature record, or the sentinel for a stale id.
    pub fn creature(&self, id: CreatureId) -> &Creature {
        self.creatures.get(id)
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.creatures.get_mut(id)
    }

    pub fn creature_exists(&self, id: CreatureId) -> bool {
        self.creatures.contains(id)
    }

    /// Control record of `id`, or the sentinel control.
    pub fn control(&self, id: CreatureId) -> &CreatureControl {
        self.controls.get(self.creatures.get(id).control)
    }

    pub fn control_mut(&mut self, id: CreatureId) -> Option<&mut CreatureControl> {
        let index = self.creatures.get(id).control;
        self.controls.get_mut(index)
    }

    /// Both halves of a creature at once.
    pub fn creature_and_control_mut(
        &mut self,
        id: CreatureId,
    ) -> Option<(&mut Creature, &mut CreatureControl)> {
        let creature = self.creatures.get_mut(id)?;
        let control = self.controls.get_mut(creature.control)?;
        Some((creature, control))
    }

    pub fn creature_ids(&self) -> impl Iterator<Item = CreatureId> + '_ {
        self.creatures.ids()
    }

    pub fn player(&self, id: PlayerId) -> &PlayerState {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id)
    }

    /// Allocates a creature together with its control record.
    ///
    /// Both pools are left untouched when either is exhausted.
    pub fn allocate_creature(&mut self, spawn: CreatureSpawn) -> Result<CreatureId, PoolError> {
        let id = self.creatures.allocate(Creature {
            model: spawn.model,
            owner: spawn.owner,
            position: spawn.position,
            health: spawn.max_health,
            max_health: spawn.max_health,
            level: spawn.level,
            created: self.turn,
            ..Creature::default()
        })?;
        match self.controls.allocate(CreatureControl::new(id)) {
            Ok(control) => {
                if let Some(creature) = self.creatures.get_mut(id) {
                    creature.control = control;
                }
                Ok(id)
            }
            Err(error) => {
                self.creatures.release(id)?;
                Err(error)
            }
        }
    }

    /// Frees a creature and its control record. Links must already be cleared.
    pub fn release_creature(&mut self, id: CreatureId) -> Result<(), PoolError> {
        let control = self.creatures.get(id).control;
        if !self.creatures.contains(id) {
            return Err(PoolError::NoSuchCreature(id));
        }
        if self.controls.contains(control) {
            self.controls.release(control)?;
        }
        self.creatures.release(id)?;
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(0)
    }
}
