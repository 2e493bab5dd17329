//! Per-creature mutable AI record.
//!
//! A [`CreatureControl`] is allocated alongside each creature and holds
//! everything the state machine and combat engine keep between turns: combat
//! flags and opponent slots, anger levels, battle links, flee and move targets,
//! job scratch data and the active instance.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::GameConfig;
use crate::env::Obstacle;

use super::{BattleId, CreatureId, GameTurn, InstanceId, Position, RoomId};

bitflags! {
    /// Lifecycle flags of a control record.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ControlFlags: u8 {
        const EXISTS          = 1 << 0;
        /// Scripted creature the need evaluators leave alone.
        const NO_COMP_CONTROL = 1 << 1;
        const IN_ROOM_LIST    = 1 << 2;
    }
}

bitflags! {
    /// What the creature is currently fighting and how.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CombatFlags: u8 {
        const MELEE        = 1 << 0;
        const RANGED       = 1 << 1;
        const WAITING      = 1 << 2;
        const OBJECT_FIGHT = 1 << 3;
        const DOOR_FIGHT   = 1 << 4;
    }
}

impl CombatFlags {
    /// Creature-versus-creature engagement bits.
    pub const CREATURE_FIGHT: Self = Self::MELEE.union(Self::RANGED).union(Self::WAITING);
    /// Engagement bits that may coexist with a pending creature fight.
    pub const OBSTACLE_FIGHT: Self = Self::OBJECT_FIGHT.union(Self::DOOR_FIGHT);
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MoodFlags: u8 {
        const ANGRY = 1 << 0;
        const LIVID = 1 << 1;
    }
}

bitflags! {
    /// Routing hints passed to the navigation collaborator.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MoveFlags: u8 {
        const AVOID_HAZARDS = 1 << 0;
        const NO_TELEPORT   = 1 << 1;
    }
}

/// Preferred or assigned attack style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackType {
    #[default]
    Unset,
    Melee,
    Ranged,
}

/// Combat sub-state of a creature in `CreatureInCombat`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatState {
    #[default]
    None,
    Waiting,
    Ranged,
    Melee,
}

impl CombatState {
    pub const fn flag(self) -> CombatFlags {
        match self {
            CombatState::None => CombatFlags::empty(),
            CombatState::Waiting => CombatFlags::WAITING,
            CombatState::Ranged => CombatFlags::RANGED,
            CombatState::Melee => CombatFlags::MELEE,
        }
    }
}

/// Reason a creature is annoyed. `None` is a placeholder slot and never
/// contributes to mood.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnoyReason {
    None = 0,
    NotPaid = 1,
    Hungry = 2,
    NoLair = 3,
    Other = 4,
}

impl AnnoyReason {
    /// Reasons that count toward mood.
    pub const MOODY: [AnnoyReason; 4] = [
        AnnoyReason::NotPaid,
        AnnoyReason::Hungry,
        AnnoyReason::NoLair,
        AnnoyReason::Other,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Fixed array of opponent ids with an explicit occupancy count.
///
/// Free slots hold [`CreatureId::NONE`]. Admission against the configured
/// limit is the caller's job; the array itself never holds more than
/// [`GameConfig::MAX_OPPONENTS`] ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpponentSlots {
    ids: [CreatureId; GameConfig::MAX_OPPONENTS],
    count: u8,
}

/// Result of an admission attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotAdmission {
    Added,
    AlreadyPresent,
    Full,
}

impl OpponentSlots {
    pub fn count(&self) -> usize {
        usize::from(self.count)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn has_capacity(&self, limit: usize) -> bool {
        self.count() < limit.min(GameConfig::MAX_OPPONENTS)
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        id.is_some() && self.ids.contains(&id)
    }

    /// Raw slot contents, including empty slots.
    pub fn slots(&self) -> &[CreatureId; GameConfig::MAX_OPPONENTS] {
        &self.ids
    }

    pub fn occupied(&self) -> impl Iterator<Item = CreatureId> + '_ {
        self.ids.iter().copied().filter(|id| id.is_some())
    }

    /// Puts `id` in the first empty slot.
    pub fn add(&mut self, id: CreatureId) -> SlotAdmission {
        if self.contains(id) {
            return SlotAdmission::AlreadyPresent;
        }
        match self.ids.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = id;
                self.count += 1;
                SlotAdmission::Added
            }
            None => SlotAdmission::Full,
        }
    }

    /// Clears the slot holding `id`. Returns false if `id` was not present.
    pub fn remove(&mut self, id: CreatureId) -> bool {
        if id.is_none() {
            return false;
        }
        match self.ids.iter_mut().find(|slot| **slot == id) {
            Some(slot) => {
                *slot = CreatureId::NONE;
                self.count = self.count.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    /// Empties every slot. Only used to repair a detected desync.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Opponent and stance of the current creature fight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatData {
    pub state: CombatState,
    pub attack_type: AttackType,
    pub battle_enemy: CreatureId,
    /// Creation turn of `battle_enemy`; a mismatch means the slot was recycled.
    pub battle_enemy_created: GameTurn,
    /// Door or object target of an obstacle fight.
    pub obstacle: Option<Obstacle>,
}

/// Job-specific scratch data. Exactly one variant is meaningful at a time,
/// keyed by the creature's active state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JobData {
    #[default]
    None,
    Idle {
        wander_target: Position,
        next_wander_turn: GameTurn,
    },
    Sleep {
        turns_asleep: u32,
    },
    Training {
        turns_trained: u32,
        next_swing_turn: GameTurn,
    },
    Sulking {
        turns_sulked: u32,
    },
    CallToArms {
        rally_point: Position,
    },
    Unconscious {
        remaining_turns: u32,
    },
    Leaving {
        exit: Position,
    },
}

/// The single in-progress timed action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveInstance {
    pub id: InstanceId,
    pub target: CreatureId,
    pub target_position: Position,
    pub turns_left: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceCooldown {
    pub id: InstanceId,
    pub ready_at: GameTurn,
}

/// Mutable AI record of one creature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureControl {
    pub flags: ControlFlags,
    pub owner_creature: CreatureId,

    // ===== combat =====
    pub combat_flags: CombatFlags,
    pub combat: CombatData,
    pub opponents_melee: OpponentSlots,
    pub opponents_ranged: OpponentSlots,
    /// Disables fear for the rest of the current fight.
    pub fight_til_death: bool,
    /// Last turn the creature was dropped into the fray.
    pub dropped_turn: Option<GameTurn>,

    // ===== mood =====
    pub annoyance: [i32; <AnnoyReason as strum::EnumCount>::COUNT],
    pub mood_flags: MoodFlags,

    // ===== battle links =====
    pub battle_id: BattleId,
    pub battle_prev: CreatureId,
    pub battle_next: CreatureId,

    // ===== flee =====
    pub flee_pos: Position,
    pub flee_start_turn: Option<GameTurn>,

    // ===== navigation =====
    pub moveto_pos: Position,
    pub move_flags: MoveFlags,

    // ===== rooms and jobs =====
    pub target_room: RoomId,
    pub work_room: RoomId,
    pub room_prev: CreatureId,
    pub room_next: CreatureId,
    pub lair_room: RoomId,
    pub job: JobData,
    pub turns_at_job: u32,
    pub last_paid: GameTurn,
    pub last_salary_check: GameTurn,

    // ===== instances =====
    pub instance: Option<ActiveInstance>,
    pub cooldowns: ArrayVec<InstanceCooldown, { GameConfig::MAX_MODEL_INSTANCES }>,
    pub buff_until: GameTurn,
}

impl CreatureControl {
    /// A zeroed record marked as existing.
    pub fn new(owner_creature: CreatureId) -> Self {
        Self {
            flags: ControlFlags::EXISTS,
            owner_creature,
            ..Self::default()
        }
    }

    pub fn exists(&self) -> bool {
        self.flags.contains(ControlFlags::EXISTS)
    }

    pub fn in_creature_fight(&self) -> bool {
        self.combat_flags.intersects(CombatFlags::CREATURE_FIGHT)
    }

    /// Opponent array for the given attack type.
    pub fn opponents(&self, attack_type: AttackType) -> &OpponentSlots {
        match attack_type {
            AttackType::Ranged => &self.opponents_ranged,
            _ => &self.opponents_melee,
        }
    }

    pub fn has_attackers(&self) -> bool {
        !self.opponents_melee.is_empty() || !self.opponents_ranged.is_empty()
    }

    pub fn annoyance_of(&self, reason: AnnoyReason) -> i32 {
        self.annoyance[reason.index()]
    }

    pub fn cooldown_ready(&self, id: InstanceId, turn: GameTurn) -> bool {
        self.cooldowns
            .iter()
            .find(|cooldown| cooldown.id == id)
            .is_none_or(|cooldown| cooldown.ready_at <= turn)
    }

    pub fn set_cooldown(&mut self, id: InstanceId, ready_at: GameTurn) {
        if let Some(cooldown) = self.cooldowns.iter_mut().find(|cooldown| cooldown.id == id) {
            cooldown.ready_at = ready_at;
        } else if self.cooldowns.try_push(InstanceCooldown { id, ready_at }).is_err() {
            tracing::warn!(instance = %id, "cooldown table full");
        }
    }

    /// Drops the in-progress instance, if any.
    pub fn clear_instance(&mut self) {
        self.instance = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_slots_track_count() {
        let mut slots = OpponentSlots::default();
        for id in 1..=4 {
            assert_eq!(slots.add(CreatureId(id)), SlotAdmission::Added);
        }
        assert_eq!(slots.add(CreatureId(9)), SlotAdmission::Full);
        assert_eq!(slots.add(CreatureId(2)), SlotAdmission::AlreadyPresent);
        assert_eq!(slots.count(), 4);
        assert!(!slots.has_capacity(4));

        assert!(slots.remove(CreatureId(2)));
        assert!(!slots.remove(CreatureId(2)));
        assert_eq!(slots.count(), 3);
        assert_eq!(slots.slots()[1], CreatureId::NONE);

        assert_eq!(slots.add(CreatureId(7)), SlotAdmission::Added);
        assert_eq!(slots.slots()[1], CreatureId(7));
    }

    #[test]
    fn configured_limit_below_capacity() {
        let mut slots = OpponentSlots::default();
        slots.add(CreatureId(1));
        slots.add(CreatureId(2));
        assert!(!slots.has_capacity(2));
        assert!(slots.has_capacity(8));
    }

    #[test]
    fn cooldowns() {
        let mut control = CreatureControl::new(CreatureId(1));
        let id = InstanceId(3);
        assert!(control.cooldown_ready(id, GameTurn(0)));
        control.set_cooldown(id, GameTurn(10));
        assert!(!control.cooldown_ready(id, GameTurn(9)));
        assert!(control.cooldown_ready(id, GameTurn(10)));
    }
}
