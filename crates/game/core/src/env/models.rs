//! Creature model definitions and oracle interface.
//!
//! A model is the static, per-kind description of a creature (fear rating,
//! attack preference, anger thresholds, start states, instance list). Models
//! are data-driven: the content crate deserializes them from RON and serves
//! them through [`ModelOracle`].

use arrayvec::ArrayVec;

use crate::behavior::StateId;
use crate::config::GameConfig;
use crate::state::{AttackType, InstanceId, ModelId};

/// Static description of a creature kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureModel {
    pub name: String,

    /// Health fraction (out of 256) below which the creature wants to flee.
    /// The config's fear sentinel means "afraid of every other model".
    pub fear_wounded: u8,

    pub attack_preference: AttackType,

    /// Anger at or above this level makes the creature angry. Zero disables anger.
    pub annoy_level: i32,
    /// Anger added per salary interval without pay.
    pub annoy_no_salary: i32,
    /// Anger added per sleep attempt without a lair.
    pub annoy_no_lair: i32,
    /// Anger change per turn while sulking (usually negative).
    pub annoy_sulking: i32,

    /// Start state for creatures owned by hero players.
    pub good_start_state: StateId,
    /// Start state for keeper-owned creatures.
    pub evil_start_state: StateId,

    pub instances: ArrayVec<InstanceId, { GameConfig::MAX_MODEL_INSTANCES }>,

    /// Map units per turn.
    pub base_speed: u32,
    pub sight_range: u32,
    pub needs_lair: bool,
    pub salary: u32,
}

impl CreatureModel {
    /// A bare model with neutral defaults, used by tests and catalogs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fear_wounded: 0,
            attack_preference: AttackType::Melee,
            annoy_level: 0,
            annoy_no_salary: 0,
            annoy_no_lair: 0,
            annoy_sulking: 0,
            good_start_state: StateId::GoodDoingNothing,
            evil_start_state: StateId::CreatureDoingNothing,
            instances: ArrayVec::new(),
            base_speed: 64,
            sight_range: 2560,
            needs_lair: false,
            salary: 0,
        }
    }

    pub fn prefers_ranged(&self) -> bool {
        self.attack_preference == AttackType::Ranged
    }
}

/// Category of a timed action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstanceKind {
    Melee,
    Ranged,
    SelfBuff,
}

/// Static description of one instance (weapon swing, spell, shot).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceInfo {
    pub kind: InstanceKind,
    pub range_min: u32,
    pub range_max: u32,
    /// Turns from start until the effect fires.
    pub action_turns: u16,
    /// Turns before the instance may be used again.
    pub reset_turns: u16,
}

impl InstanceInfo {
    pub fn in_range(&self, distance: u32) -> bool {
        distance >= self.range_min && distance <= self.range_max
    }
}

/// Provides creature models and instance definitions by identifier.
pub trait ModelOracle: Send + Sync {
    fn model(&self, id: ModelId) -> Option<&CreatureModel>;

    fn instance(&self, id: InstanceId) -> Option<&InstanceInfo>;
}
