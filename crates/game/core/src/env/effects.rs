//! Projectile and effect collaborator.
//!
//! The core decides *when* an instance fires and at whom; the effect oracle
//! decides what it does. The returned [`Impact`] is applied by the core.
use crate::state::{CreatureId, InstanceId, PlayerId, Position};

use super::InstanceKind;

/// Everything the effect service needs to resolve one instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectRequest {
    pub instance: InstanceId,
    pub kind: InstanceKind,
    pub source: CreatureId,
    pub source_position: Position,
    pub source_level: u8,
    /// Creature target, if any. Self buffs target the caster.
    pub target: Option<CreatureId>,
    pub target_position: Position,
}

/// Net effect of a resolved instance on its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Impact {
    pub damage: u32,
    pub healing: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObstacleKind {
    Door,
    Object,
}

/// A non-creature combat target (door, trap, dungeon heart).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub id: u32,
    pub owner: PlayerId,
    pub position: Position,
}

pub trait EffectOracle: Send + Sync {
    /// Resolves an instance. `None` means the effect fizzled.
    fn resolve(&self, request: &EffectRequest) -> Option<Impact>;

    /// False once a door has been opened or destroyed, or an object is being
    /// destroyed.
    fn obstacle_intact(&self, obstacle: &Obstacle) -> bool;

    /// Applies a strike against an obstacle.
    fn strike_obstacle(&self, _source: CreatureId, _obstacle: &Obstacle, _instance: InstanceId) {}
}
