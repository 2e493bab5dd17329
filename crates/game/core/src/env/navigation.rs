//! Navigation collaborator.
//!
//! The core never computes paths. It asks the navigation oracle whether a
//! destination is reachable and for the next step toward it, then applies the
//! resulting position to the creature itself.
use crate::state::{CreatureId, Position};

/// Outcome of one movement step toward a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveStep {
    /// The creature reached the destination.
    Arrived,
    /// No route exists any more (door closed, wall built).
    Blocked,
    /// The creature advanced and now stands at the given position.
    Progressing(Position),
}

/// Pathfinding and line-of-sight service.
pub trait NavigationOracle: Send + Sync {
    fn can_navigate_to(&self, creature: CreatureId, from: Position, dest: Position) -> bool;

    /// Advances `creature` by at most `speed` map units toward `dest`.
    fn move_toward(
        &self,
        creature: CreatureId,
        from: Position,
        dest: Position,
        speed: u32,
    ) -> MoveStep;

    /// Instantly relocates the creature when it has a teleport ability ready.
    fn teleport(&self, _creature: CreatureId, _from: Position, _dest: Position) -> bool {
        false
    }

    /// Nearest exit gate a hero can reach from `from`.
    fn find_hero_gate(&self, _creature: CreatureId, _from: Position) -> Option<Position> {
        None
    }

    /// Line of sight check used when scanning for enemies.
    fn can_see(&self, from: Position, to: Position, range: u32) -> bool {
        from.distance_to(to) <= range
    }
}
