//! Creature-versus-creature combat.
//!
//! Extends [`crate::GameEngine`] with target scoring, stance selection,
//! opponent slot bookkeeping, fear and flight, battle membership and the
//! per-player battle window. Obstacle fights (doors, objects) share the
//! combat flags but never take opponent slots.
//!
//! Every engagement keeps three records in step: the fighter's combat flags
//! and enemy reference, the victim's opponent slot, and the battle list both
//! creatures are linked into. Each entry point either updates all three or
//! rolls back and leaves the world as it found it.

mod battle;
mod engage;
mod error;
mod fear;
mod slots;
mod stance;
mod states;
mod targeting;
mod weapons;
mod window;

pub use error::CombatError;
pub use stance::{StanceInputs, choose_combat_state};
pub use targeting::CombatCandidate;
pub use weapons::InstanceList;
