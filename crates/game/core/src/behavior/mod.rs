//! Creature states.
//!
//! The registry describes every state; the submodules add the process,
//! cleanup and move-check callbacks of the non-combat states to
//! [`GameEngine`](crate::engine::GameEngine). Combat states live in
//! [`crate::combat`].

mod call_to_arms;
mod idle;
mod lair;
mod lifecycle;
mod mood;
mod registry;
mod rooms;
mod salary;
mod training;

pub use registry::{
    MoveCheck, NeedCategory, OverrideFlags, StateId, StateInfo, StateReturn, StateType, state_info,
};
