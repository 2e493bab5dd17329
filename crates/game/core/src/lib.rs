//! Deterministic creature behavior for a dungeon-keeper style simulation.
//!
//! `lair-core` owns the creature state machine, the combat sub-engine and the
//! battle roster. It performs no I/O: navigation, rooms, effects, creature
//! models, balance rules and randomness come from the host through the
//! oracle traits in [`env`]. All state mutation flows through
//! [`engine::GameEngine`], which borrows a [`state::World`] for the duration
//! of an operation.
pub mod behavior;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use behavior::{MoveCheck, NeedCategory, StateId, StateReturn, StateType, state_info};
pub use combat::{CombatCandidate, CombatError, StanceInputs, choose_combat_state};
pub use config::GameConfig;
pub use engine::{EngineError, GameEngine, StateResult, TransitionError, TurnSummary};
pub use env::{
    CombatRules, ConfigOracle, CreatureModel, EffectOracle, Env, GameEnv, InstanceInfo,
    InstanceKind, ModelOracle, MoveStep, NavigationOracle, Obstacle, ObstacleKind, OracleError,
    PcgRng, RngOracle, RoomInfo, RoomJob, RoomKind, RoomOracle,
};
pub use error::{ErrorContext, ErrorSeverity, GameError};
pub use state::{
    AnnoyReason, AttackType, BattleId, CombatState, ControlFlags, Creature, CreatureControl,
    CreatureId, CreatureSpawn, GameTurn, JobData, LinkError, ModelId, PlayerId, PlayerKind,
    PlayerState, PoolError, Position, RoomId, World,
};
