//! Common error infrastructure for lair-core.
//!
//! This module provides the shared types and traits used across all error
//! types in the crate. Concern-specific errors (`PoolError`, `LinkError`,
//! `CombatError`, ...) live next to the code that produces them.
//!
//! Nothing in the behavior engine is fatal to the simulation: every failure
//! degrades to "the creature falls back to its default behavior". Errors exist
//! so callers and tests can observe *why* an operation was a no-op.

use crate::state::{CreatureId, GameTurn, Position};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the request may succeed later (slots full, no free battle)
/// - **Validation**: the request was invalid for the current state
/// - **Internal**: a data structure is inconsistent (corrupted link, count desync)
/// - **Fatal**: a required collaborator is missing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; retrying later may succeed.
    Recoverable,

    /// Invalid request; rejected without touching state.
    Validation,

    /// Unexpected inconsistency in pools or links.
    ///
    /// These indicate bugs and should be investigated.
    Internal,

    /// The engine cannot proceed without the missing collaborator.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Creature that triggered the error (if applicable).
    pub creature: Option<CreatureId>,

    /// Position where the error occurred (if applicable).
    pub position: Option<Position>,

    /// Game turn at the time of error.
    pub turn: GameTurn,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(turn: GameTurn) -> Self {
        Self {
            creature: None,
            position: None,
            turn,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_creature(mut self, creature: CreatureId) -> Self {
        self.creature = Some(creature);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all lair-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
