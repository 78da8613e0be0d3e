//! Engine error taxonomy.
//!
//! A small set of failure classes covers everything the engine can reject:
//!
//! - [`EngineError::IllegalAction`] — an action outside the current legal
//!   set, or a direct `apply` whose applicability predicate is false.
//! - [`EngineError::InsufficientResource`] — a ledger transfer or adjustment
//!   would drive a cell below zero. Raised by the ledger and propagated
//!   unchanged through whatever action triggered it.
//! - [`EngineError::InvalidConfiguration`] — parameters reference unknown or
//!   inconsistent ids. Raised before any play begins.
//! - [`EngineError::Replay`] — a persisted replay log could not be encoded
//!   or decoded.
//!
//! Nothing is retried or swallowed internally; picking a different action
//! after a rejection is the caller's business.

use crate::core::ids::{PlayerId, ResourceId, ZoneId};

/// Errors surfaced by the forward model, ledger and registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The action is not a member of the currently legal set, or was
    /// applied directly in a state where its preconditions do not hold.
    #[error("illegal action: {reason}")]
    IllegalAction {
        /// Human-readable rejection cause.
        reason: String,
    },

    /// A ledger operation would drive a cell below zero.
    #[error(
        "insufficient resource {resource:?} for {player} in {zone:?}: have {have}, need {need}"
    )]
    InsufficientResource {
        /// Owner of the affected cell.
        player: PlayerId,
        /// Resource kind being debited.
        resource: ResourceId,
        /// Zone the debit targets.
        zone: ZoneId,
        /// Units currently present.
        have: u32,
        /// Units the operation required.
        need: u32,
    },

    /// Game parameters failed validation at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A replay log failed to encode or decode.
    #[error("replay serialization: {0}")]
    Replay(String),
}

impl EngineError {
    /// Shorthand for an [`EngineError::IllegalAction`] with a formatted reason.
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalAction {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidConfiguration`].
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// Convenience alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
