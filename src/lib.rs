//! # steward
//!
//! A forward-model engine for turn-based, resource-economy worker-placement
//! games, built for headless simulation and agent experiments.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: No hardcoded resources, zones, seasons or recipes.
//!    Games configure these at startup via [`GameParams`].
//!
//! 2. **N-Player First**: Every API takes the player count as context.
//!    No convenience methods that assume 2 players.
//!
//! 3. **Deterministic**: One seed fixes the whole game. Re-applying the same
//!    actions over the same seed rebuilds the same state, bit for bit.
//!
//! ## Architecture
//!
//! - **Immutable parameters, cheap states**: [`GameParams`] is validated once
//!   and shared behind an `Arc`; [`GameState`] clones are cheap and
//!   independent, so search-style drivers can branch freely.
//!
//! - **Closed action set**: every move is a variant of [`Action`], and the
//!   model validates by membership in the offered list. A driver cannot
//!   apply anything the current player was not offered.
//!
//! ## Modules
//!
//! - `core`: ids, errors, parameters, RNG, game state
//! - `ledger`: the (player, resource, zone) resource ledger
//! - `workers`: worker registry, placement and promotion
//! - `turn`: seasons, phases and the area rotation
//! - `actions`: action enumeration and application
//! - `model`: the forward-model facade
//! - `events`: event kinds, listeners and stat sinks
//! - `agents`: the agent trait and baseline agents
//! - `runner`: game loop and replay logs
//! - `games`: bundled game definitions
//!
//! ## Example
//!
//! ```
//! use steward::games::grange::GrangeBuilder;
//! use steward::{Action, ForwardModel};
//!
//! let (_, mut state) = GrangeBuilder::new(2).build(42)?;
//! let offered = ForwardModel::available_actions(&state);
//! assert!(offered.contains(&Action::Pass));
//! ForwardModel::apply(&mut state, offered[0])?;
//! # Ok::<(), steward::EngineError>(())
//! ```

pub mod core;
pub mod ledger;
pub mod workers;
pub mod turn;
pub mod actions;
pub mod model;
pub mod events;
pub mod agents;
pub mod runner;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    ActionRecord, ApFormula, EndRule, EngineError, EngineResult, GameParams, GameRng,
    GameRngState, GameState, GameStatus, Outcome, PlayerId, PlayerMap, RecipeConfig, RecipeId,
    ResourceId, WorkerId, ZoneId,
};

pub use crate::ledger::{Ledger, LedgerOp};

pub use crate::workers::{Worker, WorkerRegistry};

pub use crate::turn::{Advance, Phase, TurnState};

pub use crate::actions::market::{InProgress, MarketVisit};
pub use crate::actions::Action;

pub use crate::model::ForwardModel;

pub use crate::events::{
    standard_attributes, AttrValue, Attribute, AttributeListener, EventKind, EventListener,
    MemorySink, StatRow, StatSink, TracingSink,
};

pub use crate::agents::{Agent, FirstAgent, RandomAgent};

pub use crate::runner::{Game, ReplayLog};
