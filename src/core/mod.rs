//! Core engine types: ids, errors, parameters, RNG, game state.
//!
//! This module contains the fundamental building blocks that are
//! game-agnostic. Games configure the engine through [`GameParams`] rather
//! than modifying the core.

pub mod error;
pub mod ids;
pub mod params;
pub mod rng;
pub mod state;

pub use error::{EngineError, EngineResult};
pub use ids::{PlayerId, PlayerMap, RecipeId, ResourceId, WorkerId, ZoneId};
pub use params::{
    ApFormula, EndRule, GameParams, MarketConfig, PriceEntry, PromotionConfig, RecipeConfig,
    RecruitConfig, ResourceConfig, ScoreWeight, StockEntry, ZoneConfig, ZoneRole,
};
pub use rng::{GameRng, GameRngState};
pub use state::{ActionRecord, GameState, GameStatus, Outcome};
