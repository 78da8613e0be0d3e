//! The forward model: setup, enumeration, application.
//!
//! This is the crate's contract with drivers and searchers:
//!
//! 1. [`ForwardModel::setup`] builds the starting state from parameters.
//! 2. [`ForwardModel::available_actions`] lists what the current player may
//!    do, in canonical order.
//! 3. [`ForwardModel::apply`] validates an action by membership in that
//!    list, applies it, advances scheduling, and checks the end rule.
//!
//! `apply` is the only sanctioned mutation path. A rejected action leaves
//! the state exactly as it was.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::actions::{self, Action};
use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::PlayerId;
use crate::core::params::{EndRule, GameParams};
use crate::core::state::GameState;
use crate::events::EventKind;

/// Stateless entry points over [`GameState`].
pub struct ForwardModel;

impl ForwardModel {
    /// Build the starting state for `player_count` players.
    ///
    /// Validates the parameters, grants starting stock, creates starting
    /// workers, and seeds the game's random stream.
    pub fn setup(
        params: Arc<GameParams>,
        player_count: usize,
        seed: u64,
    ) -> EngineResult<GameState> {
        let state = GameState::new(params, player_count, seed)?;
        tracing::info!(
            game = %state.params.name,
            players = player_count,
            seed,
            "game set up"
        );
        Ok(state)
    }

    /// Every legal action for the current state, in canonical order.
    #[must_use]
    pub fn available_actions(state: &GameState) -> Vec<Action> {
        actions::available(state)
    }

    /// Validate and apply `action`, returning the events it raised.
    ///
    /// Validation is by membership in [`Self::available_actions`]; anything
    /// not in that list is rejected with `IllegalAction` before any part of
    /// the state is touched.
    pub fn apply(
        state: &mut GameState,
        action: Action,
    ) -> EngineResult<SmallVec<[EventKind; 4]>> {
        if state.is_finished() {
            return Err(EngineError::illegal("the game is over"));
        }
        if !actions::available(state).contains(&action) {
            return Err(EngineError::illegal(format!(
                "'{}' is not available",
                action.label(&state.params)
            )));
        }

        let mut events = actions::execute(state, action)?;
        if Self::end_rule_fired(state) {
            state.finish();
            events.push(EventKind::GameOver);
        }
        Ok(events)
    }

    /// Whether the configured end rule holds for the current state.
    fn end_rule_fired(state: &GameState) -> bool {
        match state.params.end_rule {
            EndRule::RoundLimit(limit) => state.turn.round > limit,
            EndRule::StockTarget {
                resource,
                zone,
                target,
            } => PlayerId::all(state.player_count())
                .any(|p| state.resource(p, resource, zone) >= target),
            EndRule::Never => false,
        }
    }
}
