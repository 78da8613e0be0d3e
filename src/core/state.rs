//! Complete game state and end-of-game results.
//!
//! ## Cloning
//!
//! `GameState` is built for search: the ledger, registry and history are
//! persistent structures, the parameters sit behind an `Arc`, and the RNG
//! carries its stream position, so `clone()` is cheap and a clone replays
//! identically to its source under the same action sequence. Clones share
//! nothing mutable.
//!
//! ## Mutation discipline
//!
//! All sanctioned mutation goes through [`ForwardModel::apply`]; the methods
//! here are the bookkeeping that module calls into.
//!
//! [`ForwardModel::apply`]: crate::model::ForwardModel::apply

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::actions::market::InProgress;
use crate::actions::Action;
use crate::core::error::EngineResult;
use crate::core::ids::{PlayerId, PlayerMap, ResourceId, ZoneId};
use crate::core::params::GameParams;
use crate::core::rng::GameRng;
use crate::ledger::Ledger;
use crate::turn::{Advance, TurnState};
use crate::workers::WorkerRegistry;

/// Whether the game is still accepting actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Actions are being accepted.
    Running,
    /// The end rule fired; per-player results are final.
    Finished(PlayerMap<Outcome>),
}

/// Per-player result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Sole best score.
    Win,
    /// Tied for the best score.
    Draw,
    /// Beaten by at least one player.
    Loss,
}

/// One applied action, as kept in the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub action: Action,
    /// Round the action was taken in.
    pub round: u32,
    /// Season the action was taken in.
    pub season: u8,
}

/// The complete state of one game in flight.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Immutable game definition, shared by every clone.
    pub params: Arc<GameParams>,
    /// Resource counts per (player, resource, zone).
    pub ledger: Ledger,
    /// Every worker in the game.
    pub workers: WorkerRegistry,
    /// Scheduling: phase, round, season, current player, AP.
    pub turn: TurnState,
    /// The open compound action, if any.
    pub in_progress: Option<InProgress>,
    /// The game's own random stream.
    pub rng: GameRng,
    /// Applied actions, oldest first.
    pub history: Vector<ActionRecord>,
    /// Running or finished-with-results.
    pub status: GameStatus,
}

impl GameState {
    /// Build the starting state: validates the parameters, grants each
    /// player the starting stock, and creates the starting workers in the
    /// holding zone.
    pub fn new(params: Arc<GameParams>, player_count: usize, seed: u64) -> EngineResult<Self> {
        params.validate(player_count)?;

        let mut ledger = Ledger::new(params.bank);
        for player in PlayerId::all(player_count) {
            for entry in &params.starting_stock {
                ledger.transfer(player, entry.resource, params.bank, entry.zone, entry.count)?;
            }
        }

        let mut workers = WorkerRegistry::new();
        for player in PlayerId::all(player_count) {
            for &rank in &params.starting_ranks {
                workers.create(player, rank, params.holding);
            }
        }

        Ok(Self {
            params,
            ledger,
            workers,
            turn: TurnState::new(player_count),
            in_progress: None,
            rng: GameRng::new(seed),
            history: Vector::new(),
            status: GameStatus::Running,
        })
    }

    /// Number of seats in the game.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.turn.player_count()
    }

    /// The player whose decision it is. While a compound action is open
    /// that is always its opener.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        match &self.in_progress {
            Some(pending) => pending.player(),
            None => self.turn.current,
        }
    }

    /// Count of a tracked cell. The bank reports zero.
    #[must_use]
    pub fn resource(&self, player: PlayerId, resource: ResourceId, zone: ZoneId) -> u32 {
        self.ledger.count(player, resource, zone)
    }

    /// Count of `resource` in `player`'s store.
    #[must_use]
    pub fn in_store(&self, player: PlayerId, resource: ResourceId) -> u32 {
        self.ledger.count(player, resource, self.params.store)
    }

    /// Whether the end rule has fired.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.status, GameStatus::Finished(_))
    }

    /// A finished game's result for `player`.
    #[must_use]
    pub fn outcome(&self, player: PlayerId) -> Option<Outcome> {
        match &self.status {
            GameStatus::Finished(results) => Some(results[player]),
            GameStatus::Running => None,
        }
    }

    /// Weighted store total for `player` under the configured scoring.
    #[must_use]
    pub fn score(&self, player: PlayerId) -> i64 {
        self.params
            .scoring
            .iter()
            .map(|w| w.weight * i64::from(self.in_store(player, w.resource)))
            .sum()
    }

    /// Append to the history, stamped with the current round and season.
    pub(crate) fn record(&mut self, player: PlayerId, action: Action) {
        self.history.push_back(ActionRecord {
            player,
            action,
            round: self.turn.round,
            season: self.turn.season,
        });
    }

    /// Let the turn machine move on. Splits the borrow so the machine can
    /// send workers home on season rollovers.
    pub(crate) fn advance_turn(&mut self) -> Advance {
        let Self {
            turn,
            workers,
            params,
            ..
        } = self;
        turn.advance(workers, params)
    }

    /// Score every player, rank them, and mark the game finished.
    ///
    /// The sole best score wins; players tied for the best score draw;
    /// everyone else loses.
    pub(crate) fn finish(&mut self) {
        let n = self.player_count();
        let scores: Vec<i64> = PlayerId::all(n).map(|p| self.score(p)).collect();
        let best = scores.iter().copied().max().expect("at least one player");
        let leaders = scores.iter().filter(|&&s| s == best).count();

        let results = PlayerMap::new(n, |p| {
            if scores[p.index()] < best {
                Outcome::Loss
            } else if leaders == 1 {
                Outcome::Win
            } else {
                Outcome::Draw
            }
        });
        tracing::info!(round = self.turn.round, ?scores, "game over");
        self.status = GameStatus::Finished(results);
    }
}
