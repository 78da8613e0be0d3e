//! Game runner: agents in, outcomes out.
//!
//! [`Game`] owns a state and one agent per seat and drives the
//! enumerate-choose-apply loop until the end rule fires, forwarding every
//! event to the registered listeners. [`ReplayLog`] is the persistence side:
//! parameters, seed and the applied action sequence are enough to rebuild
//! any state bit for bit, chance rolls included.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::agents::Agent;
use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::PlayerMap;
use crate::core::params::GameParams;
use crate::core::state::{GameState, GameStatus, Outcome};
use crate::events::{EventKind, EventListener};
use crate::model::ForwardModel;

/// Ceiling on applied actions before a run is cut short and scored as-is.
/// Guards drivers against `EndRule::Never` configurations.
const DEFAULT_STEP_LIMIT: usize = 100_000;

/// One game plus the agents playing it.
pub struct Game {
    state: GameState,
    agents: Vec<Box<dyn Agent>>,
    step_limit: usize,
}

impl Game {
    /// Pair a state with one agent per seat.
    pub fn new(state: GameState, agents: Vec<Box<dyn Agent>>) -> EngineResult<Self> {
        if agents.len() != state.player_count() {
            return Err(EngineError::config(format!(
                "{} agents for {} players",
                agents.len(),
                state.player_count()
            )));
        }
        Ok(Self {
            state,
            agents,
            step_limit: DEFAULT_STEP_LIMIT,
        })
    }

    /// Override the step ceiling.
    #[must_use]
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// The state as it currently stands.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Drive the game to completion, forwarding events to `listeners`.
    ///
    /// Hitting the step ceiling scores the game as it stands rather than
    /// looping forever. Agent and validation errors abort the run.
    pub fn run(
        &mut self,
        listeners: &mut [&mut dyn EventListener],
    ) -> EngineResult<PlayerMap<Outcome>> {
        let mut steps = 0usize;
        while !self.state.is_finished() {
            if steps >= self.step_limit {
                tracing::warn!(steps, "step limit reached, scoring as-is");
                self.state.finish();
                Self::notify(listeners, &EventKind::GameOver, &self.state);
                break;
            }

            let actions = ForwardModel::available_actions(&self.state);
            let player = self.state.current_player();
            let action = self.agents[player.index()].choose(&self.state, &actions)?;
            let events = ForwardModel::apply(&mut self.state, action)?;
            for event in &events {
                Self::notify(listeners, event, &self.state);
            }
            steps += 1;
        }

        for listener in listeners.iter_mut() {
            listener.finished(&self.state);
        }
        match &self.state.status {
            GameStatus::Finished(results) => Ok(results.clone()),
            GameStatus::Running => unreachable!("run loop exits only on a finished game"),
        }
    }

    fn notify(listeners: &mut [&mut dyn EventListener], event: &EventKind, state: &GameState) {
        for listener in listeners.iter_mut() {
            listener.on_event(event, state);
        }
    }
}

/// A self-contained game record: parameters, seat count, seed and the
/// applied actions in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    pub params: GameParams,
    pub player_count: usize,
    pub seed: u64,
    pub actions: Vec<Action>,
}

impl ReplayLog {
    /// Capture a log from a state's history.
    #[must_use]
    pub fn capture(state: &GameState) -> Self {
        Self {
            params: (*state.params).clone(),
            player_count: state.player_count(),
            seed: state.rng.seed(),
            actions: state.history.iter().map(|r| r.action).collect(),
        }
    }

    /// Encode as a compact binary blob.
    pub fn to_bytes(&self) -> EngineResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| EngineError::Replay(e.to_string()))
    }

    /// Decode a blob produced by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        bincode::deserialize(bytes).map_err(|e| EngineError::Replay(e.to_string()))
    }

    /// Rebuild the recorded state by applying every action from the start.
    ///
    /// Chance rolls come out identically because the rebuilt game consumes
    /// the same seeded stream. A log captured mid-game replays to that
    /// midpoint and stays running.
    pub fn replay(&self) -> EngineResult<GameState> {
        let mut state =
            ForwardModel::setup(Arc::new(self.params.clone()), self.player_count, self.seed)?;
        for &action in &self.actions {
            ForwardModel::apply(&mut state, action)?;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{FirstAgent, RandomAgent};
    use crate::core::params::{EndRule, RecipeConfig};
    use crate::events::{standard_attributes, AttributeListener, MemorySink};

    fn params() -> Arc<GameParams> {
        let mut params = GameParams::new("test", "bank", "store", "holding");
        params.set_seasons(&["spring", "autumn"]);
        let grain = params.add_resource("grain");
        let field = params.add_area("field");
        params.set_currency(grain);
        params.set_end_rule(EndRule::RoundLimit(2));
        params.set_starting_ranks(&[1, 2]);
        params.add_score_weight(grain, 1);
        params.add_recipe(
            RecipeConfig::new("glean", field, 1).moves(grain, params.bank, params.store, 1),
        );
        params.add_recipe(
            RecipeConfig::new("forage", field, 1)
                .with_chance(0.5)
                .moves(grain, params.bank, params.store, 2),
        );
        Arc::new(params)
    }

    fn random_game(seed: u64) -> Game {
        let state = ForwardModel::setup(params(), 2, seed).unwrap();
        Game::new(
            state,
            vec![
                Box::new(RandomAgent::new(seed ^ 0xA5A5)),
                Box::new(RandomAgent::new(seed ^ 0x5A5A)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_run_plays_to_completion() {
        let mut game = random_game(21);
        let outcomes = game.run(&mut []).unwrap();

        assert!(game.state().is_finished());
        assert_eq!(outcomes.player_count(), 2);
        assert!(game.state().turn.round > 2, "round limit was what ended it");
    }

    #[test]
    fn test_agent_count_must_match_seats() {
        let state = ForwardModel::setup(params(), 2, 3).unwrap();
        let result = Game::new(state, vec![Box::new(FirstAgent)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_passing_agents_play_a_fixed_script() {
        let state = ForwardModel::setup(params(), 2, 3).unwrap();
        let mut game = Game::new(state, vec![Box::new(FirstAgent), Box::new(FirstAgent)])
            .unwrap();
        game.run(&mut []).unwrap();

        // Two passes end each of the two seasons, for two rounds.
        assert_eq!(game.state().history.len(), 8);
        assert!(game
            .state()
            .history
            .iter()
            .all(|r| r.action == Action::Pass));
    }

    #[test]
    fn test_listeners_observe_whole_run() {
        let mut game = random_game(77);
        let mut listener = AttributeListener::new(standard_attributes(), MemorySink::new());
        game.run(&mut [&mut listener]).unwrap();

        let rows = listener.sink().rows();
        let action_rows = rows.iter().filter(|r| r.event == "action").count();
        assert_eq!(action_rows, game.state().history.len());
        assert_eq!(rows.last().unwrap().event, "game_over");
    }

    #[test]
    fn test_step_limit_cuts_run_short() {
        let mut game = random_game(5).with_step_limit(3);
        let outcomes = game.run(&mut []).unwrap();

        assert!(game.state().is_finished());
        assert_eq!(game.state().history.len(), 3);
        assert_eq!(outcomes.player_count(), 2);
    }

    #[test]
    fn test_replay_rebuilds_identical_state() {
        let mut game = random_game(99);
        game.run(&mut []).unwrap();
        let original = game.state();

        let log = ReplayLog::capture(original);
        let bytes = log.to_bytes().unwrap();
        let decoded = ReplayLog::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, log);

        let replayed = decoded.replay().unwrap();
        assert_eq!(replayed.ledger, original.ledger);
        assert_eq!(replayed.workers, original.workers);
        assert_eq!(replayed.turn, original.turn);
        assert_eq!(replayed.status, original.status);
        assert_eq!(replayed.history, original.history);
        assert_eq!(replayed.rng.state(), original.rng.state());
    }
}
