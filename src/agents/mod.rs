//! Decision-makers for driving games.
//!
//! An [`Agent`] picks one action from the legal set each time its player is
//! up. Agents are deliberately dumb interfaces: the runner enumerates, the
//! agent chooses, the model validates and applies. An agent that returns
//! something outside the offered slice is rejected by the model like any
//! other illegal action.

use crate::actions::Action;
use crate::core::error::{EngineError, EngineResult};
use crate::core::rng::GameRng;
use crate::core::state::GameState;

/// Chooses one of the offered actions for the current player.
pub trait Agent {
    /// Pick from `actions`. The slice is never empty for a running game.
    fn choose(&mut self, state: &GameState, actions: &[Action]) -> EngineResult<Action>;

    /// Name for logs.
    fn name(&self) -> &str {
        "agent"
    }
}

/// Picks uniformly at random from its own seeded stream.
///
/// The stream is independent of the game's RNG, so two runs with the same
/// game seed and the same agent seeds make identical choices.
pub struct RandomAgent {
    rng: GameRng,
}

impl RandomAgent {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn choose(&mut self, _state: &GameState, actions: &[Action]) -> EngineResult<Action> {
        self.rng
            .choose(actions)
            .copied()
            .ok_or_else(|| EngineError::illegal("no actions offered"))
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Always takes the first offered action.
///
/// Since `Pass` is enumerated first outside compound actions, this agent
/// mostly passes; it is useful as a deterministic baseline in tests.
#[derive(Default)]
pub struct FirstAgent;

impl Agent for FirstAgent {
    fn choose(&mut self, _state: &GameState, actions: &[Action]) -> EngineResult<Action> {
        actions
            .first()
            .copied()
            .ok_or_else(|| EngineError::illegal("no actions offered"))
    }

    fn name(&self) -> &str {
        "first"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::{ResourceId, ZoneId};
    use crate::core::params::{EndRule, GameParams};
    use std::sync::Arc;

    fn state() -> GameState {
        let mut params = GameParams::new("test", "bank", "store", "holding");
        params.set_seasons(&["spring"]);
        params.add_resource("grain");
        params.add_area("field");
        params.set_end_rule(EndRule::RoundLimit(1));
        params.set_starting_ranks(&[1]);
        GameState::new(Arc::new(params), 2, 5).unwrap()
    }

    #[test]
    fn test_random_agent_is_reproducible() {
        let state = state();
        let actions = vec![
            Action::Pass,
            Action::Place { area: ZoneId::new(3) },
            Action::Buy { resource: ResourceId::new(0), price: 1 },
        ];

        let mut a = RandomAgent::new(9);
        let mut b = RandomAgent::new(9);
        for _ in 0..20 {
            assert_eq!(
                a.choose(&state, &actions).unwrap(),
                b.choose(&state, &actions).unwrap()
            );
        }
    }

    #[test]
    fn test_random_agent_picks_from_slice() {
        let state = state();
        let actions = vec![Action::Pass, Action::Recruit];

        let mut agent = RandomAgent::new(1);
        for _ in 0..20 {
            let choice = agent.choose(&state, &actions).unwrap();
            assert!(actions.contains(&choice));
        }
    }

    #[test]
    fn test_first_agent_takes_head() {
        let state = state();
        let mut agent = FirstAgent;

        let choice = agent
            .choose(&state, &[Action::Recruit, Action::Pass])
            .unwrap();
        assert_eq!(choice, Action::Recruit);
    }
}
