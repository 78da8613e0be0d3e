//! The closed action vocabulary: enumeration and execution.
//!
//! ## Canonical enumeration
//!
//! [`available`] returns every legal action for the current state in a
//! canonical, deterministic order: `Pass` first, then placements in rotation
//! order, then recipes in catalogue order, promotions by ascending rank,
//! recruiting, and the market visit. While a compound action is open only
//! its follow-ups are offered. Two equal states always enumerate the same
//! vector, which is what lets action indices be compared across clones.
//!
//! ## Execution
//!
//! [`execute`] assumes the action has already passed the membership check in
//! [`ForwardModel::apply`]. Each arm does its pure lookups before touching
//! anything, so an arm that fails its lookups leaves the state unchanged.
//!
//! [`ForwardModel::apply`]: crate::model::ForwardModel::apply

pub mod market;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::actions::market::{InProgress, MarketVisit};
use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::{RecipeId, ResourceId, ZoneId};
use crate::core::params::GameParams;
use crate::core::state::GameState;
use crate::events::EventKind;
use crate::turn::{Advance, Phase};

/// Everything a player can ever do, as data.
///
/// The set is closed: game variety comes from parameters (which recipes,
/// prices and areas exist), not from new variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Give up the rest of the turn. During placement this retires the
    /// player from the phase; during use it forfeits remaining AP.
    Pass,
    /// Send the lowest-id idle worker to `area`.
    Place { area: ZoneId },
    /// Run a recipe at the current area.
    Craft { recipe: RecipeId },
    /// Raise the rank of one own worker of rank `rank` in `area` by one.
    Promote { rank: u8, area: ZoneId },
    /// Pay the recruit price for a new worker in the holding zone.
    Recruit,
    /// Open a market visit (compound: one trade follows).
    VisitMarket,
    /// Market follow-up: buy one unit of `resource` at `price`.
    Buy { resource: ResourceId, price: u32 },
    /// Market follow-up: sell one unit of `resource` at `price`.
    Sell { resource: ResourceId, price: u32 },
    /// Market follow-up: leave without trading. Only offered when no trade
    /// is possible.
    Decline,
}

impl Action {
    /// Human-readable description, resolving ids against the parameters.
    #[must_use]
    pub fn label(&self, params: &GameParams) -> String {
        match *self {
            Action::Pass => "pass".to_owned(),
            Action::Place { area } => format!("place worker in {}", params.zone_name(area)),
            Action::Craft { recipe } => params.recipe_name(recipe).to_owned(),
            Action::Promote { rank, area } => {
                format!("promote rank {rank} worker in {}", params.zone_name(area))
            }
            Action::Recruit => "recruit a worker".to_owned(),
            Action::VisitMarket => "visit the market".to_owned(),
            Action::Buy { resource, price } => {
                format!("buy {} for {price}", params.resource_name(resource))
            }
            Action::Sell { resource, price } => {
                format!("sell {} for {price}", params.resource_name(resource))
            }
            Action::Decline => "decline to trade".to_owned(),
        }
    }
}

/// Every legal action for the current state, in canonical order.
///
/// Finished games offer nothing. An open compound action offers exactly its
/// follow-ups. Otherwise `Pass` is always legal, whatever the phase.
#[must_use]
pub fn available(state: &GameState) -> Vec<Action> {
    if state.is_finished() {
        return Vec::new();
    }
    if let Some(pending) = &state.in_progress {
        return pending.follow_ups(state);
    }

    let params = &state.params;
    let player = state.turn.current;
    let mut actions = vec![Action::Pass];

    match state.turn.phase {
        Phase::Placement => {
            if state.workers.count_in(Some(params.holding), Some(player)) > 0 {
                for &area in &params.rotation {
                    actions.push(Action::Place { area });
                }
            }
        }
        Phase::Use => {
            if let Some(area) = state.turn.current_area(params) {
                let ap = state.turn.ap();

                for (ix, recipe) in params.recipes.iter().enumerate() {
                    let in_season = recipe.seasons.is_empty()
                        || recipe.seasons.contains(&state.turn.season);
                    if recipe.areas.contains(&area)
                        && in_season
                        && recipe.ap <= ap
                        && state.ledger.covers(player, &recipe.effects)
                    {
                        actions.push(Action::Craft {
                            recipe: RecipeId::new(ix as u16),
                        });
                    }
                }

                if let Some(promotion) = &params.promotion {
                    if promotion.areas.contains(&area) && promotion.ap <= ap {
                        for rank in state.workers.ranks_in(Some(area), Some(player)) {
                            if rank < u8::MAX {
                                actions.push(Action::Promote { rank, area });
                            }
                        }
                    }
                }

                if let Some(recruit) = &params.recruit {
                    if recruit.area == area
                        && recruit.ap <= ap
                        && state.in_store(player, params.currency) >= recruit.price
                    {
                        actions.push(Action::Recruit);
                    }
                }

                if let Some(market) = &params.market {
                    if market.area == area && market.ap <= ap {
                        actions.push(Action::VisitMarket);
                    }
                }
            }
        }
    }
    actions
}

/// Apply an already-validated action, returning the events it raised.
///
/// The first event is always `ActionApplied`; chance outcomes and round
/// boundaries follow in the order they happened.
pub(crate) fn execute(
    state: &mut GameState,
    action: Action,
) -> EngineResult<SmallVec<[EventKind; 4]>> {
    let player = state.current_player();
    let mut events: SmallVec<[EventKind; 4]> = smallvec![EventKind::ActionApplied {
        player,
        action
    }];

    match action {
        Action::Pass => match state.turn.phase {
            Phase::Placement => state.turn.mark_passed(),
            Phase::Use => state.turn.exhaust(),
        },

        Action::Place { area } => {
            let worker = state
                .workers
                .first_in(state.params.holding, player)
                .ok_or_else(|| EngineError::illegal("no idle worker to place"))?;
            state.workers.move_worker(worker, area)?;
        }

        Action::Craft { recipe } => {
            let params = Arc::clone(&state.params);
            let config = params
                .recipe(recipe)
                .ok_or_else(|| EngineError::illegal("unknown recipe"))?;
            state.turn.spend(config.ap);

            // AP is spent either way; effects apply only on success.
            let success = match config.chance {
                Some(chance) => state.rng.gen_bool(chance),
                None => true,
            };
            if success {
                for op in &config.effects {
                    state.ledger.apply(player, op)?;
                }
            }
            if config.chance.is_some() {
                let label = if success {
                    format!("{} succeeded", config.name)
                } else {
                    format!("{} came up empty", config.name)
                };
                events.push(EventKind::GameEvent { player, label });
            }
        }

        Action::Promote { rank, area } => {
            let cost = state
                .params
                .promotion
                .as_ref()
                .map(|p| p.ap)
                .ok_or_else(|| EngineError::illegal("promotion is not configured"))?;
            state.workers.promote(player, rank, area)?;
            state.turn.spend(cost);
        }

        Action::Recruit => {
            let recruit = state
                .params
                .recruit
                .ok_or_else(|| EngineError::illegal("recruiting is not configured"))?;
            if recruit.price > 0 {
                let (currency, store, bank) =
                    (state.params.currency, state.params.store, state.params.bank);
                state.ledger.transfer(player, currency, store, bank, recruit.price)?;
            }
            state.turn.spend(recruit.ap);
            state.workers.create(player, recruit.rank, state.params.holding);
        }

        Action::VisitMarket => {
            let cost = state
                .params
                .market
                .as_ref()
                .map(|m| m.ap)
                .ok_or_else(|| EngineError::illegal("the market is not configured"))?;
            state.turn.spend(cost);
            state.in_progress = Some(InProgress::Market(MarketVisit { player }));
        }

        Action::Buy { resource, price } => {
            let (currency, store, bank) =
                (state.params.currency, state.params.store, state.params.bank);
            state.ledger.transfer(player, currency, store, bank, price)?;
            state.ledger.transfer(player, resource, bank, store, 1)?;
            state.in_progress = None;
        }

        Action::Sell { resource, price } => {
            let (currency, store, bank) =
                (state.params.currency, state.params.store, state.params.bank);
            state.ledger.transfer(player, resource, store, bank, 1)?;
            state.ledger.transfer(player, currency, bank, store, price)?;
            state.in_progress = None;
        }

        Action::Decline => {
            state.in_progress = None;
        }
    }

    state.record(player, action);
    tracing::debug!(player = %player, action = %action.label(&state.params), "applied");
    settle(state, &mut events);
    Ok(events)
}

/// Move the turn machine on if the applied action ended the current turn.
///
/// Placement turns are one action long. Use turns end when AP runs out.
/// Nothing advances while a compound action is open.
fn settle(state: &mut GameState, events: &mut SmallVec<[EventKind; 4]>) {
    if state.in_progress.is_some() || state.is_finished() {
        return;
    }
    let due = match state.turn.phase {
        Phase::Placement => true,
        Phase::Use => state.turn.ap() == 0,
    };
    if !due {
        return;
    }
    let ending = state.turn.round;
    if state.advance_turn() == Advance::Round {
        events.push(EventKind::RoundEnded { round: ending });
    }
}
