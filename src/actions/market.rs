//! The compound-action protocol and its one occupant, the market visit.
//!
//! Some actions cannot resolve in a single step: opening them parks an
//! [`InProgress`] value on the state, turn advancement pauses, and the
//! opening player must resolve it with one of its follow-up actions before
//! anything else happens.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::core::ids::PlayerId;
use crate::core::state::GameState;

/// A market visit awaiting its single trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketVisit {
    /// The visiting player.
    pub player: PlayerId,
}

/// A compound action that has opened but not yet resolved.
///
/// At most one exists at a time, held in `GameState::in_progress`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InProgress {
    /// A market visit: exactly one buy, sell or decline follows.
    Market(MarketVisit),
}

impl InProgress {
    /// The player who must resolve this.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match *self {
            InProgress::Market(visit) => visit.player,
        }
    }

    /// Legal resolutions, in canonical order.
    #[must_use]
    pub fn follow_ups(&self, state: &GameState) -> Vec<Action> {
        match *self {
            InProgress::Market(visit) => market_follow_ups(visit, state),
        }
    }
}

/// Affordable buys in catalogue order, then backed sells. `Decline` is
/// offered only when no trade is possible.
fn market_follow_ups(visit: MarketVisit, state: &GameState) -> Vec<Action> {
    let params = &state.params;
    let market = params
        .market
        .as_ref()
        .expect("market visit opened without a market");
    let purse = state
        .ledger
        .count(visit.player, params.currency, params.store);

    let mut actions = Vec::new();
    for entry in &market.buys {
        if purse >= entry.price {
            actions.push(Action::Buy {
                resource: entry.resource,
                price: entry.price,
            });
        }
    }
    for entry in &market.sells {
        if state.ledger.count(visit.player, entry.resource, params.store) >= 1 {
            actions.push(Action::Sell {
                resource: entry.resource,
                price: entry.price,
            });
        }
    }
    if actions.is_empty() {
        actions.push(Action::Decline);
    }
    actions
}
