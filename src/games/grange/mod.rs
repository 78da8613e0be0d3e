//! "Grange" — the bundled monastery-economy game.
//!
//! A complete worker-placement game that exercises every engine feature:
//! - seasonal field recipes and all-year indoor crafts across five work areas
//! - a market with asymmetric buy and sell prices
//! - recruiting new workers and promoting placed ones
//! - a chance-based foraging action
//!
//! Useful both as a playable game and as the engine's reference workload.

mod game;

pub use game::{Grange, GrangeBuilder};
