//! Resource ledger: typed counters over (player, resource, zone).
//!
//! Every economic effect in the engine is expressed as a list of
//! [`LedgerOp`]s, so each action carries a uniform, auditable description of
//! what it does to the books. The ledger enforces one invariant: no tracked
//! cell ever goes below zero. Operations that would violate it fail with
//! [`EngineError::InsufficientResource`] and leave the ledger untouched.
//!
//! ## The bank
//!
//! One zone is designated the bank. It is an unbounded shared pool: moves
//! drawing from it always succeed, units moved into it vanish, and its
//! balances are not tracked (`count` reports 0). Everything else is a
//! tracked cell.
//!
//! ## Cloning
//!
//! Cells live in a persistent `im::HashMap`, so cloning the ledger is O(1)
//! and clones share no mutable substructure — the property that makes bulk
//! forward simulation from a common state affordable.

use std::hash::BuildHasherDefault;

use im::HashMap as ImHashMap;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EngineResult, PlayerId, ResourceId, ZoneId};

/// A single ledger cell address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Owning player (the bank ignores this).
    pub player: PlayerId,
    /// Resource kind.
    pub resource: ResourceId,
    /// Holding zone.
    pub zone: ZoneId,
}

/// An atomic ledger mutation.
///
/// Recipes, market trades and recruit costs are all described as lists of
/// these, which keeps effects serializable and lets enumeration check
/// affordability without executing anything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOp {
    /// Transfer `amount` units of `resource` from one zone to another for
    /// the acting player. Atomic: both sides update or neither does.
    Move {
        resource: ResourceId,
        from: ZoneId,
        to: ZoneId,
        amount: u32,
    },

    /// Adjust a single cell by `delta` (negative debits).
    Add {
        resource: ResourceId,
        zone: ZoneId,
        delta: i32,
    },
}

impl LedgerOp {
    /// What this op consumes from a tracked zone, if anything:
    /// `(resource, zone, amount)`.
    ///
    /// Moves out of the bank and positive adjustments consume nothing.
    #[must_use]
    pub fn consumes(&self, bank: ZoneId) -> Option<(ResourceId, ZoneId, u32)> {
        match *self {
            LedgerOp::Move {
                resource,
                from,
                amount,
                ..
            } if from != bank => Some((resource, from, amount)),
            LedgerOp::Add {
                resource,
                zone,
                delta,
            } if delta < 0 => Some((resource, zone, delta.unsigned_abs())),
            _ => None,
        }
    }
}

/// Cell storage. The fixed hasher makes the map's shape a function of the
/// cells it holds, so equal ledgers enumerate their cells in the same order.
type CellMap = ImHashMap<Cell, u32, BuildHasherDefault<FxHasher>>;

/// Resource counters for all players and zones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    cells: CellMap,
    bank: ZoneId,
}

impl Ledger {
    /// Create an empty ledger with the given bank zone.
    #[must_use]
    pub fn new(bank: ZoneId) -> Self {
        Self {
            cells: CellMap::default(),
            bank,
        }
    }

    /// The bank zone id.
    #[must_use]
    pub fn bank(&self) -> ZoneId {
        self.bank
    }

    /// Units of `resource` held by `player` in `zone`.
    ///
    /// The bank is untracked and always reports 0.
    #[must_use]
    pub fn count(&self, player: PlayerId, resource: ResourceId, zone: ZoneId) -> u32 {
        if zone == self.bank {
            return 0;
        }
        let key = Cell {
            player,
            resource,
            zone,
        };
        self.cells.get(&key).copied().unwrap_or(0)
    }

    /// Transfer `amount` units of `resource` from `from` to `to` for
    /// `player`. Fails without touching either side if the tracked source
    /// holds less than `amount`.
    pub fn transfer(
        &mut self,
        player: PlayerId,
        resource: ResourceId,
        from: ZoneId,
        to: ZoneId,
        amount: u32,
    ) -> EngineResult<()> {
        if from == to {
            return Err(EngineError::illegal(
                "transfer source and destination are the same zone",
            ));
        }
        if amount == 0 {
            return Ok(());
        }

        if from != self.bank {
            let have = self.count(player, resource, from);
            if have < amount {
                return Err(EngineError::InsufficientResource {
                    player,
                    resource,
                    zone: from,
                    have,
                    need: amount,
                });
            }
            self.set(player, resource, from, have - amount);
        }
        if to != self.bank {
            let have = self.count(player, resource, to);
            self.set(player, resource, to, have + amount);
        }

        tracing::trace!(%player, ?resource, ?from, ?to, amount, "ledger transfer");
        Ok(())
    }

    /// Adjust one cell by `delta`. Fails if the result would be negative,
    /// or if the cell is in the bank (which is not tracked).
    pub fn add(
        &mut self,
        player: PlayerId,
        resource: ResourceId,
        zone: ZoneId,
        delta: i32,
    ) -> EngineResult<()> {
        if zone == self.bank {
            return Err(EngineError::illegal("the bank is not a tracked zone"));
        }
        let have = self.count(player, resource, zone);
        let next = have as i64 + delta as i64;
        if next < 0 {
            return Err(EngineError::InsufficientResource {
                player,
                resource,
                zone,
                have,
                need: delta.unsigned_abs(),
            });
        }
        self.set(player, resource, zone, next as u32);

        tracing::trace!(%player, ?resource, ?zone, delta, "ledger adjust");
        Ok(())
    }

    /// Execute one [`LedgerOp`] for `player`.
    pub fn apply(&mut self, player: PlayerId, op: &LedgerOp) -> EngineResult<()> {
        match *op {
            LedgerOp::Move {
                resource,
                from,
                to,
                amount,
            } => self.transfer(player, resource, from, to, amount),
            LedgerOp::Add {
                resource,
                zone,
                delta,
            } => self.add(player, resource, zone, delta),
        }
    }

    /// Whether every consuming side of `ops` is covered by current stocks.
    ///
    /// Ops are judged independently; the catalogue keeps each consuming
    /// resource to a single op per recipe, so independent checks match
    /// sequential execution.
    #[must_use]
    pub fn covers(&self, player: PlayerId, ops: &[LedgerOp]) -> bool {
        ops.iter().all(|op| match op.consumes(self.bank) {
            Some((resource, zone, need)) => self.count(player, resource, zone) >= need,
            None => true,
        })
    }

    /// Iterate over all tracked non-zero cells.
    ///
    /// Order depends only on which cells are present, never on the history
    /// that produced them, so equal ledgers enumerate identically.
    pub fn cells(&self) -> impl Iterator<Item = (&Cell, u32)> {
        self.cells.iter().map(|(k, v)| (k, *v))
    }

    fn set(&mut self, player: PlayerId, resource: ResourceId, zone: ZoneId, value: u32) {
        let key = Cell {
            player,
            resource,
            zone,
        };
        if value == 0 {
            self.cells.remove(&key);
        } else {
            self.cells.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: ZoneId = ZoneId::new(0);
    const STORE: ZoneId = ZoneId::new(1);
    const FIELD: ZoneId = ZoneId::new(2);
    const GRAIN: ResourceId = ResourceId::new(0);
    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn ledger_with(player: PlayerId, resource: ResourceId, zone: ZoneId, n: u32) -> Ledger {
        let mut ledger = Ledger::new(BANK);
        ledger.add(player, resource, zone, n as i32).unwrap();
        ledger
    }

    #[test]
    fn test_count_empty() {
        let ledger = Ledger::new(BANK);
        assert_eq!(ledger.count(P0, GRAIN, STORE), 0);
    }

    #[test]
    fn test_transfer_moves_both_sides() {
        let mut ledger = ledger_with(P0, GRAIN, STORE, 5);

        ledger.transfer(P0, GRAIN, STORE, FIELD, 2).unwrap();

        assert_eq!(ledger.count(P0, GRAIN, STORE), 3);
        assert_eq!(ledger.count(P0, GRAIN, FIELD), 2);
    }

    #[test]
    fn test_transfer_insufficient_is_atomic() {
        let mut ledger = ledger_with(P0, GRAIN, STORE, 1);

        let err = ledger.transfer(P0, GRAIN, STORE, FIELD, 2).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientResource {
                player: P0,
                resource: GRAIN,
                zone: STORE,
                have: 1,
                need: 2,
            }
        );

        // Neither side changed.
        assert_eq!(ledger.count(P0, GRAIN, STORE), 1);
        assert_eq!(ledger.count(P0, GRAIN, FIELD), 0);
    }

    #[test]
    fn test_bank_is_infinite_source_and_sink() {
        let mut ledger = Ledger::new(BANK);

        // Drawing from an empty bank succeeds.
        ledger.transfer(P0, GRAIN, BANK, FIELD, 3).unwrap();
        assert_eq!(ledger.count(P0, GRAIN, FIELD), 3);
        assert_eq!(ledger.count(P0, GRAIN, BANK), 0);

        // Units moved into the bank vanish.
        ledger.transfer(P0, GRAIN, FIELD, BANK, 3).unwrap();
        assert_eq!(ledger.count(P0, GRAIN, FIELD), 0);
        assert_eq!(ledger.count(P0, GRAIN, BANK), 0);
    }

    #[test]
    fn test_players_are_separate() {
        let mut ledger = ledger_with(P0, GRAIN, STORE, 4);
        ledger.add(P1, GRAIN, STORE, 1).unwrap();

        ledger.transfer(P0, GRAIN, STORE, FIELD, 4).unwrap();

        assert_eq!(ledger.count(P0, GRAIN, STORE), 0);
        assert_eq!(ledger.count(P1, GRAIN, STORE), 1);
    }

    #[test]
    fn test_add_rejects_negative_result() {
        let mut ledger = ledger_with(P0, GRAIN, STORE, 2);

        let err = ledger.add(P0, GRAIN, STORE, -3).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientResource { have: 2, need: 3, .. }));
        assert_eq!(ledger.count(P0, GRAIN, STORE), 2);
    }

    #[test]
    fn test_add_rejects_bank() {
        let mut ledger = Ledger::new(BANK);
        assert!(ledger.add(P0, GRAIN, BANK, 5).is_err());
    }

    #[test]
    fn test_transfer_same_zone_rejected() {
        let mut ledger = ledger_with(P0, GRAIN, STORE, 2);
        assert!(ledger.transfer(P0, GRAIN, STORE, STORE, 1).is_err());
    }

    #[test]
    fn test_apply_and_covers() {
        let mut ledger = ledger_with(P0, GRAIN, STORE, 1);

        let bake = vec![
            LedgerOp::Move {
                resource: GRAIN,
                from: STORE,
                to: BANK,
                amount: 1,
            },
            LedgerOp::Add {
                resource: ResourceId::new(1),
                zone: STORE,
                delta: 2,
            },
        ];

        assert!(ledger.covers(P0, &bake));
        for op in &bake {
            ledger.apply(P0, op).unwrap();
        }

        assert_eq!(ledger.count(P0, GRAIN, STORE), 0);
        assert_eq!(ledger.count(P0, ResourceId::new(1), STORE), 2);
        assert!(!ledger.covers(P0, &bake));
    }

    #[test]
    fn test_clone_shares_nothing_mutable() {
        let mut ledger = ledger_with(P0, GRAIN, STORE, 5);
        let snapshot = ledger.clone();

        ledger.transfer(P0, GRAIN, STORE, FIELD, 5).unwrap();

        assert_eq!(snapshot.count(P0, GRAIN, STORE), 5);
        assert_eq!(ledger.count(P0, GRAIN, STORE), 0);
    }

    #[test]
    fn test_cells_order_depends_on_contents_not_history() {
        let mut forward = Ledger::new(BANK);
        let mut reverse = Ledger::new(BANK);

        let mut stock = Vec::new();
        for player in [P0, P1] {
            for zone in [STORE, FIELD] {
                for r in 0..6 {
                    stock.push((player, ResourceId::new(r), zone, i32::from(r) + 1));
                }
            }
        }
        for &(player, resource, zone, n) in &stock {
            forward.add(player, resource, zone, n).unwrap();
        }
        for &(player, resource, zone, n) in stock.iter().rev() {
            reverse.add(player, resource, zone, n).unwrap();
        }

        assert_eq!(forward, reverse);

        // Same cells, opposite build order: the enumeration must agree.
        let lhs: Vec<_> = forward.cells().collect();
        let rhs: Vec<_> = reverse.cells().collect();
        assert_eq!(lhs.len(), 24);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_ledger_op_serde() {
        let op = LedgerOp::Move {
            resource: GRAIN,
            from: STORE,
            to: FIELD,
            amount: 2,
        };
        let json = serde_json::to_string(&op).unwrap();
        let deserialized: LedgerOp = serde_json::from_str(&json).unwrap();
        assert_eq!(op, deserialized);
    }
}
