//! Worker registry: the game's owned pieces.
//!
//! Workers are the placeable units of the engine. Each has an owner, a rank
//! (the scalar progression level the action-point formula reads) and a
//! current location — a work area during a season, or the holding zone
//! between placements. Workers are created by the recruit action, promoted
//! one rank at a time by the promote action, and never destroyed during
//! normal play.
//!
//! Queries filter by zone and owner, with either filter wildcarded, e.g.
//! "all of Player 2's workers in the field" or "everyone in the chapel".
//!
//! Backed by a persistent `im::Vector` so registry clones are O(1).

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EngineResult, PlayerId, WorkerId, ZoneId};

/// A single placeable unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Registry-assigned id, unique for the lifetime of a game.
    pub id: WorkerId,
    /// Owning player.
    pub owner: PlayerId,
    /// Progression level; feeds the AP formula and promotion.
    pub rank: u8,
    /// Current location (work area or holding zone).
    pub at: ZoneId,
}

/// All workers in a game.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WorkerRegistry {
    workers: Vector<Worker>,
    next_id: u32,
}

impl WorkerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a worker and return its id.
    pub fn create(&mut self, owner: PlayerId, rank: u8, at: ZoneId) -> WorkerId {
        let id = WorkerId::new(self.next_id);
        self.next_id += 1;
        self.workers.push_back(Worker {
            id,
            owner,
            rank,
            at,
        });
        id
    }

    /// Total number of workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the registry holds no workers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Look up a worker by id.
    #[must_use]
    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// Iterate workers matching the filters; `None` wildcards a filter.
    pub fn in_zone(
        &self,
        zone: Option<ZoneId>,
        owner: Option<PlayerId>,
    ) -> impl Iterator<Item = &Worker> {
        self.workers.iter().filter(move |w| {
            zone.map_or(true, |z| w.at == z) && owner.map_or(true, |p| w.owner == p)
        })
    }

    /// Number of workers matching the filters.
    #[must_use]
    pub fn count_in(&self, zone: Option<ZoneId>, owner: Option<PlayerId>) -> usize {
        self.in_zone(zone, owner).count()
    }

    /// Sum of ranks of workers matching the filters.
    #[must_use]
    pub fn rank_sum(&self, zone: Option<ZoneId>, owner: Option<PlayerId>) -> u32 {
        self.in_zone(zone, owner).map(|w| w.rank as u32).sum()
    }

    /// Distinct ranks among matching workers, ascending.
    #[must_use]
    pub fn ranks_in(&self, zone: Option<ZoneId>, owner: Option<PlayerId>) -> Vec<u8> {
        let mut ranks: Vec<u8> = self.in_zone(zone, owner).map(|w| w.rank).collect();
        ranks.sort_unstable();
        ranks.dedup();
        ranks
    }

    /// Lowest-id worker of `owner` currently in `zone`.
    ///
    /// This is the deterministic pick the placement action uses.
    #[must_use]
    pub fn first_in(&self, zone: ZoneId, owner: PlayerId) -> Option<WorkerId> {
        self.in_zone(Some(zone), Some(owner)).map(|w| w.id).min()
    }

    /// Relocate one worker.
    pub fn move_worker(&mut self, id: WorkerId, to: ZoneId) -> EngineResult<()> {
        match self.position_of(id) {
            Some(pos) => {
                if let Some(w) = self.workers.get_mut(pos) {
                    w.at = to;
                }
                Ok(())
            }
            None => Err(EngineError::illegal(format!("{id} does not exist"))),
        }
    }

    /// Promote one of `owner`'s rank-`rank` workers in `area` by one rank.
    ///
    /// When several match, the lowest id is chosen; only the rank counts
    /// are observable downstream, so any pick is equivalent. Fails if no
    /// worker matches.
    pub fn promote(&mut self, owner: PlayerId, rank: u8, area: ZoneId) -> EngineResult<WorkerId> {
        if rank == u8::MAX {
            return Err(EngineError::illegal("rank is already at the ceiling"));
        }
        let chosen = self
            .in_zone(Some(area), Some(owner))
            .filter(|w| w.rank == rank)
            .map(|w| w.id)
            .min()
            .ok_or_else(|| {
                EngineError::illegal(format!(
                    "{owner} has no rank-{rank} worker in zone {}",
                    area.index()
                ))
            })?;

        let pos = self.position_of(chosen).expect("id came from this registry");
        if let Some(w) = self.workers.get_mut(pos) {
            w.rank += 1;
        }
        Ok(chosen)
    }

    /// Return every worker to the holding zone (season end).
    pub fn send_home(&mut self, holding: ZoneId) {
        self.workers = self
            .workers
            .iter()
            .map(|w| Worker {
                at: holding,
                ..*w
            })
            .collect();
    }

    fn position_of(&self, id: WorkerId) -> Option<usize> {
        self.workers.iter().position(|w| w.id == id)
    }
}
