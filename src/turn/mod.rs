//! The season/turn machine: who acts, where, and with how much AP.
//!
//! ## Shape of a round
//!
//! Every season runs two phases. In the **placement** phase players take
//! turns in seat order sending one idle worker each to a work area, until
//! everyone has either run out of idle workers or passed. The **use** phase
//! then walks the configured area rotation once, in order, skipping areas
//! nobody occupies; within an area each occupying player takes one turn in
//! seat order, with an AP budget computed from their workers there at the
//! moment the turn begins. When the last area is exhausted the season ends,
//! workers return to the holding zone, and the next season's placement
//! begins. Wrapping past the final season increments the round counter.
//!
//! ## Ownership
//!
//! `TurnState` owns every scheduling decision. Action code reports what
//! happened (AP spent, player passed) and then calls [`TurnState::advance`];
//! nothing else ever reassigns the current player.

use serde::{Deserialize, Serialize};

use crate::core::ids::{PlayerId, PlayerMap, ZoneId};
use crate::core::params::GameParams;
use crate::workers::WorkerRegistry;

/// The two phases a season alternates between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Workers are being sent from the holding zone to work areas.
    Placement,
    /// The area rotation is being walked and AP spent.
    Use,
}

/// What a call to [`TurnState::advance`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Control moved to another (player, area) pair or placement seat
    /// within the same season.
    Turn,
    /// The season ended and the next season's placement phase began.
    Season,
    /// The season ended and its rollover crossed a round boundary.
    Round,
}

/// Scheduling state for the current season.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Current phase.
    pub phase: Phase,
    /// Round counter, 1-based.
    pub round: u32,
    /// Season index into `GameParams::seasons`.
    pub season: u8,
    /// The player whose decision it is.
    pub current: PlayerId,
    /// Index into `GameParams::rotation` of the area being used.
    area_ix: usize,
    /// AP remaining for the current (player, area) turn.
    ap: u32,
    /// Placement retirement flags, reset each season.
    passed: PlayerMap<bool>,
}

impl TurnState {
    /// Scheduling state for the start of round 1: first season, placement
    /// phase, seat 0 to act.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            phase: Phase::Placement,
            round: 1,
            season: 0,
            current: PlayerId::new(0),
            area_ix: 0,
            ap: 0,
            passed: PlayerMap::with_value(player_count, false),
        }
    }

    /// Number of seats in the game.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.passed.player_count()
    }

    /// The area being used, or `None` during placement.
    #[must_use]
    pub fn current_area(&self, params: &GameParams) -> Option<ZoneId> {
        match self.phase {
            Phase::Use => params.rotation.get(self.area_ix).copied(),
            Phase::Placement => None,
        }
    }

    /// AP remaining for the current turn. Always zero during placement.
    #[must_use]
    pub fn ap(&self) -> u32 {
        self.ap
    }

    /// Whether `player` has retired from the current placement phase.
    #[must_use]
    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.passed[player]
    }

    /// Retire the current player from the placement phase.
    pub fn mark_passed(&mut self) {
        debug_assert_eq!(self.phase, Phase::Placement);
        self.passed[self.current] = true;
    }

    /// Debit AP for an applied action.
    pub fn spend(&mut self, cost: u32) {
        debug_assert!(cost <= self.ap, "spending more AP than remains");
        self.ap = self.ap.saturating_sub(cost);
    }

    /// Forfeit whatever AP remains (use-phase pass).
    pub fn exhaust(&mut self) {
        self.ap = 0;
    }

    /// Move scheduling forward after the current player's turn ended.
    ///
    /// During placement this picks the next seat still holding idle workers;
    /// during the use phase it picks the next occupant of the current area,
    /// then the next occupied area, and finally rolls the season over,
    /// sending every worker home.
    pub fn advance(&mut self, workers: &mut WorkerRegistry, params: &GameParams) -> Advance {
        match self.phase {
            Phase::Placement => {
                if let Some(next) = self.next_placer(workers, params) {
                    self.current = next;
                    Advance::Turn
                } else {
                    self.start_use(workers, params)
                }
            }
            Phase::Use => {
                debug_assert_eq!(self.ap, 0, "advancing a turn with AP left");
                let area = params.rotation[self.area_ix];
                let seats = self.current.index() as u8 + 1..self.player_count() as u8;
                for seat in seats.map(PlayerId::new) {
                    if workers.count_in(Some(area), Some(seat)) > 0 {
                        self.enter(seat, self.area_ix, workers, params);
                        return Advance::Turn;
                    }
                }
                for ix in self.area_ix + 1..params.rotation.len() {
                    let area = params.rotation[ix];
                    for seat in PlayerId::all(self.player_count()) {
                        if workers.count_in(Some(area), Some(seat)) > 0 {
                            self.enter(seat, ix, workers, params);
                            return Advance::Turn;
                        }
                    }
                }
                self.end_season(workers, params)
            }
        }
    }

    /// Seats after `current`, wrapping, that may still place a worker.
    fn next_placer(&self, workers: &WorkerRegistry, params: &GameParams) -> Option<PlayerId> {
        let n = self.player_count() as u8;
        (1..=n)
            .map(|k| PlayerId::new((self.current.index() as u8 + k) % n))
            .find(|&p| self.can_place(p, workers, params))
    }

    fn can_place(&self, player: PlayerId, workers: &WorkerRegistry, params: &GameParams) -> bool {
        !self.passed[player] && workers.count_in(Some(params.holding), Some(player)) > 0
    }

    /// Begin the use phase at the first occupied area, or roll the season
    /// over if nobody placed anything.
    fn start_use(&mut self, workers: &mut WorkerRegistry, params: &GameParams) -> Advance {
        for ix in 0..params.rotation.len() {
            let area = params.rotation[ix];
            for seat in PlayerId::all(self.player_count()) {
                if workers.count_in(Some(area), Some(seat)) > 0 {
                    self.enter(seat, ix, workers, params);
                    return Advance::Turn;
                }
            }
        }
        self.end_season(workers, params)
    }

    /// Hand the turn to `player` at rotation index `area_ix`, computing the
    /// AP budget from their workers there. AP is fixed at this moment; rank
    /// changes later in the turn do not refresh it.
    fn enter(&mut self, player: PlayerId, area_ix: usize, workers: &WorkerRegistry, params: &GameParams) {
        let area = params.rotation[area_ix];
        self.phase = Phase::Use;
        self.current = player;
        self.area_ix = area_ix;
        self.ap = params
            .ap_formula
            .points(workers.in_zone(Some(area), Some(player)).map(|w| w.rank));
        tracing::debug!(
            player = %player,
            area = params.zone_name(area),
            ap = self.ap,
            "use turn begins"
        );
    }

    /// Send workers home, reset placement flags, and step the season
    /// (wrapping into the next round).
    fn end_season(&mut self, workers: &mut WorkerRegistry, params: &GameParams) -> Advance {
        workers.send_home(params.holding);
        for (_, flag) in self.passed.iter_mut() {
            *flag = false;
        }
        self.phase = Phase::Placement;
        self.area_ix = 0;
        self.ap = 0;

        let crossed = self.season as usize + 1 == params.seasons.len();
        if crossed {
            self.season = 0;
            self.round += 1;
        } else {
            self.season += 1;
        }

        self.current = PlayerId::all(self.player_count())
            .find(|&p| self.can_place(p, workers, params))
            .expect("every player keeps at least one worker");
        tracing::debug!(
            round = self.round,
            season = params.season_name(self.season),
            "season begins"
        );

        if crossed {
            Advance::Round
        } else {
            Advance::Season
        }
    }
}
