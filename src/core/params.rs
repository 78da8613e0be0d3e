//! Game parameters: the immutable configuration a game is built from.
//!
//! The engine hardcodes no catalogue. Resources, zones, seasons, recipes,
//! market prices, recruiting, promotion, the AP formula, the end rule and
//! scoring all arrive here, are validated once, and are treated as read-only
//! for the rest of the game. `GameParams` is shared behind an `Arc` by every
//! state cloned from the same setup.
//!
//! ## Structural zones
//!
//! Three zones always exist and are created by [`GameParams::new`]:
//! the **bank** (shared, unbounded), the **store** (one tracked pool per
//! player) and the **holding** zone where idle workers wait between
//! placements. Work areas are added afterwards and form the rotation the
//! use phase walks through.
//!
//! ## Example
//!
//! ```
//! use steward::core::{ApFormula, EndRule, GameParams, RecipeConfig};
//!
//! let mut params = GameParams::new("demo", "supply", "storeroom", "dormitory");
//! params.set_seasons(&["spring", "autumn"]);
//! let grain = params.add_resource("grain");
//! let field = params.add_area("field");
//! params.set_currency(grain);
//! params.set_ap_formula(ApFormula::SumRanks);
//! params.set_end_rule(EndRule::RoundLimit(2));
//! params.set_starting_ranks(&[1, 2]);
//! params.add_recipe(
//!     RecipeConfig::new("sow grain", field, 1)
//!         .in_seasons(&[0])
//!         .moves(grain, params.bank, field, 1),
//! );
//!
//! assert!(params.validate(2).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::{RecipeId, ResourceId, ZoneId};
use crate::ledger::LedgerOp;

/// A resource kind definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Display name, used in logs and attribute rows.
    pub name: String,
}

/// What a zone is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneRole {
    /// The shared, unbounded pool. Exactly one per game.
    Bank,
    /// The per-player tracked store. Exactly one per game.
    Store,
    /// Where idle workers wait. Exactly one per game.
    Holding,
    /// A work area in the use-phase rotation.
    Work,
}

/// A zone definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Display name.
    pub name: String,
    /// Structural role.
    pub role: ZoneRole,
}

/// An atomic crafting/production action definition.
///
/// A recipe is offered to the current player when the current area is one of
/// its areas, the current season is listed (or the list is empty, meaning
/// every season), remaining AP covers its cost, and every consuming ledger
/// op is covered by current stocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// Display name, used in logs and attribute rows.
    pub name: String,
    /// Areas offering this recipe.
    pub areas: SmallVec<[ZoneId; 2]>,
    /// Season indices this recipe is limited to; empty = all seasons.
    pub seasons: SmallVec<[u8; 4]>,
    /// Action points debited on application.
    pub ap: u32,
    /// Success probability for stochastic recipes. `None` = deterministic.
    /// AP is spent either way; the effects apply only on success.
    pub chance: Option<f64>,
    /// Ledger deltas applied on (successful) execution, in order.
    pub effects: Vec<LedgerOp>,
}

impl RecipeConfig {
    /// Start a recipe offered in `area` costing `ap` points.
    #[must_use]
    pub fn new(name: impl Into<String>, area: ZoneId, ap: u32) -> Self {
        Self {
            name: name.into(),
            areas: SmallVec::from_slice(&[area]),
            seasons: SmallVec::new(),
            ap,
            chance: None,
            effects: Vec::new(),
        }
    }

    /// Offer the recipe in an additional area.
    #[must_use]
    pub fn also_in(mut self, area: ZoneId) -> Self {
        self.areas.push(area);
        self
    }

    /// Limit the recipe to the given season indices.
    #[must_use]
    pub fn in_seasons(mut self, seasons: &[u8]) -> Self {
        self.seasons = SmallVec::from_slice(seasons);
        self
    }

    /// Make the recipe stochastic with the given success probability.
    #[must_use]
    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = Some(chance);
        self
    }

    /// Append a transfer effect.
    #[must_use]
    pub fn moves(mut self, resource: ResourceId, from: ZoneId, to: ZoneId, amount: u32) -> Self {
        self.effects.push(LedgerOp::Move {
            resource,
            from,
            to,
            amount,
        });
        self
    }

    /// Append a single-cell adjustment effect.
    #[must_use]
    pub fn adds(mut self, resource: ResourceId, zone: ZoneId, delta: i32) -> Self {
        self.effects.push(LedgerOp::Add {
            resource,
            zone,
            delta,
        });
        self
    }
}

/// One tradable entry in the market catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Resource being traded.
    pub resource: ResourceId,
    /// Price in the configured currency.
    pub price: u32,
}

/// The market compound action's catalogue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Area where the market can be visited.
    pub area: ZoneId,
    /// AP debited when the visit opens.
    pub ap: u32,
    /// Goods purchasable this game, in enumeration order.
    pub buys: Vec<PriceEntry>,
    /// Goods sellable this game, in enumeration order.
    pub sells: Vec<PriceEntry>,
}

/// Recruiting policy: how new workers enter the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitConfig {
    /// Area where recruiting is offered.
    pub area: ZoneId,
    /// AP debited on recruit.
    pub ap: u32,
    /// Currency paid from the store to the bank.
    pub price: u32,
    /// Rank the new worker starts at.
    pub rank: u8,
}

/// Promotion policy: where workers can be promoted and what it costs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionConfig {
    /// Areas offering promotion.
    pub areas: SmallVec<[ZoneId; 2]>,
    /// AP debited per promotion.
    pub ap: u32,
}

/// How a player's AP budget is computed on (player, area) entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApFormula {
    /// Sum of the ranks of the player's workers in the area.
    SumRanks,
    /// A flat number of points per worker in the area.
    PerWorker(u32),
}

impl ApFormula {
    /// Compute the budget for the given worker ranks.
    pub fn points<I: Iterator<Item = u8>>(&self, ranks: I) -> u32 {
        match *self {
            ApFormula::SumRanks => ranks.map(u32::from).sum(),
            ApFormula::PerWorker(per) => per * ranks.count() as u32,
        }
    }
}

/// Whole-game termination policy, consulted after every applied action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndRule {
    /// The game ends when the round counter would exceed this limit.
    RoundLimit(u32),
    /// The game ends when any player's tracked cell reaches `target`.
    StockTarget {
        resource: ResourceId,
        zone: ZoneId,
        target: u32,
    },
    /// No built-in termination; the driver decides when to stop.
    Never,
}

/// One term of the final score: `weight × store count of resource`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeight {
    pub resource: ResourceId,
    pub weight: i64,
}

/// One starting-stock grant, applied per player at setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub resource: ResourceId,
    pub zone: ZoneId,
    pub count: u32,
}

/// The full, immutable game definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameParams {
    /// Game name, for logs.
    pub name: String,
    /// Resource table; `ResourceId` indexes into it.
    pub resources: Vec<ResourceConfig>,
    /// Zone table; `ZoneId` indexes into it.
    pub zones: Vec<ZoneConfig>,
    /// The shared unbounded pool.
    pub bank: ZoneId,
    /// The per-player tracked store.
    pub store: ZoneId,
    /// Where idle workers wait.
    pub holding: ZoneId,
    /// Ordered work areas the use phase walks through.
    pub rotation: Vec<ZoneId>,
    /// Ordered season names; the rotation wraps into the next round.
    pub seasons: Vec<String>,
    /// The currency resource (market trades, recruit price).
    pub currency: ResourceId,
    /// AP budget formula.
    pub ap_formula: ApFormula,
    /// Recipe table; `RecipeId` indexes into it.
    pub recipes: Vec<RecipeConfig>,
    /// Market catalogue, if this game has one.
    pub market: Option<MarketConfig>,
    /// Recruiting policy, if this game has one.
    pub recruit: Option<RecruitConfig>,
    /// Promotion policy, if this game has one.
    pub promotion: Option<PromotionConfig>,
    /// Termination policy.
    pub end_rule: EndRule,
    /// Final-score terms over each player's store.
    pub scoring: Vec<ScoreWeight>,
    /// Starting stock granted to every player.
    pub starting_stock: Vec<StockEntry>,
    /// Ranks of each player's starting workers.
    pub starting_ranks: Vec<u8>,
}

impl GameParams {
    /// Create a definition with the three structural zones and nothing else.
    #[must_use]
    pub fn new(name: impl Into<String>, bank: &str, store: &str, holding: &str) -> Self {
        let zones = vec![
            ZoneConfig {
                name: bank.to_owned(),
                role: ZoneRole::Bank,
            },
            ZoneConfig {
                name: store.to_owned(),
                role: ZoneRole::Store,
            },
            ZoneConfig {
                name: holding.to_owned(),
                role: ZoneRole::Holding,
            },
        ];
        Self {
            name: name.into(),
            resources: Vec::new(),
            zones,
            bank: ZoneId::new(0),
            store: ZoneId::new(1),
            holding: ZoneId::new(2),
            rotation: Vec::new(),
            seasons: Vec::new(),
            currency: ResourceId::new(0),
            ap_formula: ApFormula::SumRanks,
            recipes: Vec::new(),
            market: None,
            recruit: None,
            promotion: None,
            end_rule: EndRule::Never,
            scoring: Vec::new(),
            starting_stock: Vec::new(),
            starting_ranks: Vec::new(),
        }
    }

    /// Register a resource kind, returning its id.
    pub fn add_resource(&mut self, name: impl Into<String>) -> ResourceId {
        let id = ResourceId::new(self.resources.len() as u16);
        self.resources.push(ResourceConfig { name: name.into() });
        id
    }

    /// Register a work area at the end of the rotation, returning its id.
    pub fn add_area(&mut self, name: impl Into<String>) -> ZoneId {
        let id = ZoneId::new(self.zones.len() as u16);
        self.zones.push(ZoneConfig {
            name: name.into(),
            role: ZoneRole::Work,
        });
        self.rotation.push(id);
        id
    }

    /// Register a recipe, returning its id.
    pub fn add_recipe(&mut self, recipe: RecipeConfig) -> RecipeId {
        let id = RecipeId::new(self.recipes.len() as u16);
        self.recipes.push(recipe);
        id
    }

    /// Set the season rotation.
    pub fn set_seasons(&mut self, names: &[&str]) {
        self.seasons = names.iter().map(|s| (*s).to_owned()).collect();
    }

    /// Set the currency resource.
    pub fn set_currency(&mut self, currency: ResourceId) {
        self.currency = currency;
    }

    /// Set the AP formula.
    pub fn set_ap_formula(&mut self, formula: ApFormula) {
        self.ap_formula = formula;
    }

    /// Set the market catalogue.
    pub fn set_market(&mut self, market: MarketConfig) {
        self.market = Some(market);
    }

    /// Set the recruiting policy.
    pub fn set_recruit(&mut self, recruit: RecruitConfig) {
        self.recruit = Some(recruit);
    }

    /// Set the promotion policy.
    pub fn set_promotion(&mut self, promotion: PromotionConfig) {
        self.promotion = Some(promotion);
    }

    /// Set the termination policy.
    pub fn set_end_rule(&mut self, rule: EndRule) {
        self.end_rule = rule;
    }

    /// Append a scoring term.
    pub fn add_score_weight(&mut self, resource: ResourceId, weight: i64) {
        self.scoring.push(ScoreWeight { resource, weight });
    }

    /// Append a starting-stock grant (applied per player, into `zone`).
    pub fn add_starting_stock(&mut self, resource: ResourceId, zone: ZoneId, count: u32) {
        self.starting_stock.push(StockEntry {
            resource,
            zone,
            count,
        });
    }

    /// Set the ranks each player's starting workers are created with.
    pub fn set_starting_ranks(&mut self, ranks: &[u8]) {
        self.starting_ranks = ranks.to_vec();
    }

    /// Resource display name.
    #[must_use]
    pub fn resource_name(&self, id: ResourceId) -> &str {
        self.resources
            .get(id.index())
            .map_or("?", |r| r.name.as_str())
    }

    /// Zone display name.
    #[must_use]
    pub fn zone_name(&self, id: ZoneId) -> &str {
        self.zones.get(id.index()).map_or("?", |z| z.name.as_str())
    }

    /// Recipe display name.
    #[must_use]
    pub fn recipe_name(&self, id: RecipeId) -> &str {
        self.recipes
            .get(id.index())
            .map_or("?", |r| r.name.as_str())
    }

    /// Season display name.
    #[must_use]
    pub fn season_name(&self, season: u8) -> &str {
        self.seasons
            .get(season as usize)
            .map_or("?", |s| s.as_str())
    }

    /// Recipe lookup.
    #[must_use]
    pub fn recipe(&self, id: RecipeId) -> Option<&RecipeConfig> {
        self.recipes.get(id.index())
    }

    /// Check every cross-reference and structural rule.
    ///
    /// Called once at state construction; any failure is fatal before play.
    pub fn validate(&self, player_count: usize) -> EngineResult<()> {
        if player_count == 0 || player_count > 255 {
            return Err(EngineError::config(format!(
                "player count {player_count} outside 1..=255"
            )));
        }
        if self.resources.is_empty() {
            return Err(EngineError::config("no resources defined"));
        }
        if self.seasons.is_empty() {
            return Err(EngineError::config("no seasons defined"));
        }
        if self.rotation.is_empty() {
            return Err(EngineError::config("rotation has no work areas"));
        }

        self.check_role(self.bank, ZoneRole::Bank)?;
        self.check_role(self.store, ZoneRole::Store)?;
        self.check_role(self.holding, ZoneRole::Holding)?;
        for (role, expected) in [
            (ZoneRole::Bank, 1),
            (ZoneRole::Store, 1),
            (ZoneRole::Holding, 1),
        ] {
            let found = self.zones.iter().filter(|z| z.role == role).count();
            if found != expected {
                return Err(EngineError::config(format!(
                    "expected {expected} {role:?} zone, found {found}"
                )));
            }
        }

        let mut seen = Vec::new();
        for &area in &self.rotation {
            self.check_role(area, ZoneRole::Work)?;
            if seen.contains(&area) {
                return Err(EngineError::config(format!(
                    "area '{}' appears twice in the rotation",
                    self.zone_name(area)
                )));
            }
            seen.push(area);
        }

        self.check_resource(self.currency, "currency")?;
        if let ApFormula::PerWorker(per) = self.ap_formula {
            if per == 0 {
                return Err(EngineError::config("per-worker AP must be at least 1"));
            }
        }

        for recipe in &self.recipes {
            self.validate_recipe(recipe)?;
        }

        if let Some(market) = &self.market {
            self.check_rotation_member(market.area, "market area")?;
            if market.ap == 0 {
                return Err(EngineError::config("market AP cost must be at least 1"));
            }
            for entry in market.buys.iter().chain(market.sells.iter()) {
                self.check_resource(entry.resource, "market entry")?;
                if entry.price == 0 {
                    return Err(EngineError::config(format!(
                        "market price for '{}' must be at least 1",
                        self.resource_name(entry.resource)
                    )));
                }
            }
        }

        if let Some(recruit) = &self.recruit {
            self.check_rotation_member(recruit.area, "recruit area")?;
            if recruit.ap == 0 {
                return Err(EngineError::config("recruit AP cost must be at least 1"));
            }
            if recruit.rank == 0 {
                return Err(EngineError::config("recruit rank must be at least 1"));
            }
        }

        if let Some(promotion) = &self.promotion {
            if promotion.areas.is_empty() {
                return Err(EngineError::config("promotion has no areas"));
            }
            for &area in &promotion.areas {
                self.check_rotation_member(area, "promotion area")?;
            }
            if promotion.ap == 0 {
                return Err(EngineError::config("promotion AP cost must be at least 1"));
            }
        }

        match self.end_rule {
            EndRule::RoundLimit(limit) if limit == 0 => {
                return Err(EngineError::config("round limit must be at least 1"));
            }
            EndRule::StockTarget {
                resource,
                zone,
                target,
            } => {
                self.check_resource(resource, "end rule")?;
                self.check_zone(zone, "end rule")?;
                if zone == self.bank {
                    return Err(EngineError::config("end rule cannot target the bank"));
                }
                if target == 0 {
                    return Err(EngineError::config("end rule target must be at least 1"));
                }
            }
            _ => {}
        }

        for weight in &self.scoring {
            self.check_resource(weight.resource, "scoring")?;
        }

        for entry in &self.starting_stock {
            self.check_resource(entry.resource, "starting stock")?;
            self.check_zone(entry.zone, "starting stock")?;
            if entry.zone == self.bank {
                return Err(EngineError::config("starting stock cannot target the bank"));
            }
        }

        if self.starting_ranks.is_empty() {
            return Err(EngineError::config("players start with no workers"));
        }
        if self.starting_ranks.iter().any(|&r| r == 0) {
            return Err(EngineError::config("starting worker ranks must be at least 1"));
        }

        Ok(())
    }

    fn validate_recipe(&self, recipe: &RecipeConfig) -> EngineResult<()> {
        let label = &recipe.name;
        if recipe.areas.is_empty() {
            return Err(EngineError::config(format!("recipe '{label}' has no areas")));
        }
        for &area in &recipe.areas {
            self.check_rotation_member(area, label)?;
        }
        for &season in &recipe.seasons {
            if season as usize >= self.seasons.len() {
                return Err(EngineError::config(format!(
                    "recipe '{label}' references unknown season {season}"
                )));
            }
        }
        if recipe.ap == 0 {
            return Err(EngineError::config(format!(
                "recipe '{label}' AP cost must be at least 1"
            )));
        }
        if let Some(chance) = recipe.chance {
            if !(chance > 0.0 && chance <= 1.0) {
                return Err(EngineError::config(format!(
                    "recipe '{label}' chance {chance} outside (0, 1]"
                )));
            }
        }
        if recipe.effects.is_empty() {
            return Err(EngineError::config(format!(
                "recipe '{label}' has no effects"
            )));
        }

        let mut consumed: Vec<(ResourceId, ZoneId)> = Vec::new();
        for op in &recipe.effects {
            match *op {
                LedgerOp::Move {
                    resource,
                    from,
                    to,
                    amount,
                } => {
                    self.check_resource(resource, label)?;
                    self.check_zone(from, label)?;
                    self.check_zone(to, label)?;
                    if from == to {
                        return Err(EngineError::config(format!(
                            "recipe '{label}' moves within one zone"
                        )));
                    }
                    if amount == 0 {
                        return Err(EngineError::config(format!(
                            "recipe '{label}' moves zero units"
                        )));
                    }
                }
                LedgerOp::Add {
                    resource,
                    zone,
                    delta,
                } => {
                    self.check_resource(resource, label)?;
                    self.check_zone(zone, label)?;
                    if zone == self.bank {
                        return Err(EngineError::config(format!(
                            "recipe '{label}' adjusts the bank"
                        )));
                    }
                    if delta == 0 {
                        return Err(EngineError::config(format!(
                            "recipe '{label}' adjusts by zero"
                        )));
                    }
                }
            }
            // Availability checks treat consuming ops independently, so a
            // recipe may debit a given cell at most once.
            if let Some((resource, zone, _)) = op.consumes(self.bank) {
                if consumed.contains(&(resource, zone)) {
                    return Err(EngineError::config(format!(
                        "recipe '{label}' debits the same cell twice"
                    )));
                }
                consumed.push((resource, zone));
            }
        }
        Ok(())
    }

    fn check_resource(&self, id: ResourceId, context: &str) -> EngineResult<()> {
        if id.index() >= self.resources.len() {
            return Err(EngineError::config(format!(
                "{context}: unknown resource id {}",
                id.index()
            )));
        }
        Ok(())
    }

    fn check_zone(&self, id: ZoneId, context: &str) -> EngineResult<()> {
        if id.index() >= self.zones.len() {
            return Err(EngineError::config(format!(
                "{context}: unknown zone id {}",
                id.index()
            )));
        }
        Ok(())
    }

    fn check_role(&self, id: ZoneId, role: ZoneRole) -> EngineResult<()> {
        self.check_zone(id, "structural zone")?;
        if self.zones[id.index()].role != role {
            return Err(EngineError::config(format!(
                "zone '{}' is not the {role:?} zone",
                self.zone_name(id)
            )));
        }
        Ok(())
    }

    fn check_rotation_member(&self, id: ZoneId, context: &str) -> EngineResult<()> {
        self.check_zone(id, context)?;
        if !self.rotation.contains(&id) {
            return Err(EngineError::config(format!(
                "{context}: zone '{}' is not in the rotation",
                self.zone_name(id)
            )));
        }
        Ok(())
    }
}
