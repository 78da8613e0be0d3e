//! Grange definition: catalogue, prices and policies.

use std::sync::Arc;

use smallvec::smallvec;

use crate::core::{
    ApFormula, EndRule, EngineResult, GameParams, GameState, MarketConfig, PriceEntry,
    PromotionConfig, RecipeConfig, RecipeId, RecruitConfig, ResourceId, ZoneId,
};
use crate::model::ForwardModel;

/// Typed handles into the grange catalogue.
///
/// Every resource, zone and recipe the game defines is exposed as a public
/// id field, so drivers and tests never match on display names.
#[derive(Clone, Debug)]
pub struct Grange {
    /// Shared parameter set; every state built from this definition points here.
    pub params: Arc<GameParams>,
    /// Seats the definition was built for.
    pub player_count: usize,

    // Goods.
    pub grain: ResourceId,
    pub hive: ResourceId,
    pub honey: ResourceId,
    pub wax: ResourceId,
    pub herbs: ResourceId,
    pub bread: ResourceId,
    pub ale: ResourceId,
    pub mead: ResourceId,
    pub balm: ResourceId,
    pub candle: ResourceId,
    pub parchment: ResourceId,
    pub hide: ResourceId,
    pub pennies: ResourceId,

    // Grounds. `supply` is the bank, `store` the tracked pool, `dormitory`
    // the holding zone; the rest form the rotation in walk order.
    pub supply: ZoneId,
    pub store: ZoneId,
    pub dormitory: ZoneId,
    pub field: ZoneId,
    pub brewhouse: ZoneId,
    pub workshop: ZoneId,
    pub market: ZoneId,
    pub chapel: ZoneId,

    // Recipes, in catalogue order.
    pub sow: RecipeId,
    pub harvest: RecipeId,
    pub set_hive: RecipeId,
    pub collect_hive: RecipeId,
    pub forage: RecipeId,
    pub bake: RecipeId,
    pub brew_ale: RecipeId,
    pub brew_mead: RecipeId,
    pub mix_balm: RecipeId,
    pub weave_hive: RecipeId,
    pub dip_candle: RecipeId,
    pub cure_parchment: RecipeId,
    pub solicit_alms: RecipeId,
}

impl Grange {
    /// Season indices, in rotation order.
    pub const SPRING: u8 = 0;
    pub const SUMMER: u8 = 1;
    pub const AUTUMN: u8 = 2;
    pub const WINTER: u8 = 3;

    /// Build a fresh initial state from this definition.
    pub fn setup(&self, seed: u64) -> EngineResult<GameState> {
        ForwardModel::setup(Arc::clone(&self.params), self.player_count, seed)
    }
}

/// Builder for the grange definition.
///
/// Defaults to three rounds and a one-in-two forage.
pub struct GrangeBuilder {
    player_count: usize,
    rounds: u32,
    forage_chance: f64,
}

impl GrangeBuilder {
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            rounds: 3,
            forage_chance: 0.5,
        }
    }

    /// Override the number of rounds the game runs for.
    #[must_use]
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Override the forage success probability.
    #[must_use]
    pub fn with_forage_chance(mut self, chance: f64) -> Self {
        self.forage_chance = chance;
        self
    }

    /// Build the definition and its initial state.
    pub fn build(self, seed: u64) -> EngineResult<(Grange, GameState)> {
        let grange = self.define();
        let state = grange.setup(seed)?;
        Ok((grange, state))
    }

    fn define(&self) -> Grange {
        let mut params = GameParams::new("grange", "supply", "storeroom", "dormitory");
        params.set_seasons(&["spring", "summer", "autumn", "winter"]);

        let grain = params.add_resource("grain");
        let hive = params.add_resource("hive");
        let honey = params.add_resource("honey");
        let wax = params.add_resource("wax");
        let herbs = params.add_resource("herbs");
        let bread = params.add_resource("bread");
        let ale = params.add_resource("ale");
        let mead = params.add_resource("mead");
        let balm = params.add_resource("balm");
        let candle = params.add_resource("candle");
        let parchment = params.add_resource("parchment");
        let hide = params.add_resource("hide");
        let pennies = params.add_resource("pennies");

        let field = params.add_area("field");
        let brewhouse = params.add_area("brewhouse");
        let workshop = params.add_area("workshop");
        let market = params.add_area("market");
        let chapel = params.add_area("chapel");

        let supply = params.bank;
        let store = params.store;
        let dormitory = params.holding;

        params.set_currency(pennies);
        params.set_ap_formula(ApFormula::SumRanks);
        params.set_end_rule(EndRule::RoundLimit(self.rounds));
        params.set_starting_ranks(&[1, 1, 2, 2, 3, 3]);
        for (resource, count) in [
            (grain, 2),
            (hive, 2),
            (honey, 2),
            (wax, 2),
            (bread, 2),
            (pennies, 6),
        ] {
            params.add_starting_stock(resource, store, count);
        }

        // Field work follows the seasons; grain and hives mature in place
        // and pay out in autumn.
        let sow = params.add_recipe(
            RecipeConfig::new("sow grain", field, 1)
                .in_seasons(&[Grange::SPRING])
                .moves(grain, supply, field, 1),
        );
        let harvest = params.add_recipe(
            RecipeConfig::new("harvest grain", field, 1)
                .in_seasons(&[Grange::AUTUMN])
                .moves(grain, field, store, 1),
        );
        let set_hive = params.add_recipe(
            RecipeConfig::new("set hive", field, 1)
                .in_seasons(&[Grange::SPRING, Grange::SUMMER])
                .moves(hive, store, field, 1),
        );
        let collect_hive = params.add_recipe(
            RecipeConfig::new("collect hive", field, 1)
                .in_seasons(&[Grange::AUTUMN])
                .moves(hive, field, supply, 1)
                .moves(honey, supply, store, 1)
                .moves(wax, supply, store, 1),
        );
        let forage = params.add_recipe(
            RecipeConfig::new("forage", field, 1)
                .with_chance(self.forage_chance)
                .moves(herbs, supply, store, 1),
        );

        // Indoor crafts run all year.
        let bake = params.add_recipe(
            RecipeConfig::new("bake bread", brewhouse, 1)
                .moves(grain, store, supply, 1)
                .moves(bread, supply, store, 2),
        );
        let brew_ale = params.add_recipe(
            RecipeConfig::new("brew ale", brewhouse, 2)
                .moves(grain, store, supply, 1)
                .moves(ale, supply, store, 1),
        );
        let brew_mead = params.add_recipe(
            RecipeConfig::new("brew mead", brewhouse, 2)
                .moves(honey, store, supply, 1)
                .moves(mead, supply, store, 1),
        );
        let mix_balm = params.add_recipe(
            RecipeConfig::new("mix balm", brewhouse, 2)
                .also_in(workshop)
                .moves(herbs, store, supply, 1)
                .moves(balm, supply, store, 1),
        );
        let weave_hive = params
            .add_recipe(RecipeConfig::new("weave hive", workshop, 1).moves(hive, supply, store, 1));
        let dip_candle = params.add_recipe(
            RecipeConfig::new("dip candle", workshop, 2)
                .moves(wax, store, supply, 1)
                .moves(candle, supply, store, 1),
        );
        let cure_parchment = params.add_recipe(
            RecipeConfig::new("cure parchment", workshop, 2)
                .moves(hide, store, supply, 1)
                .moves(parchment, supply, store, 1),
        );
        let solicit_alms = params.add_recipe(
            RecipeConfig::new("solicit alms", market, 1).moves(pennies, supply, store, 1),
        );

        params.set_market(MarketConfig {
            area: market,
            ap: 1,
            buys: vec![
                PriceEntry {
                    resource: bread,
                    price: 2,
                },
                PriceEntry {
                    resource: grain,
                    price: 3,
                },
                PriceEntry {
                    resource: hide,
                    price: 3,
                },
            ],
            sells: vec![
                PriceEntry {
                    resource: bread,
                    price: 1,
                },
                PriceEntry {
                    resource: ale,
                    price: 2,
                },
                PriceEntry {
                    resource: mead,
                    price: 3,
                },
            ],
        });
        params.set_recruit(RecruitConfig {
            area: market,
            ap: 3,
            price: 6,
            rank: 1,
        });
        params.set_promotion(PromotionConfig {
            areas: smallvec![chapel],
            ap: 1,
        });
        for (resource, weight) in [
            (pennies, 1),
            (bread, 1),
            (ale, 2),
            (candle, 2),
            (balm, 2),
            (mead, 3),
            (parchment, 3),
        ] {
            params.add_score_weight(resource, weight);
        }

        Grange {
            params: Arc::new(params),
            player_count: self.player_count,
            grain,
            hive,
            honey,
            wax,
            herbs,
            bread,
            ale,
            mead,
            balm,
            candle,
            parchment,
            hide,
            pennies,
            supply,
            store,
            dormitory,
            field,
            brewhouse,
            workshop,
            market,
            chapel,
            sow,
            harvest,
            set_hive,
            collect_hive,
            forage,
            bake,
            brew_ale,
            brew_mead,
            mix_balm,
            weave_hive,
            dip_candle,
            cure_parchment,
            solicit_alms,
        }
    }
}
