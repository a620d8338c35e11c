//! Public entry point: battle odds from unit lists

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::BattleContext;
use crate::core::config::CalculatorConfig;
use crate::core::error::Result;
use crate::core::types::{PlayerId, UnitId};
use crate::results::AggregateResults;
use crate::rules::{BattleSite, RuleStore, TerritoryEffect};
use crate::tree::BattleTree;
use crate::units::UnitCatalog;

/// Anything that can estimate the outcome of a battle
pub trait BattleCalculator {
    /// Unit lists are taken in casualty order: earlier units are hit first.
    #[allow(clippy::too_many_arguments)]
    fn calculate(
        &self,
        attacker: &PlayerId,
        defender: &PlayerId,
        location: &BattleSite,
        attacking_units: &[UnitId],
        defending_units: &[UnitId],
        bombarding_units: &[UnitId],
        territory_effects: &[TerritoryEffect],
        retreat_when_only_air_left: bool,
        run_count: u32,
    ) -> Result<AggregateResults>;
}

/// Owned arguments of one [`BattleCalculator::calculate`] call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRequest {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub location: BattleSite,
    pub attacking_units: Vec<UnitId>,
    pub defending_units: Vec<UnitId>,
    #[serde(default)]
    pub bombarding_units: Vec<UnitId>,
    #[serde(default)]
    pub territory_effects: Vec<TerritoryEffect>,
    #[serde(default)]
    pub retreat_when_only_air_left: bool,
    #[serde(default = "default_run_count")]
    pub run_count: u32,
}

fn default_run_count() -> u32 {
    1
}

impl BattleRequest {
    pub fn new(
        attacker: PlayerId,
        defender: PlayerId,
        location: BattleSite,
        attacking_units: Vec<UnitId>,
        defending_units: Vec<UnitId>,
    ) -> Self {
        Self {
            attacker,
            defender,
            location,
            attacking_units,
            defending_units,
            bombarding_units: Vec::new(),
            territory_effects: Vec::new(),
            retreat_when_only_air_left: false,
            run_count: default_run_count(),
        }
    }
}

/// Exact calculator walking the full probability tree
///
/// Holds no per-call state; every calculation builds its own tree and caches,
/// so one instance can serve many threads.
#[derive(Debug, Clone)]
pub struct BattleTreeCalculator<C, R> {
    catalog: C,
    rules: R,
    config: CalculatorConfig,
}

impl<C: UnitCatalog, R: RuleStore> BattleTreeCalculator<C, R> {
    pub fn new(catalog: C, rules: R) -> Self {
        Self {
            catalog,
            rules,
            config: CalculatorConfig::default(),
        }
    }

    pub fn with_config(catalog: C, rules: R, config: CalculatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            rules,
            config,
        })
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn calculate_request(&self, request: &BattleRequest) -> Result<AggregateResults> {
        self.calculate(
            &request.attacker,
            &request.defender,
            &request.location,
            &request.attacking_units,
            &request.defending_units,
            &request.bombarding_units,
            &request.territory_effects,
            request.retreat_when_only_air_left,
            request.run_count,
        )
    }

    /// Independent battles on the rayon pool, results in request order
    pub fn calculate_batch(&self, requests: &[BattleRequest]) -> Vec<Result<AggregateResults>>
    where
        C: Sync,
        R: Sync,
    {
        requests
            .par_iter()
            .map(|request| self.calculate_request(request))
            .collect()
    }
}

impl<C: UnitCatalog, R: RuleStore> BattleCalculator for BattleTreeCalculator<C, R> {
    fn calculate(
        &self,
        attacker: &PlayerId,
        defender: &PlayerId,
        location: &BattleSite,
        attacking_units: &[UnitId],
        defending_units: &[UnitId],
        bombarding_units: &[UnitId],
        territory_effects: &[TerritoryEffect],
        retreat_when_only_air_left: bool,
        run_count: u32,
    ) -> Result<AggregateResults> {
        let start = Instant::now();
        if !bombarding_units.is_empty() {
            tracing::warn!(
                count = bombarding_units.len(),
                "bombarding units are not modelled and were ignored"
            );
        }
        tracing::debug!(
            run_count,
            retreat_when_only_air_left,
            "exact calculation ignores run count and retreat options"
        );

        let context = BattleContext::new(
            &self.catalog,
            &self.rules,
            &self.config,
            attacker.clone(),
            defender.clone(),
            location.clone(),
            attacking_units,
            defending_units,
            territory_effects,
        )?;
        let mut tree = BattleTree::new(&context, self.config);
        let root = tree.calculate().clone();
        let results = AggregateResults::from_root(&context, &root, start.elapsed(), tree.stats());

        tracing::debug!(
            site = %location.name,
            attacker_win = results.attacker_win,
            defender_win = results.defender_win,
            draw = results.draw,
            indeterminate = results.indeterminate,
            time_ms = results.time_ms,
            "battle calculated"
        );
        Ok(results)
    }
}
