//! Battle Tree - exact battle odds for dice-based strategy games
//!
//! Every combat round is expanded into all of its dice outcomes. Repeated
//! states share results through a cache, loops are closed with a truncated
//! geometric series and improbable branches are pruned.

pub mod calculator;
pub mod context;
pub mod core;
pub mod dice;
pub mod results;
pub mod rules;
pub mod scenario;
pub mod state;
pub mod targeting;
pub mod tree;
pub mod units;

#[cfg(test)]
mod testing;

pub use calculator::{BattleCalculator, BattleRequest, BattleTreeCalculator};
pub use crate::core::{CalculatorConfig, OddsError, PlayerId, Result, Side, UnitId};
pub use results::{AggregateResults, UnitSurvival};
pub use rules::{BattleSite, GameRules, RuleStore, TerritoryEffect};
pub use scenario::Scenario;
pub use units::{AaProfile, SupportProfile, UnitCatalog, UnitProfile, UnitRoster};
