//! Ruleset flags and battlefield context consumed by the calculator

pub mod game_rules;
pub mod site;

pub use game_rules::{GameRules, RuleStore, DEFAULT_DICE_SIDES};
pub use site::{BattleSite, TerritoryEffect};
