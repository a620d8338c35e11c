//! Self-contained battle descriptions loaded from TOML
//!
//! A scenario carries its own unit types, rules and costs, so it doubles as a
//! concrete [`UnitCatalog`](crate::units::UnitCatalog) and
//! [`RuleStore`](crate::rules::RuleStore) for the calculator.
//!
//! ```toml
//! name = "Infantry duel"
//!
//! [battle]
//! location = "Karelia"
//! attacker = "Russians"
//! defender = "Germans"
//! attackers = ["infantry", { unit_type = "armour", count = 2 }]
//! defenders = ["infantry"]
//!
//! [[unit_types]]
//! type_name = "infantry"
//! attack = 1
//! defense = 2
//!
//! [costs]
//! infantry = 3.0
//! ```

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::calculator::{BattleRequest, BattleTreeCalculator};
use crate::core::config::CalculatorConfig;
use crate::core::error::{OddsError, Result};
use crate::core::types::{PlayerId, UnitId};
use crate::results::AggregateResults;
use crate::rules::{BattleSite, GameRules, TerritoryEffect};
use crate::units::{UnitProfile, UnitRoster};

/// A unit type name, optionally repeated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitEntry {
    Single(String),
    Counted { unit_type: String, count: usize },
}

impl UnitEntry {
    fn unit_type(&self) -> &str {
        match self {
            UnitEntry::Single(name) => name,
            UnitEntry::Counted { unit_type, .. } => unit_type,
        }
    }

    fn count(&self) -> usize {
        match self {
            UnitEntry::Single(_) => 1,
            UnitEntry::Counted { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSetup {
    pub location: String,
    #[serde(default)]
    pub is_water: bool,
    #[serde(default = "default_attacker")]
    pub attacker: String,
    #[serde(default = "default_defender")]
    pub defender: String,
    /// Casualty order: earlier entries are hit first
    pub attackers: Vec<UnitEntry>,
    pub defenders: Vec<UnitEntry>,
    #[serde(default)]
    pub bombarding: Vec<UnitEntry>,
    /// Names of territory effects active at the location
    #[serde(default)]
    pub territory_effects: Vec<String>,
    #[serde(default)]
    pub retreat_when_only_air_left: bool,
}

fn default_attacker() -> String {
    "Attacker".to_string()
}

fn default_defender() -> String {
    "Defender".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub battle: BattleSetup,
    #[serde(default)]
    pub rules: GameRules,
    #[serde(default)]
    pub config: CalculatorConfig,
    #[serde(default)]
    pub unit_types: Vec<UnitProfile>,
    #[serde(default)]
    pub territory_effects: Vec<TerritoryEffect>,
    #[serde(default)]
    pub costs: AHashMap<String, f64>,
}

/// Calculator and request built from a scenario
pub struct PreparedBattle {
    pub calculator: BattleTreeCalculator<UnitRoster, GameRules>,
    pub request: BattleRequest,
}

impl Scenario {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_toml_str(&text)?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        tracing::debug!(name = %scenario.name, path = %path.display(), "loaded scenario");
        Ok(scenario)
    }

    /// Register the unit types and spawn every listed unit in order
    pub fn prepare(&self) -> Result<PreparedBattle> {
        let mut roster = UnitRoster::new();
        for profile in &self.unit_types {
            roster.add_type(profile.clone());
        }

        let spawn = |roster: &mut UnitRoster, entries: &[UnitEntry]| -> Result<Vec<UnitId>> {
            let mut units = Vec::new();
            for entry in entries {
                units.extend(roster.spawn_many(entry.unit_type(), entry.count())?);
            }
            Ok(units)
        };
        let attacking_units = spawn(&mut roster, &self.battle.attackers)?;
        let defending_units = spawn(&mut roster, &self.battle.defenders)?;
        let bombarding_units = spawn(&mut roster, &self.battle.bombarding)?;

        let territory_effects = self
            .battle
            .territory_effects
            .iter()
            .map(|name| {
                self.territory_effects
                    .iter()
                    .find(|effect| &effect.name == name)
                    .cloned()
                    .ok_or_else(|| OddsError::InvalidConfig(format!("unknown territory effect: {name}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let location = BattleSite {
            name: self.battle.location.clone(),
            is_water: self.battle.is_water,
        };
        let request = BattleRequest {
            attacker: PlayerId::new(&self.battle.attacker),
            defender: PlayerId::new(&self.battle.defender),
            location,
            attacking_units,
            defending_units,
            bombarding_units,
            territory_effects,
            retreat_when_only_air_left: self.battle.retreat_when_only_air_left,
            run_count: 1,
        };
        let calculator = BattleTreeCalculator::with_config(roster, self.rules.clone(), self.config)?;
        Ok(PreparedBattle { calculator, request })
    }

    pub fn run(&self) -> Result<AggregateResults> {
        let prepared = self.prepare()?;
        prepared.calculator.calculate_request(&prepared.request)
    }
}
