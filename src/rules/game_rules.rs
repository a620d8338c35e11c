//! Rule store seam and its serde-backed implementation

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::PlayerId;

pub const DEFAULT_DICE_SIDES: u32 = 6;

/// Game-wide property lookups the combat engine depends on
pub trait RuleStore {
    fn dice_sides(&self) -> u32;

    /// Round limit for land or sea battles, `None` when unlimited
    fn max_rounds(&self, is_water: bool) -> Option<u32>;

    fn transport_casualties_restricted(&self) -> bool;

    fn ww2v2(&self) -> bool;

    fn defending_subs_sneak_attack(&self) -> bool;

    /// Bombing damages units instead of destroying them
    fn damage_from_bombing_done_to_units(&self) -> bool;

    /// Airborne unit types of `player` that AA of `aa_type` may fire at
    fn airborne_types(&self, player: &PlayerId, aa_type: &str) -> Option<&AHashSet<String>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub dice_sides: u32,
    /// Zero or absent means unlimited
    pub land_battle_rounds: Option<u32>,
    pub sea_battle_rounds: Option<u32>,
    pub transport_casualties_restricted: bool,
    pub ww2v2: bool,
    pub defending_subs_sneak_attack: bool,
    pub damage_from_bombing_done_to_units: bool,
    /// player -> AA type -> airborne unit types it may target
    pub airborne_targets: AHashMap<String, AHashMap<String, AHashSet<String>>>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            dice_sides: DEFAULT_DICE_SIDES,
            land_battle_rounds: None,
            sea_battle_rounds: None,
            transport_casualties_restricted: false,
            ww2v2: false,
            defending_subs_sneak_attack: false,
            damage_from_bombing_done_to_units: false,
            airborne_targets: AHashMap::new(),
        }
    }
}

impl RuleStore for GameRules {
    fn dice_sides(&self) -> u32 {
        self.dice_sides
    }

    fn max_rounds(&self, is_water: bool) -> Option<u32> {
        let limit = if is_water {
            self.sea_battle_rounds
        } else {
            self.land_battle_rounds
        };
        limit.filter(|&rounds| rounds > 0)
    }

    fn transport_casualties_restricted(&self) -> bool {
        self.transport_casualties_restricted
    }

    fn ww2v2(&self) -> bool {
        self.ww2v2
    }

    fn defending_subs_sneak_attack(&self) -> bool {
        self.defending_subs_sneak_attack
    }

    fn damage_from_bombing_done_to_units(&self) -> bool {
        self.damage_from_bombing_done_to_units
    }

    fn airborne_types(&self, player: &PlayerId, aa_type: &str) -> Option<&AHashSet<String>> {
        self.airborne_targets
            .get(player.as_str())
            .and_then(|by_aa| by_aa.get(aa_type))
    }
}
