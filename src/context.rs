//! Everything about a battle that stays fixed while the tree is explored

use ahash::{AHashMap, AHashSet};

use crate::core::config::CalculatorConfig;
use crate::core::error::{OddsError, Result};
use crate::core::types::{PlayerId, Side, UnitId};
use crate::rules::{BattleSite, RuleStore, TerritoryEffect};
use crate::state::BattleState;
use crate::units::{UnitCatalog, UnitProfile};

/// Ruleset flags copied out of the rule store once per calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleFlags {
    pub dice_sides: u32,
    pub transport_casualties_restricted: bool,
    pub ww2v2: bool,
    pub defending_subs_sneak_attack: bool,
    pub damage_from_bombing_done_to_units: bool,
}

impl RuleFlags {
    pub fn from_store(rules: &dyn RuleStore) -> Self {
        Self {
            dice_sides: rules.dice_sides(),
            transport_casualties_restricted: rules.transport_casualties_restricted(),
            ww2v2: rules.ww2v2(),
            defending_subs_sneak_attack: rules.defending_subs_sneak_attack(),
            damage_from_bombing_done_to_units: rules.damage_from_bombing_done_to_units(),
        }
    }
}

/// Resolved inputs of one calculation
///
/// Unit lists are kept in the caller's casualty order; every index in a
/// [`BattleState`] refers to a position in these lists.
#[derive(Debug)]
pub struct BattleContext<'a> {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub site: BattleSite,
    pub rules: RuleFlags,
    pub territory_effects: Vec<TerritoryEffect>,
    units: [Vec<UnitId>; 2],
    profiles: [Vec<&'a UnitProfile>; 2],
    /// AA type -> attacker unit types that defending AA of that type may also hit
    airborne_targets: AHashMap<String, AHashSet<String>>,
    max_rounds: u32,
    round_horizon: u32,
}

impl<'a> BattleContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: &'a dyn UnitCatalog,
        rules: &dyn RuleStore,
        config: &CalculatorConfig,
        attacker: PlayerId,
        defender: PlayerId,
        site: BattleSite,
        attacking_units: &[UnitId],
        defending_units: &[UnitId],
        territory_effects: &[TerritoryEffect],
    ) -> Result<Self> {
        let resolve = |units: &[UnitId]| -> Result<Vec<&'a UnitProfile>> {
            units
                .iter()
                .map(|&unit| catalog.profile(unit).ok_or(OddsError::UnknownUnit(unit)))
                .collect()
        };
        let profiles = [resolve(attacking_units)?, resolve(defending_units)?];

        let mut airborne_targets: AHashMap<String, AHashSet<String>> = AHashMap::new();
        for profile in &profiles[Side::Defender.index()] {
            if let Some(aa) = &profile.aa {
                if let Some(types) = rules.airborne_types(&attacker, &aa.aa_type) {
                    airborne_targets
                        .entry(aa.aa_type.clone())
                        .or_default()
                        .extend(types.iter().cloned());
                }
            }
        }

        let flags = RuleFlags::from_store(rules);
        let max_rounds = config.effective_max_rounds(rules.max_rounds(site.is_water));
        let aa_horizon = profiles
            .iter()
            .flatten()
            .filter_map(|profile| profile.aa.as_ref().and_then(|aa| aa.round_limit()))
            .max()
            .unwrap_or(0);
        let transport_horizon = if flags.transport_casualties_restricted { 2 } else { 0 };

        Ok(Self {
            attacker,
            defender,
            site,
            rules: flags,
            territory_effects: territory_effects.to_vec(),
            units: [attacking_units.to_vec(), defending_units.to_vec()],
            profiles,
            airborne_targets,
            max_rounds,
            round_horizon: aa_horizon.max(transport_horizon),
        })
    }

    pub fn profile(&self, side: Side, unit: usize) -> &'a UnitProfile {
        self.profiles[side.index()][unit]
    }

    pub fn profiles(&self, side: Side) -> &[&'a UnitProfile] {
        &self.profiles[side.index()]
    }

    pub fn units(&self, side: Side) -> &[UnitId] {
        &self.units[side.index()]
    }

    pub fn unit_count(&self, side: Side) -> usize {
        self.units[side.index()].len()
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Rounds after which round number no longer changes what can happen
    pub fn round_horizon(&self) -> u32 {
        self.round_horizon
    }

    pub fn round_bucket(&self, round: u32) -> u32 {
        round.min(self.round_horizon)
    }

    pub fn airborne_targets(&self, aa_type: &str) -> Option<&AHashSet<String>> {
        self.airborne_targets.get(aa_type)
    }

    /// Infrastructure never keeps a battle alive and is never a regular target
    pub fn is_infrastructure(&self, side: Side, unit: usize) -> bool {
        let profile = self.profile(side, unit);
        profile.is_infrastructure
            || (self.rules.damage_from_bombing_done_to_units && profile.can_be_damaged)
    }

    /// Units whose presence keeps a side in the fight
    pub fn is_combatant(&self, side: Side, unit: usize) -> bool {
        if self.is_infrastructure(side, unit) {
            return false;
        }
        !(self.rules.transport_casualties_restricted
            && self.profile(side, unit).is_non_combat_transport())
    }

    pub fn has_destroyer(&self, state: &BattleState, side: Side) -> bool {
        state
            .alive_or_damaged(side)
            .any(|unit| self.profile(side, unit).is_destroyer)
    }

    /// Unit may fight at this site
    pub fn fits_terrain(&self, side: Side, unit: usize) -> bool {
        let profile = self.profile(side, unit);
        if self.site.is_water {
            !profile.is_land()
        } else {
            !profile.is_sea
        }
    }

    pub fn initial_state(&self) -> BattleState {
        let hit_points = |side: Side| -> Vec<u32> {
            self.profiles(side)
                .iter()
                .map(|profile| profile.hit_points.max(1))
                .collect()
        };
        BattleState::new(&hit_points(Side::Attacker), &hit_points(Side::Defender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::GameRules;
    use crate::units::{AaProfile, UnitRoster};

    #[test]
    fn test_unknown_unit_is_an_error() {
        let roster = UnitRoster::new();
        let rules = GameRules::default();
        let err = BattleContext::new(
            &roster,
            &rules,
            &CalculatorConfig::default(),
            PlayerId::new("a"),
            PlayerId::new("d"),
            BattleSite::land("nowhere"),
            &[UnitId(4)],
            &[],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, OddsError::UnknownUnit(UnitId(4))));
    }

    #[test]
    fn test_round_horizon_from_aa_and_rules() {
        let mut roster = UnitRoster::new()
            .with_type(UnitProfile::new("fighter", 3, 4).air())
            .with_type(
                UnitProfile::new("aa_gun", 0, 0)
                    .infrastructure()
                    .with_aa(AaProfile::new("AA", 1, ["fighter"])),
            );
        let fighter = roster.spawn("fighter").unwrap();
        let gun = roster.spawn("aa_gun").unwrap();
        let rules = GameRules {
            land_battle_rounds: Some(3),
            ..Default::default()
        };
        let context = BattleContext::new(
            &roster,
            &rules,
            &CalculatorConfig::default(),
            PlayerId::new("a"),
            PlayerId::new("d"),
            BattleSite::land("Berlin"),
            &[fighter],
            &[gun],
            &[],
        )
        .unwrap();
        assert_eq!(context.max_rounds(), 3);
        assert_eq!(context.round_horizon(), 1);
        assert_eq!(context.round_bucket(5), 1);
        assert!(context.is_infrastructure(Side::Defender, 0));
        assert!(!context.is_combatant(Side::Defender, 0));
        assert!(context.is_combatant(Side::Attacker, 0));
    }
}
