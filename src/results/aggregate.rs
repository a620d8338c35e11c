use std::time::Duration;

use serde::Serialize;

use crate::context::BattleContext;
use crate::core::types::{Side, UnitId};
use crate::tree::{NodeResults, TreeStats};
use crate::units::CostTable;

/// Confidence thresholds averaged over when valuing surviving units
pub const THRESHOLD_SWEEP: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSurvival {
    pub unit: UnitId,
    pub type_name: String,
    /// Probability that the unit is not destroyed
    pub chance: f64,
}

/// Outcome distribution of one battle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResults {
    pub attacker_win: f64,
    pub defender_win: f64,
    pub draw: f64,
    /// Mass lost to pruning, round limits and loop truncation
    pub indeterminate: f64,
    pub average_rounds: f64,
    pub attacking_units: Vec<UnitSurvival>,
    pub defending_units: Vec<UnitSurvival>,
    pub time_ms: u64,
    /// Exact calculations count as a single run
    pub roll_count: u32,
    pub stats: TreeStats,
}

impl AggregateResults {
    pub fn from_root(
        context: &BattleContext,
        root: &NodeResults,
        elapsed: Duration,
        stats: TreeStats,
    ) -> Self {
        let survival = |side: Side| -> Vec<UnitSurvival> {
            context
                .units(side)
                .iter()
                .enumerate()
                .map(|(index, &unit)| UnitSurvival {
                    unit,
                    type_name: context.profile(side, index).type_name.clone(),
                    chance: root.survival(side, index),
                })
                .collect()
        };
        Self {
            attacker_win: root.win,
            defender_win: root.lose,
            draw: root.tie,
            indeterminate: root.indeterminate,
            average_rounds: root.average_rounds(),
            attacking_units: survival(Side::Attacker),
            defending_units: survival(Side::Defender),
            time_ms: elapsed.as_millis() as u64,
            roll_count: 1,
            stats,
        }
    }

    /// Mass of outcomes where the battle was decided
    pub fn decided(&self) -> f64 {
        self.attacker_win + self.defender_win + self.draw
    }

    fn normalized(&self, mass: f64) -> f64 {
        let decided = self.decided();
        if decided > 0.0 {
            mass / decided
        } else {
            0.0
        }
    }

    /// Attacker win chance among decided outcomes
    pub fn attacker_win_percent(&self) -> f64 {
        self.normalized(self.attacker_win)
    }

    pub fn defender_win_percent(&self) -> f64 {
        self.normalized(self.defender_win)
    }

    pub fn draw_percent(&self) -> f64 {
        self.normalized(self.draw)
    }

    pub fn units(&self, side: Side) -> &[UnitSurvival] {
        match side {
            Side::Attacker => &self.attacking_units,
            Side::Defender => &self.defending_units,
        }
    }

    /// Units of `side` surviving with more than `threshold` probability
    pub fn survivors_with_chance(&self, side: Side, threshold: f64) -> Vec<UnitId> {
        self.units(side)
            .iter()
            .filter(|unit| unit.chance > threshold)
            .map(|unit| unit.unit)
            .collect()
    }

    pub fn attackers_with_chance(&self, threshold: f64) -> Vec<UnitId> {
        self.survivors_with_chance(Side::Attacker, threshold)
    }

    pub fn defenders_with_chance(&self, threshold: f64) -> Vec<UnitId> {
        self.survivors_with_chance(Side::Defender, threshold)
    }

    /// Expected number of surviving units
    pub fn expected_survivors(&self, side: Side) -> f64 {
        self.units(side).iter().map(|unit| unit.chance).sum()
    }

    fn value_left(&self, side: Side, costs: &dyn CostTable) -> f64 {
        let total: f64 = THRESHOLD_SWEEP
            .iter()
            .map(|&threshold| {
                self.units(side)
                    .iter()
                    .filter(|unit| unit.chance > threshold)
                    .map(|unit| costs.cost(&unit.type_name))
                    .sum::<f64>()
            })
            .sum();
        total / THRESHOLD_SWEEP.len() as f64
    }

    fn value_fielded(&self, side: Side, costs: &dyn CostTable) -> f64 {
        self.units(side)
            .iter()
            .map(|unit| costs.cost(&unit.type_name))
            .sum()
    }

    /// (attacker, defender) value of surviving units, averaged over the sweep
    pub fn average_value_left(
        &self,
        attacker_costs: &dyn CostTable,
        defender_costs: &dyn CostTable,
    ) -> (f64, f64) {
        (
            self.value_left(Side::Attacker, attacker_costs),
            self.value_left(Side::Defender, defender_costs),
        )
    }

    /// (attacker, defender) value of destroyed units, averaged over the sweep
    pub fn average_value_lost(
        &self,
        attacker_costs: &dyn CostTable,
        defender_costs: &dyn CostTable,
    ) -> (f64, f64) {
        (
            self.value_fielded(Side::Attacker, attacker_costs)
                - self.value_left(Side::Attacker, attacker_costs),
            self.value_fielded(Side::Defender, defender_costs)
                - self.value_left(Side::Defender, defender_costs),
        )
    }

    /// Defender losses minus attacker losses; positive favours the attacker
    pub fn value_swing(&self, attacker_costs: &dyn CostTable, defender_costs: &dyn CostTable) -> f64 {
        let (attacker_lost, defender_lost) = self.average_value_lost(attacker_costs, defender_costs);
        defender_lost - attacker_lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;
    use approx::assert_abs_diff_eq;

    fn survival(unit: u32, type_name: &str, chance: f64) -> UnitSurvival {
        UnitSurvival {
            unit: UnitId(unit),
            type_name: type_name.to_string(),
            chance,
        }
    }

    fn sample() -> AggregateResults {
        AggregateResults {
            attacker_win: 0.2,
            defender_win: 0.5,
            draw: 0.1,
            indeterminate: 0.2,
            average_rounds: 1.5,
            attacking_units: vec![survival(0, "armour", 0.95), survival(1, "infantry", 0.25)],
            defending_units: vec![survival(2, "infantry", 0.55)],
            time_ms: 0,
            roll_count: 1,
            stats: TreeStats::default(),
        }
    }

    #[test]
    fn test_win_percent_ignores_indeterminate() {
        let results = sample();
        assert_abs_diff_eq!(results.decided(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(results.attacker_win_percent(), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(results.defender_win_percent(), 0.625, epsilon = 1e-12);
        assert_abs_diff_eq!(results.draw_percent(), 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_survivors_at_threshold() {
        let results = sample();
        assert_eq!(results.attackers_with_chance(0.5), vec![UnitId(0)]);
        assert_eq!(results.attackers_with_chance(0.2), vec![UnitId(0), UnitId(1)]);
        assert!(results.defenders_with_chance(0.6).is_empty());
        assert!(results.defenders_with_chance(0.55).is_empty());
        assert_eq!(results.attackers_with_chance(0.25), vec![UnitId(0)]);
        assert_abs_diff_eq!(results.expected_survivors(Side::Attacker), 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_value_sweep() {
        let results = sample();
        let mut costs = AHashMap::new();
        costs.insert("armour".to_string(), 5.0);
        costs.insert("infantry".to_string(), 3.0);

        let (attacker_left, defender_left) = results.average_value_left(&costs, &costs);
        // armour counts at all nine thresholds, infantry at 0.1 and 0.2
        assert_abs_diff_eq!(attacker_left, (9.0 * 5.0 + 2.0 * 3.0) / 9.0, epsilon = 1e-12);
        // defender infantry counts for 0.1..=0.5
        assert_abs_diff_eq!(defender_left, 5.0 * 3.0 / 9.0, epsilon = 1e-12);

        let (attacker_lost, defender_lost) = results.average_value_lost(&costs, &costs);
        assert_abs_diff_eq!(attacker_lost, 8.0 - attacker_left, epsilon = 1e-12);
        assert_abs_diff_eq!(
            results.value_swing(&costs, &costs),
            defender_lost - attacker_lost,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_value_sweep_skips_exact_threshold() {
        let results = AggregateResults {
            attacking_units: vec![survival(0, "armour", 0.5)],
            ..sample()
        };
        let mut costs = AHashMap::new();
        costs.insert("armour".to_string(), 9.0);

        // counted at 0.1..=0.4 only
        let (attacker_left, _) = results.average_value_left(&costs, &costs);
        assert_abs_diff_eq!(attacker_left, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nothing_decided() {
        let results = AggregateResults {
            attacker_win: 0.0,
            defender_win: 0.0,
            draw: 0.0,
            indeterminate: 1.0,
            ..sample()
        };
        assert_eq!(results.attacker_win_percent(), 0.0);
    }
}
