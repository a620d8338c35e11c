use crate::core::types::Side;
use crate::state::BattleState;

/// Probability mass of a subtree, split by how the battle ends
///
/// While a node is being expanded this accumulates the weighted results of
/// its finished children; once resolved the masses sum to 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeResults {
    pub win: f64,
    pub lose: f64,
    pub tie: f64,
    pub indeterminate: f64,
    /// Probability-weighted round at which each outcome was reached
    pub rounds: f64,
    /// Per-unit survival mass, indexed by side then unit. Empty means zero.
    pub survival: [Vec<f64>; 2],
}

impl NodeResults {
    pub fn total(&self) -> f64 {
        self.win + self.lose + self.tie + self.indeterminate
    }

    /// Mass of outcomes that decided the battle
    pub fn decided(&self) -> f64 {
        self.win + self.lose + self.tie
    }

    /// Expected rounds over the accumulated mass
    pub fn average_rounds(&self) -> f64 {
        let total = self.total();
        if total > 0.0 {
            self.rounds / total
        } else {
            0.0
        }
    }

    pub fn survival(&self, side: Side, unit: usize) -> f64 {
        self.survival[side.index()].get(unit).copied().unwrap_or(0.0)
    }

    /// Fold `other` in with the given weight
    pub fn add_scaled(&mut self, other: &NodeResults, weight: f64) {
        self.win += other.win * weight;
        self.lose += other.lose * weight;
        self.tie += other.tie * weight;
        self.indeterminate += other.indeterminate * weight;
        self.rounds += other.rounds * weight;
        for (mine, theirs) in self.survival.iter_mut().zip(other.survival.iter()) {
            if theirs.is_empty() {
                continue;
            }
            if mine.len() < theirs.len() {
                mine.resize(theirs.len(), 0.0);
            }
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b * weight;
            }
        }
    }

    /// Credit every unit that was not destroyed in `state`
    pub fn record_survivors(&mut self, state: &BattleState, weight: f64) {
        for side in Side::BOTH {
            let count = state.unit_count(side);
            let survival = &mut self.survival[side.index()];
            if survival.len() < count {
                survival.resize(count, 0.0);
            }
            for unit in state.survivors(side) {
                survival[unit] += weight;
            }
        }
    }

    /// Same results seen from a node `round` rounds later
    pub fn shifted(&self, round: u32) -> NodeResults {
        let mut shifted = self.clone();
        shifted.rounds += round as f64 * self.total();
        shifted
    }

    /// Inverse of [`NodeResults::shifted`]
    pub fn relative_to(&self, round: u32) -> NodeResults {
        let mut relative = self.clone();
        relative.rounds -= round as f64 * self.total();
        relative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_add_scaled_grows_survival() {
        let mut parent = NodeResults::default();
        let child = NodeResults {
            win: 1.0,
            rounds: 2.0,
            survival: [vec![1.0, 0.0], vec![]],
            ..Default::default()
        };
        parent.add_scaled(&child, 0.25);
        parent.add_scaled(&child, 0.5);
        assert_abs_diff_eq!(parent.win, 0.75);
        assert_abs_diff_eq!(parent.rounds, 1.5);
        assert_eq!(parent.survival[0], vec![0.75, 0.0]);
        assert!(parent.survival[1].is_empty());
        assert_abs_diff_eq!(parent.average_rounds(), 2.0);
    }

    #[test]
    fn test_shift_round_trip() {
        let results = NodeResults {
            lose: 0.5,
            tie: 0.5,
            rounds: 3.0,
            ..Default::default()
        };
        let relative = results.relative_to(2);
        assert_abs_diff_eq!(relative.rounds, 1.0);
        assert_eq!(relative.shifted(2), results);
    }

    #[test]
    fn test_record_survivors_counts_retreated_units() {
        let mut state = BattleState::new(&[1, 1], &[1]);
        state.kill(Side::Attacker, 0);
        state.retreat(Side::Defender, 0);
        let mut results = NodeResults::default();
        results.record_survivors(&state, 0.5);
        assert_eq!(results.survival[0], vec![0.0, 0.5]);
        assert_eq!(results.survival[1], vec![0.5]);
    }
}
