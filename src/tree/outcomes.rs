//! Child states produced by one phase of fire

use indexmap::IndexMap;

use crate::context::BattleContext;
use crate::core::types::Side;
use crate::dice::HitProbabilityMemo;
use crate::state::{BattleState, Phase};
use crate::targeting::{
    aa_roll_groups, regular_roll_groups, return_fire_against_attacking_subs,
    return_fire_against_defending_subs, ReturnFire, RollGroup,
};

/// Distinct child states with their summed probabilities, in first-seen order
#[derive(Debug, Default)]
struct OutcomeSet {
    states: IndexMap<BattleState, f64, ahash::RandomState>,
}

impl OutcomeSet {
    fn add(&mut self, state: BattleState, probability: f64) {
        if probability <= 0.0 {
            return;
        }
        *self.states.entry(state).or_insert(0.0) += probability;
    }

    /// Heaviest losses for the side that was fired at come first, so the
    /// outcome where nothing happened is explored last
    fn into_sorted(self, target_side: Side) -> Vec<BattleState> {
        let mut outcomes: Vec<BattleState> = self
            .states
            .into_iter()
            .map(|(mut state, probability)| {
                state.set_probability(probability);
                state
            })
            .collect();
        outcomes.sort_by(|a, b| {
            b.damaged_or_dead_count(target_side)
                .cmp(&a.damaged_or_dead_count(target_side))
                .then_with(|| {
                    a.remaining_hit_points(target_side)
                        .cmp(&b.remaining_hit_points(target_side))
                })
        });
        outcomes
    }
}

struct Volley<'c, 'a> {
    context: &'c BattleContext<'a>,
    memo: &'c mut HitProbabilityMemo,
    groups: &'c [RollGroup],
    firing_side: Side,
    target_side: Side,
    return_fire: ReturnFire,
}

impl Volley<'_, '_> {
    fn strike(&self, state: &mut BattleState, target: usize) {
        let side = self.target_side;
        match self.return_fire {
            ReturnFire::All => state.hit(side, target),
            ReturnFire::Subs if self.context.profile(side, target).is_first_strike => {
                state.hit(side, target)
            }
            ReturnFire::Subs | ReturnFire::None => state.kill(side, target),
        }
    }

    /// Branch on the hit count of group `index`, then recurse into the rest
    ///
    /// Each hit count below the number of assignable hits gets its exact
    /// probability; the last branch takes the remaining mass, which covers
    /// every roll that scores at least as many hits as there are targets.
    fn enumerate(&mut self, index: usize, current: BattleState, probability: f64, out: &mut OutcomeSet) {
        let groups = self.groups;
        let Some(group) = groups.get(index) else {
            out.add(current, probability);
            return;
        };
        let distribution = self.memo.hit_distribution(&group.roll_data);
        let alive_targets: Vec<usize> = group
            .targets
            .iter()
            .copied()
            .filter(|&target| current.is_alive(self.target_side, target))
            .collect();
        let assignments = current.multi_hit_targets(self.target_side, &alive_targets);
        let total_rolls = group.roll_data.total_rolls() as usize;

        let mut state = current;
        let mut accounted = 0.0;
        for (hits, &target) in assignments.iter().enumerate() {
            if hits >= total_rolls {
                break;
            }
            let exact = distribution[hits];
            accounted += exact;
            self.enumerate(index + 1, state.clone(), probability * exact, out);

            self.strike(&mut state, target);
            if group.suicide_on_hit {
                if let Some(&firer) = group.firing.get(hits) {
                    state.hit(self.firing_side, firer);
                }
            }
        }
        let remainder = (1.0 - accounted).max(0.0);
        self.enumerate(index + 1, state, probability * remainder, out);
    }
}

/// Every distinct state reachable by the current phase's fire
///
/// Children are already advanced to the next phase and carry their
/// probability relative to `state`.
pub fn fight_outcomes(
    context: &BattleContext,
    memo: &mut HitProbabilityMemo,
    state: &BattleState,
    round: u32,
) -> Vec<BattleState> {
    let phase = state.phase();
    let (groups, return_fire) = match phase {
        Phase::AaAttacker | Phase::AaDefender => (aa_roll_groups(context, state, round), ReturnFire::All),
        Phase::SubAttacker => (
            regular_roll_groups(context, state, true),
            return_fire_against_attacking_subs(context, state),
        ),
        Phase::SubDefender => (
            regular_roll_groups(context, state, true),
            return_fire_against_defending_subs(context, state),
        ),
        Phase::Attacker | Phase::Defender => (regular_roll_groups(context, state, false), ReturnFire::All),
    };

    let firing_side = state.friendly();
    let target_side = state.enemy();
    let mut next = state.clone();
    next.swap_sides();

    let mut outcomes = OutcomeSet::default();
    let mut volley = Volley {
        context,
        memo,
        groups: &groups,
        firing_side,
        target_side,
        return_fire,
    };
    volley.enumerate(0, next, 1.0, &mut outcomes);
    outcomes.into_sorted(target_side)
}
