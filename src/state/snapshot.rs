use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::core::types::Side;
use crate::state::phase::Phase;
use crate::state::unit_set::UnitSet;

/// Casualty bookkeeping for one side of the battle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SideUnits {
    count: usize,
    dead: UnitSet,
    /// Hit this phase cycle, still firing until the next removal step
    damaged: UnitSet,
    retreated: UnitSet,
    /// (unit, hit points left) for units that started with more than one
    hit_points: SmallVec<[(u32, u32); 4]>,
}

impl SideUnits {
    fn new(max_hit_points: &[u32]) -> Self {
        let count = max_hit_points.len();
        let hit_points = max_hit_points
            .iter()
            .enumerate()
            .filter(|(_, &hp)| hp > 1)
            .map(|(unit, &hp)| (unit as u32, hp))
            .collect();
        Self {
            count,
            dead: UnitSet::with_capacity(count),
            damaged: UnitSet::with_capacity(count),
            retreated: UnitSet::with_capacity(count),
            hit_points,
        }
    }

    fn hit_points_entry(&mut self, unit: usize) -> Option<&mut u32> {
        self.hit_points
            .iter_mut()
            .find(|(id, _)| *id as usize == unit)
            .map(|(_, hp)| hp)
    }

    fn hit_points_left(&self, unit: usize) -> u32 {
        if self.dead.contains(unit) || self.damaged.contains(unit) {
            return 0;
        }
        self.hit_points
            .iter()
            .find(|(id, _)| *id as usize == unit)
            .map_or(1, |&(_, hp)| hp)
    }

    fn is_alive(&self, unit: usize) -> bool {
        !self.dead.contains(unit) && !self.damaged.contains(unit) && !self.retreated.contains(unit)
    }
}

/// Snapshot of a battle between two phases
///
/// Unit indices refer to the fixed casualty-ordered lists of each side; the
/// lists themselves live in the battle context and are never reshuffled.
/// Equality and hashing cover the phase and casualty bookkeeping only, never
/// the probability or the order in which units retreated.
#[derive(Debug, Clone)]
pub struct BattleState {
    phase: Phase,
    sides: [SideUnits; 2],
    retreat_order: [Vec<usize>; 2],
    probability: f64,
}

impl BattleState {
    /// Fresh battle at the start of the first round
    pub fn new(attacker_hit_points: &[u32], defender_hit_points: &[u32]) -> Self {
        Self {
            phase: Phase::AaAttacker,
            sides: [
                SideUnits::new(attacker_hit_points),
                SideUnits::new(defender_hit_points),
            ],
            retreat_order: [Vec::new(), Vec::new()],
            probability: 1.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Side firing in the current phase
    pub fn friendly(&self) -> Side {
        self.phase.firing_side()
    }

    pub fn enemy(&self) -> Side {
        self.friendly().opposite()
    }

    /// Probability relative to the parent state
    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn set_probability(&mut self, probability: f64) {
        self.probability = probability;
    }

    fn side(&self, side: Side) -> &SideUnits {
        &self.sides[side.index()]
    }

    fn side_mut(&mut self, side: Side) -> &mut SideUnits {
        &mut self.sides[side.index()]
    }

    pub fn unit_count(&self, side: Side) -> usize {
        self.side(side).count
    }

    pub fn is_alive(&self, side: Side, unit: usize) -> bool {
        self.side(side).is_alive(unit)
    }

    pub fn is_alive_or_damaged(&self, side: Side, unit: usize) -> bool {
        let units = self.side(side);
        !units.dead.contains(unit) && !units.retreated.contains(unit)
    }

    pub fn is_dead(&self, side: Side, unit: usize) -> bool {
        self.side(side).dead.contains(unit)
    }

    pub fn is_damaged(&self, side: Side, unit: usize) -> bool {
        self.side(side).damaged.contains(unit)
    }

    pub fn is_retreated(&self, side: Side, unit: usize) -> bool {
        self.side(side).retreated.contains(unit)
    }

    pub fn alive(&self, side: Side) -> impl Iterator<Item = usize> + '_ {
        let units = self.side(side);
        (0..units.count).filter(move |&unit| units.is_alive(unit))
    }

    pub fn alive_or_damaged(&self, side: Side) -> impl Iterator<Item = usize> + '_ {
        (0..self.unit_count(side)).filter(move |&unit| self.is_alive_or_damaged(side, unit))
    }

    /// Units still on the field or withdrawn from it, i.e. not destroyed
    pub fn survivors(&self, side: Side) -> impl Iterator<Item = usize> + '_ {
        let units = self.side(side);
        (0..units.count)
            .filter(move |&unit| !units.dead.contains(unit) && !units.damaged.contains(unit))
    }

    pub fn has_alive(&self, side: Side) -> bool {
        self.alive(side).next().is_some()
    }

    pub fn hit_points_left(&self, side: Side, unit: usize) -> u32 {
        self.side(side).hit_points_left(unit)
    }

    pub fn damaged_or_dead_count(&self, side: Side) -> usize {
        let units = self.side(side);
        (0..units.count)
            .filter(|&unit| units.dead.contains(unit) || units.damaged.contains(unit))
            .count()
    }

    /// Hit points across alive units
    pub fn remaining_hit_points(&self, side: Side) -> u32 {
        self.alive(side)
            .map(|unit| self.hit_points_left(side, unit))
            .sum()
    }

    pub fn retreat_order(&self, side: Side) -> &[usize] {
        &self.retreat_order[side.index()]
    }

    /// Take one hit. Multi-hit-point units lose a point; the last point marks
    /// the unit damaged so it still fires before being removed.
    pub fn hit(&mut self, side: Side, unit: usize) {
        self.strike(side, unit, false);
    }

    /// Like [`BattleState::hit`], but the last point kills outright
    pub fn kill(&mut self, side: Side, unit: usize) {
        self.strike(side, unit, true);
    }

    fn strike(&mut self, side: Side, unit: usize, lethal: bool) {
        let units = self.side_mut(side);
        if let Some(hp) = units.hit_points_entry(unit) {
            if *hp > 1 {
                *hp -= 1;
                return;
            }
            *hp = 0;
        }
        if lethal {
            units.damaged.remove(unit);
            units.dead.insert(unit);
        } else {
            units.damaged.insert(unit);
        }
    }

    /// Withdraw a unit from the fight without destroying it
    pub fn retreat(&mut self, side: Side, unit: usize) {
        if self.side_mut(side).retreated.insert(unit) {
            self.retreat_order[side.index()].push(unit);
        }
    }

    /// Damaged units of both sides die
    pub fn remove_waiting_to_die(&mut self) {
        for SideUnits { dead, damaged, .. } in self.sides.iter_mut() {
            dead.union_with(damaged);
            damaged.clear();
        }
    }

    /// Hand the initiative to the other side by advancing one phase
    pub fn swap_sides(&mut self) {
        self.phase = self.phase.next();
    }

    /// Expand `targets` so that extra hit points soak up hits first
    ///
    /// Each multi-hit-point unit appears once per spare point ahead of the
    /// plain list, which keeps every unit alive until it has lost all spares.
    pub fn multi_hit_targets(&self, side: Side, targets: &[usize]) -> Vec<usize> {
        let mut expanded = Vec::with_capacity(targets.len());
        for &unit in targets {
            let spare = self.hit_points_left(side, unit).saturating_sub(1);
            expanded.extend(std::iter::repeat(unit).take(spare as usize));
        }
        expanded.extend_from_slice(targets);
        expanded
    }

    /// De-duplication key; `round_bucket` keeps round-dependent rules apart
    pub fn key(&self, round_bucket: u32) -> StateKey {
        StateKey {
            phase: self.phase,
            round_bucket,
            sides: self.sides.clone(),
        }
    }
}

impl PartialEq for BattleState {
    fn eq(&self, other: &Self) -> bool {
        self.phase == other.phase && self.sides == other.sides
    }
}

impl Eq for BattleState {}

impl Hash for BattleState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.phase.hash(state);
        self.sides.hash(state);
    }
}

/// Identity of a node for the de-duplication cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    phase: Phase,
    round_bucket: u32,
    sides: [SideUnits; 2],
}
