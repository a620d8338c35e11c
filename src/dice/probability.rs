//! Hit-count distributions for a volley of dice
//!
//! A volley is described by how many dice are rolled at each power. Each power
//! group follows a binomial distribution; the volley's distribution is their
//! convolution.

use ahash::AHashMap;
use smallvec::SmallVec;

/// Dice rolled by one firing group, bucketed by power
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RollData {
    total_rolls: u32,
    /// (power, rolls) sorted by power
    rolls_by_power: SmallVec<[(u32, u32); 4]>,
    dice_sides: u32,
}

impl RollData {
    pub fn new(dice_sides: u32) -> Self {
        Self {
            dice_sides,
            ..Default::default()
        }
    }

    pub fn single(power: i32, rolls: u32, dice_sides: u32) -> Self {
        let mut data = Self::new(dice_sides);
        data.add(power, rolls);
        data
    }

    /// Add dice at `power`; powerless dice never hit and are dropped
    pub fn add(&mut self, power: i32, rolls: u32) {
        if power <= 0 || rolls == 0 {
            return;
        }
        let power = (power as u32).min(self.dice_sides);
        self.total_rolls += rolls;
        match self
            .rolls_by_power
            .binary_search_by_key(&power, |&(p, _)| p)
        {
            Ok(index) => self.rolls_by_power[index].1 += rolls,
            Err(index) => self.rolls_by_power.insert(index, (power, rolls)),
        }
    }

    pub fn total_rolls(&self) -> u32 {
        self.total_rolls
    }

    pub fn dice_sides(&self) -> u32 {
        self.dice_sides
    }

    pub fn groups(&self) -> &[(u32, u32)] {
        &self.rolls_by_power
    }
}

/// Memo of binomial pmfs keyed by (rolls, power, dice sides)
///
/// Owned by a single calculation; the same volleys repeat across thousands
/// of tree nodes.
#[derive(Debug, Default)]
pub struct HitProbabilityMemo {
    binomials: AHashMap<(u32, u32, u32), Vec<f64>>,
}

impl HitProbabilityMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.binomials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binomials.is_empty()
    }

    /// P(exactly k hits) for `rolls` dice hitting on `power` or less
    pub fn binomial(&mut self, rolls: u32, power: u32, dice_sides: u32) -> &[f64] {
        self.binomials
            .entry((rolls, power, dice_sides))
            .or_insert_with(|| binomial_pmf(rolls, power, dice_sides))
    }

    /// Distribution of total hits for a volley; empty when nothing is rolled
    pub fn hit_distribution(&mut self, roll_data: &RollData) -> Vec<f64> {
        if roll_data.total_rolls() == 0 {
            return Vec::new();
        }
        let sides = roll_data.dice_sides();
        let mut distribution = vec![1.0];
        let mut scratch = Vec::with_capacity(roll_data.total_rolls() as usize + 1);
        for &(power, rolls) in roll_data.groups() {
            let pmf = self.binomial(rolls, power, sides);
            convolve(&distribution, pmf, &mut scratch);
            std::mem::swap(&mut distribution, &mut scratch);
        }
        distribution
    }
}

fn binomial_pmf(rolls: u32, power: u32, dice_sides: u32) -> Vec<f64> {
    let p = if dice_sides == 0 {
        1.0
    } else {
        (power as f64 / dice_sides as f64).min(1.0)
    };
    let q = 1.0 - p;
    let n = rolls as i32;
    let mut coefficient = 1.0;
    let mut pmf = Vec::with_capacity(rolls as usize + 1);
    for k in 0..=n {
        pmf.push(coefficient * p.powi(k) * q.powi(n - k));
        coefficient = coefficient * (n - k) as f64 / (k + 1) as f64;
    }
    pmf
}

fn convolve(left: &[f64], right: &[f64], out: &mut Vec<f64>) {
    out.clear();
    out.resize(left.len() + right.len() - 1, 0.0);
    for (i, a) in left.iter().enumerate() {
        for (j, b) in right.iter().enumerate() {
            out[i + j] += a * b;
        }
    }
}
