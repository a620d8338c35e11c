//! Per-unit power and roll count for a firing group

use smallvec::SmallVec;

use crate::core::types::Side;
use crate::rules::TerritoryEffect;
use crate::units::UnitProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerAndRolls {
    pub power: u32,
    pub rolls: u32,
}

/// Power and rolls of each unit in `units`, in the same order
///
/// Support comes from the group itself: every supporter boosts up to `count`
/// matching units in list order, and a unit takes at most one bonus from each
/// supporter type. Territory effects then apply and the result is clamped to
/// `[0, dice_sides]`.
pub fn power_and_rolls(
    units: &[&UnitProfile],
    side: Side,
    effects: &[TerritoryEffect],
    dice_sides: u32,
) -> Vec<PowerAndRolls> {
    let mut bonus = vec![0i32; units.len()];
    let mut received: Vec<SmallVec<[&str; 2]>> = vec![SmallVec::new(); units.len()];

    for supporter in units {
        let Some(support) = &supporter.support else {
            continue;
        };
        let mut remaining = support.count;
        for (index, unit) in units.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let source = supporter.type_name.as_str();
            if support.applies_to(side, &unit.type_name) && !received[index].contains(&source) {
                bonus[index] += support.bonus;
                received[index].push(source);
                remaining -= 1;
            }
        }
    }

    units
        .iter()
        .zip(bonus)
        .map(|(unit, bonus)| {
            let terrain: i32 = effects
                .iter()
                .map(|effect| effect.modifier(side, &unit.type_name))
                .sum();
            let power = (unit.power(side) + bonus + terrain).clamp(0, dice_sides as i32);
            PowerAndRolls {
                power: power as u32,
                rolls: unit.rolls(side),
            }
        })
        .collect()
}
