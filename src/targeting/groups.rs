use ahash::AHashMap;

use crate::context::BattleContext;
use crate::core::types::Side;
use crate::dice::{power_and_rolls, RollData};
use crate::state::BattleState;

/// Units firing together at one set of targets
#[derive(Debug, Clone, PartialEq)]
pub struct RollGroup {
    /// Firing units, indices into the firing side
    pub firing: Vec<usize>,
    /// Alive-or-damaged eligible targets, in casualty order
    pub targets: Vec<usize>,
    pub roll_data: RollData,
    /// Each hit scored consumes one firing unit
    pub suicide_on_hit: bool,
}

/// Split firing units so every suicide-on-hit type rolls on its own
///
/// Ordinary units come first in one group, followed by one group per
/// suicide-on-hit type in order of first appearance.
pub fn firing_unit_groups(context: &BattleContext, side: Side, units: &[usize]) -> Vec<Vec<usize>> {
    let mut ordinary = Vec::new();
    let mut suicide: Vec<(&str, Vec<usize>)> = Vec::new();
    for &unit in units {
        let profile = context.profile(side, unit);
        if !profile.is_suicide_on_hit {
            ordinary.push(unit);
            continue;
        }
        match suicide
            .iter_mut()
            .find(|(type_name, _)| *type_name == profile.type_name)
        {
            Some((_, members)) => members.push(unit),
            None => suicide.push((profile.type_name.as_str(), vec![unit])),
        }
    }

    let mut groups = Vec::with_capacity(suicide.len() + 1);
    if !ordinary.is_empty() {
        groups.push(ordinary);
    }
    groups.extend(suicide.into_iter().map(|(_, members)| members));
    groups
}

/// AA volleys of the firing side
///
/// AA types fire in reverse name order. Rolls are capped by the number of
/// eligible targets and by the summed shot limits of the group.
pub fn aa_roll_groups(context: &BattleContext, state: &BattleState, round: u32) -> Vec<RollGroup> {
    let side = state.friendly();
    let enemy = side.opposite();

    let firing_aa: Vec<usize> = state
        .alive_or_damaged(side)
        .filter(|&unit| {
            context
                .profile(side, unit)
                .aa
                .as_ref()
                .is_some_and(|aa| aa.fires_for(side) && aa.fires_in_round(round))
        })
        .collect();
    if firing_aa.is_empty() {
        return Vec::new();
    }

    let mut aa_types: Vec<&str> = firing_aa
        .iter()
        .filter_map(|&unit| context.profile(side, unit).aa.as_ref())
        .map(|aa| aa.aa_type.as_str())
        .collect();
    aa_types.sort_unstable();
    aa_types.dedup();
    aa_types.reverse();

    let mut groups = Vec::new();
    for aa_type in aa_types {
        let members: Vec<usize> = firing_aa
            .iter()
            .copied()
            .filter(|&unit| {
                context
                    .profile(side, unit)
                    .aa
                    .as_ref()
                    .is_some_and(|aa| aa.aa_type == aa_type)
            })
            .collect();

        let airborne = if side.is_defending() {
            context.airborne_targets(aa_type)
        } else {
            None
        };
        let targets: Vec<usize> = state
            .alive_or_damaged(enemy)
            .filter(|&target| {
                let target_type = &context.profile(enemy, target).type_name;
                let listed = members.iter().any(|&unit| {
                    context
                        .profile(side, unit)
                        .aa
                        .as_ref()
                        .is_some_and(|aa| aa.targets.contains(target_type))
                });
                listed
                    || (context.profile(enemy, target).is_airborne
                        && airborne.is_some_and(|types| types.contains(target_type)))
            })
            .collect();
        if targets.is_empty() {
            continue;
        }

        for firing in firing_unit_groups(context, side, &members) {
            let roll_data = aa_roll_data(context, side, &firing, targets.len());
            let suicide_on_hit = context.profile(side, firing[0]).is_suicide_on_hit;
            groups.push(RollGroup {
                firing,
                targets: targets.clone(),
                roll_data,
                suicide_on_hit,
            });
        }
    }
    groups
}

fn aa_roll_data(context: &BattleContext, side: Side, firing: &[usize], target_count: usize) -> RollData {
    let mut power = 0;
    let mut dice_sides = 0;
    let mut attacks: Option<u32> = Some(0);
    for &unit in firing {
        let Some(aa) = context.profile(side, unit).aa.as_ref() else {
            continue;
        };
        power = power.max(aa.power(side));
        dice_sides = dice_sides.max(aa.dice_sides.unwrap_or(context.rules.dice_sides));
        attacks = match (attacks, u32::try_from(aa.max_attacks)) {
            (Some(total), Ok(shots)) => Some(total + shots),
            _ => None,
        };
    }
    let targets = target_count as u32;
    let rolls = attacks.map_or(targets, |shots| shots.min(targets));
    RollData::single(power, rolls, dice_sides)
}

/// Regular or first-strike volleys of the firing side
pub fn regular_roll_groups(
    context: &BattleContext,
    state: &BattleState,
    first_strike: bool,
) -> Vec<RollGroup> {
    let side = state.friendly();
    let enemy = side.opposite();

    let firing: Vec<usize> = state
        .alive_or_damaged(side)
        .filter(|&unit| {
            context.profile(side, unit).is_first_strike == first_strike
                && context.fits_terrain(side, unit)
        })
        .collect();
    if firing.is_empty() {
        return Vec::new();
    }

    let candidates: Vec<usize> = state
        .alive_or_damaged(enemy)
        .filter(|&target| {
            let profile = context.profile(enemy, target);
            let exempt = match side {
                Side::Attacker => profile.is_suicide_on_defense,
                Side::Defender => profile.is_suicide_on_attack,
            };
            !exempt && !context.is_infrastructure(enemy, target) && context.fits_terrain(enemy, target)
        })
        .collect();

    let destroyer = context.has_destroyer(state, side);
    let mut target_sets: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
    let mut set_by_type: AHashMap<&str, usize> = AHashMap::new();
    for unit in firing {
        let profile = context.profile(side, unit);
        let index = match set_by_type.get(profile.type_name.as_str()) {
            Some(&index) => index,
            None => {
                let targets: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&target| {
                        let target_profile = context.profile(enemy, target);
                        !profile.can_not_target.contains(&target_profile.type_name)
                            && (destroyer
                                || !target_profile
                                    .can_not_be_targeted_by
                                    .contains(&profile.type_name))
                    })
                    .collect();
                let index = match target_sets.iter().position(|(existing, _)| *existing == targets) {
                    Some(index) => index,
                    None => {
                        target_sets.push((targets, Vec::new()));
                        target_sets.len() - 1
                    }
                };
                set_by_type.insert(profile.type_name.as_str(), index);
                index
            }
        };
        target_sets[index].1.push(unit);
    }

    let mut groups = Vec::new();
    for (targets, members) in target_sets {
        if targets.is_empty() {
            continue;
        }
        for firing in firing_unit_groups(context, side, &members) {
            let profiles: Vec<_> = firing.iter().map(|&unit| context.profile(side, unit)).collect();
            let mut roll_data = RollData::new(context.rules.dice_sides);
            for value in power_and_rolls(
                &profiles,
                side,
                &context.territory_effects,
                context.rules.dice_sides,
            ) {
                roll_data.add(value.power as i32, value.rolls);
            }
            let suicide_on_hit = profiles[0].is_suicide_on_hit;
            groups.push(RollGroup {
                firing,
                targets: targets.clone(),
                roll_data,
                suicide_on_hit,
            });
        }
    }
    groups
}
