//! Adjustments applied to a state before a phase fires

use crate::context::BattleContext;
use crate::core::types::Side;
use crate::state::BattleState;

/// Evasive units facing nothing but air units they cannot be hit by submerge
///
/// Applied for both sides: evasive defenders against an all-air attack, and
/// evasive attackers against an all-air defense.
pub fn submerge_evaders_vs_only_air(context: &BattleContext, state: &mut BattleState) {
    for side in Side::BOTH {
        let enemy = side.opposite();
        let enemy_types: Vec<&str> = state
            .alive(enemy)
            .map(|unit| context.profile(enemy, unit))
            .filter(|profile| !profile.is_infrastructure)
            .map(|profile| profile.type_name.as_str())
            .collect();
        if enemy_types.is_empty() {
            continue;
        }
        let only_air = state
            .alive(enemy)
            .filter(|&unit| !context.profile(enemy, unit).is_infrastructure)
            .all(|unit| context.profile(enemy, unit).is_air);
        if !only_air {
            continue;
        }

        let evaders: Vec<usize> = state
            .alive(side)
            .filter(|&unit| {
                let profile = context.profile(side, unit);
                profile.can_evade
                    && enemy_types
                        .iter()
                        .all(|&enemy_type| profile.can_not_be_targeted_by.contains(enemy_type))
            })
            .collect();
        for unit in evaders {
            tracing::trace!(?side, unit, "evasive unit submerges against air");
            state.retreat(side, unit);
        }
    }
}

fn can_roll(context: &BattleContext, side: Side, unit: usize) -> bool {
    let profile = context.profile(side, unit);
    profile.power(side) > 0 || profile.support.is_some()
}

/// Transports of `side` with no escort die when the enemy can attack them
pub fn remove_undefended_transports(context: &BattleContext, state: &mut BattleState, side: Side) {
    let enemy = side.opposite();
    let mut transports = Vec::new();
    for unit in state.alive(side) {
        if !context.fits_terrain(side, unit) || context.is_infrastructure(side, unit) {
            continue;
        }
        if !context.profile(side, unit).is_non_combat_transport() {
            return;
        }
        transports.push(unit);
    }
    if transports.is_empty() {
        return;
    }

    let enemy_can_attack = state
        .alive(enemy)
        .any(|unit| context.fits_terrain(enemy, unit) && context.profile(enemy, unit).power(enemy) > 0);
    if !enemy_can_attack {
        return;
    }
    tracing::trace!(?side, count = transports.len(), "undefended transports lost");
    for unit in transports {
        state.hit(side, unit);
    }
}

/// A side with nothing able to roll loses its units to an enemy that can
pub fn remove_units_that_cannot_roll(context: &BattleContext, state: &mut BattleState, side: Side) {
    let enemy = side.opposite();
    let fighting = |state: &BattleState, side: Side| -> Vec<usize> {
        state
            .alive(side)
            .filter(|&unit| context.fits_terrain(side, unit) && !context.is_infrastructure(side, unit))
            .collect()
    };
    let units = fighting(state, side);
    let enemies = fighting(state, enemy);
    if units.is_empty() || enemies.is_empty() {
        return;
    }
    if units.iter().any(|&unit| can_roll(context, side, unit)) {
        return;
    }
    if !enemies.iter().any(|&unit| can_roll(context, enemy, unit)) {
        return;
    }
    tracing::trace!(?side, count = units.len(), "units unable to roll are lost");
    for unit in units {
        state.hit(side, unit);
    }
}
