//! End-of-battle detection at the start of each round

use crate::context::BattleContext;
use crate::core::types::Side;
use crate::state::BattleState;
use crate::targeting::remove_undefended_transports;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleEnd {
    AttackerWins,
    DefenderWins,
    Draw,
    /// Round limit reached with both sides still standing
    Truncated,
}

fn has_combatants(context: &BattleContext, state: &BattleState, side: Side) -> bool {
    state
        .alive(side)
        .any(|unit| context.is_combatant(side, unit))
}

fn has_non_combat_transports(context: &BattleContext, state: &BattleState, side: Side) -> bool {
    state
        .alive(side)
        .any(|unit| context.profile(side, unit).is_non_combat_transport())
}

fn has_non_infrastructure(context: &BattleContext, state: &BattleState, side: Side) -> bool {
    state
        .alive(side)
        .any(|unit| !context.is_infrastructure(side, unit))
}

/// Decide whether the battle is over after casualties have been removed
///
/// Checked in order: attacker out of combat units (unless restricted
/// transports still get their first round), defender out of combat units,
/// round limit. An attacker left with only transports still takes an empty
/// site. Any end with no units left on either side is a draw.
pub fn check_end_of_battle(context: &BattleContext, state: &BattleState, round: u32) -> Option<BattleEnd> {
    let attacker_beaten = !has_combatants(context, state, Side::Attacker)
        && (has_combatants(context, state, Side::Defender)
            || !has_non_infrastructure(context, state, Side::Attacker));
    let end = if attacker_beaten {
        let transports_fight_on = context.rules.transport_casualties_restricted
            && round <= 1
            && has_non_combat_transports(context, state, Side::Attacker);
        if transports_fight_on {
            None
        } else {
            Some(BattleEnd::DefenderWins)
        }
    } else if !has_combatants(context, state, Side::Defender) {
        Some(BattleEnd::AttackerWins)
    } else if round >= context.max_rounds() {
        Some(BattleEnd::Truncated)
    } else {
        None
    };

    end.map(|end| {
        let wiped_out = |side| state.survivors(side).next().is_none();
        if wiped_out(Side::Attacker) && wiped_out(Side::Defender) {
            BattleEnd::Draw
        } else {
            end
        }
    })
}

/// State whose survivors are credited for an ended battle
///
/// When the attacker takes the site with restricted transport casualties the
/// defender's unescorted transports are lost as well.
pub fn final_units(context: &BattleContext, state: &BattleState, end: BattleEnd) -> BattleState {
    let mut units = state.clone();
    if end == BattleEnd::AttackerWins && context.rules.transport_casualties_restricted {
        remove_undefended_transports(context, &mut units, Side::Defender);
        units.remove_waiting_to_die();
    }
    units
}
