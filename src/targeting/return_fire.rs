use crate::context::BattleContext;
use crate::core::types::Side;
use crate::state::BattleState;

/// What the units hit by first-strike fire still get to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnFire {
    /// Casualties fire back before being removed
    All,
    /// Only first-strike casualties fire back, the rest die at once
    Subs,
    /// Casualties die before they can fire
    None,
}

impl ReturnFire {
    fn resolve(sneak_attack: bool, enemy_sneak_attack: bool, ww2v2: bool) -> Self {
        if !sneak_attack {
            ReturnFire::All
        } else if enemy_sneak_attack || ww2v2 {
            ReturnFire::Subs
        } else {
            ReturnFire::None
        }
    }
}

fn attacker_sneaks(context: &BattleContext, state: &BattleState) -> bool {
    !context.has_destroyer(state, Side::Defender)
}

fn defender_sneaks(context: &BattleContext, state: &BattleState) -> bool {
    !context.has_destroyer(state, Side::Attacker)
        && (context.rules.ww2v2 || context.rules.defending_subs_sneak_attack)
}

/// Policy for the attacker's first-strike volley
pub fn return_fire_against_attacking_subs(
    context: &BattleContext,
    state: &BattleState,
) -> ReturnFire {
    ReturnFire::resolve(
        attacker_sneaks(context, state),
        defender_sneaks(context, state),
        context.rules.ww2v2,
    )
}

/// Policy for the defender's first-strike volley, mirroring the attacker's
pub fn return_fire_against_defending_subs(
    context: &BattleContext,
    state: &BattleState,
) -> ReturnFire {
    ReturnFire::resolve(
        defender_sneaks(context, state),
        attacker_sneaks(context, state),
        context.rules.ww2v2,
    )
}
