//! Who fires at whom in each phase
//!
//! Firing units are split into [`RollGroup`]s sharing one set of eligible
//! targets, one pool of dice and one suicide rule. The tree turns each group's
//! hit distribution into child states.

pub mod groups;
pub mod restrictions;
pub mod return_fire;

pub use groups::{aa_roll_groups, firing_unit_groups, regular_roll_groups, RollGroup};
pub use restrictions::{
    remove_undefended_transports, remove_units_that_cannot_roll, submerge_evaders_vs_only_air,
};
pub use return_fire::{
    return_fire_against_attacking_subs, return_fire_against_defending_subs, ReturnFire,
};
