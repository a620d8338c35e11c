//! Immutable-by-convention battle snapshots
//!
//! A [`BattleState`] is cloned for every dice outcome, so it is kept small:
//! bitsets for dead, damaged and retreated units, and a sparse table for the
//! few units with more than one hit point.

pub mod phase;
pub mod snapshot;
pub mod unit_set;

pub use phase::Phase;
pub use snapshot::{BattleState, SideUnits, StateKey};
pub use unit_set::UnitSet;
