//! Exact dice arithmetic: hit-count distributions and unit power

pub mod power;
pub mod probability;

pub use power::{power_and_rolls, PowerAndRolls};
pub use probability::{HitProbabilityMemo, RollData};
