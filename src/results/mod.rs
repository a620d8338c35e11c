//! Summary statistics read off a resolved tree root

pub mod aggregate;

pub use aggregate::{AggregateResults, UnitSurvival, THRESHOLD_SWEEP};
