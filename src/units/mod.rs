//! Unit combat data and the catalog seam the calculator reads it through

pub mod catalog;
pub mod cost;
pub mod profile;

pub use catalog::{UnitCatalog, UnitRoster};
pub use cost::CostTable;
pub use profile::{AaProfile, SupportProfile, UnitProfile};
