pub mod config;
pub mod error;
pub mod types;

pub use config::CalculatorConfig;
pub use error::{OddsError, Result};
pub use types::{PlayerId, Side, UnitId};
