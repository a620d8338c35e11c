use thiserror::Error;

use crate::core::types::UnitId;

#[derive(Error, Debug)]
pub enum OddsError {
    #[error("Unit not found in catalog: {0}")]
    UnknownUnit(UnitId),

    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OddsError>;
