use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Side;

/// Where a battle is fought
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleSite {
    pub name: String,
    #[serde(default)]
    pub is_water: bool,
}

impl BattleSite {
    pub fn land(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_water: false,
        }
    }

    pub fn water(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_water: true,
        }
    }
}

/// Terrain modifier applied to the power of listed unit types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerritoryEffect {
    pub name: String,
    pub offense: AHashMap<String, i32>,
    pub defense: AHashMap<String, i32>,
}

impl TerritoryEffect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_modifier(mut self, side: Side, type_name: impl Into<String>, modifier: i32) -> Self {
        match side {
            Side::Attacker => self.offense.insert(type_name.into(), modifier),
            Side::Defender => self.defense.insert(type_name.into(), modifier),
        };
        self
    }

    pub fn modifier(&self, side: Side, type_name: &str) -> i32 {
        let table = match side {
            Side::Attacker => &self.offense,
            Side::Defender => &self.defense,
        };
        table.get(type_name).copied().unwrap_or(0)
    }
}
