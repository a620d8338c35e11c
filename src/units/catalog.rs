//! Lookup from unit handles to their combat profiles

use ahash::AHashMap;

use crate::core::error::{OddsError, Result};
use crate::core::types::UnitId;
use crate::units::profile::UnitProfile;

/// Resolves a unit handle to the attributes of its type
pub trait UnitCatalog {
    fn profile(&self, unit: UnitId) -> Option<&UnitProfile>;
}

/// In-memory catalog: a table of unit types plus the units spawned from them
#[derive(Debug, Clone, Default)]
pub struct UnitRoster {
    types: AHashMap<String, UnitProfile>,
    units: AHashMap<UnitId, String>,
    next_id: u32,
}

impl UnitRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit type, replacing any type with the same name
    pub fn add_type(&mut self, profile: UnitProfile) {
        self.types.insert(profile.type_name.clone(), profile);
    }

    pub fn with_type(mut self, profile: UnitProfile) -> Self {
        self.add_type(profile);
        self
    }

    pub fn unit_type(&self, type_name: &str) -> Option<&UnitProfile> {
        self.types.get(type_name)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Create a unit of a registered type
    pub fn spawn(&mut self, type_name: &str) -> Result<UnitId> {
        if !self.types.contains_key(type_name) {
            return Err(OddsError::UnknownUnitType(type_name.to_string()));
        }
        let id = UnitId(self.next_id);
        self.next_id += 1;
        self.units.insert(id, type_name.to_string());
        Ok(id)
    }

    pub fn spawn_many(&mut self, type_name: &str, count: usize) -> Result<Vec<UnitId>> {
        (0..count).map(|_| self.spawn(type_name)).collect()
    }
}

impl UnitCatalog for UnitRoster {
    fn profile(&self, unit: UnitId) -> Option<&UnitProfile> {
        self.units
            .get(&unit)
            .and_then(|type_name| self.types.get(type_name))
    }
}
