use ahash::AHashMap;

/// Production cost per unit type, used to value surviving and lost units
pub trait CostTable {
    fn cost(&self, type_name: &str) -> f64;
}

/// Types missing from the map are worth nothing
impl CostTable for AHashMap<String, f64> {
    fn cost(&self, type_name: &str) -> f64 {
        self.get(type_name).copied().unwrap_or(0.0)
    }
}
