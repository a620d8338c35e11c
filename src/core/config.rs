//! Calculator configuration with documented constants
//!
//! Every tunable of the probability tree lives here so a calculation can be
//! reproduced from its config alone.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{OddsError, Result};

/// Battle length used when the rule store does not impose its own limit
pub const DEFAULT_MAX_ROUNDS: u32 = 16;

/// Branches less likely than this are not expanded
pub const DEFAULT_PRUNE_THRESHOLD: f64 = 0.005;

/// Number of geometric-series terms used to close a cycle in the tree
pub const CYCLE_SERIES_TERMS: u32 = 6;

/// Configuration for a single battle calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Rounds fought before the battle is declared indeterminate
    ///
    /// A positive round limit from the rule store (land or sea) takes
    /// precedence over this value.
    pub max_rounds: u32,

    /// Probability below which a child branch is pruned
    ///
    /// Pruned mass is reported as indeterminate, so lowering this trades
    /// run time for a smaller indeterminate share. Must lie in [0, 1).
    pub prune_threshold: f64,

    /// Terms of `Σ s^k · S` summed when a state repeats one of its ancestors
    ///
    /// The left-over `s^terms` is reported as indeterminate. With the default
    /// of 6 and a loop mass of 0.5 about 1.6% of the branch stays undecided.
    pub cycle_series_terms: u32,

    /// Keep every expanded node in the arena instead of discarding children
    /// once they have been folded into their parent
    ///
    /// Only useful for inspecting the tree; memory grows with the node count.
    pub retain_children: bool,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            cycle_series_terms: CYCLE_SERIES_TERMS,
            retain_children: false,
        }
    }
}

impl CalculatorConfig {
    /// Parse and validate a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CalculatorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.prune_threshold) {
            return Err(OddsError::InvalidConfig(format!(
                "prune_threshold must be in [0, 1), got {}",
                self.prune_threshold
            )));
        }
        if self.cycle_series_terms == 0 {
            return Err(OddsError::InvalidConfig(
                "cycle_series_terms must be at least 1".into(),
            ));
        }
        if self.max_rounds == 0 {
            return Err(OddsError::InvalidConfig(
                "max_rounds must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Round limit for a battle, preferring a positive limit from the rules
    pub fn effective_max_rounds(&self, rule_limit: Option<u32>) -> u32 {
        match rule_limit {
            Some(limit) if limit > 0 => limit,
            _ => self.max_rounds,
        }
    }

    pub fn with_prune_threshold(mut self, threshold: f64) -> Self {
        self.prune_threshold = threshold;
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_retained_children(mut self) -> Self {
        self.retain_children = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = CalculatorConfig::default();
        assert_eq!(config.max_rounds, 16);
        assert_eq!(config.prune_threshold, 0.005);
        assert_eq!(config.cycle_series_terms, 6);
        assert!(!config.retain_children);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CalculatorConfig::from_toml_str("max_rounds = 4").unwrap();
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.prune_threshold, DEFAULT_PRUNE_THRESHOLD);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = CalculatorConfig::from_toml_str("prune_threshold = 1.5").unwrap_err();
        assert!(matches!(err, OddsError::InvalidConfig(_)));

        let zero_terms = CalculatorConfig {
            cycle_series_terms: 0,
            ..Default::default()
        };
        assert!(zero_terms.validate().is_err());
    }

    #[test]
    fn test_rule_limit_overrides_default() {
        let config = CalculatorConfig::default();
        assert_eq!(config.effective_max_rounds(Some(1)), 1);
        assert_eq!(config.effective_max_rounds(Some(0)), 16);
        assert_eq!(config.effective_max_rounds(None), 16);
    }
}
