//! Tunable constants of the damage pipeline.
//!
//! Defaults reproduce the documented formula exactly; a RON file may override
//! any subset of fields.

use crate::errors::{ConfigError, ConfigResult};
use schema::Element;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Multiplier for damage against a vulnerable element. Not configurable.
pub const VULNERABILITY_MULTIPLIER: f64 = 1.5;

/// A pairwise elemental interaction between an attack and the defender's own element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub attack: Element,
    pub defender: Element,
    pub name: String,
    pub modifier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub base_critical_chance: f64,
    /// Every this many points of speed adds 1.0 to the critical chance.
    pub critical_speed_divisor: f64,
    pub critical_multiplier: f64,
    pub variance_min: f64,
    pub variance_max: f64,
    /// Share of the defender's defense subtracted from the base amount.
    pub defense_weight: f64,
    /// Hit chance added per point of the attacker's accuracy stat.
    pub accuracy_weight: f64,
    /// Incoming-damage multiplier while guarding.
    pub guard_multiplier: f64,
    pub flee_chance: f64,
    /// Applied to `flee_chance` while a living boss stands on the other side.
    pub boss_flee_multiplier: f64,
    pub reactions: Vec<Reaction>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_critical_chance: 0.05,
            critical_speed_divisor: 1000.0,
            critical_multiplier: 1.5,
            variance_min: 0.85,
            variance_max: 1.15,
            defense_weight: 0.0,
            accuracy_weight: 0.0,
            guard_multiplier: 0.5,
            flee_chance: 0.5,
            boss_flee_multiplier: 0.4,
            reactions: Vec::new(),
        }
    }
}

impl CombatConfig {
    /// Parse and validate a config from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(source: &str) -> ConfigResult<Self> {
        let config: CombatConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a RON file on disk.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let probabilities = [
            ("base_critical_chance", self.base_critical_chance),
            ("flee_chance", self.flee_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let multipliers = [
            ("critical_multiplier", self.critical_multiplier),
            ("variance_min", self.variance_min),
            ("defense_weight", self.defense_weight),
            ("accuracy_weight", self.accuracy_weight),
            ("guard_multiplier", self.guard_multiplier),
            ("boss_flee_multiplier", self.boss_flee_multiplier),
        ];
        for (name, value) in multipliers {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !self.variance_max.is_finite() || self.variance_max < self.variance_min {
            return Err(ConfigError::Invalid(format!(
                "variance_max ({}) must be a number at or above variance_min ({})",
                self.variance_max, self.variance_min
            )));
        }
        if !(self.critical_speed_divisor.is_finite() && self.critical_speed_divisor > 0.0) {
            return Err(ConfigError::Invalid(
                "critical_speed_divisor must be a positive number".to_string(),
            ));
        }
        if let Some(reaction) = self
            .reactions
            .iter()
            .find(|r| !r.modifier.is_finite() || r.modifier < 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "reaction '{}' needs a non-negative modifier",
                reaction.name
            )));
        }
        Ok(())
    }

    /// The reaction triggered by `attack` landing on a defender of element `defender`.
    pub fn reaction_for(&self, attack: Element, defender: Element) -> Option<&Reaction> {
        self.reactions
            .iter()
            .find(|r| r.attack == attack && r.defender == defender)
    }
}
