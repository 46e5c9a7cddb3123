use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for the shape of a study plan.
///
/// Controls the dimensions of the year/term grid and the soft per-term
/// module load limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Number of academic years in the plan.
    pub years: usize,

    /// Number of terms in each academic year.
    pub terms_per_year: usize,

    /// Soft cap on the number of modules in a single term.
    ///
    /// Exceeding this is an overload advisory on placement, never an error.
    pub max_modules_per_term: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            years: 4,
            terms_per_year: 2,
            max_modules_per_term: 6,
        }
    }
}

impl PlanConfig {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or
    /// if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Total number of term slots in the grid.
    #[must_use]
    pub const fn slots(&self) -> usize {
        self.years * self.terms_per_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_four_year_two_term_plan() {
        let config = PlanConfig::default();
        assert_eq!(config.years, 4);
        assert_eq!(config.terms_per_year, 2);
        assert_eq!(config.slots(), 8);
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = PlanConfig {
            years: 3,
            terms_per_year: 4,
            max_modules_per_term: 5,
        };
        config.save(&path).expect("save config");

        let loaded = PlanConfig::load(&path).expect("load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PlanConfig = toml::from_str("years = 5").expect("partial config");
        assert_eq!(config.years, 5);
        assert_eq!(config.terms_per_year, 2);
    }
}
