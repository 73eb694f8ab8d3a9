//! Configuration system for the simulation.
//!
//! Supports YAML configuration files with defaults matching the tuned
//! reference balance.

use crate::error::ConfigError;
use crate::grid::CELL_COUNT;
use crate::position::GRID_SIZE;
use crate::scenario::Population;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scenarios: ScenarioConfig,
    #[serde(default)]
    pub prey: PreyConfig,
    #[serde(default)]
    pub predator: PredatorConfig,
    #[serde(default)]
    pub apex: ApexConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Seed counts for each named scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub balanced: Population,
    pub predators_dominant: Population,
    pub preys_dominant: Population,
    /// Apex agents seeded when the third species is enabled
    pub apex_count: usize,
}

/// Prey survival and breeding parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreyConfig {
    /// Turns between litters before mutation
    pub reproduction_cooldown: u32,
    /// Floor for the mutated cooldown
    pub min_cooldown: u32,
    /// Occupancy rate above which crowding kills
    pub overpopulation_threshold: f64,
    pub overpopulation_base_chance: f64,
    /// Extra death chance per unit of occupancy above the threshold
    pub overpopulation_slope: f64,
    pub overpopulation_max_chance: f64,
    /// Chebyshev radius scanned for predators
    pub stress_radius: i32,
    pub stress_predator_count: usize,
    pub stress_death_chance: f64,
    /// Death chance when boxed in
    pub confinement_death_chance: f64,
}

/// Predator hunting, starvation and breeding parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredatorConfig {
    pub starvation_turns: u32,
    /// Hunger at which the predator starts scanning for distant prey
    pub hunger_search_turns: u32,
    pub search_radius: i32,
    /// Maximum turns since the last meal to still breed
    pub breeding_hunger_limit: u32,
    pub min_prey_eaten: u32,
    /// Survival requirement before mutation
    pub base_maturity: u32,
    pub min_maturity: u32,
}

/// Apex (third species) parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApexConfig {
    pub starvation_turns: u32,
    pub maturity_turns: u32,
}

/// Comparative analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Independent simulations per scenario
    pub runs_per_scenario: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Turns between summary lines in the CLI
    pub stats_interval: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            balanced: Population::new(30, 20),
            predators_dominant: Population::new(15, 35),
            preys_dominant: Population::new(35, 15),
            apex_count: 5,
        }
    }
}

impl Default for PreyConfig {
    fn default() -> Self {
        Self {
            reproduction_cooldown: 4,
            min_cooldown: 2,
            overpopulation_threshold: 0.65,
            overpopulation_base_chance: 0.25,
            overpopulation_slope: 2.0,
            overpopulation_max_chance: 0.60,
            stress_radius: 2,
            stress_predator_count: 3,
            stress_death_chance: 0.15,
            confinement_death_chance: 0.10,
        }
    }
}

impl Default for PredatorConfig {
    fn default() -> Self {
        Self {
            starvation_turns: 4,
            hunger_search_turns: 2,
            search_radius: 2,
            breeding_hunger_limit: 1,
            min_prey_eaten: 2,
            base_maturity: 5,
            min_maturity: 3,
        }
    }
}

impl Default for ApexConfig {
    fn default() -> Self {
        Self {
            starvation_turns: 4,
            maturity_turns: 4,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            runs_per_scenario: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 1,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        let s = &self.scenarios;
        for population in [&s.balanced, &s.predators_dominant, &s.preys_dominant] {
            if population.prey + population.predators + s.apex_count > CELL_COUNT {
                return invalid("scenario populations cannot exceed the number of cells");
            }
        }

        let p = &self.prey;
        if p.reproduction_cooldown == 0 || p.min_cooldown == 0 {
            return invalid("prey cooldowns must be > 0");
        }
        let chances = [
            p.overpopulation_threshold,
            p.overpopulation_base_chance,
            p.overpopulation_max_chance,
            p.stress_death_chance,
            p.confinement_death_chance,
        ];
        if chances.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return invalid("prey probabilities and thresholds must be in [0, 1]");
        }
        if p.overpopulation_slope < 0.0 {
            return invalid("prey overpopulation slope must be >= 0");
        }
        if !(0..=GRID_SIZE as i32).contains(&p.stress_radius) {
            return invalid("prey stress radius must be in [0, grid size]");
        }

        if self.predator.starvation_turns == 0 || self.apex.starvation_turns == 0 {
            return invalid("starvation thresholds must be > 0");
        }
        if !(0..=GRID_SIZE as i32).contains(&self.predator.search_radius) {
            return invalid("predator search radius must be in [0, grid size]");
        }
        if self.analysis.runs_per_scenario == 0 {
            return invalid("runs_per_scenario must be > 0");
        }
        Ok(())
    }
}
