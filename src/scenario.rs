//! Named starting scenarios.

use crate::config::ScenarioConfig;
use crate::error::SimulationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Initial population balance of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scenario {
    #[default]
    #[serde(rename = "BALANCED")]
    Balanced,
    #[serde(rename = "PREDATORS_DOM")]
    PredatorsDominant,
    #[serde(rename = "PREYS_DOM")]
    PreysDominant,
}

/// Seed counts per species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Population {
    pub prey: usize,
    pub predators: usize,
    #[serde(default)]
    pub apex: usize,
}

impl Population {
    pub const fn new(prey: usize, predators: usize) -> Self {
        Self {
            prey,
            predators,
            apex: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.prey + self.predators + self.apex
    }
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::Balanced,
        Scenario::PredatorsDominant,
        Scenario::PreysDominant,
    ];

    /// Identifier used in snapshots and reports
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Balanced => "BALANCED",
            Scenario::PredatorsDominant => "PREDATORS_DOM",
            Scenario::PreysDominant => "PREYS_DOM",
        }
    }

    /// Seed counts for this scenario, with apex added when the third species is on
    pub fn population(self, config: &ScenarioConfig, third_species: bool) -> Population {
        let mut population = match self {
            Scenario::Balanced => config.balanced,
            Scenario::PredatorsDominant => config.predators_dominant,
            Scenario::PreysDominant => config.preys_dominant,
        };
        population.apex = if third_species { config.apex_count } else { 0 };
        population
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "BALANCED" => Ok(Scenario::Balanced),
            "PREDATORS_DOM" | "PREDATORS_DOMINANT" | "PREDATORS" => Ok(Scenario::PredatorsDominant),
            "PREYS_DOM" | "PREYS_DOMINANT" | "PREY_DOMINANT" | "PREYS" => Ok(Scenario::PreysDominant),
            _ => Err(SimulationError::UnknownScenario(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_populations() {
        let config = ScenarioConfig::default();

        assert_eq!(
            Scenario::Balanced.population(&config, false),
            Population::new(30, 20)
        );
        assert_eq!(
            Scenario::PredatorsDominant.population(&config, false),
            Population::new(15, 35)
        );
        assert_eq!(
            Scenario::PreysDominant.population(&config, false),
            Population::new(35, 15)
        );

        let with_apex = Scenario::Balanced.population(&config, true);
        assert_eq!(with_apex.apex, 5);
        assert_eq!(with_apex.total(), 55);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("balanced".parse::<Scenario>(), Ok(Scenario::Balanced));
        assert_eq!("PREDATORS_DOM".parse::<Scenario>(), Ok(Scenario::PredatorsDominant));
        assert_eq!("preys-dominant".parse::<Scenario>(), Ok(Scenario::PreysDominant));
        assert!(matches!(
            "chaos".parse::<Scenario>(),
            Err(SimulationError::UnknownScenario(_))
        ));

        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>(), Ok(scenario));
        }
    }
}
