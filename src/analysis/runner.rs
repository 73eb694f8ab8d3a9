//! Repeated independent runs per scenario, aggregated for comparison.

use crate::config::Config;
use crate::engine::{RunSettings, SimulationEngine};
use crate::error::{Result, SimulationError};
use crate::scenario::Scenario;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Prey-to-predator ratio band considered balanced
const BALANCED_RATIO: (f64, f64) = (1.5, 3.0);
const IDEAL_RATIO: f64 = 2.25;

/// Parameters shared by every run of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub max_turns: u32,
    /// Simulations per scenario
    pub runs: usize,
    pub third_species: bool,
    pub mutations: bool,
    /// Run `i` of a scenario is seeded with `base_seed + i`
    pub base_seed: u64,
}

impl AnalysisSettings {
    pub fn new(max_turns: u32, runs: usize) -> Self {
        Self {
            max_turns,
            runs,
            third_species: false,
            mutations: false,
            base_seed: 0,
        }
    }

    /// Settings using the configured number of runs per scenario
    pub fn from_config(config: &Config, max_turns: u32) -> Self {
        Self::new(max_turns, config.analysis.runs_per_scenario)
    }

    pub fn with_third_species(mut self, enabled: bool) -> Self {
        self.third_species = enabled;
        self
    }

    pub fn with_mutations(mut self, enabled: bool) -> Self {
        self.mutations = enabled;
        self
    }

    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }
}

/// Final state of one finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub turns: u32,
    pub extinction: bool,
    pub prey_extinct: bool,
    pub prey: usize,
    pub predators: usize,
    pub apex: usize,
    pub occupancy: f64,
}

/// Which side the surviving populations favour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dominance {
    Extinct,
    Balanced,
    Preys,
    Predators,
}

impl Dominance {
    /// Classify average final counts, returning the class and its score
    pub fn classify(avg_prey: f64, avg_predators: f64) -> (Dominance, f64) {
        if avg_prey == 0.0 || avg_predators == 0.0 {
            return (Dominance::Extinct, 0.0);
        }

        let ratio = avg_prey / avg_predators;
        if (BALANCED_RATIO.0..=BALANCED_RATIO.1).contains(&ratio) {
            (
                Dominance::Balanced,
                1.0 - (ratio - IDEAL_RATIO).abs() / IDEAL_RATIO,
            )
        } else if ratio > BALANCED_RATIO.1 {
            (Dominance::Preys, (ratio / 10.0).min(1.0))
        } else {
            (Dominance::Predators, (3.0 / ratio / 10.0).min(1.0))
        }
    }
}

impl fmt::Display for Dominance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dominance::Extinct => "EXTINCT",
            Dominance::Balanced => "BALANCED",
            Dominance::Preys => "PREYS",
            Dominance::Predators => "PREDATORS",
        };
        f.write_str(name)
    }
}

/// Aggregated metrics of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub scenario: Scenario,
    pub simulations: usize,

    // Extinction
    pub extinctions: usize,
    pub prey_extinctions: usize,
    pub predator_extinctions: usize,
    pub extinction_rate: f64,
    /// Runs without extinction count as lasting `max_turns`
    pub avg_extinction_turn: f64,

    // Population
    pub avg_final_prey: f64,
    pub avg_final_predators: f64,
    pub avg_final_apex: f64,
    /// Mean of the prey and predator final-count standard deviations
    pub stability: f64,
    pub avg_occupancy: f64,

    // Dominance
    pub dominance: Dominance,
    pub dominance_score: f64,

    pub outcomes: Vec<RunOutcome>,
}

impl ScenarioAnalysis {
    /// Aggregate finished runs
    pub fn from_outcomes(scenario: Scenario, max_turns: u32, outcomes: Vec<RunOutcome>) -> Self {
        let simulations = outcomes.len();
        let extinctions = outcomes.iter().filter(|o| o.extinction).count();
        let prey_extinctions = outcomes
            .iter()
            .filter(|o| o.extinction && o.prey_extinct)
            .count();

        let prey: Vec<f64> = outcomes.iter().map(|o| o.prey as f64).collect();
        let predators: Vec<f64> = outcomes.iter().map(|o| o.predators as f64).collect();
        let apex: Vec<f64> = outcomes.iter().map(|o| o.apex as f64).collect();
        let extinction_turns: Vec<f64> = outcomes
            .iter()
            .map(|o| (if o.extinction { o.turns } else { max_turns }) as f64)
            .collect();
        let occupancy: Vec<f64> = outcomes.iter().map(|o| o.occupancy).collect();

        let avg_final_prey = mean(&prey);
        let avg_final_predators = mean(&predators);
        let (dominance, dominance_score) = Dominance::classify(avg_final_prey, avg_final_predators);

        Self {
            scenario,
            simulations,
            extinctions,
            prey_extinctions,
            predator_extinctions: extinctions - prey_extinctions,
            extinction_rate: if simulations == 0 {
                0.0
            } else {
                extinctions as f64 / simulations as f64
            },
            avg_extinction_turn: if simulations == 0 {
                max_turns as f64
            } else {
                mean(&extinction_turns)
            },
            avg_final_prey,
            avg_final_predators,
            avg_final_apex: mean(&apex),
            stability: (std_dev(&prey) + std_dev(&predators)) / 2.0,
            avg_occupancy: mean(&occupancy),
            dominance,
            dominance_score,
            outcomes,
        }
    }
}

impl fmt::Display for ScenarioAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.scenario)?;
        writeln!(f, "Simulations: {}", self.simulations)?;
        writeln!(f, "Extinction rate: {:.1}%", self.extinction_rate * 100.0)?;
        writeln!(f, "Avg extinction turn: {:.1}", self.avg_extinction_turn)?;
        writeln!(
            f,
            "Avg final population - Preys: {:.1} | Predators: {:.1} | Apex: {:.1}",
            self.avg_final_prey, self.avg_final_predators, self.avg_final_apex
        )?;
        writeln!(
            f,
            "Dominant species: {} (score: {:.2})",
            self.dominance, self.dominance_score
        )?;
        writeln!(f, "Population stability: {:.2}", self.stability)?;
        write!(f, "Avg occupancy: {:.1}%", self.avg_occupancy * 100.0)
    }
}

/// All three scenarios side by side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeAnalysis {
    pub settings: AnalysisSettings,
    pub balanced: ScenarioAnalysis,
    pub predators_dominant: ScenarioAnalysis,
    pub preys_dominant: ScenarioAnalysis,

    /// Lowest extinction rate
    pub most_stable: Scenario,
    /// Lowest average extinction turn
    pub fastest_extinction: Scenario,
    pub highest_occupancy: Scenario,

    pub conclusions: Vec<String>,
}

impl ComparativeAnalysis {
    pub fn new(
        settings: AnalysisSettings,
        balanced: ScenarioAnalysis,
        predators_dominant: ScenarioAnalysis,
        preys_dominant: ScenarioAnalysis,
    ) -> Self {
        let candidates = [&balanced, &predators_dominant, &preys_dominant];

        // Ties resolve in the order given to `pick`
        let most_stable = pick(
            &candidates,
            [Scenario::Balanced, Scenario::PredatorsDominant, Scenario::PreysDominant],
            |a| -a.extinction_rate,
        );
        let fastest_extinction = pick(
            &candidates,
            [Scenario::PredatorsDominant, Scenario::PreysDominant, Scenario::Balanced],
            |a| -a.avg_extinction_turn,
        );
        let highest_occupancy = pick(
            &candidates,
            [Scenario::PreysDominant, Scenario::Balanced, Scenario::PredatorsDominant],
            |a| a.avg_occupancy,
        );

        let mut analysis = Self {
            settings,
            balanced,
            predators_dominant,
            preys_dominant,
            most_stable,
            fastest_extinction,
            highest_occupancy,
            conclusions: Vec::new(),
        };
        analysis.conclusions = analysis.draw_conclusions();
        analysis
    }

    pub fn get(&self, scenario: Scenario) -> &ScenarioAnalysis {
        match scenario {
            Scenario::Balanced => &self.balanced,
            Scenario::PredatorsDominant => &self.predators_dominant,
            Scenario::PreysDominant => &self.preys_dominant,
        }
    }

    fn draw_conclusions(&self) -> Vec<String> {
        let mut lines = Vec::new();

        let balanced = &self.balanced;
        if balanced.extinction_rate < 0.5 {
            lines.push(format!(
                "BALANCED keeps both sides alive in {:.0}% of runs",
                (1.0 - balanced.extinction_rate) * 100.0
            ));
        } else {
            lines.push(format!(
                "BALANCED still collapses in {:.0}% of runs, drifting towards {}",
                balanced.extinction_rate * 100.0,
                balanced.dominance
            ));
        }

        let predators = &self.predators_dominant;
        if predators.prey_extinctions > predators.predator_extinctions {
            lines.push(format!(
                "PREDATORS_DOM overhunts: prey die out first, after {:.1} turns on average",
                predators.avg_extinction_turn
            ));
        } else {
            lines.push(format!(
                "PREDATORS_DOM starves its hunters before the prey run out ({:.1} turns on average)",
                predators.avg_extinction_turn
            ));
        }

        let preys = &self.preys_dominant;
        lines.push(format!(
            "PREYS_DOM fills {:.0}% of the grid on average",
            preys.avg_occupancy * 100.0
        ));
        if preys.extinction_rate > 0.5 {
            lines.push(format!(
                "PREYS_DOM predators still die out in {:.0}% of runs",
                preys.extinction_rate * 100.0
            ));
        }

        lines.push(format!("Most stable: {}", self.most_stable));
        lines.push(format!("Fastest collapse: {}", self.fastest_extinction));
        lines.push(format!("Highest occupancy: {}", self.highest_occupancy));
        lines
    }

    /// Save analysis to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

impl fmt::Display for ComparativeAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scenario in Scenario::ALL {
            writeln!(f, "{}\n", self.get(scenario))?;
        }
        writeln!(f, "=== Conclusions ===")?;
        for line in &self.conclusions {
            writeln!(f, "- {}", line)?;
        }
        Ok(())
    }
}

/// Drives independent engines and aggregates their outcomes
pub struct AnalysisRunner {
    config: Config,
    settings: AnalysisSettings,
}

impl AnalysisRunner {
    pub fn new(config: Config, settings: AnalysisSettings) -> Self {
        Self { config, settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Run one simulation to termination
    pub fn run_once(&self, scenario: Scenario, seed: u64) -> Result<RunOutcome> {
        let settings = RunSettings::new(self.settings.max_turns, scenario)
            .with_third_species(self.settings.third_species)
            .with_mutations(self.settings.mutations);

        let mut engine = SimulationEngine::new_with_seed(self.config.clone(), seed);
        engine.initialize(settings)?;
        engine.run()?;

        let stats = engine.last_stats();
        let outcome = RunOutcome {
            seed,
            turns: engine.current_turn(),
            extinction: stats.extinction,
            prey_extinct: stats.prey == 0,
            prey: stats.prey,
            predators: stats.predators,
            apex: stats.apex,
            occupancy: stats.occupancy_rate(),
        };
        debug!(
            "{} run with seed {} finished after {} turns - extinction: {}",
            scenario, seed, outcome.turns, outcome.extinction
        );
        Ok(outcome)
    }

    /// Run every simulation of a scenario in parallel
    pub fn analyze_scenario(&self, scenario: Scenario) -> Result<ScenarioAnalysis> {
        if self.settings.runs == 0 || self.settings.max_turns == 0 {
            return Err(SimulationError::InvalidSettings(
                "analysis needs at least one run and one turn".to_string(),
            ));
        }
        info!("Analyzing {} over {} runs", scenario, self.settings.runs);

        let base_seed = self.settings.base_seed;
        let outcomes = (0..self.settings.runs)
            .into_par_iter()
            .map(|i| self.run_once(scenario, base_seed.wrapping_add(i as u64)))
            .collect::<Result<Vec<_>>>()?;

        let analysis = ScenarioAnalysis::from_outcomes(scenario, self.settings.max_turns, outcomes);
        info!(
            "{} analysis complete - extinction rate: {:.1}%",
            scenario,
            analysis.extinction_rate * 100.0
        );
        Ok(analysis)
    }

    /// Analyze all three scenarios and compare them
    pub fn run_full(&self) -> Result<ComparativeAnalysis> {
        Ok(ComparativeAnalysis::new(
            self.settings,
            self.analyze_scenario(Scenario::Balanced)?,
            self.analyze_scenario(Scenario::PredatorsDominant)?,
            self.analyze_scenario(Scenario::PreysDominant)?,
        ))
    }
}

/// Scenario with the largest `key`, first in `order` on ties
fn pick<F>(candidates: &[&ScenarioAnalysis; 3], order: [Scenario; 3], key: F) -> Scenario
where
    F: Fn(&ScenarioAnalysis) -> f64,
{
    let best = candidates
        .iter()
        .map(|a| key(a))
        .fold(f64::NEG_INFINITY, f64::max);
    order
        .into_iter()
        .find(|&s| {
            candidates
                .iter()
                .any(|a| a.scenario == s && key(a) == best)
        })
        .unwrap_or(order[0])
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(prey: usize, predators: usize, turns: u32) -> RunOutcome {
        RunOutcome {
            seed: 0,
            turns,
            extinction: prey == 0 || predators == 0,
            prey_extinct: prey == 0,
            prey,
            predators,
            apex: 0,
            occupancy: (prey + predators) as f64 / 100.0,
        }
    }

    fn analysis(scenario: Scenario, outcomes: Vec<RunOutcome>) -> ScenarioAnalysis {
        ScenarioAnalysis::from_outcomes(scenario, 20, outcomes)
    }

    #[test]
    fn test_dominance_classification() {
        assert_eq!(Dominance::classify(0.0, 5.0), (Dominance::Extinct, 0.0));
        assert_eq!(Dominance::classify(22.5, 10.0), (Dominance::Balanced, 1.0));

        let (class, score) = Dominance::classify(40.0, 5.0);
        assert_eq!(class, Dominance::Preys);
        assert!((score - 0.8).abs() < 1e-9);

        let (class, score) = Dominance::classify(10.0, 10.0);
        assert_eq!(class, Dominance::Predators);
        assert!((score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_metrics() {
        let result = analysis(
            Scenario::Balanced,
            vec![outcome(30, 10, 20), outcome(0, 12, 8), outcome(20, 0, 14)],
        );

        assert_eq!(result.simulations, 3);
        assert_eq!(result.extinctions, 2);
        assert_eq!(result.prey_extinctions, 1);
        assert_eq!(result.predator_extinctions, 1);
        assert!((result.extinction_rate - 2.0 / 3.0).abs() < 1e-9);
        // Surviving run counts as max_turns
        assert!((result.avg_extinction_turn - (20.0 + 8.0 + 14.0) / 3.0).abs() < 1e-9);
        assert!((result.avg_final_prey - 50.0 / 3.0).abs() < 1e-9);
        assert!(result.stability > 0.0);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[4.0, 4.0, 4.0]), 0.0);
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_comparison_tie_breaks() {
        let same = vec![outcome(30, 10, 20)];
        let comparison = ComparativeAnalysis::new(
            AnalysisSettings::new(20, 1),
            analysis(Scenario::Balanced, same.clone()),
            analysis(Scenario::PredatorsDominant, same.clone()),
            analysis(Scenario::PreysDominant, same),
        );

        assert_eq!(comparison.most_stable, Scenario::Balanced);
        assert_eq!(comparison.fastest_extinction, Scenario::PredatorsDominant);
        assert_eq!(comparison.highest_occupancy, Scenario::PreysDominant);
        assert!(!comparison.conclusions.is_empty());
    }

    #[test]
    fn test_comparison_picks_extremes() {
        let comparison = ComparativeAnalysis::new(
            AnalysisSettings::new(20, 2),
            analysis(Scenario::Balanced, vec![outcome(30, 0, 6), outcome(0, 10, 4)]),
            analysis(Scenario::PredatorsDominant, vec![outcome(30, 10, 20), outcome(0, 12, 10)]),
            analysis(Scenario::PreysDominant, vec![outcome(80, 5, 20), outcome(70, 6, 20)]),
        );

        assert_eq!(comparison.most_stable, Scenario::PreysDominant);
        assert_eq!(comparison.fastest_extinction, Scenario::Balanced);
        assert_eq!(comparison.highest_occupancy, Scenario::PreysDominant);
        assert!(comparison.to_string().contains("=== Conclusions ==="));
    }

    #[test]
    fn test_runner_is_deterministic() {
        let settings = AnalysisSettings::new(10, 3).with_base_seed(11);
        let runner = AnalysisRunner::new(Config::default(), settings);

        let first = runner.analyze_scenario(Scenario::Balanced).unwrap();
        let second = runner.analyze_scenario(Scenario::Balanced).unwrap();

        assert_eq!(first.simulations, 3);
        assert_eq!(first, second);
        assert!(first.outcomes.iter().all(|o| o.turns <= 10));
    }

    #[test]
    fn test_runner_rejects_empty_analysis() {
        let runner = AnalysisRunner::new(Config::default(), AnalysisSettings::new(10, 0));
        assert!(matches!(
            runner.analyze_scenario(Scenario::Balanced),
            Err(SimulationError::InvalidSettings(_))
        ));
    }
}
