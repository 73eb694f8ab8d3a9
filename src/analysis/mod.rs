//! Multi-run scenario analysis.

pub mod runner;

pub use runner::{
    AnalysisRunner, AnalysisSettings, ComparativeAnalysis, Dominance, RunOutcome,
    ScenarioAnalysis,
};
