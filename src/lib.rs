//! # ECOGRID
//!
//! Turn-based predator-prey simulation on a 10x10 grid.
//!
//! ## Features
//!
//! - **Three species**: prey, predators and an optional apex hunter
//! - **Deterministic**: seeded random number generation, one stream per engine
//! - **Configurable**: YAML configuration files for every threshold
//! - **Comparative analysis**: many runs per scenario in parallel via Rayon
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecogrid::{Config, RunSettings, Scenario, SimulationEngine};
//!
//! let mut engine = SimulationEngine::new_with_seed(Config::default(), 42);
//! engine.initialize(RunSettings::new(20, Scenario::Balanced)).unwrap();
//!
//! while engine.execute_turn().unwrap() {
//!     println!("{}", engine.last_stats());
//! }
//!
//! println!("Extinction: {}", engine.has_extinction());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use ecogrid::Config;
//!
//! let mut config = Config::default();
//! config.prey.reproduction_cooldown = 5;
//! config.predator.starvation_turns = 3;
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Analysis
//!
//! ```rust,no_run
//! use ecogrid::{AnalysisRunner, AnalysisSettings, Config};
//!
//! let settings = AnalysisSettings::new(50, 10).with_base_seed(7);
//! let runner = AnalysisRunner::new(Config::default(), settings);
//! let report = runner.run_full().unwrap();
//! println!("{}", report);
//! ```

pub mod agent;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod position;
pub mod roster;
pub mod scenario;
pub mod stats;

// Re-export main types
pub use agent::{Agent, Species};
pub use analysis::{AnalysisRunner, AnalysisSettings, ComparativeAnalysis, ScenarioAnalysis};
pub use config::Config;
pub use engine::{EngineState, RunSettings, SimulationEngine};
pub use error::{ConfigError, SimulationError};
pub use position::{Position, GRID_SIZE};
pub use scenario::Scenario;
pub use stats::{SnapshotLog, TurnSnapshot, TurnStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
