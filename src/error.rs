//! Error types for the simulation engine and configuration loading.

use thiserror::Error;

/// Usage and consistency errors raised by the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("no ecosystem initialized")]
    NotInitialized,

    #[error("ecosystem already initialized; call reset() first")]
    AlreadyInitialized,

    #[error("simulation has terminated")]
    Terminated,

    #[error("invalid run settings: {0}")]
    InvalidSettings(String),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("grid and roster disagree: {0}")]
    Inconsistent(String),
}

/// Errors that can occur while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
