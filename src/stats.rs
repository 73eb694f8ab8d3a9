//! Per-turn statistics and the read-only snapshots handed to collaborators.

use crate::agent::{DeathCause, Species};
use crate::grid::CELL_COUNT;
use crate::position::{Position, GRID_SIZE};
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Symbol for an empty cell in grid encodings
pub const EMPTY_SYMBOL: char = 'E';

/// Deaths in one turn, by cause
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathTally {
    pub hunted: usize,
    pub starvation: usize,
    pub overpopulation: usize,
    pub stress: usize,
    pub confinement: usize,
}

impl DeathTally {
    pub fn record(&mut self, cause: DeathCause) {
        match cause {
            DeathCause::Hunted => self.hunted += 1,
            DeathCause::Starvation => self.starvation += 1,
            DeathCause::Overpopulation => self.overpopulation += 1,
            DeathCause::Stress => self.stress += 1,
            DeathCause::Confinement => self.confinement += 1,
        }
    }

    pub fn get(&self, cause: DeathCause) -> usize {
        match cause {
            DeathCause::Hunted => self.hunted,
            DeathCause::Starvation => self.starvation,
            DeathCause::Overpopulation => self.overpopulation,
            DeathCause::Stress => self.stress,
            DeathCause::Confinement => self.confinement,
        }
    }

    pub fn total(&self) -> usize {
        DeathCause::ALL.iter().map(|&c| self.get(c)).sum()
    }
}

/// Aggregate state after a turn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStats {
    /// Turn number (0 right after initialization)
    pub turn: u32,
    pub prey: usize,
    pub predators: usize,
    pub apex: usize,
    pub empty_cells: usize,
    /// Births this turn
    pub births: usize,
    /// Deaths this turn
    pub deaths: DeathTally,
    pub extinction: bool,
}

impl TurnStats {
    pub fn count(&self, species: Species) -> usize {
        match species {
            Species::Prey => self.prey,
            Species::Predator => self.predators,
            Species::Apex => self.apex,
        }
    }

    pub fn population(&self) -> usize {
        self.prey + self.predators + self.apex
    }

    /// Fraction of occupied cells
    pub fn occupancy_rate(&self) -> f64 {
        (CELL_COUNT - self.empty_cells) as f64 / CELL_COUNT as f64
    }
}

impl fmt::Display for TurnStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Turn {} | Preys: {} | Predators: {} | Apex: {} | Empty: {}",
            self.turn, self.prey, self.predators, self.apex, self.empty_cells
        )
    }
}

/// Read-only view of one turn, in the format collaborators persist and display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub scenario: Scenario,
    pub max_turns: u32,
    #[serde(flatten)]
    pub stats: TurnStats,
    /// One symbol per cell, row-major: `E`, `P`, `D` or `C`
    pub cells: String,
}

impl TurnSnapshot {
    #[inline]
    pub fn turn(&self) -> u32 {
        self.stats.turn
    }

    #[inline]
    pub fn count(&self, species: Species) -> usize {
        self.stats.count(species)
    }

    /// Decode the occupant species of a cell
    pub fn cell_at(&self, pos: Position) -> Option<Species> {
        if !pos.is_valid() {
            return None;
        }
        self.cells
            .as_bytes()
            .get(pos.index())
            .and_then(|&b| Species::from_symbol(b as char))
    }

    /// Grid encoding split into rows
    pub fn rows(&self) -> Vec<&str> {
        (0..GRID_SIZE)
            .filter_map(|r| self.cells.get(r * GRID_SIZE..(r + 1) * GRID_SIZE))
            .collect()
    }

    /// Multi-line grid picture with comma-separated cells
    pub fn render_grid(&self) -> String {
        self.rows()
            .iter()
            .map(|row| {
                row.chars()
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for TurnSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stats, f)
    }
}

/// Ordered snapshots of a single run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SnapshotLog {
    /// `<SCENARIO>_<yyyymmdd_hhmmss>`
    pub run_id: String,
    pub snapshots: Vec<TurnSnapshot>,
}

impl SnapshotLog {
    /// Create a log for a new run of `scenario`
    pub fn new(scenario: Scenario) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Self {
            run_id: format!("{}_{}", scenario.name(), timestamp),
            snapshots: Vec::new(),
        }
    }

    /// Record a snapshot
    pub fn record(&mut self, snapshot: TurnSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn last(&self) -> Option<&TurnSnapshot> {
        self.snapshots.last()
    }

    /// Get (turn, prey, predators, apex) over time
    pub fn population_series(&self) -> Vec<(u32, usize, usize, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.turn(), s.stats.prey, s.stats.predators, s.stats.apex))
            .collect()
    }

    /// Save log to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load log from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
