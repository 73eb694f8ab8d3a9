//! Agent structure and per-species behaviour dispatch.
//!
//! Every agent shares one data record; what differs between species lives in
//! [`Traits`] and in the `prey`, `predator` and `apex` behaviour modules. Each
//! turn an agent inspects a read-only [`Surroundings`] view and returns an
//! [`Action`], which the engine applies before the next agent decides.

pub mod apex;
pub mod predator;
pub mod prey;

use crate::config::Config;
use crate::grid::Grid;
use crate::position::Position;
use crate::roster::{AgentId, Roster};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique agent identifier, never reused within a run
pub type AgentKey = u64;

/// The three species living on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Prey,
    Predator,
    Apex,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Prey, Species::Predator, Species::Apex];

    /// Cell symbol used in grid encodings
    pub fn symbol(self) -> char {
        match self {
            Species::Prey => 'P',
            Species::Predator => 'D',
            Species::Apex => 'C',
        }
    }

    /// Decode a cell symbol; `E` and unknown symbols yield `None`
    pub fn from_symbol(symbol: char) -> Option<Species> {
        match symbol {
            'P' => Some(Species::Prey),
            'D' => Some(Species::Predator),
            'C' => Some(Species::Apex),
            _ => None,
        }
    }

    /// Whether the species tracks hunger and can starve
    #[inline]
    pub fn has_hunger(self) -> bool {
        !matches!(self, Species::Prey)
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Prey => "PREY",
            Species::Predator => "PREDATOR",
            Species::Apex => "APEX",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Species-specific state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Traits {
    Prey,
    Predator { prey_eaten: u32 },
    Apex { kills: u32 },
}

impl Traits {
    /// Fresh traits for a newly created agent
    pub fn new(species: Species) -> Self {
        match species {
            Species::Prey => Traits::Prey,
            Species::Predator => Traits::Predator { prey_eaten: 0 },
            Species::Apex => Traits::Apex { kills: 0 },
        }
    }

    pub fn species(&self) -> Species {
        match self {
            Traits::Prey => Species::Prey,
            Traits::Predator { .. } => Species::Predator,
            Traits::Apex { .. } => Species::Apex,
        }
    }
}

/// What an agent decided to do this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remain in place
    Stay,
    /// Relocate to an empty cell
    MoveTo(Position),
    /// Kill the occupant of an adjacent cell and take its place
    Hunt { target: AgentId, at: Position },
    /// Die from the environment before moving
    Die(DeathCause),
}

/// Cause of death tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Hunted,
    Starvation,
    Overpopulation,
    Stress,
    Confinement,
}

impl DeathCause {
    pub const ALL: [DeathCause; 5] = [
        DeathCause::Hunted,
        DeathCause::Starvation,
        DeathCause::Overpopulation,
        DeathCause::Stress,
        DeathCause::Confinement,
    ];
}

/// An animal in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    // Identity
    pub id: AgentKey,
    pub traits: Traits,

    // Physical state
    pub position: Position,
    pub alive: bool,

    // Counters
    pub turns_survived: u32,
    pub turns_without_eating: u32,
    pub fed_this_turn: bool,

    /// Offset applied to reproduction thresholds, in -1..=1
    pub mutation_factor: i32,
}

impl Agent {
    /// Create a new agent with zeroed counters
    pub fn new(id: AgentKey, species: Species, position: Position, mutation_factor: i32) -> Self {
        Self {
            id,
            traits: Traits::new(species),
            position,
            alive: true,
            turns_survived: 0,
            turns_without_eating: 0,
            fed_this_turn: false,
            mutation_factor,
        }
    }

    #[inline]
    pub fn species(&self) -> Species {
        self.traits.species()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark the agent dead. There is no way back.
    pub fn die(&mut self) {
        self.alive = false;
    }

    /// Lifetime prey eaten (predators only)
    pub fn prey_eaten(&self) -> u32 {
        match self.traits {
            Traits::Predator { prey_eaten } => prey_eaten,
            _ => 0,
        }
    }

    /// Lifetime kills (apex only)
    pub fn kills(&self) -> u32 {
        match self.traits {
            Traits::Apex { kills } => kills,
            _ => 0,
        }
    }

    /// Successful hunt: reset hunger and bump the species counter
    pub fn record_meal(&mut self) {
        self.turns_without_eating = 0;
        self.fed_this_turn = true;
        match &mut self.traits {
            Traits::Predator { prey_eaten } => *prey_eaten += 1,
            Traits::Apex { kills } => *kills += 1,
            Traits::Prey => {}
        }
    }

    pub fn increment_turns_survived(&mut self) {
        self.turns_survived += 1;
    }

    /// Advance the hunger counter unless the agent fed this turn
    pub fn increment_hunger(&mut self) {
        if !self.fed_this_turn {
            self.turns_without_eating += 1;
        }
    }

    /// Check whether hunger has reached the species' starvation threshold
    pub fn is_starving(&self, config: &Config) -> bool {
        match self.species() {
            Species::Prey => false,
            Species::Predator => self.turns_without_eating >= config.predator.starvation_turns,
            Species::Apex => self.turns_without_eating >= config.apex.starvation_turns,
        }
    }

    /// Pick this turn's action
    pub fn decide<R: Rng + ?Sized>(
        &self,
        view: &Surroundings<'_>,
        config: &Config,
        rng: &mut R,
    ) -> Action {
        if !self.alive {
            return Action::Stay;
        }

        match self.species() {
            Species::Prey => prey::decide(self, view, &config.prey, rng),
            Species::Predator => predator::decide(self, view, &config.predator, rng),
            Species::Apex => apex::decide(self, view, rng),
        }
    }

    /// Species-specific reproduction eligibility
    pub fn can_reproduce(&self, config: &Config) -> bool {
        if !self.alive {
            return false;
        }

        match self.species() {
            Species::Prey => prey::can_reproduce(self, &config.prey),
            Species::Predator => predator::can_reproduce(self, &config.predator),
            Species::Apex => apex::can_reproduce(self, &config.apex),
        }
    }

    /// Create an offspring of the same species at `position`
    pub fn reproduce(&self, child_id: AgentKey, position: Position, mutation_factor: i32) -> Agent {
        Agent::new(child_id, self.species(), position, mutation_factor)
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} at {} - alive: {}, survived: {}",
            self.species(),
            self.id,
            self.position,
            self.alive,
            self.turns_survived
        )?;
        if self.species().has_hunger() {
            write!(f, ", hungry for: {}", self.turns_without_eating)?;
        }
        Ok(())
    }
}

/// Read-only view of the habitat used while an agent decides
pub struct Surroundings<'a> {
    grid: &'a Grid,
    roster: &'a Roster,
}

impl<'a> Surroundings<'a> {
    pub fn new(grid: &'a Grid, roster: &'a Roster) -> Self {
        Self { grid, roster }
    }

    /// Live occupant of a cell, if any
    pub fn occupant(&self, pos: Position) -> Option<(AgentId, &'a Agent)> {
        let id = self.grid.agent_at(pos)?;
        self.roster
            .get(id)
            .filter(|agent| agent.is_alive())
            .map(|agent| (id, agent))
    }

    /// Species of the live occupant of a cell
    pub fn species_at(&self, pos: Position) -> Option<Species> {
        self.occupant(pos).map(|(_, agent)| agent.species())
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        pos.is_valid() && self.grid.is_empty(pos)
    }

    /// Empty orthogonal neighbours of `pos`
    pub fn empty_neighbors(&self, pos: Position) -> Vec<Position> {
        self.grid.empty_neighbors(pos)
    }

    /// Orthogonal neighbours holding a live agent accepted by `filter`
    pub fn neighbors_where<F>(&self, pos: Position, filter: F) -> Vec<(AgentId, Position)>
    where
        F: Fn(Species) -> bool,
    {
        pos.neighbors()
            .filter_map(|n| {
                self.occupant(n)
                    .filter(|(_, agent)| filter(agent.species()))
                    .map(|(id, _)| (id, n))
            })
            .collect()
    }

    /// Cells within a Chebyshev radius holding a live agent of `species`
    pub fn nearby(&self, pos: Position, radius: i32, species: Species) -> Vec<Position> {
        pos.within(radius)
            .into_iter()
            .filter(|&cell| self.species_at(cell) == Some(species))
            .collect()
    }

    /// Fraction of occupied cells
    pub fn occupancy_rate(&self) -> f64 {
        self.grid.occupancy_rate()
    }
}
