//! Simulation engine - turn state machine and the per-turn pipeline.

use crate::agent::{Action, Agent, AgentKey, DeathCause, Species, Surroundings};
use crate::config::Config;
use crate::error::{Result, SimulationError};
use crate::grid::{Grid, CELL_COUNT};
use crate::position::Position;
use crate::roster::{AgentId, Roster};
use crate::scenario::Scenario;
use crate::stats::{DeathTally, TurnSnapshot, TurnStats, EMPTY_SYMBOL};
use log::{debug, info, trace};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Lifecycle of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    NotInitialized,
    Initialized,
    Running,
    Terminated,
}

/// Parameters of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub max_turns: u32,
    pub scenario: Scenario,
    /// Seed apex agents alongside prey and predators
    pub third_species: bool,
    /// Give agents a random -1..=1 offset on their breeding thresholds
    pub mutations: bool,
}

impl RunSettings {
    pub fn new(max_turns: u32, scenario: Scenario) -> Self {
        Self {
            max_turns,
            scenario,
            third_species: false,
            mutations: false,
        }
    }

    pub fn with_third_species(mut self, enabled: bool) -> Self {
        self.third_species = enabled;
        self
    }

    pub fn with_mutations(mut self, enabled: bool) -> Self {
        self.mutations = enabled;
        self
    }
}

/// The simulation engine
pub struct SimulationEngine {
    // Habitat
    grid: Grid,
    roster: Roster,

    // State
    state: EngineState,
    settings: Option<RunSettings>,
    current_turn: u32,

    // Configuration
    config: Config,

    // Statistics
    stats: TurnStats,
    history: Vec<TurnStats>,
    births_this_turn: usize,
    deaths_this_turn: DeathTally,

    // ID generation
    next_agent_key: AgentKey,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl SimulationEngine {
    /// Create an engine with a random seed
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create an engine with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Self {
        Self {
            grid: Grid::new(),
            roster: Roster::new(),
            state: EngineState::NotInitialized,
            settings: None,
            current_turn: 0,
            config,
            stats: TurnStats::default(),
            history: Vec::new(),
            births_this_turn: 0,
            deaths_this_turn: DeathTally::default(),
            next_agent_key: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed the grid with the scenario's populations
    pub fn initialize(&mut self, settings: RunSettings) -> Result<()> {
        self.check_can_initialize(&settings)?;

        let population = settings
            .scenario
            .population(&self.config.scenarios, settings.third_species);
        if population.total() > CELL_COUNT {
            return Err(SimulationError::InvalidSettings(format!(
                "{} agents do not fit on {} cells",
                population.total(),
                CELL_COUNT
            )));
        }

        self.settings = Some(settings);
        self.seed_species(Species::Prey, population.prey);
        self.seed_species(Species::Predator, population.predators);
        self.seed_species(Species::Apex, population.apex);
        self.finish_initialization();

        info!(
            "Ecosystem initialized - scenario: {}, preys: {}, predators: {}, apex: {}, max turns: {}",
            settings.scenario,
            population.prey,
            population.predators,
            population.apex,
            settings.max_turns
        );
        Ok(())
    }

    /// Start a run from hand-placed agents instead of the scenario preset
    pub fn initialize_with_agents(&mut self, settings: RunSettings, agents: Vec<Agent>) -> Result<()> {
        self.check_can_initialize(&settings)?;

        let invalid = |msg: String| Err(SimulationError::InvalidSettings(msg));
        for agent in &agents {
            if !agent.position.is_valid() {
                return invalid(format!("agent #{} placed off-grid at {}", agent.id, agent.position));
            }
            if !(-1..=1).contains(&agent.mutation_factor) {
                return invalid(format!(
                    "agent #{} has mutation factor {} outside -1..=1",
                    agent.id, agent.mutation_factor
                ));
            }
        }

        let mut cells: Vec<Position> = agents.iter().map(|a| a.position).collect();
        cells.sort();
        cells.dedup();
        if cells.len() != agents.len() {
            return invalid("two agents share a cell".to_string());
        }

        let mut keys: Vec<AgentKey> = agents.iter().map(|a| a.id).collect();
        keys.sort_unstable();
        keys.dedup();
        if keys.len() != agents.len() {
            return invalid("two agents share an id".to_string());
        }
        let next_key = match keys.last() {
            Some(&max) => match max.checked_add(1) {
                Some(next) => next,
                None => return invalid(format!("agent id {} leaves no room for offspring", max)),
            },
            None => 0,
        };

        self.settings = Some(settings);
        self.next_agent_key = self.next_agent_key.max(next_key);
        for mut agent in agents {
            agent.alive = true;
            self.insert(agent);
        }
        self.finish_initialization();

        info!(
            "Ecosystem initialized with {} placed agents - scenario: {}",
            self.roster.len(),
            settings.scenario
        );
        Ok(())
    }

    fn check_can_initialize(&self, settings: &RunSettings) -> Result<()> {
        if self.state != EngineState::NotInitialized {
            return Err(SimulationError::AlreadyInitialized);
        }
        if settings.max_turns == 0 {
            return Err(SimulationError::InvalidSettings(
                "max_turns must be > 0".to_string(),
            ));
        }
        self.config
            .validate()
            .map_err(|e| SimulationError::InvalidSettings(e.to_string()))
    }

    fn finish_initialization(&mut self) {
        self.current_turn = 0;
        self.state = EngineState::Initialized;
        self.stats = self.compute_stats();
        self.history.push(self.stats);
        self.debug_check("initialization");
    }

    /// Place `count` agents into uniformly random empty cells
    fn seed_species(&mut self, species: Species, count: usize) {
        for _ in 0..count {
            let empty = self.grid.empty_cells();
            let Some(&pos) = empty.choose(&mut self.rng) else {
                break;
            };
            let mutation = self.roll_mutation(species);
            let agent = Agent::new(self.allocate_key(), species, pos, mutation);
            self.insert(agent);
        }
    }

    /// Discard the current run. The random stream carries on.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.roster.clear();
        self.state = EngineState::NotInitialized;
        self.settings = None;
        self.current_turn = 0;
        self.stats = TurnStats::default();
        self.history.clear();
        self.births_this_turn = 0;
        self.deaths_this_turn = DeathTally::default();
        info!("Ecosystem reset");
    }

    /// Run one full turn. Returns whether the simulation should continue.
    pub fn execute_turn(&mut self) -> Result<bool> {
        let settings = match (self.state, self.settings) {
            (EngineState::Terminated, _) => return Err(SimulationError::Terminated),
            (EngineState::NotInitialized, _) | (_, None) => {
                return Err(SimulationError::NotInitialized)
            }
            (_, Some(settings)) => settings,
        };

        self.state = EngineState::Running;
        self.current_turn += 1;
        self.births_this_turn = 0;
        self.deaths_this_turn = DeathTally::default();
        for agent in self.roster.iter_mut() {
            agent.fed_this_turn = false;
        }
        debug!("--- Executing turn {} ---", self.current_turn);

        // Phase 1: Movement
        self.movement_phase();
        self.debug_check("movement");

        // Phase 2: Starvation
        self.starvation_phase();
        self.debug_check("starvation");

        // Phase 3: Reproduction
        self.reproduction_phase();
        self.debug_check("reproduction");

        // Phase 4: Statistics
        self.stats = self.compute_stats();
        self.history.push(self.stats);
        debug!("{}", self.stats);

        let proceed = self.current_turn < settings.max_turns && !self.stats.extinction;
        if !proceed {
            self.state = EngineState::Terminated;
            info!(
                "Simulation ended after {} turns - extinction: {}, preys: {}, predators: {}, apex: {}",
                self.current_turn,
                self.stats.extinction,
                self.stats.prey,
                self.stats.predators,
                self.stats.apex
            );
        }

        Ok(proceed)
    }

    /// Run turns until the simulation stops, returning the number of turns executed
    pub fn run(&mut self) -> Result<u32> {
        self.run_with_callback(|_| {})
    }

    /// Run until the simulation stops, calling `callback` after every turn
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<u32>
    where
        F: FnMut(&SimulationEngine),
    {
        let start = self.current_turn;
        while self.execute_turn()? {
            callback(self);
        }
        callback(self);
        Ok(self.current_turn - start)
    }

    /// Let every agent alive at the start of the phase act once
    fn movement_phase(&mut self) {
        for id in self.roster.ids() {
            let action = match self.roster.get(id) {
                Some(agent) if agent.is_alive() => {
                    let view = Surroundings::new(&self.grid, &self.roster);
                    agent.decide(&view, &self.config, &mut self.rng)
                }
                _ => continue,
            };
            self.apply(id, action);
        }
    }

    /// Apply a decided action immediately
    fn apply(&mut self, id: AgentId, action: Action) {
        match action {
            Action::Stay => {}
            Action::MoveTo(to) => self.relocate(id, to),
            Action::Hunt { target, at } => {
                let Some(victim) = self.kill(target, DeathCause::Hunted) else {
                    return;
                };
                self.relocate(id, at);
                if let Some(hunter) = self.roster.get_mut(id) {
                    hunter.record_meal();
                    debug!(
                        "[{}] #{} hunted {} #{} at {}",
                        hunter.species(),
                        hunter.id,
                        victim.species(),
                        victim.id,
                        at
                    );
                }
            }
            Action::Die(cause) => {
                self.kill(id, cause);
            }
        }
    }

    /// Move an agent on the grid and update its own position in the same step
    fn relocate(&mut self, id: AgentId, to: Position) {
        let Some(agent) = self.roster.get_mut(id) else {
            return;
        };
        if !to.is_valid() {
            return;
        }

        let from = agent.position;
        self.grid.move_agent(id, from, to);
        agent.position = to;
        trace!("[{}] #{} moved from {} to {}", agent.species(), agent.id, from, to);
    }

    /// Remove an agent from roster and grid together
    fn kill(&mut self, id: AgentId, cause: DeathCause) -> Option<Agent> {
        let agent = self.roster.remove(id)?;
        if self.grid.agent_at(agent.position) == Some(id) {
            self.grid.remove(agent.position);
        }
        self.deaths_this_turn.record(cause);
        debug!("[{}] #{} died ({:?}) at {}", agent.species(), agent.id, cause, agent.position);
        Some(agent)
    }

    /// Advance hunger for predators and apex; starve those over the threshold
    fn starvation_phase(&mut self) {
        for id in self.roster.ids() {
            let starving = match self.roster.get_mut(id) {
                Some(agent) if agent.species().has_hunger() => {
                    agent.increment_hunger();
                    agent.is_starving(&self.config)
                }
                _ => false,
            };
            if starving {
                self.kill(id, DeathCause::Starvation);
            }
        }
    }

    /// Age every survivor and breed the eligible ones. Offspring join the
    /// roster only after every existing agent has been considered.
    fn reproduction_phase(&mut self) {
        let mut offspring: Vec<Agent> = Vec::new();

        for id in self.roster.ids() {
            let (species, position) = match self.roster.get_mut(id) {
                Some(agent) if agent.is_alive() => {
                    agent.increment_turns_survived();
                    if !agent.can_reproduce(&self.config) {
                        continue;
                    }
                    (agent.species(), agent.position)
                }
                _ => continue,
            };

            // Cells already promised to a newborn this phase are taken
            let free: Vec<Position> = self
                .grid
                .empty_neighbors(position)
                .into_iter()
                .filter(|cell| offspring.iter().all(|child| child.position != *cell))
                .collect();
            let Some(&cell) = free.choose(&mut self.rng) else {
                continue;
            };

            let mutation = self.roll_mutation(species);
            let key = self.allocate_key();
            if let Some(parent) = self.roster.get(id) {
                offspring.push(parent.reproduce(key, cell, mutation));
            }
        }

        for child in offspring {
            debug!("[{}] #{} born at {}", child.species(), child.id, child.position);
            self.insert(child);
            self.births_this_turn += 1;
        }
    }

    fn insert(&mut self, agent: Agent) -> AgentId {
        let pos = agent.position;
        let id = self.roster.insert(agent);
        self.grid.place(id, pos);
        id
    }

    fn allocate_key(&mut self) -> AgentKey {
        let key = self.next_agent_key;
        self.next_agent_key += 1;
        key
    }

    /// Mutation offset for a newly created agent
    fn roll_mutation(&mut self, species: Species) -> i32 {
        let enabled = self.settings.map_or(false, |s| s.mutations);
        if enabled && species != Species::Apex {
            self.rng.gen_range(-1..=1)
        } else {
            0
        }
    }

    fn compute_stats(&self) -> TurnStats {
        TurnStats {
            turn: self.current_turn,
            prey: self.prey_count(),
            predators: self.predator_count(),
            apex: self.apex_count(),
            empty_cells: self.grid.empty_count(),
            births: self.births_this_turn,
            deaths: self.deaths_this_turn,
            extinction: self.has_extinction(),
        }
    }

    /// Check that grid and roster agree on every live agent
    pub fn verify_consistency(&self) -> Result<()> {
        let broken = |msg: String| Err(SimulationError::Inconsistent(msg));

        for (pos, id) in self.grid.iter() {
            match self.roster.get(id) {
                None => return broken(format!("cell {} references a removed agent", pos)),
                Some(agent) if !agent.is_alive() => {
                    return broken(format!("cell {} holds dead agent #{}", pos, agent.id))
                }
                Some(agent) if agent.position != pos => {
                    return broken(format!(
                        "agent #{} is at {} but the grid has it at {}",
                        agent.id, agent.position, pos
                    ))
                }
                Some(_) => {}
            }
        }

        for (id, agent) in self.roster.iter() {
            if self.grid.agent_at(agent.position) != Some(id) {
                return broken(format!("agent #{} missing from cell {}", agent.id, agent.position));
            }
        }

        if self.grid.occupied_count() != self.roster.len() {
            return broken(format!(
                "{} occupied cells for {} live agents",
                self.grid.occupied_count(),
                self.roster.len()
            ));
        }
        Ok(())
    }

    fn debug_check(&self, phase: &str) {
        debug_assert!(
            self.verify_consistency().is_ok(),
            "invariant broken after {} phase: {:?}",
            phase,
            self.verify_consistency()
        );
    }

    // ========== Queries ==========

    pub fn count(&self, species: Species) -> usize {
        self.roster.count(species)
    }

    pub fn prey_count(&self) -> usize {
        self.count(Species::Prey)
    }

    pub fn predator_count(&self) -> usize {
        self.count(Species::Predator)
    }

    pub fn apex_count(&self) -> usize {
        self.count(Species::Apex)
    }

    /// Total live agents
    pub fn population(&self) -> usize {
        self.roster.len()
    }

    pub fn empty_cells(&self) -> usize {
        self.grid.empty_count()
    }

    /// True once prey are gone, or once no predator or apex remains
    pub fn has_extinction(&self) -> bool {
        self.prey_count() == 0 || (self.predator_count() == 0 && self.apex_count() == 0)
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    pub fn max_turns(&self) -> Option<u32> {
        self.settings.map(|s| s.max_turns)
    }

    pub fn scenario(&self) -> Option<Scenario> {
        self.settings.map(|s| s.scenario)
    }

    pub fn settings(&self) -> Option<&RunSettings> {
        self.settings.as_ref()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Live agents in roster order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.roster.iter().map(|(_, agent)| agent)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.roster.get(id)
    }

    pub fn agent_at(&self, pos: Position) -> Option<&Agent> {
        self.grid.agent_at(pos).and_then(|id| self.roster.get(id))
    }

    /// Statistics of the most recent turn (turn 0 right after initialization)
    pub fn last_stats(&self) -> &TurnStats {
        &self.stats
    }

    /// Statistics of every turn so far, starting with turn 0
    pub fn history(&self) -> &[TurnStats] {
        &self.history
    }

    /// Read-only snapshot of the current turn
    pub fn snapshot(&self) -> Result<TurnSnapshot> {
        let settings = self.settings.ok_or(SimulationError::NotInitialized)?;

        let mut cells = vec![EMPTY_SYMBOL; CELL_COUNT];
        for (pos, id) in self.grid.iter() {
            if let Some(agent) = self.roster.get(id) {
                cells[pos.index()] = agent.species().symbol();
            }
        }

        Ok(TurnSnapshot {
            scenario: settings.scenario,
            max_turns: settings.max_turns,
            stats: self.stats,
            cells: cells.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Traits;

    fn balanced(max_turns: u32) -> RunSettings {
        RunSettings::new(max_turns, Scenario::Balanced)
    }

    fn engine_with(agents: Vec<Agent>, max_turns: u32) -> SimulationEngine {
        let mut engine = SimulationEngine::new_with_seed(Config::default(), 7);
        engine.initialize_with_agents(balanced(max_turns), agents).unwrap();
        engine
    }

    #[test]
    fn test_initialization_counts() {
        let mut engine = SimulationEngine::new_with_seed(Config::default(), 42);
        engine.initialize(balanced(20)).unwrap();

        assert_eq!(engine.state(), EngineState::Initialized);
        assert_eq!(engine.prey_count(), 30);
        assert_eq!(engine.predator_count(), 20);
        assert_eq!(engine.apex_count(), 0);
        assert_eq!(engine.empty_cells(), 50);
        assert!(engine.verify_consistency().is_ok());
    }

    #[test]
    fn test_third_species_and_mutations() {
        let mut engine = SimulationEngine::new_with_seed(Config::default(), 42);
        let settings = RunSettings::new(20, Scenario::PreysDominant)
            .with_third_species(true)
            .with_mutations(true);
        engine.initialize(settings).unwrap();

        assert_eq!(engine.prey_count(), 35);
        assert_eq!(engine.predator_count(), 15);
        assert_eq!(engine.apex_count(), 5);
        assert!(engine
            .agents()
            .all(|a| (-1..=1).contains(&a.mutation_factor)));
        assert!(engine
            .agents()
            .filter(|a| a.species() == Species::Apex)
            .all(|a| a.mutation_factor == 0));
    }

    #[test]
    fn test_usage_errors() {
        let mut engine = SimulationEngine::new_with_seed(Config::default(), 1);
        assert_eq!(engine.execute_turn(), Err(SimulationError::NotInitialized));
        assert_eq!(engine.snapshot().err(), Some(SimulationError::NotInitialized));

        assert!(matches!(
            engine.initialize(balanced(0)),
            Err(SimulationError::InvalidSettings(_))
        ));

        engine.initialize(balanced(5)).unwrap();
        assert_eq!(
            engine.initialize(balanced(5)),
            Err(SimulationError::AlreadyInitialized)
        );

        engine.reset();
        assert_eq!(engine.state(), EngineState::NotInitialized);
        assert_eq!(engine.population(), 0);
        assert!(engine.initialize(balanced(5)).is_ok());
    }

    #[test]
    fn test_terminates_at_max_turns() {
        let mut engine = SimulationEngine::new_with_seed(Config::default(), 3);
        engine.initialize(balanced(3)).unwrap();

        let turns = engine.run().unwrap();

        assert!(turns <= 3);
        assert_eq!(engine.state(), EngineState::Terminated);
        assert_eq!(engine.execute_turn(), Err(SimulationError::Terminated));
        assert_eq!(engine.history().len(), turns as usize + 1);
    }

    #[test]
    fn test_hunt_resets_hunger_and_moves_hunter() {
        let mut predator = Agent::new(0, Species::Predator, Position::new(4, 4), 0);
        predator.turns_without_eating = 3;
        let prey = Agent::new(1, Species::Prey, Position::new(4, 5), 0);
        let bystander = Agent::new(2, Species::Prey, Position::new(0, 0), 0);
        let mut engine = engine_with(vec![predator, prey, bystander], 10);

        engine.execute_turn().unwrap();

        let hunter = engine.agent_at(Position::new(4, 5)).unwrap();
        assert_eq!(hunter.species(), Species::Predator);
        assert_eq!(hunter.turns_without_eating, 0);
        assert_eq!(hunter.prey_eaten(), 1);
        assert_eq!(engine.last_stats().deaths.hunted, 1);
        assert!(engine.grid().is_empty(Position::new(4, 4)));
    }

    #[test]
    fn test_starving_predator_is_removed() {
        let mut predator = Agent::new(0, Species::Predator, Position::new(9, 9), 0);
        predator.turns_without_eating = 4;
        predator.turns_survived = 10;
        predator.traits = Traits::Predator { prey_eaten: 5 };
        let prey = Agent::new(1, Species::Prey, Position::new(0, 0), 0);
        let mut engine = engine_with(vec![predator, prey], 10);

        let proceed = engine.execute_turn().unwrap();

        assert_eq!(engine.predator_count(), 0);
        assert!(engine
            .snapshot()
            .unwrap()
            .cells
            .chars()
            .all(|c| c != 'D'));
        assert_eq!(engine.last_stats().deaths.starvation, 1);
        assert!(!proceed);
        assert!(engine.has_extinction());
    }

    #[test]
    fn test_prey_reproduces_on_cooldown() {
        let mut prey = Agent::new(0, Species::Prey, Position::new(2, 2), 0);
        prey.turns_survived = 3;
        let predator = Agent::new(1, Species::Predator, Position::new(9, 9), 0);
        let mut engine = engine_with(vec![prey, predator], 10);

        engine.execute_turn().unwrap();

        assert_eq!(engine.prey_count(), 2);
        assert_eq!(engine.last_stats().births, 1);
        let mut prey: Vec<&Agent> = engine
            .agents()
            .filter(|a| a.species() == Species::Prey)
            .collect();
        prey.sort_by_key(|a| a.turns_survived);
        assert_eq!(prey[0].turns_survived, 0);
        assert_eq!(prey[1].turns_survived, 4);
        assert!(prey[0].position.is_adjacent(&prey[1].position));
    }

    #[test]
    fn test_offspring_never_share_cells() {
        // A crowded block of prey all due to breed, competing for few free cells
        let mut agents = Vec::new();
        for index in 0..60 {
            let mut prey = Agent::new(index as u64, Species::Prey, Position::from_index(index), 0);
            prey.turns_survived = 3;
            agents.push(prey);
        }

        let mut engine = engine_with(agents, 10);
        engine.execute_turn().unwrap();

        assert!(engine.verify_consistency().is_ok());
        assert!(engine.last_stats().births > 0);

        let mut cells: Vec<Position> = engine.agents().map(|a| a.position).collect();
        let population = cells.len();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), population);
        assert_eq!(population + engine.empty_cells(), CELL_COUNT);
    }

    #[test]
    fn test_snapshot_matches_counts() {
        let mut engine = SimulationEngine::new_with_seed(Config::default(), 99);
        engine
            .initialize(balanced(20).with_third_species(true))
            .unwrap();
        engine.execute_turn().unwrap();

        let snapshot = engine.snapshot().unwrap();
        let count = |c: char| snapshot.cells.chars().filter(|&x| x == c).count();

        assert_eq!(snapshot.cells.len(), CELL_COUNT);
        assert_eq!(count('P'), engine.prey_count());
        assert_eq!(count('D'), engine.predator_count());
        assert_eq!(count('C'), engine.apex_count());
        assert_eq!(count('E'), engine.empty_cells());
        assert_eq!(snapshot.turn(), 1);
        assert_eq!(snapshot.scenario, Scenario::Balanced);
    }

    #[test]
    fn test_rejects_overlapping_placement() {
        let mut engine = SimulationEngine::new_with_seed(Config::default(), 1);
        let agents = vec![
            Agent::new(0, Species::Prey, Position::new(1, 1), 0),
            Agent::new(1, Species::Predator, Position::new(1, 1), 0),
        ];
        assert!(matches!(
            engine.initialize_with_agents(balanced(5), agents),
            Err(SimulationError::InvalidSettings(_))
        ));
        assert_eq!(engine.state(), EngineState::NotInitialized);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = Config::default();
        config.prey.reproduction_cooldown = 0;
        config.prey.min_cooldown = 0;
        let mut engine = SimulationEngine::new_with_seed(config, 1);

        assert!(matches!(
            engine.initialize(balanced(5)),
            Err(SimulationError::InvalidSettings(_))
        ));
        assert_eq!(engine.state(), EngineState::NotInitialized);
        assert_eq!(engine.execute_turn(), Err(SimulationError::NotInitialized));

        let prey = Agent::new(0, Species::Prey, Position::new(0, 0), 0);
        assert!(matches!(
            engine.initialize_with_agents(balanced(5), vec![prey]),
            Err(SimulationError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_rejects_bad_placed_agents() {
        let out_of_range = vec![Agent::new(0, Species::Prey, Position::new(0, 0), 2)];
        let duplicate_keys = vec![
            Agent::new(3, Species::Prey, Position::new(0, 0), 0),
            Agent::new(3, Species::Predator, Position::new(5, 5), 0),
        ];
        let max_key = vec![Agent::new(u64::MAX, Species::Prey, Position::new(0, 0), 0)];

        for agents in [out_of_range, duplicate_keys, max_key] {
            let mut engine = SimulationEngine::new_with_seed(Config::default(), 1);
            assert!(matches!(
                engine.initialize_with_agents(balanced(5), agents),
                Err(SimulationError::InvalidSettings(_))
            ));
            assert_eq!(engine.population(), 0);
        }
    }

    #[test]
    fn test_apex_stands_in_for_predators() {
        let prey = Agent::new(0, Species::Prey, Position::new(0, 0), 0);
        let apex = Agent::new(1, Species::Apex, Position::new(9, 9), 0);
        let mut engine = engine_with(vec![prey, apex], 10);

        assert_eq!(engine.predator_count(), 0);
        assert!(!engine.has_extinction());
        assert_eq!(engine.execute_turn(), Ok(true));
        assert!(!engine.last_stats().extinction);
    }

    #[test]
    fn test_apex_hunts_predator() {
        let apex = Agent::new(0, Species::Apex, Position::new(4, 4), 0);
        let predator = Agent::new(1, Species::Predator, Position::new(4, 5), 0);
        let prey = Agent::new(2, Species::Prey, Position::new(0, 0), 0);
        let mut engine = engine_with(vec![apex, predator, prey], 10);

        engine.execute_turn().unwrap();

        assert_eq!(engine.predator_count(), 0);
        assert_eq!(engine.apex_count(), 1);
        assert_eq!(engine.last_stats().deaths.hunted, 1);
        let hunter = engine.agent_at(Position::new(4, 5)).unwrap();
        assert_eq!(hunter.species(), Species::Apex);
        assert_eq!(hunter.kills(), 1);
        assert_eq!(hunter.turns_without_eating, 0);
        assert!(!engine.has_extinction());
    }
}
