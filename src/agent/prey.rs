//! Prey behaviour: environmental death checks, random wandering, periodic breeding.

use super::{Action, Agent, DeathCause, Species, Surroundings};
use crate::config::PreyConfig;
use rand::seq::SliceRandom;
use rand::Rng;

/// Death probability from crowding at the given occupancy rate
pub fn overpopulation_chance(occupancy: f64, config: &PreyConfig) -> f64 {
    if occupancy <= config.overpopulation_threshold {
        return 0.0;
    }

    let excess = occupancy - config.overpopulation_threshold;
    (config.overpopulation_base_chance + excess * config.overpopulation_slope)
        .min(config.overpopulation_max_chance)
}

/// Reproduction cooldown after applying the mutation offset
pub fn effective_cooldown(agent: &Agent, config: &PreyConfig) -> u32 {
    let adjusted = config.reproduction_cooldown as i64 + agent.mutation_factor as i64;
    adjusted.max(config.min_cooldown as i64) as u32
}

pub(crate) fn decide<R: Rng + ?Sized>(
    agent: &Agent,
    view: &Surroundings<'_>,
    config: &PreyConfig,
    rng: &mut R,
) -> Action {
    // Crowding
    let crowding = overpopulation_chance(view.occupancy_rate(), config);
    if crowding > 0.0 && rng.gen::<f64>() < crowding {
        return Action::Die(DeathCause::Overpopulation);
    }

    // Predator pressure
    let predators = view
        .nearby(agent.position, config.stress_radius, Species::Predator)
        .len();
    if predators >= config.stress_predator_count && rng.gen::<f64>() < config.stress_death_chance {
        return Action::Die(DeathCause::Stress);
    }

    let empty = view.empty_neighbors(agent.position);
    match empty.choose(rng) {
        Some(&target) => Action::MoveTo(target),
        None if rng.gen::<f64>() < config.confinement_death_chance => {
            Action::Die(DeathCause::Confinement)
        }
        None => Action::Stay,
    }
}

pub(crate) fn can_reproduce(agent: &Agent, config: &PreyConfig) -> bool {
    let cooldown = effective_cooldown(agent, config);
    agent.turns_survived >= cooldown && agent.turns_survived % cooldown == 0
}
