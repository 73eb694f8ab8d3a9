//! Predator behaviour: adjacent hunting, hungry pursuit, random wandering.

use super::{Action, Agent, Species, Surroundings};
use crate::config::PredatorConfig;
use crate::position::Position;
use rand::seq::SliceRandom;
use rand::Rng;

pub(crate) fn decide<R: Rng + ?Sized>(
    agent: &Agent,
    view: &Surroundings<'_>,
    config: &PredatorConfig,
    rng: &mut R,
) -> Action {
    // Adjacent prey takes priority
    let adjacent = view.neighbors_where(agent.position, |s| s == Species::Prey);
    if let Some(&(target, at)) = adjacent.choose(rng) {
        return Action::Hunt { target, at };
    }

    // Hungry predators look further out
    if agent.turns_without_eating >= config.hunger_search_turns {
        if let Some(goal) = nearest_prey(agent.position, view, config.search_radius, rng) {
            if let Some(step) = step_toward(agent.position, goal, view) {
                return Action::MoveTo(step);
            }
        }
    }

    match view.empty_neighbors(agent.position).choose(rng) {
        Some(&target) => Action::MoveTo(target),
        None => Action::Stay,
    }
}

/// Closest live prey within `radius` (Manhattan distance, ties broken at random)
pub fn nearest_prey<R: Rng + ?Sized>(
    origin: Position,
    view: &Surroundings<'_>,
    radius: i32,
    rng: &mut R,
) -> Option<Position> {
    let found = view.nearby(origin, radius, Species::Prey);
    let best = found.iter().map(|p| origin.distance(p)).min()?;
    let closest: Vec<Position> = found
        .into_iter()
        .filter(|p| origin.distance(p) == best)
        .collect();

    closest.choose(rng).copied()
}

/// One orthogonal step toward `goal`: vertical first, then horizontal, empty cells only
pub fn step_toward(from: Position, goal: Position, view: &Surroundings<'_>) -> Option<Position> {
    let d_row = (goal.row - from.row).signum();
    let d_col = (goal.col - from.col).signum();

    let vertical = (d_row != 0).then(|| from.offset(d_row, 0)).flatten();
    let horizontal = (d_col != 0).then(|| from.offset(0, d_col)).flatten();

    [vertical, horizontal]
        .into_iter()
        .flatten()
        .find(|&cell| view.is_empty(cell))
}

pub(crate) fn can_reproduce(agent: &Agent, config: &PredatorConfig) -> bool {
    let maturity = (config.base_maturity as i64 + agent.mutation_factor as i64)
        .max(config.min_maturity as i64);

    let ate_recently = agent.turns_without_eating <= config.breeding_hunger_limit;
    let eaten_enough = agent.prey_eaten() >= config.min_prey_eaten;
    let old_enough = agent.turns_survived as i64 >= maturity;

    ate_recently && eaten_enough && old_enough
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Traits;
    use crate::grid::Grid;
    use crate::roster::Roster;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn place(grid: &mut Grid, roster: &mut Roster, agent: Agent) {
        let pos = agent.position;
        let id = roster.insert(agent);
        grid.place(id, pos);
    }

    fn predator_at(pos: Position, hunger: u32) -> Agent {
        let mut agent = Agent::new(0, Species::Predator, pos, 0);
        agent.turns_without_eating = hunger;
        agent
    }

    #[test]
    fn test_hunts_adjacent_prey() {
        let mut grid = Grid::new();
        let mut roster = Roster::new();
        let hunter = predator_at(Position::new(4, 4), 0);
        place(&mut grid, &mut roster, hunter.clone());
        place(&mut grid, &mut roster, Agent::new(1, Species::Prey, Position::new(4, 5), 0));

        let view = Surroundings::new(&grid, &roster);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        match decide(&hunter, &view, &PredatorConfig::default(), &mut rng) {
            Action::Hunt { at, .. } => assert_eq!(at, Position::new(4, 5)),
            other => panic!("expected hunt, got {:?}", other),
        }
    }

    #[test]
    fn test_ignores_other_predators() {
        let mut grid = Grid::new();
        let mut roster = Roster::new();
        let hunter = predator_at(Position::new(4, 4), 0);
        place(&mut grid, &mut roster, hunter.clone());
        place(&mut grid, &mut roster, predator_at(Position::new(4, 5), 0));

        let view = Surroundings::new(&grid, &roster);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let action = decide(&hunter, &view, &PredatorConfig::default(), &mut rng);

        assert!(matches!(action, Action::MoveTo(_)));
        assert_ne!(action, Action::MoveTo(Position::new(4, 5)));
    }

    #[test]
    fn test_hungry_predator_pursues_vertically_first() {
        let mut grid = Grid::new();
        let mut roster = Roster::new();
        let hunter = predator_at(Position::new(4, 4), 2);
        place(&mut grid, &mut roster, hunter.clone());
        place(&mut grid, &mut roster, Agent::new(1, Species::Prey, Position::new(6, 6), 0));

        let view = Surroundings::new(&grid, &roster);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        assert_eq!(
            decide(&hunter, &view, &PredatorConfig::default(), &mut rng),
            Action::MoveTo(Position::new(5, 4))
        );
    }

    #[test]
    fn test_pursuit_falls_back_to_horizontal() {
        let mut grid = Grid::new();
        let mut roster = Roster::new();
        let hunter = predator_at(Position::new(4, 4), 3);
        place(&mut grid, &mut roster, hunter.clone());
        place(&mut grid, &mut roster, Agent::new(1, Species::Prey, Position::new(6, 6), 0));
        // Block the vertical step with another predator
        place(&mut grid, &mut roster, predator_at(Position::new(5, 4), 0));

        let view = Surroundings::new(&grid, &roster);
        assert_eq!(
            step_toward(Position::new(4, 4), Position::new(6, 6), &view),
            Some(Position::new(4, 5))
        );
    }

    #[test]
    fn test_nearest_prey_prefers_closest() {
        let mut grid = Grid::new();
        let mut roster = Roster::new();
        place(&mut grid, &mut roster, Agent::new(1, Species::Prey, Position::new(2, 2), 0));
        place(&mut grid, &mut roster, Agent::new(2, Species::Prey, Position::new(5, 6), 0));

        let view = Surroundings::new(&grid, &roster);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        assert_eq!(
            nearest_prey(Position::new(4, 4), &view, 2, &mut rng),
            Some(Position::new(5, 6))
        );
        assert_eq!(nearest_prey(Position::new(9, 0), &view, 2, &mut rng), None);
    }

    #[test]
    fn test_reproduction_requirements() {
        let config = PredatorConfig::default();
        let mut predator = predator_at(Position::new(0, 0), 1);
        predator.turns_survived = 5;
        predator.traits = Traits::Predator { prey_eaten: 2 };
        assert!(can_reproduce(&predator, &config));

        // Too hungry
        predator.turns_without_eating = 2;
        assert!(!can_reproduce(&predator, &config));
        predator.turns_without_eating = 0;

        // Not enough lifetime meals
        predator.traits = Traits::Predator { prey_eaten: 1 };
        assert!(!can_reproduce(&predator, &config));
        predator.traits = Traits::Predator { prey_eaten: 2 };

        // Too young, unless mutation lowers the bar
        predator.turns_survived = 4;
        assert!(!can_reproduce(&predator, &config));
        predator.mutation_factor = -1;
        assert!(can_reproduce(&predator, &config));
    }
}
