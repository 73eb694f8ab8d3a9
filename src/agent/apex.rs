//! Apex behaviour. Apex agents eat anything that is not another apex.

use super::{Action, Agent, Species, Surroundings};
use crate::config::ApexConfig;
use rand::seq::SliceRandom;
use rand::Rng;

pub(crate) fn decide<R: Rng + ?Sized>(agent: &Agent, view: &Surroundings<'_>, rng: &mut R) -> Action {
    let quarry = view.neighbors_where(agent.position, |s| s != Species::Apex);
    if let Some(&(target, at)) = quarry.choose(rng) {
        return Action::Hunt { target, at };
    }

    match view.empty_neighbors(agent.position).choose(rng) {
        Some(&target) => Action::MoveTo(target),
        None => Action::Stay,
    }
}

pub(crate) fn can_reproduce(agent: &Agent, config: &ApexConfig) -> bool {
    agent.turns_without_eating == 0 && agent.turns_survived >= config.maturity_turns
}
