//! Arena owning every live agent.
//!
//! The roster is the only owner of [`Agent`] values. Other structures (the
//! grid, per-turn snapshots of the movement order) hold [`AgentId`] handles
//! and look agents up here. Removing an agent frees its slot; freed slots are
//! reused by later insertions, so handles must not be kept across turns.

use crate::agent::{Agent, Species};
use serde::{Deserialize, Serialize};

/// Handle to a roster slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Live agents in insertion order
#[derive(Debug, Clone, Default)]
pub struct Roster {
    slots: Vec<Option<Agent>>,
    free: Vec<AgentId>,
    order: Vec<AgentId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent, returning its handle
    pub fn insert(&mut self, agent: Agent) -> AgentId {
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.index()] = Some(agent);
                id
            }
            None => {
                self.slots.push(Some(agent));
                AgentId((self.slots.len() - 1) as u32)
            }
        };
        self.order.push(id);
        id
    }

    /// Take an agent out of the roster, marking it dead
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let mut agent = self.slots.get_mut(id.index())?.take()?;
        agent.die();
        self.free.push(id);
        self.order.retain(|&other| other != id);
        Some(agent)
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    #[inline]
    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Copy of the current iteration order, safe to hold while mutating the roster
    pub fn ids(&self) -> Vec<AgentId> {
        self.order.clone()
    }

    /// Live agents in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Agent)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.get(id).map(|agent| (id, agent)))
    }

    /// Mutable access to every live agent, in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.slots.iter_mut().flatten()
    }

    /// Count live agents of a species
    pub fn count(&self, species: Species) -> usize {
        self.iter()
            .filter(|(_, agent)| agent.species() == species)
            .count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop every agent
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.order.clear();
    }
}
