//! Organisms and the population that owns them.

use crate::brain::{CompiledBrain, GenomeLogic, NeuronCounts};
use evogrid_data::{Coord, DeathCause, Direction, Genome, OrganismId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub position: Coord,
    pub direction: Direction,
    pub genome: Genome,
    /// Compiled once at construction and never recompiled.
    pub brain: CompiledBrain,
    pub energy: f32,
    pub age: u32,
    pub steps: u64,
    /// Display grouping color derived from the genome.
    pub color: u32,
    pub fitness: f32,
    alive: bool,
    death_cause: Option<DeathCause>,
}

impl Organism {
    #[must_use]
    pub fn new(
        id: OrganismId,
        position: Coord,
        genome: Genome,
        counts: NeuronCounts,
        energy: f32,
    ) -> Self {
        let brain = genome.compile(counts);
        Self::with_brain(id, position, genome, brain, energy)
    }

    /// Builds an organism around an already compiled brain.
    #[must_use]
    pub fn with_brain(
        id: OrganismId,
        position: Coord,
        genome: Genome,
        brain: CompiledBrain,
        energy: f32,
    ) -> Self {
        let color = genome.signature_color();
        Self {
            id,
            position,
            direction: Direction::North,
            genome,
            brain,
            energy: energy.max(0.0),
            age: 0,
            steps: 0,
            color,
            fitness: 0.0,
            alive: true,
            death_cause: None,
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death_cause
    }

    /// Marks the organism dead. Returns `true` only for the call that
    /// actually killed it.
    pub fn kill(&mut self, cause: DeathCause) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.death_cause = Some(cause);
        true
    }

    /// Adds energy, capped at `max_energy`. Returns the amount absorbed.
    pub fn gain_energy(&mut self, amount: f32, max_energy: f32) -> f32 {
        let before = self.energy;
        self.energy = (self.energy + amount).clamp(0.0, max_energy);
        self.energy - before
    }

    /// Spends energy, never going below zero. Returns `true` when the
    /// organism is left with nothing.
    pub fn spend_energy(&mut self, amount: f32) -> bool {
        self.energy = (self.energy - amount).max(0.0);
        self.energy <= 0.0
    }

    /// Prepares an elite for the next generation: young, rested and with a
    /// fresh brain.
    pub fn rebirth(&mut self, position: Coord, brain: CompiledBrain, energy: f32) {
        self.position = position;
        self.direction = Direction::North;
        self.brain = brain;
        self.energy = energy.max(0.0);
        self.age = 0;
        self.steps = 0;
        self.fitness = 0.0;
        self.alive = true;
        self.death_cause = None;
    }
}

/// Organisms of one generation, iterated in birth order.
///
/// Ids grow monotonically, so the `BTreeMap` key order is insertion order
/// and tick processing is reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Population {
    members: BTreeMap<OrganismId, Organism>,
    next_id: u64,
}

impl Population {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next id.
    pub fn next_id(&mut self) -> OrganismId {
        let id = OrganismId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn(
        &mut self,
        position: Coord,
        genome: Genome,
        counts: NeuronCounts,
        energy: f32,
    ) -> OrganismId {
        let id = self.next_id();
        self.members
            .insert(id, Organism::new(id, position, genome, counts, energy));
        id
    }

    /// Inserts an organism built by the caller with an id from
    /// [`Population::next_id`].
    pub fn insert(&mut self, organism: Organism) {
        self.next_id = self.next_id.max(organism.id.0 + 1);
        self.members.insert(organism.id, organism);
    }

    #[must_use]
    pub fn get(&self, id: OrganismId) -> Option<&Organism> {
        self.members.get(&id)
    }

    pub fn get_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.members.get_mut(&id)
    }

    /// Snapshot of current ids in processing order.
    #[must_use]
    pub fn ids(&self) -> Vec<OrganismId> {
        self.members.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Organism> {
        self.members.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Organism> {
        self.members.values_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.members.values().filter(|o| o.is_alive()).count()
    }

    /// Removes dead organisms and returns them in id order.
    pub fn purge_dead(&mut self) -> Vec<Organism> {
        let dead: Vec<OrganismId> = self
            .members
            .iter()
            .filter(|(_, o)| !o.is_alive())
            .map(|(id, _)| *id)
            .collect();
        dead.into_iter()
            .filter_map(|id| self.members.remove(&id))
            .collect()
    }

    /// Empties the population, handing back every member in id order. Ids
    /// keep increasing across generations.
    pub fn take_all(&mut self) -> Vec<Organism> {
        std::mem::take(&mut self.members).into_values().collect()
    }
}
