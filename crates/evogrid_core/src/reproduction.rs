//! In-tick reproduction: mutated clones and mate pairing.

use crate::brain::GenomeLogic;
use evogrid_data::{Genome, OrganismId};
use rand::Rng;
use std::collections::VecDeque;

/// Bounded queue of organisms waiting for a mate, drained two at a time.
#[derive(Debug, Clone)]
pub struct PairingQueue {
    waiting: VecDeque<OrganismId>,
    capacity: usize,
}

impl PairingQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            waiting: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Enqueues `id`. Returns `false` when the queue is full or `id` is
    /// already waiting.
    pub fn enqueue(&mut self, id: OrganismId) -> bool {
        if self.waiting.len() >= self.capacity || self.waiting.contains(&id) {
            return false;
        }
        self.waiting.push_back(id);
        true
    }

    /// Pops the two oldest waiting organisms that still satisfy `eligible`.
    /// Ineligible entries met on the way are discarded. A lone eligible
    /// organism goes back to the front of the queue.
    pub fn pop_pair<F>(&mut self, mut eligible: F) -> Option<(OrganismId, OrganismId)>
    where
        F: FnMut(OrganismId) -> bool,
    {
        let first = self.pop_eligible(&mut eligible)?;
        match self.pop_eligible(&mut eligible) {
            Some(second) => Some((first, second)),
            None => {
                self.waiting.push_front(first);
                None
            }
        }
    }

    fn pop_eligible<F>(&mut self, eligible: &mut F) -> Option<OrganismId>
    where
        F: FnMut(OrganismId) -> bool,
    {
        while let Some(id) = self.waiting.pop_front() {
            if eligible(id) {
                return Some(id);
            }
        }
        None
    }

    #[must_use]
    pub fn contains(&self, id: OrganismId) -> bool {
        self.waiting.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn clear(&mut self) {
        self.waiting.clear();
    }
}

/// A mutated copy of the parent's genome.
pub fn asexual_offspring<R: Rng>(parent: &Genome, p_mutation: f32, rng: &mut R) -> Genome {
    let mut child = parent.clone();
    child.mutate_with_rng(p_mutation, rng);
    child
}

/// Splices two parents at a random cut and mutates both children.
pub fn sexual_offspring<R: Rng>(
    a: &Genome,
    b: &Genome,
    p_mutation: f32,
    rng: &mut R,
) -> (Genome, Genome) {
    let len = a.len().min(b.len());
    let cut = if len == 0 { 0 } else { rng.gen_range(0..=len) };
    let (mut left, mut right) = a.splice(b, cut);
    left.mutate_with_rng(p_mutation, rng);
    right.mutate_with_rng(p_mutation, rng);
    (left, right)
}
