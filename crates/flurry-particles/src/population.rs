//! Insertion-ordered particle population with oldest-first eviction

use crate::config::SimulationConfig;
use crate::particle::{Launch, Particle, VisualKind};
use crate::queue::SpawnRequest;
use crate::rng::SimRng;
use flurry_core::{FlurryError, IdAllocator, ParticleId, Result};
use std::collections::VecDeque;

/// Owns every live particle. Front of the deque is the oldest particle,
/// which is also the next one to be evicted.
pub struct Population {
    particles: VecDeque<Particle>,
    ids: IdAllocator,
    capacity: usize,
}

impl Population {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(capacity + 1),
            ids: IdAllocator::new(),
            capacity,
        }
    }

    /// Build a particle for `request` and append it.
    /// Fails without side effects when the kind is not configured.
    pub fn spawn(
        &mut self,
        request: &SpawnRequest,
        now: f64,
        config: &SimulationConfig,
        rng: &mut SimRng,
    ) -> Result<ParticleId> {
        let launch = Launch::plan(config, rng);
        self.spawn_with(request, launch, now, config)
    }

    /// Like [`Population::spawn`] but with caller-chosen initial conditions
    pub fn spawn_with(
        &mut self,
        request: &SpawnRequest,
        launch: Launch,
        now: f64,
        config: &SimulationConfig,
    ) -> Result<ParticleId> {
        if !config.appearance.is_known(&request.kind) {
            return Err(FlurryError::UnknownKind(request.kind.clone()));
        }

        let id = self.ids.next_id();
        let particle = if request.presettled {
            Particle::presettled(id, request.kind.clone(), launch.target, now)
        } else {
            Particle::flying(id, request.kind.clone(), launch, now, &config.motion)
        };
        self.particles.push_back(particle);
        Ok(id)
    }

    /// Evict from the front until the population fits. Returns evicted ids, oldest first.
    pub fn enforce_capacity(&mut self) -> Vec<ParticleId> {
        let excess = self.particles.len().saturating_sub(self.capacity);
        self.particles.drain(..excess).map(|p| p.id()).collect()
    }

    /// Remove everything and restart id numbering. Returns removed ids, oldest first.
    pub fn clear(&mut self) -> Vec<ParticleId> {
        let removed = self.particles.drain(..).map(|p| p.id()).collect();
        self.ids.reset();
        removed
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn settled_count(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.visual() == VisualKind::Settled)
            .count()
    }

    /// Look up a live particle. Ids grow with insertion order, so the deque is sorted by id.
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles
            .binary_search_by_key(&id, |p| p.id())
            .ok()
            .map(|idx| &self.particles[idx])
    }

    /// Particles in insertion (creation) order
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_n(pop: &mut Population, n: usize, rng: &mut SimRng) -> Vec<ParticleId> {
        let config = SimulationConfig::default();
        (0..n)
            .map(|_| pop.spawn(&SpawnRequest::live("🔥"), 0.0, &config, rng).unwrap())
            .collect()
    }

    #[test]
    fn spawn_appends_in_order() {
        let mut pop = Population::new(10);
        let mut rng = SimRng::new(1);
        let ids = spawn_n(&mut pop, 3, &mut rng);
        let order: Vec<_> = pop.iter().map(|p| p.id()).collect();
        assert_eq!(order, ids);
        assert_eq!(pop.count(), 3);
        assert!(pop.get(ids[1]).is_some());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut pop = Population::new(10);
        let mut rng = SimRng::new(1);
        let config = SimulationConfig::default();
        let err = pop
            .spawn(&SpawnRequest::live("🦀"), 0.0, &config, &mut rng)
            .unwrap_err();
        assert!(matches!(err, FlurryError::UnknownKind(k) if k == "🦀"));
        assert!(pop.is_empty());
    }

    #[test]
    fn historical_requests_spawn_settled() {
        let mut pop = Population::new(10);
        let mut rng = SimRng::new(1);
        let config = SimulationConfig::default();
        let id = pop
            .spawn(&SpawnRequest::historical("✨"), 0.0, &config, &mut rng)
            .unwrap();
        let p = pop.get(id).unwrap();
        assert_eq!(p.visual(), VisualKind::Settled);
        assert_eq!(p.position(), p.target());
        assert_eq!(pop.settled_count(), 1);
    }

    #[test]
    fn eviction_is_fifo() {
        let mut pop = Population::new(3);
        let mut rng = SimRng::new(2);
        let ids = spawn_n(&mut pop, 5, &mut rng);

        let evicted = pop.enforce_capacity();
        assert_eq!(evicted, vec![ids[0], ids[1]]);
        assert_eq!(pop.count(), 3);
        assert!(pop.get(ids[0]).is_none());
        assert!(pop.get(ids[2]).is_some());

        assert!(pop.enforce_capacity().is_empty());
    }

    #[test]
    fn clear_resets_ids() {
        let mut pop = Population::new(3);
        let mut rng = SimRng::new(2);
        let ids = spawn_n(&mut pop, 2, &mut rng);
        assert_eq!(pop.clear(), ids);
        assert_eq!(pop.count(), 0);

        let again = spawn_n(&mut pop, 1, &mut rng);
        assert_eq!(again[0], ParticleId(1));
    }
}
