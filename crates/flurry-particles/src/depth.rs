//! Back-to-front draw order keyed on particle depth

use crate::population::Population;
use flurry_core::ParticleId;
use std::collections::HashSet;

/// Particle ids in draw order: later entries render in front.
///
/// Holds ids only; the population owns the particles. New particles are
/// appended on top until the next re-sort, which runs only after something
/// settles.
#[derive(Default)]
pub struct DepthOrderer {
    order: Vec<ParticleId>,
    dirty: bool,
    sorts: u64,
}

impl DepthOrderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a newly spawned particle on top
    pub fn insert(&mut self, id: ParticleId) {
        self.order.push(id);
    }

    pub fn remove(&mut self, ids: &[ParticleId]) {
        if ids.is_empty() {
            return;
        }
        let gone: HashSet<ParticleId> = ids.iter().copied().collect();
        self.order.retain(|id| !gone.contains(id));
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.dirty = false;
    }

    /// Request a re-sort before the next frame is drawn
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of re-sorts performed so far
    pub fn sort_count(&self) -> u64 {
        self.sorts
    }

    /// Rebuild the order from the population if a re-sort was requested.
    /// Stable on depth key, so equal keys stay in insertion order.
    pub fn resort(&mut self, population: &Population) -> bool {
        if !self.dirty {
            return false;
        }
        let mut keyed: Vec<(i32, ParticleId)> =
            population.iter().map(|p| (p.depth_key(), p.id())).collect();
        keyed.sort_by_key(|(key, _)| *key);

        self.order.clear();
        self.order.extend(keyed.into_iter().map(|(_, id)| id));
        self.dirty = false;
        self.sorts += 1;
        true
    }

    /// Ids back-to-front
    pub fn order(&self) -> &[ParticleId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::particle::Launch;
    use crate::queue::SpawnRequest;
    use crate::rng::SimRng;
    use flurry_core::Vec2;

    fn populated(n: usize) -> (Population, DepthOrderer) {
        let config = SimulationConfig::default();
        let mut rng = SimRng::new(11);
        let mut pop = Population::new(100);
        let mut depth = DepthOrderer::new();
        for _ in 0..n {
            let id = pop
                .spawn(&SpawnRequest::historical("⭐️"), 0.0, &config, &mut rng)
                .unwrap();
            depth.insert(id);
        }
        (pop, depth)
    }

    #[test]
    fn resort_is_lazy() {
        let (pop, mut depth) = populated(5);
        assert!(!depth.resort(&pop));
        assert_eq!(depth.sort_count(), 0);

        depth.mark_dirty();
        assert!(depth.resort(&pop));
        assert!(!depth.is_dirty());
        assert_eq!(depth.sort_count(), 1);
    }

    #[test]
    fn resort_orders_by_depth_key() {
        let (pop, mut depth) = populated(50);
        depth.mark_dirty();
        depth.resort(&pop);

        let keys: Vec<i32> = depth
            .order()
            .iter()
            .map(|id| pop.get(*id).unwrap().depth_key())
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(depth.len(), 50);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let (pop, mut depth) = populated(200);
        depth.mark_dirty();
        depth.resort(&pop);

        for pair in depth.order().windows(2) {
            let a = pop.get(pair[0]).unwrap();
            let b = pop.get(pair[1]).unwrap();
            if a.depth_key() == b.depth_key() {
                assert!(a.id() < b.id());
            }
        }
    }

    #[test]
    fn settled_particles_order_by_resting_height() {
        let config = SimulationConfig::default();
        let mut rng = SimRng::new(21);
        let mut pop = Population::new(10);
        let mut depth = DepthOrderer::new();

        let mut ids = Vec::new();
        for y in [10.0, 50.0, 30.0] {
            let launch = Launch {
                spawn: Vec2::new(640.0, 720.0),
                target: Vec2::new(640.0, y),
                velocity: Vec2::new(0.0, -25.0),
                rotation_speed: 0.0,
            };
            let id = pop
                .spawn_with(&SpawnRequest::live("🔥"), launch, 0.0, &config)
                .unwrap();
            depth.insert(id);
            ids.push(id);
        }

        let mut now = 0.0;
        while pop.settled_count() < 3 {
            now += 0.25;
            for p in pop.iter_mut() {
                if p.advance(15.0, now, &config.motion) {
                    p.settle(&mut rng, &config.settle);
                    depth.mark_dirty();
                }
            }
            assert!(now < 10.0, "particles never settled");
        }
        depth.resort(&pop);

        assert_eq!(depth.order(), &[ids[0], ids[2], ids[1]]);
    }

    #[test]
    fn remove_drops_ids() {
        let (pop, mut depth) = populated(4);
        let ids: Vec<_> = pop.iter().map(|p| p.id()).collect();
        depth.remove(&ids[..2]);
        assert_eq!(depth.order(), &ids[2..]);
        depth.clear();
        assert!(depth.is_empty());
    }
}
