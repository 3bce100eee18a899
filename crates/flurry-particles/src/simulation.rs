//! Frame scheduler: owns all simulation state and runs one tick at a time

use crate::burst::{BurstDriver, BurstProgress};
use crate::config::SimulationConfig;
use crate::depth::DepthOrderer;
use crate::particle::Particle;
use crate::population::Population;
use crate::queue::{SpawnProducer, SpawnQueue, SpawnRequest};
use crate::render::{ParticleView, SpriteInstance};
use crate::rng::SimRng;
use flurry_core::{ParticleId, Result};
use flurry_runtime::{FrameClock, RemovalReason, RuntimeSystem, SimEvent};
use serde::Serialize;

/// Running totals for status displays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub ticks: u64,
    pub spawned: u64,
    pub settled: u64,
    pub evicted: u64,
    pub rejected: u64,
    pub count: usize,
    pub capacity: usize,
    /// Requests still waiting in the spawn queue
    pub pending: usize,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub spawned: usize,
    pub rejected: usize,
    pub settled: usize,
    pub evicted: usize,
    /// The queue still holds requests for a later tick
    pub pending_continuation: bool,
}

/// The whole simulation: spawn queue, population, depth order, and the
/// optional local burst session.
///
/// `tick` runs, strictly in this order: burst timer, one bounded drain of
/// the spawn queue, physics for every live particle, capacity eviction, then
/// depth re-sort and counters.
pub struct Simulation {
    config: SimulationConfig,
    clock: FrameClock,
    queue: SpawnQueue,
    population: Population,
    depth: DepthOrderer,
    rng: SimRng,
    burst: Option<BurstDriver>,
    /// Emitted since the last `drain_events`
    events: Vec<SimEvent>,
    stats: SimStats,
    pending_continuation: bool,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let capacity = config.population.capacity;
        Ok(Self {
            rng: SimRng::from_seed_option(config.seed),
            clock: FrameClock::new(),
            queue: SpawnQueue::new(),
            population: Population::new(capacity),
            depth: DepthOrderer::new(),
            burst: None,
            events: Vec::new(),
            stats: SimStats {
                capacity,
                ..Default::default()
            },
            pending_continuation: false,
            config,
        })
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f64) -> TickReport {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring invalid frame delta {dt}");
        }
        let dt = self.clock.advance(dt);
        let now = self.clock.total_time;
        let frames = (dt * self.config.motion.reference_fps) as f32;
        let mut report = TickReport::default();

        self.fire_burst(dt);

        // Drain one bounded batch
        if self.pending_continuation || !self.queue.is_empty() {
            for request in self.queue.drain(self.config.population.batch_size) {
                match self
                    .population
                    .spawn(&request, now, &self.config, &mut self.rng)
                {
                    Ok(id) => {
                        self.depth.insert(id);
                        if request.presettled {
                            self.depth.mark_dirty();
                        }
                        self.events.push(SimEvent::Spawned {
                            id,
                            presettled: request.presettled,
                        });
                        report.spawned += 1;
                    }
                    Err(e) => {
                        log::warn!("dropping spawn request: {e}");
                        self.events.push(SimEvent::Rejected { kind: request.kind });
                        report.rejected += 1;
                    }
                }
            }
            self.pending_continuation = !self.queue.is_empty();
            log::debug!(
                "spawned {} ({} rejected), {} still queued",
                report.spawned,
                report.rejected,
                self.queue.len()
            );
        }

        // Advance every live particle
        for particle in self.population.iter_mut() {
            if particle.advance(frames, now, &self.config.motion) {
                particle.settle(&mut self.rng, &self.config.settle);
                self.events.push(SimEvent::Settled { id: particle.id() });
                report.settled += 1;
            }
        }
        if report.settled > 0 {
            self.depth.mark_dirty();
        }

        // Oldest-first eviction
        let evicted = self.population.enforce_capacity();
        if !evicted.is_empty() {
            self.depth.remove(&evicted);
            for id in &evicted {
                self.events.push(SimEvent::Removed {
                    id: *id,
                    reason: RemovalReason::Evicted,
                });
            }
            report.evicted = evicted.len();
        }

        self.depth.resort(&self.population);

        self.stats.ticks += 1;
        self.stats.spawned += report.spawned as u64;
        self.stats.rejected += report.rejected as u64;
        self.stats.settled += report.settled as u64;
        self.stats.evicted += report.evicted as u64;
        self.stats.count = self.population.count();
        self.stats.pending = self.queue.len();

        report.pending_continuation = self.pending_continuation;
        report
    }

    fn fire_burst(&mut self, dt: f64) {
        let Some(burst) = self.burst.as_mut() else {
            return;
        };
        if let BurstProgress::Finished { enqueued } =
            burst.advance(dt, &self.config.appearance.kinds, &mut self.rng)
        {
            log::info!("burst session finished after {enqueued} request(s)");
            self.events.push(SimEvent::BurstFinished { enqueued });
            self.burst = None;
        }
    }

    /// Start the local burst session. No-op (returns false) while one is running.
    pub fn start_burst(&mut self) -> bool {
        if self.burst.is_some() {
            return false;
        }
        let driver = BurstDriver::new(self.queue.session_producer(), &self.config.burst);
        log::info!(
            "burst session started: {} request(s), {} every {}s",
            self.config.burst.total,
            driver.per_fire(),
            self.config.burst.interval
        );
        self.burst = Some(driver);
        true
    }

    /// Cancel the burst session, keeping particles and queued requests
    pub fn stop(&mut self) -> bool {
        let stopped = self.burst.take().is_some();
        if stopped {
            log::info!("burst session stopped");
        }
        stopped
    }

    /// Remove every particle, empty the spawn queue, and cancel the burst session
    pub fn clear(&mut self) {
        self.burst = None;
        let dropped = self.queue.clear();
        self.pending_continuation = false;

        let removed = self.population.clear();
        self.depth.clear();
        for id in &removed {
            self.events.push(SimEvent::Removed {
                id: *id,
                reason: RemovalReason::Cleared,
            });
        }

        self.stats = SimStats {
            ticks: self.stats.ticks,
            capacity: self.population.capacity(),
            ..Default::default()
        };
        log::info!(
            "cleared {} particle(s) and {} queued request(s)",
            removed.len(),
            dropped
        );
    }

    /// Enqueue a request from the owning thread
    pub fn enqueue(&self, request: SpawnRequest) {
        self.queue.enqueue(request);
    }

    /// Producer handle for feeds running on other threads
    pub fn producer(&self) -> SpawnProducer {
        self.queue.producer()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulation time in seconds
    pub fn now(&self) -> f64 {
        self.clock.total_time
    }

    pub fn count(&self) -> usize {
        self.population.count()
    }

    pub fn capacity(&self) -> usize {
        self.population.capacity()
    }

    pub fn settled_count(&self) -> usize {
        self.population.settled_count()
    }

    /// "count/capacity"
    pub fn status_line(&self) -> String {
        format!("{}/{}", self.count(), self.capacity())
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_continuation
    }

    pub fn is_bursting(&self) -> bool {
        self.burst.is_some()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.population.get(id)
    }

    /// Particles in creation order (oldest first)
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.population.iter()
    }

    /// Ids back-to-front
    pub fn render_order(&self) -> &[ParticleId] {
        self.depth.order()
    }

    /// Render views back-to-front
    pub fn views(&self) -> impl Iterator<Item = ParticleView<'_>> + '_ {
        let emblem = self.config.appearance.emblem.as_str();
        self.depth
            .order()
            .iter()
            .filter_map(move |id| self.population.get(*id))
            .map(move |p| ParticleView::new(p, emblem))
    }

    /// Pack render views back-to-front into `out` (cleared first)
    pub fn pack_instances(&self, out: &mut Vec<SpriteInstance>) {
        out.clear();
        out.extend(self.views().map(|v| SpriteInstance::from_view(&v)));
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

impl RuntimeSystem for Simulation {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "simulation ready: capacity {}, batch {}, {} kind(s)",
            self.config.population.capacity,
            self.config.population.batch_size,
            self.config.appearance.kinds.len()
        );
        Ok(())
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        self.tick(dt);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.stop();
        Ok(())
    }

    fn name(&self) -> &str {
        "flurry"
    }
}
