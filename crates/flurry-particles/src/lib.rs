//! Flurry Particles - burst-spawned settling particle simulation
//!
//! Provides a bounded population of particles that:
//! - arrive through a thread-safe spawn queue, drained in fixed-size batches
//! - fly toward a randomized resting spot under gravity, then settle
//! - are evicted oldest-first once the population exceeds its capacity
//! - render back-to-front by depth, packed into GPU-ready instances

pub mod burst;
pub mod config;
pub mod depth;
pub mod feed;
pub mod particle;
pub mod population;
pub mod queue;
pub mod render;
pub mod rng;
pub mod simulation;

pub use burst::{BurstDriver, BurstProgress};
pub use config::SimulationConfig;
pub use depth::DepthOrderer;
pub use feed::{FeedDocument, LiveEvent, ReplayFeed};
pub use particle::{Launch, Particle, VisualKind};
pub use population::Population;
pub use queue::{SpawnProducer, SpawnQueue, SpawnRequest};
pub use render::{appearance_for, ParticleView, RenderDescriptor, SpriteInstance};
pub use rng::SimRng;
pub use simulation::{SimStats, Simulation, TickReport};
