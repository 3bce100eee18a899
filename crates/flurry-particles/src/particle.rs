//! Particle lifecycle: launch planning, flight integration, and settling

use crate::config::{MotionConfig, SettleConfig, SimulationConfig};
use crate::rng::SimRng;
use flurry_core::{ParticleId, Vec2};
use serde::{Deserialize, Serialize};

/// Which appearance a particle currently uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    Flying,
    Settled,
}

/// Initial conditions of a flying particle, computed once at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub spawn: Vec2,
    pub target: Vec2,
    pub velocity: Vec2,
    pub rotation_speed: f32,
}

impl Launch {
    /// Pick a resting position and the launch velocity toward it.
    ///
    /// Horizontal offsets are shaped by `u^3` so samples crowd the middle of
    /// the pile; the vertical position is uniform inside the target band.
    pub fn plan(config: &SimulationConfig, rng: &mut SimRng) -> Self {
        let center_x = config.stage.width * 0.5;
        let spawn = Vec2::new(center_x, config.stage.height);

        let u = rng.signed_unit();
        let [band_lo, band_hi] = config.placement.target_band;
        let target = Vec2::new(
            center_x + u * u * u * config.placement.spread,
            config.stage.height * rng.range(band_lo, band_hi),
        );

        let motion = &config.motion;
        let velocity = Vec2::new(
            (target.x - spawn.x) * motion.pull_factor + rng.centered(motion.velocity_noise),
            -motion.launch_impulse,
        );

        Self {
            spawn,
            target,
            velocity,
            rotation_speed: rng.centered(motion.rotation_speed_range),
        }
    }
}

/// One simulated item
#[derive(Debug, Clone)]
pub struct Particle {
    id: ParticleId,
    kind: String,
    visual: VisualKind,
    position: Vec2,
    velocity: Vec2,
    target: Vec2,
    spawn_deadline: f64,
    depth_key: i32,
    opacity: f32,
    rotation: f32,
    rotation_speed: f32,
}

impl Particle {
    /// A fresh flying particle starting at the launch point, fully transparent
    pub fn flying(id: ParticleId, kind: String, launch: Launch, now: f64, motion: &MotionConfig) -> Self {
        Self {
            id,
            kind,
            visual: VisualKind::Flying,
            position: launch.spawn,
            velocity: launch.velocity,
            target: launch.target,
            spawn_deadline: now + motion.settle_timeout,
            depth_key: launch.spawn.y.floor() as i32,
            opacity: 0.0,
            rotation: 0.0,
            rotation_speed: launch.rotation_speed,
        }
    }

    /// A historical particle placed directly at its resting position
    pub fn presettled(id: ParticleId, kind: String, target: Vec2, now: f64) -> Self {
        Self {
            id,
            kind,
            visual: VisualKind::Settled,
            position: target,
            velocity: Vec2::ZERO,
            target,
            spawn_deadline: now,
            depth_key: target.y.floor() as i32,
            opacity: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn visual(&self) -> VisualKind {
        self.visual
    }

    pub fn is_flying(&self) -> bool {
        self.visual == VisualKind::Flying
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn spawn_deadline(&self) -> f64 {
        self.spawn_deadline
    }

    pub fn depth_key(&self) -> i32 {
        self.depth_key
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Integrate one step of `dt` reference frames at simulation time `now`.
    ///
    /// Returns true when the particle should settle: it is at or below its
    /// resting height, or its deadline has passed.
    pub fn advance(&mut self, dt: f32, now: f64, motion: &MotionConfig) -> bool {
        if self.visual == VisualKind::Settled {
            return false;
        }

        self.velocity.y += motion.gravity * dt;
        self.position += self.velocity * (dt * motion.time_scale);
        self.rotation += self.rotation_speed * dt;
        self.opacity = (self.opacity + motion.fade_in_rate * dt).min(1.0);

        self.position.y >= self.target.y || now >= self.spawn_deadline
    }

    /// Snap to the resting position and switch to the settled appearance.
    /// The new depth key is the resting y plus a small jitter so rows don't tie.
    pub fn settle(&mut self, rng: &mut SimRng, settle: &SettleConfig) {
        self.visual = VisualKind::Settled;
        self.position = self.target;
        self.velocity = Vec2::ZERO;
        self.rotation = rng.centered(settle.rotation_range);
        self.opacity = 1.0;
        self.depth_key = (self.target.y + rng.range(0.0, settle.depth_jitter)).floor() as i32;
    }
}
