//! Simulation events consumed by renderers and status displays

use flurry_core::ParticleId;
use serde::{Deserialize, Serialize};

/// Why a particle left the population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Oldest-first eviction after the population exceeded capacity
    Evicted,
    /// Explicit clear of the whole simulation
    Cleared,
}

/// Events emitted by the frame scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A particle was created (already settled when `presettled`)
    Spawned { id: ParticleId, presettled: bool },
    /// A flying particle reached its resting state
    Settled { id: ParticleId },
    /// A particle was destroyed; renderers release its resources
    Removed {
        id: ParticleId,
        reason: RemovalReason,
    },
    /// A spawn request was dropped
    Rejected { kind: String },
    /// The local burst session enqueued its last request
    BurstFinished { enqueued: u32 },
}
