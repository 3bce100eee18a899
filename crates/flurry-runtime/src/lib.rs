//! Flurry Runtime - Frame loop infrastructure
//!
//! Provides the building blocks the simulation is driven by:
//! - `FrameClock` — wall-clock or injected frame timing with a frame-time clamp
//! - `SimEvent` — typed events drained by renderers and UI
//! - `RuntimeSystem` — trait for systems ticked by the frame loop

mod clock;
mod event;
mod system;

pub use clock::FrameClock;
pub use event::{RemovalReason, SimEvent};
pub use system::RuntimeSystem;
