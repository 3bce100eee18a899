//! Runtime system trait

use flurry_core::Result;

/// A system that can be ticked by the frame loop
///
/// Systems are updated in registration order, once per frame, with the
/// elapsed frame time passed in explicitly.
pub trait RuntimeSystem {
    /// Called once before the first frame
    fn initialize(&mut self) -> Result<()>;

    /// Called once per frame with the elapsed time in seconds
    fn update(&mut self, dt: f64) -> Result<()>;

    /// Called when the frame loop is shutting down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
