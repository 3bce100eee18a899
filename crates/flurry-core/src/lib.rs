//! Flurry Core - Foundational types for the Flurry simulation
//!
//! This crate provides the core types that all other Flurry crates depend on:
//! - `ParticleId` - Opaque particle handles
//! - `Vec2` - Screen-space vector type
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{FlurryError, Result};
pub use id::{IdAllocator, ParticleId};
pub use types::Vec2;
