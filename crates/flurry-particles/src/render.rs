//! Render-facing views: appearance lookup and GPU instance packing

use crate::particle::{Particle, VisualKind};
use bytemuck::{Pod, Zeroable};
use flurry_core::{ParticleId, Vec2};

/// Sprite scale applied to every glyph
pub const GLYPH_SCALE: f32 = 0.3;

/// What to draw for a particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderDescriptor<'a> {
    pub glyph: &'a str,
    pub scale: f32,
}

/// Flying particles show their own kind; settled ones all show the emblem.
pub fn appearance_for<'a>(visual: VisualKind, kind: &'a str, emblem: &'a str) -> RenderDescriptor<'a> {
    let glyph = match visual {
        VisualKind::Flying => kind,
        VisualKind::Settled => emblem,
    };
    RenderDescriptor {
        glyph,
        scale: GLYPH_SCALE,
    }
}

/// Everything a renderer needs to draw one particle
#[derive(Debug, Clone, Copy)]
pub struct ParticleView<'a> {
    pub id: ParticleId,
    pub position: Vec2,
    pub rotation: f32,
    pub opacity: f32,
    pub visual: VisualKind,
    pub depth_key: i32,
    pub appearance: RenderDescriptor<'a>,
}

impl<'a> ParticleView<'a> {
    pub fn new(particle: &'a Particle, emblem: &'a str) -> Self {
        Self {
            id: particle.id(),
            position: particle.position(),
            rotation: particle.rotation(),
            opacity: particle.opacity(),
            visual: particle.visual(),
            depth_key: particle.depth_key(),
            appearance: appearance_for(particle.visual(), particle.kind(), emblem),
        }
    }
}

/// GPU instance data for one sprite.
/// 32 bytes, 4-byte aligned (2 rows of vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteInstance {
    /// xy = position, z = rotation, w = opacity
    pub pos_rot_alpha: [f32; 4],
    /// x = depth key, y = settled flag, z = scale, w = unused
    pub depth_state: [f32; 4],
}

impl SpriteInstance {
    pub fn from_view(view: &ParticleView<'_>) -> Self {
        let settled = match view.visual {
            VisualKind::Flying => 0.0,
            VisualKind::Settled => 1.0,
        };
        Self {
            pos_rot_alpha: [view.position.x, view.position.y, view.rotation, view.opacity],
            depth_state: [view.depth_key as f32, settled, view.appearance.scale, 0.0],
        }
    }
}
