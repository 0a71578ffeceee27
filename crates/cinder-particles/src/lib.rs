//! Cinder Particles - Template-driven particle emission
//!
//! Provides pooled particle effects with:
//! - TOML effect templates with scalar-or-interval ranges, validated on load
//! - Tracks that emit waves on a cooldown, carrying overshoot between waves
//! - Simulated, spiral and animated particle motion
//! - Deferred effect destruction (mark during update, remove in `sweep`)

pub mod effect;
pub mod library;
pub mod particle;
pub mod rand;
pub mod system;
pub mod template;

pub use effect::{EmitContext, ParticleEffect, ParticleEffectTrack, TrackId};
pub use library::EffectLibrary;
pub use particle::{Particle, ParticleSpawn, SpriteBinding, PARTICLE_Z_INDEX};
pub use system::{EffectId, ParticleSystem};
pub use template::{AnimationSpec, EffectTemplate, NumberRange, UpdateMethod};
