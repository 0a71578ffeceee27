//! Cinder Core - Foundational types for the Cinder simulation core
//!
//! This crate provides the types every other Cinder crate depends on:
//! - `Rect` - Axis-aligned screen bounds used by the offscreen policy
//! - `Vec2` - 2D vector (re-exported from glam)
//! - Degree-based angle helpers (screen space, y pointing down)
//! - Error types and Result alias

mod error;
mod types;

pub use error::{CinderError, Result};
pub use glam::Vec2;
pub use types::{lerp, rotate_deg, vec_from_angle, Rect};
