//! Cinder Physics - Per-frame motion integration
//!
//! Two pure integration schemes, both applying drag and acceleration in a
//! symmetric half-step split around the position update:
//! - `integrate_simulated` - Cartesian motion
//! - `integrate_spiral` - polar motion of an offset around a pivot

mod integrate;

pub use integrate::{drag_factor, integrate_simulated, integrate_spiral, Kinematics, SpiralState};
