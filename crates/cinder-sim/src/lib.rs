//! Cinder Sim - Headless simulation world
//!
//! Wires the runtime pieces into one frame loop:
//! - `SimConfig` - bounds, pool capacities, seed and effect templates (TOML)
//! - `Projectile` - pooled, simulated projectile entity
//! - `RadialSweep` - built-in attack pattern firing projectiles in a circle
//! - `SimWorld` - owns clocks, pools, particles and scripts; `tick(dt)` advances them in order

mod config;
mod patterns;
mod projectile;
mod world;

pub use config::{PoolConfig, SimConfig};
pub use patterns::{PatternOutcome, RadialSweep, SweepSettings};
pub use projectile::{Projectile, ProjectileSpawn, PROJECTILE_SIZE};
pub use world::{SimWorld, TickReport};
