//! Cinder Runtime - Time keeping for the simulation loop
//!
//! Provides the building blocks every timed component draws from:
//! - `TimeSource` - injected "current seconds" function
//! - `ManualClock` - hand-driven source for tests and headless hosts
//! - `FrameClock` - host frame clock accumulating frame deltas, optionally capped
//! - `GameClock` - pausable game time shared by particles, projectiles and scripts
//! - `Timer` - pausable, rescalable elapsed-time measurement with an optional duration
//! - `FrameContext` - per-tick data handed to pooled entity updates

mod clock;
mod frame;
mod source;
mod timer;

pub use clock::{FrameClock, GameClock};
pub use frame::FrameContext;
pub use source::{ManualClock, TimeSource};
pub use timer::Timer;
