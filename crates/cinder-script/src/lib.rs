//! Cinder Script - Resumable behavior scripts
//!
//! A behavior is written as an explicit state machine (`ScriptBody`) that
//! suspends once per frame. `AttackPattern` wraps a body and enforces the
//! lifecycle: initialize once, resume until complete, never resume after.
//! Selected internals can be read back by name for debug overlays.

mod pattern;

pub use pattern::{AttackPattern, ExposedValue, Resume, RunningScript, ScriptBody};
