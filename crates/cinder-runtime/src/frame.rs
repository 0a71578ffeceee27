//! Per-tick context handed to pooled entity updates

use cinder_core::Rect;

/// Everything an entity needs to advance one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Frame delta in seconds
    pub dt: f32,
    /// Visible screen bounds for the offscreen policy
    pub bounds: Rect,
}

impl FrameContext {
    pub fn new(dt: f32, bounds: Rect) -> Self {
        Self { dt, bounds }
    }
}
