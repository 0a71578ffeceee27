//! State shared by projectile-like pooled entities

use cinder_core::{Rect, Vec2};
use cinder_physics::{integrate_simulated, Kinematics};
use cinder_runtime::Timer;

/// Opaque reference to a host-side sprite or surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u32);

/// Motion, lifetime and visibility state of one pooled entity.
///
/// `Body::default()` is the null state a cleaned instance returns to.
#[derive(Clone, Debug, Default)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Damping coefficient in [0, 1)
    pub drag: f32,
    /// Size of the bounding box used for the onscreen test
    pub extent: Vec2,
    pub z_index: i32,
    pub kill_offscreen: bool,
    /// `None` on a cleaned instance
    pub lifetime: Option<Timer>,
    pub visual: Option<VisualHandle>,
    was_onscreen: bool,
}

impl Body {
    /// Bounding box centered on the current position
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.extent)
    }

    /// Record the spawn-time visibility. Must run once after the spawn
    /// position is set, before the first update.
    pub fn mark_spawned(&mut self, bounds: &Rect) {
        self.was_onscreen = self.rect().intersects(bounds);
    }

    pub fn was_onscreen(&self) -> bool {
        self.was_onscreen
    }

    /// Apply the offscreen policy for this frame; true means kill.
    ///
    /// Entering the bounds latches `was_onscreen`. A kill needs the policy
    /// enabled, the entity outside the bounds now, and the latch set, so an
    /// entity that never entered the screen is never killed here.
    pub fn offscreen_kill(&mut self, bounds: &Rect) -> bool {
        if self.rect().intersects(bounds) {
            self.was_onscreen = true;
            return false;
        }
        self.kill_offscreen && self.was_onscreen
    }

    pub fn lifetime_over(&self) -> bool {
        self.lifetime.as_ref().is_some_and(Timer::is_over)
    }

    pub fn kinematics(&self) -> Kinematics {
        Kinematics {
            position: self.position,
            velocity: self.velocity,
            acceleration: self.acceleration,
            drag: self.drag,
        }
    }

    /// One Cartesian integration step
    pub fn integrate(&mut self, dt: f32) {
        let next = integrate_simulated(self.kinematics(), dt);
        self.position = next.position;
        self.velocity = next.velocity;
    }

    pub fn clean(&mut self) {
        *self = Body::default();
    }
}
