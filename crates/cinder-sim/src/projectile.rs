//! Pooled projectiles

use cinder_core::{Rect, Vec2};
use cinder_pool::{Body, Lifecycle, Poolable, VisualHandle};
use cinder_runtime::{FrameContext, TimeSource, Timer};

/// Default projectile sprite is a 16px disc
pub const PROJECTILE_SIZE: f32 = 16.0;

/// Spawn parameters for a [`Projectile`]
#[derive(Debug, Clone)]
pub struct ProjectileSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub drag: f32,
    /// Seconds to live; negative never expires
    pub lifetime: f64,
    pub kill_offscreen: bool,
    pub visual: Option<VisualHandle>,
    pub size: Vec2,
    pub time_source: TimeSource,
    pub bounds: Rect,
}

impl ProjectileSpawn {
    /// A still, immortal projectile that dies once it leaves the screen
    pub fn new(position: Vec2, time_source: TimeSource, bounds: Rect) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            drag: 0.0,
            lifetime: -1.0,
            kill_offscreen: true,
            visual: None,
            size: Vec2::splat(PROJECTILE_SIZE),
            time_source,
            bounds,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2, drag: f32) -> Self {
        self.acceleration = acceleration;
        self.drag = drag;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f64) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_kill_offscreen(mut self, kill_offscreen: bool) -> Self {
        self.kill_offscreen = kill_offscreen;
        self
    }
}

/// A simulated projectile
#[derive(Debug, Default)]
pub struct Projectile {
    pub body: Body,
}

impl Poolable for Projectile {
    type Args = ProjectileSpawn;
    const KIND: &'static str = "projectile";

    fn init(&mut self, spawn: ProjectileSpawn) {
        let body = &mut self.body;
        body.clean();
        body.position = spawn.position;
        body.velocity = spawn.velocity;
        body.acceleration = spawn.acceleration;
        body.drag = spawn.drag;
        body.extent = spawn.size;
        body.z_index = 0;
        body.kill_offscreen = spawn.kill_offscreen;
        body.visual = spawn.visual;
        body.lifetime = Some(Timer::new(spawn.lifetime, spawn.time_source));
        body.mark_spawned(&spawn.bounds);
    }

    fn clean(&mut self) {
        self.body.clean();
    }

    fn update(&mut self, frame: &FrameContext) -> Lifecycle {
        if self.body.lifetime_over() {
            return Lifecycle::Kill;
        }
        self.body.integrate(frame.dt);
        if self.body.offscreen_kill(&frame.bounds) {
            return Lifecycle::Kill;
        }
        Lifecycle::Alive
    }

    fn z_index(&self) -> i32 {
        self.body.z_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_pool::EntityPool;
    use cinder_runtime::ManualClock;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 960.0, 540.0);

    #[test]
    fn flies_off_screen_and_dies() {
        let clock = ManualClock::new();
        let mut pool = EntityPool::<Projectile>::new(4);
        let spawn = ProjectileSpawn::new(Vec2::new(900.0, 270.0), clock.source(), SCREEN)
            .with_velocity(Vec2::new(100.0, 0.0));
        let handle = pool.spawn(spawn).unwrap();

        let frame = FrameContext::new(0.1, SCREEN);
        for _ in 0..6 {
            pool.update_all(&frame);
            pool.flush_kills();
        }
        assert!(pool.is_active(handle));

        for _ in 0..5 {
            pool.update_all(&frame);
            pool.flush_kills();
        }
        assert!(!pool.is_active(handle));
    }

    #[test]
    fn lifetime_expires() {
        let clock = ManualClock::new();
        let mut pool = EntityPool::<Projectile>::new(1);
        let spawn = ProjectileSpawn::new(Vec2::new(100.0, 100.0), clock.source(), SCREEN)
            .with_lifetime(1.0);
        let handle = pool.spawn(spawn).unwrap();

        let frame = FrameContext::new(0.0, SCREEN);
        clock.set(0.99);
        pool.update_all(&frame);
        pool.flush_kills();
        assert!(pool.is_active(handle));

        clock.set(1.0);
        pool.update_all(&frame);
        pool.flush_kills();
        assert!(!pool.is_active(handle));
    }

    #[test]
    fn spawned_outside_is_kept_until_lifetime() {
        let clock = ManualClock::new();
        let mut pool = EntityPool::<Projectile>::new(1);
        let spawn = ProjectileSpawn::new(Vec2::new(-200.0, 270.0), clock.source(), SCREEN)
            .with_velocity(Vec2::new(-50.0, 0.0))
            .with_lifetime(3.0);
        let handle = pool.spawn(spawn).unwrap();
        assert!(!pool.get(handle).unwrap().body.was_onscreen());

        let frame = FrameContext::new(0.5, SCREEN);
        for step in 1..6 {
            clock.set(step as f64 * 0.5);
            pool.update_all(&frame);
            pool.flush_kills();
            assert!(pool.is_active(handle));
        }
        clock.set(3.0);
        pool.update_all(&frame);
        pool.flush_kills();
        assert!(!pool.is_active(handle));
    }

    #[test]
    fn clean_instance_has_no_timer() {
        let clock = ManualClock::new();
        let mut projectile = Projectile::default();
        projectile.init(ProjectileSpawn::new(Vec2::ONE, clock.source(), SCREEN));
        assert!(projectile.body.lifetime.is_some());
        projectile.clean();
        assert!(projectile.body.lifetime.is_none());
    }
}
