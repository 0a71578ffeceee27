//! The pooled particle entity

use crate::template::{AnimationSpec, UpdateMethod};
use cinder_core::{rotate_deg, vec_from_angle, Rect, Vec2};
use cinder_physics::{integrate_spiral, SpiralState};
use cinder_pool::{Body, Lifecycle, Poolable, VisualHandle};
use cinder_runtime::{FrameContext, TimeSource, Timer};
use std::rc::Rc;

/// Particles draw above projectiles
pub const PARTICLE_Z_INDEX: i32 = 100;

/// How a particle refers to its visuals
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteBinding {
    /// Points at the template's visuals
    Shared {
        main: VisualHandle,
        alts: Rc<[VisualHandle]>,
    },
    /// Owns a private copy the host may mutate per particle
    Copied {
        main: VisualHandle,
        alts: Vec<VisualHandle>,
    },
}

impl SpriteBinding {
    pub fn main(&self) -> VisualHandle {
        match self {
            SpriteBinding::Shared { main, .. } | SpriteBinding::Copied { main, .. } => *main,
        }
    }

    pub fn alts(&self) -> &[VisualHandle] {
        match self {
            SpriteBinding::Shared { alts, .. } => alts,
            SpriteBinding::Copied { alts, .. } => alts,
        }
    }

    /// Mutable visuals, only for copied bindings
    pub fn alts_mut(&mut self) -> Option<&mut Vec<VisualHandle>> {
        match self {
            SpriteBinding::Shared { .. } => None,
            SpriteBinding::Copied { alts, .. } => Some(alts),
        }
    }
}

/// Everything resolved from a template for one emission
#[derive(Debug, Clone)]
pub struct ParticleSpawn {
    pub position: Vec2,
    pub lifetime: f64,
    pub method: UpdateMethod,
    /// Cartesian velocity, if the template declares one
    pub velocity: Option<Vec2>,
    /// Polar direction in degrees
    pub angle: Option<f32>,
    /// Polar magnitude; radius for spiral particles
    pub speed: Option<f32>,
    pub acceleration: Vec2,
    pub drag: f32,
    pub size: Vec2,
    pub kill_offscreen: bool,
    pub sprite: SpriteBinding,
    pub animation: Option<Rc<AnimationSpec>>,
    pub time_source: TimeSource,
    pub bounds: Rect,
}

#[derive(Debug, Clone)]
struct AnimationPlayer {
    spec: Rc<AnimationSpec>,
    clock: Timer,
}

impl AnimationPlayer {
    fn current(&self) -> Option<VisualHandle> {
        self.spec.frame_at(self.clock.get_time())
    }
}

/// A pooled particle: a [`Body`] plus its update method and visuals
#[derive(Debug, Default)]
pub struct Particle {
    pub body: Body,
    method: UpdateMethod,
    /// Pivot and offset for spiral particles
    spiral: Option<SpiralState>,
    sprite: Option<SpriteBinding>,
    animation: Option<AnimationPlayer>,
}

impl Particle {
    pub fn method(&self) -> UpdateMethod {
        self.method
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn sprite(&self) -> Option<&SpriteBinding> {
        self.sprite.as_ref()
    }

    pub fn sprite_mut(&mut self) -> Option<&mut SpriteBinding> {
        self.sprite.as_mut()
    }

    /// Visual to draw this frame: the current animation frame, else the main visual
    pub fn visual(&self) -> Option<VisualHandle> {
        self.body.visual
    }

    fn refresh_visual(&mut self) {
        self.body.visual = match &self.animation {
            Some(player) => player.current(),
            None => self.sprite.as_ref().map(SpriteBinding::main),
        };
    }
}

impl Poolable for Particle {
    type Args = ParticleSpawn;
    const KIND: &'static str = "particle";

    fn init(&mut self, spawn: ParticleSpawn) {
        let mut velocity = spawn.velocity.unwrap_or(Vec2::ZERO);
        let mut position = spawn.position;
        self.spiral = None;

        match spawn.method {
            UpdateMethod::Spiral => {
                // Speed is the starting radius; the offset points along -angle
                let radius = spawn.speed.unwrap_or(1.0);
                let offset = rotate_deg(Vec2::new(radius, 0.0), -spawn.angle.unwrap_or(0.0));
                let state = SpiralState {
                    pivot: spawn.position,
                    offset,
                    velocity,
                    acceleration: spawn.acceleration,
                    drag: spawn.drag,
                };
                position = state.position();
                self.spiral = Some(state);
            }
            _ => {
                if let Some(angle) = spawn.angle {
                    velocity += vec_from_angle(angle, spawn.speed.unwrap_or(1.0));
                }
            }
        }

        let body = &mut self.body;
        body.clean();
        body.position = position;
        body.velocity = velocity;
        body.acceleration = spawn.acceleration;
        body.drag = spawn.drag;
        body.extent = spawn.size;
        body.z_index = PARTICLE_Z_INDEX;
        body.kill_offscreen = spawn.kill_offscreen;
        body.lifetime = Some(Timer::new(spawn.lifetime, spawn.time_source.clone()));
        body.mark_spawned(&spawn.bounds);

        self.method = spawn.method;
        self.sprite = Some(spawn.sprite);
        self.animation = spawn.animation.map(|spec| AnimationPlayer {
            spec,
            clock: Timer::new(-1.0, spawn.time_source),
        });
        self.refresh_visual();
    }

    fn clean(&mut self) {
        *self = Particle::default();
    }

    fn update(&mut self, frame: &FrameContext) -> Lifecycle {
        if self.body.lifetime_over() {
            return Lifecycle::Kill;
        }
        if self.body.offscreen_kill(&frame.bounds) {
            return Lifecycle::Kill;
        }

        match self.method {
            UpdateMethod::Simulated => self.body.integrate(frame.dt),
            UpdateMethod::Spiral => {
                if let Some(state) = self.spiral.as_mut() {
                    *state = integrate_spiral(*state, frame.dt);
                    self.body.position = state.position();
                    self.body.velocity = state.velocity;
                }
            }
            UpdateMethod::Animated => {}
        }
        self.refresh_visual();
        Lifecycle::Alive
    }

    fn z_index(&self) -> i32 {
        self.body.z_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_runtime::ManualClock;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 960.0, 540.0);

    fn spawn_args(clock: &ManualClock, method: UpdateMethod) -> ParticleSpawn {
        ParticleSpawn {
            position: Vec2::new(480.0, 270.0),
            lifetime: 5.0,
            method,
            velocity: None,
            angle: None,
            speed: None,
            acceleration: Vec2::ZERO,
            drag: 0.0,
            size: Vec2::splat(4.0),
            kill_offscreen: true,
            sprite: SpriteBinding::Shared {
                main: VisualHandle(1),
                alts: Rc::from(vec![VisualHandle(2)]),
            },
            animation: None,
            time_source: clock.source(),
            bounds: SCREEN,
        }
    }

    fn frame(dt: f32) -> FrameContext {
        FrameContext::new(dt, SCREEN)
    }

    #[test]
    fn polar_velocity_adds_to_cartesian() {
        let clock = ManualClock::new();
        let mut particle = Particle::default();
        let mut args = spawn_args(&clock, UpdateMethod::Simulated);
        args.velocity = Some(Vec2::new(1.0, 0.0));
        args.angle = Some(90.0);
        args.speed = Some(5.0);
        particle.init(args);
        // 90 degrees points up on a y-down screen
        assert!((particle.body.velocity - Vec2::new(1.0, -5.0)).length() < 1e-4);
        assert_eq!(particle.z_index(), PARTICLE_Z_INDEX);
        assert_eq!(particle.visual(), Some(VisualHandle(1)));
    }

    #[test]
    fn spiral_starts_on_its_radius() {
        let clock = ManualClock::new();
        let mut particle = Particle::default();
        let mut args = spawn_args(&clock, UpdateMethod::Spiral);
        args.angle = Some(90.0);
        args.speed = Some(20.0);
        args.velocity = Some(Vec2::new(90.0, 0.0));
        particle.init(args);
        assert!((particle.position() - Vec2::new(480.0, 250.0)).length() < 1e-3);

        assert_eq!(particle.update(&frame(1.0)), Lifecycle::Alive);
        // Rotated a further 90 degrees, radius unchanged
        assert!((particle.position() - Vec2::new(460.0, 270.0)).length() < 1e-3);
    }

    #[test]
    fn lifetime_expiry_kills() {
        let clock = ManualClock::new();
        let mut particle = Particle::default();
        particle.init(spawn_args(&clock, UpdateMethod::Simulated));
        clock.set(4.9);
        assert_eq!(particle.update(&frame(0.1)), Lifecycle::Alive);
        clock.set(5.0);
        assert_eq!(particle.update(&frame(0.1)), Lifecycle::Kill);
    }

    #[test]
    fn spawned_offscreen_survives_until_lifetime() {
        let clock = ManualClock::new();
        let mut particle = Particle::default();
        let mut args = spawn_args(&clock, UpdateMethod::Simulated);
        args.position = Vec2::new(-100.0, -100.0);
        args.velocity = Some(Vec2::new(-10.0, 0.0));
        particle.init(args);
        assert!(!particle.body.was_onscreen());

        for i in 1..50 {
            clock.set(i as f64 * 0.1);
            assert_eq!(particle.update(&frame(0.1)), Lifecycle::Alive);
        }
        clock.set(5.0);
        assert_eq!(particle.update(&frame(0.1)), Lifecycle::Kill);
    }

    #[test]
    fn animated_particle_holds_position_and_cycles_frames() {
        let clock = ManualClock::new();
        let mut particle = Particle::default();
        let mut args = spawn_args(&clock, UpdateMethod::Animated);
        args.velocity = Some(Vec2::new(100.0, 0.0));
        args.animation = Some(Rc::new(AnimationSpec {
            frames: vec![VisualHandle(7), VisualHandle(8)],
            frame_time: 0.5,
            looping: true,
        }));
        particle.init(args);
        assert_eq!(particle.visual(), Some(VisualHandle(7)));

        clock.set(0.75);
        particle.update(&frame(0.75));
        assert_eq!(particle.position(), Vec2::new(480.0, 270.0));
        assert_eq!(particle.visual(), Some(VisualHandle(8)));
    }

    #[test]
    fn copied_binding_is_mutable_per_particle() {
        let mut binding = SpriteBinding::Copied {
            main: VisualHandle(1),
            alts: vec![VisualHandle(2)],
        };
        binding.alts_mut().unwrap().push(VisualHandle(3));
        assert_eq!(binding.alts().len(), 2);

        let mut shared = SpriteBinding::Shared {
            main: VisualHandle(1),
            alts: Rc::from(vec![VisualHandle(2)]),
        };
        assert!(shared.alts_mut().is_none());
    }

    #[test]
    fn clean_resets_everything() {
        let clock = ManualClock::new();
        let mut particle = Particle::default();
        particle.init(spawn_args(&clock, UpdateMethod::Spiral));
        particle.clean();
        assert!(particle.sprite().is_none());
        assert!(particle.body.lifetime.is_none());
        assert!(particle.spiral.is_none());
    }
}
