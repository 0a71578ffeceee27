//! The simulation world and its per-frame tick

use crate::config::SimConfig;
use crate::patterns::{RadialSweep, SweepSettings};
use crate::projectile::{Projectile, ProjectileSpawn};
use cinder_core::{CinderError, Rect, Result, Vec2};
use cinder_particles::{EffectId, Particle, ParticleSystem, TrackId};
use cinder_pool::{Handle, PoolRegistry, Poolable};
use cinder_runtime::{FrameClock, FrameContext, GameClock, TimeSource};
use cinder_script::{AttackPattern, RunningScript, ScriptBody};
use serde::Serialize;

/// Counters describing one finished tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub frame: u64,
    /// Game time after the tick
    pub time: f64,
    pub particles: usize,
    pub projectiles: usize,
    pub effects: usize,
    pub scripts: usize,
    /// Pool instances released this tick
    pub released: usize,
    /// Effects swept from the registry this tick
    pub effects_swept: usize,
}

/// Owns every pool, the particle system and the running scripts, and
/// advances them in a fixed order each tick:
///
/// 1. host and game clocks
/// 2. behavior scripts (finished ones are retired)
/// 3. pooled entity updates, staging kills
/// 4. particle tracks, marking finished effects
/// 5. staged pool removals
/// 6. finished effect removal
pub struct SimWorld {
    config: SimConfig,
    frame_clock: FrameClock,
    game_clock: GameClock,
    pools: PoolRegistry,
    particles: ParticleSystem,
    scripts: Vec<Box<dyn RunningScript<PoolRegistry>>>,
    frame: u64,
}

impl SimWorld {
    pub fn new(config: SimConfig) -> Result<Self> {
        let library = config.effect_library()?;
        log::info!(
            "[sim] {} effect template(s), pools: {} particles, {} projectiles",
            library.len(),
            config.pools.particles,
            config.pools.projectiles
        );

        let frame_clock = match config.max_frame_time {
            Some(max) => FrameClock::new().with_max_frame_time(max),
            None => FrameClock::new(),
        };
        let game_clock = GameClock::new(frame_clock.source());

        let mut pools = PoolRegistry::new();
        pools.register::<Projectile>(config.pools.projectiles);
        pools.register::<Particle>(config.pools.particles);

        let particles = ParticleSystem::new(library, game_clock.source(), config.bounds, config.seed);

        Ok(Self {
            config,
            frame_clock,
            game_clock,
            pools,
            particles,
            scripts: Vec::new(),
            frame: 0,
        })
    }

    /// Advance the whole world by `dt` host seconds.
    /// Only a configured `max_frame_time` shortens a long frame.
    pub fn tick(&mut self, dt: f64) -> Result<TickReport> {
        self.frame_clock.advance(dt);
        self.frame += 1;
        let step = if self.game_clock.is_paused() {
            0.0
        } else {
            self.frame_clock.delta_time as f32
        };
        let frame = FrameContext::new(step, self.config.bounds);

        for script in &mut self.scripts {
            if script.step(&mut self.pools)? {
                log::info!("[sim] {} finished at {:.3}s", script.name(), self.game_clock.time());
            }
        }
        self.scripts.retain(|s| !s.is_over());

        self.pools.update_all(&frame);
        self.particles
            .update_all(self.pools.try_pool_mut::<Particle>()?);
        let released = self.pools.flush_all();
        let effects_swept = self.particles.sweep();

        Ok(TickReport {
            frame: self.frame,
            time: self.game_clock.time(),
            particles: self.particle_count(),
            projectiles: self.projectile_count(),
            effects: self.particles.effect_count(),
            scripts: self.scripts.len(),
            released,
            effects_swept,
        })
    }

    /// Instantiate a template and start one track at `origin`
    pub fn spawn_effect(&mut self, name: &str, origin: Vec2) -> Result<(EffectId, TrackId)> {
        let id = self.particles.try_load_effect(name, false, false)?;
        let track = self.play_effect(id, origin)?;
        Ok((id, track))
    }

    /// Instantiate a template without playing it. Unknown names yield `None`.
    pub fn load_effect(&mut self, name: &str, persistent: bool, dynamic_origin: bool) -> Option<EffectId> {
        self.particles.load_effect(name, persistent, dynamic_origin)
    }

    /// Start another track of a loaded effect on the game clock
    pub fn play_effect(&mut self, id: EffectId, origin: Vec2) -> Result<TrackId> {
        let pool = self.pools.try_pool_mut::<Particle>()?;
        self.particles.play(pool, id, origin).ok_or_else(|| {
            CinderError::UnknownEffectTemplate(format!("effect {} is not loaded", id.0))
        })
    }

    /// Start another track whose cooldown and particle lifetimes follow
    /// `source`, e.g. [`SimWorld::host_source`] to keep emitting while paused
    pub fn play_effect_with_source(&mut self, id: EffectId, origin: Vec2, source: TimeSource) -> Result<TrackId> {
        let pool = self.pools.try_pool_mut::<Particle>()?;
        self.particles
            .play_with_source(pool, id, origin, source)
            .ok_or_else(|| CinderError::UnknownEffectTemplate(format!("effect {} is not loaded", id.0)))
    }

    /// Hard stop: stage every live particle of the effect and drop its tracks.
    /// The particles are released at the end of the next tick.
    pub fn cancel_effect(&mut self, id: EffectId) -> Result<()> {
        if self.particles.effect(id).is_none() {
            return Err(CinderError::UnknownEffectTemplate(format!(
                "effect {} is not loaded",
                id.0
            )));
        }
        let pool = self.pools.try_pool_mut::<Particle>()?;
        self.particles.cancel_all(id, pool);
        Ok(())
    }

    pub fn spawn_projectile(&mut self, position: Vec2, velocity: Vec2) -> Result<Handle> {
        let spawn = ProjectileSpawn::new(position, self.game_clock.source(), self.config.bounds)
            .with_velocity(velocity);
        self.pools.spawn::<Projectile>(spawn)
    }

    /// Initialize a pattern against this world's pools and run it every tick
    pub fn start_pattern<B>(&mut self, body: B, args: B::Args) -> Result<()>
    where
        B: ScriptBody<Context = PoolRegistry> + 'static,
        B::Input: Default,
    {
        let mut pattern = AttackPattern::new(body);
        pattern.initialize(&mut self.pools, args)?;
        log::info!("[sim] started {}", B::NAME);
        self.scripts.push(Box::new(pattern));
        Ok(())
    }

    /// Start the built-in radial sweep centered on the screen
    pub fn start_radial_sweep(&mut self) -> Result<()> {
        let settings = SweepSettings::for_bounds(self.config.bounds);
        let source = self.game_clock.source();
        self.start_pattern(RadialSweep::new(settings), source)
    }

    pub fn pause(&self) {
        self.game_clock.pause();
    }

    pub fn unpause(&self) {
        self.game_clock.unpause();
    }

    pub fn is_paused(&self) -> bool {
        self.game_clock.is_paused()
    }

    /// Game time in seconds
    pub fn time(&self) -> f64 {
        self.game_clock.time()
    }

    /// Time source that stops while the game is paused
    pub fn game_source(&self) -> TimeSource {
        self.game_clock.source()
    }

    /// Time source that keeps running while the game is paused
    pub fn host_source(&self) -> TimeSource {
        self.frame_clock.source()
    }

    pub fn bounds(&self) -> Rect {
        self.config.bounds
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    pub fn pools_mut(&mut self) -> &mut PoolRegistry {
        &mut self.pools
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    pub fn particle_count(&self) -> usize {
        self.pools
            .pool::<Particle>()
            .map_or(0, |p| p.active_count())
    }

    pub fn projectile_count(&self) -> usize {
        self.pools
            .pool::<Projectile>()
            .map_or(0, |p| p.active_count())
    }

    /// Particles inside the screen, in draw order
    pub fn visible_particles(&self) -> Vec<&Particle> {
        visible::<Particle>(&self.pools, self.config.bounds, |p| p.body.rect())
    }

    /// Projectiles inside the screen, in draw order
    pub fn visible_projectiles(&self) -> Vec<&Projectile> {
        visible::<Projectile>(&self.pools, self.config.bounds, |p| p.body.rect())
    }
}

fn visible<T: Poolable>(pools: &PoolRegistry, bounds: Rect, rect: impl Fn(&T) -> Rect) -> Vec<&T> {
    let Some(pool) = pools.pool::<T>() else {
        return Vec::new();
    };
    pool.draw_order()
        .into_iter()
        .filter_map(|handle| pool.get(handle))
        .filter(|entity| rect(entity).intersects(&bounds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> SimWorld {
        let config = SimConfig::from_toml_str(
            r#"
[effects.puff]
init_spawn_count = 3
lifetime = 0.5
cooldown = 0.1
target_spawn_count = 3
speed = 20
angle = [0, 360]
"#,
        )
        .unwrap();
        SimWorld::new(config).unwrap()
    }

    #[test]
    fn effect_plays_out_and_is_swept() {
        let mut world = world();
        world.spawn_effect("puff", Vec2::new(480.0, 270.0)).unwrap();
        assert_eq!(world.particle_count(), 3);
        assert_eq!(world.particles().effect_count(), 1);

        let mut swept = 0;
        for _ in 0..60 {
            swept += world.tick(1.0 / 60.0).unwrap().effects_swept;
        }
        assert_eq!(swept, 1);
        assert_eq!(world.particle_count(), 0);
        assert_eq!(world.particles().effect_count(), 0);
    }

    #[test]
    fn unknown_effect_is_an_error() {
        let mut world = world();
        assert!(world.spawn_effect("nope", Vec2::ZERO).is_err());
        assert!(world.load_effect("nope", false, false).is_none());
    }

    #[test]
    fn pause_freezes_game_time_but_not_host() {
        let mut world = world();
        let host = world.host_source();
        world.tick(0.1).unwrap();
        world.pause();
        world.tick(0.1).unwrap();
        assert!((world.time() - 0.1).abs() < 1e-9);
        assert!((host.now() - 0.2).abs() < 1e-9);

        let projectile = world
            .spawn_projectile(Vec2::new(100.0, 100.0), Vec2::new(60.0, 0.0))
            .unwrap();
        world.tick(0.1).unwrap();
        let body = &world.pools().pool::<Projectile>().unwrap().get(projectile).unwrap().body;
        assert_eq!(body.position, Vec2::new(100.0, 100.0));

        world.unpause();
        world.tick(0.1).unwrap();
        assert!((world.time() - 0.2).abs() < 1e-9);
    }

    fn sparks_world(extra: &str) -> SimWorld {
        let config = SimConfig::from_toml_str(&format!(
            r#"{extra}
[effects.sparks]
angle = [80, 100]
speed = [5, 9]
lifetime = 5
init_spawn_count = 3
cooldown = 0.2
target_spawn_count = 35
part_per_wave = 3
destroy_offscreen = false
"#
        ))
        .unwrap();
        SimWorld::new(config).unwrap()
    }

    fn total_emitted(world: &SimWorld) -> u32 {
        world
            .particles()
            .effects()
            .flat_map(|(_, effect)| effect.tracks())
            .map(|track| track.total_emitted())
            .sum()
    }

    #[test]
    fn long_frame_emits_every_due_wave() {
        let mut world = sparks_world("");
        world.spawn_effect("sparks", Vec2::new(480.0, 270.0)).unwrap();
        let report = world.tick(2.0).unwrap();
        assert_eq!(report.time, 2.0);
        assert_eq!(total_emitted(&world), 33);
    }

    #[test]
    fn configured_cap_shortens_long_frames() {
        let mut world = sparks_world("max_frame_time = 0.25");
        world.spawn_effect("sparks", Vec2::new(480.0, 270.0)).unwrap();
        let report = world.tick(2.0).unwrap();
        assert_eq!(report.time, 0.25);
        assert_eq!(total_emitted(&world), 6);
    }

    #[test]
    fn cancel_releases_every_particle_next_tick() {
        let mut world = sparks_world("");
        let (id, _) = world.spawn_effect("sparks", Vec2::new(480.0, 270.0)).unwrap();
        world.tick(0.5).unwrap();
        assert_eq!(world.particle_count(), 9);

        world.cancel_effect(id).unwrap();
        assert!(world.particles().effect(id).unwrap().tracks().is_empty());
        let report = world.tick(1.0 / 60.0).unwrap();
        assert_eq!(report.released, 9);
        assert_eq!(report.effects_swept, 1);
        assert_eq!(world.particle_count(), 0);
        assert!(world.cancel_effect(id).is_err());
    }

    #[test]
    fn host_source_track_keeps_emitting_while_paused() {
        let mut world = sparks_world("");
        let id = world.load_effect("sparks", false, false).unwrap();
        let origin = Vec2::new(480.0, 270.0);
        let game_track = world.play_effect(id, origin).unwrap();
        let host = world.host_source();
        let ui_track = world.play_effect_with_source(id, origin, host).unwrap();

        world.pause();
        world.tick(0.5).unwrap();
        world.tick(0.5).unwrap();

        let effect = world.particles().effect(id).unwrap();
        assert_eq!(effect.track(game_track).unwrap().total_emitted(), 3);
        // 1s of host time is 5 waves of 3
        assert_eq!(effect.track(ui_track).unwrap().total_emitted(), 18);
        assert_eq!(world.time(), 0.0);
    }

    #[test]
    fn visible_lists_are_in_draw_order() {
        let mut world = world();
        world.spawn_projectile(Vec2::new(10.0, 10.0), Vec2::ZERO).unwrap();
        world.spawn_projectile(Vec2::new(-500.0, 10.0), Vec2::ZERO).unwrap();
        world.spawn_effect("puff", Vec2::new(480.0, 270.0)).unwrap();

        assert_eq!(world.visible_projectiles().len(), 1);
        assert_eq!(world.visible_particles().len(), 3);
    }
}
