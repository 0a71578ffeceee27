//! Particle effects, their playback tracks and the wave scheduler

use crate::particle::{Particle, ParticleSpawn, SpriteBinding};
use crate::rand::ParticleRng;
use crate::template::{AnimationSpec, EffectTemplate};
use cinder_core::{CinderError, Rect, Result, Vec2};
use cinder_pool::{EntityPool, Handle, VisualHandle};
use cinder_runtime::{TimeSource, Timer};
use std::rc::Rc;

/// Slack when counting elapsed cooldowns, so that `k * cooldown` worth of
/// accumulated time yields `k` waves despite float rounding.
const WAVE_EPSILON: f64 = 1e-9;

/// Identifies a track within its effect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrackId(pub u32);

/// Borrowed state an effect needs to emit particles
pub struct EmitContext<'a> {
    pub pool: &'a mut EntityPool<Particle>,
    pub rng: &'a mut ParticleRng,
    /// Visible bounds for the spawn-time onscreen test
    pub bounds: Rect,
}

/// One playback instance of an effect
#[derive(Debug)]
pub struct ParticleEffectTrack {
    id: TrackId,
    pub origin: Vec2,
    timer: Timer,
    total_emitted: u32,
    /// Spawns lost to a full pool
    dropped: u32,
    active: Vec<Handle>,
    can_emit: bool,
    ended: bool,
    time_source: TimeSource,
}

impl ParticleEffectTrack {
    fn new(id: TrackId, origin: Vec2, cooldown: f64, time_source: TimeSource) -> Self {
        Self {
            id,
            origin,
            timer: Timer::new(cooldown, time_source.clone()),
            total_emitted: 0,
            dropped: 0,
            active: Vec::new(),
            can_emit: true,
            ended: false,
            time_source,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn total_emitted(&self) -> u32 {
        self.total_emitted
    }

    /// Spawns that found the pool full. Emission stops for the rest of that
    /// frame at the first one, so a stall adds at most one per update.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Handles of particles this track emitted that were still alive at the last prune
    pub fn active_particles(&self) -> &[Handle] {
        &self.active
    }

    pub fn can_emit(&self) -> bool {
        self.can_emit
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Scaled seconds since the last wave, including carried overshoot
    pub fn cooldown_elapsed(&self) -> f64 {
        self.timer.get_time()
    }

    /// Stop new waves; live particles finish on their own
    pub fn stop_emission(&mut self) {
        self.can_emit = false;
    }

    /// Stage every live particle for removal
    fn cleanup(&mut self, pool: &mut EntityPool<Particle>) {
        for handle in self.active.drain(..) {
            pool.kill_safe(handle);
        }
    }
}

/// An effect instance: one template, any number of concurrent tracks
#[derive(Debug)]
pub struct ParticleEffect {
    name: String,
    template: Rc<EffectTemplate>,
    alt_visuals: Rc<[VisualHandle]>,
    animation: Option<Rc<AnimationSpec>>,
    tracks: Vec<ParticleEffectTrack>,
    next_track: u32,
    is_persistent: bool,
    dynamic_origin: bool,
    anchor: Vec2,
    started_playing_once: bool,
    pending_destruction: bool,
}

impl ParticleEffect {
    pub fn new(
        name: impl Into<String>,
        template: Rc<EffectTemplate>,
        is_persistent: bool,
        dynamic_origin: bool,
    ) -> Self {
        let alt_visuals = Rc::from(template.alt_visuals.clone());
        let animation = template.animation.clone().map(Rc::new);
        Self {
            name: name.into(),
            template,
            alt_visuals,
            animation,
            tracks: Vec::new(),
            next_track: 0,
            is_persistent,
            dynamic_origin,
            anchor: Vec2::ZERO,
            started_playing_once: false,
            pending_destruction: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &EffectTemplate {
        &self.template
    }

    pub fn tag(&self) -> Option<&str> {
        self.template.tag.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.is_persistent
    }

    pub fn started_playing_once(&self) -> bool {
        self.started_playing_once
    }

    pub fn is_pending_destruction(&self) -> bool {
        self.pending_destruction
    }

    /// Emission point for dynamic-origin effects
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    pub fn tracks(&self) -> &[ParticleEffectTrack] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&ParticleEffectTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut ParticleEffectTrack> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Live particles across all tracks
    pub fn particle_count(&self) -> usize {
        self.tracks.iter().map(|t| t.active.len()).sum()
    }

    /// Start a new track at `origin` and emit its initial burst
    pub fn play(&mut self, ctx: &mut EmitContext<'_>, origin: Vec2, time_source: TimeSource) -> TrackId {
        self.started_playing_once = true;
        let id = TrackId(self.next_track);
        self.next_track += 1;

        let mut track = ParticleEffectTrack::new(id, origin, self.template.cooldown, time_source);
        for _ in 0..self.template.init_spawn_count {
            if let Err(e) = self.emit(&mut track, ctx) {
                self.drop_spawn(&mut track, e);
                break;
            }
        }
        log::debug!(
            "[particles] '{}' track {} started at ({:.1}, {:.1}), {} initial",
            self.name,
            id.0,
            origin.x,
            origin.y,
            track.total_emitted
        );
        self.tracks.push(track);
        id
    }

    /// Draw one particle from the pool with every range resolved independently.
    /// Fails with `PoolExhausted` when no instance is free; nothing is counted then.
    fn emit(&self, track: &mut ParticleEffectTrack, ctx: &mut EmitContext<'_>) -> Result<()> {
        let t = &*self.template;
        let rng = &mut *ctx.rng;

        let offset = Vec2::new(t.offset_x.sample(rng), t.offset_y.sample(rng));
        let base = if self.dynamic_origin {
            self.anchor
        } else {
            track.origin
        };
        let lifetime = t.lifetime.sample(rng) as f64;
        let velocity = match (t.velocity_x, t.velocity_y) {
            (Some(vx), Some(vy)) => Some(Vec2::new(vx.sample(rng), vy.sample(rng))),
            _ => None,
        };
        let drag = t.drag.sample(rng);
        let acceleration = Vec2::new(t.accel_x.sample(rng), t.accel_y.sample(rng));
        let angle = t.angle.map(|r| r.sample(rng));
        let speed = t.speed.map(|r| r.sample(rng));

        let sprite = if t.copy_surface {
            SpriteBinding::Copied {
                main: t.main_visual,
                alts: self.alt_visuals.to_vec(),
            }
        } else {
            SpriteBinding::Shared {
                main: t.main_visual,
                alts: Rc::clone(&self.alt_visuals),
            }
        };

        let spawn = ParticleSpawn {
            position: base + offset,
            lifetime,
            method: t.update_method,
            velocity,
            angle,
            speed,
            acceleration,
            drag,
            size: t.size,
            kill_offscreen: t.destroy_offscreen,
            sprite,
            animation: self.animation.clone(),
            time_source: track.time_source.clone(),
            bounds: ctx.bounds,
        };

        let handle = ctx.pool.spawn(spawn)?;
        track.active.push(handle);
        track.total_emitted += 1;
        Ok(())
    }

    fn drop_spawn(&self, track: &mut ParticleEffectTrack, err: CinderError) {
        track.dropped += 1;
        log::warn!(
            "[particles] '{}' track {} skipped the rest of this frame: {err}",
            self.name,
            track.id.0
        );
    }

    /// Advance one track: emit due waves, prune dead particles, detect the end.
    ///
    /// Waves are counted from the accumulated cooldown time and the overshoot
    /// is carried into the next period, so the emission rate does not depend
    /// on how the elapsed time was sliced into frames.
    fn continue_track(&self, track: &mut ParticleEffectTrack, ctx: &mut EmitContext<'_>) {
        let target = self.template.target_spawn_count;
        let cooldown = self.template.cooldown;

        if track.total_emitted < target {
            let elapsed = track.timer.get_time();
            let waves = (elapsed / cooldown + WAVE_EPSILON).floor();
            if waves >= 1.0 {
                let remainder = (elapsed - waves * cooldown).max(0.0);
                track.timer.restart();
                track.timer.rewind(remainder);

                if track.can_emit {
                    'waves: for _ in 0..waves as u64 {
                        for _ in 0..self.template.part_per_wave {
                            if let Err(e) = self.emit(track, ctx) {
                                self.drop_spawn(track, e);
                                break 'waves;
                            }
                            if track.total_emitted >= target {
                                break 'waves;
                            }
                        }
                    }
                }
            }
        }

        let pool = &*ctx.pool;
        track.active.retain(|&handle| pool.is_active(handle));

        if track.active.is_empty() && (track.total_emitted >= target || !track.can_emit) {
            track.ended = true;
        }
    }

    /// Advance every track, drop ended ones, and mark a finished
    /// non-persistent effect for destruction.
    pub fn update(&mut self, ctx: &mut EmitContext<'_>) {
        let mut tracks = std::mem::take(&mut self.tracks);
        for track in tracks.iter_mut() {
            self.continue_track(track, ctx);
        }
        tracks.retain(|t| !t.ended);
        self.tracks = tracks;

        if !self.is_persistent && self.started_playing_once && self.tracks.is_empty() {
            self.pending_destruction = true;
        }
    }

    /// No new waves on any track; live particles drain naturally
    pub fn stop(&mut self) {
        for track in &mut self.tracks {
            track.stop_emission();
        }
    }

    /// Hard stop: stage every live particle for removal and drop all tracks
    pub fn cancel_all(&mut self, pool: &mut EntityPool<Particle>) {
        for track in &mut self.tracks {
            track.cleanup(pool);
        }
        self.tracks.clear();
    }

    /// Mark for removal at the next sweep and stop emitting
    pub fn kill_safe(&mut self) {
        self.pending_destruction = true;
        self.stop();
    }
}
