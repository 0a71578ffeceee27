//! The global effect registry

use crate::effect::{EmitContext, ParticleEffect, TrackId};
use crate::library::EffectLibrary;
use crate::particle::Particle;
use crate::rand::ParticleRng;
use cinder_core::{CinderError, Rect, Result, Vec2};
use cinder_pool::EntityPool;
use cinder_runtime::TimeSource;

/// Identifies a live effect in a [`ParticleSystem`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u64);

/// Owns every live effect, the template library and the shared RNG.
///
/// Effects that finish are only marked during `update_all`; `sweep` removes
/// them afterwards, so the registry is never mutated mid-iteration.
pub struct ParticleSystem {
    library: EffectLibrary,
    effects: Vec<(EffectId, ParticleEffect)>,
    next_id: u64,
    rng: ParticleRng,
    time_source: TimeSource,
    bounds: Rect,
}

impl ParticleSystem {
    /// `time_source` drives tracks started with [`ParticleSystem::play`]
    pub fn new(library: EffectLibrary, time_source: TimeSource, bounds: Rect, seed: u64) -> Self {
        Self {
            library,
            effects: Vec::new(),
            next_id: 0,
            rng: ParticleRng::new(seed),
            time_source,
            bounds,
        }
    }

    pub fn library(&self) -> &EffectLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut EffectLibrary {
        &mut self.library
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Instantiate the named template. Unknown names yield `None`.
    pub fn load_effect(&mut self, name: &str, persistent: bool, dynamic_origin: bool) -> Option<EffectId> {
        let template = self.library.get(name)?;
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.effects
            .push((id, ParticleEffect::new(name, template, persistent, dynamic_origin)));
        log::debug!("[particles] loaded '{name}' as effect {}", id.0);
        Some(id)
    }

    /// [`ParticleSystem::load_effect`] reporting unknown names as an error
    pub fn try_load_effect(&mut self, name: &str, persistent: bool, dynamic_origin: bool) -> Result<EffectId> {
        self.load_effect(name, persistent, dynamic_origin)
            .ok_or_else(|| CinderError::UnknownEffectTemplate(name.to_string()))
    }

    pub fn effect(&self, id: EffectId) -> Option<&ParticleEffect> {
        self.effects.iter().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut ParticleEffect> {
        self.effects
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| e)
    }

    pub fn effects(&self) -> impl Iterator<Item = (EffectId, &ParticleEffect)> + '_ {
        self.effects.iter().map(|(id, e)| (*id, e))
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Start a track on the system's time source
    pub fn play(&mut self, pool: &mut EntityPool<Particle>, id: EffectId, origin: Vec2) -> Option<TrackId> {
        let source = self.time_source.clone();
        self.play_with_source(pool, id, origin, source)
    }

    /// Start a track whose cooldown and particle lifetimes follow `source`
    pub fn play_with_source(
        &mut self,
        pool: &mut EntityPool<Particle>,
        id: EffectId,
        origin: Vec2,
        source: TimeSource,
    ) -> Option<TrackId> {
        let Self {
            effects, rng, bounds, ..
        } = self;
        let (_, effect) = effects.iter_mut().find(|(eid, _)| *eid == id)?;
        let mut ctx = EmitContext {
            pool,
            rng,
            bounds: *bounds,
        };
        Some(effect.play(&mut ctx, origin, source))
    }

    pub fn set_anchor(&mut self, id: EffectId, anchor: Vec2) {
        if let Some(effect) = self.effect_mut(id) {
            effect.set_anchor(anchor);
        }
    }

    pub fn stop(&mut self, id: EffectId) {
        if let Some(effect) = self.effect_mut(id) {
            effect.stop();
        }
    }

    pub fn cancel_all(&mut self, id: EffectId, pool: &mut EntityPool<Particle>) {
        if let Some(effect) = self.effect_mut(id) {
            effect.cancel_all(pool);
        }
    }

    /// Stop the effect and remove it at the next sweep, persistent or not
    pub fn destroy(&mut self, id: EffectId) {
        if let Some(effect) = self.effect_mut(id) {
            effect.kill_safe();
        }
    }

    /// Advance every effect's tracks
    pub fn update_all(&mut self, pool: &mut EntityPool<Particle>) {
        let Self {
            effects, rng, bounds, ..
        } = self;
        let mut ctx = EmitContext {
            pool,
            rng,
            bounds: *bounds,
        };
        for (_, effect) in effects.iter_mut() {
            effect.update(&mut ctx);
        }
    }

    /// Remove effects marked for destruction; returns how many were removed
    pub fn sweep(&mut self) -> usize {
        let before = self.effects.len();
        self.effects.retain(|(id, effect)| {
            if effect.is_pending_destruction() {
                log::debug!("[particles] destroyed '{}' (effect {})", effect.name(), id.0);
                false
            } else {
                true
            }
        });
        before - self.effects.len()
    }

    /// Live particles across every effect
    pub fn particle_count(&self) -> usize {
        self.effects.iter().map(|(_, e)| e.particle_count()).sum()
    }
}
