//! Per-frame update manifest over every registered pool type

use crate::pool::{EntityPool, Handle, Poolable};
use cinder_core::{CinderError, Result};
use cinder_runtime::FrameContext;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Type-erased view of one pool, driven by the registry.
///
/// Pools are updated in registration order.
pub trait PoolDriver: Any {
    fn kind(&self) -> &'static str;

    /// Run every active instance's update, staging kills
    fn update_all(&mut self, frame: &FrameContext);

    /// Apply staged kills; returns how many instances were released
    fn flush_kills(&mut self) -> usize;

    fn stats(&self) -> PoolStats;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Occupancy snapshot of one pool
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub kind: &'static str,
    pub capacity: usize,
    pub active: usize,
}

impl<T: Poolable> PoolDriver for EntityPool<T> {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn update_all(&mut self, frame: &FrameContext) {
        EntityPool::update_all(self, frame);
    }

    fn flush_kills(&mut self) -> usize {
        EntityPool::flush_kills(self)
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            kind: T::KIND,
            capacity: self.capacity(),
            active: self.active_count(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owns one [`EntityPool`] per registered type, so a single driver call
/// advances every pooled type without per-type knowledge at the call site.
#[derive(Default)]
pub struct PoolRegistry {
    pools: Vec<Box<dyn PoolDriver>>,
    index: HashMap<TypeId, usize>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate `capacity` instances of `T` and add the type to the
    /// update manifest. Registering a type twice keeps the first pool.
    pub fn register<T: Poolable>(&mut self, capacity: usize) {
        let type_id = TypeId::of::<T>();
        if self.index.contains_key(&type_id) {
            log::warn!("[pool] {} already registered, keeping existing pool", T::KIND);
            return;
        }
        log::debug!("[pool] registered {} x{}", T::KIND, capacity);
        self.index.insert(type_id, self.pools.len());
        self.pools.push(Box::new(EntityPool::<T>::new(capacity)));
    }

    pub fn is_registered<T: Poolable>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    pub fn pool<T: Poolable>(&self) -> Option<&EntityPool<T>> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        self.pools[slot].as_any().downcast_ref::<EntityPool<T>>()
    }

    pub fn pool_mut<T: Poolable>(&mut self) -> Option<&mut EntityPool<T>> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        self.pools[slot].as_any_mut().downcast_mut::<EntityPool<T>>()
    }

    /// [`PoolRegistry::pool_mut`] that reports an unregistered type as an error
    pub fn try_pool_mut<T: Poolable>(&mut self) -> Result<&mut EntityPool<T>> {
        self.pool_mut::<T>()
            .ok_or(CinderError::UnregisteredPool(T::KIND))
    }

    pub fn spawn<T: Poolable>(&mut self, args: T::Args) -> Result<Handle> {
        self.try_pool_mut::<T>()?.spawn(args)
    }

    pub fn kill_safe<T: Poolable>(&mut self, handle: Handle) {
        if let Some(pool) = self.pool_mut::<T>() {
            pool.kill_safe(handle);
        }
    }

    pub fn is_active<T: Poolable>(&self, handle: Handle) -> bool {
        self.pool::<T>().is_some_and(|pool| pool.is_active(handle))
    }

    /// Update every registered pool in registration order
    pub fn update_all(&mut self, frame: &FrameContext) {
        for pool in &mut self.pools {
            pool.update_all(frame);
        }
    }

    /// Apply staged kills in every pool; returns the total released
    pub fn flush_all(&mut self) -> usize {
        self.pools.iter_mut().map(|pool| pool.flush_kills()).sum()
    }

    pub fn stats(&self) -> Vec<PoolStats> {
        self.pools.iter().map(|pool| pool.stats()).collect()
    }
}
