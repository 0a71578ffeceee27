//! Generic fixed-capacity pool with generational handles

use cinder_core::{CinderError, Result};
use cinder_runtime::FrameContext;

/// Reference to a pooled entity.
///
/// Handles outlive the spawn they came from: once the entity is returned to
/// the pool its slot's generation moves on and the old handle reads inactive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Outcome of one entity update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Alive,
    /// Stage this entity for removal at the end of the frame
    Kill,
}

/// A type that can live in an [`EntityPool`]
pub trait Poolable: Default + 'static {
    /// Spawn-time parameters applied to a recycled instance
    type Args;

    /// Name used in errors and logs
    const KIND: &'static str;

    /// Reset public state from `args`. Called when the instance leaves the inactive set.
    fn init(&mut self, args: Self::Args);

    /// Return every field to its null state before re-entering the inactive set
    fn clean(&mut self);

    /// Advance one frame
    fn update(&mut self, frame: &FrameContext) -> Lifecycle;

    fn z_index(&self) -> i32;
}

struct Slot<T> {
    entity: T,
    generation: u32,
    /// Position in `active`, `None` while inactive
    active_index: Option<usize>,
}

/// Fixed-capacity store partitioned into active and inactive instances.
///
/// `active.len() + inactive.len() == capacity` always holds, and every slot
/// is in exactly one of the two lists.
pub struct EntityPool<T: Poolable> {
    slots: Vec<Slot<T>>,
    active: Vec<u32>,
    inactive: Vec<u32>,
    pending_kill: Vec<Handle>,
}

impl<T: Poolable> EntityPool<T> {
    /// Preallocate `capacity` instances, all inactive
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(Slot {
                entity: T::default(),
                generation: 0,
                active_index: None,
            });
        }
        // Reversed so that spawning hands out slot 0 first
        let inactive = (0..capacity as u32).rev().collect();
        Self {
            slots,
            active: Vec::with_capacity(capacity),
            inactive,
            pending_kill: Vec::new(),
        }
    }

    /// Move one instance from inactive to active and initialize it.
    ///
    /// Fails with `PoolExhausted` when every instance is in use; the pool is
    /// left untouched in that case.
    pub fn spawn(&mut self, args: T::Args) -> Result<Handle> {
        let Some(index) = self.inactive.pop() else {
            return Err(CinderError::PoolExhausted { kind: T::KIND });
        };
        let slot = &mut self.slots[index as usize];
        slot.active_index = Some(self.active.len());
        slot.entity.init(args);
        self.active.push(index);
        Ok(Handle {
            index,
            generation: slot.generation,
        })
    }

    pub fn is_active(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index())
            .map(|s| s.generation == handle.generation && s.active_index.is_some())
            .unwrap_or(false)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        if self.is_active(handle) {
            Some(&self.slots[handle.index()].entity)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if self.is_active(handle) {
            Some(&mut self.slots[handle.index()].entity)
        } else {
            None
        }
    }

    /// Stage `handle` for removal at the next [`EntityPool::flush_kills`].
    /// Stale or already-staged handles are ignored at flush time.
    pub fn kill_safe(&mut self, handle: Handle) {
        if self.is_active(handle) {
            self.pending_kill.push(handle);
        }
    }

    /// Stage every active instance for removal
    pub fn kill_all_safe(&mut self) {
        let handles: Vec<Handle> = self.handles().collect();
        self.pending_kill.extend(handles);
    }

    /// Run `update` on every active instance, staging the ones that ask to die.
    /// The active list is never modified here.
    pub fn update_all(&mut self, frame: &FrameContext) {
        let Self {
            slots,
            active,
            pending_kill,
            ..
        } = self;
        for &index in active.iter() {
            let slot = &mut slots[index as usize];
            if slot.entity.update(frame) == Lifecycle::Kill {
                pending_kill.push(Handle {
                    index,
                    generation: slot.generation,
                });
            }
        }
    }

    /// Apply staged removals: clean each instance, bump its generation and
    /// move it back to the inactive set. Returns how many were removed.
    pub fn flush_kills(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_kill);
        let mut removed = 0;
        for handle in pending {
            if self.is_active(handle) {
                self.release(handle.index);
                removed += 1;
            }
        }
        removed
    }

    fn release(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        let Some(pos) = slot.active_index.take() else {
            return;
        };
        slot.entity.clean();
        slot.generation = slot.generation.wrapping_add(1);

        self.active.swap_remove(pos);
        if let Some(&moved) = self.active.get(pos) {
            self.slots[moved as usize].active_index = Some(pos);
        }
        self.inactive.push(index);
    }

    /// Handles of all active instances, in storage order
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.active.iter().map(|&index| Handle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.active.iter().map(|&index| {
            let slot = &self.slots[index as usize];
            (
                Handle {
                    index,
                    generation: slot.generation,
                },
                &slot.entity,
            )
        })
    }

    /// Active handles sorted by z-index (stable), for the renderer
    pub fn draw_order(&self) -> Vec<Handle> {
        let mut order: Vec<(i32, Handle)> = self
            .iter()
            .map(|(handle, entity)| (entity.z_index(), handle))
            .collect();
        order.sort_by_key(|(z, _)| *z);
        order.into_iter().map(|(_, handle)| handle).collect()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_kill.len()
    }
}
