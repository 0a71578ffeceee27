//! Cinder Pool - Preallocated entity storage
//!
//! Every pooled type gets a fixed number of instances at startup; after that
//! entities are only reset and reassigned, never allocated or freed.
//! - `EntityPool<T>` - active/inactive partition with O(1) spawn and kill
//! - `Handle` - generational reference, stale once its slot is recycled
//! - `Body` - state shared by projectile-like entities, incl. the offscreen policy
//! - `PoolRegistry` - per-frame update manifest driving every registered type
//!
//! Removal is always deferred: `kill_safe` stages a handle and `flush_kills`
//! applies the batch after all per-entity updates have run.

mod body;
mod pool;
mod registry;

pub use body::{Body, VisualHandle};
pub use pool::{EntityPool, Handle, Lifecycle, Poolable};
pub use registry::{PoolDriver, PoolRegistry, PoolStats};
