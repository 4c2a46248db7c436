//! # Kestrel Core
//!
//! Entity identity and component storage shared by every Kestrel crate.
//!
//! - **EntityId**: a packed 32-bit index + generation handle
//! - **EntityIds**: the allocator that hands out and recycles ids
//! - **DenseStorage / SparseStorage**: per-component maps keyed by entity id
//! - **ComponentStorage**: type-erased removal so disposal can cascade
//!
//! ```rust
//! use kestrel_core::{DenseStorage, EntityIds};
//!
//! let mut ids = EntityIds::new();
//! let _root = ids.create(); // entity 0 is reserved
//! let player = ids.create();
//!
//! let mut health = DenseStorage::new();
//! health.insert(player, 100u32);
//! assert_eq!(health.get(player), Some(&100));
//!
//! ids.dispose(player);
//! assert!(!ids.valid(player));
//! ```

pub mod entity;
pub mod error;
pub mod storage;

pub use entity::{EntityId, EntityIds, GENERATION_BITS, INDEX_BITS, MAX_GENERATION, MAX_INDEX};
pub use error::{EntityError, Result};
pub use storage::{ComponentStorage, DenseStorage, SparseStorage};
