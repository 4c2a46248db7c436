//! Entity identifiers
//!
//! An [`EntityId`] packs a dense array index and a generation into 32 bits.
//! The index doubles as the slot for component data so ids never change
//! value over their lifetime. The generation is bumped each time the slot is
//! disposed, which makes ids captured before disposal compare unequal to the
//! id that later reuses the slot.
//!
//! See <http://bitsquid.blogspot.ca/2014/08/building-data-oriented-entity-system.html>

use crate::error::{EntityError, Result};
use std::collections::VecDeque;
use std::fmt;

/// Number of bits holding the array index
pub const INDEX_BITS: u32 = 20;
/// Number of bits holding the generation
pub const GENERATION_BITS: u32 = 12;
/// Largest index, also the index mask: 1_048_575
pub const MAX_INDEX: u32 = (1 << INDEX_BITS) - 1;
/// Largest generation, also the generation mask: 4095
pub const MAX_GENERATION: u32 = (1 << GENERATION_BITS) - 1;

/// Freed indices are only recycled once this many are waiting.
const RECYCLE_THRESHOLD: usize = 1 << (GENERATION_BITS - 1);

/// Unique identifier for an entity
///
/// Layout: `[generation: 12 | index: 20]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(u32);

impl EntityId {
    /// The sentinel id. Also the id of the first entity ever created.
    pub const NULL: EntityId = EntityId(0);

    /// Pack an index and generation. Out of range bits are masked off.
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((index & MAX_INDEX) | ((generation & MAX_GENERATION) << INDEX_BITS))
    }

    /// Array index for component lookups
    #[inline]
    pub fn index(self) -> u32 {
        self.0 & MAX_INDEX
    }

    /// Generation used to detect stale ids
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> INDEX_BITS) & MAX_GENERATION
    }

    /// Raw packed value
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }

    /// Rebuild an id from its packed value
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// True for the sentinel value
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Allocates and recycles entity identifiers
///
/// Indices grow densely from zero. Disposed indices queue on a FIFO free
/// list and are only handed out again once more than half the generation
/// space is waiting, so short lived entities do not immediately alias.
/// Recycling is decided at `create` time only.
#[derive(Debug, Clone)]
pub struct EntityIds {
    /// Current generation per index. Grows as entities are allocated.
    generations: Vec<u16>,
    /// Disposed indices, oldest first.
    free: VecDeque<u32>,
    /// Highest index this allocator will hand out.
    max_index: u32,
    /// Number of live entities.
    live: usize,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityIds {
    /// Create an allocator covering the full 20 bit index space
    pub fn new() -> Self {
        Self::with_limits(MAX_INDEX)
    }

    /// Create an allocator that stops growing after `max_index`
    ///
    /// Values above [`MAX_INDEX`] are clamped.
    pub fn with_limits(max_index: u32) -> Self {
        Self {
            generations: Vec::new(),
            free: VecDeque::new(),
            max_index: max_index.min(MAX_INDEX),
            live: 0,
        }
    }

    /// Allocate an id, reporting exhaustion as an error
    pub fn try_create(&mut self) -> Result<EntityId> {
        let index = if self.free.len() > RECYCLE_THRESHOLD {
            self.pop_free()
        } else if (self.generations.len() as u64) <= u64::from(self.max_index) {
            self.generations.push(0);
            Some(self.generations.len() as u32 - 1)
        } else {
            // Index space is used up, reuse whatever has been freed.
            self.pop_free()
        };

        let index = index.ok_or(EntityError::Exhausted {
            max: self.max_index + 1,
        })?;
        self.live += 1;
        Ok(EntityId::new(
            index,
            u32::from(self.generations[index as usize]),
        ))
    }

    /// Allocate an id
    ///
    /// Returns [`EntityId::NULL`] for the very first entity and when every
    /// identifier is in use. Running out is a configuration error and is
    /// logged, the allocator itself stays usable.
    pub fn create(&mut self) -> EntityId {
        match self.try_create() {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(error = %err, "entity allocation failed");
                EntityId::NULL
            }
        }
    }

    /// Check that an id refers to a live entity
    pub fn valid(&self, id: EntityId) -> bool {
        self.generations
            .get(id.index() as usize)
            .is_some_and(|&generation| u32::from(generation) == id.generation())
    }

    /// Mark an entity as no longer valid and queue its index for reuse
    ///
    /// Returns false, and leaves the allocator untouched, when the id is
    /// already stale.
    pub fn dispose(&mut self, id: EntityId) -> bool {
        if !self.valid(id) {
            tracing::warn!(entity = %id, "dispose of stale entity ignored");
            return false;
        }
        let slot = &mut self.generations[id.index() as usize];
        *slot = ((u32::from(*slot) + 1) & MAX_GENERATION) as u16;
        self.free.push_back(id.index());
        self.live -= 1;
        true
    }

    /// Discard all entity information
    pub fn reset(&mut self) {
        self.generations.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if no entity is live
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of index slots handed out so far
    pub fn capacity(&self) -> usize {
        self.generations.len()
    }

    /// Number of disposed indices waiting for reuse
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    fn pop_free(&mut self) -> Option<u32> {
        self.free.pop_front()
    }
}
