//! Error types for kestrel_core

use crate::entity::EntityId;
use thiserror::Error;

/// Errors raised by entity management
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// Every index is live and nothing is waiting on the free list
    #[error("all {max} entity identifiers are in use")]
    Exhausted {
        /// Number of identifiers the allocator can hand out
        max: u32,
    },

    /// The id refers to an entity that has been disposed
    #[error("stale entity id {0}")]
    Stale(EntityId),
}

/// Result type for kestrel_core operations
pub type Result<T> = std::result::Result<T, EntityError>;
