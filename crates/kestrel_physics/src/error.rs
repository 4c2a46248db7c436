//! Physics error types

use thiserror::Error;

/// Errors raised while building a convex hull
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HullError {
    /// Fewer distinct vertices than the smallest closed hull needs
    #[error("Convex hull needs at least 4 distinct vertices, got {count}")]
    TooFewVertices {
        /// Distinct vertices supplied
        count: usize,
    },

    /// A triangle refers to a vertex that does not exist
    #[error("Triangle index {index} out of range for {len} vertices")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Number of vertices supplied
        len: usize,
    },

    /// The index list is empty or not a multiple of three
    #[error("Index list of length {len} does not describe triangles")]
    NotTriangles {
        /// Length of the index list
        len: usize,
    },

    /// Every triangle is degenerate
    #[error("Convex hull has no non-degenerate faces")]
    NoFaces,

    /// A vertex is only used by degenerate triangles
    #[error("Hull vertex {vertex} belongs to no face")]
    FacelessVertex {
        /// Index after duplicate vertices were merged
        vertex: u32,
    },
}

/// Errors raised while generating contacts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// The separating normal or penetration cannot be used
    #[error("Invalid collision input: {0}")]
    InvalidInput(String),
}

/// Result type for hull construction
pub type Result<T> = std::result::Result<T, HullError>;
