//! # Kestrel Physics
//!
//! Narrow-phase collision support for the Kestrel engine.
//!
//! - **Colliders**: spheres and convex hulls with face and vertex adjacency
//! - **Support points**: farthest point of a collider along a direction
//! - **Clipping**: Sutherland-Hodgman polygon clipping against planes
//! - **Manifolds**: contact points for an overlapping pair given the
//!   separating normal and depth
//!
//! Overlap detection and the separating normal come from the caller; this
//! crate only turns them into contact points.
//!
//! ```rust
//! use glam::{DQuat, DVec3};
//! use kestrel_physics::{contacts, Collider};
//!
//! let lower = Collider::cuboid(DVec3::splat(0.5));
//! let mut upper = Collider::cuboid(DVec3::splat(0.5));
//! upper.update(DVec3::new(0.0, 0.0, 0.9), DQuat::IDENTITY);
//!
//! let manifold = contacts(&lower, &upper, DVec3::Z, 0.1);
//! assert_eq!(manifold.len(), 4);
//! ```

pub mod clipping;
pub mod collider;
pub mod error;
pub mod manifold;
pub mod support;

pub use clipping::{sutherland_hodgman, Plane};
pub use collider::{Collider, Contact, ConvexHull, HullFace, Sphere};
pub use error::{CollisionError, HullError, Result};
pub use manifold::{closest_points_on_lines, contacts, sphere_sphere_contact, try_contacts};
pub use support::{support_index, support_point};
