//! Contact manifold generation
//!
//! Given two colliders already known to overlap, the separating normal
//! (pointing from the first collider to the second) and the penetration
//! depth, produce the world space contact points between them.
//!
//! Hull pairs choose between an edge contact and a face contact by comparing
//! how well the best face of each hull and the best edge pair align with the
//! normal. Face contacts clip the incident face against the side planes of
//! the reference face and keep the points that lie behind it.

use crate::clipping::{sutherland_hodgman, Plane};
use crate::collider::{Collider, Contact, ConvexHull, Sphere};
use crate::error::CollisionError;
use crate::support::{support_index, support_point};
use glam::DVec3;

/// Edge alignment must beat both face alignments by this much
const EDGE_BIAS: f64 = 1e-4;

/// Relative tolerance below which two directions count as parallel
const PARALLEL_EPSILON: f64 = 1e-6;

/// Contact points between two overlapping colliders
///
/// Invalid input is logged and produces no contacts.
pub fn contacts(
    collider1: &Collider,
    collider2: &Collider,
    normal: DVec3,
    penetration: f64,
) -> Vec<Contact> {
    match try_contacts(collider1, collider2, normal, penetration) {
        Ok(contacts) => contacts,
        Err(e) => {
            tracing::error!(
                c1 = collider1.kind_name(),
                c2 = collider2.kind_name(),
                error = %e,
                "contact generation failed"
            );
            Vec::new()
        }
    }
}

/// Contact points between two overlapping colliders, reporting bad input
pub fn try_contacts(
    collider1: &Collider,
    collider2: &Collider,
    normal: DVec3,
    penetration: f64,
) -> Result<Vec<Contact>, CollisionError> {
    if !normal.is_finite() || normal.length_squared() < 1e-12 {
        return Err(CollisionError::InvalidInput(format!(
            "unusable separating normal {normal}"
        )));
    }
    if !penetration.is_finite() {
        return Err(CollisionError::InvalidInput(format!(
            "penetration {penetration} is not finite"
        )));
    }

    let contacts = match (collider1, collider2) {
        (Collider::Sphere(_), _) => {
            let point1 = support_point(collider1, normal);
            vec![Contact {
                point1,
                point2: point1 - normal * penetration,
                normal,
            }]
        }
        (_, Collider::Sphere(_)) => {
            let point2 = support_point(collider2, -normal);
            vec![Contact {
                point1: point2 + normal * penetration,
                point2,
                normal,
            }]
        }
        (Collider::Hull(hull1), Collider::Hull(hull2)) => hull_contacts(hull1, hull2, normal),
    };
    Ok(contacts)
}

/// Analytic contact between two spheres, `None` when they do not overlap
pub fn sphere_sphere_contact(sphere1: &Sphere, sphere2: &Sphere) -> Option<Contact> {
    let offset = sphere2.center - sphere1.center;
    let min_distance = sphere1.radius + sphere2.radius;
    let distance_sq = offset.length_squared();
    if distance_sq >= min_distance * min_distance {
        return None;
    }
    // Concentric spheres have no preferred direction
    let normal = offset.try_normalize().unwrap_or(DVec3::Z);
    let penetration = min_distance - distance_sq.sqrt();
    let point1 = sphere1.center + normal * sphere1.radius;
    Some(Contact {
        point1,
        point2: point1 - normal * penetration,
        normal,
    })
}

fn hull_contacts(hull1: &ConvexHull, hull2: &ConvexHull, normal: DVec3) -> Vec<Contact> {
    let inverted = -normal;
    let support1 = support_index(hull1, normal);
    let support2 = support_index(hull2, inverted);
    let face1 = best_face(hull1, support1, normal);
    let face2 = best_face(hull2, support2, inverted);

    let face1_dot = hull1.world_normal(face1).dot(normal);
    let face2_dot = hull2.world_normal(face2).dot(inverted);

    let mut contacts = Vec::new();
    if let Some(edges) = best_edges(hull1, hull2, support1, support2, normal) {
        if edges.dot > face1_dot + EDGE_BIAS && edges.dot > face2_dot + EDGE_BIAS {
            if let Some(contact) = edge_contact(hull1, hull2, &edges, normal) {
                contacts.push(contact);
                return contacts;
            }
            tracing::debug!("parallel contact edges, using face contact");
        }
    }

    let face1_is_reference = face1_dot > face2_dot;
    let (reference_hull, reference_face, incident) = if face1_is_reference {
        (hull1, face1, hull2.world_face(face2))
    } else {
        (hull2, face2, hull1.world_face(face1))
    };

    let side_planes: Vec<Plane> = reference_hull
        .face_neighbors(reference_face)
        .iter()
        .map(|&f| {
            let point = reference_hull.world_face(f)[0];
            Plane::new(-reference_hull.world_normal(f), point)
        })
        .collect();
    let clipped = if side_planes.is_empty() {
        incident
    } else {
        sutherland_hodgman(&incident, &side_planes, false)
    };

    let reference_plane = Plane::new(
        -reference_hull.world_normal(reference_face),
        reference_hull.world_face(reference_face)[0],
    );
    for point in sutherland_hodgman(&clipped, &[reference_plane], true) {
        let diff = point - reference_plane.project(point);
        let (penetration, contact) = if face1_is_reference {
            let penetration = diff.dot(normal);
            (
                penetration,
                Contact {
                    point1: point - normal * penetration,
                    point2: point,
                    normal,
                },
            )
        } else {
            let penetration = -diff.dot(normal);
            (
                penetration,
                Contact {
                    point1: point,
                    point2: point + normal * penetration,
                    normal,
                },
            )
        };
        if penetration < 0.0 {
            contacts.push(contact);
        }
    }

    if contacts.is_empty() {
        tracing::debug!("hull contact manifold found no intersection");
    }
    contacts
}

/// Face at `vertex` whose world normal best matches `direction`
fn best_face(hull: &ConvexHull, vertex: u32, direction: DVec3) -> u32 {
    let mut selected = 0;
    let mut max_dot = f64::MIN;
    for &face in hull.vertex_faces(vertex) {
        let dot = hull.world_normal(face).dot(direction);
        if dot > max_dot {
            max_dot = dot;
            selected = face;
        }
    }
    selected
}

#[derive(Debug)]
struct EdgePair {
    /// Vertex pair on the first hull
    edge1: (u32, u32),
    /// Vertex pair on the second hull
    edge2: (u32, u32),
    dot: f64,
}

/// Edge pair at the support vertices whose cross product best matches `normal`
fn best_edges(
    hull1: &ConvexHull,
    hull2: &ConvexHull,
    support1: u32,
    support2: u32,
    normal: DVec3,
) -> Option<EdgePair> {
    let s1 = hull1.world_vertices()[support1 as usize];
    let s2 = hull2.world_vertices()[support2 as usize];

    let mut best: Option<EdgePair> = None;
    for &n1 in hull1.vertex_neighbors(support1) {
        let edge1 = s1 - hull1.world_vertices()[n1 as usize];
        for &n2 in hull2.vertex_neighbors(support2) {
            let edge2 = s2 - hull2.world_vertices()[n2 as usize];
            let cross = edge1.cross(edge2);
            if cross.length() <= PARALLEL_EPSILON * edge1.length() * edge2.length() {
                continue;
            }
            let Some(axis) = cross.try_normalize() else {
                continue;
            };
            // Either orientation of the cross product may face the normal
            let dot = axis.dot(normal).abs();
            if best.as_ref().map_or(true, |b| dot > b.dot) {
                best = Some(EdgePair {
                    edge1: (support1, n1),
                    edge2: (support2, n2),
                    dot,
                });
            }
        }
    }
    best
}

fn edge_contact(
    hull1: &ConvexHull,
    hull2: &ConvexHull,
    edges: &EdgePair,
    normal: DVec3,
) -> Option<Contact> {
    let p1 = hull1.world_vertices()[edges.edge1.0 as usize];
    let d1 = hull1.world_vertices()[edges.edge1.1 as usize] - p1;
    let p2 = hull2.world_vertices()[edges.edge2.0 as usize];
    let d2 = hull2.world_vertices()[edges.edge2.1 as usize] - p2;

    let (point1, point2) = closest_points_on_lines(p1, d1, p2, d2)?;
    Some(Contact {
        point1,
        point2,
        normal,
    })
}

/// Closest points between the lines `p1 + s*d1` and `p2 + t*d2`
///
/// Returns `None` when the lines are parallel or too close to it for the
/// solve to be trusted.
pub fn closest_points_on_lines(
    p1: DVec3,
    d1: DVec3,
    p2: DVec3,
    d2: DVec3,
) -> Option<(DVec3, DVec3)> {
    let n1 = d1.dot(d2);
    let n2 = d2.dot(d2);
    let m1 = -d1.dot(d1);
    let m2 = -d2.dot(d1);
    let r1 = d1.dot(p1 - p2);
    let r2 = d2.dot(p1 - p2);

    let det = n1 * m2 - n2 * m1;
    if det.abs() <= PARALLEL_EPSILON * d1.length_squared() * d2.length_squared() {
        return None;
    }
    let t = (r1 * m2 - r2 * m1) / det;
    let s = (n1 * r2 - n2 * r1) / det;
    Some((p1 + d1 * s, p2 + d2 * t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;
    use std::f64::consts::FRAC_PI_4;

    fn cube_at(z: f64) -> Collider {
        let mut cube = Collider::cuboid(DVec3::splat(0.5));
        cube.update(DVec3::new(0.0, 0.0, z), DQuat::IDENTITY);
        cube
    }

    #[test]
    fn test_stacked_cubes_face_contact() {
        let depth = 0.1;
        let lower = cube_at(0.0);
        let upper = cube_at(1.0 - depth);

        let contacts = contacts(&lower, &upper, DVec3::Z, depth);
        assert_eq!(contacts.len(), 4);
        for c in &contacts {
            assert!((c.penetration() + depth).abs() < 1e-9);
            assert!((c.point1.z - 0.5).abs() < 1e-9);
            assert!((c.point2.z - (0.5 - depth)).abs() < 1e-9);
            assert!((c.point1.x.abs() - 0.5).abs() < 1e-9);
            assert!((c.point1.y.abs() - 0.5).abs() < 1e-9);
            assert_eq!(c.normal, DVec3::Z);
        }
    }

    #[test]
    fn test_offset_cubes_are_clipped() {
        // Upper cube shifted half a unit along X: overlap is half the face
        let lower = cube_at(0.0);
        let mut upper = Collider::cuboid(DVec3::splat(0.5));
        upper.update(DVec3::new(0.5, 0.0, 0.95), DQuat::IDENTITY);

        let contacts = contacts(&lower, &upper, DVec3::Z, 0.05);
        assert_eq!(contacts.len(), 4);
        for c in &contacts {
            assert!(c.point1.x >= -1e-9 && c.point1.x <= 0.5 + 1e-9);
            assert!((c.penetration() + 0.05).abs() < 1e-9);
        }
    }

    #[test]
    fn test_crossed_edges_contact() {
        // Two cubes balanced on perpendicular edges
        let ridge = 0.5 * 2f64.sqrt();
        let mut lower = Collider::cuboid(DVec3::splat(0.5));
        lower.update(DVec3::ZERO, DQuat::from_rotation_y(FRAC_PI_4));
        let mut upper = Collider::cuboid(DVec3::splat(0.5));
        let gap = 2.0 * ridge - 0.1;
        upper.update(DVec3::new(0.0, 0.0, gap), DQuat::from_rotation_x(FRAC_PI_4));

        let contacts = contacts(&lower, &upper, DVec3::Z, 0.1);
        assert_eq!(contacts.len(), 1);
        let c = contacts[0];
        assert!((c.point1 - DVec3::new(0.0, 0.0, ridge)).length() < 1e-9);
        assert!((c.point2 - DVec3::new(0.0, 0.0, gap - ridge)).length() < 1e-9);
    }

    #[test]
    fn test_sphere_resting_on_cube() {
        let (radius, distance) = (1.0, 0.25);
        let cube = cube_at(0.0);
        let mut sphere = Collider::sphere(radius);
        sphere.update(DVec3::new(0.1, 0.2, 0.5 + distance), DQuat::IDENTITY);

        let contacts = contacts(&cube, &sphere, DVec3::Z, radius - distance);
        assert_eq!(contacts.len(), 1);
        let c = contacts[0];
        assert!((c.point1 - DVec3::new(0.1, 0.2, 0.5)).length() < 1e-12);
        assert!((c.point2 - DVec3::new(0.1, 0.2, 0.5 + distance - radius)).length() < 1e-12);
        assert!((c.penetration() + (radius - distance)).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_as_first_collider() {
        let mut sphere = Collider::sphere(1.0);
        sphere.update(DVec3::ZERO, DQuat::IDENTITY);
        let cube = cube_at(1.3);

        let contacts = contacts(&sphere, &cube, DVec3::Z, 0.2);
        assert_eq!(contacts.len(), 1);
        assert!((contacts[0].point1 - DVec3::Z).length() < 1e-12);
        assert!((contacts[0].point2 - DVec3::new(0.0, 0.0, 0.8)).length() < 1e-12);
    }

    #[test]
    fn test_sphere_pair() {
        let mut a = Sphere::new(1.0);
        let mut b = Sphere::new(1.0);
        b.center = DVec3::new(1.5, 0.0, 0.0);

        let c = sphere_sphere_contact(&a, &b).unwrap();
        assert_eq!(c.normal, DVec3::X);
        assert!((c.point1 - DVec3::X).length() < 1e-12);
        assert!((c.penetration() + 0.5).abs() < 1e-12);

        a.center = DVec3::new(-1.0, 0.0, 0.0);
        assert!(sphere_sphere_contact(&a, &b).is_none());
    }

    #[test]
    fn test_invalid_input_gives_no_contacts() {
        let a = cube_at(0.0);
        let b = cube_at(0.9);
        assert!(contacts(&a, &b, DVec3::ZERO, 0.1).is_empty());
        assert!(matches!(
            try_contacts(&a, &b, DVec3::Z, f64::NAN),
            Err(CollisionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_separated_cubes_have_no_contacts() {
        let a = cube_at(0.0);
        let b = cube_at(1.5);
        assert!(contacts(&a, &b, DVec3::Z, 0.0).is_empty());
    }

    /// Two cubes balanced ridge on ridge, the upper one twisted by `twist`
    /// about Z and nudged along X
    fn ridge_pair(twist: f64) -> (Collider, Collider) {
        let ridge = 0.5 * 2f64.sqrt();
        let mut lower = Collider::cuboid(DVec3::splat(0.5));
        lower.update(DVec3::ZERO, DQuat::from_rotation_y(FRAC_PI_4));
        let mut upper = Collider::cuboid(DVec3::splat(0.5));
        upper.update(
            DVec3::new(0.01, 0.0, 2.0 * ridge - 0.1),
            DQuat::from_rotation_z(twist) * DQuat::from_rotation_y(FRAC_PI_4),
        );
        (lower, upper)
    }

    fn assert_face_contacts_near_bodies(contacts: &[Contact]) {
        assert!(!contacts.is_empty());
        for c in contacts {
            for p in [c.point1, c.point2] {
                assert!(p.x.abs() < 1.0, "{p}");
                assert!(p.y.abs() < 0.5 + 1e-6, "{p}");
                assert!(p.z > -0.1 && p.z < 2.0, "{p}");
            }
            assert!(c.penetration() < 0.0);
        }
    }

    #[test]
    fn test_nearly_parallel_edges_use_face_contact() {
        let (lower, upper) = ridge_pair(1e-7);
        assert_face_contacts_near_bodies(&contacts(&lower, &upper, DVec3::Z, 0.1));
    }

    #[test]
    fn test_singular_edge_solve_falls_back_to_faces() {
        // Passes the edge selection but the closest point solve is singular
        let (lower, upper) = ridge_pair(1e-4);
        let hull1 = lower.as_hull().unwrap();
        let hull2 = upper.as_hull().unwrap();
        let support1 = support_index(hull1, DVec3::Z);
        let support2 = support_index(hull2, DVec3::NEG_Z);
        let edges = best_edges(hull1, hull2, support1, support2, DVec3::Z).unwrap();
        assert!(edges.dot > 0.99);
        assert!(edge_contact(hull1, hull2, &edges, DVec3::Z).is_none());

        assert_face_contacts_near_bodies(&contacts(&lower, &upper, DVec3::Z, 0.1));
    }

    #[test]
    fn test_parallel_lines() {
        let found = closest_points_on_lines(DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::X * 2.0);
        assert!(found.is_none());
        let skewed = DVec3::new(1.0, 1e-5, 0.0);
        assert!(closest_points_on_lines(DVec3::ZERO, DVec3::X, DVec3::Z, skewed).is_none());

        let (a, b) =
            closest_points_on_lines(DVec3::new(-1.0, 0.0, 0.0), DVec3::X, DVec3::new(0.0, -1.0, 1.0), DVec3::Y)
                .unwrap();
        assert!(a.length() < 1e-12);
        assert!((b - DVec3::Z).length() < 1e-12);
    }
}
