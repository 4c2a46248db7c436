//! Support points

use crate::collider::{Collider, ConvexHull};
use glam::DVec3;

/// Index of the world space hull vertex farthest along `direction`
///
/// Ties keep the lowest index.
pub fn support_index(hull: &ConvexHull, direction: DVec3) -> u32 {
    let mut selected = 0;
    let mut max_dot = f64::MIN;
    for (i, v) in hull.world_vertices().iter().enumerate() {
        let dot = v.dot(direction);
        if dot > max_dot {
            max_dot = dot;
            selected = i as u32;
        }
    }
    selected
}

/// World space point of the collider farthest along `direction`
pub fn support_point(collider: &Collider, direction: DVec3) -> DVec3 {
    match collider {
        Collider::Hull(hull) => hull.world_vertices()[support_index(hull, direction) as usize],
        Collider::Sphere(sphere) => sphere.center + direction.normalize_or_zero() * sphere.radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;

    #[test]
    fn test_hull_support() {
        let mut cube = Collider::cuboid(DVec3::splat(0.5));
        cube.update(DVec3::new(10.0, 0.0, 0.0), DQuat::IDENTITY);

        let p = support_point(&cube, DVec3::new(1.0, 1.0, 1.0));
        assert_eq!(p, DVec3::new(10.5, 0.5, 0.5));

        let p = support_point(&cube, DVec3::new(-1.0, -2.0, 0.5));
        assert_eq!(p, DVec3::new(9.5, -0.5, 0.5));
    }

    #[test]
    fn test_sphere_support() {
        let mut sphere = Collider::sphere(2.0);
        sphere.update(DVec3::Y, DQuat::IDENTITY);

        let p = support_point(&sphere, DVec3::new(0.0, 0.0, -5.0));
        assert!((p - DVec3::new(0.0, 1.0, -2.0)).length() < 1e-12);

        // Degenerate direction stays at the centre
        assert_eq!(support_point(&sphere, DVec3::ZERO), DVec3::Y);
    }
}
