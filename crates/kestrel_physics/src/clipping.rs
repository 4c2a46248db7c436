//! Sutherland-Hodgman polygon clipping
//!
//! A point is inside a plane when it lies on the side its normal points to,
//! boundary included.

use glam::DVec3;

const PARALLEL_EPSILON: f64 = 1e-6;

/// Plane through `point` facing `normal`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub point: DVec3,
}

impl Plane {
    pub fn new(normal: DVec3, point: DVec3) -> Self {
        Self { normal, point }
    }

    /// Signed offset term of the plane equation `n.x + d = 0`
    pub fn offset(&self) -> f64 {
        -self.normal.dot(self.point)
    }

    pub fn contains(&self, position: DVec3) -> bool {
        position.dot(self.normal) + self.offset() >= 0.0
    }

    /// Point where the segment `start..end` crosses the plane
    ///
    /// Returns `None` for segments parallel to the plane. The crossing is
    /// clamped to the segment to absorb error from nearly parallel edges.
    pub fn intersect_edge(&self, start: DVec3, end: DVec3) -> Option<DVec3> {
        let ab = end - start;
        let ab_p = self.normal.dot(ab);
        if ab_p.abs() <= PARALLEL_EPSILON {
            return None;
        }
        let on_plane = self.normal * -self.offset();
        let factor = (-self.normal.dot(start - on_plane) / ab_p).clamp(0.0, 1.0);
        Some(start + ab * factor)
    }

    /// Orthogonal projection of `position` onto the plane
    pub fn project(&self, position: DVec3) -> DVec3 {
        position - self.normal * (self.normal.dot(position) + self.offset())
    }
}

/// Clip a convex polygon against every plane in turn
///
/// With `remove` set, vertices outside a plane are dropped instead of being
/// cut back to the plane. Clipping against an empty plane list is a caller
/// error and yields an empty polygon.
pub fn sutherland_hodgman(polygon: &[DVec3], planes: &[Plane], remove: bool) -> Vec<DVec3> {
    if planes.is_empty() {
        tracing::error!("polygon clipping called without clip planes");
        return Vec::new();
    }

    let mut input = polygon.to_vec();
    let mut output = Vec::with_capacity(polygon.len() + planes.len());

    for plane in planes {
        let Some(&last) = input.last() else {
            break;
        };
        let mut start = last;
        for &end in &input {
            let start_in = plane.contains(start);
            let end_in = plane.contains(end);

            if remove {
                if end_in {
                    output.push(end);
                }
            } else {
                match (start_in, end_in) {
                    (true, true) => output.push(end),
                    (true, false) => output.extend(plane.intersect_edge(start, end)),
                    (false, true) => {
                        output.extend(plane.intersect_edge(start, end));
                        output.push(end);
                    }
                    (false, false) => {}
                }
            }
            start = end;
        }
        std::mem::swap(&mut input, &mut output);
        output.clear();
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<DVec3> {
        vec![
            DVec3::new(-size, -size, 0.0),
            DVec3::new(size, -size, 0.0),
            DVec3::new(size, size, 0.0),
            DVec3::new(-size, size, 0.0),
        ]
    }

    #[test]
    fn test_plane_queries() {
        let plane = Plane::new(DVec3::Z, DVec3::new(0.0, 0.0, 1.0));
        assert!(plane.contains(DVec3::new(3.0, 3.0, 1.0)));
        assert!(plane.contains(DVec3::new(0.0, 0.0, 2.0)));
        assert!(!plane.contains(DVec3::ZERO));

        let hit = plane
            .intersect_edge(DVec3::ZERO, DVec3::new(0.0, 0.0, 4.0))
            .unwrap();
        assert!((hit - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
        assert!(plane.intersect_edge(DVec3::ZERO, DVec3::X).is_none());

        let projected = plane.project(DVec3::new(2.0, -1.0, 5.0));
        assert!((projected - DVec3::new(2.0, -1.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_clip_square_in_half() {
        let keep_right = Plane::new(DVec3::X, DVec3::ZERO);
        let clipped = sutherland_hodgman(&square(1.0), &[keep_right], false);

        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.x >= -1e-12));
        assert!(clipped.iter().any(|p| p.x.abs() < 1e-12 && p.y > 0.0));
        assert!(clipped.iter().any(|p| p.x.abs() < 1e-12 && p.y < 0.0));
    }

    #[test]
    fn test_clip_to_box() {
        // Large square clipped by the four sides of a smaller one
        let planes = [
            Plane::new(DVec3::X, DVec3::new(-0.5, 0.0, 0.0)),
            Plane::new(DVec3::NEG_X, DVec3::new(0.5, 0.0, 0.0)),
            Plane::new(DVec3::Y, DVec3::new(0.0, -0.5, 0.0)),
            Plane::new(DVec3::NEG_Y, DVec3::new(0.0, 0.5, 0.0)),
        ];
        let clipped = sutherland_hodgman(&square(2.0), &planes, false);
        assert_eq!(clipped.len(), 4);
        for p in &clipped {
            assert!((p.x.abs() - 0.5).abs() < 1e-12);
            assert!((p.y.abs() - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_remove_mode_drops_outside_points() {
        let mut polygon = square(1.0);
        polygon[0].z = -1.0;
        polygon[1].z = -1.0;

        let plane = Plane::new(DVec3::Z, DVec3::ZERO);
        let kept = sutherland_hodgman(&polygon, &[plane], true);
        assert_eq!(kept, vec![polygon[2], polygon[3]]);

        let everything_out = Plane::new(DVec3::Z, DVec3::new(0.0, 0.0, 5.0));
        assert!(sutherland_hodgman(&polygon, &[everything_out, plane], true).is_empty());
    }

    #[test]
    fn test_no_planes() {
        assert!(sutherland_hodgman(&square(1.0), &[], false).is_empty());
    }
}
