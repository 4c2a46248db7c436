//! Collider shapes
//!
//! Colliders keep their shape in local space and a world space copy that is
//! refreshed by [`Collider::update`] whenever the owning body moves. Scale is
//! not applied: a scaled body needs its collider rebuilt from scaled
//! vertices.

use crate::error::{HullError, Result};
use glam::{DQuat, DVec3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Adjacency list of vertex or face indices
pub type Adjacency = SmallVec<[u32; 8]>;

const COPLANAR_EPSILON: f64 = 1e-6;

/// A contact between two colliders
///
/// `point1` lies on the first collider and `point2` on the second, both in
/// world space. `normal` points from the first collider towards the second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub point1: DVec3,
    pub point2: DVec3,
    pub normal: DVec3,
}

impl Contact {
    /// Signed separation along the normal, negative while overlapping
    pub fn penetration(&self) -> f64 {
        (self.point2 - self.point1).dot(self.normal)
    }
}

/// Polygon face of a convex hull
#[derive(Clone, Debug, PartialEq)]
pub struct HullFace {
    /// Vertex loop, in triangle winding order
    pub elements: Vec<u32>,
    /// Outward unit normal in local space
    pub normal: DVec3,
}

/// Convex polyhedron with precomputed adjacency
#[derive(Clone, Debug)]
pub struct ConvexHull {
    vertices: Vec<DVec3>,
    world_vertices: Vec<DVec3>,
    faces: Vec<HullFace>,
    world_normals: Vec<DVec3>,
    vertex_to_faces: Vec<Adjacency>,
    vertex_to_neighbors: Vec<Adjacency>,
    face_to_neighbors: Vec<Adjacency>,
}

impl ConvexHull {
    /// Build a hull from a closed triangle mesh that is already convex
    ///
    /// Duplicate vertices are merged and coplanar neighbouring triangles are
    /// joined into polygon faces. Triangles must be wound so their normals
    /// point outwards.
    pub fn new(vertices: &[DVec3], indices: &[u32]) -> Result<Self> {
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(HullError::NotTriangles { len: indices.len() });
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(HullError::IndexOutOfRange {
                index,
                len: vertices.len(),
            });
        }

        let mut unique = Vec::new();
        let mut remap = Vec::with_capacity(vertices.len());
        let mut seen: FxHashMap<[u64; 3], u32> = FxHashMap::default();
        for &v in vertices {
            let index = *seen.entry(vertex_key(v)).or_insert_with(|| {
                unique.push(v);
                (unique.len() - 1) as u32
            });
            remap.push(index);
        }
        if unique.len() < 4 {
            return Err(HullError::TooFewVertices {
                count: unique.len(),
            });
        }

        let triangles: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|t| [remap[t[0] as usize], remap[t[1] as usize], remap[t[2] as usize]])
            .collect();
        let hull = Self::build(unique, &triangles);
        if hull.faces.is_empty() {
            return Err(HullError::NoFaces);
        }
        if let Some(&vertex) = triangles
            .iter()
            .flatten()
            .find(|&&v| hull.vertex_to_faces[v as usize].is_empty())
        {
            return Err(HullError::FacelessVertex { vertex });
        }
        Ok(hull)
    }

    /// Axis aligned box centred on the origin
    pub fn cuboid(half_extents: DVec3) -> Self {
        let h = half_extents.abs();
        let vertices = (0..8)
            .map(|i| {
                DVec3::new(
                    if i & 1 == 0 { -h.x } else { h.x },
                    if i & 2 == 0 { -h.y } else { h.y },
                    if i & 4 == 0 { -h.z } else { h.z },
                )
            })
            .collect();
        let triangles = [
            [0, 2, 3],
            [0, 3, 1],
            [4, 5, 7],
            [4, 7, 6],
            [0, 4, 6],
            [0, 6, 2],
            [1, 3, 7],
            [1, 7, 5],
            [0, 1, 5],
            [0, 5, 4],
            [2, 6, 7],
            [2, 7, 3],
        ];
        Self::build(vertices, &triangles)
    }

    fn build(vertices: Vec<DVec3>, triangles: &[[u32; 3]]) -> Self {
        let mut vertex_to_neighbors = vec![Adjacency::new(); vertices.len()];
        let mut triangle_neighbors = vec![Adjacency::new(); triangles.len()];

        for (i, tri) in triangles.iter().enumerate() {
            for (j, other) in triangles.iter().enumerate() {
                if i != j && tri.iter().any(|v| other.contains(v)) {
                    triangle_neighbors[i].push(j as u32);
                }
            }
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                push_unique(&mut vertex_to_neighbors[a as usize], b);
                push_unique(&mut vertex_to_neighbors[b as usize], a);
            }
        }

        let mut faces = Vec::new();
        let mut vertex_to_faces = vec![Adjacency::new(); vertices.len()];
        let mut processed = vec![false; triangles.len()];

        for seed in 0..triangles.len() {
            if processed[seed] {
                continue;
            }
            let Some(normal) = triangle_normal(&vertices, triangles[seed]) else {
                tracing::debug!(triangle = seed, "skipping degenerate hull triangle");
                processed[seed] = true;
                continue;
            };

            let mut planar = Vec::new();
            let mut stack = vec![seed];
            while let Some(t) = stack.pop() {
                if processed[t] {
                    continue;
                }
                let coplanar = triangle_normal(&vertices, triangles[t])
                    .is_some_and(|n| (n.dot(normal) - 1.0).abs() < COPLANAR_EPSILON);
                if coplanar {
                    processed[t] = true;
                    planar.push(triangles[t]);
                    stack.extend(triangle_neighbors[t].iter().map(|&n| n as usize));
                }
            }

            let face_index = faces.len() as u32;
            for tri in &planar {
                for &v in tri {
                    push_unique(&mut vertex_to_faces[v as usize], face_index);
                }
            }
            faces.push(HullFace {
                elements: face_loop(&planar),
                normal,
            });
        }

        let mut face_to_neighbors = vec![Adjacency::new(); faces.len()];
        for (i, face) in faces.iter().enumerate() {
            for (j, other) in faces.iter().enumerate() {
                if i != j && face.elements.iter().any(|v| other.elements.contains(v)) {
                    face_to_neighbors[i].push(j as u32);
                }
            }
        }

        let world_normals = faces.iter().map(|f| f.normal).collect();
        Self {
            world_vertices: vertices.clone(),
            vertices,
            faces,
            world_normals,
            vertex_to_faces,
            vertex_to_neighbors,
            face_to_neighbors,
        }
    }

    /// Move the world space copy to the given pose
    pub fn update(&mut self, translation: DVec3, rotation: DQuat) {
        for (world, &local) in self.world_vertices.iter_mut().zip(&self.vertices) {
            *world = rotation * local + translation;
        }
        for (world, face) in self.world_normals.iter_mut().zip(&self.faces) {
            *world = (rotation * face.normal).normalize_or_zero();
        }
    }

    /// Local space vertices
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// World space vertices
    pub fn world_vertices(&self) -> &[DVec3] {
        &self.world_vertices
    }

    pub fn faces(&self) -> &[HullFace] {
        &self.faces
    }

    /// World space normal of a face
    pub fn world_normal(&self, face: u32) -> DVec3 {
        self.world_normals[face as usize]
    }

    /// World space vertex loop of a face
    pub fn world_face(&self, face: u32) -> Vec<DVec3> {
        self.faces[face as usize]
            .elements
            .iter()
            .map(|&v| self.world_vertices[v as usize])
            .collect()
    }

    pub fn vertex_faces(&self, vertex: u32) -> &[u32] {
        &self.vertex_to_faces[vertex as usize]
    }

    pub fn vertex_neighbors(&self, vertex: u32) -> &[u32] {
        &self.vertex_to_neighbors[vertex as usize]
    }

    pub fn face_neighbors(&self, face: u32) -> &[u32] {
        &self.face_to_neighbors[face as usize]
    }

    /// Distance from the local origin to the farthest vertex
    pub fn bounding_radius(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max)
    }
}

/// Sphere collider
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub radius: f64,
    /// World space centre
    pub center: DVec3,
}

impl Sphere {
    pub fn new(radius: f64) -> Self {
        Self {
            radius: radius.abs(),
            center: DVec3::ZERO,
        }
    }
}

/// Collision shape attached to a body
#[derive(Clone, Debug)]
pub enum Collider {
    Sphere(Sphere),
    Hull(ConvexHull),
}

impl Collider {
    pub fn sphere(radius: f64) -> Self {
        Collider::Sphere(Sphere::new(radius))
    }

    /// Hull collider from a convex triangle mesh
    pub fn hull(vertices: &[DVec3], indices: &[u32]) -> Result<Self> {
        ConvexHull::new(vertices, indices).map(Collider::Hull)
    }

    pub fn cuboid(half_extents: DVec3) -> Self {
        Collider::Hull(ConvexHull::cuboid(half_extents))
    }

    /// Move the collider to a world pose
    pub fn update(&mut self, translation: DVec3, rotation: DQuat) {
        match self {
            Collider::Sphere(sphere) => sphere.center = translation,
            Collider::Hull(hull) => hull.update(translation, rotation),
        }
    }

    /// Radius of a sphere around the local origin enclosing the shape
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Collider::Sphere(sphere) => sphere.radius,
            Collider::Hull(hull) => hull.bounding_radius(),
        }
    }

    pub fn as_hull(&self) -> Option<&ConvexHull> {
        match self {
            Collider::Hull(hull) => Some(hull),
            Collider::Sphere(_) => None,
        }
    }

    pub fn as_sphere(&self) -> Option<&Sphere> {
        match self {
            Collider::Sphere(sphere) => Some(sphere),
            Collider::Hull(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Collider::Sphere(_) => "sphere",
            Collider::Hull(_) => "hull",
        }
    }
}

fn vertex_key(v: DVec3) -> [u64; 3] {
    // Adding zero folds -0.0 into 0.0
    let v = v + DVec3::ZERO;
    [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
}

fn push_unique(list: &mut Adjacency, value: u32) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn triangle_normal(vertices: &[DVec3], [a, b, c]: [u32; 3]) -> Option<DVec3> {
    let a = vertices[a as usize];
    let ab = vertices[b as usize] - a;
    let ac = vertices[c as usize] - a;
    ab.cross(ac).try_normalize()
}

/// Ordered boundary loop of a set of coplanar triangles
fn face_loop(triangles: &[[u32; 3]]) -> Vec<u32> {
    let mut edges: Vec<(u32, u32)> = Vec::new();
    for tri in triangles {
        for k in 0..3 {
            let edge = (tri[k], tri[(k + 1) % 3]);
            let shared = edges
                .iter()
                .position(|&(a, b)| (a, b) == edge || (b, a) == edge);
            match shared {
                Some(pos) => {
                    edges.swap_remove(pos);
                }
                None => edges.push(edge),
            }
        }
    }
    if edges.is_empty() {
        return Vec::new();
    }

    let mut ordered = vec![edges.swap_remove(0)];
    while !edges.is_empty() {
        let tail = ordered[ordered.len() - 1].1;
        let Some(pos) = edges.iter().position(|&(a, b)| a == tail || b == tail) else {
            tracing::warn!(remaining = edges.len(), "hull face boundary is not a single loop");
            break;
        };
        let (a, b) = edges.swap_remove(pos);
        ordered.push(if a == tail { (a, b) } else { (b, a) });
    }
    ordered.into_iter().map(|(a, _)| a).collect()
}
