// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Convex polytope contacts: separating-axis test, reference-face clipping
//! and manifold reduction.
//!
//! Boxes and tetrahedra are exact; cylinders are approximated by a prism over
//! a regular [`CYLINDER_SEGMENTS`]-gon.

use core::f32::consts::TAU;

use rebound_math::Vec3;

use super::closest::closest_points_on_segments;
use crate::contact::manifold::{ManifoldWriter, MAX_MANIFOLD_POINTS};
use crate::shape::{Shape, ShapeKind};

/// Sides of the polygon standing in for a cylinder cross-section.
pub const CYLINDER_SEGMENTS: usize = 16;

const PARALLEL_SQ: f32 = 1e-6;
const FACE_B_RELATIVE: f32 = 0.98;
const FACE_B_ABSOLUTE: f32 = 0.001;
const EDGE_RELATIVE: f32 = 0.95;
const EDGE_ABSOLUTE: f32 = 0.01;

#[derive(Debug, Clone)]
struct Face {
    /// Vertex indices in perimeter order.
    indices: Vec<usize>,
    /// Outward unit normal.
    normal: Vec3,
}

/// World-space convex polytope.
#[derive(Debug, Clone)]
pub(crate) struct Polytope {
    center: Vec3,
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    edges: Vec<(usize, usize)>,
    edge_dirs: Vec<Vec3>,
}

impl Polytope {
    /// Polytope for a box, cylinder or tetrahedron in its world pose.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn from_shape(shape: &Shape) -> Option<Self> {
        let pose = shape.world_transform();
        let rot = pose.rotation();
        match *shape.kind() {
            ShapeKind::Box { half_extents: h } => {
                let vertices = (0..8)
                    .map(|i| {
                        let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
                        pose.apply_point(Vec3::new(sign(1) * h.x(), sign(2) * h.y(), sign(4) * h.z()))
                    })
                    .collect();
                let axes = [rot.column(0), rot.column(1), rot.column(2)];
                let faces = vec![
                    Face { indices: vec![0, 2, 6, 4], normal: -axes[0] },
                    Face { indices: vec![1, 3, 7, 5], normal: axes[0] },
                    Face { indices: vec![0, 1, 5, 4], normal: -axes[1] },
                    Face { indices: vec![2, 3, 7, 6], normal: axes[1] },
                    Face { indices: vec![0, 1, 3, 2], normal: -axes[2] },
                    Face { indices: vec![4, 5, 7, 6], normal: axes[2] },
                ];
                let mut edges = Vec::with_capacity(12);
                for bit in [1_usize, 2, 4] {
                    edges.extend((0..8).filter(|i| i & bit == 0).map(|i| (i, i | bit)));
                }
                Some(Self {
                    center: pose.translation(),
                    vertices,
                    faces,
                    edges,
                    edge_dirs: axes.to_vec(),
                })
            }
            ShapeKind::Cylinder { radius, half_height } => {
                let n = CYLINDER_SEGMENTS;
                let ring = |k: usize| {
                    let theta = TAU * k as f32 / n as f32;
                    (theta.cos() * radius, theta.sin() * radius)
                };
                let mut vertices = Vec::with_capacity(2 * n);
                for y in [half_height, -half_height] {
                    for k in 0..n {
                        let (x, z) = ring(k);
                        vertices.push(pose.apply_point(Vec3::new(x, y, z)));
                    }
                }
                let axis = rot.column(1);
                let mut faces = Vec::with_capacity(n + 2);
                faces.push(Face { indices: (0..n).collect(), normal: axis });
                faces.push(Face { indices: (n..2 * n).rev().collect(), normal: -axis });
                let mut edges = Vec::with_capacity(3 * n);
                let mut edge_dirs = vec![axis];
                for k in 0..n {
                    let next = (k + 1) % n;
                    let mid = (vertices[k] + vertices[next]).scale(0.5) - pose.translation();
                    let outward = (mid - axis.scale(mid.dot(&axis))).try_normalize().unwrap_or(Vec3::ZERO);
                    faces.push(Face { indices: vec![k, next, n + next, n + k], normal: outward });
                    edges.push((k, next));
                    edges.push((n + k, n + next));
                    edges.push((k, n + k));
                    if k < n / 2 {
                        if let Some(dir) = (vertices[next] - vertices[k]).try_normalize() {
                            edge_dirs.push(dir);
                        }
                    }
                }
                Some(Self {
                    center: pose.translation(),
                    vertices,
                    faces,
                    edges,
                    edge_dirs,
                })
            }
            ShapeKind::Tetra { vertices: local } => {
                let vertices: Vec<Vec3> = local.iter().map(|v| pose.apply_point(*v)).collect();
                let center = pose.translation();
                let faces = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]
                    .iter()
                    .filter_map(|&[i, j, k]| {
                        let n = (vertices[j] - vertices[i])
                            .cross(&(vertices[k] - vertices[i]))
                            .try_normalize()?;
                        Some(if n.dot(&(vertices[i] - center)) < 0.0 {
                            Face { indices: vec![i, k, j], normal: -n }
                        } else {
                            Face { indices: vec![i, j, k], normal: n }
                        })
                    })
                    .collect();
                let edges = vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
                let edge_dirs = edges
                    .iter()
                    .filter_map(|&(i, j)| (vertices[j] - vertices[i]).try_normalize())
                    .collect();
                Some(Self { center, vertices, faces, edges, edge_dirs })
            }
            _ => None,
        }
    }

    /// World vertices.
    pub(crate) fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    fn min_along(&self, axis: Vec3) -> f32 {
        self.vertices.iter().map(|v| v.dot(&axis)).fold(f32::INFINITY, f32::min)
    }

    fn max_along(&self, axis: Vec3) -> f32 {
        self.vertices.iter().map(|v| v.dot(&axis)).fold(f32::NEG_INFINITY, f32::max)
    }

    fn face_polygon(&self, face: &Face) -> Vec<Vec3> {
        face.indices.iter().map(|&i| self.vertices[i]).collect()
    }

    /// Edge parallel to `dir` that lies furthest along `axis`
    /// (or least far, when `furthest` is false).
    fn support_edge(&self, dir: Vec3, axis: Vec3, furthest: bool) -> Option<(Vec3, Vec3)> {
        let mut best: Option<(f32, (Vec3, Vec3))> = None;
        for &(i, j) in &self.edges {
            let (p, q) = (self.vertices[i], self.vertices[j]);
            let Some(d) = (q - p).try_normalize() else { continue };
            if d.dot(&dir).abs() < 0.999 {
                continue;
            }
            let score = (p + q).scale(0.5).dot(&axis);
            let score = if furthest { score } else { -score };
            if best.is_none_or(|(s, _)| score > s) {
                best = Some((score, (p, q)));
            }
        }
        best.map(|(_, e)| e)
    }
}

#[derive(Debug, Clone, Copy)]
enum Feature {
    FaceA(usize),
    FaceB(usize),
    Edge { axis: Vec3, dir_a: Vec3, dir_b: Vec3 },
}

/// Polytope-vs-polytope detector for boxes, cylinders and tetrahedra.
pub(crate) fn polytope_polytope(s1: &Shape, s2: &Shape, out: &mut ManifoldWriter<'_>) {
    if let (Some(a), Some(b)) = (Polytope::from_shape(s1), Polytope::from_shape(s2)) {
        collide(&a, &b, out);
    }
}

/// Finds the axis of least penetration (or a separating axis) and emits the
/// corresponding contact points. Normals point from `a` to `b`.
fn collide(a: &Polytope, b: &Polytope, out: &mut ManifoldWriter<'_>) {
    let mut best_a = (f32::NEG_INFINITY, 0);
    for (i, face) in a.faces.iter().enumerate() {
        let sep = b.min_along(face.normal) - a.max_along(face.normal);
        if sep > 0.0 {
            return;
        }
        if sep > best_a.0 {
            best_a = (sep, i);
        }
    }
    let mut best_b = (f32::NEG_INFINITY, 0);
    for (i, face) in b.faces.iter().enumerate() {
        let sep = a.min_along(face.normal) - b.max_along(face.normal);
        if sep > 0.0 {
            return;
        }
        if sep > best_b.0 {
            best_b = (sep, i);
        }
    }
    let (mut best_sep, mut feature) = if best_b.0 > FACE_B_RELATIVE * best_a.0 + FACE_B_ABSOLUTE {
        (best_b.0, Feature::FaceB(best_b.1))
    } else {
        (best_a.0, Feature::FaceA(best_a.1))
    };

    let center_dir = b.center - a.center;
    let face_sep = best_sep;
    for &dir_a in &a.edge_dirs {
        for &dir_b in &b.edge_dirs {
            let c = dir_a.cross(&dir_b);
            if c.length_squared() < PARALLEL_SQ {
                continue;
            }
            let mut axis = c.normalize();
            if axis.dot(&center_dir) < 0.0 {
                axis = -axis;
            }
            let sep = b.min_along(axis) - a.max_along(axis);
            if sep > 0.0 {
                return;
            }
            if sep > EDGE_RELATIVE * face_sep + EDGE_ABSOLUTE && sep > best_sep {
                best_sep = sep;
                feature = Feature::Edge { axis, dir_a, dir_b };
            }
        }
    }

    match feature {
        Feature::FaceA(i) => face_contact(a, &a.faces[i], b, true, out),
        Feature::FaceB(i) => face_contact(b, &b.faces[i], a, false, out),
        Feature::Edge { axis, dir_a, dir_b } => {
            let edges = a.support_edge(dir_a, axis, true).zip(b.support_edge(dir_b, axis, false));
            if let Some(((p1, q1), (p2, q2))) = edges {
                let (c1, c2) = closest_points_on_segments(p1, q1, p2, q2);
                out.add_point((c1 + c2).scale(0.5), axis, best_sep);
            }
        }
    }
}

/// Clips the most anti-parallel face of `incident` against `reference_face`.
#[allow(clippy::cast_precision_loss)]
fn face_contact(
    reference: &Polytope,
    reference_face: &Face,
    incident: &Polytope,
    reference_is_first: bool,
    out: &mut ManifoldWriter<'_>,
) {
    let ref_n = reference_face.normal;
    let Some(incident_face) = incident
        .faces
        .iter()
        .min_by(|x, y| x.normal.dot(&ref_n).total_cmp(&y.normal.dot(&ref_n)))
    else {
        return;
    };

    let ref_poly = reference.face_polygon(reference_face);
    let Some(&ref_origin) = ref_poly.first() else { return };
    let centroid = ref_poly.iter().fold(Vec3::ZERO, |acc, p| acc + *p).scale(1.0 / ref_poly.len() as f32);

    let mut poly = incident.face_polygon(incident_face);
    for (k, &v) in ref_poly.iter().enumerate() {
        let next = ref_poly[(k + 1) % ref_poly.len()];
        let Some(mut side) = (next - v).cross(&ref_n).try_normalize() else { continue };
        if (centroid - v).dot(&side) > 0.0 {
            side = -side;
        }
        poly = clip_polygon(&poly, side, v);
        if poly.is_empty() {
            return;
        }
    }

    let offset = ref_n.dot(&ref_origin);
    let normal = if reference_is_first { ref_n } else { -ref_n };
    let mut points: Vec<(Vec3, f32)> = poly
        .into_iter()
        .filter_map(|p| {
            let depth = ref_n.dot(&p) - offset;
            (depth <= 0.0).then(|| (p - ref_n.scale(depth * 0.5), depth))
        })
        .collect();
    reduce_to_four(&mut points, ref_n);
    for (p, depth) in points {
        out.add_point(p, normal, depth);
    }
}

/// Sutherland–Hodgman against one plane; keeps `(p − origin)·n ≤ 0`.
fn clip_polygon(poly: &[Vec3], n: Vec3, origin: Vec3) -> Vec<Vec3> {
    let mut out = Vec::with_capacity(poly.len() + 1);
    for (i, &a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        let da = (a - origin).dot(&n);
        let db = (b - origin).dot(&n);
        if da <= 0.0 {
            out.push(a);
        }
        if (da < 0.0 && db > 0.0) || (da > 0.0 && db < 0.0) {
            out.push(a + (b - a).scale(da / (da - db)));
        }
    }
    out
}

/// Keeps at most four well-spread points: the deepest, the one furthest
/// from it, the one maximising triangle area, then the one furthest from
/// the triangle's vertices.
pub(crate) fn reduce_to_four(points: &mut Vec<(Vec3, f32)>, normal: Vec3) {
    if points.len() <= MAX_MANIFOLD_POINTS {
        return;
    }
    let pick = |pts: &[(Vec3, f32)], taken: &[usize], score: &dyn Fn(Vec3) -> f32| {
        pts.iter()
            .enumerate()
            .filter(|(i, _)| !taken.contains(i))
            .max_by(|(_, x), (_, y)| score(x.0).total_cmp(&score(y.0)))
            .map(|(i, _)| i)
    };
    let Some(deepest) = points
        .iter()
        .enumerate()
        .min_by(|(_, x), (_, y)| x.1.total_cmp(&y.1))
        .map(|(i, _)| i)
    else {
        return;
    };
    let mut taken = vec![deepest];
    let p0 = points[taken[0]].0;
    if let Some(i) = pick(points, &taken, &|q| q.distance_squared(&p0)) {
        taken.push(i);
    }
    let p1 = points[taken[1]].0;
    if let Some(i) = pick(points, &taken, &|q| (p1 - p0).cross(&(q - p0)).dot(&normal).abs()) {
        taken.push(i);
    }
    let p2 = points[taken[2]].0;
    if let Some(i) = pick(points, &taken, &|q| {
        q.distance_squared(&p0).min(q.distance_squared(&p1)).min(q.distance_squared(&p2))
    }) {
        taken.push(i);
    }
    *points = taken.into_iter().map(|i| points[i]).collect();
}
