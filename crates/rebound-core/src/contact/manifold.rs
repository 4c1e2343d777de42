// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contact manifolds and the writer detectors fill.

use rebound_math::{Mat3, Vec3};

/// Most points a manifold holds.
pub const MAX_MANIFOLD_POINTS: usize = 4;

/// One contact point between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManifoldPoint {
    /// World position.
    pub position: Vec3,
    /// Position relative to body 1, in body 1's axes.
    pub local_point1: Vec3,
    /// Position relative to body 2, in body 2's axes.
    pub local_point2: Vec3,
    /// Unit normal pointing from shape 1 towards shape 2.
    pub normal: Vec3,
    /// Friction direction used by the last solve.
    pub tangent: Vec3,
    /// `normal × tangent`.
    pub binormal: Vec3,
    /// Signed separation; never positive.
    pub penetration: f32,
    /// Accumulated normal impulse (non-positive in this sign convention).
    pub normal_impulse: f32,
    /// Accumulated tangent impulse.
    pub tangent_impulse: f32,
    /// Accumulated binormal impulse.
    pub binormal_impulse: f32,
    /// Effective-mass denominator along the normal.
    pub normal_denominator: f32,
    /// Effective-mass denominator along the tangent.
    pub tangent_denominator: f32,
    /// Effective-mass denominator along the binormal.
    pub binormal_denominator: f32,
    /// Inherited its impulse from the previous step.
    pub warm_started: bool,
}

impl Default for ManifoldPoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            local_point1: Vec3::ZERO,
            local_point2: Vec3::ZERO,
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
            binormal: Vec3::ZERO,
            penetration: 0.0,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            binormal_impulse: 0.0,
            normal_denominator: 0.0,
            tangent_denominator: 0.0,
            binormal_denominator: 0.0,
            warm_started: false,
        }
    }
}

/// Up to four contact points for a shape pair.
#[derive(Debug, Clone, Default)]
pub struct ContactManifold {
    points: [ManifoldPoint; MAX_MANIFOLD_POINTS],
    num_points: usize,
}

impl ContactManifold {
    /// Live points.
    pub fn points(&self) -> &[ManifoldPoint] {
        &self.points[..self.num_points]
    }

    /// Live points, mutably.
    pub fn points_mut(&mut self) -> &mut [ManifoldPoint] {
        &mut self.points[..self.num_points]
    }

    /// Number of live points.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// `true` with no points.
    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    /// Drops every point.
    pub fn clear(&mut self) {
        self.num_points = 0;
    }
}

/// Pose of a body as seen by the point writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    /// Centre of mass.
    pub position: Vec3,
    /// Rotation.
    pub rotation: Mat3,
}

impl BodyFrame {
    fn local(&self, p: Vec3) -> Vec3 {
        self.rotation.transpose_mul_vec(p - self.position)
    }
}

/// Sink narrow-phase detectors write contact points into.
///
/// Normals arrive in the detector's own argument order; a flipped writer
/// negates them so the stored normal always points from the contact's first
/// shape to its second. Points with positive separation, non-finite data or
/// a degenerate normal are dropped, as are points past the fourth.
#[derive(Debug)]
pub struct ManifoldWriter<'a> {
    manifold: &'a mut ContactManifold,
    frame1: BodyFrame,
    frame2: BodyFrame,
    flip: bool,
}

impl<'a> ManifoldWriter<'a> {
    /// Writer appending to `manifold`.
    pub fn new(manifold: &'a mut ContactManifold, frame1: BodyFrame, frame2: BodyFrame, flip: bool) -> Self {
        Self { manifold, frame1, frame2, flip }
    }

    /// Whether normals are negated on the way in.
    pub fn is_flipped(&self) -> bool {
        self.flip
    }

    /// Number of points written so far.
    pub fn len(&self) -> usize {
        self.manifold.num_points
    }

    /// `true` before any point is accepted.
    pub fn is_empty(&self) -> bool {
        self.manifold.num_points == 0
    }

    /// Appends a point. Returns whether it was kept.
    pub fn add_point(&mut self, position: Vec3, normal: Vec3, penetration: f32) -> bool {
        if self.manifold.num_points >= MAX_MANIFOLD_POINTS
            || penetration > 0.0
            || !penetration.is_finite()
            || !position.is_finite()
        {
            return false;
        }
        let Some(mut normal) = normal.try_normalize() else {
            return false;
        };
        if self.flip {
            normal = -normal;
        }
        let slot = &mut self.manifold.points[self.manifold.num_points];
        *slot = ManifoldPoint {
            position,
            local_point1: self.frame1.local(position),
            local_point2: self.frame2.local(position),
            normal,
            penetration,
            ..ManifoldPoint::default()
        };
        self.manifold.num_points += 1;
        true
    }
}
