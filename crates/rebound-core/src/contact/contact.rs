// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use rebound_math::Vec3;

use super::manifold::{BodyFrame, ContactManifold, ManifoldWriter, MAX_MANIFOLD_POINTS};
use super::solver::ContactSolver;
use super::ContactId;
use crate::arena::{BodyHandle, ShapeHandle};
use crate::config::ContactConfig;
use crate::constraint::{BodySet, Constraint, StepContext};
use crate::narrowphase::Detector;
use crate::shape::{Material, Shape};

/// Local anchors and impulse of a point from the previous step.
#[derive(Debug, Clone, Copy, Default)]
struct ImpulseBuffer {
    local_point1: Vec3,
    local_point2: Vec3,
    impulse: f32,
}

/// A pair of shapes whose bounds overlap, with its manifold and solver.
#[derive(Debug, Clone)]
pub struct Contact {
    id: ContactId,
    shape1: ShapeHandle,
    shape2: ShapeHandle,
    body1: BodyHandle,
    body2: BodyHandle,
    detector: Detector,
    manifold: ContactManifold,
    buffer: [ImpulseBuffer; MAX_MANIFOLD_POINTS],
    solver: ContactSolver,
    touching: bool,
    close: bool,
    dist: f32,
    pub(crate) persisting: bool,
    pub(crate) added_to_island: bool,
}

/// Geometric mean, used to mix friction and restitution.
fn mix(a: f32, b: f32) -> f32 {
    (a * b).max(0.0).sqrt()
}

impl Contact {
    /// Fresh contact between two shapes.
    pub(crate) fn new(id: ContactId, s1: &Shape, s2: &Shape, detector: Detector) -> Self {
        Self {
            id,
            shape1: s1.handle(),
            shape2: s2.handle(),
            body1: s1.body(),
            body2: s2.body(),
            detector,
            manifold: ContactManifold::default(),
            buffer: [ImpulseBuffer::default(); MAX_MANIFOLD_POINTS],
            solver: ContactSolver::default(),
            touching: false,
            close: false,
            dist: f32::INFINITY,
            persisting: false,
            added_to_island: false,
        }
    }

    /// Pool slot of this contact.
    pub fn id(&self) -> ContactId {
        self.id
    }

    /// First shape.
    pub fn shape1(&self) -> ShapeHandle {
        self.shape1
    }

    /// Second shape.
    pub fn shape2(&self) -> ShapeHandle {
        self.shape2
    }

    /// Owner of the first shape.
    pub fn body1(&self) -> BodyHandle {
        self.body1
    }

    /// Owner of the second shape.
    pub fn body2(&self) -> BodyHandle {
        self.body2
    }

    /// `true` if the contact joins `a` and `b` in either order.
    pub fn connects(&self, a: ShapeHandle, b: ShapeHandle) -> bool {
        (self.shape1 == a && self.shape2 == b) || (self.shape1 == b && self.shape2 == a)
    }

    /// The shape on the other side from `shape`.
    pub fn other_shape(&self, shape: ShapeHandle) -> ShapeHandle {
        if self.shape1 == shape { self.shape2 } else { self.shape1 }
    }

    /// The body on the other side from `body`.
    pub fn other_body(&self, body: BodyHandle) -> BodyHandle {
        if self.body1 == body { self.body2 } else { self.body1 }
    }

    /// Current manifold.
    pub fn manifold(&self) -> &ContactManifold {
        &self.manifold
    }

    /// The last manifold update produced at least one point.
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// Touching for two consecutive updates, or matched almost exactly.
    pub fn is_close(&self) -> bool {
        self.close
    }

    /// Smallest squared matching distance seen while touching.
    pub fn match_distance(&self) -> f32 {
        self.dist
    }

    /// Mixed friction coefficient.
    pub fn friction(&self) -> f32 {
        self.solver.friction
    }

    /// Mixed restitution coefficient.
    pub fn restitution(&self) -> f32 {
        self.solver.restitution
    }

    /// Re-runs the detector and carries impulses over from matching points
    /// of the previous manifold.
    pub(crate) fn update_manifold(
        &mut self,
        s1: &Shape,
        s2: &Shape,
        frame1: BodyFrame,
        frame2: BodyFrame,
        cfg: &ContactConfig,
    ) {
        self.mix_materials(s1.material(), s2.material());

        let mut num_buffers = self.manifold.num_points();
        for (b, p) in self.buffer.iter_mut().zip(self.manifold.points()) {
            *b = ImpulseBuffer {
                local_point1: p.local_point1,
                local_point2: p.local_point2,
                impulse: p.normal_impulse,
            };
        }

        self.manifold.clear();
        let mut writer = ManifoldWriter::new(&mut self.manifold, frame1, frame2, self.detector.flip());
        self.detector.detect(s1, s2, &mut writer);

        if self.manifold.is_empty() {
            self.touching = false;
            self.close = false;
            self.dist = f32::INFINITY;
            return;
        }
        if self.touching || self.dist < cfg.close_threshold {
            self.close = true;
        }
        self.touching = true;

        for p in self.manifold.points_mut().iter_mut().rev() {
            let mut matched = None;
            let mut min_distance = cfg.match_threshold_sq;
            for j in (0..num_buffers).rev() {
                let b = &self.buffer[j];
                let d = b
                    .local_point1
                    .distance_squared(&p.local_point1)
                    .min(b.local_point2.distance_squared(&p.local_point2));
                if d < min_distance {
                    min_distance = d;
                    matched = Some(j);
                }
                self.dist = self.dist.min(min_distance);
            }
            if let Some(j) = matched {
                num_buffers -= 1;
                self.buffer.swap(j, num_buffers);
                p.normal_impulse = self.buffer[num_buffers].impulse;
                p.warm_started = true;
            } else {
                p.normal_impulse = 0.0;
                p.warm_started = false;
            }
        }
    }

    fn mix_materials(&mut self, m1: &Material, m2: &Material) {
        self.solver.restitution = mix(m1.restitution, m2.restitution);
        self.solver.friction = mix(m1.friction, m2.friction);
    }
}

impl Constraint for Contact {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body1, self.body2)
    }

    fn pre_solve(&mut self, bodies: &mut BodySet, ctx: &StepContext) {
        if let Some((b1, b2)) = bodies.pair_mut(self.body1, self.body2) {
            self.solver.pre_solve(&self.manifold, b1, b2, ctx);
        } else {
            self.solver.reset();
        }
    }

    fn solve(&mut self, bodies: &mut BodySet) {
        if let Some((b1, b2)) = bodies.pair_mut(self.body1, self.body2) {
            self.solver.solve(b1, b2);
        }
    }

    fn post_solve(&mut self, _bodies: &mut BodySet) {
        self.solver.post_solve(&mut self.manifold);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::arena::ArenaHandle;
    use crate::narrowphase::DetectorTable;
    use crate::shape::ShapeDesc;
    use rebound_geom::Transform;
    use rebound_math::Mat3;

    fn shape(index: u32, desc: ShapeDesc, at: Vec3) -> Shape {
        let mut s = Shape::new(
            ShapeHandle::from_parts(index, 0),
            BodyHandle::from_parts(index, 0),
            desc,
        );
        s.sync_pose(&Transform::from_translation(at), 0.005);
        s
    }

    fn frame(at: Vec3) -> BodyFrame {
        BodyFrame { position: at, rotation: Mat3::IDENTITY }
    }

    fn contact_for(a: &Shape, b: &Shape) -> Contact {
        let detector = DetectorTable::new()
            .get(a.shape_type(), b.shape_type())
            .unwrap_or_else(|| unreachable!("sphere pairs have detectors"));
        Contact::new(ContactId(0), a, b, detector)
    }

    #[test]
    fn matched_points_inherit_impulse() {
        let cfg = ContactConfig::default();
        let a = shape(0, ShapeDesc::sphere(1.0), Vec3::ZERO);
        let b = shape(1, ShapeDesc::sphere(1.0), Vec3::new(0.0, 1.9, 0.0));
        let mut c = contact_for(&a, &b);
        let (f1, f2) = (frame(a.position()), frame(b.position()));

        c.update_manifold(&a, &b, f1, f2, &cfg);
        assert!(c.is_touching());
        assert!(!c.is_close());
        assert!(!c.manifold().points()[0].warm_started);
        c.manifold.points_mut()[0].normal_impulse = -0.25;

        c.update_manifold(&a, &b, f1, f2, &cfg);
        let p = c.manifold().points()[0];
        assert!(p.warm_started);
        assert!((p.normal_impulse + 0.25).abs() < 1e-6);
        assert!(c.is_close());
        assert!(c.match_distance() < 1e-6);
    }

    #[test]
    fn separated_shapes_reset_state() {
        let cfg = ContactConfig::default();
        let a = shape(0, ShapeDesc::sphere(1.0), Vec3::ZERO);
        let near = shape(1, ShapeDesc::sphere(1.0), Vec3::new(0.0, 1.9, 0.0));
        let far = shape(1, ShapeDesc::sphere(1.0), Vec3::new(0.0, 5.0, 0.0));
        let mut c = contact_for(&a, &near);
        c.update_manifold(&a, &near, frame(a.position()), frame(near.position()), &cfg);
        c.update_manifold(&a, &far, frame(a.position()), frame(far.position()), &cfg);
        assert!(!c.is_touching());
        assert!(!c.is_close());
        assert_eq!(c.match_distance(), f32::INFINITY);
        assert!(c.manifold().is_empty());
    }

    #[test]
    fn materials_mix_geometrically() {
        let a = shape(0, ShapeDesc::sphere(1.0).with_surface(0.4, 0.1), Vec3::ZERO);
        let b = shape(1, ShapeDesc::sphere(1.0).with_surface(0.9, 0.4), Vec3::new(0.0, 1.5, 0.0));
        let mut c = contact_for(&a, &b);
        c.update_manifold(&a, &b, frame(a.position()), frame(b.position()), &ContactConfig::default());
        assert!((c.friction() - 0.6).abs() < 1e-6);
        assert!((c.restitution() - 0.2).abs() < 1e-6);
    }
}
