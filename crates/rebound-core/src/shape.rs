// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collision shapes: geometry, material, filters, mass properties and
//! world-space bounds.

use core::f32::consts::PI;

use rebound_geom::{Aabb, Transform};
use rebound_math::{Mat3, Vec3, EPSILON};

use crate::arena::{BodyHandle, ShapeHandle};
use crate::contact::ContactId;

/// Geometry of a shape, in the shape's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ShapeKind {
    /// Ball of the given radius.
    Sphere {
        /// Radius in metres.
        radius: f32,
    },
    /// Box with the given half-extents along local X/Y/Z.
    Box {
        /// Half-extents in metres.
        half_extents: Vec3,
    },
    /// Solid cylinder whose axis is local Y.
    Cylinder {
        /// Radius in metres.
        radius: f32,
        /// Half of the cylinder height.
        half_height: f32,
    },
    /// Half-space bounded by a plane through the shape origin; `normal`
    /// points out of the solid side.
    Plane {
        /// Local outward normal (unit length).
        normal: Vec3,
    },
    /// Zero-radius point.
    Particle,
    /// Tetrahedron with vertices relative to its centroid.
    Tetra {
        /// The four vertices.
        vertices: [Vec3; 4],
    },
}

/// Discriminant of [`ShapeKind`], used to index the detector table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeType {
    /// [`ShapeKind::Sphere`]
    Sphere,
    /// [`ShapeKind::Box`]
    Box,
    /// [`ShapeKind::Cylinder`]
    Cylinder,
    /// [`ShapeKind::Plane`]
    Plane,
    /// [`ShapeKind::Particle`]
    Particle,
    /// [`ShapeKind::Tetra`]
    Tetra,
}

impl ShapeType {
    /// Number of shape types.
    pub const COUNT: usize = 6;

    /// Every type, in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Sphere,
        Self::Box,
        Self::Cylinder,
        Self::Plane,
        Self::Particle,
        Self::Tetra,
    ];

    /// Row/column of this type in the detector table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl ShapeKind {
    /// Discriminant.
    pub const fn shape_type(&self) -> ShapeType {
        match self {
            Self::Sphere { .. } => ShapeType::Sphere,
            Self::Box { .. } => ShapeType::Box,
            Self::Cylinder { .. } => ShapeType::Cylinder,
            Self::Plane { .. } => ShapeType::Plane,
            Self::Particle => ShapeType::Particle,
            Self::Tetra { .. } => ShapeType::Tetra,
        }
    }

    /// Volume in cubic metres. Planes and particles have none.
    pub fn volume(&self) -> f32 {
        match self {
            Self::Sphere { radius } => 4.0 / 3.0 * PI * radius * radius * radius,
            Self::Box { half_extents } => {
                8.0 * half_extents.x() * half_extents.y() * half_extents.z()
            }
            Self::Cylinder { radius, half_height } => PI * radius * radius * 2.0 * half_height,
            Self::Plane { .. } | Self::Particle => 0.0,
            Self::Tetra { vertices } => tetra_volume(vertices),
        }
    }

    /// Mass and inertia about the shape centroid, in shape-local axes.
    pub fn mass_info(&self, density: f32) -> MassInfo {
        match *self {
            Self::Sphere { radius } => {
                let mass = self.volume() * density;
                let i = 0.4 * mass * radius * radius;
                MassInfo::new(mass, Mat3::from_diagonal(Vec3::splat(i)))
            }
            Self::Box { half_extents } => {
                let mass = self.volume() * density;
                let full = half_extents.scale(2.0);
                let (w2, h2, d2) = (full.x() * full.x(), full.y() * full.y(), full.z() * full.z());
                let k = mass / 12.0;
                MassInfo::new(
                    mass,
                    Mat3::from_diagonal(Vec3::new(k * (h2 + d2), k * (w2 + d2), k * (w2 + h2))),
                )
            }
            Self::Cylinder { radius, half_height } => {
                let mass = self.volume() * density;
                let height = 2.0 * half_height;
                let r2 = radius * radius;
                let xz = mass * (0.25 * r2 + height * height / 12.0);
                let y = 0.5 * mass * r2;
                MassInfo::new(mass, Mat3::from_diagonal(Vec3::new(xz, y, xz)))
            }
            Self::Plane { .. } => MassInfo::new(density, Mat3::IDENTITY),
            Self::Particle => MassInfo::new(density, Mat3::ZERO),
            Self::Tetra { vertices } => {
                let mass = self.volume() * density;
                // Second moment about the centroid: m/20 · Σ vᵢvᵢᵀ (vertices
                // are centroid-relative so the Σv term vanishes).
                let cov = vertices
                    .iter()
                    .fold(Mat3::ZERO, |acc, v| acc + Mat3::outer(*v, *v))
                    .scale(mass / 20.0);
                let trace = cov.at(0, 0) + cov.at(1, 1) + cov.at(2, 2);
                MassInfo::new(mass, Mat3::from_diagonal(Vec3::splat(trace)) - cov)
            }
        }
    }
}

fn tetra_volume(v: &[Vec3; 4]) -> f32 {
    let a = v[1] - v[0];
    let b = v[2] - v[0];
    let c = v[3] - v[0];
    a.dot(&b.cross(&c)).abs() / 6.0
}

/// Mass and inertia tensor of one shape about its own centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassInfo {
    /// Mass in kilograms.
    pub mass: f32,
    /// Inertia tensor in shape-local axes.
    pub inertia: Mat3,
}

impl MassInfo {
    /// Bundles a mass and an inertia tensor.
    pub const fn new(mass: f32, inertia: Mat3) -> Self {
        Self { mass, inertia }
    }
}

/// Surface and bulk material.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Material {
    /// Mass per cubic metre.
    pub density: f32,
    /// Coulomb friction coefficient.
    pub friction: f32,
    /// Coefficient of restitution.
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.2,
            restitution: 0.2,
        }
    }
}

/// Collision group bit masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollisionFilter {
    /// Groups this shape belongs to.
    pub belongs_to: u32,
    /// Groups this shape collides with.
    pub collides_with: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            belongs_to: 1,
            collides_with: 0xffff_ffff,
        }
    }
}

impl CollisionFilter {
    /// Both shapes must accept each other.
    pub const fn accepts(&self, other: &Self) -> bool {
        (self.belongs_to & other.collides_with) != 0 && (other.belongs_to & self.collides_with) != 0
    }
}

/// Description of a shape to attach to a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDesc {
    /// Geometry.
    pub kind: ShapeKind,
    /// Material.
    pub material: Material,
    /// Collision filter.
    pub filter: CollisionFilter,
    /// Pose relative to the body origin.
    pub relative: Transform,
}

impl ShapeDesc {
    /// Shape of the given kind with default material and filter.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            material: Material::default(),
            filter: CollisionFilter::default(),
            relative: Transform::identity(),
        }
    }

    /// Sphere of `radius`.
    pub fn sphere(radius: f32) -> Self {
        Self::new(ShapeKind::Sphere { radius })
    }

    /// Box of full size `width × height × depth`.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::new(ShapeKind::Box {
            half_extents: Vec3::new(width, height, depth).scale(0.5),
        })
    }

    /// Cylinder of `radius` and full `height` along local Y.
    pub fn cylinder(radius: f32, height: f32) -> Self {
        Self::new(ShapeKind::Cylinder {
            radius,
            half_height: height * 0.5,
        })
    }

    /// Half-space below the plane with outward `normal` (defaults to +Y
    /// when degenerate).
    pub fn plane(normal: Vec3) -> Self {
        Self::new(ShapeKind::Plane {
            normal: normal.try_normalize().unwrap_or(Vec3::UNIT_Y),
        })
    }

    /// Point mass.
    pub fn particle() -> Self {
        Self::new(ShapeKind::Particle)
    }

    /// Tetrahedron through four body-local points.
    ///
    /// The shape origin is placed at the centroid so mass aggregation sees
    /// the true centre of mass.
    pub fn tetra(points: [Vec3; 4]) -> Self {
        let centroid = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p).scale(0.25);
        let vertices = points.map(|p| p - centroid);
        Self {
            relative: Transform::from_translation(centroid),
            ..Self::new(ShapeKind::Tetra { vertices })
        }
    }

    /// Replaces the material.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Sets the density.
    pub fn with_density(mut self, density: f32) -> Self {
        self.material.density = density;
        self
    }

    /// Sets friction and restitution.
    pub fn with_surface(mut self, friction: f32, restitution: f32) -> Self {
        self.material.friction = friction;
        self.material.restitution = restitution;
        self
    }

    /// Replaces the collision filter.
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Offsets the shape from the body origin (added to any existing offset).
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.relative
            .set_translation(self.relative.translation() + offset);
        self
    }

    /// Rotates the shape relative to the body.
    pub fn with_rotation(mut self, rotation: Mat3) -> Self {
        self.relative = Transform::new(self.relative.translation(), rotation);
        self
    }
}

/// A shape attached to a body inside a world.
#[derive(Debug, Clone)]
pub struct Shape {
    handle: ShapeHandle,
    body: BodyHandle,
    kind: ShapeKind,
    material: Material,
    filter: CollisionFilter,
    relative: Transform,
    world: Transform,
    aabb: Aabb,
    pub(crate) contacts: Vec<ContactId>,
}

impl Shape {
    pub(crate) fn new(handle: ShapeHandle, body: BodyHandle, desc: ShapeDesc) -> Self {
        Self {
            handle,
            body,
            kind: desc.kind,
            material: desc.material,
            filter: desc.filter,
            relative: desc.relative,
            world: desc.relative,
            aabb: Aabb::everything(),
            contacts: Vec::new(),
        }
    }

    /// This shape's handle.
    pub fn handle(&self) -> ShapeHandle {
        self.handle
    }

    /// Owning body.
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Geometry.
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Discriminant of the geometry.
    pub fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    /// Material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Collision filter.
    pub fn filter(&self) -> &CollisionFilter {
        &self.filter
    }

    /// Pose relative to the owning body.
    pub fn relative(&self) -> &Transform {
        &self.relative
    }

    /// World-space position of the shape origin.
    pub fn position(&self) -> Vec3 {
        self.world.translation()
    }

    /// World-space rotation.
    pub fn rotation(&self) -> Mat3 {
        self.world.rotation()
    }

    /// World pose.
    pub fn world_transform(&self) -> &Transform {
        &self.world
    }

    /// World bounds, inflated by the world's margin.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Contacts currently touching this shape's AABB.
    pub fn contacts(&self) -> &[ContactId] {
        &self.contacts
    }

    /// Number of contacts referencing this shape.
    pub fn num_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// Mass properties about the shape centroid.
    pub fn mass_info(&self) -> MassInfo {
        self.kind.mass_info(self.material.density)
    }

    /// Radius for the sphere detectors: the sphere radius, or zero for a
    /// particle. `None` for other shapes.
    pub(crate) fn sphere_radius(&self) -> Option<f32> {
        match self.kind {
            ShapeKind::Sphere { radius } => Some(radius),
            ShapeKind::Particle => Some(0.0),
            _ => None,
        }
    }

    /// World-space outward normal of a plane shape.
    pub(crate) fn plane_normal(&self) -> Option<Vec3> {
        match self.kind {
            ShapeKind::Plane { normal } => Some(self.world.apply_direction(normal)),
            _ => None,
        }
    }

    pub(crate) fn shift_relative(&mut self, delta: Vec3) {
        self.relative
            .set_translation(self.relative.translation() - delta);
    }

    /// Recomputes the world pose from the owning body's pose, then the AABB.
    pub(crate) fn sync_pose(&mut self, body_pose: &Transform, margin: f32) {
        self.world = body_pose.compose(&self.relative);
        self.aabb = self.compute_aabb(margin);
    }

    fn compute_aabb(&self, margin: f32) -> Aabb {
        let pos = self.world.translation();
        let rot = self.world.rotation();
        match self.kind {
            ShapeKind::Sphere { radius } => {
                let r = radius + margin;
                Aabb::from_center_half_extents(pos, r, r, r)
            }
            ShapeKind::Box { half_extents } => {
                Aabb::from_oriented_box(pos, &rot, half_extents).inflate(margin)
            }
            ShapeKind::Cylinder { radius, half_height } => {
                let axis = rot.column(1);
                let half = |a: f32| a.abs() * half_height + radius * (1.0 - a * a).max(0.0).sqrt();
                Aabb::from_center_half_extents(pos, half(axis.x()), half(axis.y()), half(axis.z()))
                    .inflate(margin)
            }
            ShapeKind::Plane { normal } => plane_aabb(pos, rot * normal, margin),
            ShapeKind::Particle => Aabb::from_center_half_extents(pos, 0.0, 0.0, 0.0),
            ShapeKind::Tetra { vertices } => {
                let world = vertices.map(|v| self.world.apply_point(v));
                Aabb::from_points(&world)
                    .unwrap_or_else(|| Aabb::from_center_half_extents(pos, 0.0, 0.0, 0.0))
                    .inflate(margin)
            }
        }
    }
}

/// Planes are unbounded except along an axis their normal is aligned with,
/// where the box stops just outside the surface.
fn plane_aabb(pos: Vec3, normal: Vec3, margin: f32) -> Aabb {
    let mut min = [f32::NEG_INFINITY; 3];
    let mut max = [f32::INFINITY; 3];
    for axis in 0..3 {
        if (normal[axis] - 1.0).abs() <= EPSILON {
            max[axis] = pos[axis] + margin;
        } else if (normal[axis] + 1.0).abs() <= EPSILON {
            min[axis] = pos[axis] - margin;
        }
    }
    Aabb::new(Vec3::from(min), Vec3::from(max))
}
