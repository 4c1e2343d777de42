// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rigid bodies: pose, velocity, aggregated mass and sleep state.

use rebound_geom::Transform;
use rebound_math::{Mat3, Quat, Vec3};

use crate::arena::{BodyHandle, JointHandle, ShapeHandle};
use crate::config::SleepConfig;
use crate::shape::MassInfo;

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BodyType {
    /// Driven by gravity, contacts and joints.
    #[default]
    Dynamic,
    /// Never moves; infinite mass.
    Static,
    /// Moves only as the caller drives it; infinite mass, no gravity.
    Kinematic,
}

/// Description of a body to add to a world.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BodyDesc {
    /// Motion type.
    pub body_type: BodyType,
    /// Optional unique name.
    pub name: Option<String>,
    /// Initial position of the body origin.
    pub position: Vec3,
    /// Initial orientation.
    pub orientation: Quat,
    /// Initial linear velocity.
    pub linear_velocity: Vec3,
    /// Initial angular velocity.
    pub angular_velocity: Vec3,
    /// Whether world (or overridden) gravity applies.
    pub use_gravity: bool,
    /// Per-body gravity replacing the world's.
    pub gravity: Option<Vec3>,
    /// Whether the body may fall asleep.
    pub allow_sleep: bool,
    /// Move the body origin onto its centre of mass when shapes change.
    pub auto_center_of_mass: bool,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            name: None,
            position: Vec3::ZERO,
            orientation: Quat::identity(),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            use_gravity: true,
            gravity: None,
            allow_sleep: true,
            auto_center_of_mass: true,
        }
    }
}

impl BodyDesc {
    /// Dynamic body at the origin.
    pub fn dynamic() -> Self {
        Self::default()
    }

    /// Static body at the origin.
    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Static,
            ..Self::default()
        }
    }

    /// Kinematic body at the origin.
    pub fn kinematic() -> Self {
        Self {
            body_type: BodyType::Kinematic,
            ..Self::default()
        }
    }

    /// Sets the initial position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial orientation.
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    /// Sets the initial linear velocity.
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Sets the initial angular velocity.
    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Names the body.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides world gravity for this body.
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Disables gravity for this body.
    pub fn without_gravity(mut self) -> Self {
        self.use_gravity = false;
        self
    }

    /// Keeps the body awake forever.
    pub fn without_sleep(mut self) -> Self {
        self.allow_sleep = false;
        self
    }

    /// Keeps the body origin where the caller put it.
    pub fn without_auto_center(mut self) -> Self {
        self.auto_center_of_mass = false;
        self
    }
}

/// Mass properties of a set of shapes, about their common centre of mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// Total mass.
    pub mass: f32,
    /// Centre of mass in body-local coordinates.
    pub center: Vec3,
    /// Inertia about `center`, in body-local axes.
    pub inertia: Mat3,
}

/// Combines per-shape mass infos placed at body-local poses.
///
/// Each shape tensor is rotated into body axes and shifted to the body origin
/// with the parallel-axis term, then the sum is shifted back to the centre.
pub fn aggregate_mass(parts: &[(MassInfo, Transform)]) -> MassProperties {
    let mut mass = 0.0;
    let mut moment = Vec3::ZERO;
    let mut inertia = Mat3::ZERO;
    for (info, pose) in parts {
        let d = pose.translation();
        mass += info.mass;
        moment += d.scale(info.mass);
        inertia = inertia
            + info.inertia.rotate_tensor(&pose.rotation())
            + parallel_axis(info.mass, d);
    }
    let center = if mass > 0.0 { moment.scale(1.0 / mass) } else { Vec3::ZERO };
    MassProperties {
        mass,
        center,
        inertia: inertia - parallel_axis(mass, center),
    }
}

fn parallel_axis(mass: f32, d: Vec3) -> Mat3 {
    (Mat3::from_diagonal(Vec3::splat(d.length_squared())) - Mat3::outer(d, d)).scale(mass)
}

/// A rigid body owned by a world.
#[derive(Debug, Clone)]
pub struct RigidBody {
    handle: BodyHandle,
    body_type: BodyType,
    name: Option<String>,

    pub(crate) position: Vec3,
    pub(crate) orientation: Quat,
    pub(crate) rotation: Mat3,
    pub(crate) linear_velocity: Vec3,
    pub(crate) angular_velocity: Vec3,

    mass: f32,
    pub(crate) inverse_mass: f32,
    local_inertia: Mat3,
    inverse_local_inertia: Mat3,
    pub(crate) inverse_inertia: Mat3,

    use_gravity: bool,
    gravity: Option<Vec3>,
    allow_sleep: bool,
    auto_center_of_mass: bool,

    pub(crate) shapes: Vec<ShapeHandle>,
    pub(crate) joints: Vec<JointHandle>,

    pub(crate) sleeping: bool,
    pub(crate) sleep_time: f32,
    sleep_position: Vec3,
    sleep_orientation: Quat,
    pub(crate) added_to_island: bool,

    kinematic_position: Option<Vec3>,
    kinematic_orientation: Option<Quat>,
}

impl RigidBody {
    pub(crate) fn new(handle: BodyHandle, desc: BodyDesc) -> Self {
        let orientation = desc.orientation.normalize();
        let rotation = orientation.to_mat3();
        Self {
            handle,
            body_type: desc.body_type,
            name: desc.name,
            position: desc.position,
            orientation,
            rotation,
            linear_velocity: desc.linear_velocity,
            angular_velocity: desc.angular_velocity,
            mass: 0.0,
            inverse_mass: 0.0,
            local_inertia: Mat3::ZERO,
            inverse_local_inertia: Mat3::ZERO,
            inverse_inertia: Mat3::ZERO,
            use_gravity: desc.use_gravity,
            gravity: desc.gravity,
            allow_sleep: desc.allow_sleep,
            auto_center_of_mass: desc.auto_center_of_mass,
            shapes: Vec::new(),
            joints: Vec::new(),
            sleeping: false,
            sleep_time: 0.0,
            sleep_position: desc.position,
            sleep_orientation: orientation,
            added_to_island: false,
            kinematic_position: None,
            kinematic_orientation: None,
        }
    }

    /// This body's handle.
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Motion type.
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// `true` for dynamic bodies.
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// `true` for static bodies.
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// `true` for kinematic bodies.
    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }

    /// Awake and able to move by itself this step.
    pub fn is_active_mover(&self) -> bool {
        !self.sleeping && self.body_type != BodyType::Static
    }

    /// Name given at creation.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// World position of the centre of mass.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Orientation.
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Rotation matrix matching [`Self::orientation`].
    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    /// Body pose as a transform.
    pub fn pose(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    /// Linear velocity.
    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    /// Angular velocity (world frame).
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Total mass.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass; zero for static and kinematic bodies.
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Inertia tensor in body axes.
    pub fn local_inertia(&self) -> Mat3 {
        self.local_inertia
    }

    /// Inverse inertia tensor in world axes.
    pub fn inverse_inertia(&self) -> Mat3 {
        self.inverse_inertia
    }

    /// Shapes attached to this body.
    pub fn shapes(&self) -> &[ShapeHandle] {
        &self.shapes
    }

    /// Joints attached to this body.
    pub fn joints(&self) -> &[JointHandle] {
        &self.joints
    }

    /// Whether the body is asleep.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Seconds the body has been continuously eligible for sleep.
    pub fn sleep_time(&self) -> f32 {
        self.sleep_time
    }

    /// Whether the body may fall asleep.
    pub fn allow_sleep(&self) -> bool {
        self.allow_sleep
    }

    /// Whether the body origin tracks the centre of mass.
    pub fn auto_center_of_mass(&self) -> bool {
        self.auto_center_of_mass
    }

    /// Gravity acting on this body given the world's.
    pub fn effective_gravity(&self, world: Vec3) -> Vec3 {
        self.gravity.unwrap_or(world)
    }

    pub(crate) fn set_linear_velocity(&mut self, v: Vec3) {
        self.linear_velocity = v;
    }

    pub(crate) fn set_angular_velocity(&mut self, w: Vec3) {
        self.angular_velocity = w;
    }

    pub(crate) fn reset_position(&mut self, position: Vec3) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.position = position;
    }

    pub(crate) fn reset_orientation(&mut self, orientation: Quat) {
        self.angular_velocity = Vec3::ZERO;
        self.orientation = orientation.normalize();
        self.refresh_rotation();
    }

    pub(crate) fn set_kinematic_target(&mut self, position: Vec3) {
        self.kinematic_position = Some(position);
    }

    pub(crate) fn set_kinematic_orientation(&mut self, orientation: Quat) {
        self.kinematic_orientation = Some(orientation.normalize());
    }

    /// Installs aggregated shape mass.
    ///
    /// Returns the body-local offset the body origin moved by, which the
    /// caller subtracts from every shape's relative position.
    pub(crate) fn apply_mass(&mut self, props: MassProperties) -> Vec3 {
        let mut inertia = props.inertia;
        let shift = if self.auto_center_of_mass {
            self.position += self.rotation * props.center;
            props.center
        } else {
            // Keep the tensor about the origin the caller chose.
            inertia = inertia + parallel_axis(props.mass, props.center);
            Vec3::ZERO
        };
        self.mass = props.mass;
        self.local_inertia = inertia;
        if self.is_dynamic() && props.mass > 0.0 {
            self.inverse_mass = 1.0 / props.mass;
            self.inverse_local_inertia = inertia.inverse_or_zero();
        } else {
            self.inverse_mass = 0.0;
            self.inverse_local_inertia = Mat3::ZERO;
        }
        self.refresh_rotation();
        shift
    }

    fn refresh_rotation(&mut self) {
        self.rotation = self.orientation.to_mat3();
        self.inverse_inertia = self.inverse_local_inertia.rotate_tensor(&self.rotation);
    }

    /// Adds one step of gravity to the velocity of a dynamic body.
    pub(crate) fn apply_gravity(&mut self, world: Vec3, dt: f32) {
        if self.is_dynamic() && self.use_gravity {
            self.linear_velocity += self.effective_gravity(world).scale(dt);
        }
    }

    /// Applies an impulse `impulse` at world point `point`.
    pub fn apply_impulse(&mut self, point: Vec3, impulse: Vec3) {
        self.apply_impulse_at_lever(point - self.position, impulse);
    }

    /// Applies an impulse through lever arm `r` (from the centre of mass).
    pub fn apply_impulse_at_lever(&mut self, r: Vec3, impulse: Vec3) {
        self.linear_velocity += impulse.scale(self.inverse_mass);
        self.angular_velocity += self.inverse_inertia * r.cross(&impulse);
    }

    /// Slow enough to count towards sleep this step.
    pub(crate) fn is_sleep_eligible(&self, cfg: &SleepConfig) -> bool {
        self.allow_sleep
            && self.is_dynamic()
            && self.linear_velocity.length_squared() <= cfg.linear_threshold_sq
            && self.angular_velocity.length_squared() <= cfg.angular_threshold_sq
    }

    /// Puts the body to sleep, zeroing its velocity and recording its pose.
    pub(crate) fn sleep(&mut self) {
        if !self.allow_sleep || self.sleeping {
            return;
        }
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.sleep_position = self.position;
        self.sleep_orientation = self.orientation;
        self.sleep_time = 0.0;
        self.sleeping = true;
    }

    /// Wakes the body. Returns `true` if it was asleep.
    pub(crate) fn wake(&mut self) -> bool {
        let was = self.sleeping;
        self.sleeping = false;
        self.sleep_time = 0.0;
        was
    }

    /// A sleeping body that has been moved or given velocity since it fell
    /// asleep must wake.
    pub(crate) fn needs_wake(&self, tolerance: f32) -> bool {
        let moved = |v: Vec3| v.abs().to_array().iter().any(|c| *c > tolerance);
        let q = self.orientation.to_array();
        let s = self.sleep_orientation.to_array();
        moved(self.linear_velocity)
            || moved(self.angular_velocity)
            || moved(self.position - self.sleep_position)
            || q.iter().zip(s.iter()).any(|(a, b)| (a - b).abs() > tolerance)
    }

    /// Integrates the pose over `dt`.
    pub(crate) fn update_position(&mut self, dt: f32) {
        match self.body_type {
            BodyType::Static => {
                self.linear_velocity = Vec3::ZERO;
                self.angular_velocity = Vec3::ZERO;
                return;
            }
            BodyType::Kinematic => {
                // Motion comes only from targets; last step's velocity is spent.
                self.linear_velocity = Vec3::ZERO;
                self.angular_velocity = Vec3::ZERO;
                if let Some(target) = self.kinematic_position.take() {
                    self.linear_velocity = (target - self.position).scale(1.0 / dt);
                }
                if let Some(orientation) = self.kinematic_orientation.take() {
                    self.angular_velocity = Vec3::ZERO;
                    self.orientation = orientation;
                }
            }
            BodyType::Dynamic => {}
        }
        self.position += self.linear_velocity.scale(dt);
        self.orientation = self.orientation.integrate(self.angular_velocity, dt);
        self.refresh_rotation();
    }
}
