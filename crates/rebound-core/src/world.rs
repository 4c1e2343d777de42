// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The world: owner of every body, shape, joint and contact, and the fixed
//! step that advances them.
//!
//! One [`World::step`] runs, in order:
//!
//! 1. wake sleeping bodies that were moved or pushed from outside;
//! 2. broad phase, creating contacts for new overlapping pairs;
//! 3. narrow phase, dropping contacts whose bounds separated and refreshing
//!    the manifolds of the rest;
//! 4. island construction and solve for every awake non-static body, ending
//!    in integration or sleep;
//! 5. statistics.
//!
//! Rejected structural calls return a [`WorldError`], log a `warn!` and
//! leave the world untouched.

use core::fmt;

use rebound_geom::{BroadPhase, BruteForceBroadPhase, SweepAndPrune};
use rebound_math::{Lcg, Quat, Vec3};
use rustc_hash::FxHashMap;
use tracing::{debug, debug_span, trace, warn};

use crate::arena::{Arena, ArenaHandle, BodyHandle, JointHandle, ShapeHandle};
use crate::body::{aggregate_mass, BodyDesc, RigidBody};
use crate::config::{BroadPhaseKind, WorldConfig};
use crate::constraint::{BodySet, Constraint, StepContext};
use crate::contact::{BodyFrame, Contact, ContactId, ContactSet};
use crate::error::WorldError;
use crate::island::{Island, IslandOutcome};
use crate::joint::{Joint, JointDesc};
use crate::narrowphase::DetectorTable;
use crate::shape::{Shape, ShapeDesc};
use crate::stats::StepStats;

/// BLAKE3 digest of every body's state, see [`World::state_hash`].
pub type StateHash = [u8; 32];

/// Broad phase a world can own.
pub type BoxedBroadPhase = Box<dyn BroadPhase + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Named {
    Body(BodyHandle),
    Joint(JointHandle),
}

/// A rigid-body simulation.
pub struct World {
    config: WorldConfig,
    bodies: BodySet,
    shapes: Arena<ShapeHandle, Shape>,
    joints: Arena<JointHandle, Joint>,
    contacts: ContactSet,
    broad_phase: BoxedBroadPhase,
    detectors: DetectorTable,
    names: FxHashMap<String, Named>,
    rng: Lcg,
    island: Island,
    stats: StepStats,
    steps: u64,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("shapes", &self.shapes.len())
            .field("joints", &self.joints.len())
            .field("contacts", &self.contacts.len())
            .field("proxies", &self.broad_phase.num_proxies())
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::from_valid_config(WorldConfig::default())
    }
}

fn build_broad_phase(kind: BroadPhaseKind) -> BoxedBroadPhase {
    match kind {
        BroadPhaseKind::BruteForce => Box::new(BruteForceBroadPhase::new()),
        BroadPhaseKind::SweepAndPrune => Box::new(SweepAndPrune::new()),
    }
}

/// Broad-phase proxy id of a shape: its arena slot.
fn proxy_id(handle: ShapeHandle) -> usize {
    handle.index() as usize
}

fn frame(body: &RigidBody) -> BodyFrame {
    BodyFrame {
        position: body.position(),
        rotation: body.rotation(),
    }
}

/// Moves every shape of `body` to the body's pose and refreshes its proxy.
fn sync_shapes(
    body: &RigidBody,
    shapes: &mut Arena<ShapeHandle, Shape>,
    broad_phase: &mut (dyn BroadPhase + Send),
    margin: f32,
) {
    let pose = body.pose();
    for &handle in &body.shapes {
        if let Some(shape) = shapes.get_mut(handle) {
            shape.sync_pose(&pose, margin);
            broad_phase.update_proxy(proxy_id(handle), shape.aabb());
        }
    }
}

fn unknown_body(handle: BodyHandle) -> WorldError {
    warn!(%handle, "unknown body");
    WorldError::UnknownBody(handle)
}

fn unknown_shape(handle: ShapeHandle) -> WorldError {
    warn!(%handle, "unknown shape");
    WorldError::UnknownShape(handle)
}

fn unknown_joint(handle: JointHandle) -> WorldError {
    warn!(%handle, "unknown joint");
    WorldError::UnknownJoint(handle)
}

impl World {
    /// Creates an empty world after validating `config`.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        if let Err(err) = config.validate() {
            warn!(?err, "rejected world config");
            return Err(err.into());
        }
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        Self {
            broad_phase: build_broad_phase(config.broad_phase),
            rng: Lcg::from_seed(config.random_seed),
            config,
            bodies: BodySet::new(),
            shapes: Arena::new(),
            joints: Arena::new(),
            contacts: ContactSet::default(),
            detectors: DetectorTable::new(),
            names: FxHashMap::default(),
            island: Island::default(),
            stats: StepStats::default(),
            steps: 0,
        }
    }

    /// Replaces the broad phase, re-registering every existing shape.
    pub fn with_broad_phase(mut self, broad_phase: BoxedBroadPhase) -> Self {
        self.broad_phase = broad_phase;
        for (handle, shape) in self.shapes.iter() {
            self.broad_phase.create_proxy(proxy_id(handle), shape.aabb());
        }
        self
    }

    /// Configuration the world runs with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// World gravity.
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Changes world gravity. Sleeping bodies stay asleep.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    // ── Bodies ──────────────────────────────────────────────────────────

    /// Adds a body without shapes; it has no mass until shapes are added.
    pub fn add_body(&mut self, desc: BodyDesc) -> Result<BodyHandle, WorldError> {
        if let Some(name) = desc.name.as_deref() {
            self.check_name(name)?;
        }
        let name = desc.name.clone();
        let handle = self.bodies.insert_with(|h| RigidBody::new(h, desc));
        if let Some(name) = name {
            self.names.insert(name, Named::Body(handle));
        }
        debug!(%handle, "body added");
        Ok(handle)
    }

    /// Removes a body with its shapes, joints and contacts. Bodies that were
    /// touching or jointed to it wake up.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody, WorldError> {
        let Some(body) = self.bodies.get(handle) else {
            return Err(unknown_body(handle));
        };
        let joints = body.joints.clone();
        let shapes = body.shapes.clone();
        self.wake_neighbours(handle);
        for joint in joints {
            self.detach_joint(joint);
        }
        for shape in shapes {
            self.detach_shape(shape);
        }
        let body = self.bodies.remove(handle).ok_or_else(|| unknown_body(handle))?;
        if let Some(name) = body.name() {
            self.names.remove(name);
        }
        debug!(%handle, "body removed");
        Ok(body)
    }

    /// Body by handle.
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Every body in handle order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    /// Body registered under `name`.
    pub fn body_by_name(&self, name: &str) -> Option<BodyHandle> {
        match self.names.get(name)? {
            Named::Body(handle) => Some(*handle),
            Named::Joint(_) => None,
        }
    }

    /// Number of bodies.
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Replaces the linear velocity and wakes the body.
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<(), WorldError> {
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        body.set_linear_velocity(velocity);
        body.wake();
        Ok(())
    }

    /// Replaces the angular velocity and wakes the body.
    pub fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<(), WorldError> {
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        body.set_angular_velocity(velocity);
        body.wake();
        Ok(())
    }

    /// Applies `impulse` at world point `point` and wakes the body.
    pub fn apply_impulse(&mut self, handle: BodyHandle, point: Vec3, impulse: Vec3) -> Result<(), WorldError> {
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        body.wake();
        body.apply_impulse(point, impulse);
        Ok(())
    }

    /// Teleports the body, zeroing its velocity. The body and everything
    /// touching it wake.
    pub fn reset_position(&mut self, handle: BodyHandle, position: Vec3) -> Result<(), WorldError> {
        if !self.bodies.contains(handle) {
            return Err(unknown_body(handle));
        }
        self.wake_neighbours(handle);
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        body.reset_position(position);
        sync_shapes(body, &mut self.shapes, self.broad_phase.as_mut(), self.config.aabb_margin);
        Ok(())
    }

    /// Sets the orientation, zeroing angular velocity. The body and
    /// everything touching it wake.
    pub fn reset_orientation(&mut self, handle: BodyHandle, orientation: Quat) -> Result<(), WorldError> {
        if !self.bodies.contains(handle) {
            return Err(unknown_body(handle));
        }
        self.wake_neighbours(handle);
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        body.reset_orientation(orientation);
        sync_shapes(body, &mut self.shapes, self.broad_phase.as_mut(), self.config.aabb_margin);
        Ok(())
    }

    /// Position a kinematic body reaches by the end of the next step. Other
    /// body types ignore it.
    pub fn set_kinematic_target(&mut self, handle: BodyHandle, position: Vec3) -> Result<(), WorldError> {
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        if body.is_kinematic() {
            body.set_kinematic_target(position);
        } else {
            warn!(%handle, "kinematic target ignored on non-kinematic body");
        }
        Ok(())
    }

    /// Orientation a kinematic body snaps to on the next step. Other body
    /// types ignore it.
    pub fn set_kinematic_orientation(&mut self, handle: BodyHandle, orientation: Quat) -> Result<(), WorldError> {
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        if body.is_kinematic() {
            body.set_kinematic_orientation(orientation);
        } else {
            warn!(%handle, "kinematic orientation ignored on non-kinematic body");
        }
        Ok(())
    }

    /// Wakes a body.
    pub fn wake_body(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        if body.wake() {
            debug!(%handle, "body woken");
        }
        Ok(())
    }

    /// Puts a body to sleep now. Bodies that disallow sleep are unaffected.
    pub fn sleep_body(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        let body = self.bodies.get_mut(handle).ok_or_else(|| unknown_body(handle))?;
        body.sleep();
        Ok(())
    }

    fn wake_neighbours(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.get(handle) else { return };
        let mut woken: Vec<BodyHandle> = body
            .joints
            .iter()
            .filter_map(|j| self.joints.get(*j))
            .map(|j| j.other_body(handle))
            .collect();
        for shape in body.shapes.iter().filter_map(|s| self.shapes.get(*s)) {
            woken.extend(
                shape
                    .contacts()
                    .iter()
                    .filter_map(|id| self.contacts.get(*id))
                    .map(|c| c.other_body(handle)),
            );
        }
        woken.push(handle);
        for h in woken {
            if let Some(b) = self.bodies.get_mut(h) {
                b.wake();
            }
        }
    }

    // ── Shapes ──────────────────────────────────────────────────────────

    /// Attaches a shape to `body`, recomputing the body's mass.
    ///
    /// With automatic centring the body origin moves to the new centre of
    /// mass and every shape's offset is shifted to keep its world pose.
    pub fn add_shape(&mut self, body: BodyHandle, desc: ShapeDesc) -> Result<ShapeHandle, WorldError> {
        if !self.bodies.contains(body) {
            return Err(unknown_body(body));
        }
        let handle = self.shapes.insert_with(|h| Shape::new(h, body, desc));
        if let Some(b) = self.bodies.get_mut(body) {
            b.shapes.push(handle);
            b.wake();
        }
        self.update_mass(body);
        if let Some(shape) = self.shapes.get(handle) {
            self.broad_phase.create_proxy(proxy_id(handle), shape.aabb());
        }
        debug!(%handle, %body, "shape added");
        Ok(handle)
    }

    /// Detaches and returns a shape, destroying its contacts.
    pub fn remove_shape(&mut self, handle: ShapeHandle) -> Result<Shape, WorldError> {
        let Some(body) = self.shapes.get(handle).map(Shape::body) else {
            return Err(unknown_shape(handle));
        };
        self.wake_neighbours(body);
        let shape = self.detach_shape(handle).ok_or_else(|| unknown_shape(handle))?;
        self.update_mass(body);
        debug!(%handle, %body, "shape removed");
        Ok(shape)
    }

    /// Shape by handle.
    pub fn shape(&self, handle: ShapeHandle) -> Option<&Shape> {
        self.shapes.get(handle)
    }

    /// Every shape in handle order.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeHandle, &Shape)> + '_ {
        self.shapes.iter()
    }

    /// Number of shapes.
    pub fn num_shapes(&self) -> usize {
        self.shapes.len()
    }

    fn detach_shape(&mut self, handle: ShapeHandle) -> Option<Shape> {
        let contacts = self.shapes.get(handle)?.contacts.clone();
        for id in contacts {
            self.remove_contact(id);
        }
        self.broad_phase.remove_proxy(proxy_id(handle));
        let shape = self.shapes.remove(handle)?;
        if let Some(body) = self.bodies.get_mut(shape.body()) {
            body.shapes.retain(|s| *s != handle);
        }
        Some(shape)
    }

    fn update_mass(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.get_mut(handle) else { return };
        let parts: Vec<_> = body
            .shapes
            .iter()
            .filter_map(|s| self.shapes.get(*s))
            .map(|s| (s.mass_info(), *s.relative()))
            .collect();
        let shift = body.apply_mass(aggregate_mass(&parts));
        if shift != Vec3::ZERO {
            for s in &body.shapes {
                if let Some(shape) = self.shapes.get_mut(*s) {
                    shape.shift_relative(shift);
                }
            }
        }
        sync_shapes(body, &mut self.shapes, self.broad_phase.as_mut(), self.config.aabb_margin);
    }

    // ── Joints ──────────────────────────────────────────────────────────

    /// Adds a built-in joint. Unless the joint allows collision, existing
    /// contacts between the two bodies are destroyed.
    pub fn add_joint(&mut self, desc: JointDesc) -> Result<JointHandle, WorldError> {
        self.insert_joint(Joint::from_desc(desc))
    }

    /// Adds a caller-supplied constraint as a joint.
    pub fn add_custom_joint(
        &mut self,
        constraint: Box<dyn Constraint>,
        allow_collision: bool,
        name: Option<String>,
    ) -> Result<JointHandle, WorldError> {
        self.insert_joint(Joint::custom(constraint, allow_collision, name))
    }

    fn insert_joint(&mut self, joint: Joint) -> Result<JointHandle, WorldError> {
        let (body1, body2) = joint.bodies();
        if body1 == body2 {
            warn!(body = %body1, "joint connects a body to itself");
            return Err(WorldError::SelfJoint(body1));
        }
        if !self.bodies.contains(body1) || !self.bodies.contains(body2) {
            warn!(%body1, %body2, "joint references unknown bodies");
            return Err(WorldError::JointBodiesUnresolved { body1, body2 });
        }
        if let Some(name) = joint.name() {
            self.check_name(name)?;
        }
        let allow_collision = joint.allow_collision();
        let name = joint.name().map(str::to_owned);
        let handle = self.joints.insert(joint);
        if let Some(name) = name {
            self.names.insert(name, Named::Joint(handle));
        }
        for b in [body1, body2] {
            if let Some(body) = self.bodies.get_mut(b) {
                body.joints.push(handle);
                body.wake();
            }
        }
        if !allow_collision {
            self.remove_contacts_between(body1, body2);
        }
        debug!(%handle, %body1, %body2, "joint added");
        Ok(handle)
    }

    /// Removes a joint and wakes both of its bodies.
    pub fn remove_joint(&mut self, handle: JointHandle) -> Result<(), WorldError> {
        if self.detach_joint(handle) {
            Ok(())
        } else {
            Err(unknown_joint(handle))
        }
    }

    fn detach_joint(&mut self, handle: JointHandle) -> bool {
        let Some(joint) = self.joints.remove(handle) else {
            return false;
        };
        let (body1, body2) = joint.bodies();
        for b in [body1, body2] {
            if let Some(body) = self.bodies.get_mut(b) {
                body.joints.retain(|j| *j != handle);
                body.wake();
            }
        }
        if let Some(name) = joint.name() {
            self.names.remove(name);
        }
        debug!(%handle, "joint removed");
        true
    }

    /// Joint by handle.
    pub fn joint(&self, handle: JointHandle) -> Option<&Joint> {
        self.joints.get(handle)
    }

    /// Every joint in handle order.
    pub fn joints(&self) -> impl Iterator<Item = (JointHandle, &Joint)> + '_ {
        self.joints.iter()
    }

    /// Joint registered under `name`.
    pub fn joint_by_name(&self, name: &str) -> Option<JointHandle> {
        match self.names.get(name)? {
            Named::Joint(handle) => Some(*handle),
            Named::Body(_) => None,
        }
    }

    /// Number of joints.
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    fn check_name(&self, name: &str) -> Result<(), WorldError> {
        if self.names.contains_key(name) {
            warn!(name, "duplicate name rejected");
            return Err(WorldError::DuplicateName(name.to_owned()));
        }
        Ok(())
    }

    // ── Contacts ────────────────────────────────────────────────────────

    /// Every live contact, touching or not, in pool order.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.contacts.iter()
    }

    /// Contact by id.
    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(id)
    }

    /// Number of live contacts.
    pub fn num_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// The touching contact between two shapes, if any.
    pub fn contact_between(&self, a: ShapeHandle, b: ShapeHandle) -> Option<&Contact> {
        self.find_contact(a, b)
            .and_then(|id| self.contacts.get(id))
            .filter(|c| c.is_touching())
    }

    /// Two shapes have a touching contact.
    pub fn is_touching(&self, a: ShapeHandle, b: ShapeHandle) -> bool {
        self.contact_between(a, b).is_some()
    }

    /// Any shape of one body touches any shape of the other.
    pub fn bodies_touching(&self, a: BodyHandle, b: BodyHandle) -> bool {
        let Some(body) = self.bodies.get(a) else { return false };
        body.shapes
            .iter()
            .filter_map(|s| self.shapes.get(*s))
            .flat_map(|s| s.contacts().iter())
            .filter_map(|id| self.contacts.get(*id))
            .any(|c| c.is_touching() && c.other_body(a) == b)
    }

    /// [`Self::bodies_touching`] by body name. Unknown names never touch.
    pub fn check_contact(&self, name1: &str, name2: &str) -> bool {
        match (self.body_by_name(name1), self.body_by_name(name2)) {
            (Some(a), Some(b)) => self.bodies_touching(a, b),
            _ => false,
        }
    }

    fn find_contact(&self, a: ShapeHandle, b: ShapeHandle) -> Option<ContactId> {
        let s1 = self.shapes.get(a)?;
        let s2 = self.shapes.get(b)?;
        let list = if s1.contacts.len() <= s2.contacts.len() {
            &s1.contacts
        } else {
            &s2.contacts
        };
        list.iter()
            .copied()
            .find(|id| self.contacts.get(*id).is_some_and(|c| c.connects(a, b)))
    }

    fn is_available_pair(&self, a: ShapeHandle, b: ShapeHandle) -> bool {
        let (Some(s1), Some(s2)) = (self.shapes.get(a), self.shapes.get(b)) else {
            return false;
        };
        if s1.body() == s2.body() || !s1.filter().accepts(s2.filter()) {
            return false;
        }
        let (Some(b1), Some(b2)) = (self.bodies.get(s1.body()), self.bodies.get(s2.body())) else {
            return false;
        };
        if !b1.is_dynamic() && !b2.is_dynamic() {
            return false;
        }
        let (near, far) = if b1.joints.len() <= b2.joints.len() { (b1, b2) } else { (b2, b1) };
        !near
            .joints
            .iter()
            .filter_map(|j| self.joints.get(*j))
            .any(|j| !j.allow_collision() && j.other_body(near.handle()) == far.handle())
    }

    fn add_contact(&mut self, a: ShapeHandle, b: ShapeHandle) -> Option<ContactId> {
        let s1 = self.shapes.get(a)?;
        let s2 = self.shapes.get(b)?;
        let detector = self.detectors.get(s1.shape_type(), s2.shape_type())?;
        let id = self.contacts.next_id();
        let mut contact = Contact::new(id, s1, s2, detector);
        contact.persisting = true;
        self.contacts.insert(contact);
        for handle in [a, b] {
            if let Some(shape) = self.shapes.get_mut(handle) {
                shape.contacts.push(id);
            }
        }
        trace!(%id, shape1 = %a, shape2 = %b, "contact added");
        Some(id)
    }

    fn remove_contact(&mut self, id: ContactId) -> bool {
        let Some(contact) = self.contacts.remove(id) else {
            return false;
        };
        for handle in [contact.shape1(), contact.shape2()] {
            if let Some(shape) = self.shapes.get_mut(handle) {
                shape.contacts.retain(|c| *c != id);
            }
        }
        trace!(%id, shape1 = %contact.shape1(), shape2 = %contact.shape2(), "contact removed");
        true
    }

    fn remove_contacts_between(&mut self, body1: BodyHandle, body2: BodyHandle) {
        let doomed: Vec<ContactId> = self
            .contacts
            .iter()
            .filter(|c| c.other_body(body1) == body2 && (c.body1() == body1 || c.body2() == body1))
            .map(Contact::id)
            .collect();
        for id in doomed {
            self.remove_contact(id);
        }
    }

    // ── Stepping ────────────────────────────────────────────────────────

    /// Advances the world by one configured time step.
    pub fn step(&mut self) {
        let _span = debug_span!("step", step = self.steps).entered();
        let ctx = StepContext::new(self.config.time_step, self.config.solver);
        let mut stats = StepStats {
            step: self.steps + 1,
            ..StepStats::default()
        };

        let tolerance = self.config.sleep.wake_tolerance;
        for (handle, body) in self.bodies.iter_mut() {
            body.added_to_island = false;
            if body.sleeping && body.needs_wake(tolerance) {
                body.wake();
                debug!(%handle, "sleeping body disturbed");
            }
        }

        self.update_pairs(&mut stats);
        self.update_manifolds(&mut stats);
        self.solve_islands(&ctx, &mut stats);

        stats.bodies = self.bodies.len();
        stats.shapes = self.shapes.len();
        stats.joints = self.joints.len();
        stats.contacts = self.contacts.len();
        for contact in self.contacts.iter() {
            if contact.is_touching() {
                stats.touching_contacts += 1;
            }
            stats.contact_points += contact.manifold().num_points();
        }
        stats.sleeping_bodies = self.bodies.iter().filter(|(_, b)| b.sleeping).count();

        self.steps += 1;
        self.stats = stats;
        trace!(?stats, "step finished");
    }

    /// Broad phase: marks existing contacts persisting and creates the new.
    fn update_pairs(&mut self, stats: &mut StepStats) {
        self.broad_phase.detect_pairs();
        stats.pair_checks = self.broad_phase.num_pair_checks();
        for k in 0..self.broad_phase.pairs().len() {
            let Some(&(i, j)) = self.broad_phase.pairs().get(k) else { break };
            let (Some(a), Some(b)) = (self.shapes.handle_at(i), self.shapes.handle_at(j)) else {
                continue;
            };
            if !self.is_available_pair(a, b) {
                continue;
            }
            if let Some(id) = self.find_contact(a, b) {
                if let Some(contact) = self.contacts.get_mut(id) {
                    contact.persisting = true;
                }
            } else if self.add_contact(a, b).is_some() {
                stats.contacts_added += 1;
            }
        }
    }

    /// Narrow phase: drops separated contacts and refreshes the manifolds of
    /// contacts with at least one awake mover.
    fn update_manifolds(&mut self, stats: &mut StepStats) {
        for slot in 0..self.contacts.slot_count() {
            let Some(id) = self.contacts.id_at(slot) else { continue };
            let Some(contact) = self.contacts.get(id) else { continue };
            let persisting = contact.persisting;
            let (a, b) = (contact.shape1(), contact.shape2());
            let (body1, body2) = (contact.body1(), contact.body2());
            let (Some(s1), Some(s2)) = (self.shapes.get(a), self.shapes.get(b)) else {
                continue;
            };
            if !persisting && !s1.aabb().overlaps(&s2.aabb()) {
                if self.remove_contact(id) {
                    stats.contacts_removed += 1;
                }
                continue;
            }
            let (Some(b1), Some(b2)) = (self.bodies.get(body1), self.bodies.get(body2)) else {
                continue;
            };
            let active = b1.is_active_mover() || b2.is_active_mover();
            let (f1, f2) = (frame(b1), frame(b2));
            let Some(contact) = self.contacts.get_mut(id) else { continue };
            if active {
                contact.update_manifold(s1, s2, f1, f2, &self.config.contact);
            }
            contact.persisting = false;
            contact.added_to_island = false;
        }
        for (_, joint) in self.joints.iter_mut() {
            joint.added_to_island = false;
        }
    }

    fn solve_islands(&mut self, ctx: &StepContext, stats: &mut StepStats) {
        let gravity = self.config.gravity;
        let sleep = self.config.sleep;
        let margin = self.config.aabb_margin;
        let dt = ctx.time_step;

        for slot in 0..self.bodies.slot_count() {
            let Some(handle) = self.bodies.handle_at(slot) else { continue };
            let Some(body) = self.bodies.get_mut(handle) else { continue };
            if body.added_to_island || body.is_static() || body.sleeping {
                continue;
            }

            let lonely = body.joints.is_empty()
                && body
                    .shapes
                    .iter()
                    .all(|s| self.shapes.get(*s).is_none_or(|s| s.contacts.is_empty()));
            if lonely {
                body.apply_gravity(gravity, dt);
                if body.is_sleep_eligible(&sleep) {
                    body.sleep_time += dt;
                    if body.sleep_time >= sleep.time_to_sleep {
                        body.sleep();
                        debug!(%handle, "body fell asleep");
                    } else {
                        body.update_position(dt);
                    }
                } else {
                    body.sleep_time = 0.0;
                    body.update_position(dt);
                }
                sync_shapes(body, &mut self.shapes, self.broad_phase.as_mut(), margin);
                stats.islands += 1;
                continue;
            }

            self.island
                .build(handle, &mut self.bodies, &self.shapes, &mut self.contacts, &mut self.joints);
            let rng = self.config.enable_randomizer.then_some(&mut self.rng);
            let outcome = self.island.solve(
                &mut self.bodies,
                &mut self.contacts,
                &mut self.joints,
                ctx,
                self.config.iterations,
                gravity,
                &sleep,
                rng,
            );
            for h in &self.island.bodies {
                if let Some(b) = self.bodies.get(*h) {
                    sync_shapes(b, &mut self.shapes, self.broad_phase.as_mut(), margin);
                }
            }
            stats.islands += 1;
            if outcome == IslandOutcome::Slept {
                debug!(seed = %handle, bodies = self.island.bodies.len(), "island fell asleep");
            }
        }
    }

    /// Removes everything and restarts the step counter and the shuffle
    /// generator. Handles issued before stay invalid.
    pub fn clear(&mut self) {
        for (handle, _) in self.shapes.iter() {
            self.broad_phase.remove_proxy(proxy_id(handle));
        }
        self.bodies.clear();
        self.shapes.clear();
        self.joints.clear();
        self.contacts.clear();
        self.names.clear();
        self.rng = Lcg::from_seed(self.config.random_seed);
        self.stats = StepStats::default();
        self.steps = 0;
        debug!("world cleared");
    }

    /// Counters from the most recent step.
    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    /// Steps taken since creation or the last [`Self::clear`].
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// BLAKE3 digest over every live body's handle, pose, velocities and
    /// sleep flag, in handle order.
    pub fn state_hash(&self) -> StateHash {
        let mut hasher = blake3::Hasher::new();
        for (handle, body) in self.bodies.iter() {
            hasher.update(&handle.index().to_le_bytes());
            hasher.update(&handle.generation().to_le_bytes());
            for v in [body.position(), body.linear_velocity(), body.angular_velocity()] {
                for c in v.to_array() {
                    hasher.update(&c.to_le_bytes());
                }
            }
            for c in body.orientation().to_array() {
                hasher.update(&c.to_le_bytes());
            }
            hasher.update(&[u8::from(body.is_sleeping())]);
        }
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::cast_precision_loss, clippy::unwrap_used)]
    use super::*;

    fn ball(world: &mut World, at: Vec3) -> (BodyHandle, ShapeHandle) {
        let body = world.add_body(BodyDesc::dynamic().with_position(at)).unwrap();
        let shape = world.add_shape(body, ShapeDesc::sphere(0.5)).unwrap();
        (body, shape)
    }

    #[test]
    fn rejects_bad_config() {
        let config = WorldConfig {
            iterations: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(World::new(config), Err(WorldError::InvalidConfig(_))));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut world = World::default();
        world.add_body(BodyDesc::dynamic().with_name("a")).unwrap();
        let err = world.add_body(BodyDesc::dynamic().with_name("a")).unwrap_err();
        assert_eq!(err, WorldError::DuplicateName("a".into()));
        assert_eq!(world.num_bodies(), 1);
    }

    #[test]
    fn overlapping_pair_creates_one_contact() {
        let mut world = World::default();
        let (_, a) = ball(&mut world, Vec3::ZERO);
        let (_, b) = ball(&mut world, Vec3::new(0.8, 0.0, 0.0));
        world.set_gravity(Vec3::ZERO);
        world.step();
        assert_eq!(world.num_contacts(), 1);
        assert_eq!(world.stats().contacts_added, 1);
        assert!(world.find_contact(a, b).is_some());
        world.step();
        assert_eq!(world.num_contacts(), 1);
        assert_eq!(world.stats().contacts_added, 0);
    }

    #[test]
    fn one_sweep_drops_every_separated_pair() {
        let mut world = World::default();
        world.set_gravity(Vec3::ZERO);
        let mut movers = Vec::new();
        for k in 0..3 {
            let x = 10.0 * k as f32;
            ball(&mut world, Vec3::new(x, 0.0, 0.0));
            movers.push(ball(&mut world, Vec3::new(x + 0.8, 0.0, 0.0)).0);
        }
        world.step();
        assert_eq!(world.num_contacts(), 3);

        world.reset_position(movers[0], Vec3::new(0.8, 5.0, 0.0)).unwrap();
        world.reset_position(movers[2], Vec3::new(20.8, 5.0, 0.0)).unwrap();
        world.step();

        assert_eq!(world.stats().contacts_removed, 2);
        assert_eq!(world.num_contacts(), 1);
        let survivor = world.contacts().next().unwrap();
        assert!(survivor.body1() == movers[1] || survivor.body2() == movers[1]);
    }

    #[test]
    fn shapes_on_one_body_never_collide() {
        let mut world = World::default();
        let body = world.add_body(BodyDesc::dynamic()).unwrap();
        world.add_shape(body, ShapeDesc::sphere(0.5)).unwrap();
        world
            .add_shape(body, ShapeDesc::sphere(0.5).with_offset(Vec3::new(0.5, 0.0, 0.0)))
            .unwrap();
        world.step();
        assert_eq!(world.num_contacts(), 0);
    }

    #[test]
    fn removing_a_body_drops_its_contacts_and_name() {
        let mut world = World::default();
        let named = world.add_body(BodyDesc::dynamic().with_name("gone")).unwrap();
        world.add_shape(named, ShapeDesc::sphere(0.5)).unwrap();
        ball(&mut world, Vec3::new(0.8, 0.0, 0.0));
        world.step();
        assert_eq!(world.num_contacts(), 1);
        world.remove_body(named).unwrap();
        assert_eq!(world.num_contacts(), 0);
        assert_eq!(world.num_shapes(), 1);
        assert!(world.body_by_name("gone").is_none());
        assert!(matches!(world.remove_body(named), Err(WorldError::UnknownBody(_))));
    }

    #[test]
    fn self_joint_is_rejected() {
        let mut world = World::default();
        let (body, _) = ball(&mut world, Vec3::ZERO);
        let err = world.add_joint(JointDesc::ball(body, body)).unwrap_err();
        assert_eq!(err, WorldError::SelfJoint(body));
        assert_eq!(world.num_joints(), 0);
    }
}
