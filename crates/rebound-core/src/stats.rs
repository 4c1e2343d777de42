// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

/// Counters recorded by the most recent [`World::step`](crate::World::step).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepStats {
    /// Steps taken since the world was created or cleared.
    pub step: u64,
    /// Bodies in the world.
    pub bodies: usize,
    /// Shapes in the world.
    pub shapes: usize,
    /// Joints in the world.
    pub joints: usize,
    /// Live contacts after the narrow phase.
    pub contacts: usize,
    /// Contacts with a non-empty manifold.
    pub touching_contacts: usize,
    /// Manifold points across every contact.
    pub contact_points: usize,
    /// Contacts created this step.
    pub contacts_added: usize,
    /// Contacts destroyed this step.
    pub contacts_removed: usize,
    /// Islands solved, counting lonely bodies.
    pub islands: usize,
    /// AABB tests the broad phase performed.
    pub pair_checks: usize,
    /// Bodies asleep at the end of the step.
    pub sleeping_bodies: usize,
}
