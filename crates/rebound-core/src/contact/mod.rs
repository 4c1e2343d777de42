// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contacts between overlapping shapes.
//!
//! A contact exists while its shapes' bounds overlap. Each step it re-runs
//! its narrow-phase detector, matches the new points against the previous
//! ones to carry warm-start impulses over, and then takes part in the
//! island solve as a [`Constraint`](crate::constraint::Constraint).

#[allow(clippy::module_inception)]
mod contact;
pub mod manifold;
mod solver;

use core::fmt;

pub use contact::Contact;
pub use manifold::{BodyFrame, ContactManifold, ManifoldPoint, ManifoldWriter, MAX_MANIFOLD_POINTS};

/// Slot of a contact in the world's contact pool.
///
/// Ids are reused once a contact is removed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactId(pub(crate) u32);

impl ContactId {
    /// Raw slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contact#{}", self.0)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pool of live contacts, iterated in slot order.
#[derive(Debug, Clone, Default)]
pub struct ContactSet {
    slots: Vec<Option<Contact>>,
    free: Vec<u32>,
    len: usize,
}

impl ContactSet {
    /// Number of live contacts.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` with no live contacts.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Next id [`Self::insert`] will hand out.
    pub(crate) fn next_id(&self) -> ContactId {
        self.free.last().map_or_else(
            || ContactId(u32::try_from(self.slots.len()).unwrap_or(u32::MAX)),
            |&i| ContactId(i),
        )
    }

    /// Stores a contact built for [`Self::next_id`].
    pub(crate) fn insert(&mut self, contact: Contact) -> ContactId {
        let id = contact.id();
        debug_assert_eq!(id, self.next_id());
        if self.free.last() == Some(&id.0) {
            self.free.pop();
            self.slots[id.index()] = Some(contact);
        } else {
            self.slots.push(Some(contact));
        }
        self.len += 1;
        id
    }

    /// Removes and returns a contact.
    pub(crate) fn remove(&mut self, id: ContactId) -> Option<Contact> {
        let contact = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(contact)
    }

    /// Shared access.
    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.slots.get(id.index())?.as_ref()
    }

    /// Exclusive access.
    pub(crate) fn get_mut(&mut self, id: ContactId) -> Option<&mut Contact> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Live ids in slot order.
    pub fn ids(&self) -> Vec<ContactId> {
        self.iter().map(Contact::id).collect()
    }

    /// Number of slots, live or free.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Id of the live contact in slot `index`, if any.
    pub(crate) fn id_at(&self, index: usize) -> Option<ContactId> {
        self.slots.get(index)?.as_ref().map(Contact::id)
    }

    /// Live contacts in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.slots.iter().flatten()
    }

    /// Drops every contact and forgets freed slots.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}
