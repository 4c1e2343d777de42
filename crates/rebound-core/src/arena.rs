// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Generational slot arena and the typed handles that address it.
//!
//! Bodies, shapes and joints live in arenas owned by the world. Everything
//! else refers to them by handle, so cross-links are never owning and a
//! removed object cannot be reached through a stale handle.

use core::fmt;
use core::marker::PhantomData;

/// Typed index into an [`Arena`].
pub trait ArenaHandle: Copy + Eq + fmt::Debug {
    /// Builds a handle from a slot index and generation.
    fn from_parts(index: u32, generation: u32) -> Self;
    /// Slot index.
    fn index(self) -> u32;
    /// Generation the slot had when this handle was issued.
    fn generation(self) -> u32;
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl ArenaHandle for $name {
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            fn index(self) -> u32 {
                self.index
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}v{}", $label, self.index, self.generation)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

define_handle!(
    /// Handle to a rigid body owned by a world.
    BodyHandle,
    "body"
);
define_handle!(
    /// Handle to a shape owned by a world.
    ShapeHandle,
    "shape"
);
define_handle!(
    /// Handle to a joint owned by a world.
    JointHandle,
    "joint"
);

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena with generation-checked handles and a free list.
///
/// Iteration is in slot-index order, which makes traversals deterministic.
#[derive(Debug, Clone)]
pub struct Arena<H, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _handle: PhantomData<H>,
}

impl<H: ArenaHandle, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ArenaHandle, T> Arena<H, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _handle: PhantomData,
        }
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when no values are live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a value built from its own handle.
    pub fn insert_with(&mut self, build: impl FnOnce(H) -> T) -> H {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let handle = H::from_parts(index, slot.generation);
            slot.value = Some(build(handle));
            return handle;
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        let handle = H::from_parts(index, 0);
        self.slots.push(Slot {
            generation: 0,
            value: Some(build(handle)),
        });
        handle
    }

    /// Inserts a value and returns its handle.
    pub fn insert(&mut self, value: T) -> H {
        self.insert_with(|_| value)
    }

    /// Removes and returns the value behind `handle`, bumping the slot
    /// generation so the handle goes stale.
    pub fn remove(&mut self, handle: H) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.len -= 1;
        Some(value)
    }

    /// `true` when `handle` refers to a live value.
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Shared access.
    pub fn get(&self, handle: H) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    /// Exclusive access.
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    /// Exclusive access to two distinct values at once.
    ///
    /// Returns `None` if either handle is stale or both name the same slot.
    pub fn pair_mut(&mut self, a: H, b: H) -> Option<(&mut T, &mut T)> {
        let (ia, ib) = (a.index() as usize, b.index() as usize);
        if ia == ib || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (lo, hi, swapped) = if ia < ib { (ia, ib, false) } else { (ib, ia, true) };
        let (head, tail) = self.slots.split_at_mut(hi);
        let first = head[lo].value.as_mut()?;
        let second = tail[0].value.as_mut()?;
        Some(if swapped { (second, first) } else { (first, second) })
    }

    /// Number of slots, live or free; an upper bound for [`Self::handle_at`].
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Handle of the live value at slot `index`, if any.
    pub fn handle_at(&self, index: usize) -> Option<H> {
        let slot = self.slots.get(index)?;
        let index = u32::try_from(index).ok()?;
        slot.value.as_ref().map(|_| H::from_parts(index, slot.generation))
    }

    /// Live handles in slot order.
    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(h, _)| h).collect()
    }

    /// Iterates live values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let index = u32::try_from(i).ok()?;
            slot.value.as_ref().map(|v| (H::from_parts(index, slot.generation), v))
        })
    }

    /// Iterates live values mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let index = u32::try_from(i).ok()?;
            let generation = slot.generation;
            slot.value.as_mut().map(|v| (H::from_parts(index, generation), v))
        })
    }

    /// Removes every value. Outstanding handles go stale.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                if let Ok(index) = u32::try_from(index) {
                    self.free.push(index);
                }
            }
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn removed_handle_goes_stale_and_slot_is_reused() {
        let mut arena: Arena<BodyHandle, &str> = Arena::new();
        let a = arena.insert("a");
        assert_eq!(arena.remove(a), Some("a"));
        assert!(arena.get(a).is_none());
        let b = arena.insert("b");
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.get(b), Some(&"b"));
    }

    #[test]
    fn pair_mut_returns_in_argument_order() {
        let mut arena: Arena<ShapeHandle, u32> = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let (x, y) = arena.pair_mut(b, a).unwrap();
        assert_eq!((*x, *y), (2, 1));
        *x = 20;
        assert_eq!(arena.get(b), Some(&20));
        assert!(arena.pair_mut(a, a).is_none());
    }

    #[test]
    fn iteration_is_in_slot_order() {
        let mut arena: Arena<JointHandle, char> = Arena::new();
        let a = arena.insert('a');
        let _b = arena.insert('b');
        arena.remove(a);
        let _c = arena.insert('c');
        let values: Vec<char> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!['c', 'b']);
        assert_eq!(arena.len(), 2);
    }
}
