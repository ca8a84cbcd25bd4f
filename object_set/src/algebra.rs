//! Set algebra
//!
//! Every operation builds a fresh set. Stored hashes are reused, so members
//! are never re-hashed and the operations cannot fail. When two operands hold
//! equal but distinct members, the member from `a` is the one kept.

use crate::set::{ObjectSet, SetMember};

impl<M: SetMember + Clone> ObjectSet<M> {
    /// Members present in `a` or `b`
    pub fn union(a: &Self, b: &Self) -> Self {
        let mut out = Self::with_capacity(a.len() + b.len());
        for slot in a.slots().chain(b.slots()) {
            out.insert_slot(slot.clone());
        }
        out
    }

    /// Members present in both `a` and `b`
    pub fn intersection(a: &Self, b: &Self) -> Self {
        let mut out = Self::with_capacity(a.len().min(b.len()));
        for slot in a.slots() {
            if b.find_slot(slot.hash, &slot.member).is_some() {
                out.insert_slot(slot.clone());
            }
        }
        out
    }

    /// Members present in exactly one of `a` and `b`
    pub fn symmetric_difference(a: &Self, b: &Self) -> Self {
        let mut out = Self::new();
        for slot in a.slots() {
            if b.find_slot(slot.hash, &slot.member).is_none() {
                out.insert_slot(slot.clone());
            }
        }
        for slot in b.slots() {
            if a.find_slot(slot.hash, &slot.member).is_none() {
                out.insert_slot(slot.clone());
            }
        }
        out
    }

    /// Members present in `a` but not in `b`
    pub fn difference(a: &Self, b: &Self) -> Self {
        let mut out = Self::new();
        for slot in a.slots() {
            if b.find_slot(slot.hash, &slot.member).is_none() {
                out.insert_slot(slot.clone());
            }
        }
        out
    }

    /// Checks whether every member of `self` is also in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len()
            && self
                .slots()
                .all(|slot| other.find_slot(slot.hash, &slot.member).is_some())
    }
}
