//! Hash set storage

use crate::config::SetConfig;
use hashbrown::hash_table::{Entry, HashTable};

/// A value that can be stored in an [`ObjectSet`]
///
/// Hashing may fail: some values are simply not hashable, and the set reports
/// that back to the caller instead of storing them. Equality must be
/// consistent with the hash: members that compare equal must hash equal.
pub trait SetMember {
    /// Error returned when the member cannot be hashed
    type Error;

    /// Computes the member's hash
    fn member_hash(&self) -> Result<u64, Self::Error>;

    /// Checks whether two members are equal
    fn member_eq(&self, other: &Self) -> bool;
}

/// One stored member together with the hash it was inserted under
#[derive(Debug, Clone)]
pub(crate) struct Slot<M> {
    pub(crate) hash: u64,
    pub(crate) member: M,
}

/// Hash set of [`SetMember`] values
///
/// No two stored members are equal under [`SetMember::member_eq`].
#[derive(Debug, Clone)]
pub struct ObjectSet<M> {
    table: HashTable<Slot<M>>,
}

impl<M> Default for ObjectSet<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ObjectSet<M> {
    /// Creates an empty set
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
        }
    }

    /// Creates an empty set with room for `capacity` members
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
        }
    }

    /// Creates an empty set using the given settings
    pub fn with_config(config: SetConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Returns the number of members
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Checks if the set has no members
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterates over the members in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &M> + '_ {
        self.table.iter().map(|slot| &slot.member)
    }

    /// Removes every member and hands them back to the caller
    pub fn drain(&mut self) -> Vec<M> {
        self.table.drain().map(|slot| slot.member).collect()
    }

    /// Removes every member
    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = &Slot<M>> + '_ {
        self.table.iter()
    }
}

impl<M: SetMember> ObjectSet<M> {
    /// Inserts a member
    ///
    /// Returns `Ok(true)` if the member was stored and `Ok(false)` if an equal
    /// member was already present, in which case `member` is dropped.
    pub fn insert(&mut self, member: M) -> Result<bool, M::Error> {
        let hash = member.member_hash()?;
        Ok(self.insert_slot(Slot { hash, member }))
    }

    /// Removes the member equal to `wanted`
    ///
    /// Returns the stored member, or `None` if no equal member exists.
    pub fn remove(&mut self, wanted: &M) -> Result<Option<M>, M::Error> {
        let hash = wanted.member_hash()?;
        let found = self
            .table
            .find_entry(hash, |slot| slot.hash == hash && slot.member.member_eq(wanted));
        Ok(match found {
            Ok(entry) => {
                let (slot, _) = entry.remove();
                Some(slot.member)
            }
            Err(_) => None,
        })
    }

    /// Returns the stored member equal to `wanted`, if any
    pub fn get(&self, wanted: &M) -> Result<Option<&M>, M::Error> {
        let hash = wanted.member_hash()?;
        Ok(self.find_slot(hash, wanted).map(|slot| &slot.member))
    }

    /// Checks whether a member equal to `wanted` is stored
    pub fn contains(&self, wanted: &M) -> Result<bool, M::Error> {
        Ok(self.get(wanted)?.is_some())
    }

    /// Stores a slot unless an equal member is already present
    pub(crate) fn insert_slot(&mut self, slot: Slot<M>) -> bool {
        let hash = slot.hash;
        let entry = self.table.entry(
            hash,
            |stored| stored.hash == hash && stored.member.member_eq(&slot.member),
            |stored| stored.hash,
        );
        match entry {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
                true
            }
        }
    }

    /// Finds the slot holding a member equal to `wanted` under `hash`
    pub(crate) fn find_slot(&self, hash: u64, wanted: &M) -> Option<&Slot<M>> {
        self.table
            .find(hash, |slot| slot.hash == hash && slot.member.member_eq(wanted))
    }
}
