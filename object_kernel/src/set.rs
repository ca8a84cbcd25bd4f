//! Set objects
//!
//! A set stores handles to hashable objects with no two members equal under
//! [`ObjectRef::equals`]. Membership is by value: a lookup with a different
//! but equal object finds the stored member.
//!
//! Every stored member carries a set hold (see [`ObjectRef::set_holds`]).
//! While any hold is outstanding the member's content, and so its hash,
//! cannot change.
//!
//! The algebra operations (`union`, `intersection`, `xor`, `difference`)
//! write into a destination set that must be empty and distinct from both
//! operands, so their result never depends on what the destination held.

use crate::descriptor::TypeKind;
use crate::error::ObjectError;
use crate::object::{typed_handle, Body, ObjectRef};
use object_set::{ObjectSet, SetConfig, SetMember};

/// A set's reference to one member
///
/// Stored entries count towards the member's set holds; a lookup entry does
/// not.
#[derive(Debug)]
pub(crate) struct Entry {
    object: ObjectRef,
    counted: bool,
}

impl Entry {
    /// Takes a counted reference to `object`
    fn hold(object: ObjectRef) -> Self {
        object.add_set_hold();
        Self {
            object,
            counted: true,
        }
    }

    /// Wraps `object` for a lookup without freezing it
    fn lookup(object: &ObjectRef) -> Self {
        Self {
            object: object.retain(),
            counted: false,
        }
    }

    fn object(&self) -> &ObjectRef {
        &self.object
    }
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Self::hold(self.object.retain())
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        if self.counted {
            self.object.drop_set_hold();
        }
    }
}

impl SetMember for Entry {
    type Error = ObjectError;

    fn member_hash(&self) -> Result<u64, ObjectError> {
        self.object.hash()
    }

    fn member_eq(&self, other: &Self) -> bool {
        self.object.equals(&other.object)
    }
}

typed_handle!(
    /// Handle to a Set object
    SetRef,
    TypeKind::Set
);

impl SetRef {
    /// Creates an empty set
    pub fn new() -> Self {
        Self(ObjectRef::with_body(Body::Set(ObjectSet::new())))
    }

    /// Creates an empty set using the given settings
    pub fn with_config(config: SetConfig) -> Self {
        Self(ObjectRef::with_body(Body::Set(ObjectSet::with_config(config))))
    }

    fn with_members<R>(
        &self,
        f: impl FnOnce(&ObjectSet<Entry>) -> R,
    ) -> Result<R, ObjectError> {
        match &*self.0.read()? {
            Body::Set(members) => Ok(f(members)),
            _ => Err(ObjectError::TornDown(self.id())),
        }
    }

    fn with_members_mut<R>(
        &self,
        f: impl FnOnce(&mut ObjectSet<Entry>) -> R,
    ) -> Result<R, ObjectError> {
        match &mut *self.0.write()? {
            Body::Set(members) => Ok(f(members)),
            _ => Err(ObjectError::TornDown(self.id())),
        }
    }

    /// Inserts `object`, taking a reference to it
    ///
    /// Returns `Ok(false)` without taking a reference if an equal member is
    /// already stored. Fails if `object` is not hashable or is this set.
    /// A stored string cannot be modified until every set holding it lets go.
    pub fn insert(&self, object: &ObjectRef) -> Result<bool, ObjectError> {
        if self.same(object) {
            return Err(ObjectError::SelfReference(self.id()));
        }
        // The hold is taken before hashing, so a concurrent `cat` either
        // finishes first or is refused.
        let entry = Entry::hold(object.retain());
        // Hash before taking the set's write lock; a failure leaves the set untouched.
        entry.member_hash()?;
        self.with_members_mut(|members| members.insert(entry))?
    }

    /// Removes the member equal to `object` and releases the set's reference
    pub fn remove(&self, object: &ObjectRef) -> Result<(), ObjectError> {
        let wanted = Entry::lookup(object);
        let removed = self.with_members_mut(|members| members.remove(&wanted))??;
        match removed {
            Some(member) => {
                drop(member);
                Ok(())
            }
            None => Err(ObjectError::NotFound(self.id())),
        }
    }

    /// Returns the stored member equal to `object`, if any
    ///
    /// Objects that cannot be hashed are never members, so looking one up
    /// yields `None` rather than an error.
    pub fn get(&self, object: &ObjectRef) -> Result<Option<ObjectRef>, ObjectError> {
        if !object.is_live() || object.hash().is_err() {
            self.0.ensure_live()?;
            return Ok(None);
        }
        let wanted = Entry::lookup(object);
        self.with_members(|members| {
            members
                .get(&wanted)
                .map(|found| found.map(|entry| entry.object().retain()))
        })?
    }

    /// Checks whether a member equal to `object` is stored
    pub fn contains(&self, object: &ObjectRef) -> Result<bool, ObjectError> {
        Ok(self.get(object)?.is_some())
    }

    /// Returns the number of members
    pub fn len(&self) -> Result<usize, ObjectError> {
        self.with_members(|members| members.len())
    }

    /// Checks if the set has no members
    pub fn is_empty(&self) -> Result<bool, ObjectError> {
        self.with_members(|members| members.is_empty())
    }

    /// Returns new references to every member, in unspecified order
    pub fn members(&self) -> Result<Vec<ObjectRef>, ObjectError> {
        self.with_members(|members| {
            members
                .iter()
                .map(|entry| entry.object().retain())
                .collect()
        })
    }

    /// Removes every member, releasing the set's references
    pub fn clear(&self) -> Result<(), ObjectError> {
        let drained = self.with_members_mut(|members| members.drain())?;
        drop(drained);
        Ok(())
    }

    /// Makes `self` the set of members present in `a` or `b`
    pub fn union(&self, a: &SetRef, b: &SetRef) -> Result<(), ObjectError> {
        self.combine(a, b, ObjectSet::union)
    }

    /// Makes `self` the set of members present in both `a` and `b`
    pub fn intersection(&self, a: &SetRef, b: &SetRef) -> Result<(), ObjectError> {
        self.combine(a, b, ObjectSet::intersection)
    }

    /// Makes `self` the set of members present in exactly one of `a` and `b`
    pub fn xor(&self, a: &SetRef, b: &SetRef) -> Result<(), ObjectError> {
        self.combine(a, b, ObjectSet::symmetric_difference)
    }

    /// Makes `self` the set of members present in `a` but not in `b`
    pub fn difference(&self, a: &SetRef, b: &SetRef) -> Result<(), ObjectError> {
        self.combine(a, b, ObjectSet::difference)
    }

    fn combine(
        &self,
        a: &SetRef,
        b: &SetRef,
        op: impl FnOnce(&ObjectSet<Entry>, &ObjectSet<Entry>) -> ObjectSet<Entry>,
    ) -> Result<(), ObjectError> {
        if self.same(a) || self.same(b) {
            return Err(ObjectError::AliasedDestination(self.id()));
        }
        if !self.is_empty()? {
            return Err(ObjectError::DestinationNotEmpty(self.id()));
        }

        // Snapshot `a` so the two operand locks are never held together.
        let left = a.with_members(ObjectSet::clone)?;
        let result = if a.same(b) {
            op(&left, &left)
        } else {
            b.with_members(|right| op(&left, right))?
        };
        drop(left);

        let previous = self.with_members_mut(|members| {
            if members.is_empty() {
                Ok(std::mem::replace(members, result))
            } else {
                Err(ObjectError::DestinationNotEmpty(self.id()))
            }
        })??;
        drop(previous);
        Ok(())
    }
}

impl Default for SetRef {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Capability;
    use crate::queue::QueueRef;
    use crate::string::StringRef;

    #[test]
    fn test_empty_set() {
        let set = SetRef::new();
        assert_eq!(set.len(), Ok(0));
        assert!(set.get(&ObjectRef::new_raw()).unwrap().is_none());
    }

    #[test]
    fn test_insert_takes_reference() {
        let set = SetRef::new();
        let object = ObjectRef::new_raw();
        assert_eq!(set.insert(&object), Ok(true));
        assert_eq!(object.refcount(), 2);

        // Second insert of the same object is a no-op
        assert_eq!(set.insert(&object), Ok(false));
        assert_eq!(object.refcount(), 2);
        assert_eq!(set.len(), Ok(1));
    }

    #[test]
    fn test_insert_remove_get() {
        let set = SetRef::new();
        let object = ObjectRef::new_raw();
        set.insert(&object).unwrap();
        set.remove(&object).unwrap();

        assert!(set.get(&object).unwrap().is_none());
        assert_eq!(object.refcount(), 1);
        assert_eq!(set.remove(&object), Err(ObjectError::NotFound(set.id())));
    }

    #[test]
    fn test_lookup_by_value() {
        let set = SetRef::new();
        let stored = StringRef::from_text("window");
        set.insert(&stored).unwrap();

        let wanted = StringRef::from_text("window");
        let found = set.get(&wanted).unwrap().unwrap();
        assert!(found.same(&stored));
        assert!(!found.same(&wanted));

        // An equal string is a duplicate
        assert_eq!(set.insert(&wanted), Ok(false));
        assert_eq!(wanted.refcount(), 1);
    }

    #[test]
    fn test_unhashable_rejected() {
        let set = SetRef::new();
        let queue = QueueRef::new();
        assert_eq!(
            set.insert(&queue),
            Err(ObjectError::Unsupported {
                type_name: "Queue",
                capability: Capability::Hash,
            })
        );
        assert_eq!(queue.refcount(), 1);
        assert!(set.get(&queue).unwrap().is_none());
    }

    #[test]
    fn test_insert_into_itself_rejected() {
        let set = SetRef::new();
        assert_eq!(
            set.insert(set.as_object()),
            Err(ObjectError::SelfReference(set.id()))
        );
    }

    #[test]
    fn test_teardown_releases_members() {
        let set = SetRef::new();
        let shared = ObjectRef::new_raw();
        set.insert(&shared).unwrap();

        assert!(set.into_object().release());
        assert_eq!(shared.set_holds(), 0);
        // Still referenced here, so it survives the set
        assert_eq!(shared.refcount(), 1);
        assert!(shared.is_live());
    }

    #[test]
    fn test_clear() {
        let set = SetRef::with_config(SetConfig::with_capacity(2));
        let objects: Vec<ObjectRef> = (0..4).map(|_| ObjectRef::new_raw()).collect();
        for object in &objects {
            set.insert(object).unwrap();
        }
        set.clear().unwrap();
        assert_eq!(set.is_empty(), Ok(true));
        assert!(objects.iter().all(|object| object.refcount() == 1));
    }

    #[test]
    fn test_algebra_requires_fresh_destination() {
        let a = SetRef::new();
        let b = SetRef::new();
        a.insert(&ObjectRef::new_raw()).unwrap();

        assert_eq!(a.union(&a, &b), Err(ObjectError::AliasedDestination(a.id())));

        let dest = SetRef::new();
        dest.insert(&ObjectRef::new_raw()).unwrap();
        assert_eq!(
            dest.union(&a, &b),
            Err(ObjectError::DestinationNotEmpty(dest.id()))
        );
    }

    #[test]
    fn test_algebra_with_same_operand() {
        let a = SetRef::new();
        let objects: Vec<ObjectRef> = (0..3).map(|_| ObjectRef::new_raw()).collect();
        for object in &objects {
            a.insert(object).unwrap();
        }

        let dest = SetRef::new();
        dest.union(&a, &a).unwrap();
        assert_eq!(dest.len(), Ok(3));

        let dest = SetRef::new();
        dest.xor(&a, &a).unwrap();
        assert_eq!(dest.len(), Ok(0));
    }

    #[test]
    fn test_algebra_retains_results() {
        let a = SetRef::new();
        let b = SetRef::new();
        let object = ObjectRef::new_raw();
        a.insert(&object).unwrap();
        b.insert(&object).unwrap();
        assert_eq!(object.refcount(), 3);

        let dest = SetRef::new();
        dest.intersection(&a, &b).unwrap();
        assert_eq!(object.refcount(), 4);

        drop(dest);
        assert_eq!(object.refcount(), 3);
    }

    #[test]
    fn test_stored_string_is_frozen() {
        let set = SetRef::new();
        let stored = StringRef::from_text("a");
        set.insert(&stored).unwrap();
        assert_eq!(stored.set_holds(), 1);

        let suffix = StringRef::from_text("b");
        assert!(matches!(
            stored.cat(&suffix),
            Err(ObjectError::HeldBySet(id)) if id == stored.id()
        ));
        assert_eq!(stored.to_bytes().unwrap(), b"a");

        // "ab" is a distinct value, and lookups still find the right member
        let other = StringRef::from_text("ab");
        assert_eq!(set.insert(&other), Ok(true));
        assert_eq!(set.len(), Ok(2));
        assert!(set.get(&stored).unwrap().unwrap().same(&stored));

        set.remove(&stored).unwrap();
        assert_eq!(stored.set_holds(), 0);
        assert!(set.contains(&other).unwrap());
        stored.cat(&suffix).unwrap();
        assert_eq!(stored.to_bytes().unwrap(), b"ab");
    }

    #[test]
    fn test_set_holds_follow_every_entry() {
        let text = StringRef::from_text("k");
        let a = SetRef::new();
        let b = SetRef::new();
        a.insert(&text).unwrap();
        b.insert(&text).unwrap();
        // A duplicate insert takes no hold
        a.insert(&StringRef::from_text("k")).unwrap();
        assert_eq!(text.set_holds(), 2);

        let dest = SetRef::new();
        dest.union(&a, &b).unwrap();
        assert_eq!(text.set_holds(), 3);

        drop(dest);
        a.clear().unwrap();
        assert_eq!(text.set_holds(), 1);
        assert!(text.cat(&StringRef::new()).is_err());

        assert_eq!(b.deinit(), Ok(true));
        assert_eq!(text.set_holds(), 0);
        assert!(text.cat(&StringRef::from_text("!")).is_ok());
    }

    #[test]
    fn test_lookup_takes_no_hold() {
        let set = SetRef::new();
        let wanted = StringRef::from_text("absent");
        assert!(!set.contains(&wanted).unwrap());
        assert!(set.remove(&wanted).is_err());
        assert_eq!(wanted.set_holds(), 0);
        assert_eq!(wanted.refcount(), 1);
    }

    #[test]
    fn test_failed_insert_takes_no_hold() {
        let set = SetRef::new();
        set.deinit().unwrap();
        let text = StringRef::from_text("late");
        assert!(set.insert(&text).is_err());
        assert_eq!(text.set_holds(), 0);
        assert_eq!(text.refcount(), 1);
    }

    #[test]
    fn test_difference() {
        let a = SetRef::new();
        let b = SetRef::new();
        let only_a = ObjectRef::new_raw();
        let both = ObjectRef::new_raw();
        a.insert(&only_a).unwrap();
        a.insert(&both).unwrap();
        b.insert(&both).unwrap();

        let dest = SetRef::new();
        dest.difference(&a, &b).unwrap();
        assert_eq!(dest.len(), Ok(1));
        assert!(dest.contains(&only_a).unwrap());
    }
}
