//! Managed objects
//!
//! An [`ObjectRef`] is a shared handle to a reference-counted object. Cloning
//! a handle (or calling [`ObjectRef::retain`]) increments the count; dropping
//! one (or calling [`ObjectRef::release`]) decrements it. The count is atomic.
//!
//! Teardown runs through one path, [`ObjectCell::take_body`], reached either
//! by an explicit [`ObjectRef::deinit`] or by the last handle going away. It
//! releases every handle the object owns before the storage is freed.
//!
//! Object bodies sit behind a fair read/write lock, so a pending writer
//! blocks new readers. No code path holds one object's lock while waiting for
//! another object's lock, with one exception: set operations read members
//! while holding the set's lock. Members are never sets or queues, and
//! nothing holds a member's lock while waiting for a set.
//!
//! A string stored in a set is frozen: its content determines its hash, so
//! it cannot change while any set holds it.

use crate::descriptor::{self, Capability, TypeDescriptor, TypeKind, OBJECT_TYPE};
use crate::error::ObjectError;
use crate::message::Message;
use crate::set::Entry;
use core_types::ObjectId;
use object_set::ObjectSet;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

/// Lifecycle stage of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Allocated by [`ObjectRef::new_raw`], not yet initialized
    Raw,
    /// Initialized and usable
    Live,
    /// Torn down; every operation except identity queries fails
    TornDown,
}

impl Lifecycle {
    const fn to_u8(self) -> u8 {
        match self {
            Lifecycle::Raw => 0,
            Lifecycle::Live => 1,
            Lifecycle::TornDown => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Lifecycle::Raw,
            1 => Lifecycle::Live,
            _ => Lifecycle::TornDown,
        }
    }
}

/// Concrete storage for each type
pub(crate) enum Body {
    Base,
    String(Vec<u8>),
    Queue(VecDeque<ObjectRef>),
    Set(ObjectSet<Entry>),
    Message(Message),
}

impl Body {
    fn empty(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Object => Body::Base,
            TypeKind::String => Body::String(Vec::new()),
            TypeKind::Queue => Body::Queue(VecDeque::new()),
            TypeKind::Set => Body::Set(ObjectSet::new()),
            TypeKind::Message => Body::Message(Message::default()),
        }
    }

    fn kind(&self) -> TypeKind {
        match self {
            Body::Base => TypeKind::Object,
            Body::String(_) => TypeKind::String,
            Body::Queue(_) => TypeKind::Queue,
            Body::Set(_) => TypeKind::Set,
            Body::Message(_) => TypeKind::Message,
        }
    }
}

struct ObjectCell {
    id: ObjectId,
    descriptor: OnceLock<&'static TypeDescriptor>,
    state: AtomicU8,
    /// Number of set entries currently holding this object
    set_holds: AtomicUsize,
    body: RwLock<Body>,
}

impl ObjectCell {
    fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.state.load(AtomicOrdering::Acquire))
    }

    /// Marks the object torn down and hands back its body
    ///
    /// Returns `None` if teardown already happened.
    fn take_body(&self) -> Option<Body> {
        let mut body = self.body.write();
        if self.lifecycle() == Lifecycle::TornDown {
            return None;
        }
        self.state
            .store(Lifecycle::TornDown.to_u8(), AtomicOrdering::Release);
        Some(std::mem::replace(&mut *body, Body::Base))
    }
}

impl Drop for ObjectCell {
    fn drop(&mut self) {
        // Owned handles are released here, after the lock guard is gone.
        drop(self.take_body());
    }
}

/// Shared handle to a managed object
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

impl ObjectRef {
    /// Allocates a bare object of the root type with a count of one
    pub fn new_raw() -> Self {
        Self(Arc::new(ObjectCell {
            id: ObjectId::next(),
            descriptor: OnceLock::new(),
            state: AtomicU8::new(Lifecycle::Raw.to_u8()),
            set_holds: AtomicUsize::new(0),
            body: RwLock::new(Body::Base),
        }))
    }

    /// Allocates and initializes an object of the given type
    pub fn new(descriptor: &'static TypeDescriptor) -> Self {
        let object = Self::new_raw();
        object.install(descriptor, Body::empty(descriptor.kind()));
        object
    }

    /// Allocates a live object around an existing body
    pub(crate) fn with_body(body: Body) -> Self {
        let object = Self::new_raw();
        object.install(descriptor::descriptor_for(body.kind()), body);
        object
    }

    fn install(&self, descriptor: &'static TypeDescriptor, body: Body) {
        *self.0.body.write() = body;
        // Only reachable from a fresh raw object, so the cell is unset.
        let _ = self.0.descriptor.set(descriptor);
        self.0
            .state
            .store(Lifecycle::Live.to_u8(), AtomicOrdering::Release);
    }

    /// Runs the initializer for `descriptor` on a raw object
    ///
    /// The object takes on the type and an empty body of that type. Fails if
    /// the object was already initialized or torn down, or if a set holds it.
    pub fn init(&self, descriptor: &'static TypeDescriptor) -> Result<(), ObjectError> {
        let mut body = self.0.body.write();
        match self.lifecycle() {
            Lifecycle::Raw => {}
            Lifecycle::Live => return Err(ObjectError::AlreadyInitialized(self.id())),
            Lifecycle::TornDown => return Err(ObjectError::TornDown(self.id())),
        }
        // Initializing changes the hash from identity to content.
        self.ensure_mutable()?;
        if !descriptor.supports(Capability::Init) {
            return Err(ObjectError::Unsupported {
                type_name: descriptor.name(),
                capability: Capability::Init,
            });
        }
        *body = Body::empty(descriptor.kind());
        let _ = self.0.descriptor.set(descriptor);
        self.0
            .state
            .store(Lifecycle::Live.to_u8(), AtomicOrdering::Release);
        Ok(())
    }

    /// Tears the object down, releasing every handle it owns
    ///
    /// Returns `Ok(false)` if the object was already torn down. Storage
    /// itself is reclaimed when the last handle is released.
    pub fn deinit(&self) -> Result<bool, ObjectError> {
        if !self.supports(Capability::Deinit) {
            return Err(ObjectError::Unsupported {
                type_name: self.type_name(),
                capability: Capability::Deinit,
            });
        }
        Ok(match self.0.take_body() {
            Some(body) => {
                drop(body);
                true
            }
            None => false,
        })
    }

    /// Takes another reference to the object
    pub fn retain(&self) -> ObjectRef {
        self.clone()
    }

    /// Gives up this reference
    ///
    /// Returns `true` if it was the last one, in which case the object has
    /// been torn down and freed.
    pub fn release(self) -> bool {
        Arc::into_inner(self.0).is_some()
    }

    /// Returns the number of live handles
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns the object's identity
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    /// Checks whether two handles point at the same object
    pub fn same(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the object's type descriptor
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.0.descriptor.get().copied().unwrap_or(&OBJECT_TYPE)
    }

    /// Returns the object's type name
    pub fn type_name(&self) -> &'static str {
        self.descriptor().name()
    }

    /// Returns the lifecycle stage
    pub fn lifecycle(&self) -> Lifecycle {
        self.0.lifecycle()
    }

    /// Checks whether the object has not been torn down
    pub fn is_live(&self) -> bool {
        self.lifecycle() != Lifecycle::TornDown
    }

    /// Checks whether the object's type implements `capability`
    pub fn supports(&self, capability: Capability) -> bool {
        self.descriptor().supports(capability)
    }

    pub(crate) fn ensure_live(&self) -> Result<(), ObjectError> {
        if self.is_live() {
            Ok(())
        } else {
            Err(ObjectError::TornDown(self.id()))
        }
    }

    fn require(&self, capability: Capability) -> Result<(), ObjectError> {
        self.ensure_live()?;
        if self.supports(capability) {
            Ok(())
        } else {
            Err(ObjectError::Unsupported {
                type_name: self.type_name(),
                capability,
            })
        }
    }

    pub(crate) fn add_set_hold(&self) {
        self.0.set_holds.fetch_add(1, AtomicOrdering::SeqCst);
    }

    pub(crate) fn drop_set_hold(&self) {
        self.0.set_holds.fetch_sub(1, AtomicOrdering::SeqCst);
    }

    /// Returns the number of set entries holding this object
    pub fn set_holds(&self) -> usize {
        self.0.set_holds.load(AtomicOrdering::SeqCst)
    }

    /// Fails if a set holds the object
    ///
    /// Call with the object's write lock held so no insert can hash the old
    /// content in between.
    pub(crate) fn ensure_mutable(&self) -> Result<(), ObjectError> {
        if self.set_holds() == 0 {
            Ok(())
        } else {
            Err(ObjectError::HeldBySet(self.id()))
        }
    }

    pub(crate) fn ensure_kind(&self, kind: TypeKind) -> Result<(), ObjectError> {
        let descriptor = self.descriptor();
        if descriptor.kind() == kind {
            Ok(())
        } else {
            Err(ObjectError::TypeMismatch {
                expected: descriptor::descriptor_for(kind).name(),
                found: descriptor.name(),
            })
        }
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Body>, ObjectError> {
        let body = self.0.body.read();
        self.ensure_live()?;
        Ok(body)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Body>, ObjectError> {
        let body = self.0.body.write();
        self.ensure_live()?;
        Ok(body)
    }

    /// Computes the object's hash
    ///
    /// Strings hash their content; other hashable types hash their identity.
    pub fn hash(&self) -> Result<u64, ObjectError> {
        self.require(Capability::Hash)?;
        let mut hasher = DefaultHasher::new();
        match &*self.read()? {
            Body::String(bytes) => bytes.hash(&mut hasher),
            _ => self.id().hash(&mut hasher),
        }
        Ok(hasher.finish())
    }

    /// Three-way comparison with another object of the same type
    pub fn compare(&self, other: &ObjectRef) -> Result<Ordering, ObjectError> {
        self.require(Capability::Compare)?;
        other.ensure_live()?;
        if self.descriptor() != other.descriptor() {
            return Err(ObjectError::TypeMismatch {
                expected: self.type_name(),
                found: other.type_name(),
            });
        }
        if self.same(other) {
            return Ok(Ordering::Equal);
        }
        let unsupported = || ObjectError::Unsupported {
            type_name: self.type_name(),
            capability: Capability::Compare,
        };
        // Copy one side out so the two locks are never held together.
        let right = match &*other.read()? {
            Body::String(bytes) => bytes.clone(),
            _ => return Err(unsupported()),
        };
        match &*self.read()? {
            Body::String(left) => Ok(left.as_slice().cmp(right.as_slice())),
            _ => Err(unsupported()),
        }
    }

    /// Value equality used by sets
    ///
    /// Identical handles are always equal. Otherwise both objects must be of
    /// the same comparable type and compare equal; types without a comparator
    /// fall back to identity.
    pub fn equals(&self, other: &ObjectRef) -> bool {
        if self.same(other) {
            return true;
        }
        self.supports(Capability::Compare)
            && self.descriptor() == other.descriptor()
            && matches!(self.compare(other), Ok(Ordering::Equal))
    }

    /// Renders a human-readable description of the object
    pub fn dump(&self) -> Result<String, ObjectError> {
        self.require(Capability::Dump)?;
        let id = self.id();
        let name = self.type_name();
        let text = match &*self.read()? {
            Body::Base => format!("{} {}", name, id),
            Body::String(bytes) => format!(
                "{} {} len={} {:?}",
                name,
                id,
                bytes.len(),
                String::from_utf8_lossy(bytes)
            ),
            Body::Queue(items) => format!("{} {} len={}", name, id, items.len()),
            Body::Set(members) => format!("{} {} len={}", name, id, members.len()),
            Body::Message(message) => format!("{} {} {}", name, id, message.body()),
        };
        Ok(text)
    }

    /// Hands a snapshot of the object to `handler`
    ///
    /// Only runnable types (messages) support this. The handler runs without
    /// any lock held, so it may use handles to the same object.
    pub fn run<R>(&self, handler: impl FnOnce(&Message) -> R) -> Result<R, ObjectError> {
        self.require(Capability::Run)?;
        let message = match &*self.read()? {
            Body::Message(message) => message.clone(),
            _ => {
                return Err(ObjectError::Unsupported {
                    type_name: self.type_name(),
                    capability: Capability::Run,
                })
            }
        };
        Ok(handler(&message))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("id", &self.id())
            .field("type", &self.type_name())
            .field("lifecycle", &self.lifecycle())
            .field("refcount", &self.refcount())
            .field("set_holds", &self.set_holds())
            .finish()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.id())
    }
}

/// Declares a typed handle over [`ObjectRef`] for one concrete type.
macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(crate::object::ObjectRef);

        impl $name {
            /// Returns the underlying object handle
            pub fn as_object(&self) -> &crate::object::ObjectRef {
                &self.0
            }

            /// Converts into the underlying object handle
            pub fn into_object(self) -> crate::object::ObjectRef {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = crate::object::ObjectRef;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$name> for crate::object::ObjectRef {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }

        impl TryFrom<crate::object::ObjectRef> for $name {
            type Error = crate::error::ObjectError;

            fn try_from(object: crate::object::ObjectRef) -> Result<Self, Self::Error> {
                object.ensure_kind($kind)?;
                Ok(Self(object))
            }
        }
    };
}

pub(crate) use typed_handle;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{QUEUE_TYPE, STRING_TYPE};

    #[test]
    fn test_new_raw_is_root_type() {
        let object = ObjectRef::new_raw();
        assert_eq!(object.refcount(), 1);
        assert_eq!(object.lifecycle(), Lifecycle::Raw);
        assert_eq!(object.descriptor(), &OBJECT_TYPE);
    }

    #[test]
    fn test_new_raw_then_release_tears_down() {
        let object = ObjectRef::new_raw();
        assert!(object.release());
    }

    #[test]
    fn test_release_reports_last_reference() {
        let object = ObjectRef::new_raw();
        let other = object.retain();
        assert_eq!(object.refcount(), 2);

        assert!(!other.release());
        assert_eq!(object.refcount(), 1);
        assert!(object.release());
    }

    #[test]
    fn test_init_sets_type_once() {
        let object = ObjectRef::new_raw();
        object.init(&STRING_TYPE).unwrap();
        assert_eq!(object.type_name(), "String");
        assert_eq!(object.lifecycle(), Lifecycle::Live);

        assert_eq!(
            object.init(&QUEUE_TYPE),
            Err(ObjectError::AlreadyInitialized(object.id()))
        );
        assert_eq!(object.type_name(), "String");
    }

    #[test]
    fn test_deinit_happens_once() {
        let object = ObjectRef::new(&STRING_TYPE);
        assert_eq!(object.deinit(), Ok(true));
        assert_eq!(object.deinit(), Ok(false));
        assert!(!object.is_live());
        assert_eq!(object.init(&STRING_TYPE), Err(ObjectError::TornDown(object.id())));
    }

    #[test]
    fn test_torn_down_object_rejects_operations() {
        let object = ObjectRef::new_raw();
        object.deinit().unwrap();
        assert_eq!(object.hash(), Err(ObjectError::TornDown(object.id())));
        assert_eq!(object.dump(), Err(ObjectError::TornDown(object.id())));
    }

    #[test]
    fn test_identity_hash_is_stable() {
        let object = ObjectRef::new_raw();
        let other = ObjectRef::new_raw();
        assert_eq!(object.hash().unwrap(), object.hash().unwrap());
        assert_ne!(object.hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn test_missing_capability_is_an_error() {
        let queue = ObjectRef::new(&QUEUE_TYPE);
        assert_eq!(
            queue.hash(),
            Err(ObjectError::Unsupported {
                type_name: "Queue",
                capability: Capability::Hash,
            })
        );

        let object = ObjectRef::new_raw();
        assert!(matches!(
            object.compare(&ObjectRef::new_raw()),
            Err(ObjectError::Unsupported { .. })
        ));
        assert!(matches!(
            object.run(|_| ()),
            Err(ObjectError::Unsupported {
                capability: Capability::Run,
                ..
            })
        ));
    }

    #[test]
    fn test_compare_rejects_mixed_types() {
        let string = ObjectRef::new(&STRING_TYPE);
        let raw = ObjectRef::new_raw();
        assert_eq!(
            string.compare(&raw),
            Err(ObjectError::TypeMismatch {
                expected: "String",
                found: "Object",
            })
        );
        assert!(!string.equals(&raw));
    }

    #[test]
    fn test_identity_equality_fallback() {
        let a = ObjectRef::new_raw();
        let b = ObjectRef::new_raw();
        assert!(a.equals(&a.retain()));
        assert!(!a.equals(&b));
    }

    #[test]
    fn test_dump_names_type_and_id() {
        let object = ObjectRef::new_raw();
        let dump = object.dump().unwrap();
        assert!(dump.starts_with("Object obj#"));
    }

    #[test]
    fn test_owned_handles_released_on_teardown() {
        let member = ObjectRef::new_raw();
        let queue = ObjectRef::new(&QUEUE_TYPE);
        if let Body::Queue(items) = &mut *queue.write().unwrap() {
            items.push_back(member.retain());
        }
        assert_eq!(member.refcount(), 2);

        assert!(queue.release());
        assert_eq!(member.refcount(), 1);
    }

    #[test]
    fn test_run_handler_may_tear_down_its_message() {
        let message = ObjectRef::new(&crate::descriptor::MESSAGE_TYPE);
        let captured = message.retain();
        assert_eq!(message.run(|_| captured.deinit()), Ok(Ok(true)));
        assert!(!message.is_live());
    }

    #[test]
    fn test_init_rejected_while_held_by_set() {
        let object = ObjectRef::new_raw();
        object.add_set_hold();
        assert_eq!(
            object.init(&STRING_TYPE),
            Err(ObjectError::HeldBySet(object.id()))
        );
        assert_eq!(object.lifecycle(), Lifecycle::Raw);

        object.drop_set_hold();
        assert_eq!(object.init(&STRING_TYPE), Ok(()));
    }

    #[test]
    fn test_handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ObjectRef>();
    }
}
