//! Queue objects
//!
//! FIFO of object handles. The queue holds one reference to each element
//! from `push` until the element is popped or the queue is torn down.

use crate::descriptor::TypeKind;
use crate::error::ObjectError;
use crate::object::{typed_handle, Body, ObjectRef};
use std::collections::VecDeque;

typed_handle!(
    /// Handle to a Queue object
    QueueRef,
    TypeKind::Queue
);

impl QueueRef {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self(ObjectRef::with_body(Body::Queue(VecDeque::new())))
    }

    fn with_items<R>(
        &self,
        f: impl FnOnce(&mut VecDeque<ObjectRef>) -> R,
    ) -> Result<R, ObjectError> {
        match &mut *self.0.write()? {
            Body::Queue(items) => Ok(f(items)),
            _ => Err(ObjectError::TornDown(self.id())),
        }
    }

    /// Appends `object`, taking a reference to it
    ///
    /// Fails if either side has been torn down or if `object` is this queue.
    ///
    /// Only direct self-insertion is rejected. Queues that hold each other,
    /// directly or through longer chains, form a reference cycle that is never
    /// freed on its own; break it with [`QueueRef::drain`] or `deinit`.
    pub fn push(&self, object: &ObjectRef) -> Result<(), ObjectError> {
        if self.same(object) {
            return Err(ObjectError::SelfReference(self.id()));
        }
        object.ensure_live()?;
        let element = object.retain();
        self.with_items(|items| items.push_back(element))
    }

    /// Removes the front element and hands its reference to the caller
    pub fn pop(&self) -> Result<Option<ObjectRef>, ObjectError> {
        self.with_items(|items| items.pop_front())
    }

    /// Returns a new reference to the front element without removing it
    pub fn peek(&self) -> Result<Option<ObjectRef>, ObjectError> {
        self.with_items(|items| items.front().cloned())
    }

    /// Returns the number of queued elements
    pub fn len(&self) -> Result<usize, ObjectError> {
        self.with_items(|items| items.len())
    }

    /// Checks if the queue has no elements
    pub fn is_empty(&self) -> Result<bool, ObjectError> {
        self.with_items(|items| items.is_empty())
    }

    /// Removes every element in FIFO order
    pub fn drain(&self) -> Result<Vec<ObjectRef>, ObjectError> {
        self.with_items(|items| items.drain(..).collect())
    }
}

impl Default for QueueRef {
    fn default() -> Self {
        Self::new()
    }
}
