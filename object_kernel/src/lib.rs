//! # Object Kernel
//!
//! This crate defines the managed object model: reference-counted objects
//! whose behavior comes from a static type descriptor.
//!
//! ## Philosophy
//!
//! - **Explicit ownership**: Every stored handle is a counted reference
//! - **Capabilities, not inheritance**: A type implements an operation or it doesn't
//! - **Errors, not crashes**: Misuse of an object is a typed, recoverable error
//!
//! ## Architecture
//!
//! Every object starts as a bare root object. Initializing it with a
//! descriptor gives it a concrete type and an empty body:
//! - `String`: byte buffer with explicit length
//! - `Queue`: FIFO of object handles
//! - `Set`: hash set of hashable objects, with set algebra
//! - `Message`: decoded protocol payload, runnable by a handler
//!
//! Typed handles ([`StringRef`], [`QueueRef`], [`SetRef`], [`MessageRef`])
//! wrap an [`ObjectRef`] and expose the operations of their type.

pub mod descriptor;
pub mod error;
pub mod message;
pub mod object;
pub mod queue;
pub mod set;
pub mod string;

pub use descriptor::{
    Capabilities, Capability, TypeDescriptor, TypeKind, MESSAGE_TYPE, OBJECT_TYPE, QUEUE_TYPE,
    SET_TYPE, STRING_TYPE,
};
pub use error::ObjectError;
pub use message::{Message, MessageRef};
pub use object::{Lifecycle, ObjectRef};
pub use object_set::SetConfig;
pub use queue::QueueRef;
pub use set::SetRef;
pub use string::StringRef;
