//! # Core Types
//!
//! This crate defines the identity types shared by the object substrate.
//!
//! ## Philosophy
//!
//! - **Identity is explicit**: every managed object carries an id that never changes.
//! - **Cheap to copy**: ids are small `Copy` values that can be logged and compared freely.
//! - **No ambient registry**: ids are minted locally and need no global table to resolve.
//!
//! ## Key Types
//!
//! - [`ObjectId`]: Process-unique identity of a managed object
//! - [`MessageId`]: Globally unique identity of a decoded protocol message

pub mod ids;

pub use ids::{MessageId, ObjectId};
