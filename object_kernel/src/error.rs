//! Object kernel errors

use crate::descriptor::Capability;
use core_types::ObjectId;
use thiserror::Error;

/// Errors returned by object operations
///
/// None of these are fatal; an operation that fails leaves its operands
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("{0} has been torn down")]
    TornDown(ObjectId),

    #[error("{0} is already initialized")]
    AlreadyInitialized(ObjectId),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Type {type_name} does not support {capability}")]
    Unsupported {
        type_name: &'static str,
        capability: Capability,
    },

    #[error("{0} cannot be stored inside itself")]
    SelfReference(ObjectId),

    #[error("Destination {0} is also an operand")]
    AliasedDestination(ObjectId),

    #[error("Destination {0} is not empty")]
    DestinationNotEmpty(ObjectId),

    #[error("No equal member in {0}")]
    NotFound(ObjectId),

    /// The object's hash would change while a set holds it
    #[error("{0} is held by a set and cannot be modified")]
    HeldBySet(ObjectId),
}
