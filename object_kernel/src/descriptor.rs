//! Type descriptors
//!
//! Every managed object points at one static [`TypeDescriptor`]. Descriptors
//! form a single-inheritance chain ending at [`OBJECT_TYPE`] and list the
//! capabilities the concrete type implements.
//!
//! Capabilities are not inherited: a subtype that does not list `hash` is
//! not hashable even if its supertype is. Dispatch therefore only ever looks
//! at the object's own descriptor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An optional polymorphic operation a type may implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Init,
    Deinit,
    Hash,
    Compare,
    Dump,
    Run,
}

impl Capability {
    /// All capabilities, in declaration order
    pub const ALL: [Capability; 6] = [
        Capability::Init,
        Capability::Deinit,
        Capability::Hash,
        Capability::Compare,
        Capability::Dump,
        Capability::Run,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Returns the capability name
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Init => "init",
            Capability::Deinit => "deinit",
            Capability::Hash => "hash",
            Capability::Compare => "compare",
            Capability::Dump => "dump",
            Capability::Run => "run",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of capabilities supported by a type
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No capabilities
    pub const NONE: Capabilities = Capabilities(0);

    /// Returns this set with `capability` added
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Checks whether `capability` is in the set
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Iterates over the capabilities in the set
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Concrete body layout of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Object,
    String,
    Queue,
    Set,
    Message,
}

/// Immutable per-type record
#[derive(Debug)]
pub struct TypeDescriptor {
    name: &'static str,
    supertype: Option<&'static TypeDescriptor>,
    kind: TypeKind,
    capabilities: Capabilities,
}

impl TypeDescriptor {
    /// Returns the type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the immediate supertype, `None` for the root
    pub fn supertype(&self) -> Option<&'static TypeDescriptor> {
        self.supertype
    }

    /// Returns the body layout
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the capability set
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Checks whether this type implements `capability`
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Iterates from the immediate supertype up to the root
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.supertype,
        }
    }

    /// Checks whether this type is `other` or descends from it
    pub fn is_subtype_of(&self, other: &TypeDescriptor) -> bool {
        self == other || self.ancestors().any(|ancestor| ancestor == other)
    }

    /// Number of supertype links between this type and the root
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a descriptor's supertype chain
pub struct Ancestors {
    next: Option<&'static TypeDescriptor>,
}

impl Iterator for Ancestors {
    type Item = &'static TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.supertype;
        Some(current)
    }
}

const LIFECYCLE: Capabilities = Capabilities::NONE
    .with(Capability::Init)
    .with(Capability::Deinit);

/// Root of every supertype chain
pub static OBJECT_TYPE: TypeDescriptor = TypeDescriptor {
    name: "Object",
    supertype: None,
    kind: TypeKind::Object,
    capabilities: LIFECYCLE.with(Capability::Hash).with(Capability::Dump),
};

pub static STRING_TYPE: TypeDescriptor = TypeDescriptor {
    name: "String",
    supertype: Some(&OBJECT_TYPE),
    kind: TypeKind::String,
    capabilities: LIFECYCLE
        .with(Capability::Hash)
        .with(Capability::Compare)
        .with(Capability::Dump),
};

pub static QUEUE_TYPE: TypeDescriptor = TypeDescriptor {
    name: "Queue",
    supertype: Some(&OBJECT_TYPE),
    kind: TypeKind::Queue,
    capabilities: LIFECYCLE.with(Capability::Dump),
};

pub static SET_TYPE: TypeDescriptor = TypeDescriptor {
    name: "Set",
    supertype: Some(&OBJECT_TYPE),
    kind: TypeKind::Set,
    capabilities: LIFECYCLE.with(Capability::Dump),
};

pub static MESSAGE_TYPE: TypeDescriptor = TypeDescriptor {
    name: "Message",
    supertype: Some(&OBJECT_TYPE),
    kind: TypeKind::Message,
    capabilities: LIFECYCLE
        .with(Capability::Hash)
        .with(Capability::Dump)
        .with(Capability::Run),
};

static TYPE_TABLE: [&TypeDescriptor; 5] = [
    &OBJECT_TYPE,
    &STRING_TYPE,
    &QUEUE_TYPE,
    &SET_TYPE,
    &MESSAGE_TYPE,
];

/// Returns every registered descriptor, root first
pub fn descriptors() -> &'static [&'static TypeDescriptor] {
    &TYPE_TABLE
}

/// Looks up a descriptor by type name
pub fn lookup(name: &str) -> Option<&'static TypeDescriptor> {
    TYPE_TABLE
        .iter()
        .copied()
        .find(|descriptor| descriptor.name == name)
}

/// Returns the descriptor for a body layout
pub fn descriptor_for(kind: TypeKind) -> &'static TypeDescriptor {
    match kind {
        TypeKind::Object => &OBJECT_TYPE,
        TypeKind::String => &STRING_TYPE,
        TypeKind::Queue => &QUEUE_TYPE,
        TypeKind::Set => &SET_TYPE,
        TypeKind::Message => &MESSAGE_TYPE,
    }
}
