//! Closed registry of interceptable operation kinds
//!
//! Every structural operation a shell can intercept is a member of
//! [`OpKind`]. The set is fixed at design time; there is no dynamic
//! registration. Each kind carries a unique, namespaced string identifier
//! that is stable for the lifetime of the process, so handler tables,
//! diagnostics, and introspection can refer to operations without risking
//! name collisions with ordinary attribute keys.

use std::fmt;

/// One interceptable structural operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Attribute read.
    Get,
    /// Attribute write.
    Set,
    /// Attribute deletion.
    Delete,
    /// Attribute existence query.
    Has,
    /// Own-key enumeration.
    OwnKeys,
    /// Attribute definition with an explicit descriptor.
    Define,
    /// Own-attribute descriptor query.
    Describe,
    /// Prototype read.
    Prototype,
    /// Prototype replacement.
    SetPrototype,
    /// Extensibility query.
    IsExtensible,
    /// Extensibility revocation.
    PreventExtensions,
    /// Invocation as a function.
    Apply,
    /// Invocation as a constructor.
    Construct,
    /// Fallback hook for reads of absent attributes.
    Missing,
}

impl OpKind {
    /// Every operation kind, in declaration order.
    pub const ALL: [OpKind; 14] = [
        OpKind::Get,
        OpKind::Set,
        OpKind::Delete,
        OpKind::Has,
        OpKind::OwnKeys,
        OpKind::Define,
        OpKind::Describe,
        OpKind::Prototype,
        OpKind::SetPrototype,
        OpKind::IsExtensible,
        OpKind::PreventExtensions,
        OpKind::Apply,
        OpKind::Construct,
        OpKind::Missing,
    ];

    /// Short lower-case name of the operation.
    pub const fn name(self) -> &'static str {
        match self {
            OpKind::Get => "get",
            OpKind::Set => "set",
            OpKind::Delete => "delete",
            OpKind::Has => "has",
            OpKind::OwnKeys => "own-keys",
            OpKind::Define => "define",
            OpKind::Describe => "describe",
            OpKind::Prototype => "prototype",
            OpKind::SetPrototype => "set-prototype",
            OpKind::IsExtensible => "is-extensible",
            OpKind::PreventExtensions => "prevent-extensions",
            OpKind::Apply => "apply",
            OpKind::Construct => "construct",
            OpKind::Missing => "missing",
        }
    }

    /// Namespaced identifier, unique across the registry and stable for
    /// the process lifetime.
    pub const fn key(self) -> &'static str {
        match self {
            OpKind::Get => "/husk/op/get",
            OpKind::Set => "/husk/op/set",
            OpKind::Delete => "/husk/op/delete",
            OpKind::Has => "/husk/op/has",
            OpKind::OwnKeys => "/husk/op/own-keys",
            OpKind::Define => "/husk/op/define",
            OpKind::Describe => "/husk/op/describe",
            OpKind::Prototype => "/husk/op/prototype",
            OpKind::SetPrototype => "/husk/op/set-prototype",
            OpKind::IsExtensible => "/husk/op/is-extensible",
            OpKind::PreventExtensions => "/husk/op/prevent-extensions",
            OpKind::Apply => "/husk/op/apply",
            OpKind::Construct => "/husk/op/construct",
            OpKind::Missing => "/husk/op/missing",
        }
    }

    /// Look an operation kind up by its namespaced identifier.
    pub fn from_key(key: &str) -> Option<OpKind> {
        OpKind::ALL.iter().copied().find(|op| op.key() == key)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
