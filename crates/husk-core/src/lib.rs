//! Husk: a virtual-object interception layer
//!
//! This crate lets a value transparently virtualize every structural
//! operation performed on it. Instead of pairing a proxy with a separate
//! handler record, the intercepted operations resolve to overridable
//! methods on the instance's own handler set:
//! - a closed [`OpKind`] registry of the interceptable operations
//! - [`Record`], the attribute storage behind an instance
//! - the [`Handlers`] trait with pass-through defaults for every operation
//! - [`Shell`], the stand-in that routes operations to the handler set
//!
//! Two protocols sit on top of the interception core:
//! - a deferred default action: a zero-argument handler fires on the first
//!   read or write of a non-exempt key, unless it was called explicitly
//!   first
//! - pass-through callables: values that behave as the owning instance for
//!   everything except invocation

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod handlers;
pub mod op;
pub mod record;
pub mod shell;
pub mod value;

pub use handlers::{DefaultHandlers, HandlerRef, Handlers};
pub use op::OpKind;
pub use record::{Attribute, DeferredState, Record};
pub use shell::{
    is_exempt, Shell, EXEMPT_KEYS, KEY_DEFAULT_ACTION, KEY_DEFAULT_ACTION_FIRED, KEY_SELF,
    KEY_SHELL, KEY_TARGET,
};
pub use value::{Function, FunctionMode, NativeFn, Value};

/// Interception faults
///
/// The shell itself never raises: every variant is produced either by the
/// default apply/construct handlers meeting an unsuitable target, or by an
/// overriding handler, and propagates unmodified to the caller of the
/// operation.
#[derive(Debug, thiserror::Error)]
pub enum HuskError {
    /// The operation cannot be performed on the wrapped target.
    #[error("{op} is not supported on {type_name}")]
    Unsupported {
        /// The operation that failed.
        op: OpKind,
        /// Type name of the offending target.
        type_name: &'static str,
    },

    /// A missing-attribute hook chose to reject the read.
    #[error("no such attribute: {0}")]
    NoSuchAttribute(String),

    /// A handler override failed.
    #[error("handler failed: {0}")]
    HandlerFailed(String),
}

/// Interception result
pub type HuskResult<T> = Result<T, HuskError>;
