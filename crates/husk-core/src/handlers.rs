//! Trap handler trait and the default pass-through handler set
//!
//! [`Handlers`] has one method per [`OpKind`](crate::OpKind), plus the
//! missing-attribute hook and the construction initializer. Every method
//! carries a provided pass-through body, so an implementor overrides only
//! the operations it cares about and the rest keep identity behavior
//! against the subject's raw storage.
//!
//! The `subject` argument is the current resolution subject: normally the
//! record behind the shell, but after a deferred default action substitutes
//! itself it may be any value, including a primitive with no storage at
//! all. Defaults treat storage-less subjects as empty: reads are absent,
//! writes and deletes report failure, key sets are empty.

use std::rc::Rc;

use crate::op::OpKind;
use crate::record::{Attribute, Record};
use crate::value::Value;
use crate::{HuskError, HuskResult};

/// Shared handle to a handler set.
pub type HandlerRef = Rc<dyn Handlers>;

/// Overridable handler methods for every interceptable operation.
pub trait Handlers {
    /// Read an attribute. Default: raw own-then-prototype lookup.
    fn get(&self, subject: &Value, key: &str) -> HuskResult<Option<Value>> {
        Ok(subject.record().and_then(|r| r.raw_get(key)))
    }

    /// Write an attribute, reporting success. Default: raw write.
    fn set(&self, subject: &Value, key: &str, value: Value) -> HuskResult<bool> {
        Ok(subject
            .record()
            .map(|r| r.raw_set(key, value))
            .unwrap_or(false))
    }

    /// Delete an attribute, reporting success. Default: raw delete.
    fn delete(&self, subject: &Value, key: &str) -> HuskResult<bool> {
        Ok(subject
            .record()
            .map(|r| r.raw_delete(key))
            .unwrap_or(false))
    }

    /// Attribute existence query. Default: raw chain lookup.
    fn has(&self, subject: &Value, key: &str) -> HuskResult<bool> {
        Ok(subject.record().map(|r| r.raw_has(key)).unwrap_or(false))
    }

    /// Enumerate own attribute keys. Default: sorted own keys.
    fn own_keys(&self, subject: &Value) -> HuskResult<Vec<String>> {
        Ok(subject.record().map(|r| r.own_keys()).unwrap_or_default())
    }

    /// Define an attribute from a descriptor. Default: raw define.
    fn define(&self, subject: &Value, key: &str, attr: Attribute) -> HuskResult<bool> {
        Ok(subject
            .record()
            .map(|r| r.define(key, attr))
            .unwrap_or(false))
    }

    /// Describe an own attribute. Default: raw descriptor lookup.
    fn describe(&self, subject: &Value, key: &str) -> HuskResult<Option<Attribute>> {
        Ok(subject.record().and_then(|r| r.describe(key)))
    }

    /// Read the prototype. Default: the record's prototype slot.
    fn prototype(&self, subject: &Value) -> HuskResult<Option<Value>> {
        Ok(subject.record().and_then(|r| r.prototype()))
    }

    /// Replace the prototype, reporting success. Default: raw replacement
    /// with cycle rejection.
    fn set_prototype(&self, subject: &Value, proto: Option<Value>) -> HuskResult<bool> {
        Ok(subject
            .record()
            .map(|r| r.set_prototype(proto))
            .unwrap_or(false))
    }

    /// Extensibility query. Default: the record's flag.
    fn is_extensible(&self, subject: &Value) -> HuskResult<bool> {
        Ok(subject
            .record()
            .map(|r| r.is_extensible())
            .unwrap_or(false))
    }

    /// Revoke extensibility, reporting success.
    fn prevent_extensions(&self, subject: &Value) -> HuskResult<bool> {
        Ok(subject
            .record()
            .map(|r| r.prevent_extensions())
            .unwrap_or(false))
    }

    /// Invoke the wrapped target as a function. Default: direct invocation
    /// of a function target, delegation for a shell target.
    fn apply(
        &self,
        subject: &Value,
        target: &Value,
        ctx: Option<Value>,
        args: &[Value],
    ) -> HuskResult<Option<Value>> {
        let _ = subject;
        match target {
            Value::Function(f) => f.invoke(ctx, args),
            Value::Shell(s) => s.call(ctx, args),
            other => Err(HuskError::Unsupported {
                op: OpKind::Apply,
                type_name: other.type_name(),
            }),
        }
    }

    /// Invoke the wrapped target as a constructor. Default: build a record
    /// whose prototype is the target function's prototype value, invoke the
    /// function against it, and keep the function's result only when it is
    /// an object.
    fn construct(&self, subject: &Value, target: &Value, args: &[Value]) -> HuskResult<Value> {
        let _ = subject;
        match target {
            Value::Function(f) => {
                let instance = Record::new();
                if let Some(proto) = f.prototype() {
                    instance.set_prototype(Some(proto));
                }
                let result = f.invoke(Some(Value::Record(instance.clone())), args)?;
                match result {
                    Some(v) if v.is_object() => Ok(v),
                    _ => Ok(Value::Record(instance)),
                }
            }
            Value::Shell(s) => s.construct(args),
            other => Err(HuskError::Unsupported {
                op: OpKind::Construct,
                type_name: other.type_name(),
            }),
        }
    }

    /// Hook for reads whose key is absent from the subject. Default: absent.
    fn missing(&self, subject: &Value, key: &str) -> HuskResult<Option<Value>> {
        let _ = (subject, key);
        Ok(None)
    }

    /// Construction initializer. Receives the freshly bound shell and the
    /// original constructor arguments; a non-absent object result replaces
    /// the shell as the construction result. Default: absent.
    fn init(&self, shell: &Value, args: &[Value]) -> HuskResult<Option<Value>> {
        let _ = (shell, args);
        Ok(None)
    }
}

/// The built-in handler set: every operation keeps its pass-through
/// default.
#[derive(Debug, Clone, Copy)]
pub struct DefaultHandlers;

impl Handlers for DefaultHandlers {}
