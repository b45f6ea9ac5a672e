//! Virtual object shells: trap dispatch and the call protocols
//!
//! A [`Shell`] is the opaque stand-in returned in place of a raw record.
//! Every structural operation on the shell is redirected to the matching
//! [`Handlers`](crate::Handlers) method, resolved against the current
//! resolution subject. Reads and writes additionally drive the deferred
//! default-action protocol: the first touch of a non-exempt key fires a
//! pending zero-argument handler, and a non-absent handler result becomes
//! the resolution subject from then on.
//!
//! A fixed set of keys bypasses interception entirely (see
//! [`EXEMPT_KEYS`]); it is the stable introspection surface consumers may
//! rely on without triggering side effects.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

use crate::handlers::HandlerRef;
use crate::record::{Attribute, Record};
use crate::value::{Function, Value};
use crate::HuskResult;

/// Exempt key reporting the shell bound to the record.
pub const KEY_SHELL: &str = "/husk/shell";
/// Exempt key reporting the wrapped call/construct target.
pub const KEY_TARGET: &str = "/husk/target";
/// Exempt key reporting the current resolution subject.
pub const KEY_SELF: &str = "/husk/self";
/// Exempt key reporting the registered deferred default action.
pub const KEY_DEFAULT_ACTION: &str = "/husk/default-action";
/// Exempt key reporting whether the deferred default action fired.
pub const KEY_DEFAULT_ACTION_FIRED: &str = "/husk/default-action-fired";

/// The fixed set of keys that always bypass interception: the
/// method-binding accessors, the three back-reference keys, and the two
/// default-action bookkeeping keys. Reads of these keys never fire a
/// pending default action.
pub const EXEMPT_KEYS: [&str; 8] = [
    "bind",
    "call",
    "apply",
    KEY_SHELL,
    KEY_TARGET,
    KEY_SELF,
    KEY_DEFAULT_ACTION,
    KEY_DEFAULT_ACTION_FIRED,
];

static EXEMPT_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| EXEMPT_KEYS.iter().copied().collect());

/// Whether `key` belongs to the exempt set.
pub fn is_exempt(key: &str) -> bool {
    EXEMPT_SET.contains(key)
}

/// The interception wrapper returned in place of a raw record.
pub struct Shell {
    record: Rc<Record>,
    target: Value,
    handlers: HandlerRef,
    // Self used for handler resolution; replaced when a deferred default
    // action returns a non-absent value.
    resolved: RefCell<Value>,
}

impl Shell {
    /// Wrap `record` with `handlers`, installing the record's shell
    /// back-reference (a record has one bound shell at a time; rebinding
    /// replaces it). `target` is the call/construct target and defaults to
    /// the record itself.
    pub fn bind(record: Rc<Record>, handlers: HandlerRef, target: Option<Value>) -> Rc<Shell> {
        let target = target.unwrap_or_else(|| Value::Record(record.clone()));
        let shell = Rc::new(Shell {
            record: record.clone(),
            target,
            handlers,
            resolved: RefCell::new(Value::Record(record.clone())),
        });
        record.bind_shell(&shell);
        shell
    }

    /// Construct an instance: a fresh record bound to a shell over
    /// `handlers`, with the handler set's `init` invoked on the result. An
    /// object returned by `init` replaces the shell as the construction
    /// result; any other return keeps the shell.
    pub fn instantiate(handlers: HandlerRef, args: &[Value]) -> HuskResult<Value> {
        let shell = Shell::bind(Record::new(), handlers, None);
        let shell_value = Value::Shell(shell.clone());
        match shell.handlers.init(&shell_value, args)? {
            Some(replacement) if replacement.is_object() => Ok(replacement),
            _ => Ok(shell_value),
        }
    }

    /// The record this shell was bound over.
    pub fn record(&self) -> Rc<Record> {
        self.record.clone()
    }

    /// The wrapped call/construct target.
    pub fn target(&self) -> Value {
        self.target.clone()
    }

    /// The current resolution subject.
    pub fn subject(&self) -> Value {
        self.resolved.borrow().clone()
    }

    /// The handler set this shell dispatches through.
    pub fn handler_set(&self) -> HandlerRef {
        self.handlers.clone()
    }

    /// Read an attribute.
    ///
    /// Exempt keys short-circuit to raw state. Otherwise a pending default
    /// action fires first, then the key is served by the subject's `get`
    /// handler when present (auto-wrapping a read that produces an
    /// auto-wrapped function) or by its `missing` hook when absent.
    pub fn get(&self, key: &str) -> HuskResult<Option<Value>> {
        if is_exempt(key) {
            return Ok(self.exempt_read(key));
        }
        let subject = self.resolve_subject()?;
        let handlers = self.handlers_for(&subject);
        let exists = subject.record().map(|r| r.raw_has(key)).unwrap_or(false);
        if exists {
            let value = handlers.get(&subject, key)?;
            if let Some(Value::Function(f)) = &value {
                if f.is_auto_wrapped() {
                    return Ok(Some(self.auto_wrap(f, &subject)));
                }
            }
            Ok(value)
        } else {
            handlers.missing(&subject, key)
        }
    }

    /// Write an attribute, reporting success. A pending default action
    /// fires first unless the key is exempt; the write itself always goes
    /// through the subject's `set` handler.
    pub fn set(&self, key: &str, value: Value) -> HuskResult<bool> {
        let subject = if is_exempt(key) {
            self.subject()
        } else {
            self.resolve_subject()?
        };
        let handlers = self.handlers_for(&subject);
        handlers.set(&subject, key, value)
    }

    /// Delete an attribute, reporting success.
    pub fn delete(&self, key: &str) -> HuskResult<bool> {
        let subject = self.subject();
        self.handlers_for(&subject).delete(&subject, key)
    }

    /// Attribute existence query.
    pub fn has(&self, key: &str) -> HuskResult<bool> {
        let subject = self.subject();
        self.handlers_for(&subject).has(&subject, key)
    }

    /// Enumerate own attribute keys.
    pub fn own_keys(&self) -> HuskResult<Vec<String>> {
        let subject = self.subject();
        self.handlers_for(&subject).own_keys(&subject)
    }

    /// Define an attribute from a descriptor, reporting success.
    pub fn define(&self, key: &str, attr: Attribute) -> HuskResult<bool> {
        let subject = self.subject();
        self.handlers_for(&subject).define(&subject, key, attr)
    }

    /// Describe an own attribute.
    pub fn describe(&self, key: &str) -> HuskResult<Option<Attribute>> {
        let subject = self.subject();
        self.handlers_for(&subject).describe(&subject, key)
    }

    /// Read the prototype.
    pub fn prototype(&self) -> HuskResult<Option<Value>> {
        let subject = self.subject();
        self.handlers_for(&subject).prototype(&subject)
    }

    /// Replace the prototype, reporting success.
    pub fn set_prototype(&self, proto: Option<Value>) -> HuskResult<bool> {
        let subject = self.subject();
        self.handlers_for(&subject).set_prototype(&subject, proto)
    }

    /// Extensibility query.
    pub fn is_extensible(&self) -> HuskResult<bool> {
        let subject = self.subject();
        self.handlers_for(&subject).is_extensible(&subject)
    }

    /// Revoke extensibility, reporting success.
    pub fn prevent_extensions(&self) -> HuskResult<bool> {
        let subject = self.subject();
        self.handlers_for(&subject).prevent_extensions(&subject)
    }

    /// Invoke the shell as a function.
    ///
    /// When the wrapped target is the handler registered as the record's
    /// deferred default action, the explicit call consumes the registration
    /// so the automatic trigger never double-fires.
    pub fn call(&self, ctx: Option<Value>, args: &[Value]) -> HuskResult<Option<Value>> {
        if let Value::Function(f) = &self.target {
            self.record.consume_default_action(f);
        }
        let subject = self.subject();
        self.handlers_for(&subject).apply(&subject, &self.target, ctx, args)
    }

    /// Invoke the shell as a constructor.
    pub fn construct(&self, args: &[Value]) -> HuskResult<Value> {
        let subject = self.subject();
        self.handlers_for(&subject).construct(&subject, &self.target, args)
    }

    /// Build a pass-through callable over `handler`: a second shell sharing
    /// `owner`'s record and handler set, wrapping the handler bound to
    /// `owner` as context. Calling the result invokes the handler; every
    /// other operation behaves as if performed on the owning shell.
    pub fn pass_through(owner: &Rc<Shell>, handler: &Rc<Function>) -> Value {
        let bound = handler.bind(Value::Shell(owner.clone()));
        let wrapper = Shell::bind(
            owner.record.clone(),
            owner.handlers.clone(),
            Some(Value::Function(bound)),
        );
        Value::Shell(wrapper)
    }

    /// Fire a pending deferred default action, at most once per
    /// registration, and adopt a non-absent result as the resolution
    /// subject for this and later accesses.
    fn resolve_subject(&self) -> HuskResult<Value> {
        let current = self.subject();
        let pending = current.record().and_then(|r| r.take_pending_action());
        if let Some(handler) = pending {
            if let Some(result) = handler.invoke(Some(current.clone()), &[])? {
                *self.resolved.borrow_mut() = result.clone();
                return Ok(result);
            }
        }
        Ok(current)
    }

    /// The handler set for a resolution subject: a record bound to a shell
    /// resolves to that shell's handlers; anything else keeps this shell's
    /// own handlers so overrides survive substitution to foreign values.
    fn handlers_for(&self, subject: &Value) -> HandlerRef {
        match subject {
            Value::Shell(s) => s.handlers.clone(),
            Value::Record(r) => match r.bound_shell() {
                Some(s) => s.handlers.clone(),
                None => self.handlers.clone(),
            },
            _ => self.handlers.clone(),
        }
    }

    /// Serve an exempt key from raw state, bypassing interception.
    fn exempt_read(&self, key: &str) -> Option<Value> {
        match key {
            KEY_SHELL => self.record.bound_shell().map(Value::Shell),
            KEY_TARGET => Some(self.target.clone()),
            KEY_SELF => Some(self.subject()),
            KEY_DEFAULT_ACTION => self.record.default_action().handler().map(Value::Function),
            KEY_DEFAULT_ACTION_FIRED => {
                Some(Value::Bool(self.record.default_action().has_fired()))
            }
            // The method-binding accessors read raw storage.
            _ => self.record.raw_get(key),
        }
    }

    /// Wrap an auto-wrapped function read: a pass-through callable over a
    /// fresh derived record whose deferred default action is the function,
    /// so each access gets independent firing state.
    fn auto_wrap(&self, f: &Rc<Function>, subject: &Value) -> Value {
        let derived = match subject.record() {
            Some(r) => r.derive(),
            None => Record::new(),
        };
        derived.register_default_action(f.clone());
        let wrapper = Shell::bind(
            derived,
            self.handlers_for(subject),
            Some(Value::Function(f.clone())),
        );
        Value::Shell(wrapper)
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("record", &self.record.id())
            .field("target", &self.target.type_name())
            .finish()
    }
}
