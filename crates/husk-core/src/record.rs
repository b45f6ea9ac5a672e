//! Self records: the attribute storage behind every shell
//!
//! A [`Record`] owns the state a shell virtualizes: a descriptor-bearing
//! attribute map, a prototype slot, an extensibility flag, the binding to
//! its one shell, and the deferred default-action state machine. The `raw_*`
//! methods are the ordinary object-model primitives the default handler set
//! forwards to; they never dispatch through handlers themselves.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use crate::shell::Shell;
use crate::value::{Function, Value};

/// Global counter for generating unique record IDs
static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique record ID
fn generate_record_id() -> u64 {
    NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed)
}

/// A data descriptor for one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The attribute's value.
    pub value: Value,
    /// Whether plain writes may replace the value.
    pub writable: bool,
    /// Whether the attribute shows up in enumeration.
    pub enumerable: bool,
    /// Whether the attribute may be redefined or deleted.
    pub configurable: bool,
}

impl Attribute {
    /// An ordinary data attribute: writable, enumerable, configurable.
    pub fn data(value: Value) -> Attribute {
        Attribute {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }
}

/// Deferred default-action state of one record.
///
/// The machine moves `Idle -> Registered -> Fired`; re-registration resets
/// a fired machine back to `Registered`. `Fired` never reverts on its own.
#[derive(Debug, Clone)]
pub enum DeferredState {
    /// No default action designated.
    Idle,
    /// A handler is armed and has not fired.
    Registered(Rc<Function>),
    /// The handler fired (or was consumed by an explicit call).
    Fired(Rc<Function>),
}

impl DeferredState {
    /// True while a handler is armed and unfired.
    pub fn is_registered(&self) -> bool {
        matches!(self, DeferredState::Registered(_))
    }

    /// True once the armed handler fired or was consumed.
    pub fn has_fired(&self) -> bool {
        matches!(self, DeferredState::Fired(_))
    }

    /// The designated handler, if any.
    pub fn handler(&self) -> Option<Rc<Function>> {
        match self {
            DeferredState::Idle => None,
            DeferredState::Registered(h) | DeferredState::Fired(h) => Some(h.clone()),
        }
    }
}

/// The underlying instance a shell wraps.
pub struct Record {
    id: u64,
    attrs: RefCell<FxHashMap<String, Attribute>>,
    proto: RefCell<Option<Value>>,
    extensible: Cell<bool>,
    // At most one shell is bound at a time; rebinding replaces this.
    shell: RefCell<Weak<Shell>>,
    deferred: RefCell<DeferredState>,
}

impl Record {
    /// Create a fresh, empty, extensible record.
    pub fn new() -> Rc<Record> {
        Rc::new(Record {
            id: generate_record_id(),
            attrs: RefCell::new(FxHashMap::default()),
            proto: RefCell::new(None),
            extensible: Cell::new(true),
            shell: RefCell::new(Weak::new()),
            deferred: RefCell::new(DeferredState::Idle),
        })
    }

    /// Unique record ID (assigned on creation).
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Read an attribute, searching own storage then the prototype chain.
    pub fn raw_get(&self, key: &str) -> Option<Value> {
        if let Some(attr) = self.attrs.borrow().get(key) {
            return Some(attr.value.clone());
        }
        let proto = self.proto.borrow().clone();
        proto.and_then(|p| p.record()).and_then(|r| r.raw_get(key))
    }

    /// Write an attribute into own storage. Fails on a non-writable
    /// attribute, or on a new key when the record is not extensible.
    pub fn raw_set(&self, key: &str, value: Value) -> bool {
        let mut attrs = self.attrs.borrow_mut();
        if let Some(attr) = attrs.get_mut(key) {
            if !attr.writable {
                return false;
            }
            attr.value = value;
            true
        } else {
            if !self.extensible.get() {
                return false;
            }
            attrs.insert(key.to_string(), Attribute::data(value));
            true
        }
    }

    /// Delete an own attribute. Deleting an absent key succeeds; a
    /// non-configurable attribute refuses.
    pub fn raw_delete(&self, key: &str) -> bool {
        let mut attrs = self.attrs.borrow_mut();
        match attrs.get(key) {
            Some(attr) if !attr.configurable => false,
            Some(_) => {
                attrs.remove(key);
                true
            }
            None => true,
        }
    }

    /// Whether the key exists in own storage or on the prototype chain.
    pub fn raw_has(&self, key: &str) -> bool {
        if self.attrs.borrow().contains_key(key) {
            return true;
        }
        let proto = self.proto.borrow().clone();
        proto
            .and_then(|p| p.record())
            .map(|r| r.raw_has(key))
            .unwrap_or(false)
    }

    /// Own attribute keys, sorted.
    pub fn own_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.attrs.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Define an attribute with an explicit descriptor. Redefinition of a
    /// non-configurable attribute fails, as does definition of a new key on
    /// a non-extensible record.
    pub fn define(&self, key: &str, attr: Attribute) -> bool {
        let mut attrs = self.attrs.borrow_mut();
        match attrs.get(key) {
            Some(existing) if !existing.configurable => false,
            Some(_) => {
                attrs.insert(key.to_string(), attr);
                true
            }
            None => {
                if !self.extensible.get() {
                    return false;
                }
                attrs.insert(key.to_string(), attr);
                true
            }
        }
    }

    /// The descriptor of an own attribute.
    pub fn describe(&self, key: &str) -> Option<Attribute> {
        self.attrs.borrow().get(key).cloned()
    }

    /// The prototype value.
    pub fn prototype(&self) -> Option<Value> {
        self.proto.borrow().clone()
    }

    /// Replace the prototype. Fails on a non-extensible record and on a
    /// chain that would loop back through this record.
    pub fn set_prototype(&self, proto: Option<Value>) -> bool {
        if !self.extensible.get() {
            return false;
        }
        let mut cursor = proto.clone();
        while let Some(v) = cursor {
            match v.record() {
                Some(r) if r.id == self.id => return false,
                Some(r) => cursor = r.prototype(),
                None => break,
            }
        }
        *self.proto.borrow_mut() = proto;
        true
    }

    /// Whether new attributes may still be added.
    pub fn is_extensible(&self) -> bool {
        self.extensible.get()
    }

    /// Revoke extensibility. Irreversible.
    pub fn prevent_extensions(&self) -> bool {
        self.extensible.set(false);
        true
    }

    /// A fresh shallow copy: attributes cloned by reference, prototype and
    /// extensibility carried over, new ID, idle action state, no shell
    /// binding.
    pub fn derive(&self) -> Rc<Record> {
        Rc::new(Record {
            id: generate_record_id(),
            attrs: RefCell::new(self.attrs.borrow().clone()),
            proto: RefCell::new(self.proto.borrow().clone()),
            extensible: Cell::new(self.extensible.get()),
            shell: RefCell::new(Weak::new()),
            deferred: RefCell::new(DeferredState::Idle),
        })
    }

    /// Bind a shell to this record, replacing any previous binding.
    pub(crate) fn bind_shell(&self, shell: &Rc<Shell>) {
        *self.shell.borrow_mut() = Rc::downgrade(shell);
    }

    /// The shell currently bound to this record.
    pub fn bound_shell(&self) -> Option<Rc<Shell>> {
        self.shell.borrow().upgrade()
    }

    /// Designate `handler` as the deferred default action. Overwrites any
    /// pending registration and re-arms a fired machine.
    pub fn register_default_action(&self, handler: Rc<Function>) {
        *self.deferred.borrow_mut() = DeferredState::Registered(handler);
    }

    /// Current deferred default-action state.
    pub fn default_action(&self) -> DeferredState {
        self.deferred.borrow().clone()
    }

    /// Mark the registration consumed without invoking it, if `handler` is
    /// the armed handler. Used when the action is called explicitly.
    pub fn consume_default_action(&self, handler: &Rc<Function>) -> bool {
        let mut state = self.deferred.borrow_mut();
        if let DeferredState::Registered(armed) = &*state {
            if Rc::ptr_eq(armed, handler) {
                let armed = armed.clone();
                *state = DeferredState::Fired(armed);
                return true;
            }
        }
        false
    }

    /// Take the armed handler for firing, transitioning to `Fired`.
    pub(crate) fn take_pending_action(&self) -> Option<Rc<Function>> {
        let mut state = self.deferred.borrow_mut();
        if let DeferredState::Registered(armed) = &*state {
            let armed = armed.clone();
            *state = DeferredState::Fired(armed.clone());
            Some(armed)
        } else {
            None
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("attrs", &self.attrs.borrow().len())
            .field("extensible", &self.extensible.get())
            .finish()
    }
}
