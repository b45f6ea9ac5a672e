//! Dynamic value representation for attribute traffic
//!
//! Attribute reads and writes move [`Value`]s around. The representation is
//! a plain enum over the primitives plus the three reference types of the
//! object graph: records (attribute hosts), shells (intercepted stand-ins),
//! and functions (native callables). Reference types share ownership via
//! `Rc` and compare by identity; primitives compare structurally.
//!
//! Absence is not a `Value`: operations that may produce "no value" return
//! `Option<Value>`, with `None` meaning absent and `Value::Null` meaning a
//! present null.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::record::Record;
use crate::shell::Shell;
use crate::HuskResult;

/// Signature of a native callable: invocation context and arguments in,
/// possibly-absent result out.
pub type NativeFn = Rc<dyn Fn(Option<Value>, &[Value]) -> HuskResult<Option<Value>>>;

/// A dynamically typed value.
#[derive(Clone)]
pub enum Value {
    /// Present null.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Immutable string.
    Str(Rc<str>),
    /// Attribute host (self record).
    Record(Rc<Record>),
    /// Intercepted stand-in for a record.
    Shell(Rc<Shell>),
    /// Native callable.
    Function(Rc<Function>),
}

impl Value {
    /// Build a string value.
    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }

    /// True for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for values that can host attributes (records and shells).
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Record(_) | Value::Shell(_))
    }

    /// The record backing this value: the record itself, or the record a
    /// shell wraps. Primitives and functions have no backing record.
    pub fn record(&self) -> Option<Rc<Record>> {
        match self {
            Value::Record(r) => Some(r.clone()),
            Value::Shell(s) => Some(s.record()),
            _ => None,
        }
    }

    /// Strict shell accessor.
    pub fn as_shell(&self) -> Option<Rc<Shell>> {
        match self {
            Value::Shell(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Strict function accessor.
    pub fn as_function(&self) -> Option<Rc<Function>> {
        match self {
            Value::Function(f) => Some(f.clone()),
            _ => None,
        }
    }

    /// Strict integer accessor.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Strict boolean accessor.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Strict string accessor.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Record(_) => "record",
            Value::Shell(_) => "shell",
            Value::Function(_) => "function",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Reference types compare by identity.
            (Value::Record(a), Value::Record(b)) => Rc::ptr_eq(a, b),
            (Value::Shell(a), Value::Shell(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "bool({b})"),
            Value::Int(i) => write!(f, "int({i})"),
            Value::Float(x) => write!(f, "float({x})"),
            Value::Str(s) => write!(f, "str({s:?})"),
            Value::Record(r) => write!(f, "record#{}", r.id()),
            Value::Shell(s) => write!(f, "shell#{}", s.record().id()),
            Value::Function(func) => write!(f, "fn({})", func.name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Record(r) => write!(f, "[record#{}]", r.id()),
            Value::Shell(s) => write!(f, "[shell#{}]", s.record().id()),
            Value::Function(func) => write!(f, "[fn {}]", func.name()),
        }
    }
}

/// How a function attribute behaves when read through a shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionMode {
    /// Reads return the function itself.
    Plain,
    /// Reads return a pass-through callable armed with the function as a
    /// deferred default action.
    AutoWrapped,
}

/// A named native callable.
///
/// Functions carry an explicit [`FunctionMode`] instead of an out-of-band
/// marker, an optional bound invocation context, and an optional prototype
/// value consulted when the function is used as a constructor.
pub struct Function {
    name: String,
    mode: FunctionMode,
    bound_ctx: Option<Value>,
    prototype: RefCell<Option<Value>>,
    native: NativeFn,
}

impl Function {
    /// Create a plain function.
    pub fn new<F>(name: impl Into<String>, f: F) -> Rc<Function>
    where
        F: Fn(Option<Value>, &[Value]) -> HuskResult<Option<Value>> + 'static,
    {
        Rc::new(Function {
            name: name.into(),
            mode: FunctionMode::Plain,
            bound_ctx: None,
            prototype: RefCell::new(None),
            native: Rc::new(f),
        })
    }

    /// Create a function whose attribute reads auto-wrap it into a
    /// pass-through callable with deferred-action state.
    pub fn auto_wrapped<F>(name: impl Into<String>, f: F) -> Rc<Function>
    where
        F: Fn(Option<Value>, &[Value]) -> HuskResult<Option<Value>> + 'static,
    {
        Rc::new(Function {
            name: name.into(),
            mode: FunctionMode::AutoWrapped,
            bound_ctx: None,
            prototype: RefCell::new(None),
            native: Rc::new(f),
        })
    }

    /// A copy of this function permanently bound to `ctx`. The bound
    /// context wins over any context supplied at invocation time.
    pub fn bind(self: &Rc<Self>, ctx: Value) -> Rc<Function> {
        Rc::new(Function {
            name: self.name.clone(),
            mode: FunctionMode::Plain,
            bound_ctx: Some(ctx),
            prototype: RefCell::new(self.prototype.borrow().clone()),
            native: self.native.clone(),
        })
    }

    /// Invoke the function.
    pub fn invoke(&self, ctx: Option<Value>, args: &[Value]) -> HuskResult<Option<Value>> {
        let ctx = self.bound_ctx.clone().or(ctx);
        (self.native)(ctx, args)
    }

    /// The function's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function's read behavior.
    pub fn mode(&self) -> FunctionMode {
        self.mode
    }

    /// True when reads of this function auto-wrap it.
    pub fn is_auto_wrapped(&self) -> bool {
        self.mode == FunctionMode::AutoWrapped
    }

    /// Prototype value assigned to instances this function constructs.
    pub fn prototype(&self) -> Option<Value> {
        self.prototype.borrow().clone()
    }

    /// Replace the constructor prototype value.
    pub fn set_prototype(&self, proto: Option<Value>) {
        *self.prototype.borrow_mut() = proto;
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("bound", &self.bound_ctx.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_equality() {
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::Bool(true), Value::Bool(true));
        assert_eq!(Value::Int(42), Value::Int(42));
        assert_eq!(Value::str("hi"), Value::str("hi"));
        assert_ne!(Value::Int(1), Value::Int(2));
        assert_ne!(Value::Null, Value::Bool(false));
        assert_ne!(Value::Int(0), Value::Float(0.0));
    }

    #[test]
    fn test_reference_identity_equality() {
        let r = Record::new();
        assert_eq!(Value::Record(r.clone()), Value::Record(r.clone()));
        assert_ne!(Value::Record(r), Value::Record(Record::new()));

        let f = Function::new("noop", |_, _| Ok(None));
        assert_eq!(Value::Function(f.clone()), Value::Function(f.clone()));
        let g = Function::new("noop", |_, _| Ok(None));
        assert_ne!(Value::Function(f), Value::Function(g));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::str("x").type_name(), "string");
        assert_eq!(Value::Record(Record::new()).type_name(), "record");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::Null), "null");
        assert_eq!(format!("{}", Value::Bool(false)), "false");
        assert_eq!(format!("{}", Value::Int(-3)), "-3");
        assert_eq!(format!("{}", Value::str("hey")), "hey");
    }

    #[test]
    fn test_function_invoke() {
        let double = Function::new("double", |_, args| {
            let n = args[0].as_int().unwrap();
            Ok(Some(Value::Int(n * 2)))
        });
        let result = double.invoke(None, &[Value::Int(21)]).unwrap();
        assert_eq!(result, Some(Value::Int(42)));
    }

    #[test]
    fn test_function_bind_overrides_context() {
        let ctx_name = Function::new("ctx_name", |ctx, _| {
            Ok(ctx.map(|v| Value::str(v.type_name())))
        });
        let bound = ctx_name.bind(Value::Int(7));
        // The bound context wins even when a context is supplied.
        let result = bound.invoke(Some(Value::Null), &[]).unwrap();
        assert_eq!(result, Some(Value::str("int")));
        // The original stays unbound.
        let result = ctx_name.invoke(None, &[]).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_function_modes() {
        let plain = Function::new("p", |_, _| Ok(None));
        let auto = Function::auto_wrapped("a", |_, _| Ok(None));
        assert!(!plain.is_auto_wrapped());
        assert!(auto.is_auto_wrapped());
        assert_eq!(auto.mode(), FunctionMode::AutoWrapped);
        // Binding produces a plain callable.
        assert!(!auto.bind(Value::Null).is_auto_wrapped());
    }

    #[test]
    fn test_function_prototype_slot() {
        let ctor = Function::new("ctor", |_, _| Ok(None));
        assert!(ctor.prototype().is_none());
        let proto = Value::Record(Record::new());
        ctor.set_prototype(Some(proto.clone()));
        assert_eq!(ctor.prototype(), Some(proto));
    }
}
