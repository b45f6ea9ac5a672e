//! Integration tests for shell trap dispatch
//!
//! Covers pass-through identity for un-overridden operations, selective
//! handler overrides, the missing-attribute hook, construction
//! substitution, and error propagation through the shell.

use std::rc::Rc;

use husk_core::{
    Attribute, DefaultHandlers, Function, Handlers, HuskError, HuskResult, Record, Shell, Value,
    EXEMPT_KEYS, KEY_SELF, KEY_SHELL, KEY_TARGET,
};

#[test]
fn test_pass_through_identity_reads_and_writes() {
    let record = Record::new();
    record.raw_set("alpha", Value::Int(1));
    let shell = Shell::bind(record.clone(), Rc::new(DefaultHandlers), None);

    // Un-overridden operations observe exactly what raw storage holds.
    assert_eq!(shell.get("alpha").unwrap(), record.raw_get("alpha"));
    assert!(shell.set("beta", Value::str("two")).unwrap());
    assert_eq!(record.raw_get("beta"), Some(Value::str("two")));
    assert_eq!(shell.get("beta").unwrap(), record.raw_get("beta"));
    assert_eq!(shell.has("alpha").unwrap(), record.raw_has("alpha"));
    assert_eq!(shell.has("gamma").unwrap(), record.raw_has("gamma"));
    assert_eq!(shell.own_keys().unwrap(), record.own_keys());
}

#[test]
fn test_pass_through_identity_structure_ops() {
    let record = Record::new();
    record.raw_set("x", Value::Int(1));
    let shell = Shell::bind(record.clone(), Rc::new(DefaultHandlers), None);

    let proto = Record::new();
    proto.raw_set("inherited", Value::Bool(true));
    assert!(shell.set_prototype(Some(Value::Record(proto.clone()))).unwrap());
    assert_eq!(shell.prototype().unwrap(), record.prototype());
    assert_eq!(shell.get("inherited").unwrap(), Some(Value::Bool(true)));

    let desc = shell.describe("x").unwrap().unwrap();
    assert_eq!(desc.value, Value::Int(1));
    assert!(shell
        .define(
            "y",
            Attribute {
                value: Value::Int(2),
                writable: false,
                enumerable: true,
                configurable: true,
            },
        )
        .unwrap());
    assert!(!shell.set("y", Value::Int(3)).unwrap());

    assert!(shell.delete("x").unwrap());
    assert!(!record.raw_has("x"));

    assert!(shell.is_extensible().unwrap());
    assert!(shell.prevent_extensions().unwrap());
    assert!(!record.is_extensible());
    assert!(!shell.set("fresh", Value::Int(9)).unwrap());
}

struct ShoutingReads;

impl Handlers for ShoutingReads {
    // Only reads change; every other operation keeps its default.
    fn get(&self, subject: &Value, key: &str) -> HuskResult<Option<Value>> {
        let raw = subject.record().and_then(|r| r.raw_get(key));
        Ok(raw.map(|v| match v.as_str() {
            Some(s) => Value::str(s.to_uppercase()),
            None => v,
        }))
    }
}

#[test]
fn test_single_override_leaves_other_ops_untouched() {
    let record = Record::new();
    record.raw_set("word", Value::str("quiet"));
    record.raw_set("num", Value::Int(3));
    let shell = Shell::bind(record.clone(), Rc::new(ShoutingReads), None);

    assert_eq!(shell.get("word").unwrap(), Some(Value::str("QUIET")));
    assert_eq!(shell.get("num").unwrap(), Some(Value::Int(3)));
    // Writes, deletes, and enumeration still pass through untouched.
    assert!(shell.set("word", Value::str("loud")).unwrap());
    assert_eq!(record.raw_get("word"), Some(Value::str("loud")));
    assert_eq!(shell.own_keys().unwrap(), vec!["num", "word"]);
    assert!(shell.delete("num").unwrap());
}

struct SynthesizingMissing;

impl Handlers for SynthesizingMissing {
    fn missing(&self, _subject: &Value, key: &str) -> HuskResult<Option<Value>> {
        if key == "forbidden" {
            return Err(HuskError::NoSuchAttribute(key.to_string()));
        }
        Ok(Some(Value::str(format!("synth:{key}"))))
    }
}

#[test]
fn test_missing_hook_default_is_absent() {
    let shell = Shell::bind(Record::new(), Rc::new(DefaultHandlers), None);
    assert_eq!(shell.get("ghost").unwrap(), None);
}

#[test]
fn test_missing_hook_synthesizes_values() {
    let record = Record::new();
    record.raw_set("real", Value::Int(1));
    let shell = Shell::bind(record, Rc::new(SynthesizingMissing), None);

    // Present keys never reach the hook.
    assert_eq!(shell.get("real").unwrap(), Some(Value::Int(1)));
    // Absent keys are synthesized on demand.
    assert_eq!(shell.get("ghost").unwrap(), Some(Value::str("synth:ghost")));
    // The hook may also raise a domain condition, which propagates as-is.
    let err = shell.get("forbidden").unwrap_err();
    assert!(matches!(err, HuskError::NoSuchAttribute(k) if k == "forbidden"));
}

struct RejectingWrites;

impl Handlers for RejectingWrites {
    fn set(&self, _subject: &Value, key: &str, _value: Value) -> HuskResult<bool> {
        Err(HuskError::HandlerFailed(format!("write to {key} refused")))
    }
}

#[test]
fn test_handler_errors_propagate_unmodified() {
    let shell = Shell::bind(Record::new(), Rc::new(RejectingWrites), None);
    let err = shell.set("x", Value::Int(1)).unwrap_err();
    assert!(matches!(err, HuskError::HandlerFailed(msg) if msg == "write to x refused"));
    // The failed write left no trace.
    assert_eq!(shell.get("x").unwrap(), None);
}

struct SelfPopulating;

impl Handlers for SelfPopulating {
    fn init(&self, shell: &Value, args: &[Value]) -> HuskResult<Option<Value>> {
        let record = shell.record().expect("instantiate binds a record");
        record.raw_set("ready", Value::Bool(true));
        if let Some(seed) = args.first() {
            record.raw_set("seed", seed.clone());
        }
        Ok(None)
    }
}

struct ReplacingInit;

impl Handlers for ReplacingInit {
    fn init(&self, _shell: &Value, _args: &[Value]) -> HuskResult<Option<Value>> {
        let replacement = Record::new();
        replacement.raw_set("replaced", Value::Bool(true));
        Ok(Some(Value::Record(replacement)))
    }
}

struct NonObjectInit;

impl Handlers for NonObjectInit {
    fn init(&self, _shell: &Value, _args: &[Value]) -> HuskResult<Option<Value>> {
        Ok(Some(Value::Int(13)))
    }
}

#[test]
fn test_construction_keeps_shell_on_absent_init_result() {
    let built = Shell::instantiate(Rc::new(SelfPopulating), &[Value::Int(7)]).unwrap();
    let shell = built.as_shell().expect("construction yields the shell");
    assert_eq!(shell.get("ready").unwrap(), Some(Value::Bool(true)));
    assert_eq!(shell.get("seed").unwrap(), Some(Value::Int(7)));
}

#[test]
fn test_construction_substitution_with_object_result() {
    let built = Shell::instantiate(Rc::new(ReplacingInit), &[]).unwrap();
    assert!(built.as_shell().is_none());
    assert_eq!(built.record().unwrap().raw_get("replaced"), Some(Value::Bool(true)));
}

#[test]
fn test_construction_falls_back_on_non_object_result() {
    let built = Shell::instantiate(Rc::new(NonObjectInit), &[]).unwrap();
    // An invalid replacement reproduces the original shell.
    assert!(built.as_shell().is_some());
}

#[test]
fn test_exempt_keys_are_stable_introspection_surface() {
    let expected = [
        "bind",
        "call",
        "apply",
        "/husk/shell",
        "/husk/target",
        "/husk/self",
        "/husk/default-action",
        "/husk/default-action-fired",
    ];
    assert_eq!(EXEMPT_KEYS, expected);

    let shell = Shell::bind(Record::new(), Rc::new(DefaultHandlers), None);
    let me = shell.get(KEY_SHELL).unwrap().unwrap().as_shell().unwrap();
    assert!(Rc::ptr_eq(&me, &shell));
    assert!(shell.get(KEY_TARGET).unwrap().is_some());
    assert!(shell.get(KEY_SELF).unwrap().is_some());
}

#[test]
fn test_exempt_keys_never_hit_the_missing_hook() {
    // The hook synthesizes for every absent key, yet exempt keys still
    // resolve raw, so "bind" stays absent rather than synthesized.
    let shell = Shell::bind(Record::new(), Rc::new(SynthesizingMissing), None);
    assert_eq!(shell.get("bind").unwrap(), None);
    assert_eq!(shell.get("anything").unwrap(), Some(Value::str("synth:anything")));
}

#[test]
fn test_shell_call_of_function_target() {
    let record = Record::new();
    let concat = Function::new("concat", |_, args| {
        let joined: Vec<String> = args.iter().map(|v| v.to_string()).collect();
        Ok(Some(Value::str(joined.join("-"))))
    });
    let shell = Shell::bind(record, Rc::new(DefaultHandlers), Some(Value::Function(concat)));

    let out = shell
        .call(None, &[Value::Int(1), Value::str("two")])
        .unwrap();
    assert_eq!(out, Some(Value::str("1-two")));
}

#[test]
fn test_shell_construct_of_function_target() {
    let ctor = Function::new("ctor", |ctx, args| {
        let instance = ctx.expect("construct passes the new instance");
        instance
            .record()
            .unwrap()
            .raw_set("arg", args.first().cloned().unwrap_or(Value::Null));
        Ok(None)
    });
    let proto = Record::new();
    proto.raw_set("kind", Value::str("widget"));
    ctor.set_prototype(Some(Value::Record(proto)));

    let shell = Shell::bind(Record::new(), Rc::new(DefaultHandlers), Some(Value::Function(ctor)));
    let built = shell.construct(&[Value::Int(5)]).unwrap();
    let record = built.record().unwrap();
    assert_eq!(record.raw_get("arg"), Some(Value::Int(5)));
    // Prototype chain reflects the constructor's prototype value.
    assert_eq!(record.raw_get("kind"), Some(Value::str("widget")));
}
