//! A greeter instance with an auto-called method and an optional call
//!
//! `greet` is auto-wrapped: reading it yields a callable that fires with no
//! arguments on the next touch unless the caller invokes it explicitly.
//! `name` is a pass-through callable: invoking it stores a name, ignoring
//! it keeps chaining on the instance.
//!
//! Run with:
//!   cargo run --example greeter

use std::rc::Rc;

use husk_core::{Function, Handlers, HuskResult, Shell, Value};

struct Greeter;

impl Handlers for Greeter {
    fn init(&self, shell: &Value, _args: &[Value]) -> HuskResult<Option<Value>> {
        let record = shell.record().expect("freshly bound shell");
        let owner = shell.as_shell().expect("instantiate yields a shell");

        let greet = Function::auto_wrapped("greet", |ctx, args| {
            match args.first() {
                Some(name) => println!("Hello {name}!"),
                None => {
                    let stored = ctx
                        .and_then(|subject| subject.record())
                        .and_then(|r| r.raw_get("greet_name"));
                    match stored {
                        Some(name) => println!("Hello {name}!"),
                        None => println!("Hello whoever you are!"),
                    }
                }
            }
            Ok(None)
        });
        record.raw_set("greet", Value::Function(greet));

        let name = Function::new("name", |ctx, args| {
            if let (Some(subject), Some(name)) = (ctx, args.first()) {
                subject.record().expect("bound to the owner").raw_set("greet_name", name.clone());
            }
            Ok(None)
        });
        record.raw_set("name", Shell::pass_through(&owner, &name));

        record.raw_set("finished", Value::Bool(true));
        Ok(None)
    }
}

fn main() -> HuskResult<()> {
    let instance = Shell::instantiate(Rc::new(Greeter), &[])?;
    let shell = instance.as_shell().expect("no construction substitution");

    // Auto call: the chained read fires the zero-argument greeting.
    let greet = shell.get("greet")?.expect("greet is defined");
    let wrapper = greet.as_shell().expect("auto-wrapped read yields a shell");
    wrapper.get("finished")?;

    // Manual call: arguments flow through, nothing auto-fires afterwards.
    let greet = shell.get("greet")?.expect("greet is defined");
    let wrapper = greet.as_shell().expect("auto-wrapped read yields a shell");
    wrapper.call(None, &[Value::str("Wyatt Greenway")])?;
    wrapper.get("finished")?;

    // Optional call: store a name through the pass-through callable, then
    // keep treating it as the instance.
    let name = shell.get("name")?.expect("name is defined");
    let callable = name.as_shell().expect("pass-through callable");
    callable.call(None, &[Value::str("Husk")])?;
    let greet = callable.get("greet")?.expect("reads forward to the owner");
    let wrapper = greet.as_shell().expect("auto-wrapped read yields a shell");
    wrapper.get("finished")?;

    Ok(())
}
