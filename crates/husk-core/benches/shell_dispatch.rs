use criterion::{black_box, criterion_group, criterion_main, Criterion};
use husk_core::{DefaultHandlers, Function, Record, Shell, Value};
use std::rc::Rc;

fn bench_reads(c: &mut Criterion) {
    let record = Record::new();
    record.raw_set("alpha", Value::Int(1));
    let shell = Shell::bind(record.clone(), Rc::new(DefaultHandlers), None);

    c.bench_function("record_raw_get", |b| {
        b.iter(|| record.raw_get(black_box("alpha")));
    });

    c.bench_function("shell_get", |b| {
        b.iter(|| shell.get(black_box("alpha")).unwrap());
    });

    c.bench_function("shell_get_missing", |b| {
        b.iter(|| shell.get(black_box("absent")).unwrap());
    });
}

fn bench_writes(c: &mut Criterion) {
    let shell = Shell::bind(Record::new(), Rc::new(DefaultHandlers), None);

    c.bench_function("shell_set", |b| {
        b.iter(|| shell.set(black_box("alpha"), Value::Int(black_box(7))).unwrap());
    });
}

fn bench_deferred_fire(c: &mut Criterion) {
    c.bench_function("register_and_fire_default_action", |b| {
        b.iter(|| {
            let shell = Shell::bind(Record::new(), Rc::new(DefaultHandlers), None);
            shell
                .record()
                .register_default_action(Function::new("noop", |_, _| Ok(None)));
            shell.get(black_box("touch")).unwrap()
        });
    });
}

criterion_group!(benches, bench_reads, bench_writes, bench_deferred_fire);
criterion_main!(benches);
