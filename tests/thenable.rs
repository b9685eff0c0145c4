use promise::{Completion, Function, HostObject, ManualScheduler, Object, Promise, Record, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Outcome = Arc<Mutex<Option<Result<Value, Value>>>>;

fn observe(promise: &Promise) -> Outcome {
    let outcome: Outcome = Arc::new(Mutex::new(None));
    let fulfilled = outcome.clone();
    let rejected = outcome.clone();

    promise.then(
        Function::unary(move |value| {
            *fulfilled.lock().unwrap() = Some(Ok(value));
            Ok(Value::Undefined)
        }),
        Function::unary(move |reason| {
            *rejected.lock().unwrap() = Some(Err(reason));
            Ok(Value::Undefined)
        }),
    );

    outcome
}

fn outcome(observed: &Outcome) -> Option<Result<Value, Value>> {
    observed.lock().unwrap().clone()
}

// Calls argument `index` of a `then(resolve, reject)` invocation with `value`.
fn settle_arg(args: &[Value], index: usize, value: Value) -> Completion {
    match args.get(index) {
        Some(Value::Function(settle)) => settle.call(&[value]),
        _ => Ok(Value::Undefined),
    }
}

// A thenable that fulfills with `value` and counts its `then` calls.
fn counting_thenable(value: Value, calls: Arc<AtomicUsize>) -> Value {
    Record::new()
        .with(
            "then",
            Function::new(move |args| {
                calls.fetch_add(1, Ordering::SeqCst);
                settle_arg(args, 0, value.clone())
            }),
        )
        .into()
}

#[derive(Debug)]
struct ThrowingGetter;

impl HostObject for ThrowingGetter {
    fn get(&self, key: &str) -> Completion {
        match key {
            "then" => Err(Value::from("getter error")),
            _ => Ok(Value::Undefined),
        }
    }
}

#[test]
fn test_resolve_thenable() {
    let scheduler = ManualScheduler::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let observed = scheduler.enter(|| {
        observe(&Promise::resolve(counting_thenable(Value::from(1), calls.clone())))
    });

    assert_eq!(calls.load(Ordering::SeqCst), 0, "then must not be called synchronously");
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Ok(Value::from(1))));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "then is called exactly once");
}

#[test]
fn test_resolving_with_thenable_defers_then() {
    let scheduler = ManualScheduler::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let thenable = counting_thenable(Value::from(1), calls.clone());

    scheduler.enter(|| {
        Promise::new(move |resolve, _| {
            resolve.call(thenable);
            Ok(())
        });
    });

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    scheduler.run_until_idle();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reject_thenable_is_verbatim() {
    let scheduler = ManualScheduler::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let thenable = counting_thenable(Value::from(1), calls.clone());

    let observed = scheduler.enter(|| observe(&Promise::reject(thenable.clone())));
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Err(thenable)));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "rejecting never probes the reason");
}

#[test]
fn test_return_thenable_from_on_fulfilled() {
    let scheduler = ManualScheduler::new();

    let observed = scheduler.enter(|| {
        observe(&Promise::resolve(1).then(
            Function::unary(|value| {
                let next = Value::from(value.as_number().unwrap_or_default() + 1.0);
                Ok(Record::new()
                    .with("then", Function::new(move |args| settle_arg(args, 0, next.clone())))
                    .into())
            }),
            (),
        ))
    });
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Ok(Value::from(2))));
}

#[test]
fn test_return_thenable_from_on_rejected() {
    let scheduler = ManualScheduler::new();

    let observed = scheduler.enter(|| {
        observe(&Promise::reject("error").catch(Function::unary(|reason| {
            Ok(Record::new()
                .with("then", Function::new(move |args| settle_arg(args, 1, reason.clone())))
                .into())
        })))
    });
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Err(Value::from("error"))));
}

#[test]
fn test_throw_from_thenable() {
    let scheduler = ManualScheduler::new();

    let observed = scheduler.enter(|| {
        observe(&Promise::resolve(()).then(
            Function::unary(|_| {
                Ok(Record::new()
                    .with("then", Function::new(|_| Err(Value::from("then error"))))
                    .into())
            }),
            (),
        ))
    });
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Err(Value::from("then error"))));
}

#[test]
fn test_throw_after_settling_from_thenable_is_ignored() {
    let scheduler = ManualScheduler::new();

    let observed = scheduler.enter(|| {
        let thenable = Record::new().with(
            "then",
            Function::new(|args| {
                settle_arg(args, 0, Value::from(1))?;
                Err(Value::from("late error"))
            }),
        );
        observe(&Promise::resolve(thenable))
    });
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Ok(Value::from(1))));
}

#[test]
fn test_throwing_then_getter_rejects() {
    let scheduler = ManualScheduler::new();

    let (from_resolve, from_handler) = scheduler.enter(|| {
        let from_resolve = observe(&Promise::resolve(Object::new(ThrowingGetter)));
        let from_handler = observe(&Promise::resolve(()).then(
            Function::unary(|_| Ok(Object::new(ThrowingGetter).into())),
            (),
        ));
        (from_resolve, from_handler)
    });
    scheduler.run_until_idle();

    assert_eq!(outcome(&from_resolve), Some(Err(Value::from("getter error"))));
    assert_eq!(outcome(&from_handler), Some(Err(Value::from("getter error"))));
}

#[test]
fn test_non_callable_then_is_a_plain_value() {
    let scheduler = ManualScheduler::new();
    let object = Value::from(Record::new().with("then", 5));

    let observed = scheduler.enter(|| observe(&Promise::resolve(object.clone())));
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Ok(object)));
}

#[test]
fn test_thenable_resolving_with_promise_is_unwrapped() {
    let scheduler = ManualScheduler::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let observed = scheduler.enter(|| {
        let inner = Promise::new(|resolve, _| {
            resolve.call("inner value");
            Ok(())
        });
        let thenable = Record::new().with(
            "then",
            Function::new(move |args| {
                counter.fetch_add(1, Ordering::SeqCst);
                settle_arg(args, 0, inner.clone().into())
            }),
        );
        observe(&Promise::resolve(thenable))
    });
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Ok(Value::from("inner value"))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_chain_of_thenables_unwraps() {
    let scheduler = ManualScheduler::new();

    let observed = scheduler.enter(|| {
        let mut value = Value::from("bottom");
        for _ in 0..50 {
            let next = value.clone();
            value = Record::new()
                .with("then", Function::new(move |args| settle_arg(args, 0, next.clone())))
                .into();
        }
        observe(&Promise::resolve(value))
    });
    scheduler.run_until_idle();

    assert_eq!(outcome(&observed), Some(Ok(Value::from("bottom"))));
}
