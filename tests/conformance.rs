//! Drives the public API through every observable behavior of the step protocol: value/done
//! pairs, terminal steps, delegation, resume values, and loop consumption.

use cadence::{CadenceContext, ExecutionError, GeneratorIterator, Source, StepResult, Value};

fn run(text: &str) -> CadenceContext {
    let mut context = CadenceContext::new(Source::from_text(text));
    context.run().expect("Cadence evaluation failed!");
    context
}

fn generator(ctx: &CadenceContext, name: &str) -> GeneratorIterator {
    ctx.generator(name).expect("Expected a generator!")
}

#[test]
fn calling_a_definition_returns_a_generator_object() {
    let ctx = run(r#"
gen basic():
    yield 1
    yield 2

g = basic()
"#);

    assert!(matches!(ctx.read("g"), Some(Value::Generator(_))));
}

#[test]
fn advance_returns_a_value_done_pair() {
    let ctx = run(r#"
gen basic():
    yield 1
    yield 2

g = basic()
"#);
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None), Ok(StepResult::suspended(Value::Int(1))));
}

#[test]
fn advance_past_the_end_returns_none_and_done() {
    let ctx = run(r#"
gen basic():
    yield 1
    yield 2

g = basic()
"#);
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None), Ok(StepResult::suspended(Value::Int(1))));
    assert_eq!(g.advance(None), Ok(StepResult::suspended(Value::Int(2))));
    assert_eq!(g.advance(None), Ok(StepResult::finished(Value::None)));
    // the sequence is exhausted and non-restartable
    assert_eq!(g.advance(None), Ok(StepResult::finished(Value::None)));
}

#[test]
fn yield_and_return_both_produce_values() {
    let ctx = run(r#"
gen worker():
    yield 1
    return 2

g = worker()
"#);
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None).map(|s| s.value), Ok(Value::Int(1)));
    assert_eq!(g.advance(None).map(|s| s.value), Ok(Value::Int(2)));
}

#[test]
fn a_yield_is_not_done_and_a_return_is_done() {
    let ctx = run(r#"
gen worker():
    yield 1
    return 2

g = worker()
"#);
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None), Ok(StepResult::suspended(Value::Int(1))));
    assert_eq!(g.advance(None), Ok(StepResult::finished(Value::Int(2))));
}

#[test]
fn a_lone_return_is_done_on_the_first_advance() {
    let ctx = run(r#"
gen worker():
    return 1

g = worker()
"#);
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None), Ok(StepResult::finished(Value::Int(1))));
}

#[test]
fn an_empty_body_is_done_immediately() {
    let mut ctx = CadenceContext::new(Source::from_text(""));
    ctx.define_gen("void", &[], "").expect("Failed to define!");
    ctx.add_line("g = void()");
    ctx.run().expect("Cadence evaluation failed!");
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None), Ok(StepResult::finished(Value::None)));
}

#[test]
fn delegation_re_emits_inner_values() {
    // two delegations to fresh instances restart the inner sequence; positions are never shared
    let ctx = run(r#"
gen inner():
    yield 1
    yield 2

gen outer():
    yield from inner()
    yield from inner()

g = outer()
"#);
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None).map(|s| s.value), Ok(Value::Int(1)));
    assert_eq!(g.advance(None).map(|s| s.value), Ok(Value::Int(2)));
    assert_eq!(g.advance(None).map(|s| s.value), Ok(Value::Int(1)));
    assert_eq!(g.advance(None).map(|s| s.value), Ok(Value::Int(2)));
    assert_eq!(g.advance(None), Ok(StepResult::finished(Value::None)));
}

#[test]
fn delegation_in_a_loop_repeats_without_bound() {
    let ctx = run(r#"
gen inner():
    yield 1
    yield 2

gen forever():
    while true:
        yield from inner()

g = forever()
"#);
    let g = generator(&ctx, "g");

    let values: Vec<Value> = g.take(6).collect();
    assert_eq!(
        values,
        vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(1),
            Value::Int(2),
            Value::Int(1),
            Value::Int(2),
        ]
    );
}

#[test]
fn a_resume_value_becomes_the_result_of_the_paused_yield() {
    let ctx = run(r#"
gen pauser():
    name = yield 'Hello'
    return name

g = pauser()
"#);
    let mut g = generator(&ctx, "g");

    assert_eq!(
        g.advance(None),
        Ok(StepResult::suspended(Value::Str("Hello".into())))
    );
    assert_eq!(
        g.advance(Some(Value::Str("Goodbye".into()))),
        Ok(StepResult::finished(Value::Str("Goodbye".into())))
    );
}

#[test]
fn a_definition_can_be_assembled_from_text() {
    let mut ctx = CadenceContext::new(Source::from_text(""));
    ctx.define_gen("double", &["a"], "yield a * 2")
        .expect("Failed to define!");
    ctx.add_line("g = double(10)");
    ctx.run().expect("Cadence evaluation failed!");
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None), Ok(StepResult::suspended(Value::Int(20))));
}

#[test]
fn a_for_loop_collects_yielded_values() {
    let ctx = run(r#"
gen foo():
    yield 5
    yield 5

total = 0
for v in foo():
    total = total + v
"#);

    assert_eq!(ctx.read("total"), Some(Value::Int(10)));
}

#[test]
fn a_for_loop_excludes_the_return_value() {
    let ctx = run(r#"
gen bar():
    yield 5
    yield 5
    return 10

total = 0
for v in bar():
    total = total + v
"#);

    // the return value never reaches the loop body
    assert_eq!(ctx.read("total"), Some(Value::Int(10)));
}

#[test]
fn rust_iteration_excludes_the_return_value() {
    let ctx = run(r#"
gen bar():
    yield 5
    yield 5
    return 10

g = bar()
"#);
    let g = generator(&ctx, "g");

    let total: i64 = g
        .map(|v| match v {
            Value::Int(i) => i,
            _ => panic!("Expected an int!"),
        })
        .sum();
    assert_eq!(total, 10);
}

#[test]
fn an_error_during_advance_propagates_and_is_terminal() {
    let ctx = run(r#"
gen boom():
    yield 1
    x = 1 / 0

g = boom()
"#);
    let mut g = generator(&ctx, "g");

    assert_eq!(g.advance(None), Ok(StepResult::suspended(Value::Int(1))));
    assert_eq!(g.advance(None), Err(ExecutionError::DivisionByZero));
    assert_eq!(g.advance(None), Ok(StepResult::finished(Value::None)));
}

#[test]
fn the_next_builtin_raises_stop_iteration_past_the_end() {
    let mut ctx = CadenceContext::new(Source::from_text(
        "gen single():\n    yield 1\n\ng = single()\na = next(g)\nb = next(g)\n",
    ));

    match ctx.run() {
        Err(cadence::CadenceError::Execution(ExecutionError::StopIteration(value))) => {
            assert_eq!(value, Value::None);
        }
        other => panic!("Expected a StopIteration error, but got: {other:?}"),
    }
}
