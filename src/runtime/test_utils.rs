use crate::{
    domain::{ExecutionError, Source},
    errors::CadenceError,
    runtime::{RuntimeContext, Value},
};

pub fn init(text: &str) -> RuntimeContext {
    RuntimeContext::new(Source::from_text(text))
}

pub fn eval(text: &str) -> Value {
    init(text).run().expect("Failed to evaluate test string!")
}

pub fn run(text: &str) -> RuntimeContext {
    let mut context = init(text);
    context.run().expect("Cadence evaluation failed!");
    context
}

pub fn run_expect_error(text: &str) -> ExecutionError {
    match init(text).run() {
        Ok(_) => panic!("Expected an error!"),
        Err(CadenceError::Execution(e)) => e,
        Err(_) => panic!("Expected an execution error!"),
    }
}

pub fn read(ctx: &RuntimeContext, name: &str) -> Value {
    ctx.read(name).expect("Failed to read var")
}

macro_rules! int {
    ($i:expr) => {
        $crate::runtime::Value::Int($i)
    };
}

macro_rules! string {
    ($s:expr) => {
        $crate::runtime::Value::Str($s.into())
    };
}

macro_rules! boolean {
    ($b:expr) => {
        $crate::runtime::Value::Bool($b)
    };
}

macro_rules! assert_stop_iteration {
    ($error:expr) => {{
        match &$error {
            $crate::domain::ExecutionError::StopIteration(value) => {
                assert!(value.is_none(), "Unexpected StopIteration payload")
            }
            _ => panic!("Expected a StopIteration error, but got: {:?}", &$error),
        }
    }};
    ($error:expr, $expected_value:expr) => {{
        match &$error {
            $crate::domain::ExecutionError::StopIteration(value) => {
                assert_eq!(value, &$expected_value, "Unexpected StopIteration payload")
            }
            _ => panic!("Expected a StopIteration error, but got: {:?}", &$error),
        }
    }};
}

macro_rules! assert_type_error {
    ($error:expr, $expected_message:expr) => {{
        match &$error {
            $crate::domain::ExecutionError::TypeError(Some(msg)) => {
                assert_eq!(msg, $expected_message, "Unexpected TypeError message");
            }
            _ => panic!("Expected a TypeError with message, but got: {:?}", &$error),
        }
    }};
}

macro_rules! assert_name_error {
    ($error:expr, $expected_name:expr) => {{
        match &$error {
            $crate::domain::ExecutionError::NameError(name) => {
                assert_eq!(name, $expected_name, "Unexpected NameError name");
            }
            _ => panic!("Expected a NameError, but got: {:?}", &$error),
        }
    }};
}

pub(crate) use assert_name_error;
pub(crate) use assert_stop_iteration;
pub(crate) use assert_type_error;
pub(crate) use boolean;
pub(crate) use int;
pub(crate) use string;
