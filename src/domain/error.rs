use std::fmt::{Display, Error, Formatter};

use crate::runtime::Value;

/// An error raised while executing Cadence code. `StopIteration` doubles as the transport for a
/// generator's final return value: a `return x` inside a generator surfaces here with `x` as the
/// payload before being folded into the terminal step result.
#[derive(Debug, PartialEq, Clone)]
pub enum ExecutionError {
    StopIteration(Value),
    TypeError(Option<String>),
    NameError(String),
    DivisionByZero,
    RuntimeError(Option<String>),
}

impl Display for ExecutionError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            ExecutionError::StopIteration(value) => {
                if value.is_none() {
                    write!(f, "StopIteration")
                } else {
                    write!(f, "StopIteration: {value}")
                }
            }
            ExecutionError::TypeError(Some(msg)) => write!(f, "TypeError: {msg}"),
            ExecutionError::TypeError(None) => write!(f, "TypeError"),
            ExecutionError::NameError(name) => {
                write!(f, "NameError: name '{name}' is not defined")
            }
            ExecutionError::DivisionByZero => {
                write!(f, "ZeroDivisionError: division by zero")
            }
            ExecutionError::RuntimeError(Some(msg)) => write!(f, "RuntimeError: {msg}"),
            ExecutionError::RuntimeError(None) => write!(f, "RuntimeError"),
        }
    }
}
