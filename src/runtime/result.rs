use crate::{domain::ExecutionError, runtime::Value};

/// Anything that can interrupt the straight-line evaluation of Cadence code: control flow
/// signals on one side, raised runtime errors on the other.
#[derive(Debug, PartialEq, Clone)]
pub enum Disruption {
    Signal(Signal),
    Error(ExecutionError),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Signal {
    Return(Value),
    Yield(Value),
    YieldFrom(Value),
}

pub type RuntimeResult<T> = Result<T, Disruption>;

impl From<ExecutionError> for Disruption {
    fn from(err: ExecutionError) -> Self {
        Disruption::Error(err)
    }
}
