mod context;
mod generator;
mod interpreter;
mod pausable;
mod result;
mod scope;
mod state;
mod step;
#[cfg(test)]
pub mod test_utils;
mod value;

pub use context::RuntimeContext;
pub use generator::{GenDef, Generator, GeneratorIterator};
pub use interpreter::Interpreter;
pub use result::{Disruption, RuntimeResult, Signal};
pub use scope::Scope;
pub use state::RuntimeState;
pub use step::StepResult;
pub use value::Value;
