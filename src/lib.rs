mod cadence;
mod context;
mod core;
mod domain;
mod errors;
mod lexer;
mod parser;
#[cfg(feature = "repl")]
mod repl;
mod runtime;
#[cfg(feature = "wasm")]
mod wasm;

pub use crate::cadence::Cadence;
pub use crate::context::CadenceContext;
pub use crate::core::Container;
pub use crate::domain::{ExecutionError, Source};
pub use crate::errors::{CadenceError, CadenceResult, LexerError, ParserError};
pub use crate::runtime::{GenDef, Generator, GeneratorIterator, StepResult, Value};
