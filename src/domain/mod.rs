mod error;
mod source;

pub use error::ExecutionError;
pub use source::Source;
