mod container;
mod log;

pub use container::Container;
#[allow(unused_imports)]
pub use log::{log, LogLevel};
