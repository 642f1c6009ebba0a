mod frame;
mod pausable_context;
mod pausable_trait;

pub use frame::Frame;
pub use pausable_context::{PausableContext, PausableState, PausableToken};
pub use pausable_trait::{Pausable, PausableStepResult, Pause};
