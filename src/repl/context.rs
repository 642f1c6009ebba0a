use crate::{context::CadenceContext, domain::Source, errors::CadenceResult, runtime::Value};

/// A context which accepts lines one at a time, the way a REPL session produces them.
pub struct IncrementalContext {
    context: CadenceContext,
}

impl IncrementalContext {
    pub fn new() -> Self {
        Self {
            context: CadenceContext::new(Source::from_text("")),
        }
    }

    pub fn add_line(&mut self, line: &str) {
        self.context.add_line(line);
    }

    pub fn run(&mut self) -> CadenceResult<Value> {
        self.context.run()
    }
}

impl Default for IncrementalContext {
    fn default() -> Self {
        Self::new()
    }
}
