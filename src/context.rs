use crate::{
    domain::Source,
    errors::CadenceResult,
    runtime::{GeneratorIterator, RuntimeContext, Value},
};

/// The public embedding surface: evaluate Cadence source, read globals back out, and take
/// stepwise control of any generator the program created.
pub struct CadenceContext {
    context: RuntimeContext,
}

impl CadenceContext {
    pub fn new(source: Source) -> Self {
        Self {
            context: RuntimeContext::new(source),
        }
    }

    pub fn run(&mut self) -> CadenceResult<Value> {
        self.context.run()
    }

    pub fn add_line(&mut self, line: &str) {
        self.context.add_line(line);
    }

    pub fn read(&self, name: &str) -> Option<Value> {
        self.context.read(name)
    }

    pub fn generator(&self, name: &str) -> Option<GeneratorIterator> {
        self.context.generator(name)
    }

    pub fn define_gen(&mut self, name: &str, params: &[&str], body: &str) -> CadenceResult<()> {
        self.context.define_gen(name, params, body)
    }
}
