use crate::{
    core::Container,
    domain::Source,
    errors::{CadenceError, CadenceResult},
    lexer::Lexer,
    parser::Parser,
    runtime::{GenDef, GeneratorIterator, Interpreter, RuntimeState, Value},
};

/// Owns a lexer fed from a [`Source`] and the interpreter which evaluates whatever it produces.
pub struct RuntimeContext {
    lexer: Lexer,
    interpreter: Interpreter,
}

impl RuntimeContext {
    pub fn new(source: Source) -> Self {
        let lexer = Lexer::new(&source);
        let interpreter = Interpreter::new(RuntimeState::new());

        Self { lexer, interpreter }
    }

    pub fn run(&mut self) -> CadenceResult<Value> {
        // Destructure to break the borrow into disjoint pieces
        let RuntimeContext {
            lexer, interpreter, ..
        } = self;

        let mut parser = Parser::new(lexer);
        interpreter.execute(&mut parser)
    }

    pub fn add_line(&mut self, line: &str) {
        self.lexer
            .add_line(line)
            .expect("Failed to add line to lexer");
    }

    pub fn read(&self, name: &str) -> Option<Value> {
        self.interpreter.read_global(name)
    }

    /// Wrap the named global generator in an iterator handle for direct stepwise control.
    pub fn generator(&self, name: &str) -> Option<GeneratorIterator> {
        let gen = self.read(name)?.as_generator()?;
        Some(GeneratorIterator::new(gen, self.interpreter.clone()))
    }

    /// Register a generator definition assembled directly from a parameter list and body text.
    pub fn define_gen(&mut self, name: &str, params: &[&str], body: &str) -> CadenceResult<()> {
        let def = GenDef::from_parts(name, params, body).map_err(CadenceError::Parser)?;
        self.interpreter
            .write_global(name, Value::Def(Container::new(def)));
        Ok(())
    }
}
