use crate::{
    core::Container,
    domain::{ExecutionError, Source},
    errors::ParserError,
    lexer::Lexer,
    parser::{
        types::{Ast, Expr, Statement, StatementKind},
        Parser,
    },
    runtime::{
        pausable::{
            Frame, Pausable, PausableContext, PausableState, PausableStepResult, PausableToken,
        },
        Disruption, Interpreter, RuntimeResult, Scope, StepResult, Value,
    },
};

/// A generator definition: a parameter list and a body. Calling a definition creates a fresh
/// [`Generator`] without executing any of the body.
#[derive(Debug, PartialEq, Clone)]
pub struct GenDef {
    name: String,
    params: Vec<String>,
    body: Ast,
}

impl GenDef {
    pub fn new(name: &str, params: Vec<String>, body: Ast) -> Self {
        Self {
            name: name.to_string(),
            params,
            body,
        }
    }

    /// Assemble a definition directly from a parameter list and body text, without a `gen`
    /// header. The body is parsed as if it appeared inside a definition.
    pub fn from_parts(name: &str, params: &[&str], body: &str) -> Result<Self, ParserError> {
        let mut lexer = Lexer::new(&Source::from_text(body));
        let mut parser = Parser::gen_body(&mut lexer);
        let body = parser.parse_all()?;

        Ok(Self::new(
            name,
            params.iter().map(|p| p.to_string()).collect(),
            body,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &Ast {
        &self.body
    }
}

/// A live generator: a suspended execution position over the body of its definition, plus the
/// locals captured in its scope.
pub struct Generator {
    scope: Container<Scope>,
    context: PausableContext,

    /// The value carried by the current advance, available to a resume binding or an active
    /// delegation until one of them consumes it.
    resume: Option<Value>,

    /// When suspended at `name = yield ...`, the identifier awaiting the next resume value.
    pending_target: Option<String>,
}

impl Generator {
    pub fn new(scope: Container<Scope>, def: Container<GenDef>) -> Self {
        let frame = Frame::new(def.borrow().body().clone());

        Self {
            scope,
            context: PausableContext::new(frame),
            resume: None,
            pending_target: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.context.is_finished()
    }

    /// Advance the generator: resume the body from its last suspension point, substituting
    /// `resume` as the value of that suspension expression, and run until the next suspension
    /// point, a `return`, or the end of the body.
    ///
    /// Once a terminal step has been produced, every subsequent call reports `(none, true)`.
    /// An error raised by the body propagates to the caller and the generator is terminal
    /// thereafter.
    pub fn advance(
        &mut self,
        interpreter: &Interpreter,
        resume: Option<Value>,
    ) -> RuntimeResult<StepResult> {
        if self.is_finished() {
            return Ok(StepResult::finished(Value::None));
        }

        self.resume = resume;
        if let Some(target) = self.pending_target.take() {
            let value = self.resume.take().unwrap_or(Value::None);
            self.scope.borrow_mut().insert(&target, value);
        }

        let outcome = self.run_until_pause(interpreter);
        self.resume = None;

        match outcome {
            Ok(value) => Ok(StepResult::suspended(value)),
            Err(Disruption::Error(ExecutionError::StopIteration(value))) => {
                Ok(StepResult::finished(value))
            }
            Err(err) => {
                self.context.set_state(PausableState::Finished);
                Err(err)
            }
        }
    }

    fn evaluate_optional(
        &self,
        interpreter: &Interpreter,
        expr: &Option<Box<Expr>>,
    ) -> RuntimeResult<Value> {
        match expr {
            Some(expr) => interpreter.evaluate_expr(expr),
            None => Ok(Value::None),
        }
    }
}

impl Pausable for Generator {
    fn context(&self) -> &PausableContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut PausableContext {
        &mut self.context
    }

    fn scope(&self) -> Container<Scope> {
        self.scope.clone()
    }

    fn set_scope(&mut self, scope: Container<Scope>) {
        self.scope = scope;
    }

    fn take_resume(&mut self) -> Option<Value> {
        self.resume.take()
    }

    fn finish(&mut self, interpreter: &Interpreter, result: Value) -> RuntimeResult<Value> {
        Err(interpreter.stop_iteration(result))
    }

    fn handle_step(
        &mut self,
        interpreter: &Interpreter,
        statement: Statement,
        control_flow: bool,
    ) -> RuntimeResult<PausableStepResult> {
        if control_flow {
            return Ok(PausableStepResult::NoOp);
        }

        match &statement.kind {
            StatementKind::Expression(Expr::Yield(expr)) => {
                let value = self.evaluate_optional(interpreter, expr)?;
                Ok(PausableStepResult::Suspend(value))
            }
            StatementKind::Assignment {
                target,
                value: Expr::Yield(expr),
            } => {
                let value = self.evaluate_optional(interpreter, expr)?;
                self.pending_target = Some(target.clone());
                Ok(PausableStepResult::Suspend(value))
            }
            StatementKind::Expression(Expr::YieldFrom(expr)) => {
                let value = interpreter.evaluate_expr(expr)?;
                let inner = value.as_generator().ok_or_else(|| {
                    interpreter
                        .type_error(format!("cannot delegate to a '{}' object", value.type_name()))
                })?;

                self.context.push_context(PausableToken::new(
                    Frame::empty(),
                    PausableState::Delegating(inner),
                ));

                Ok(PausableStepResult::NoOp)
            }
            StatementKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => interpreter.evaluate_expr(expr)?,
                    None => Value::None,
                };
                Ok(PausableStepResult::Finish(value))
            }
            _ => {
                interpreter.evaluate_statement(&statement)?;
                Ok(PausableStepResult::NoOp)
            }
        }
    }
}

/// Bundles a live generator with the interpreter needed to run its body. This is both the
/// public handle for direct stepwise control and the bridge into Rust's `for` loops.
#[derive(Clone)]
pub struct GeneratorIterator {
    generator: Container<Generator>,
    interpreter: Interpreter,
}

impl GeneratorIterator {
    pub(crate) fn new(generator: Container<Generator>, interpreter: Interpreter) -> Self {
        Self {
            generator,
            interpreter,
        }
    }

    /// Advance the underlying generator, optionally substituting `resume` at the paused
    /// suspension point. See [`Generator::advance`] for the step contract.
    pub fn advance(&mut self, resume: Option<Value>) -> Result<StepResult, ExecutionError> {
        self.generator
            .borrow_mut()
            .advance(&self.interpreter, resume)
            .map_err(|err| match err {
                Disruption::Error(e) => e,
                Disruption::Signal(_) => {
                    ExecutionError::RuntimeError(Some("unexpected control flow signal".into()))
                }
            })
    }
}

impl Iterator for GeneratorIterator {
    type Item = Value;

    /// Iteration consumes yielded values only: the terminal step ends iteration, and its value
    /// (the generator's return value, if any) is never observed here. Use
    /// [`GeneratorIterator::advance`] to see terminal steps.
    fn next(&mut self) -> Option<Self::Item> {
        if self.generator.borrow().is_finished() {
            return None;
        }

        match self.advance(None) {
            Ok(step) if step.done => None,
            Ok(step) => Some(step.value),
            Err(_) => panic!("Unexpected error during generator run."),
        }
    }
}
