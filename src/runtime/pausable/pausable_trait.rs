use std::collections::VecDeque;

use crate::{
    core::Container,
    parser::types::{Statement, StatementKind},
    runtime::{Interpreter, RuntimeResult, Scope, Value},
};

use super::{Frame, PausableContext, PausableState, PausableToken};

/// This instructs the step loop what action should happen next.
pub enum PausableStepResult {
    NoOp,
    /// Pause at a suspension point, handing the value to the caller of the current advance.
    Suspend(Value),
    /// Terminate immediately with the given return value.
    Finish(Value),
}

/// How a single run of the step loop ended: paused at a suspension point, or completed.
pub enum Pause {
    Suspended(Value),
    Completed(Value),
}

/// The interface for pausable functions, which can be suspended and later resumed from the same
/// execution position.
pub trait Pausable {
    /// A getter for the [`PausableContext`] of a pausable function.
    fn context(&self) -> &PausableContext;

    /// A mutable getter for the [`PausableContext`] of a pausable function.
    fn context_mut(&mut self) -> &mut PausableContext;

    /// A getter for the [`Scope`] of a pausable function.
    fn scope(&self) -> Container<Scope>;

    /// A setter for the [`Scope`] of a pausable function.
    fn set_scope(&mut self, scope: Container<Scope>);

    /// A handle to perform any necessary cleanup once this function completes, including
    /// surfacing its return value.
    fn finish(&mut self, interpreter: &Interpreter, result: Value) -> RuntimeResult<Value>;

    /// A handle to invoke the discrete operation of evaluating an individual statement and
    /// producing a [`PausableStepResult`] based on the control flow instructions and or the
    /// expression return values encountered.
    fn handle_step(
        &mut self,
        interpreter: &Interpreter,
        statement: Statement,
        control_flow: bool,
    ) -> RuntimeResult<PausableStepResult>;

    /// Surrender the value carried into the current advance, if any. Consumed at most once per
    /// advance: by a resume binding or by an active delegation.
    fn take_resume(&mut self) -> Option<Value> {
        None
    }

    /// The default behavior which selects the next [`Statement`] and manually evaluates any
    /// control flow statements. This then calls [`Pausable::handle_step`] to set up any return
    /// values based on whether a control flow structure was encountered.
    fn step(&mut self, interpreter: &Interpreter) -> RuntimeResult<PausableStepResult> {
        let statement = self.context_mut().next_statement();

        // Delegate to the common function for control flow
        let encountered_control_flow =
            self.execute_control_flow_statement(&statement, interpreter)?;

        self.handle_step(interpreter, statement, encountered_control_flow)
    }

    /// The default behavior required to perform the necessary context switching when entering a
    /// pausable function.
    fn on_entry(&mut self, interpreter: &Interpreter) {
        interpreter.push_local(self.scope());
    }

    /// The default behavior required to perform the necessary context switching when exiting a
    /// pausable function.
    fn on_exit(&mut self, interpreter: &Interpreter) {
        if let Some(scope) = interpreter.pop_local() {
            self.set_scope(scope);
        }
    }

    /// This function manually executes any control flow statements. Any changes are reflected by
    /// invoking [`PausableContext::push_context`] with the new [`Frame`] and [`PausableState`].
    ///
    /// This implementation uses a stack-based control flow to remember the next instruction
    /// whenever this function is suspended.
    ///
    /// A boolean is returned indicating whether a control flow statement was encountered.
    fn execute_control_flow_statement(
        &mut self,
        stmt: &Statement,
        interpreter: &Interpreter,
    ) -> RuntimeResult<bool> {
        match &stmt.kind {
            StatementKind::WhileLoop { condition, body } => {
                if interpreter.evaluate_expr(condition)?.as_boolean() {
                    self.context_mut().push_context(PausableToken::new(
                        Frame::new(body.clone()),
                        PausableState::InWhileLoop(condition.clone()),
                    ));
                }

                Ok(true)
            }
            StatementKind::IfElse {
                if_part,
                elif_parts,
                else_part,
            } => {
                if interpreter.evaluate_expr(&if_part.condition)?.as_boolean() {
                    self.context_mut().push_context(PausableToken::new(
                        Frame::new(if_part.block.clone()),
                        PausableState::InBlock,
                    ));

                    return Ok(true);
                }

                for elif_part in elif_parts {
                    if interpreter
                        .evaluate_expr(&elif_part.condition)?
                        .as_boolean()
                    {
                        self.context_mut().push_context(PausableToken::new(
                            Frame::new(elif_part.block.clone()),
                            PausableState::InBlock,
                        ));

                        return Ok(true);
                    }
                }

                if let Some(else_body) = else_part {
                    self.context_mut().push_context(PausableToken::new(
                        Frame::new(else_body.clone()),
                        PausableState::InBlock,
                    ));
                }

                Ok(true)
            }
            StatementKind::ForInLoop {
                index,
                iterable,
                body,
            } => {
                // The iterable is drained up front; suspension points inside the loop body then
                // work against a stable queue of values.
                let value = interpreter.evaluate_expr(iterable)?;
                let gen = value.as_generator().ok_or_else(|| {
                    interpreter.type_error(format!("'{}' object is not iterable", value.type_name()))
                })?;

                let mut queue = VecDeque::new();
                loop {
                    let step = gen
                        .try_borrow_mut()
                        .map_err(|_| interpreter.type_error("generator already running"))?
                        .advance(interpreter, None)?;
                    if step.done {
                        break;
                    }
                    queue.push_back(step.value);
                }

                if let Some(item) = queue.pop_front() {
                    interpreter.write_loop_index(index, item);
                    self.context_mut().push_context(PausableToken::new(
                        Frame::new(body.clone()),
                        PausableState::InForLoop {
                            index: index.clone(),
                            queue: Container::new(queue),
                        },
                    ));
                }

                Ok(true)
            }
            _ => Ok(false), // only control flow statements are handled here
        }
    }

    /// Run this [`Pausable`] until it reaches a pause event: a suspension point or the
    /// completion of the body. The scope context switch brackets the whole run, so an error
    /// raised mid-body still restores the caller's scope before propagating.
    fn run_until_pause(&mut self, interpreter: &Interpreter) -> RuntimeResult<Value> {
        self.on_entry(interpreter);
        let outcome = self.run_loop(interpreter);
        self.on_exit(interpreter);

        match outcome? {
            Pause::Suspended(value) => Ok(value),
            Pause::Completed(value) => {
                self.context_mut().set_state(PausableState::Finished);
                self.finish(interpreter, value)
            }
        }
    }

    /// The state machine at the heart of a pausable function. Each iteration inspects the state
    /// of the innermost frame and either performs the bookkeeping for a control flow structure
    /// or evaluates the next statement.
    #[doc(hidden)]
    fn run_loop(&mut self, interpreter: &Interpreter) -> RuntimeResult<Pause> {
        loop {
            match self.context().current_state() {
                PausableState::Created => {
                    self.context_mut().start();
                }
                PausableState::Running => {
                    if self.context().current_frame().is_finished() {
                        return Ok(Pause::Completed(Value::None));
                    }

                    match self.step(interpreter)? {
                        PausableStepResult::NoOp => {}
                        PausableStepResult::Suspend(value) => {
                            return Ok(Pause::Suspended(value));
                        }
                        PausableStepResult::Finish(value) => {
                            return Ok(Pause::Completed(value));
                        }
                    }
                }
                PausableState::InBlock => {
                    if self.context().current_frame().is_finished() {
                        self.context_mut().pop_context();
                        continue;
                    }

                    match self.step(interpreter)? {
                        PausableStepResult::NoOp => {}
                        PausableStepResult::Suspend(value) => {
                            return Ok(Pause::Suspended(value));
                        }
                        PausableStepResult::Finish(value) => {
                            return Ok(Pause::Completed(value));
                        }
                    }
                }
                PausableState::InWhileLoop(condition) => {
                    // The condition is re-evaluated whenever a full pass over the body has
                    // completed, whether the last statement was evaluated directly or a nested
                    // frame just popped.
                    if self.context().current_frame().is_finished() {
                        if interpreter.evaluate_expr(&condition)?.as_boolean() {
                            self.context_mut().restart_frame();
                        } else {
                            self.context_mut().pop_context();
                            continue;
                        }
                    }

                    match self.step(interpreter)? {
                        PausableStepResult::NoOp => {}
                        PausableStepResult::Suspend(value) => {
                            return Ok(Pause::Suspended(value));
                        }
                        PausableStepResult::Finish(value) => {
                            return Ok(Pause::Completed(value));
                        }
                    }
                }
                PausableState::InForLoop { index, queue } => {
                    if self.context().current_frame().is_finished() {
                        let item = queue.borrow_mut().pop_front();
                        if let Some(item) = item {
                            interpreter.write_loop_index(&index, item);
                            self.context_mut().restart_frame();
                        } else {
                            self.context_mut().pop_context();
                            continue;
                        }
                    }

                    match self.step(interpreter)? {
                        PausableStepResult::NoOp => {}
                        PausableStepResult::Suspend(value) => {
                            return Ok(Pause::Suspended(value));
                        }
                        PausableStepResult::Finish(value) => {
                            return Ok(Pause::Completed(value));
                        }
                    }
                }
                PausableState::Delegating(inner) => {
                    let resume = self.take_resume();
                    let step = inner
                        .try_borrow_mut()
                        .map_err(|_| interpreter.type_error("generator already running"))?
                        .advance(interpreter, resume)?;
                    if step.done {
                        // the inner generator is exhausted; its return value is dropped and
                        // control returns to our own next statement
                        self.context_mut().pop_context();
                        continue;
                    }

                    return Ok(Pause::Suspended(step.value));
                }
                PausableState::Finished => unreachable!(),
            }
        }
    }
}
