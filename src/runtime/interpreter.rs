use crate::{
    core::Container,
    domain::ExecutionError,
    errors::{CadenceError, CadenceResult},
    parser::{
        types::{Ast, BinOp, CompareOp, Expr, Statement, StatementKind, UnaryOp},
        Parser,
    },
    runtime::{
        Disruption, GenDef, Generator, RuntimeResult, RuntimeState, Scope, Signal, Value,
    },
};

/// A cloneable evaluator handle over the shared [`RuntimeState`]. Clones share the same state,
/// which is how a suspended generator later resumes against the scopes it was created with.
#[derive(Clone)]
pub struct Interpreter {
    state: Container<RuntimeState>,
}

impl Interpreter {
    pub fn new(state: Container<RuntimeState>) -> Self {
        Self { state }
    }

    /// The top-level driver: parse and evaluate statements until the input is exhausted. The
    /// value of the final expression statement is returned, which is what the REPL displays.
    pub fn execute(&self, parser: &mut Parser) -> CadenceResult<Value> {
        let mut result = Value::None;

        loop {
            parser.consume_newlines();
            if parser.is_finished() {
                break;
            }

            let statement = parser.parse_statement().map_err(CadenceError::Parser)?;
            result = match self.evaluate_statement(&statement) {
                Ok(value) => value,
                Err(Disruption::Error(e)) => return Err(CadenceError::Execution(e)),
                Err(Disruption::Signal(_)) => {
                    return Err(CadenceError::Execution(ExecutionError::RuntimeError(Some(
                        "unexpected control flow signal".into(),
                    ))))
                }
            };
        }

        Ok(result)
    }

    pub fn evaluate_statement(&self, stmt: &Statement) -> RuntimeResult<Value> {
        match &stmt.kind {
            StatementKind::Expression(expr) => self.evaluate_expr(expr),
            StatementKind::Assignment { target, value } => {
                let value = self.evaluate_expr(value)?;
                self.state.borrow_mut().write(target, value);
                Ok(Value::None)
            }
            StatementKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Value::None,
                };
                Err(Disruption::Signal(Signal::Return(value)))
            }
            StatementKind::GenDef { name, params, body } => {
                let def = GenDef::new(name, params.clone(), body.clone());
                self.state
                    .borrow_mut()
                    .write(name, Value::Def(Container::new(def)));
                Ok(Value::None)
            }
            StatementKind::WhileLoop { condition, body } => {
                while self.evaluate_expr(condition)?.as_boolean() {
                    self.execute_block(body)?;
                }
                Ok(Value::None)
            }
            StatementKind::IfElse {
                if_part,
                elif_parts,
                else_part,
            } => {
                if self.evaluate_expr(&if_part.condition)?.as_boolean() {
                    self.execute_block(&if_part.block)?;
                    return Ok(Value::None);
                }

                for elif_part in elif_parts {
                    if self.evaluate_expr(&elif_part.condition)?.as_boolean() {
                        self.execute_block(&elif_part.block)?;
                        return Ok(Value::None);
                    }
                }

                if let Some(else_body) = else_part {
                    self.execute_block(else_body)?;
                }
                Ok(Value::None)
            }
            StatementKind::ForInLoop {
                index,
                iterable,
                body,
            } => {
                let value = self.evaluate_expr(iterable)?;
                let gen = value.as_generator().ok_or_else(|| {
                    self.type_error(format!("'{}' object is not iterable", value.type_name()))
                })?;

                // The generator is driven lazily; the terminal step ends the loop and its value
                // is never bound to the index variable.
                loop {
                    let step = gen
                        .try_borrow_mut()
                        .map_err(|_| self.type_error("generator already running"))?
                        .advance(self, None)?;
                    if step.done {
                        break;
                    }
                    self.state.borrow_mut().write(index, step.value);
                    self.execute_block(body)?;
                }
                Ok(Value::None)
            }
        }
    }

    fn execute_block(&self, block: &Ast) -> RuntimeResult<()> {
        for statement in block.iter() {
            self.evaluate_statement(statement)?;
        }
        Ok(())
    }

    pub fn evaluate_expr(&self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::None => Ok(Value::None),
            Expr::Integer(value) => Ok(Value::Int(*value)),
            Expr::StringLiteral(literal) => Ok(Value::Str(literal.clone())),
            Expr::Boolean(value) => Ok(Value::Bool(*value)),
            Expr::Variable(name) => self.read(name).ok_or_else(|| self.name_error(name)),
            Expr::UnaryOperation { op, right } => {
                let right = self.evaluate_expr(right)?;
                self.evaluate_unary_operation(op, right)
            }
            Expr::BinaryOperation { left, op, right } => {
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;
                self.evaluate_binary_operation(left, op, right)
            }
            Expr::CompareOperation { left, op, right } => {
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;
                self.evaluate_compare_operation(left, op, right)
            }
            Expr::FunctionCall { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.evaluate_expr(arg))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                self.call(name, args)
            }
            Expr::Yield(expr) => {
                // A yield in any position the pausable executor does not handle structurally
                // surfaces as a signal, which the top-level driver treats as an error.
                let value = match expr {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Value::None,
                };
                Err(Disruption::Signal(Signal::Yield(value)))
            }
            Expr::YieldFrom(expr) => {
                let value = self.evaluate_expr(expr)?;
                Err(Disruption::Signal(Signal::YieldFrom(value)))
            }
        }
    }

    fn evaluate_unary_operation(&self, op: &UnaryOp, right: Value) -> RuntimeResult<Value> {
        match op {
            UnaryOp::Minus => match right {
                Value::Int(i) => Ok(Value::Int(-i)),
                _ => Err(self.type_error(format!(
                    "bad operand type for unary -: '{}'",
                    right.type_name()
                ))),
            },
            UnaryOp::Not => Ok(Value::Bool(!right.as_boolean())),
        }
    }

    fn evaluate_binary_operation(
        &self,
        left: Value,
        op: &BinOp,
        right: Value,
    ) -> RuntimeResult<Value> {
        match (&left, op, &right) {
            (Value::Int(a), BinOp::Add, Value::Int(b)) => Ok(Value::Int(a + b)),
            (Value::Int(a), BinOp::Sub, Value::Int(b)) => Ok(Value::Int(a - b)),
            (Value::Int(a), BinOp::Mul, Value::Int(b)) => Ok(Value::Int(a * b)),
            (Value::Int(_), BinOp::Div, Value::Int(0)) => {
                Err(Disruption::Error(ExecutionError::DivisionByZero))
            }
            (Value::Int(a), BinOp::Div, Value::Int(b)) => Ok(Value::Int(a / b)),
            (Value::Str(a), BinOp::Add, Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            _ => Err(self.type_error(format!(
                "unsupported operand type(s): '{}' and '{}'",
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    fn evaluate_compare_operation(
        &self,
        left: Value,
        op: &CompareOp,
        right: Value,
    ) -> RuntimeResult<Value> {
        let result = match op {
            CompareOp::Equals => left == right,
            CompareOp::NotEquals => left != right,
            _ => {
                let (Value::Int(a), Value::Int(b)) = (&left, &right) else {
                    return Err(self.type_error(format!(
                        "'{}' not supported between '{}' and '{}'",
                        compare_op_symbol(op),
                        left.type_name(),
                        right.type_name()
                    )));
                };
                match op {
                    CompareOp::LessThan => a < b,
                    CompareOp::LessThanOrEqual => a <= b,
                    CompareOp::GreaterThan => a > b,
                    CompareOp::GreaterThanOrEqual => a >= b,
                    CompareOp::Equals | CompareOp::NotEquals => unreachable!(),
                }
            }
        };

        Ok(Value::Bool(result))
    }

    fn call(&self, name: &str, args: Vec<Value>) -> RuntimeResult<Value> {
        if let Some(value) = self.read(name) {
            return match value {
                Value::Def(def) => self.instantiate(def, args),
                _ => Err(self.type_error(format!(
                    "'{}' object is not callable",
                    value.type_name()
                ))),
            };
        }

        match name {
            "next" => self.builtin_next(args),
            "send" => self.builtin_send(args),
            "print" => self.builtin_print(args),
            _ => Err(self.name_error(name)),
        }
    }

    /// Create a fresh generator over the body of `def`. No body code runs here; the caller
    /// holds the only reference to the new generator's execution position.
    fn instantiate(&self, def: Container<GenDef>, args: Vec<Value>) -> RuntimeResult<Value> {
        let scope = Scope::bind(&def.borrow(), args)?;
        Ok(Value::Generator(Container::new(Generator::new(
            Container::new(scope),
            def.clone(),
        ))))
    }

    fn builtin_next(&self, args: Vec<Value>) -> RuntimeResult<Value> {
        let [gen] = self.check_args::<1>("next", args)?;
        self.advance_builtin(gen, None)
    }

    fn builtin_send(&self, args: Vec<Value>) -> RuntimeResult<Value> {
        let [gen, value] = self.check_args::<2>("send", args)?;
        self.advance_builtin(gen, Some(value))
    }

    fn builtin_print(&self, args: Vec<Value>) -> RuntimeResult<Value> {
        let output = args
            .iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{output}");
        Ok(Value::None)
    }

    /// Shared plumbing for `next` and `send`: advance the generator and surface a terminal step
    /// as a `StopIteration` carrying the return value.
    fn advance_builtin(&self, gen: Value, resume: Option<Value>) -> RuntimeResult<Value> {
        let gen = gen.as_generator().ok_or_else(|| {
            self.type_error(format!("'{}' object is not a generator", gen.type_name()))
        })?;

        let step = gen
            .try_borrow_mut()
            .map_err(|_| self.type_error("generator already running"))?
            .advance(self, resume)?;

        if step.done {
            Err(self.stop_iteration(step.value))
        } else {
            Ok(step.value)
        }
    }

    fn check_args<const N: usize>(
        &self,
        name: &str,
        args: Vec<Value>,
    ) -> RuntimeResult<[Value; N]> {
        let found = args.len();
        args.try_into().map_err(|_| {
            self.type_error(format!("{name}() takes {N} argument(s) but {found} were given"))
        })
    }

    pub fn read(&self, name: &str) -> Option<Value> {
        self.state.borrow().read(name)
    }

    pub fn read_global(&self, name: &str) -> Option<Value> {
        self.state.borrow().read_global(name)
    }

    pub fn write_global(&self, name: &str, value: Value) {
        self.state.borrow_mut().write_global(name, value);
    }

    pub fn write_loop_index(&self, index: &str, value: Value) {
        self.state.borrow_mut().write(index, value);
    }

    pub fn push_local(&self, scope: Container<Scope>) {
        self.state.borrow_mut().push_local(scope);
    }

    pub fn pop_local(&self) -> Option<Container<Scope>> {
        self.state.borrow_mut().pop_local()
    }

    pub fn type_error<T: Into<String>>(&self, message: T) -> Disruption {
        Disruption::Error(ExecutionError::TypeError(Some(message.into())))
    }

    pub fn name_error(&self, name: &str) -> Disruption {
        Disruption::Error(ExecutionError::NameError(name.to_string()))
    }

    pub fn stop_iteration(&self, value: Value) -> Disruption {
        Disruption::Error(ExecutionError::StopIteration(value))
    }
}

fn compare_op_symbol(op: &CompareOp) -> &'static str {
    match op {
        CompareOp::LessThan => "<",
        CompareOp::LessThanOrEqual => "<=",
        CompareOp::GreaterThan => ">",
        CompareOp::GreaterThanOrEqual => ">=",
        CompareOp::Equals => "==",
        CompareOp::NotEquals => "!=",
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::test_utils::*;

    use crate::domain::ExecutionError;

    #[test]
    fn evaluates_arithmetic() {
        assert_eq!(eval("2 + 3 * 4"), int!(14));
        assert_eq!(eval("(2 + 3) * 4"), int!(20));
        assert_eq!(eval("10 / 2 - 7"), int!(-2));
        assert_eq!(eval("-2 * 3"), int!(-6));
    }

    #[test]
    fn evaluates_comparisons() {
        assert_eq!(eval("1 < 2"), boolean!(true));
        assert_eq!(eval("1 >= 2"), boolean!(false));
        assert_eq!(eval("'a' == 'a'"), boolean!(true));
        assert_eq!(eval("1 != none"), boolean!(true));
    }

    #[test]
    fn evaluates_assignment() {
        let ctx = run("a = 5\nb = a + 1\n");
        assert_eq!(read(&ctx, "b"), int!(6));
    }

    #[test]
    fn evaluates_a_while_loop() {
        let ctx = run(r#"
total = 0
i = 0
while i < 5:
    total = total + i
    i = i + 1
"#);
        assert_eq!(read(&ctx, "total"), int!(10));
    }

    #[test]
    fn evaluates_if_elif_else() {
        let ctx = run(r#"
a = 7
if a < 5:
    kind = 'small'
elif a < 10:
    kind = 'medium'
else:
    kind = 'large'
"#);
        assert_eq!(read(&ctx, "kind"), string!("medium"));
    }

    #[test]
    fn undefined_variable_is_a_name_error() {
        let e = run_expect_error("a = b + 1");
        assert_name_error!(e, "b");
    }

    #[test]
    fn undefined_call_is_a_name_error() {
        let e = run_expect_error("a = missing()");
        assert_name_error!(e, "missing");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let e = run_expect_error("a = 1 / 0");
        assert_eq!(e, ExecutionError::DivisionByZero);
    }

    #[test]
    fn calling_a_non_generator_is_a_type_error() {
        let e = run_expect_error("a = 5\nb = a()\n");
        assert_type_error!(e, "'int' object is not callable");
    }

    #[test]
    fn iterating_a_non_generator_is_a_type_error() {
        let e = run_expect_error("for x in 5:\n    a = x\n");
        assert_type_error!(e, "'int' object is not iterable");
    }
}
