use crate::{
    core::{log, LogLevel},
    errors::ParserError,
    lexer::{Lexer, Token},
    parser::{
        types::{Ast, BinOp, CompareOp, ConditionalAst, Expr, Statement, StatementKind, UnaryOp},
        TokenBuffer,
    },
};

/// A recursive-descent parser for the Cadence grammar.
pub struct Parser<'a> {
    tokens: TokenBuffer<'a>,
    line_number: usize,

    /// How many generator bodies deep are we? `yield` and `return` are only legal when this is
    /// nonzero.
    gen_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: &'a mut Lexer) -> Self {
        Parser {
            tokens: TokenBuffer::new(lexer),
            line_number: 1,
            gen_depth: 0,
        }
    }

    /// A parser which treats its entire input as the body of a generator. This is how a
    /// definition is assembled directly from text, without a `gen` header.
    pub fn gen_body(lexer: &'a mut Lexer) -> Self {
        Parser {
            tokens: TokenBuffer::new(lexer),
            line_number: 1,
            gen_depth: 1,
        }
    }

    fn current_token(&mut self) -> &Token {
        self.tokens.peek(0)
    }

    pub fn is_finished(&mut self) -> bool {
        self.current_token() == &Token::Eof
    }

    fn end_of_statement(&mut self) -> bool {
        self.is_finished() || self.current_token() == &Token::Newline
    }

    fn consume(&mut self, expected: &Token) -> Result<(), ParserError> {
        let current = self.tokens.peek(0);

        log(LogLevel::Trace, || format!("Token: {current:?}"));

        if current != expected {
            return Err(ParserError::ExpectedToken(
                expected.clone(),
                current.clone(),
            ));
        }

        if current == &Token::Newline {
            self.line_number += 1;
        }

        self.tokens.consume();

        Ok(())
    }

    fn consume_current(&mut self) -> Result<(), ParserError> {
        let token = self.tokens.peek(0).clone();
        self.consume(&token)
    }

    fn consume_optional_many(&mut self, expected: &Token) {
        while self.current_token() == expected {
            let _ = self.consume(expected);
        }
    }

    pub fn consume_newlines(&mut self) {
        self.consume_optional_many(&Token::Newline);
    }

    /// Parse everything remaining into a single [`Ast`]. Used for generator bodies assembled
    /// from text; the incremental driver in the interpreter parses statement by statement
    /// instead.
    pub fn parse_all(&mut self) -> Result<Ast, ParserError> {
        let mut statements = vec![];
        loop {
            self.consume_newlines();
            if self.is_finished() {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(Ast::new(statements))
    }

    pub fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        log(LogLevel::Trace, || "parse_statement".to_string());
        let start_line = self.line_number;

        let kind = match self.current_token() {
            Token::Gen => self.parse_gen_def()?,
            Token::While => self.parse_while_loop()?,
            Token::If => self.parse_if_else()?,
            Token::For => self.parse_for_in_loop()?,
            _ => {
                let kind = self.parse_simple_statement()?;
                self.consume_end_of_statement()?;
                kind
            }
        };

        Ok(Statement::new(start_line, kind))
    }

    fn consume_end_of_statement(&mut self) -> Result<(), ParserError> {
        if self.current_token() == &Token::Newline {
            self.consume(&Token::Newline)
        } else if self.is_finished() {
            Ok(())
        } else {
            Err(ParserError::UnexpectedToken(self.current_token().clone()))
        }
    }

    fn parse_simple_statement(&mut self) -> Result<StatementKind, ParserError> {
        match self.current_token().clone() {
            Token::Yield => Ok(StatementKind::Expression(self.parse_yield_expr()?)),
            Token::Return => self.parse_return(),
            Token::Identifier(name) if self.tokens.peek(1) == &Token::Assign => {
                self.consume(&Token::Identifier(name.clone()))?;
                self.consume(&Token::Assign)?;

                let value = if self.current_token() == &Token::Yield {
                    let expr = self.parse_yield_expr()?;
                    // delegation does not produce a value to bind
                    if matches!(expr, Expr::YieldFrom(_)) {
                        return Err(ParserError::SyntaxError);
                    }
                    expr
                } else {
                    self.parse_expr()?
                };

                Ok(StatementKind::Assignment {
                    target: name,
                    value,
                })
            }
            _ => Ok(StatementKind::Expression(self.parse_expr()?)),
        }
    }

    fn parse_yield_expr(&mut self) -> Result<Expr, ParserError> {
        log(LogLevel::Trace, || "parse_yield_expr".to_string());
        if self.gen_depth == 0 {
            return Err(ParserError::SyntaxError);
        }

        self.consume(&Token::Yield)?;

        if self.current_token() == &Token::From {
            self.consume(&Token::From)?;
            let right = self.parse_expr()?;
            return Ok(Expr::YieldFrom(Box::new(right)));
        }

        if self.end_of_statement() {
            Ok(Expr::Yield(None))
        } else {
            let right = self.parse_expr()?;
            Ok(Expr::Yield(Some(Box::new(right))))
        }
    }

    fn parse_return(&mut self) -> Result<StatementKind, ParserError> {
        log(LogLevel::Trace, || "parse_return".to_string());
        if self.gen_depth == 0 {
            return Err(ParserError::SyntaxError);
        }

        self.consume(&Token::Return)?;

        if self.end_of_statement() {
            Ok(StatementKind::Return(None))
        } else {
            Ok(StatementKind::Return(Some(self.parse_expr()?)))
        }
    }

    fn parse_gen_def(&mut self) -> Result<StatementKind, ParserError> {
        log(LogLevel::Trace, || "parse_gen_def".to_string());
        // nested definitions are not supported
        if self.gen_depth > 0 {
            return Err(ParserError::SyntaxError);
        }

        self.consume(&Token::Gen)?;
        let name = self.parse_identifier()?;
        self.consume(&Token::LParen)?;

        let mut params = vec![];
        while self.current_token() != &Token::RParen {
            params.push(self.parse_identifier()?);
            if self.current_token() == &Token::Comma {
                self.consume(&Token::Comma)?;
            } else {
                break;
            }
        }

        self.consume(&Token::RParen)?;

        self.gen_depth += 1;
        let body = self.parse_block();
        self.gen_depth -= 1;

        Ok(StatementKind::GenDef {
            name,
            params,
            body: body?,
        })
    }

    fn parse_while_loop(&mut self) -> Result<StatementKind, ParserError> {
        log(LogLevel::Trace, || "parse_while_loop".to_string());
        self.consume(&Token::While)?;
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;

        Ok(StatementKind::WhileLoop { condition, body })
    }

    fn parse_if_else(&mut self) -> Result<StatementKind, ParserError> {
        log(LogLevel::Trace, || "parse_if_else".to_string());
        self.consume(&Token::If)?;
        let if_part = ConditionalAst {
            condition: self.parse_expr()?,
            block: self.parse_block()?,
        };

        let mut elif_parts = vec![];
        while self.current_token() == &Token::Elif {
            self.consume(&Token::Elif)?;
            elif_parts.push(ConditionalAst {
                condition: self.parse_expr()?,
                block: self.parse_block()?,
            });
        }

        let else_part = if self.current_token() == &Token::Else {
            self.consume(&Token::Else)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(StatementKind::IfElse {
            if_part,
            elif_parts,
            else_part,
        })
    }

    fn parse_for_in_loop(&mut self) -> Result<StatementKind, ParserError> {
        log(LogLevel::Trace, || "parse_for_in_loop".to_string());
        self.consume(&Token::For)?;
        let index = self.parse_identifier()?;
        self.consume(&Token::In)?;
        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;

        Ok(StatementKind::ForInLoop {
            index,
            iterable,
            body,
        })
    }

    fn parse_block(&mut self) -> Result<Ast, ParserError> {
        self.consume(&Token::Colon)?;
        self.consume(&Token::Newline)?;
        self.consume_optional_many(&Token::Newline);
        self.consume(&Token::Indent)?;

        let mut statements = vec![];
        loop {
            self.consume_optional_many(&Token::Newline);
            if self.current_token() == &Token::Dedent || self.is_finished() {
                break;
            }
            statements.push(self.parse_statement()?);
        }

        self.consume(&Token::Dedent)?;

        Ok(Ast::new(statements))
    }

    fn parse_identifier(&mut self) -> Result<String, ParserError> {
        match self.current_token().clone() {
            Token::Identifier(name) => {
                self.consume(&Token::Identifier(name.clone()))?;
                Ok(name)
            }
            token => Err(ParserError::UnexpectedToken(token)),
        }
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        log(LogLevel::Trace, || "parse_expr".to_string());
        self.parse_comparison()
    }

    /// A single (non-chaining) comparison binds more loosely than any arithmetic.
    fn parse_comparison(&mut self) -> Result<Expr, ParserError> {
        log(LogLevel::Trace, || "parse_comparison".to_string());
        let left = self.parse_add_sub()?;

        if let Ok(op) = CompareOp::try_from(self.current_token()) {
            self.consume_current()?;
            let right = self.parse_add_sub()?;
            return Ok(Expr::CompareOperation {
                left: Box::new(left),
                op,
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_add_sub(&mut self) -> Result<Expr, ParserError> {
        log(LogLevel::Trace, || "parse_add_sub".to_string());
        let mut left = self.parse_term()?;

        while matches!(self.current_token(), Token::Plus | Token::Minus) {
            let op = BinOp::try_from(self.current_token()).unwrap_or_else(|_| unreachable!());
            self.consume_current()?;
            let right = self.parse_term()?;
            left = Expr::BinaryOperation {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParserError> {
        log(LogLevel::Trace, || "parse_term".to_string());
        let mut left = self.parse_unary()?;

        while matches!(self.current_token(), Token::Asterisk | Token::Slash) {
            let op = BinOp::try_from(self.current_token()).unwrap_or_else(|_| unreachable!());
            self.consume_current()?;
            let right = self.parse_unary()?;
            left = Expr::BinaryOperation {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParserError> {
        match self.current_token() {
            Token::Minus => {
                self.consume(&Token::Minus)?;
                Ok(Expr::UnaryOperation {
                    op: UnaryOp::Minus,
                    right: Box::new(self.parse_unary()?),
                })
            }
            Token::Not => {
                self.consume(&Token::Not)?;
                Ok(Expr::UnaryOperation {
                    op: UnaryOp::Not,
                    right: Box::new(self.parse_unary()?),
                })
            }
            _ => self.parse_factor(),
        }
    }

    fn parse_factor(&mut self) -> Result<Expr, ParserError> {
        log(LogLevel::Trace, || "parse_factor".to_string());
        match self.current_token().clone() {
            Token::LParen => {
                self.consume(&Token::LParen)?;
                let expr = self.parse_expr()?;
                self.consume(&Token::RParen)?;
                Ok(expr)
            }
            Token::Integer(value) => {
                self.consume(&Token::Integer(value))?;
                let value = i64::try_from(value).map_err(|_| ParserError::SyntaxError)?;
                Ok(Expr::Integer(value))
            }
            Token::StringLiteral(literal) => {
                self.consume(&Token::StringLiteral(literal.clone()))?;
                Ok(Expr::StringLiteral(literal))
            }
            Token::BooleanLiteral(value) => {
                self.consume(&Token::BooleanLiteral(value))?;
                Ok(Expr::Boolean(value))
            }
            Token::None => {
                self.consume(&Token::None)?;
                Ok(Expr::None)
            }
            Token::Identifier(name) => {
                self.consume(&Token::Identifier(name.clone()))?;
                if self.current_token() == &Token::LParen {
                    let args = self.parse_call_args()?;
                    Ok(Expr::FunctionCall { name, args })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            token => Err(ParserError::UnexpectedToken(token)),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParserError> {
        self.consume(&Token::LParen)?;

        let mut args = vec![];
        while self.current_token() != &Token::RParen {
            args.push(self.parse_expr()?);
            if self.current_token() == &Token::Comma {
                self.consume(&Token::Comma)?;
            } else {
                break;
            }
        }

        self.consume(&Token::RParen)?;

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Source;

    fn parse_one(text: &str) -> StatementKind {
        let mut lexer = Lexer::new(&Source::from_text(text));
        let mut parser = Parser::new(&mut lexer);
        parser.consume_newlines();
        parser.parse_statement().expect("Failed to parse!").kind
    }

    fn parse_expect_error(text: &str) -> ParserError {
        let mut lexer = Lexer::new(&Source::from_text(text));
        let mut parser = Parser::new(&mut lexer);
        let mut result = Ok(Ast::default());
        loop {
            parser.consume_newlines();
            if parser.is_finished() {
                break;
            }
            if let Err(e) = parser.parse_statement() {
                result = Err(e);
                break;
            }
        }
        result.expect_err("Expected a parser error!")
    }

    #[test]
    fn parses_an_assignment() {
        let kind = parse_one("a = 4 + 5");

        assert_eq!(
            kind,
            StatementKind::Assignment {
                target: "a".into(),
                value: Expr::BinaryOperation {
                    left: Box::new(Expr::Integer(4)),
                    op: BinOp::Add,
                    right: Box::new(Expr::Integer(5)),
                },
            }
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let kind = parse_one("a = 1 + 2 * 3");

        assert_eq!(
            kind,
            StatementKind::Assignment {
                target: "a".into(),
                value: Expr::BinaryOperation {
                    left: Box::new(Expr::Integer(1)),
                    op: BinOp::Add,
                    right: Box::new(Expr::BinaryOperation {
                        left: Box::new(Expr::Integer(2)),
                        op: BinOp::Mul,
                        right: Box::new(Expr::Integer(3)),
                    }),
                },
            }
        );
    }

    #[test]
    fn parses_a_generator_definition() {
        let kind = parse_one("gen pair():\n    yield 1\n    yield 2\n");

        let StatementKind::GenDef { name, params, body } = kind else {
            panic!("Expected a generator definition!");
        };
        assert_eq!(name, "pair");
        assert!(params.is_empty());
        assert_eq!(body.len(), 2);
        assert_eq!(
            body.get(0).map(|s| &s.kind),
            Some(&StatementKind::Expression(Expr::Yield(Some(Box::new(
                Expr::Integer(1)
            )))))
        );
    }

    #[test]
    fn parses_delegation() {
        let kind = parse_one("gen outer():\n    yield from inner()\n");

        let StatementKind::GenDef { body, .. } = kind else {
            panic!("Expected a generator definition!");
        };
        assert_eq!(
            body.get(0).map(|s| &s.kind),
            Some(&StatementKind::Expression(Expr::YieldFrom(Box::new(
                Expr::FunctionCall {
                    name: "inner".into(),
                    args: vec![],
                }
            ))))
        );
    }

    #[test]
    fn parses_a_resume_binding() {
        let kind = parse_one("gen pauser():\n    name = yield 'Hello'\n    return name\n");

        let StatementKind::GenDef { body, .. } = kind else {
            panic!("Expected a generator definition!");
        };
        assert_eq!(
            body.get(0).map(|s| &s.kind),
            Some(&StatementKind::Assignment {
                target: "name".into(),
                value: Expr::Yield(Some(Box::new(Expr::StringLiteral("Hello".into())))),
            })
        );
        assert_eq!(
            body.get(1).map(|s| &s.kind),
            Some(&StatementKind::Return(Some(Expr::Variable("name".into()))))
        );
    }

    #[test]
    fn rejects_yield_outside_a_generator() {
        assert_eq!(parse_expect_error("yield 1"), ParserError::SyntaxError);
    }

    #[test]
    fn rejects_return_outside_a_generator() {
        assert_eq!(parse_expect_error("return 1"), ParserError::SyntaxError);
    }

    #[test]
    fn rejects_nested_generator_definitions() {
        assert_eq!(
            parse_expect_error("gen outer():\n    gen inner():\n        yield 1\n"),
            ParserError::SyntaxError
        );
    }

    #[test]
    fn rejects_binding_a_delegation() {
        assert_eq!(
            parse_expect_error("gen outer():\n    x = yield from inner()\n"),
            ParserError::SyntaxError
        );
    }

    #[test]
    fn gen_body_mode_allows_a_bare_yield() {
        let mut lexer = Lexer::new(&Source::from_text("yield a * 2"));
        let mut parser = Parser::gen_body(&mut lexer);
        let ast = parser.parse_all().expect("Failed to parse!");

        assert_eq!(
            ast.get(0).map(|s| &s.kind),
            Some(&StatementKind::Expression(Expr::Yield(Some(Box::new(
                Expr::BinaryOperation {
                    left: Box::new(Expr::Variable("a".into())),
                    op: BinOp::Mul,
                    right: Box::new(Expr::Integer(2)),
                }
            )))))
        );
    }
}
