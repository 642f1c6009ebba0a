use std::{collections::VecDeque, str::Chars};

use crate::{domain::Source, errors::LexerError};

use super::Token;

type LexerResult<T> = Result<T, LexerError>;

#[derive(Default)]
pub struct Lexer {
    // Tokens we have produced but which have yet to be consumed
    pending_tokens: VecDeque<Token>,

    // Each input chunk, added incrementally
    source_lines: VecDeque<String>,
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // 1. Return any pending token if available
            if let Some(token) = self.pending_tokens.pop_front() {
                return Some(token);
            }

            // 2. If there’s no more source to lex, stop
            if self.source_lines.is_empty() {
                return None;
            }

            // 3. Process the next chunk into tokens
            let line = self.source_lines.pop_front()?;
            match self.tokenize(&line) {
                Ok(()) => continue,
                Err(err) => self.handle_tokenize_error(err),
            }
        }
    }
}

impl Lexer {
    pub fn new(source: &Source) -> Lexer {
        let mut lexer = Lexer::default();

        // empty Source can occur in REPL mode
        if source.has_text() {
            lexer
                .add_line(source.text())
                .expect("Failed to add line to lexer");
        }

        lexer
    }

    pub fn add_line(&mut self, line: &str) -> LexerResult<()> {
        self.source_lines.push_back(line.to_string());
        Ok(())
    }

    /// Unexpected characters become a token so the parser can produce an ordinary error for
    /// them; everything else is unrecoverable lexer state.
    fn handle_tokenize_error(&mut self, err: LexerError) {
        match err {
            LexerError::UnexpectedCharacter(c) => {
                self.pending_tokens.push_back(Token::InvalidCharacter(c));
            }
            _ => panic!("{}", err),
        }
    }

    /// Tokenize a chunk of one or more lines. Each element of the indentation stack indicates the
    /// number of spaces at the beginning of the column for this indentation block. A particular
    /// number of spaces is not enforced, only that for a given indentation, you are consistent
    /// with the number of spaces.
    fn tokenize(&mut self, input: &str) -> LexerResult<()> {
        let mut indentation_stack = vec![0];

        for line in input.lines() {
            if line.trim().is_empty() {
                self.pending_tokens.push_back(Token::Newline);
                continue;
            }

            let num_spaces = count_leading_spaces(line);
            let current = indentation_stack
                .last()
                .copied()
                .ok_or_else(|| internal_error("Invalid indentation stack state"))?;

            if num_spaces > current {
                indentation_stack.push(num_spaces);
                self.pending_tokens.push_back(Token::Indent);
            } else {
                while num_spaces
                    < indentation_stack
                        .last()
                        .copied()
                        .ok_or_else(|| internal_error("Invalid indentation stack state"))?
                {
                    indentation_stack.pop();
                    self.pending_tokens.push_back(Token::Dedent);
                }
            }

            self.tokenize_line(line.trim_start())?;
            self.pending_tokens.push_back(Token::Newline);
        }

        while indentation_stack.len() > 1 {
            indentation_stack.pop();
            self.pending_tokens.push_back(Token::Dedent);
        }

        Ok(())
    }

    fn tokenize_line(&mut self, line: &str) -> LexerResult<()> {
        let mut chars = line.chars().peekable();

        while let Some(&c) = chars.peek() {
            match c {
                ' ' | '\t' => {
                    chars.next();
                }
                // the rest of the line is a comment
                '#' => break,
                '0'..='9' => {
                    let literal = consume_while(&mut chars, |c| c.is_ascii_digit());
                    let value = literal
                        .parse::<u64>()
                        .map_err(|_| internal_error("Invalid integer literal"))?;
                    self.pending_tokens.push_back(Token::Integer(value));
                }
                _ if c.is_ascii_alphabetic() || c == '_' => {
                    let word =
                        consume_while(&mut chars, |c| c.is_ascii_alphanumeric() || c == '_');
                    self.pending_tokens.push_back(keyword_or_identifier(word));
                }
                '"' | '\'' => {
                    chars.next();
                    let literal = consume_while(&mut chars, |next| next != c);
                    // the closing quote must still be present
                    if chars.next() != Some(c) {
                        return Err(LexerError::UnexpectedCharacter(c));
                    }
                    self.pending_tokens.push_back(Token::StringLiteral(literal));
                }
                '+' => self.consume_single(&mut chars, Token::Plus),
                '-' => self.consume_single(&mut chars, Token::Minus),
                '*' => self.consume_single(&mut chars, Token::Asterisk),
                '/' => self.consume_single(&mut chars, Token::Slash),
                '(' => self.consume_single(&mut chars, Token::LParen),
                ')' => self.consume_single(&mut chars, Token::RParen),
                ',' => self.consume_single(&mut chars, Token::Comma),
                ':' => self.consume_single(&mut chars, Token::Colon),
                '=' => {
                    chars.next();
                    if chars.peek() == Some(&'=') {
                        chars.next();
                        self.pending_tokens.push_back(Token::Equal);
                    } else {
                        self.pending_tokens.push_back(Token::Assign);
                    }
                }
                '!' => {
                    chars.next();
                    if chars.peek() == Some(&'=') {
                        chars.next();
                        self.pending_tokens.push_back(Token::NotEqual);
                    } else {
                        return Err(LexerError::UnexpectedCharacter('!'));
                    }
                }
                '<' => {
                    chars.next();
                    if chars.peek() == Some(&'=') {
                        chars.next();
                        self.pending_tokens.push_back(Token::LessThanOrEqual);
                    } else {
                        self.pending_tokens.push_back(Token::LessThan);
                    }
                }
                '>' => {
                    chars.next();
                    if chars.peek() == Some(&'=') {
                        chars.next();
                        self.pending_tokens.push_back(Token::GreaterThanOrEqual);
                    } else {
                        self.pending_tokens.push_back(Token::GreaterThan);
                    }
                }
                _ => return Err(LexerError::UnexpectedCharacter(c)),
            }
        }

        Ok(())
    }

    fn consume_single(&mut self, chars: &mut std::iter::Peekable<Chars>, token: Token) {
        chars.next();
        self.pending_tokens.push_back(token);
    }
}

fn keyword_or_identifier(word: String) -> Token {
    match word.as_str() {
        "gen" => Token::Gen,
        "yield" => Token::Yield,
        "from" => Token::From,
        "return" => Token::Return,
        "while" => Token::While,
        "if" => Token::If,
        "elif" => Token::Elif,
        "else" => Token::Else,
        "for" => Token::For,
        "in" => Token::In,
        "not" => Token::Not,
        "true" => Token::BooleanLiteral(true),
        "false" => Token::BooleanLiteral(false),
        "none" => Token::None,
        _ => Token::Identifier(word),
    }
}

fn consume_while<F>(chars: &mut std::iter::Peekable<Chars>, condition: F) -> String
where
    F: Fn(char) -> bool,
{
    let mut literal = String::new();
    while let Some(&c) = chars.peek() {
        if !condition(c) {
            break;
        }
        literal.push(c);
        chars.next();
    }
    literal
}

fn count_leading_spaces(line: &str) -> usize {
    line.chars().take_while(|&c| c == ' ').count()
}

fn internal_error(msg: &str) -> LexerError {
    LexerError::InternalError(msg.to_string())
}
