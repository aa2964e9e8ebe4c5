use std::cell::Cell;
use std::fmt;

use crate::object::Object;
use crate::token::Token;
use crate::token_type::TokenKind;

/// Shared error sink for the scanner, parser and resolver. Every stage
/// reports through the same `[line N] Error<where>: <message>` format and
/// flips the same `had_error` flag; none of them ever panics or aborts
/// early, matching the "scanning/parsing continues after every error"
/// contract in the spec.
#[derive(Default)]
pub struct Diagnostics {
    had_error: Cell<bool>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics {
            had_error: Cell::new(false),
        }
    }

    pub fn error(&self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    pub fn error_at(&self, token: &Token, message: &str) {
        if token.kind == TokenKind::Eof {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    fn report(&self, line: usize, location: &str, message: &str) {
        eprintln!("[line {}] Error{}: {}", line, location, message);
        self.had_error.set(true);
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }
}

/// Runtime faults and the two non-local control transfers used for
/// `return` and `break`. All three propagate through the same `Result`
/// chain as ordinary evaluation errors; `Return`/`Break` are caught at
/// their designated frames (`LoxFunction::call`, `While`) and never reach
/// the top-level `interpret` call.
#[derive(Debug, Clone)]
pub enum LoxError {
    Runtime { token: Token, message: String },
    Return(Object),
    Break,
}

impl LoxError {
    pub fn runtime(token: &Token, message: impl Into<String>) -> Self {
        LoxError::Runtime {
            token: token.clone(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxError::Runtime { token, message } => {
                let location = if token.kind == TokenKind::Eof {
                    " at end".to_string()
                } else {
                    format!(" at '{}'", token.lexeme)
                };
                write!(f, "[line {}] Error{}: {}", token.line, location, message)
            }
            LoxError::Return(_) => write!(f, "return outside of a function call frame"),
            LoxError::Break => write!(f, "break outside of a loop frame"),
        }
    }
}
