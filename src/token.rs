use std::fmt;

use crate::object::Object;
use crate::token_type::TokenKind;

/// A single lexical token. Tokens are value-like: once produced by the
/// scanner they are never mutated, only cloned into AST nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Object>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, literal: Option<Object>, line: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, "", None, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{kind: {}, lexeme: {:?}, literal: {}, line: {}}}",
            self.kind,
            self.lexeme,
            match &self.literal {
                Some(obj) => obj.to_string(),
                None => "None".to_string(),
            },
            self.line
        )
    }
}
