use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::errors::Diagnostics;
use crate::object::Object;
use crate::token::Token;
use crate::token_type::TokenKind;

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = HashMap::from([
        ("and", TokenKind::And),
        ("break", TokenKind::Break),
        ("class", TokenKind::Class),
        ("else", TokenKind::Else),
        ("false", TokenKind::False),
        ("for", TokenKind::For),
        ("fun", TokenKind::Fun),
        ("if", TokenKind::If),
        ("nil", TokenKind::Nil),
        ("or", TokenKind::Or),
        ("print", TokenKind::Print),
        ("return", TokenKind::Return),
        ("super", TokenKind::Super),
        ("this", TokenKind::This),
        ("true", TokenKind::True),
        ("var", TokenKind::Var),
        ("while", TokenKind::While),
    ]);
}

/// Source text → token stream, in a single forward pass with a
/// two-character lookahead.
pub struct Scanner<'a> {
    source: Vec<char>,
    diagnostics: &'a Diagnostics,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &str, diagnostics: &'a Diagnostics) -> Self {
        Scanner {
            source: source.chars().collect(),
            diagnostics,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::eof(self.line));
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '%' => self.add_token(TokenKind::Percent),
            '?' => self.add_token(TokenKind::Question),
            ':' => self.add_token(TokenKind::Colon),

            '-' => {
                if self.matches('-') {
                    self.add_token(TokenKind::MinusMinus);
                } else {
                    self.add_token(TokenKind::Minus);
                }
            }
            '+' => {
                if self.matches('+') {
                    self.add_token(TokenKind::PlusPlus);
                } else {
                    self.add_token(TokenKind::Plus);
                }
            }
            '!' => {
                let kind = if self.matches('=') { TokenKind::BangEqual } else { TokenKind::Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') { TokenKind::EqualEqual } else { TokenKind::Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') { TokenKind::LessEqual } else { TokenKind::Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') { TokenKind::GreaterEqual } else { TokenKind::Greater };
                self.add_token(kind);
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.matches('*') {
                    self.scan_block_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '"' => self.scan_string(),

            _ => {
                if c.is_ascii_digit() {
                    self.scan_number();
                } else if is_identifier_start(c) {
                    self.scan_identifier();
                } else {
                    self.diagnostics.error(self.line, &format!("Unexpected character '{}'.", c));
                }
            }
        }
    }

    fn scan_block_comment(&mut self) {
        while !self.is_at_end() && !(self.peek() == '*' && self.peek_next() == '/') {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.diagnostics.error(self.line, "Unterminated multiline comment.");
            return;
        }

        // Consume the trailing '*/'.
        self.advance();
        self.advance();
    }

    fn scan_string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.diagnostics.error(self.line, "Unterminated string.");
            return;
        }

        // The closing '"'.
        self.advance();

        let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token_with_literal(TokenKind::String, Some(Object::String(value)));
    }

    fn scan_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A trailing '.' with no following digit is left unconsumed so
        // `123.22.` scans as `Number(123.22)` then `Dot`.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let value: f64 = text.parse().expect("scanned number lexeme must parse as f64");
        self.add_token_with_literal(TokenKind::Number, Some(Object::Number(value)));
    }

    fn scan_identifier(&mut self) {
        while is_identifier_continue(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = KEYWORDS.get(text.as_str()).copied().unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_with_literal(kind, None);
    }

    fn add_token_with_literal(&mut self, kind: TokenKind, literal: Option<Object>) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        let diagnostics = Diagnostics::new();
        Scanner::new(source, &diagnostics).scan_tokens()
    }

    #[test]
    fn trailing_dot_without_digit_stays_separate() {
        let tokens = scan("123.22.");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Dot, TokenKind::Eof]);
        assert_eq!(tokens[0].literal, Some(Object::Number(123.22)));
    }

    #[test]
    fn line_comment_then_string_on_next_line() {
        let tokens = scan("\"hi\" // c\n(\"w\")");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::String,
                TokenKind::LeftParen,
                TokenKind::String,
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn unterminated_string_reports_and_continues() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new("\"oops", &diagnostics).scan_tokens();
        assert!(diagnostics.had_error());
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn keywords_are_recognised() {
        let tokens = scan("and break class else false for fun if nil or print return super this true var while");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::And,
                TokenKind::Break,
                TokenKind::Class,
                TokenKind::Else,
                TokenKind::False,
                TokenKind::For,
                TokenKind::Fun,
                TokenKind::If,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::Print,
                TokenKind::Return,
                TokenKind::Super,
                TokenKind::This,
                TokenKind::True,
                TokenKind::Var,
                TokenKind::While,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unknown_character_is_skipped_not_fatal() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new("1 @ 2", &diagnostics).scan_tokens();
        assert!(diagnostics.had_error());
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
    }
}
