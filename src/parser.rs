use crate::errors::Diagnostics;
use crate::expr::{Expr, NodeId};
use crate::object::Object;
use crate::stmt::Stmt;
use crate::token::Token;
use crate::token_type::TokenKind;

/// Marker for "a production failed and reported itself"; propagated with
/// `?` up to `declaration()`, which is the only place that catches it and
/// calls `synchronize()`.
struct ParseError;

/// Tokens → statement list, via recursive descent with Pratt-style
/// precedence climbing and the grammar's error-recovery productions.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: &'a Diagnostics,
    loop_depth: usize,
    next_id: NodeId,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, diagnostics: &'a Diagnostics) -> Self {
        Parser {
            tokens,
            current: 0,
            diagnostics,
            loop_depth: 0,
            next_id: 0,
        }
    }

    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    // ---- declarations ----

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(&[TokenKind::Fun]) {
            self.function("function")
        } else if self.matches(&[TokenKind::Var]) {
            self.var_declaration()
        } else if self.matches(&[TokenKind::Class]) {
            self.class_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expect class name.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after class body.")?;
        Ok(Stmt::Class { name, methods })
    }

    fn function(&mut self, kind: &str) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, &format!("Expect {} name.", kind))?;
        self.consume(TokenKind::LeftParen, &format!("Expect '(' after {} name.", kind))?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= 255 {
                    let next = self.peek().clone();
                    self.diagnostics
                        .error_at(&next, "Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;

        self.consume(TokenKind::LeftBrace, &format!("Expect '{{' before {} body.", kind))?;
        let body = self.block()?;
        Ok(Stmt::Function { name, params, body })
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    // ---- statements ----

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.matches(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block {
                statements: self.block()?,
            });
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenKind::Break]) {
            return self.break_statement();
        }
        self.expression_statement()
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;

        self.loop_depth += 1;
        let body_result = self.statement();
        self.loop_depth -= 1;

        Ok(Stmt::While {
            condition,
            body: Box::new(body_result?),
        })
    }

    /// Desugars to `{ init; while (cond|true) { body; incr; } }`.
    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        self.loop_depth += 1;
        let body_result = self.statement();
        self.loop_depth -= 1;
        let mut body = body_result?;

        if let Some(increment) = increment {
            body = Stmt::Block {
                statements: vec![body, Stmt::Expression { expression: increment }],
            };
        }

        let condition = condition.unwrap_or(Expr::Literal { value: Object::Bool(true) });
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block {
                statements: vec![initializer, body],
            };
        }

        Ok(body)
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn break_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        if self.loop_depth == 0 {
            self.diagnostics
                .error_at(&keyword, "Can't use 'break' outside of a loop.");
        }
        self.consume(TokenKind::Semicolon, "Expect ';' after 'break'.")?;
        Ok(Stmt::Break { keyword })
    }

    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let expression = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print { expression })
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expression = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expression })
    }

    // ---- expressions, low to high precedence ----

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        // IDENT ('++'|'--') desugars to Assign(name, Unary(op, Variable(name))).
        if self.check(TokenKind::Identifier)
            && matches!(
                self.peek_next_kind(),
                Some(TokenKind::PlusPlus) | Some(TokenKind::MinusMinus)
            )
        {
            let name = self.advance().clone();
            let operator = self.advance().clone();
            let target = Expr::Variable {
                id: self.next_node_id(),
                name: name.clone(),
            };
            let value = Expr::Unary {
                operator,
                right: Box::new(target),
            };
            return Ok(Expr::Assign {
                id: self.next_node_id(),
                name,
                value: Box::new(value),
            });
        }

        let expr = self.comma()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::Assign {
                    id: self.next_node_id(),
                    name,
                    value: Box::new(value),
                }),
                Expr::Get { object, name } => Ok(Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                }),
                other => {
                    self.diagnostics.error_at(&equals, "Invalid assignment target.");
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn comma(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.ternary()?;
        while self.matches(&[TokenKind::Comma]) {
            let operator = self.previous().clone();
            let right = self.ternary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        let expr = self.logic_or()?;
        if self.matches(&[TokenKind::Question]) {
            let question = self.previous().clone();
            let then_branch = self.expression()?;
            self.consume(TokenKind::Colon, "Expect ':' after then-branch of ternary expression.")?;
            let else_branch = self.ternary()?;
            return Ok(Expr::Ternary {
                condition: Box::new(expr),
                question,
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }
        Ok(expr)
    }

    fn logic_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.logic_and()?;
        while self.matches(&[TokenKind::Or]) {
            let operator = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            self.comparison()?;
            self.diagnostics.error_at(&operator, "Missing left-hand operand.");
            return Ok(Expr::Literal { value: Object::Nil });
        }

        let mut expr = self.comparison()?;
        while self.matches(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            self.term()?;
            self.diagnostics.error_at(&operator, "Missing left-hand operand.");
            return Ok(Expr::Literal { value: Object::Nil });
        }

        let mut expr = self.term()?;
        while self.matches(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenKind::Plus]) {
            let operator = self.previous().clone();
            self.factor()?;
            self.diagnostics.error_at(&operator, "Missing left-hand operand.");
            return Ok(Expr::Literal { value: Object::Nil });
        }

        let mut expr = self.factor()?;
        while self.matches(&[TokenKind::Plus, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenKind::Star, TokenKind::Slash]) {
            let operator = self.previous().clone();
            self.unary()?;
            self.diagnostics.error_at(&operator, "Missing left-hand operand.");
            return Ok(Expr::Literal { value: Object::Nil });
        }

        let mut expr = self.unary()?;
        while self.matches(&[TokenKind::Star, TokenKind::Slash, TokenKind::Percent]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenKind::Minus, TokenKind::Bang]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[TokenKind::Dot]) {
                let name = self.consume(TokenKind::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    let next = self.peek().clone();
                    self.diagnostics
                        .error_at(&next, "Can't have more than 255 arguments.");
                }
                // Ternary-precedence, not comma, so commas stay argument separators.
                arguments.push(self.ternary()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenKind::False]) {
            return Ok(Expr::Literal { value: Object::Bool(false) });
        }
        if self.matches(&[TokenKind::True]) {
            return Ok(Expr::Literal { value: Object::Bool(true) });
        }
        if self.matches(&[TokenKind::Nil]) {
            return Ok(Expr::Literal { value: Object::Nil });
        }
        if self.matches(&[TokenKind::Number, TokenKind::String]) {
            let value = self
                .previous()
                .literal
                .clone()
                .expect("scanner attaches a literal to every Number/String token");
            return Ok(Expr::Literal { value });
        }
        if self.matches(&[TokenKind::This]) {
            return Ok(Expr::This {
                id: self.next_node_id(),
                keyword: self.previous().clone(),
            });
        }
        if self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable {
                id: self.next_node_id(),
                name: self.previous().clone(),
            });
        }
        if self.matches(&[TokenKind::LeftParen]) {
            let expression = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping {
                expression: Box::new(expression),
            });
        }

        let peeked = self.peek().clone();
        Err(self.error(peeked, "Expect expression."))
    }

    // ---- token-stream plumbing ----

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            false
        } else {
            self.peek().kind == kind
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.current + 1).map(|t| t.kind)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            let peeked = self.peek().clone();
            Err(self.error(peeked, message))
        }
    }

    fn error(&self, token: Token, message: &str) -> ParseError {
        self.diagnostics.error_at(&token, message);
        ParseError
    }

    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {}
            }

            self.advance();
        }
    }

    fn next_node_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast_printer::AstPrinter;
    use crate::scanner::Scanner;

    fn parse_expr(source: &str) -> String {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source, &diagnostics).scan_tokens();
        let mut parser = Parser::new(tokens, &diagnostics);
        let stmts = parser.parse();
        assert!(!diagnostics.had_error(), "unexpected parse error for {source:?}");
        match &stmts[0] {
            Stmt::Expression { expression } => AstPrinter.print(expression),
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    #[test]
    fn precedence_of_unary_times_group() {
        assert_eq!(parse_expr("-123 * (45.67);"), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn precedence_chain_mixed_operators() {
        assert_eq!(
            parse_expr("1 == 2 > 3 / 4 + 5 % 6;"),
            "(== 1 (> 2 (+ (/ 3 4) (% 5 6))))"
        );
    }

    #[test]
    fn ternary_prints_condition_then_else() {
        assert_eq!(parse_expr("4 > 3 ? 1 : 2;"), "(? (> 4 3) 1 2)");
    }

    #[test]
    fn break_outside_loop_is_reported() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new("break;", &diagnostics).scan_tokens();
        Parser::new(tokens, &diagnostics).parse();
        assert!(diagnostics.had_error());
    }

    #[test]
    fn missing_left_operand_synthesises_nil_and_continues() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new("== 2; print 1;", &diagnostics).scan_tokens();
        let stmts = Parser::new(tokens, &diagnostics).parse();
        assert!(diagnostics.had_error());
        assert_eq!(stmts.len(), 2);
    }
}
