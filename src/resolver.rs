use std::collections::HashMap;

use crate::errors::{Diagnostics, LoxError};
use crate::expr::{Expr, ExprVisitor, NodeId};
use crate::object::Object;
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    Function,
    Method,
    Initializer,
}

/// Static pass between parsing and interpretation: for every `Variable`,
/// `Assign` and `This` node, records how many enclosing scopes separate
/// its use site from its binding site. Never evaluates anything; a scope
/// here is just `name -> defined?`, not a map of values.
pub struct Resolver<'a> {
    diagnostics: &'a Diagnostics,
    scopes: Vec<HashMap<String, bool>>,
    function_kinds: Vec<FunctionKind>,
    in_class: bool,
    locals: HashMap<NodeId, usize>,
}

impl<'a> Resolver<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Resolver {
            diagnostics,
            scopes: Vec::new(),
            function_kinds: Vec::new(),
            in_class: false,
            locals: HashMap::new(),
        }
    }

    /// Resolves a whole program and hands back the depth side-table for
    /// the interpreter to adopt.
    pub fn resolve(mut self, statements: &[Stmt]) -> HashMap<NodeId, usize> {
        self.resolve_stmts(statements);
        self.locals
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            let _ = stmt.accept(self);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        let _ = stmt.accept(self);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        let _ = expr.accept(self);
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.diagnostics
                    .error_at(name, "Already a variable with this name in this scope.");
            }
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn resolve_local(&mut self, id: NodeId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, depth);
                return;
            }
        }
        // Not found in any scope: treated as global, no entry.
    }

    fn resolve_function(&mut self, params: &[Token], body: &[Stmt], kind: FunctionKind) {
        self.function_kinds.push(kind);
        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(body);
        self.end_scope();
        self.function_kinds.pop();
    }
}

impl<'a> StmtVisitor<()> for Resolver<'a> {
    fn visit_expression_stmt(&mut self, expression: &Expr) -> Result<(), LoxError> {
        self.resolve_expr(expression);
        Ok(())
    }

    fn visit_print_stmt(&mut self, expression: &Expr) -> Result<(), LoxError> {
        self.resolve_expr(expression);
        Ok(())
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> Result<(), LoxError> {
        self.declare(name);
        if let Some(initializer) = initializer {
            self.resolve_expr(initializer);
        }
        self.define(name);
        Ok(())
    }

    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> Result<(), LoxError> {
        self.begin_scope();
        self.resolve_stmts(statements);
        self.end_scope();
        Ok(())
    }

    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), LoxError> {
        self.resolve_expr(condition);
        self.resolve_stmt(then_branch);
        if let Some(else_branch) = else_branch {
            self.resolve_stmt(else_branch);
        }
        Ok(())
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) -> Result<(), LoxError> {
        self.resolve_expr(condition);
        self.resolve_stmt(body);
        Ok(())
    }

    fn visit_break_stmt(&mut self, _keyword: &Token) -> Result<(), LoxError> {
        Ok(())
    }

    fn visit_function_stmt(&mut self, name: &Token, params: &[Token], body: &[Stmt]) -> Result<(), LoxError> {
        self.declare(name);
        self.define(name);
        self.resolve_function(params, body, FunctionKind::Function);
        Ok(())
    }

    fn visit_return_stmt(&mut self, keyword: &Token, value: Option<&Expr>) -> Result<(), LoxError> {
        if self.function_kinds.is_empty() {
            self.diagnostics.error_at(keyword, "Can't return from top-level code.");
        }
        if let Some(value) = value {
            if self.function_kinds.last() == Some(&FunctionKind::Initializer) {
                self.diagnostics
                    .error_at(keyword, "Can't return a value from an initializer.");
            }
            self.resolve_expr(value);
        }
        Ok(())
    }

    fn visit_class_stmt(&mut self, name: &Token, methods: &[Stmt]) -> Result<(), LoxError> {
        let enclosing_class = self.in_class;
        self.in_class = true;

        self.declare(name);
        self.define(name);

        self.begin_scope();
        self.scopes.last_mut().unwrap().insert("this".to_string(), true);

        for method in methods {
            if let Stmt::Function { name: method_name, params, body } = method {
                let kind = if method_name.lexeme == "init" {
                    FunctionKind::Initializer
                } else {
                    FunctionKind::Method
                };
                self.resolve_function(params, body, kind);
            }
        }

        self.end_scope();
        self.in_class = enclosing_class;
        Ok(())
    }
}

impl<'a> ExprVisitor<()> for Resolver<'a> {
    fn visit_literal_expr(&mut self, _value: &Object) -> Result<(), LoxError> {
        Ok(())
    }

    fn visit_grouping_expr(&mut self, expression: &Expr) -> Result<(), LoxError> {
        self.resolve_expr(expression);
        Ok(())
    }

    fn visit_unary_expr(&mut self, _operator: &Token, right: &Expr) -> Result<(), LoxError> {
        self.resolve_expr(right);
        Ok(())
    }

    fn visit_binary_expr(&mut self, left: &Expr, _operator: &Token, right: &Expr) -> Result<(), LoxError> {
        self.resolve_expr(left);
        self.resolve_expr(right);
        Ok(())
    }

    fn visit_logical_expr(&mut self, left: &Expr, _operator: &Token, right: &Expr) -> Result<(), LoxError> {
        self.resolve_expr(left);
        self.resolve_expr(right);
        Ok(())
    }

    fn visit_ternary_expr(
        &mut self,
        condition: &Expr,
        _question: &Token,
        then_branch: &Expr,
        else_branch: &Expr,
    ) -> Result<(), LoxError> {
        self.resolve_expr(condition);
        self.resolve_expr(then_branch);
        self.resolve_expr(else_branch);
        Ok(())
    }

    fn visit_variable_expr(&mut self, id: NodeId, name: &Token) -> Result<(), LoxError> {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&name.lexeme) == Some(&false) {
                self.diagnostics
                    .error_at(name, "Can't read local variable in its own initializer.");
            }
        }
        self.resolve_local(id, name);
        Ok(())
    }

    fn visit_assign_expr(&mut self, id: NodeId, name: &Token, value: &Expr) -> Result<(), LoxError> {
        self.resolve_expr(value);
        self.resolve_local(id, name);
        Ok(())
    }

    fn visit_call_expr(&mut self, callee: &Expr, _paren: &Token, arguments: &[Expr]) -> Result<(), LoxError> {
        self.resolve_expr(callee);
        for argument in arguments {
            self.resolve_expr(argument);
        }
        Ok(())
    }

    fn visit_get_expr(&mut self, object: &Expr, _name: &Token) -> Result<(), LoxError> {
        self.resolve_expr(object);
        Ok(())
    }

    fn visit_set_expr(&mut self, object: &Expr, _name: &Token, value: &Expr) -> Result<(), LoxError> {
        self.resolve_expr(value);
        self.resolve_expr(object);
        Ok(())
    }

    fn visit_this_expr(&mut self, id: NodeId, keyword: &Token) -> Result<(), LoxError> {
        if !self.in_class {
            self.diagnostics
                .error_at(keyword, "Can't use 'this' outside of a class.");
            return Ok(());
        }
        self.resolve_local(id, keyword);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve(source: &str) -> (HashMap<NodeId, usize>, bool) {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source, &diagnostics).scan_tokens();
        let statements = Parser::new(tokens, &diagnostics).parse();
        let locals = Resolver::new(&diagnostics).resolve(&statements);
        (locals, diagnostics.had_error())
    }

    #[test]
    fn self_referential_local_initializer_is_an_error() {
        let (_, had_error) = resolve("{ var a = a; }");
        assert!(had_error);
    }

    #[test]
    fn global_self_reference_is_not_caught_here() {
        let (_, had_error) = resolve("var a = a;");
        assert!(!had_error);
    }

    #[test]
    fn shadowed_closure_variable_resolves_to_declaring_scope() {
        let (locals, had_error) = resolve(
            "fun make() { var i = 0; fun inc() { i = i + 1; return i; } return inc; } var c = make();",
        );
        assert!(!had_error);
        // The assignment `i = i + 1` and the read of `i` inside `inc`
        // both resolve one scope out (inc's body) to `make`'s body.
        assert!(locals.values().any(|&depth| depth == 1));
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let (_, had_error) = resolve("return 1;");
        assert!(had_error);
    }

    #[test]
    fn returning_a_value_from_init_is_an_error() {
        let (_, had_error) = resolve("class C { init() { return 1; } }");
        assert!(had_error);
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let (_, had_error) = resolve("fun f() { print this; }");
        assert!(had_error);
    }

    #[test]
    fn duplicate_local_declaration_is_an_error() {
        let (_, had_error) = resolve("{ var a = 1; var a = 2; }");
        assert!(had_error);
    }

    #[test]
    fn duplicate_global_declaration_is_permitted() {
        let (_, had_error) = resolve("var a = 1; var a = 2;");
        assert!(!had_error);
    }
}
