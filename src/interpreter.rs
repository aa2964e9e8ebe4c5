use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::environment::Environment;
use crate::errors::LoxError;
use crate::expr::{Expr, ExprVisitor, NodeId};
use crate::lox_callable::LoxCallable;
use crate::lox_class::LoxClass;
use crate::lox_function::LoxFunction;
use crate::lox_native::NativeFunction;
use crate::native_functions;
use crate::object::Object;
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::Token;
use crate::token_type::TokenKind;

/// Tree-walking evaluator. Holds the global scope, the current scope
/// cursor, and the resolver's node-id → depth side-table.
pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<NodeId, usize>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        globals.borrow_mut().define(
            "clock".to_string(),
            Object::Callable(Rc::new(NativeFunction::new("clock", 0, native_functions::clock))),
        );

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
        }
    }

    /// Adopts the depth side-table the resolver computed for this program.
    pub fn resolve(&mut self, locals: HashMap<NodeId, usize>) {
        self.locals = locals;
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), LoxError> {
        for stmt in statements {
            self.execute(stmt)?;
        }
        Ok(())
    }

    /// Used by the REPL to print the value of a bare expression statement.
    pub fn evaluate_for_repl(&mut self, expr: &Expr) -> Result<Object, LoxError> {
        self.evaluate(expr)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), LoxError> {
        stmt.accept(self)
    }

    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<(), LoxError> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = (|| {
            for stmt in statements {
                self.execute(stmt)?;
            }
            Ok(())
        })();
        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, LoxError> {
        expr.accept(self)
    }

    fn lookup_variable(&mut self, id: NodeId, name: &Token) -> Result<Object, LoxError> {
        match self.locals.get(&id) {
            Some(&depth) => Environment::get_at(&self.environment, depth, name),
            None => Environment::get(&self.globals, name),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

fn is_truthy(value: &Object) -> bool {
    !matches!(value, Object::Nil | Object::Bool(false))
}

fn numeric_binary(
    operator: &Token,
    left: Object,
    right: Object,
    f: impl FnOnce(f64, f64) -> Result<Object, LoxError>,
) -> Result<Object, LoxError> {
    match (left, right) {
        (Object::Number(a), Object::Number(b)) => f(a, b),
        _ => Err(LoxError::runtime(operator, "operands must be numbers.")),
    }
}

impl StmtVisitor<()> for Interpreter {
    fn visit_expression_stmt(&mut self, expression: &Expr) -> Result<(), LoxError> {
        self.evaluate(expression)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, expression: &Expr) -> Result<(), LoxError> {
        let value = self.evaluate(expression)?;
        println!("{value}");
        Ok(())
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> Result<(), LoxError> {
        self.environment.borrow_mut().declare(name.lexeme.clone());
        let value = match initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::Nil,
        };
        self.environment.borrow_mut().define(name.lexeme.clone(), value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> Result<(), LoxError> {
        let block_env = Environment::with_enclosing(&self.environment);
        self.execute_block(statements, block_env)
    }

    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), LoxError> {
        if is_truthy(&self.evaluate(condition)?) {
            self.execute(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) -> Result<(), LoxError> {
        while is_truthy(&self.evaluate(condition)?) {
            match self.execute(body) {
                Ok(()) => {}
                Err(LoxError::Break) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn visit_break_stmt(&mut self, _keyword: &Token) -> Result<(), LoxError> {
        Err(LoxError::Break)
    }

    fn visit_function_stmt(&mut self, name: &Token, params: &[Token], body: &[Stmt]) -> Result<(), LoxError> {
        let function = LoxFunction::new(
            name.clone(),
            Rc::new(params.to_vec()),
            Rc::new(body.to_vec()),
            Rc::clone(&self.environment),
            false,
        );
        self.environment
            .borrow_mut()
            .define(name.lexeme.clone(), Object::Callable(Rc::new(function)));
        Ok(())
    }

    fn visit_return_stmt(&mut self, _keyword: &Token, value: Option<&Expr>) -> Result<(), LoxError> {
        let value = match value {
            Some(value) => self.evaluate(value)?,
            None => Object::Nil,
        };
        Err(LoxError::Return(value))
    }

    fn visit_class_stmt(&mut self, name: &Token, methods: &[Stmt]) -> Result<(), LoxError> {
        self.environment.borrow_mut().define(name.lexeme.clone(), Object::Nil);

        let mut method_map = HashMap::new();
        for method in methods {
            if let Stmt::Function {
                name: method_name,
                params,
                body,
            } = method
            {
                let is_initializer = method_name.lexeme == "init";
                let function = LoxFunction::new(
                    method_name.clone(),
                    Rc::new(params.clone()),
                    Rc::new(body.clone()),
                    Rc::clone(&self.environment),
                    is_initializer,
                );
                method_map.insert(method_name.lexeme.clone(), Rc::new(function));
            }
        }

        let class = LoxClass::new(name.lexeme.clone(), method_map);
        self.environment
            .borrow_mut()
            .define(name.lexeme.clone(), Object::Callable(Rc::new(class)));
        Ok(())
    }
}

impl ExprVisitor<Object> for Interpreter {
    fn visit_literal_expr(&mut self, value: &Object) -> Result<Object, LoxError> {
        Ok(value.clone())
    }

    fn visit_grouping_expr(&mut self, expression: &Expr) -> Result<Object, LoxError> {
        self.evaluate(expression)
    }

    fn visit_unary_expr(&mut self, operator: &Token, right: &Expr) -> Result<Object, LoxError> {
        match operator.kind {
            TokenKind::Minus => match self.evaluate(right)? {
                Object::Number(n) => Ok(Object::Number(-n)),
                _ => Err(LoxError::runtime(operator, "operand must be a number.")),
            },
            TokenKind::Bang => {
                let value = self.evaluate(right)?;
                Ok(Object::Bool(!is_truthy(&value)))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => match self.evaluate(right)? {
                Object::Number(n) => {
                    let delta = if operator.kind == TokenKind::PlusPlus { 1.0 } else { -1.0 };
                    Ok(Object::Number(n + delta))
                }
                _ => Err(LoxError::runtime(operator, "operand must be a number.")),
            },
            _ => unreachable!("the parser never produces a Unary node with this operator"),
        }
    }

    fn visit_binary_expr(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Object, LoxError> {
        if operator.kind == TokenKind::Comma {
            self.evaluate(left)?;
            return self.evaluate(right);
        }

        let left_value = self.evaluate(left)?;
        let right_value = self.evaluate(right)?;

        match operator.kind {
            TokenKind::Plus => match (&left_value, &right_value) {
                (Object::Number(a), Object::Number(b)) => Ok(Object::Number(a + b)),
                (Object::String(a), Object::String(b)) => Ok(Object::String(format!("{a}{b}"))),
                (Object::Number(a), Object::String(b)) => Ok(Object::String(format!("{}{}", Object::Number(*a), b))),
                (Object::String(a), Object::Number(b)) => Ok(Object::String(format!("{}{}", a, Object::Number(*b)))),
                _ => Err(LoxError::runtime(operator, "operands can be numbers or strings.")),
            },
            TokenKind::Minus => numeric_binary(operator, left_value, right_value, |a, b| Ok(Object::Number(a - b))),
            TokenKind::Star => numeric_binary(operator, left_value, right_value, |a, b| Ok(Object::Number(a * b))),
            TokenKind::Slash => numeric_binary(operator, left_value, right_value, |a, b| {
                if b == 0.0 {
                    Err(LoxError::runtime(operator, "division by zero."))
                } else {
                    Ok(Object::Number(a / b))
                }
            }),
            TokenKind::Percent => numeric_binary(operator, left_value, right_value, |a, b| {
                if b == 0.0 {
                    Err(LoxError::runtime(operator, "division by zero."))
                } else {
                    Ok(Object::Number(a % b))
                }
            }),
            TokenKind::Greater => numeric_binary(operator, left_value, right_value, |a, b| Ok(Object::Bool(a > b))),
            TokenKind::GreaterEqual => {
                numeric_binary(operator, left_value, right_value, |a, b| Ok(Object::Bool(a >= b)))
            }
            TokenKind::Less => numeric_binary(operator, left_value, right_value, |a, b| Ok(Object::Bool(a < b))),
            TokenKind::LessEqual => {
                numeric_binary(operator, left_value, right_value, |a, b| Ok(Object::Bool(a <= b)))
            }
            TokenKind::BangEqual => Ok(Object::Bool(left_value != right_value)),
            TokenKind::EqualEqual => Ok(Object::Bool(left_value == right_value)),
            _ => unreachable!("the parser never produces a Binary node with this operator"),
        }
    }

    fn visit_logical_expr(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Object, LoxError> {
        let left_value = self.evaluate(left)?;
        match operator.kind {
            TokenKind::Or => {
                if is_truthy(&left_value) {
                    Ok(left_value)
                } else {
                    self.evaluate(right)
                }
            }
            _ => {
                if !is_truthy(&left_value) {
                    Ok(left_value)
                } else {
                    self.evaluate(right)
                }
            }
        }
    }

    fn visit_ternary_expr(
        &mut self,
        condition: &Expr,
        question: &Token,
        then_branch: &Expr,
        else_branch: &Expr,
    ) -> Result<Object, LoxError> {
        match self.evaluate(condition)? {
            Object::Bool(true) => self.evaluate(then_branch),
            Object::Bool(false) => self.evaluate(else_branch),
            _ => Err(LoxError::runtime(question, "ternary condition must be a boolean.")),
        }
    }

    fn visit_variable_expr(&mut self, id: NodeId, name: &Token) -> Result<Object, LoxError> {
        self.lookup_variable(id, name)
    }

    fn visit_assign_expr(&mut self, id: NodeId, name: &Token, value: &Expr) -> Result<Object, LoxError> {
        let value = self.evaluate(value)?;
        match self.locals.get(&id) {
            Some(&depth) => Environment::assign_at(&self.environment, depth, name, value.clone())?,
            None => Environment::assign(&self.globals, name, value.clone())?,
        };
        Ok(value)
    }

    fn visit_call_expr(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Object, LoxError> {
        let callee_value = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.evaluate(argument)?);
        }

        match callee_value {
            Object::Callable(callable) => {
                if args.len() != callable.arity() {
                    return Err(LoxError::runtime(
                        paren,
                        format!("expected {} arguments but got {}.", callable.arity(), args.len()),
                    ));
                }
                callable.call(self, args)
            }
            _ => Err(LoxError::runtime(paren, "can only call functions and classes.")),
        }
    }

    fn visit_get_expr(&mut self, object: &Expr, name: &Token) -> Result<Object, LoxError> {
        match self.evaluate(object)? {
            Object::Instance(instance) => instance.get(name),
            _ => Err(LoxError::runtime(name, "only instances have properties.")),
        }
    }

    fn visit_set_expr(&mut self, object: &Expr, name: &Token, value: &Expr) -> Result<Object, LoxError> {
        match self.evaluate(object)? {
            Object::Instance(instance) => {
                let value = self.evaluate(value)?;
                instance.set(name, value.clone());
                Ok(value)
            }
            _ => Err(LoxError::runtime(name, "only instances have fields.")),
        }
    }

    fn visit_this_expr(&mut self, id: NodeId, keyword: &Token) -> Result<Object, LoxError> {
        self.lookup_variable(id, keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Diagnostics;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn run(source: &str) -> Result<(), LoxError> {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source, &diagnostics).scan_tokens();
        let statements = Parser::new(tokens, &diagnostics).parse();
        assert!(!diagnostics.had_error(), "unexpected parse error for {source:?}");
        let locals = Resolver::new(&diagnostics).resolve(&statements);
        assert!(!diagnostics.had_error(), "unexpected resolver error for {source:?}");
        let mut interpreter = Interpreter::new();
        interpreter.resolve(locals);
        interpreter.interpret(&statements)
    }

    #[test]
    fn block_scoping_shadows_then_restores() {
        // var a=1; { var a=2; print a; } print a;  -> 2, 1
        assert!(run("var a=1; { var a=2; print a; } print a;").is_ok());
    }

    #[test]
    fn closures_share_mutable_state_across_calls() {
        assert!(run(
            "fun make(){var i=0; fun inc(){i=i+1; return i;} return inc;} var c=make(); print c(); print c();"
        )
        .is_ok());
    }

    #[test]
    fn class_instances_bind_this_in_methods() {
        assert!(run("class C { init(x){ this.x=x; } get(){ return this.x; } } print C(42).get();").is_ok());
    }

    #[test]
    fn for_loop_desugars_to_while() {
        assert!(run("for(var i=0;i<3;i=i+1) print i;").is_ok());
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let err = run("1/0;").unwrap_err();
        assert!(matches!(err, LoxError::Runtime { ref message, .. } if message.contains("division by zero")));
    }

    #[test]
    fn mixed_string_number_concatenation_stringifies_the_number() {
        // Exercised indirectly: a successful run with no runtime error means
        // the Plus arm's (String, Number) branch type-checked and matched.
        assert!(run("print \"a\" + 1;").is_ok());
    }

    #[test]
    fn break_only_exits_the_innermost_loop() {
        assert!(run("for (var i = 0; i < 3; i = i + 1) { for (var j = 0; j < 3; j = j + 1) { if (j == 1) break; } }").is_ok());
    }

    #[test]
    fn calling_a_non_callable_is_a_runtime_error() {
        let err = run("var x = 1; x();").unwrap_err();
        assert!(matches!(err, LoxError::Runtime { ref message, .. } if message.contains("can only call")));
    }

    #[test]
    fn ternary_requires_a_strict_boolean_condition() {
        let err = run("1 ? 2 : 3;").unwrap_err();
        assert!(matches!(err, LoxError::Runtime { ref message, .. } if message.contains("boolean")));
    }
}
