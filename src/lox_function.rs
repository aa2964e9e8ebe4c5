use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::errors::LoxError;
use crate::interpreter::Interpreter;
use crate::lox_callable::LoxCallable;
use crate::object::Object;
use crate::stmt::Stmt;
use crate::token::Token;

/// A user-defined function or method, bundled with the environment active
/// where it was declared. Anonymous functions carry an empty `name.lexeme`.
pub struct LoxFunction {
    name: Token,
    params: Rc<Vec<Token>>,
    body: Rc<Vec<Stmt>>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        name: Token,
        params: Rc<Vec<Token>>,
        body: Rc<Vec<Stmt>>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            name,
            params,
            body,
            closure,
            is_initializer,
        }
    }

    /// Returns a fresh `LoxFunction` whose closure encloses `self`'s with
    /// `this` bound to `instance` — the mechanism behind bound methods.
    pub fn bind(&self, instance: Object) -> LoxFunction {
        let env = Environment::with_enclosing(&self.closure);
        env.borrow_mut().define("this".to_string(), instance);
        LoxFunction {
            name: self.name.clone(),
            params: Rc::clone(&self.params),
            body: Rc::clone(&self.body),
            closure: env,
            is_initializer: self.is_initializer,
        }
    }
}

impl LoxCallable for LoxFunction {
    fn call(self: Rc<Self>, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, LoxError> {
        let env = Environment::with_enclosing(&self.closure);
        for (param, arg) in self.params.iter().zip(arguments.into_iter()) {
            env.borrow_mut().define(param.lexeme.clone(), arg);
        }

        let result = interpreter.execute_block(&self.body, env);

        match result {
            Ok(()) | Err(LoxError::Return(_)) if self.is_initializer => {
                Ok(Environment::get_at_str(&self.closure, 0, "this"))
            }
            Ok(()) => Ok(Object::Nil),
            Err(LoxError::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.lexeme.is_empty() {
            write!(f, "<fn>")
        } else {
            write!(f, "<fn {}>", self.name.lexeme)
        }
    }
}
