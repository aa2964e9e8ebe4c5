use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::LoxError;
use crate::object::Object;
use crate::token::Token;

/// A name-to-value scope, chained to its enclosing scope. `values` maps a
/// name to `None` between `declare` and `define` (the window the spec's
/// "declared but not initialized" runtime error covers) and to `Some` once
/// a value has actually been bound.
pub struct Environment {
    values: HashMap<String, Option<Object>>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: None,
        }))
    }

    pub fn with_enclosing(enclosing: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(enclosing)),
        }))
    }

    /// Reserves `name` in this scope without a value yet.
    pub fn declare(&mut self, name: String) {
        self.values.insert(name, None);
    }

    /// Binds (or rebinds, in the global scope) `name` to `value`.
    pub fn define(&mut self, name: String, value: Object) {
        self.values.insert(name, Some(value));
    }

    pub fn get(env: &Rc<RefCell<Environment>>, name: &Token) -> Result<Object, LoxError> {
        let this = env.borrow();
        match this.values.get(&name.lexeme) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(LoxError::runtime(
                name,
                format!("variable '{}' declared but not initialized.", name.lexeme),
            )),
            None => match &this.enclosing {
                Some(enclosing) => Environment::get(enclosing, name),
                None => Err(LoxError::runtime(
                    name,
                    format!("undefined variable '{}'.", name.lexeme),
                )),
            },
        }
    }

    pub fn assign(env: &Rc<RefCell<Environment>>, name: &Token, value: Object) -> Result<(), LoxError> {
        let mut this = env.borrow_mut();
        if this.values.contains_key(&name.lexeme) {
            this.values.insert(name.lexeme.clone(), Some(value));
            return Ok(());
        }
        match &this.enclosing {
            Some(enclosing) => {
                let enclosing = Rc::clone(enclosing);
                drop(this);
                Environment::assign(&enclosing, name, value)
            }
            None => Err(LoxError::runtime(
                name,
                format!("undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    /// Walks `distance` `enclosing` links outward from `env`, the cursor
    /// active at evaluation time. The spec flags the source interpreter's
    /// equivalent as recomputing from the root on every iteration instead
    /// of advancing the cursor; this walks forward from `env` each step.
    pub fn ancestor(env: &Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let next = current
                .borrow()
                .enclosing
                .clone()
                .expect("resolver recorded a depth deeper than the live scope chain");
            current = next;
        }
        current
    }

    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Result<Object, LoxError> {
        let scope = Environment::ancestor(env, distance);
        let scope_ref = scope.borrow();
        match scope_ref.values.get(&name.lexeme) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(LoxError::runtime(
                name,
                format!("variable '{}' declared but not initialized.", name.lexeme),
            )),
            None => Err(LoxError::runtime(
                name,
                format!("undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    pub fn get_at_str(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Object {
        let scope = Environment::ancestor(env, distance);
        let scope_ref = scope.borrow();
        match scope_ref.values.get(name) {
            Some(Some(value)) => value.clone(),
            _ => Object::Nil,
        }
    }

    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Object,
    ) -> Result<(), LoxError> {
        let scope = Environment::ancestor(env, distance);
        scope.borrow_mut().values.insert(name.lexeme.clone(), Some(value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_type::TokenKind;

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, None, 1)
    }

    #[test]
    fn reads_from_enclosing_scope() {
        let global = Environment::new();
        global.borrow_mut().define("a".to_string(), Object::Number(1.0));

        let local = Environment::with_enclosing(&global);
        assert_eq!(Environment::get(&local, &ident("a")).unwrap(), Object::Number(1.0));
    }

    #[test]
    fn shadowing_does_not_leak_outward() {
        let global = Environment::new();
        global.borrow_mut().define("a".to_string(), Object::Number(1.0));

        let local = Environment::with_enclosing(&global);
        local.borrow_mut().define("a".to_string(), Object::Number(2.0));

        assert_eq!(Environment::get(&local, &ident("a")).unwrap(), Object::Number(2.0));
        assert_eq!(Environment::get(&global, &ident("a")).unwrap(), Object::Number(1.0));
    }

    #[test]
    fn ancestor_walks_distance_from_cursor_not_root() {
        let global = Environment::new();
        let middle = Environment::with_enclosing(&global);
        let inner = Environment::with_enclosing(&middle);

        middle.borrow_mut().define("x".to_string(), Object::Number(42.0));

        assert_eq!(
            Environment::get_at(&inner, 1, &ident("x")).unwrap(),
            Object::Number(42.0)
        );
    }

    #[test]
    fn declared_but_not_initialized_is_distinct_from_undefined() {
        let global = Environment::new();
        global.borrow_mut().declare("a".to_string());

        let err = Environment::get(&global, &ident("a")).unwrap_err();
        assert!(matches!(err, LoxError::Runtime { message, .. } if message.contains("declared but not initialized")));

        let err = Environment::get(&global, &ident("b")).unwrap_err();
        assert!(matches!(err, LoxError::Runtime { message, .. } if message.contains("undefined variable")));
    }

    #[test]
    fn assign_reaches_enclosing_scope() {
        let global = Environment::new();
        global.borrow_mut().define("a".to_string(), Object::Number(1.0));
        let local = Environment::with_enclosing(&global);

        Environment::assign(&local, &ident("a"), Object::Number(9.0)).unwrap();
        assert_eq!(Environment::get(&global, &ident("a")).unwrap(), Object::Number(9.0));
    }
}
