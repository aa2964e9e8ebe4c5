use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::errors::LoxError;
use crate::lox_class::LoxClass;
use crate::object::Object;
use crate::token::Token;

pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: RefCell<HashMap<String, Object>>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Fields shadow methods: a field is checked first, then the class's
    /// method table, in which case the method is returned freshly bound
    /// to `self`.
    pub fn get(self: &Rc<Self>, name: &Token) -> Result<Object, LoxError> {
        if let Some(value) = self.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.find_method(&name.lexeme) {
            let bound = method.bind(Object::Instance(Rc::clone(self)));
            return Ok(Object::Callable(Rc::new(bound)));
        }

        Err(LoxError::runtime(
            name,
            format!("undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&self, name: &Token, value: Object) {
        self.fields.borrow_mut().insert(name.lexeme.clone(), value);
    }
}

impl fmt::Display for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
