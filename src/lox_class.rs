use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::errors::LoxError;
use crate::interpreter::Interpreter;
use crate::lox_callable::LoxCallable;
use crate::lox_function::LoxFunction;
use crate::lox_instance::LoxInstance;
use crate::object::Object;

/// A Lox class. The spec's surface supports classes without a superclass
/// dispatch chain, so `find_method` only ever looks at this class's own
/// method table.
pub struct LoxClass {
    pub name: String,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(name: String, methods: HashMap<String, Rc<LoxFunction>>) -> Self {
        LoxClass { name, methods }
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        self.methods.get(name).cloned()
    }
}

impl LoxCallable for LoxClass {
    fn call(self: Rc<Self>, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, LoxError> {
        let instance = Rc::new(LoxInstance::new(Rc::clone(&self)));
        if let Some(initializer) = self.find_method("init") {
            Rc::new(initializer.bind(Object::Instance(Rc::clone(&instance))))
                .call(interpreter, arguments)?;
        }
        Ok(Object::Instance(instance))
    }

    fn arity(&self) -> usize {
        match self.find_method("init") {
            Some(init) => init.arity(),
            None => 0,
        }
    }
}

impl fmt::Display for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
