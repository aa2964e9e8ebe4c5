use std::fmt;
use std::rc::Rc;

use crate::errors::LoxError;
use crate::interpreter::Interpreter;
use crate::lox_callable::LoxCallable;
use crate::object::Object;

/// A builtin implemented in Rust rather than Lox. The interpreter's
/// standard-library surface is exactly `clock`.
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, LoxError>,
}

impl NativeFunction {
    pub fn new(
        name: &'static str,
        arity: usize,
        function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, LoxError>,
    ) -> Self {
        NativeFunction { name, arity, function }
    }
}

impl LoxCallable for NativeFunction {
    fn call(self: Rc<Self>, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, LoxError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
