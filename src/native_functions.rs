use crate::errors::LoxError;
use crate::interpreter::Interpreter;
use crate::object::Object;

/// Milliseconds since the UNIX epoch, as a Lox number.
pub fn clock(_interpreter: &mut Interpreter, _arguments: Vec<Object>) -> Result<Object, LoxError> {
    Ok(Object::Number(chrono::Utc::now().timestamp_millis() as f64))
}
