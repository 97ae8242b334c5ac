use crate::{error::RuntimeError, runtime::Value};
use chainmap::ChainMap;

/// The scope stack. `extend()` pushes a frame; dropping the extended map pops
/// it again.
pub type Environment = ChainMap<String, Value>;

pub trait Scope {
    fn lookup(&self, name: &String) -> Result<Value, RuntimeError>;
    fn assign(&mut self, name: &String, value: Value) -> Result<(), RuntimeError>;
    fn declare(&mut self, name: &String, value: Value) -> Result<(), RuntimeError>;
}

impl Scope for Environment {
    fn lookup(&self, name: &String) -> Result<Value, RuntimeError> {
        match self.get(name) {
            Some(value) => Ok(value.clone()),
            None => Err(RuntimeError::NotDeclared(name.clone())),
        }
    }

    /// Writes into the innermost frame that already holds `name`.
    fn assign(&mut self, name: &String, value: Value) -> Result<(), RuntimeError> {
        if self.get(name).is_none() {
            return Err(RuntimeError::NotDeclared(name.clone()));
        }
        self.update_or(name, value);
        Ok(())
    }

    /// Inserts into the innermost frame. Shadowing an outer name is an error
    /// just like redeclaring one in the same frame.
    fn declare(&mut self, name: &String, value: Value) -> Result<(), RuntimeError> {
        if self.get(name).is_some() {
            return Err(RuntimeError::AlreadyDeclared(name.clone()));
        }
        self.insert(name.clone(), value);
        Ok(())
    }
}
