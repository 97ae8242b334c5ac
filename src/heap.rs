use crate::{error::RuntimeError, runtime::Value};

pub const HEAP_SIZE: usize = 10_000;

/// Fixed capacity memory addressed by integer index. Every cell starts out
/// as the empty text.
#[derive(Debug, Clone)]
pub struct Heap {
    cells: Vec<Value>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn new() -> Self {
        Self {
            cells: vec![Value::String(String::new()); HEAP_SIZE],
        }
    }

    pub fn get(&self, index: &Value) -> Result<&Value, RuntimeError> {
        let address = Self::address(index)?;
        Ok(&self.cells[address])
    }

    pub fn set(&mut self, index: &Value, value: Value) -> Result<(), RuntimeError> {
        let address = Self::address(index)?;
        self.cells[address] = value;
        Ok(())
    }

    fn address(index: &Value) -> Result<usize, RuntimeError> {
        match index {
            Value::Integer(n) => usize::try_from(*n)
                .ok()
                .filter(|address| *address < HEAP_SIZE)
                .ok_or(RuntimeError::HeapIndexOutOfRange(*n)),
            _ => Err(RuntimeError::HeapIndexNotInteger),
        }
    }
}
