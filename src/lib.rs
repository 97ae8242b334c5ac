pub mod ast;
pub mod cli;
pub mod environment;
pub mod error;
pub mod heap;
pub mod input;
pub mod loader;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod tokenizer;
