use crate::tokenizer::{Line, Operator};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
    #[error("tokenizer error on line {line}: {kind}")]
    Tokenizer { line: usize, kind: TokenizerError },
    #[error("parser error on line {line}: {kind}")]
    Parser { line: usize, kind: ParserError },
    #[error("runtime error on line {line}: {kind}")]
    Runtime { line: usize, kind: RuntimeError },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("unrecognised symbol `{0}`, did you mean the variable `:{0}` or the string `'{0}'`?")]
    UnrecognisedSymbol(String),
    #[error("boolean literal should be `?true` or `?false`, found `{0}`")]
    MalformedBoolean(String),
    #[error("malformed string literal `{0}`")]
    MalformedString(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("block is not indented properly, expected {expected} spaces but found {found}")]
    IndentationMismatch { expected: usize, found: usize },
    #[error("the indentation unexpectedly increased")]
    UnexpectedIndent,
    #[error("expected an indented block after `{0}`")]
    MissingBlock(&'static str),
    #[error("a line must start with a command keyword")]
    UnknownCommand,
    #[error("expected an expression")]
    EmptyExpression,
    #[error("expected an operator between values")]
    MissingOperator,
    #[error("expected a literal, variable or heap access")]
    ExpectedValue,
    #[error("expected a variable or heap access to write to")]
    ExpectedTarget,
    #[error("expected a variable name")]
    ExpectedVariable,
    #[error("expected a program name")]
    ExpectedProgram,
    #[error("unexpected symbols after `{0}`")]
    UnexpectedSymbols(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("variable `:{0}` is not declared, did you declare it first?")]
    NotDeclared(String),
    #[error("variable `:{0}` is already declared")]
    AlreadyDeclared(String),
    #[error("condition did not evaluate to a boolean")]
    ConditionNotBoolean,
    #[error("cannot use `{operator}` on {left} and {right}")]
    UnsupportedOperation {
        left: &'static str,
        operator: Operator,
        right: &'static str,
    },
    #[error("tried to access the heap with a value that is not an integer")]
    HeapIndexNotInteger,
    #[error("heap index {0} is out of range")]
    HeapIndexOutOfRange(i64),
    #[error("tried to call `${0}` but it has not been created")]
    UndefinedProgram(String),
    #[error("`${name}` expects {expected} parameters but was called with {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("character index {index} is out of range for a text of length {length}")]
    CharIndexOutOfRange { index: i64, length: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn tokenizer_error<T>(line: usize, kind: TokenizerError) -> Result<T> {
    Err(Error::Tokenizer { line, kind })
}

pub fn parser_error<T>(line: &Line, kind: ParserError) -> Result<T> {
    Err(Error::Parser {
        line: line.number,
        kind,
    })
}
