use crate::tokenizer::Operator;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    String(String),
    Integer(i64),
    Boolean(bool),
    Variable(String),
    HeapAccess(Box<Expr>),
    Binary {
        left: Box<Expr>,
        operator: Operator,
        right: Box<Expr>,
    },
}

/// Where `read` and `=` store their value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Variable(String),
    HeapAccess(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub command_type: CommandType,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandType {
    Print(Expr),
    Read(Target),
    Assign {
        target: Target,
        value: Expr,
    },
    Declare {
        name: String,
        initializer: Expr,
    },
    If {
        condition: Expr,
        body: Vec<Command>,
    },
    While {
        condition: Expr,
        body: Vec<Command>,
    },
    Program {
        name: String,
        params: Vec<String>,
        body: Rc<[Command]>,
    },
    Call {
        name: String,
        arguments: Vec<Expr>,
        capture: Option<String>,
    },
    Return(Option<Expr>),
}

impl CommandType {
    /// The keyword of commands that own an indented body.
    pub fn block_keyword(&self) -> Option<&'static str> {
        match self {
            CommandType::If { .. } => Some("if"),
            CommandType::While { .. } => Some("while"),
            CommandType::Program { .. } => Some("program"),
            _ => None,
        }
    }

    pub fn set_body(&mut self, commands: Vec<Command>) {
        match self {
            CommandType::If { body, .. } | CommandType::While { body, .. } => *body = commands,
            CommandType::Program { body, .. } => *body = commands.into(),
            _ => {}
        }
    }
}
