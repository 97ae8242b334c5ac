use log::{debug, trace};
use std::{
    collections::HashMap,
    fmt::{self, Debug, Display, Formatter},
    io::Write,
    rc::Rc,
};

use crate::{
    ast::{Command, CommandType, Expr, Target},
    environment::{Environment, Scope},
    error::{Error, Result, RuntimeError},
    heap::Heap,
    input::Input,
    parser::parse,
    tokenizer::{tokenize, Operator},
};

/// Stack left before a block grows the native stack.
const RED_ZONE: usize = 100 * 1024;
const STACK_PER_GROWTH: usize = 1024 * 1024;

#[derive(Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "text",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Value::String(s) = self {
            write!(f, "'{}'", s)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// How a list of commands finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    FellThrough,
    Returned(Option<Value>),
}

/// A registered `program`. Not a closure: the body only sees its parameters.
#[derive(Debug, Clone)]
pub struct Callable {
    pub params: Vec<String>,
    pub body: Rc<[Command]>,
}

/// One interpreter instance. The heap, the program table and the top level
/// scope live as long as the interpreter, so consecutive calls to `run`
/// share them.
pub struct Interpreter<W: Write, I: Input> {
    context: Context<W, I>,
    globals: Environment,
}

struct Context<W: Write, I: Input> {
    heap: Heap,
    programs: HashMap<String, Callable>,
    output: W,
    input: I,
}

impl<W: Write, I: Input> Interpreter<W, I> {
    pub fn new(output: W, input: I) -> Self {
        Self {
            context: Context {
                heap: Heap::new(),
                programs: HashMap::new(),
                output,
                input,
            },
            globals: Environment::new(),
        }
    }

    pub fn run(&mut self, commands: &[Command]) -> Result<()> {
        let result = self.context.execute_commands(commands, &mut self.globals);
        self.context.output.flush()?;

        if let Outcome::Returned(value) = result? {
            debug!("top level returned with {:?}", value);
        }
        Ok(())
    }

    pub fn run_source(&mut self, source: &str) -> Result<()> {
        let lines = tokenize(source)?;
        let commands = parse(&lines)?;
        self.run(&commands)
    }

    pub fn heap(&self) -> &Heap {
        &self.context.heap
    }

    pub fn program(&self, name: &str) -> Option<&Callable> {
        self.context.programs.get(name)
    }

    pub fn output(&self) -> &W {
        &self.context.output
    }

    pub fn into_output(self) -> W {
        self.context.output
    }
}

impl<W: Write, I: Input> Context<W, I> {
    /// Runs `commands` inside a fresh frame that is dropped on every exit
    /// path. Every level of program recursion passes through here, so the
    /// native stack is grown on demand instead of overflowing.
    fn execute_block(&mut self, commands: &[Command], env: &mut Environment) -> Result<Outcome> {
        stacker::maybe_grow(RED_ZONE, STACK_PER_GROWTH, || {
            let mut scope = env.extend();
            self.execute_commands(commands, &mut scope)
        })
    }

    fn execute_commands(&mut self, commands: &[Command], env: &mut Environment) -> Result<Outcome> {
        for command in commands {
            match self.execute(command, env)? {
                Outcome::FellThrough => {}
                returned => return Ok(returned),
            }
        }
        Ok(Outcome::FellThrough)
    }

    fn execute(&mut self, command: &Command, env: &mut Environment) -> Result<Outcome> {
        let at_line = |kind: RuntimeError| Error::Runtime {
            line: command.line,
            kind,
        };

        match &command.command_type {
            CommandType::Print(expr) => {
                let value = self.evaluate(expr, env).map_err(at_line)?;
                write!(self.output, "{}", value)?;
            }
            CommandType::Read(target) => {
                self.output.flush()?;
                let c = self.input.read_char()?;
                self.store(target, Value::String(c.to_string()), env)
                    .map_err(at_line)?;
            }
            CommandType::Assign { target, value } => {
                let value = self.evaluate(value, env).map_err(at_line)?;
                self.store(target, value, env).map_err(at_line)?;
            }
            CommandType::Declare { name, initializer } => {
                let value = self.evaluate(initializer, env).map_err(at_line)?;
                env.declare(name, value).map_err(at_line)?;
            }
            CommandType::If { condition, body } => {
                if self.condition(condition, env).map_err(at_line)? {
                    return self.execute_block(body, env);
                }
            }
            CommandType::While { condition, body } => {
                while self.condition(condition, env).map_err(at_line)? {
                    match self.execute_block(body, env)? {
                        Outcome::FellThrough => {}
                        returned => return Ok(returned),
                    }
                }
            }
            CommandType::Program { name, params, body } => {
                debug!("registering program ${} on line {}", name, command.line);
                self.programs.insert(
                    name.clone(),
                    Callable {
                        params: params.clone(),
                        body: Rc::clone(body),
                    },
                );
            }
            CommandType::Call {
                name,
                arguments,
                capture,
            } => {
                let callable = self
                    .programs
                    .get(name)
                    .cloned()
                    .ok_or_else(|| at_line(RuntimeError::UndefinedProgram(name.clone())))?;

                if callable.params.len() != arguments.len() {
                    return Err(at_line(RuntimeError::ArgumentCount {
                        name: name.clone(),
                        expected: callable.params.len(),
                        found: arguments.len(),
                    }));
                }

                // the callee gets a brand new stack holding only its parameters
                let mut frame = Environment::new();
                for (param, argument) in callable.params.iter().zip(arguments) {
                    let value = self.evaluate(argument, env).map_err(at_line)?;
                    frame.declare(param, value).map_err(at_line)?;
                }

                trace!("calling ${} with {} arguments", name, arguments.len());
                if let Outcome::Returned(Some(value)) = self.execute_block(&callable.body, &mut frame)? {
                    if let Some(capture) = capture {
                        env.assign(capture, value).map_err(at_line)?;
                    }
                }
            }
            CommandType::Return(expr) => {
                let value = match expr {
                    Some(expr) => Some(self.evaluate(expr, env).map_err(at_line)?),
                    None => None,
                };
                return Ok(Outcome::Returned(value));
            }
        }

        Ok(Outcome::FellThrough)
    }

    fn condition(&self, condition: &Expr, env: &Environment) -> std::result::Result<bool, RuntimeError> {
        match self.evaluate(condition, env)? {
            Value::Boolean(b) => Ok(b),
            _ => Err(RuntimeError::ConditionNotBoolean),
        }
    }

    fn store(
        &mut self,
        target: &Target,
        value: Value,
        env: &mut Environment,
    ) -> std::result::Result<(), RuntimeError> {
        match target {
            Target::Variable(name) => env.assign(name, value),
            Target::HeapAccess(index) => {
                let index = self.evaluate(index, env)?;
                self.heap.set(&index, value)
            }
        }
    }

    fn evaluate(&self, expr: &Expr, env: &Environment) -> std::result::Result<Value, RuntimeError> {
        match expr {
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Variable(name) => env.lookup(name),
            Expr::HeapAccess(index) => {
                let index = self.evaluate(index, env)?;
                self.heap.get(&index).cloned()
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                evaluate_binary(left, *operator, right)
            }
        }
    }
}

/// The operator table, keyed by (left type, operator, right type). It is not
/// symmetric: `'a' + 1` is text but `1 + 'a'` is unsupported.
pub fn evaluate_binary(
    left: Value,
    operator: Operator,
    right: Value,
) -> std::result::Result<Value, RuntimeError> {
    match (&left, operator, &right) {
        (Value::String(a), Operator::Plus, _) => Ok(Value::String(format!("{}{}", a, right))),
        (Value::String(a), Operator::Equal, Value::String(b)) => Ok(Value::Boolean(a == b)),
        (Value::String(a), Operator::NotEqual, Value::String(b)) => Ok(Value::Boolean(a != b)),
        (Value::String(a), Operator::Less, Value::Integer(b)) => {
            Ok(Value::Boolean(text_length(a) < *b))
        }
        (Value::String(a), Operator::Modulo, Value::Integer(b)) => char_at(a, *b),

        (Value::Integer(a), Operator::Plus, Value::Integer(b)) => {
            Ok(Value::Integer(a.wrapping_add(*b)))
        }
        (Value::Integer(a), Operator::Minus, Value::Integer(b)) => {
            Ok(Value::Integer(a.wrapping_sub(*b)))
        }
        (Value::Integer(a), Operator::Times, Value::Integer(b)) => {
            Ok(Value::Integer(a.wrapping_mul(*b)))
        }
        (Value::Integer(_), Operator::Divide | Operator::Modulo, Value::Integer(0)) => {
            Err(RuntimeError::DivisionByZero)
        }
        (Value::Integer(a), Operator::Divide, Value::Integer(b)) => {
            Ok(Value::Integer(a.wrapping_div(*b)))
        }
        (Value::Integer(a), Operator::Modulo, Value::Integer(b)) => {
            Ok(Value::Integer(a.wrapping_rem(*b)))
        }
        (Value::Integer(a), Operator::Equal, Value::Integer(b)) => Ok(Value::Boolean(a == b)),
        (Value::Integer(a), Operator::NotEqual, Value::Integer(b)) => Ok(Value::Boolean(a != b)),
        (Value::Integer(a), Operator::Less, Value::Integer(b)) => Ok(Value::Boolean(a < b)),
        (Value::Integer(a), Operator::Less, Value::String(b)) => {
            Ok(Value::Boolean(*a < text_length(b)))
        }

        (Value::Boolean(a), Operator::And, Value::Boolean(b)) => Ok(Value::Boolean(*a && *b)),
        (Value::Boolean(a), Operator::Or, Value::Boolean(b)) => Ok(Value::Boolean(*a || *b)),
        (Value::Boolean(a), Operator::Equal, Value::Boolean(b)) => Ok(Value::Boolean(a == b)),
        (Value::Boolean(a), Operator::NotEqual, Value::Boolean(b)) => Ok(Value::Boolean(a != b)),
        (Value::Boolean(_), Operator::Plus, _) => Ok(Value::String(format!("{}{}", left, right))),

        _ => Err(RuntimeError::UnsupportedOperation {
            left: left.type_name(),
            operator,
            right: right.type_name(),
        }),
    }
}

fn text_length(text: &str) -> i64 {
    i64::try_from(text.chars().count()).unwrap_or(i64::MAX)
}

fn char_at(text: &str, index: i64) -> std::result::Result<Value, RuntimeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| text.chars().nth(i))
        .map(|c| Value::String(c.to_string()))
        .ok_or(RuntimeError::CharIndexOutOfRange {
            index,
            length: text.chars().count(),
        })
}
