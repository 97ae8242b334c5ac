use log::trace;

use crate::{
    ast::{Command, CommandType, Expr, Target},
    error::{parser_error, ParserError, Result},
    tokenizer::{Line, Operator, Symbol},
};

pub fn parse(lines: &[Line]) -> Result<Vec<Command>> {
    let (commands, consumed) = parse_block(lines, 0)?;
    debug_assert_eq!(consumed, lines.len(), "Failed to consume all lines");
    Ok(commands)
}

/// Parses the block starting at `lines[0]`, whose lines sit at
/// `expected_indent`. Returns the commands together with the number of lines
/// consumed, nested blocks included. Parsing stops at the first line that is
/// indented less than the block.
pub fn parse_block(lines: &[Line], expected_indent: usize) -> Result<(Vec<Command>, usize)> {
    let mut commands = Vec::new();

    let Some(first) = lines.first() else {
        return Ok((commands, 0));
    };

    if first.indent() != expected_indent {
        return parser_error(
            first,
            ParserError::IndentationMismatch {
                expected: expected_indent,
                found: first.indent(),
            },
        );
    }

    let mut consumed = 0;
    while consumed < lines.len() {
        let line = &lines[consumed];
        let indent = line.indent();

        if indent < expected_indent {
            break;
        }
        if indent > expected_indent {
            return parser_error(line, ParserError::UnexpectedIndent);
        }

        let mut command = parse_command(line)?;
        consumed += 1;

        if let Some(keyword) = command.command_type.block_keyword() {
            match lines.get(consumed) {
                Some(next) if next.indent() > indent => {
                    trace!(
                        "parsing `{}` body at depth {} from line {}",
                        keyword,
                        next.indent(),
                        next.number
                    );
                    let (body, body_consumed) = parse_block(&lines[consumed..], next.indent())?;
                    command.command_type.set_body(body);
                    consumed += body_consumed;
                }
                _ => return parser_error(line, ParserError::MissingBlock(keyword)),
            }
        }

        commands.push(command);
    }

    Ok((commands, consumed))
}

fn parse_command(line: &Line) -> Result<Command> {
    let arguments = line.arguments();

    let command_type = match line.command() {
        Some(Symbol::Print) => CommandType::Print(parse_expression(line, arguments)?),
        Some(Symbol::Read) => parse_read(line, arguments)?,
        Some(Symbol::Assign) => parse_assign(line, arguments)?,
        Some(Symbol::Declare) => parse_declare(line, arguments)?,
        Some(Symbol::If) => CommandType::If {
            condition: parse_expression(line, arguments)?,
            body: Vec::new(),
        },
        Some(Symbol::While) => CommandType::While {
            condition: parse_expression(line, arguments)?,
            body: Vec::new(),
        },
        Some(Symbol::Program) => parse_program(line, arguments)?,
        Some(Symbol::Call) => parse_call(line, arguments)?,
        Some(Symbol::Return) => {
            if arguments.is_empty() {
                CommandType::Return(None)
            } else {
                CommandType::Return(Some(parse_expression(line, arguments)?))
            }
        }
        _ => return parser_error(line, ParserError::UnknownCommand),
    };

    Ok(Command {
        command_type,
        line: line.number,
    })
}

fn parse_target(line: &Line, symbol: Option<&Symbol>) -> Result<Target> {
    match symbol {
        Some(Symbol::Variable(name)) => Ok(Target::Variable(name.clone())),
        Some(Symbol::HeapAccess(inner)) => {
            // the index may itself be a heap access, e.g. `[[:p]]`
            Ok(Target::HeapAccess(Box::new(parse_value(line, inner)?)))
        }
        _ => parser_error(line, ParserError::ExpectedTarget),
    }
}

fn parse_read(line: &Line, arguments: &[Symbol]) -> Result<CommandType> {
    let target = parse_target(line, arguments.first())?;

    if arguments.len() != 1 {
        return parser_error(line, ParserError::UnexpectedSymbols("read"));
    }

    Ok(CommandType::Read(target))
}

fn parse_assign(line: &Line, arguments: &[Symbol]) -> Result<CommandType> {
    let target = parse_target(line, arguments.first())?;
    let value = parse_expression(line, arguments.get(1..).unwrap_or(&[]))?;

    Ok(CommandType::Assign { target, value })
}

fn parse_declare(line: &Line, arguments: &[Symbol]) -> Result<CommandType> {
    let (name, rest) = match arguments.split_first() {
        Some((Symbol::Variable(name), rest)) => (name.clone(), rest),
        _ => return parser_error(line, ParserError::ExpectedVariable),
    };

    Ok(CommandType::Declare {
        name,
        initializer: parse_expression(line, rest)?,
    })
}

fn parse_program(line: &Line, arguments: &[Symbol]) -> Result<CommandType> {
    let (name, rest) = match arguments.split_first() {
        Some((Symbol::ProgramName(name), rest)) => (name.clone(), rest),
        _ => return parser_error(line, ParserError::ExpectedProgram),
    };

    let mut params = Vec::with_capacity(rest.len());
    for symbol in rest {
        match symbol {
            Symbol::Variable(param) => params.push(param.clone()),
            _ => return parser_error(line, ParserError::ExpectedVariable),
        }
    }

    Ok(CommandType::Program {
        name,
        params,
        body: Vec::new().into(),
    })
}

fn parse_call(line: &Line, arguments: &[Symbol]) -> Result<CommandType> {
    let (capture, rest) = match arguments.split_first() {
        Some((Symbol::Variable(capture), rest)) => (Some(capture.clone()), rest),
        _ => (None, arguments),
    };

    let (name, rest) = match rest.split_first() {
        Some((Symbol::ProgramName(name), rest)) => (name.clone(), rest),
        _ => return parser_error(line, ParserError::ExpectedProgram),
    };

    let arguments = rest
        .iter()
        .map(|symbol| parse_value(line, symbol))
        .collect::<Result<Vec<_>>>()?;

    Ok(CommandType::Call {
        name,
        arguments,
        capture,
    })
}

/// Splits on the lowest ranked operator, preferring the later one on ties,
/// so that `1 - 2 - 3` becomes `(1 - 2) - 3`.
pub fn parse_expression(line: &Line, symbols: &[Symbol]) -> Result<Expr> {
    match symbols {
        [] => parser_error(line, ParserError::EmptyExpression),
        [symbol] => parse_value(line, symbol),
        _ => {
            let split = symbols
                .iter()
                .enumerate()
                .filter_map(|(index, symbol)| match symbol {
                    Symbol::Operator(operator) => Some((index, *operator)),
                    _ => None,
                })
                .fold(None, |best: Option<(usize, Operator)>, (index, operator)| {
                    match best {
                        Some((_, chosen)) if chosen.rank() < operator.rank() => best,
                        _ => Some((index, operator)),
                    }
                });

            let Some((index, operator)) = split else {
                return parser_error(line, ParserError::MissingOperator);
            };

            let left = parse_expression(line, &symbols[..index])?;
            let right = parse_expression(line, &symbols[index + 1..])?;

            Ok(Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            })
        }
    }
}

fn parse_value(line: &Line, symbol: &Symbol) -> Result<Expr> {
    match symbol {
        Symbol::String(value) => Ok(Expr::String(value.clone())),
        Symbol::Integer(value) => Ok(Expr::Integer(*value)),
        Symbol::Boolean(value) => Ok(Expr::Boolean(*value)),
        Symbol::Variable(name) => Ok(Expr::Variable(name.clone())),
        Symbol::HeapAccess(inner) => Ok(Expr::HeapAccess(Box::new(parse_value(line, inner)?))),
        _ => parser_error(line, ParserError::ExpectedValue),
    }
}
