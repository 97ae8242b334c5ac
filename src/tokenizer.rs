use log::debug;
use std::{
    fmt::{self, Display, Formatter},
    ops::Range,
};

use crate::error::{tokenizer_error, Result, TokenizerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Indent(usize),

    Print,
    Read,
    Assign,
    Declare,
    If,
    While,
    Program,
    Call,
    Return,

    String(String),
    Integer(i64),
    Boolean(bool),

    Variable(String),
    ProgramName(String),
    HeapAccess(Box<Symbol>),

    Operator(Operator),
}

/// Binary operators. The rank doubles as precedence: the parser splits an
/// expression on the lowest ranked operator first, so higher ranks bind
/// tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    Plus,
    Minus,
    Divide,
    Times,
    Modulo,
}

impl Operator {
    pub fn rank(self) -> u8 {
        match self {
            Operator::And => 0,
            Operator::Or => 1,
            Operator::Equal => 2,
            Operator::NotEqual => 3,
            Operator::Less => 4,
            Operator::Plus => 5,
            Operator::Minus => 6,
            Operator::Divide => 7,
            Operator::Times => 8,
            Operator::Modulo => 9,
        }
    }

    pub fn lexeme(self) -> &'static str {
        match self {
            Operator::And => "&",
            Operator::Or => "|",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Divide => "/",
            Operator::Times => "*",
            Operator::Modulo => "%",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme())
    }
}

/// One non-blank source line: `symbols[0]` is always the `Indent` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub symbols: Vec<Symbol>,
}

impl Line {
    pub fn indent(&self) -> usize {
        match self.symbols.first() {
            Some(Symbol::Indent(level)) => *level,
            _ => 0,
        }
    }

    pub fn command(&self) -> Option<&Symbol> {
        self.symbols.get(1)
    }

    pub fn arguments(&self) -> &[Symbol] {
        self.symbols.get(2..).unwrap_or(&[])
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Line>> {
    let mut lines = Vec::new();

    for (index, raw) in source.split('\n').enumerate() {
        let number = index + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let text = raw.trim_start_matches(' ');
        if text.is_empty() {
            continue;
        }

        let mut symbols = vec![Symbol::Indent(raw.len() - text.len())];
        for range in split_symbols(text) {
            match lex_symbol(&text[range], number) {
                Ok(symbol) => symbols.push(symbol),
                Err(err) => {
                    debug!("{} on line {}", err, number);
                    return Err(err);
                }
            }
        }

        lines.push(Line { number, symbols });
    }

    debug!("tokenized {} lines", lines.len());
    Ok(lines)
}

/// Byte ranges of the space separated pieces of an unindented line. Spaces
/// inside a `'...'` literal do not split; a quote preceded by `\` does not
/// close the literal.
pub fn split_symbols(line: &str) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut start = None;
    let mut in_string = false;
    let mut last_seen = '\0';

    for (offset, c) in line.char_indices() {
        if c == ' ' && !in_string {
            if let Some(begin) = start.take() {
                pieces.push(begin..offset);
            }
            continue;
        }

        if c == '\'' {
            in_string = !in_string || last_seen == '\\';
        }

        start.get_or_insert(offset);
        last_seen = c;
    }

    if let Some(begin) = start {
        pieces.push(begin..line.len());
    }

    pieces
}

pub fn lex_symbol(text: &str, line: usize) -> Result<Symbol> {
    let symbol = match text {
        "log" => Symbol::Print,
        "read" => Symbol::Read,
        "=" => Symbol::Assign,
        "new" => Symbol::Declare,
        "if" => Symbol::If,
        "while" => Symbol::While,
        "program" => Symbol::Program,
        "call" => Symbol::Call,
        "return" => Symbol::Return,

        "&" => Symbol::Operator(Operator::And),
        "|" => Symbol::Operator(Operator::Or),
        "==" => Symbol::Operator(Operator::Equal),
        "!=" => Symbol::Operator(Operator::NotEqual),
        "<" => Symbol::Operator(Operator::Less),
        "+" => Symbol::Operator(Operator::Plus),
        "-" => Symbol::Operator(Operator::Minus),
        "*" => Symbol::Operator(Operator::Times),
        "/" => Symbol::Operator(Operator::Divide),
        "%" => Symbol::Operator(Operator::Modulo),

        _ => return lex_literal(text, line),
    };

    Ok(symbol)
}

fn lex_literal(text: &str, line: usize) -> Result<Symbol> {
    if let Some(name) = text.strip_prefix(':') {
        return Ok(Symbol::Variable(name.to_string()));
    }

    if let Some(name) = text.strip_prefix('$') {
        return Ok(Symbol::ProgramName(name.to_string()));
    }

    if let Some(flag) = text.strip_prefix('?') {
        return match flag {
            "true" => Ok(Symbol::Boolean(true)),
            "false" => Ok(Symbol::Boolean(false)),
            _ => tokenizer_error(line, TokenizerError::MalformedBoolean(text.to_string())),
        };
    }

    if text.starts_with('\'') {
        return lex_string(text, line);
    }

    if let Some(inner) = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return Ok(Symbol::HeapAccess(Box::new(lex_symbol(inner, line)?)));
    }

    if let Ok(value) = text.parse::<i64>() {
        return Ok(Symbol::Integer(value));
    }

    tokenizer_error(line, TokenizerError::UnrecognisedSymbol(text.to_string()))
}

fn lex_string(text: &str, line: usize) -> Result<Symbol> {
    let malformed = || tokenizer_error(line, TokenizerError::MalformedString(text.to_string()));

    let body = match text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(body) if !body.ends_with('\\') => body,
        _ => return malformed(),
    };

    // `"` is plain text inside a literal, so it must not end the quoted
    // segment handed to the unescaper
    let mut quoted = String::with_capacity(body.len() + 2);
    quoted.push('"');
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => quoted.push('\''),
                Some(next) => {
                    quoted.push('\\');
                    quoted.push(next);
                }
                None => return malformed(),
            },
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');

    match snailquote::unescape(&quoted) {
        Ok(value) => Ok(Symbol::String(value)),
        Err(_) => malformed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn symbols_of(source: &str) -> Result<Vec<Vec<Symbol>>> {
        Ok(tokenize(source)?
            .into_iter()
            .map(|line| line.symbols)
            .collect())
    }

    #[test]
    fn test_simple_line() -> Result<()> {
        assert_eq!(
            symbols_of("new :x 5 + 3")?,
            vec![vec![
                Symbol::Indent(0),
                Symbol::Declare,
                Symbol::Variable("x".to_string()),
                Symbol::Integer(5),
                Symbol::Operator(Operator::Plus),
                Symbol::Integer(3),
            ]]
        );
        Ok(())
    }

    #[test]
    fn test_blank_lines_and_comments_are_dropped() -> Result<()> {
        let lines = tokenize("# a comment\n\n    \nlog 1\n\n# another\nlog 2\n")?;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 4);
        assert_eq!(lines[1].number, 7);
        Ok(())
    }

    #[test]
    fn test_indentation() -> Result<()> {
        let lines = tokenize("if ?true\n  log 1\n    log 2\r\nlog 3")?;
        let indents: Vec<usize> = lines.iter().map(Line::indent).collect();
        assert_eq!(indents, vec![0, 2, 4, 0]);
        assert_eq!(lines[1].command(), Some(&Symbol::Print));
        assert_eq!(lines[1].arguments(), &[Symbol::Integer(1)]);
        Ok(())
    }

    #[test]
    fn test_string_literals() -> Result<()> {
        assert_eq!(
            symbols_of("log 'hello world' + 'it\\'s'")?,
            vec![vec![
                Symbol::Indent(0),
                Symbol::Print,
                Symbol::String("hello world".to_string()),
                Symbol::Operator(Operator::Plus),
                Symbol::String("it's".to_string()),
            ]]
        );

        assert_eq!(
            symbols_of("log 'a\\nb'")?[0][2],
            Symbol::String("a\nb".to_string())
        );
        assert_eq!(symbols_of("log ''")?[0][2], Symbol::String(String::new()));
        Ok(())
    }

    #[test]
    fn test_double_quotes_are_kept_in_string_literals() -> Result<()> {
        assert_eq!(
            symbols_of("log 'say \"hi there\" x'")?[0][2],
            Symbol::String("say \"hi there\" x".to_string())
        );
        assert_eq!(
            symbols_of("log '\"' + 'a\\\"b'")?[0],
            vec![
                Symbol::Indent(0),
                Symbol::Print,
                Symbol::String("\"".to_string()),
                Symbol::Operator(Operator::Plus),
                Symbol::String("a\"b".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_sigils_and_literals() -> Result<()> {
        assert_eq!(
            symbols_of("call :out $add ?true ?false -7")?,
            vec![vec![
                Symbol::Indent(0),
                Symbol::Call,
                Symbol::Variable("out".to_string()),
                Symbol::ProgramName("add".to_string()),
                Symbol::Boolean(true),
                Symbol::Boolean(false),
                Symbol::Integer(-7),
            ]]
        );
        Ok(())
    }

    #[test]
    fn test_nested_heap_access() -> Result<()> {
        assert_eq!(
            symbols_of("= [[:p]] [0]")?[0][2..].to_vec(),
            vec![
                Symbol::HeapAccess(Box::new(Symbol::HeapAccess(Box::new(Symbol::Variable(
                    "p".to_string()
                ))))),
                Symbol::HeapAccess(Box::new(Symbol::Integer(0))),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_repeated_spaces() -> Result<()> {
        assert_eq!(
            symbols_of("log  1   +  2 ")?,
            vec![vec![
                Symbol::Indent(0),
                Symbol::Print,
                Symbol::Integer(1),
                Symbol::Operator(Operator::Plus),
                Symbol::Integer(2),
            ]]
        );
        Ok(())
    }

    #[test]
    fn test_split_symbols_keeps_quoted_spaces() {
        let line = "log 'a b' + :c";
        let pieces: Vec<&str> = split_symbols(line)
            .into_iter()
            .map(|range| &line[range])
            .collect();
        assert_eq!(pieces, vec!["log", "'a b'", "+", ":c"]);
    }

    #[test]
    fn test_error_cases() {
        assert!(matches!(
            tokenize("log foo"),
            Err(Error::Tokenizer {
                line: 1,
                kind: TokenizerError::UnrecognisedSymbol(_)
            })
        ));
        assert!(matches!(
            tokenize("\nlog ?maybe"),
            Err(Error::Tokenizer {
                line: 2,
                kind: TokenizerError::MalformedBoolean(_)
            })
        ));
        assert!(matches!(
            tokenize("log 'unterminated"),
            Err(Error::Tokenizer {
                kind: TokenizerError::MalformedString(_),
                ..
            })
        ));
        assert!(matches!(
            tokenize("log '"),
            Err(Error::Tokenizer {
                kind: TokenizerError::MalformedString(_),
                ..
            })
        ));
        assert!(tokenize("  # indented comments are not comments").is_err());
    }

    #[test]
    fn test_operator_ranks() {
        let ordered = [
            Operator::And,
            Operator::Or,
            Operator::Equal,
            Operator::NotEqual,
            Operator::Less,
            Operator::Plus,
            Operator::Minus,
            Operator::Divide,
            Operator::Times,
            Operator::Modulo,
        ];
        assert!(ordered.windows(2).all(|pair| pair[0].rank() < pair[1].rank()));
    }
}
