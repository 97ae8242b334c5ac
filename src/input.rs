use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal,
};
use std::io::{self, IsTerminal, Read};

use crate::error::Result;

/// Source of the single characters consumed by `read`.
pub trait Input {
    fn read_char(&mut self) -> Result<char>;
}

/// Reads one key press from the terminal in raw mode: no line buffering and
/// no echo. When stdin is not a terminal the next character is taken from
/// the stream instead.
#[derive(Debug, Default)]
pub struct Terminal;

impl Input for Terminal {
    fn read_char(&mut self) -> Result<char> {
        if io::stdin().is_terminal() {
            read_raw_key()
        } else {
            read_utf8_char(&mut io::stdin().lock())
        }
    }
}

fn read_raw_key() -> Result<char> {
    terminal::enable_raw_mode()?;
    let key = next_key();
    terminal::disable_raw_mode()?;
    key
}

fn next_key() -> Result<char> {
    loop {
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            let c = match code {
                KeyCode::Char(c) => c,
                KeyCode::Enter => '\r',
                KeyCode::Tab => '\t',
                KeyCode::Backspace => '\x7f',
                KeyCode::Esc => '\x1b',
                _ => continue,
            };
            return Ok(c);
        }
    }
}

fn read_utf8_char(reader: &mut impl Read) -> Result<char> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer[..1])?;

    let width = match buffer[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    };
    reader.read_exact(&mut buffer[1..width])?;

    std::str::from_utf8(&buffer[..width])
        .ok()
        .and_then(|text| text.chars().next())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "input is not valid UTF-8").into())
}

/// Pre-recorded input, for embedding the interpreter and for tests.
#[derive(Debug, Default)]
pub struct Scripted {
    chars: std::collections::VecDeque<char>,
}

impl Scripted {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }
}

impl Input for Scripted {
    fn read_char(&mut self) -> Result<char> {
        self.chars
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof).into())
    }
}
