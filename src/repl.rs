use nu_ansi_term::{Color, Style};
use reedline::{
    Highlighter, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    StyledText, ValidationResult, Validator,
};
use std::borrow::Cow;

use crate::tokenizer::{lex_symbol, split_symbols, Symbol};

/// Numbers each entry so errors can be matched to what was typed.
#[derive(Clone)]
pub struct REPLPrompt {
    pub entry: usize,
}

impl REPLPrompt {
    fn label(&self) -> String {
        format!("mork [{}]", self.entry)
    }
}

impl Prompt for REPLPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Owned(self.label())
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("❯ ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        // keeps block bodies lined up under the first row
        let width = self.label().chars().count();
        Cow::Owned(format!("{:>width$} ", "|", width = width + 1))
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

/// An entry that opens a block (`if`, `while`, `program`) stays open until
/// it ends with a blank line.
pub struct REPLValidator;

impl Validator for REPLValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        let opens_block = line.split('\n').any(|row| {
            matches!(
                row.split(' ').find(|word| !word.is_empty()),
                Some("if" | "while" | "program")
            )
        });

        let ends_blank = line
            .split('\n')
            .last()
            .map_or(true, |row| row.trim().is_empty());

        if opens_block && !ends_blank {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Complete
        }
    }
}

pub static KEYWORD_COLOR: Color = Color::LightBlue;
pub static LITERAL_COLOR: Color = Color::Yellow;
pub static VARIABLE_COLOR: Color = Color::LightCyan;
pub static PROGRAM_COLOR: Color = Color::LightGreen;
pub static HEAP_COLOR: Color = Color::LightPurple;
pub static DEFAULT_COLOR: Color = Color::White;
pub static OPERATOR_COLOR: Color = Color::DarkGray;
pub static COMMENT_COLOR: Color = Color::LightGray;
pub static ERROR_COLOR: Color = Color::Red;

pub struct SyntaxHighlighter;

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();

        for row in line.split_inclusive('\n') {
            let content = row.trim_end_matches(['\n', '\r']);
            highlight_row(&mut styled_text, content);
            if content.len() < row.len() {
                styled_text.push((
                    Style::new().fg(DEFAULT_COLOR),
                    row[content.len()..].to_string(),
                ));
            }
        }

        styled_text
    }
}

fn highlight_row(styled_text: &mut StyledText, row: &str) {
    if row.starts_with('#') {
        styled_text.push((Style::new().italic().fg(COMMENT_COLOR), row.to_string()));
        return;
    }

    let text = row.trim_start_matches(' ');
    let indent = row.len() - text.len();
    let mut written = 0;

    for range in split_symbols(text) {
        let start = indent + range.start;
        let end = indent + range.end;

        if start > written {
            styled_text.push((
                Style::new().fg(DEFAULT_COLOR),
                row[written..start].to_string(),
            ));
        }

        let color = match lex_symbol(&row[start..end], 0) {
            Ok(
                Symbol::Print
                | Symbol::Read
                | Symbol::Assign
                | Symbol::Declare
                | Symbol::If
                | Symbol::While
                | Symbol::Program
                | Symbol::Call
                | Symbol::Return,
            ) => KEYWORD_COLOR,
            Ok(Symbol::String(_) | Symbol::Integer(_) | Symbol::Boolean(_)) => LITERAL_COLOR,
            Ok(Symbol::Variable(_)) => VARIABLE_COLOR,
            Ok(Symbol::ProgramName(_)) => PROGRAM_COLOR,
            Ok(Symbol::HeapAccess(_)) => HEAP_COLOR,
            Ok(Symbol::Operator(_)) => OPERATOR_COLOR,
            Ok(Symbol::Indent(_)) => DEFAULT_COLOR,
            Err(_) => ERROR_COLOR,
        };

        styled_text.push((Style::new().fg(color), row[start..end].to_string()));
        written = end;
    }

    if written < row.len() {
        styled_text.push((Style::new().fg(DEFAULT_COLOR), row[written..].to_string()));
    }
}
