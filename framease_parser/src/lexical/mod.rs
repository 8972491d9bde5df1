//! Logical line assembly for configuration dumps
//!
//! FortiOS-style dumps may break a quoted value (typically a multi-line
//! `comments` or `buffer` setting) across physical lines. Before tokenizing,
//! physical lines are re-joined into logical lines: while a line holds an odd
//! number of unescaped `"` characters it is still inside a string, and the
//! next physical line is appended using the two-character `\n` sequence as
//! the separator.

use crate::config::compile_time::lexical::MAX_LOGICAL_LINE_LENGTH;
use crate::logging::{codes, Code};
use crate::log_error;

/// Separator inserted between physical lines that belong to one quoted value
pub const QUOTED_NEWLINE: &str = "\\n";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Logical line starting at line {line} exceeds {limit} bytes")]
    LogicalLineTooLong { line: usize, limit: usize },
}

impl LexerError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::LogicalLineTooLong { .. } => codes::parser::LOGICAL_LINE_TOO_LONG,
        }
    }
}

/// One logical line of a dump, tagged with the physical line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based physical line number of the first fragment
    pub number: usize,
    pub text: String,
}

/// Count `"` characters that are not preceded by a backslash escape
pub fn unescaped_quote_count(text: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for ch in text.chars() {
        match ch {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => count += 1,
            _ => escaped = false,
        }
    }
    count
}

/// Re-join physical lines into logical lines.
///
/// Trailing `\r` from CRLF dumps is dropped from every physical line. A quoted
/// value still open at end of input is emitted as-is.
pub fn assemble_lines<'a, I>(physical: I) -> Result<Vec<LogicalLine>, LexerError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (index, raw) in physical.into_iter().enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let current = match pending.take() {
            Some(mut open) => {
                open.text.push_str(QUOTED_NEWLINE);
                open.text.push_str(raw);
                open
            }
            None => LogicalLine {
                number: index + 1,
                text: raw.to_string(),
            },
        };

        if current.text.len() > MAX_LOGICAL_LINE_LENGTH {
            let err = LexerError::LogicalLineTooLong {
                line: current.number,
                limit: MAX_LOGICAL_LINE_LENGTH,
            };
            log_error!(err.error_code(), &err.to_string(), line = current.number);
            return Err(err);
        }

        if unescaped_quote_count(&current.text) % 2 == 1 {
            pending = Some(current);
        } else {
            lines.push(current);
        }
    }

    if let Some(open) = pending {
        lines.push(open);
    }

    Ok(lines)
}

/// Convenience wrapper over raw dump text
pub fn logical_lines(raw_text: &str) -> Result<Vec<LogicalLine>, LexerError> {
    assemble_lines(raw_text.lines())
}
