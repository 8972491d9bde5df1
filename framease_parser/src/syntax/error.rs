//! Error types for hierarchy construction

use crate::lexical::LexerError;
use crate::logging::{codes, Code};

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unbalanced nesting: '{directive}' at line {line} closes a context that was never opened")]
    UnbalancedNesting { line: usize, directive: String },

    #[error("'set' at line {line} appears outside any open context")]
    SetOutsideContext { line: usize },

    #[error("Context nesting at line {line} exceeds maximum depth {depth}")]
    ContextTooDeep { line: usize, depth: usize },

    #[error("{} context(s) left open at end of input: {}", contexts.len(), contexts.join(" > "))]
    UnclosedContexts { contexts: Vec<String> },

    #[error(transparent)]
    Lexical(#[from] LexerError),
}

impl ParseError {
    pub fn unbalanced_nesting(line: usize, directive: &str) -> Self {
        Self::UnbalancedNesting {
            line,
            directive: directive.to_string(),
        }
    }

    pub fn set_outside_context(line: usize) -> Self {
        Self::SetOutsideContext { line }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnbalancedNesting { .. } => codes::parser::UNBALANCED_NESTING,
            Self::SetOutsideContext { .. } => codes::parser::SET_OUTSIDE_CONTEXT,
            Self::ContextTooDeep { .. } => codes::parser::CONTEXT_TOO_DEEP,
            Self::UnclosedContexts { .. } => codes::parser::UNCLOSED_CONTEXT,
            Self::Lexical(err) => err.error_code(),
        }
    }

    /// Dump line the error refers to, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnbalancedNesting { line, .. }
            | Self::SetOutsideContext { line }
            | Self::ContextTooDeep { line, .. } => Some(*line),
            Self::Lexical(LexerError::LogicalLineTooLong { line, .. }) => Some(*line),
            Self::UnclosedContexts { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_lines() {
        let err = ParseError::unbalanced_nesting(4, "end");
        assert_eq!(err.error_code(), codes::parser::UNBALANCED_NESTING);
        assert_eq!(err.line(), Some(4));
        assert!(err.to_string().contains("line 4"));

        let err = ParseError::UnclosedContexts {
            contexts: vec!["config a".into(), "edit 1".into()],
        };
        assert_eq!(err.line(), None);
        assert!(err.to_string().contains("config a > edit 1"));
    }
}
