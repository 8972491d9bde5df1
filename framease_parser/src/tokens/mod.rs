//! Directive tokenization
//!
//! Each logical line is split shell-style without POSIX processing: quotes
//! delimit tokens but are kept in the token text, and backslash escapes inside
//! a quoted run are retained verbatim. The first token classifies the line as
//! a [`Directive`].

pub mod token;

pub use token::{tokenize, unquote, Directive};
