//! Front-end: lexer, recursive-descent parser, and the typed AST.
//!
//! Syntax failures are hard errors (the surrounding tooling reports them and
//! stops); they are deliberately not part of the semantic diagnostic set.

pub mod ast;
mod grammar;
mod lexer;


pub use grammar::parse;
pub use lexer::{Token, TokenKind, lex, token_text};

use crate::source::{LineIndex, Span};

/// A syntax error with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at {line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            message: message.into(),
            line,
            col,
        }
    }

    pub(crate) fn unexpected_char(source: &str, span: Span) -> Self {
        let (line, col) = LineIndex::new(source).line_col(span.start);
        let text = &source[span.start as usize..span.end as usize];
        Self::new(format!("unexpected character `{text}`"), line, col)
    }
}
