//! Semantic diagnostics infrastructure.
//!
//! Passes record diagnostics and continue; nothing in the pipeline aborts on
//! a semantic error. The collection is append-only, so the recorded order is
//! the AST traversal order.

mod code;
mod printer;


use std::fmt;

pub use code::Code;
pub use printer::DiagnosticsPrinter;

use crate::source::Pos;

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: Code,
    pub message: String,
    pub pos: Option<Pos>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(
                f,
                "{} @ {}:{} - {}",
                self.code, pos.line, pos.col, self.message
            ),
            None => write!(f, "{} - {}", self.code, self.message),
        }
    }
}

/// Append-only collection of semantic diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(
        &mut self,
        code: Code,
        message: impl Into<String>,
        pos: impl Into<Option<Pos>>,
    ) {
        self.messages.push(Diagnostic {
            code,
            message: message.into(),
            pos: pos.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn count_of(&self, code: Code) -> usize {
        self.messages.iter().filter(|d| d.code == code).count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    /// Stable line-per-diagnostic rendering in recorded order.
    pub fn summary(&self) -> String {
        let lines: Vec<String> = self.messages.iter().map(|d| d.to_string()).collect();
        lines.join("\n")
    }
}
