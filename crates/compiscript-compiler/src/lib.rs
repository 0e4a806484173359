//! Compiscript compiler: parser, semantic analysis, and TAC lowering.
//!
//! The pipeline runs as sequential passes over the parsed program:
//! - `parser` - lexer, recursive-descent parser, typed AST
//! - `sema` - declaration collection, type linking, type checking
//! - `lower` - AST → three-address-code lowering
//! - `diagnostics` - accumulated semantic diagnostics with stable codes
//!
//! Semantic errors never abort; they accumulate on [`Diagnostics`] while
//! every pass runs to completion. Only syntax errors and internal lowering
//! failures surface as `Result` errors.

pub mod diagnostics;
pub mod lower;
pub mod parser;
pub mod sema;
mod source;


pub use diagnostics::{Code, Diagnostic, Diagnostics, DiagnosticsPrinter};
pub use lower::{LowerError, LoweredProgram, lower_program};
pub use parser::ParseError;
pub use source::{LineIndex, Pos, Span};

/// Hard failures of the pipeline (semantic diagnostics are not errors).
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result of running the semantic pipeline over one source text.
#[derive(Debug)]
pub struct Analysis {
    pub diagnostics: Diagnostics,
    pub tables: sema::DeclTables,
    pub ast: parser::ast::Program,
}

impl Analysis {
    /// True when no semantic diagnostics were recorded.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Parse and run all three semantic passes.
pub fn analyze(source: &str) -> Result<Analysis, Error> {
    let ast = parser::parse(source)?;
    let mut diagnostics = Diagnostics::new();
    let mut tables = sema::collect(&ast, &mut diagnostics);
    sema::link(&mut tables, &mut diagnostics);
    sema::check(&ast, &mut tables, &mut diagnostics);
    Ok(Analysis {
        diagnostics,
        tables,
        ast,
    })
}
