//! Semantic analysis: scope tree, symbols, type algebra, and the three
//! passes (declaration collection, type linking, type checking).

mod check;
mod collect;
mod link;
mod scope;
mod symbol;
pub mod types;

#[cfg(test)]
mod check_tests;
#[cfg(test)]
mod scope_tests;
#[cfg(test)]
mod types_tests;

pub use check::check;
pub use collect::{DeclTables, collect};
pub use link::link;
pub use scope::{ScopeArena, ScopeData, ScopeId, ScopeKind};
pub use symbol::{
    ClassSymbol, FieldSymbol, FunctionSymbol, ParamSymbol, Symbol, VarSymbol,
};
