//! Symbols stored in scopes.
//!
//! Annotation strings (`type_ann`, `return_ann`) are filled by the
//! declaration collector; the `resolved` fields are filled by the type
//! linker. `FunctionSymbol::captured` is an out-parameter of the type
//! checker's closure analysis.

use indexmap::IndexSet;

use super::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct VarSymbol {
    pub name: String,
    pub type_ann: Option<String>,
    pub resolved: Option<Type>,
}

impl VarSymbol {
    pub fn new(name: impl Into<String>, type_ann: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_ann,
            resolved: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSymbol {
    pub name: String,
    pub type_ann: Option<String>,
    pub resolved: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSymbol {
    pub name: String,
    pub type_ann: Option<String>,
    pub resolved: Option<Type>,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub name: String,
    /// Parameter names in declaration order; their types live in the
    /// function's scope.
    pub params: Vec<String>,
    pub return_ann: Option<String>,
    pub resolved_return: Option<Type>,
    pub is_method: bool,
    pub is_constructor: bool,
    /// Non-local identifiers referenced from inside this function.
    pub captured: IndexSet<String>,
}

impl FunctionSymbol {
    pub fn new(name: impl Into<String>, return_ann: Option<String>, is_method: bool) -> Self {
        let name = name.into();
        let is_constructor = name == "constructor";
        Self {
            name,
            params: Vec::new(),
            return_ann,
            resolved_return: None,
            is_method,
            is_constructor,
            captured: IndexSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSymbol {
    pub name: String,
    pub base_name: Option<String>,
    pub resolved_base: Option<Type>,
}

/// A named entity in some scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VarSymbol),
    Const(VarSymbol),
    Param(ParamSymbol),
    Field(FieldSymbol),
    Function(FunctionSymbol),
    Class(ClassSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(s) | Symbol::Const(s) => &s.name,
            Symbol::Param(s) => &s.name,
            Symbol::Field(s) => &s.name,
            Symbol::Function(s) => &s.name,
            Symbol::Class(s) => &s.name,
        }
    }

    /// Short tag used by the CLI symbol report.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Symbol::Variable(_) => "var",
            Symbol::Const(_) => "const",
            Symbol::Param(_) => "param",
            Symbol::Field(_) => "field",
            Symbol::Function(_) => "func",
            Symbol::Class(_) => "class",
        }
    }

    /// The type this symbol has when read as a value, if known.
    pub fn value_type(&self) -> Option<&Type> {
        match self {
            Symbol::Variable(s) | Symbol::Const(s) => s.resolved.as_ref(),
            Symbol::Param(s) => s.resolved.as_ref(),
            Symbol::Field(s) => s.resolved.as_ref(),
            Symbol::Function(_) | Symbol::Class(_) => None,
        }
    }

    /// Whether assignment through this symbol is allowed.
    pub fn is_mutable(&self) -> bool {
        match self {
            Symbol::Variable(_) | Symbol::Param(_) => true,
            Symbol::Const(_) => false,
            Symbol::Field(s) => s.mutable,
            Symbol::Function(_) | Symbol::Class(_) => false,
        }
    }
}
