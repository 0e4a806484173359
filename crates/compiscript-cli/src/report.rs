//! The JSON report consumed by editor tooling.
//!
//! Shape: `{ ok, errors: [{code, message, line, col}], symbols?, ir? }`.
//! A non-ok report always carries at least one error.

use compiscript_compiler::sema::{DeclTables, Symbol};
use compiscript_compiler::{Analysis, Code, LowerError};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    pub ok: bool,
    pub errors: Vec<ErrorEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<SymbolsReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ir: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEntry {
    pub code: Code,
    pub message: String,
    pub line: Option<u32>,
    pub col: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SymbolsReport {
    pub globals: Vec<GlobalEntry>,
    pub classes: IndexMap<String, Vec<MemberEntry>>,
    pub functions: IndexMap<String, FunctionEntry>,
}

#[derive(Debug, Serialize)]
pub struct GlobalEntry {
    pub name: String,
    pub kind: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemberEntry {
    pub name: String,
    pub kind: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FunctionEntry {
    pub params: Vec<ParamEntry>,
    #[serde(rename = "return")]
    pub return_type: Option<String>,
    pub captured: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ParamEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: Option<String>,
}

impl Report {
    pub fn build(analysis: &Analysis, include_symbols: bool) -> Self {
        let errors = analysis
            .diagnostics
            .iter()
            .map(|d| ErrorEntry {
                code: d.code,
                message: d.message.clone(),
                line: d.pos.map(|p| p.line),
                col: d.pos.map(|p| p.col),
            })
            .collect();
        Self {
            ok: analysis.is_ok(),
            errors,
            symbols: include_symbols.then(|| symbols(&analysis.tables)),
            ir: None,
        }
    }

    /// Internal lowering failures become one `E_IRGEN` error; the process
    /// keeps running.
    pub fn record_irgen_failure(&mut self, error: &LowerError) {
        self.ok = false;
        self.errors.push(ErrorEntry {
            code: Code::IrGen,
            message: format!("IR generation failed: {error}"),
            line: None,
            col: None,
        });
    }
}

pub fn symbols(tables: &DeclTables) -> SymbolsReport {
    let global = tables.global();

    let globals = tables
        .scopes
        .get(global)
        .symbols()
        .map(|(name, symbol)| match symbol {
            Symbol::Function(f) => {
                let mut captured: Vec<String> =
                    f.captured.iter().cloned().collect();
                captured.sort();
                GlobalEntry {
                    name: name.clone(),
                    kind: "func",
                    value_type: None,
                    ret: f.resolved_return.as_ref().map(|t| t.to_string()),
                    captured: Some(captured),
                    base: None,
                }
            }
            Symbol::Class(c) => GlobalEntry {
                name: name.clone(),
                kind: "class",
                value_type: None,
                ret: None,
                captured: None,
                base: c.base_name.clone(),
            },
            other => GlobalEntry {
                name: name.clone(),
                kind: other.kind_str(),
                value_type: other.value_type().map(|t| t.to_string()),
                ret: None,
                captured: None,
                base: None,
            },
        })
        .collect();

    let classes = tables
        .class_scopes
        .iter()
        .map(|(class_name, &scope)| {
            let members = tables
                .scopes
                .get(scope)
                .symbols()
                .filter_map(|(name, symbol)| match symbol {
                    Symbol::Field(f) => Some(MemberEntry {
                        name: name.clone(),
                        kind: "field",
                        value_type: f.resolved.as_ref().map(|t| t.to_string()),
                        mutable: Some(f.mutable),
                        ret: None,
                    }),
                    Symbol::Function(m) => Some(MemberEntry {
                        name: name.clone(),
                        kind: "method",
                        value_type: None,
                        mutable: None,
                        ret: m.resolved_return.as_ref().map(|t| t.to_string()),
                    }),
                    _ => None,
                })
                .collect();
            (class_name.clone(), members)
        })
        .collect();

    let functions = tables
        .function_scopes
        .iter()
        .map(|(key, &scope)| {
            let params = tables
                .scopes
                .get(scope)
                .symbols()
                .filter_map(|(name, symbol)| match symbol {
                    Symbol::Param(p) => Some(ParamEntry {
                        name: name.clone(),
                        value_type: p.resolved.as_ref().map(|t| t.to_string()),
                    }),
                    _ => None,
                })
                .collect();

            // Nested function scopes get re-parented under block scopes
            // during checking, so the owning symbol is found by walking the
            // chain rather than looking only at the direct parent.
            let data = tables.scopes.get(scope);
            let owner = data
                .parent
                .and_then(|parent| tables.scopes.resolve(parent, &data.name));
            let (return_type, captured) = match owner {
                Some(Symbol::Function(f)) => {
                    let mut captured: Vec<String> =
                        f.captured.iter().cloned().collect();
                    captured.sort();
                    (
                        f.resolved_return.as_ref().map(|t| t.to_string()),
                        captured,
                    )
                }
                _ => (None, Vec::new()),
            };

            (
                key.clone(),
                FunctionEntry {
                    params,
                    return_type,
                    captured,
                },
            )
        })
        .collect();

    SymbolsReport {
        globals,
        classes,
        functions,
    }
}
