//! Pass 2: type linking.
//!
//! Resolves every annotation string collected by pass 1 into a [`Type`] and
//! attaches it to the owning symbol. Unknown names produce E120 and a
//! best-effort placeholder class type so pass 3 can keep going.

use crate::diagnostics::{Code, Diagnostics};
use crate::source::Pos;

use super::collect::DeclTables;
use super::scope::{ScopeArena, ScopeId};
use super::symbol::Symbol;
use super::types::Type;

pub fn link(tables: &mut DeclTables, diagnostics: &mut Diagnostics) {
    link_globals(tables, diagnostics);
    link_classes(tables, diagnostics);
    link_functions(tables, diagnostics);
}

/// Resolve one annotation string: trailing `[]` pairs give the array rank,
/// the rest is a primitive name or a declared class.
pub(crate) fn parse_type_str(
    scopes: &ScopeArena,
    diagnostics: &mut Diagnostics,
    annotation: &str,
    pos: Option<Pos>,
) -> Type {
    let mut base = annotation;
    let mut rank = 0u32;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
        rank += 1;
    }

    let ty = match base {
        "boolean" => Type::Boolean,
        "integer" => Type::Integer,
        "float" => Type::Float,
        "string" => Type::Str,
        "void" => Type::Void,
        name => match scopes.resolve(scopes.global(), name) {
            Some(Symbol::Class(_)) => Type::class(name),
            _ => {
                diagnostics.error(Code::UnknownType, format!("unknown type `{name}`"), pos);
                Type::class(name)
            }
        },
    };

    if rank > 0 { Type::array(ty, rank) } else { ty }
}

/// Absent return annotation means void.
pub(crate) fn resolve_return(
    scopes: &ScopeArena,
    diagnostics: &mut Diagnostics,
    annotation: Option<&str>,
    pos: Option<Pos>,
) -> Type {
    match annotation {
        None => Type::Void,
        Some(ann) => parse_type_str(scopes, diagnostics, ann, pos),
    }
}

enum Slot {
    Value,
    Return,
}

fn link_globals(tables: &mut DeclTables, diagnostics: &mut Diagnostics) {
    let global = tables.scopes.global();
    link_value_symbols(&mut tables.scopes, diagnostics, global);

    let classes: Vec<(String, Option<String>)> = tables
        .scopes
        .get(global)
        .symbols()
        .filter_map(|(name, sym)| match sym {
            Symbol::Class(c) => Some((name.clone(), c.base_name.clone())),
            _ => None,
        })
        .collect();

    for (name, base) in classes {
        let Some(base) = base else { continue };
        let pos = tables.class_positions.get(&name).copied();
        let resolved = matches!(
            tables.scopes.resolve(global, &base),
            Some(Symbol::Class(_))
        );
        if !resolved {
            diagnostics.error(
                Code::UnknownType,
                format!("unknown base class `{base}`"),
                pos,
            );
            continue;
        }
        if let Some(Symbol::Class(c)) = tables.scopes.symbol_mut(global, &name) {
            c.resolved_base = Some(Type::class(base));
        }
    }
}

fn link_classes(tables: &mut DeclTables, diagnostics: &mut Diagnostics) {
    let scopes: Vec<ScopeId> = tables.class_scopes.values().copied().collect();
    for scope in scopes {
        link_value_symbols(&mut tables.scopes, diagnostics, scope);
    }
}

fn link_functions(tables: &mut DeclTables, diagnostics: &mut Diagnostics) {
    let scopes: Vec<ScopeId> = tables.function_scopes.values().copied().collect();
    for fn_scope in scopes {
        link_value_symbols(&mut tables.scopes, diagnostics, fn_scope);

        // The function's own symbol lives in the parent scope. Symbols
        // already linked through their owning scope are left alone so E120
        // is not reported twice for one annotation.
        let data = tables.scopes.get(fn_scope);
        let name = data.name.clone();
        let Some(parent) = data.parent else { continue };
        let return_ann = match tables.scopes.resolve_local(parent, &name) {
            Some(Symbol::Function(f)) if f.resolved_return.is_none() => f.return_ann.clone(),
            _ => continue,
        };
        let ty = resolve_return(&tables.scopes, diagnostics, return_ann.as_deref(), None);
        if let Some(Symbol::Function(f)) = tables.scopes.symbol_mut(parent, &name) {
            f.resolved_return = Some(ty);
        }
    }
}

/// Resolve annotations on every value symbol (variable, const, field,
/// param) declared directly in `scope`, and return annotations of function
/// symbols declared there.
fn link_value_symbols(scopes: &mut ScopeArena, diagnostics: &mut Diagnostics, scope: ScopeId) {
    let work: Vec<(String, Option<String>, Slot)> = scopes
        .get(scope)
        .symbols()
        .filter_map(|(name, sym)| match sym {
            Symbol::Variable(v) | Symbol::Const(v) => v
                .type_ann
                .clone()
                .map(|ann| (name.clone(), Some(ann), Slot::Value)),
            Symbol::Param(p) => p
                .type_ann
                .clone()
                .map(|ann| (name.clone(), Some(ann), Slot::Value)),
            Symbol::Field(f) => f
                .type_ann
                .clone()
                .map(|ann| (name.clone(), Some(ann), Slot::Value)),
            Symbol::Function(f) => Some((name.clone(), f.return_ann.clone(), Slot::Return)),
            Symbol::Class(_) => None,
        })
        .collect();

    for (name, ann, slot) in work {
        match slot {
            Slot::Value => {
                let ann = ann.expect("value slots always carry an annotation");
                let ty = parse_type_str(scopes, diagnostics, &ann, None);
                match scopes.symbol_mut(scope, &name) {
                    Some(Symbol::Variable(v) | Symbol::Const(v)) => v.resolved = Some(ty),
                    Some(Symbol::Param(p)) => p.resolved = Some(ty),
                    Some(Symbol::Field(f)) => f.resolved = Some(ty),
                    _ => {}
                }
            }
            Slot::Return => {
                let ty = resolve_return(scopes, diagnostics, ann.as_deref(), None);
                if let Some(Symbol::Function(f)) = scopes.symbol_mut(scope, &name) {
                    f.resolved_return = Some(ty);
                }
            }
        }
    }
}
