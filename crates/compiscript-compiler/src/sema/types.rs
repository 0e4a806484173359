//! The Compiscript type algebra.
//!
//! Primitives are unit variants, so equality-by-identity holds trivially.
//! Arrays are invariant. The only implicit conversions are the
//! integer→float promotion and null→reference-like.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Boolean,
    Integer,
    Float,
    Str,
    Void,
    Null,
    Array { elem: Box<Type>, rank: u32 },
    Class { name: String },
    Function { params: Vec<Type>, ret: Box<Type> },
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => f.write_str("boolean"),
            Type::Integer => f.write_str("integer"),
            Type::Float => f.write_str("float"),
            Type::Str => f.write_str("string"),
            Type::Void => f.write_str("void"),
            Type::Null => f.write_str("null"),
            Type::Array { elem, rank } => {
                write!(f, "{elem}")?;
                for _ in 0..*rank {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            Type::Class { name } => f.write_str(name),
            Type::Function { params, ret } => {
                f.write_str("(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
        }
    }
}

impl Type {
    pub fn class(name: impl Into<String>) -> Type {
        Type::Class { name: name.into() }
    }

    /// Builds an array type, collapsing a nested array element into a higher
    /// rank so structurally equivalent types compare equal.
    pub fn array(elem: Type, rank: u32) -> Type {
        debug_assert!(rank >= 1);
        match elem {
            Type::Array {
                elem: inner,
                rank: inner_rank,
            } => Type::Array {
                elem: inner,
                rank: inner_rank + rank,
            },
            other => Type::Array {
                elem: Box::new(other),
                rank,
            },
        }
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Float)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Str)
    }

    /// Classes, arrays, and strings accept `null`.
    pub fn is_reference_like(&self) -> bool {
        matches!(self, Type::Class { .. } | Type::Array { .. } | Type::Str)
    }
}

/// A type-algebra failure, translated into a diagnostic code by the checker
/// (arity failures map to E202, everything else to operand/type codes).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("expected numeric operands, got {0} and {1}")]
    NotNumeric(Type, Type),

    #[error("logical operator requires boolean operands, got {0} and {1}")]
    LogicalRequiresBool(Type, Type),

    #[error("`!` requires a boolean operand, got {0}")]
    NotRequiresBool(Type),

    #[error("equality requires compatible operands, got {0} and {1}")]
    EqualityIncompatible(Type, Type),

    #[error("indexing requires an array, got {0}")]
    NotAnArray(Type),

    #[error("array index must be integer, got {0}")]
    IndexNotInteger(Type),

    #[error("expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("argument {index} incompatible: {got} is not assignable to {want}")]
    ArgMismatch { index: usize, got: Type, want: Type },

    #[error("operands of `+` must both be numeric or both string, got {0} and {1}")]
    AddMismatch(Type, Type),
}

/// Exact match, integer→float promotion, or null into a reference-like type.
pub fn is_assignable(src: &Type, dst: &Type) -> bool {
    if src == dst {
        return true;
    }
    if matches!(src, Type::Integer) && matches!(dst, Type::Float) {
        return true;
    }
    if matches!(src, Type::Null) && dst.is_reference_like() {
        return true;
    }
    false
}

pub fn unify_numeric(a: &Type, b: &Type) -> Result<Type, TypeError> {
    if !a.is_numeric() || !b.is_numeric() {
        return Err(TypeError::NotNumeric(a.clone(), b.clone()));
    }
    if matches!(a, Type::Float) || matches!(b, Type::Float) {
        Ok(Type::Float)
    } else {
        Ok(Type::Integer)
    }
}

/// `+`: string concatenation or numeric addition.
pub fn result_add(a: &Type, b: &Type) -> Result<Type, TypeError> {
    if a.is_string() && b.is_string() {
        return Ok(Type::Str);
    }
    unify_numeric(a, b).map_err(|_| TypeError::AddMismatch(a.clone(), b.clone()))
}

pub fn result_arith(a: &Type, b: &Type) -> Result<Type, TypeError> {
    unify_numeric(a, b)
}

pub fn result_logical(a: &Type, b: &Type) -> Result<Type, TypeError> {
    if a.is_boolean() && b.is_boolean() {
        Ok(Type::Boolean)
    } else {
        Err(TypeError::LogicalRequiresBool(a.clone(), b.clone()))
    }
}

pub fn result_not(t: &Type) -> Result<Type, TypeError> {
    if t.is_boolean() {
        Ok(Type::Boolean)
    } else {
        Err(TypeError::NotRequiresBool(t.clone()))
    }
}

pub fn result_relational(a: &Type, b: &Type) -> Result<Type, TypeError> {
    unify_numeric(a, b)?;
    Ok(Type::Boolean)
}

/// `==`/`!=`: identical types, or both numeric.
pub fn result_equality(a: &Type, b: &Type) -> Result<Type, TypeError> {
    if a == b || (a.is_numeric() && b.is_numeric()) {
        Ok(Type::Boolean)
    } else {
        Err(TypeError::EqualityIncompatible(a.clone(), b.clone()))
    }
}

/// Result of `array[index]`: rank drops by one, bottoming out at the element.
pub fn index_elem(array: &Type, index: &Type) -> Result<Type, TypeError> {
    let Type::Array { elem, rank } = array else {
        return Err(TypeError::NotAnArray(array.clone()));
    };
    if !matches!(index, Type::Integer) {
        return Err(TypeError::IndexNotInteger(index.clone()));
    }
    if *rank == 1 {
        Ok((**elem).clone())
    } else {
        Ok(Type::Array {
            elem: elem.clone(),
            rank: rank - 1,
        })
    }
}

/// Arity and per-argument assignability. `None` entries (unannotated
/// parameters or arguments whose type is already poisoned) are skipped.
pub fn check_call(args: &[Option<Type>], params: &[Option<Type>]) -> Result<(), TypeError> {
    if args.len() != params.len() {
        return Err(TypeError::Arity {
            expected: params.len(),
            got: args.len(),
        });
    }
    for (index, (arg, param)) in args.iter().zip(params).enumerate() {
        if let (Some(arg), Some(param)) = (arg, param)
            && !is_assignable(arg, param)
        {
            return Err(TypeError::ArgMismatch {
                index,
                got: arg.clone(),
                want: param.clone(),
            });
        }
    }
    Ok(())
}
