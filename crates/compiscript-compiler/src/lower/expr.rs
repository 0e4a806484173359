//! Expression lowering: AST expression → operand.
//!
//! Constants and names pass through as operands; everything else computes
//! into a fresh temp. Method calls become `__mcall__<name>` with the
//! receiver as first argument; array literals become one `__new_array` call
//! plus one `Store` per element.

use compiscript_tac::{Instr, Operand};

use crate::parser::ast::Expr;

use super::context::{LowerCtx, LowerError};

pub fn lower_expr(ctx: &mut LowerCtx, expr: &Expr) -> Result<Operand, LowerError> {
    match expr {
        Expr::Int { value, .. } => Ok(Operand::int(*value)),
        Expr::Float { value, .. } => Ok(Operand::float(*value)),
        Expr::Str { value, .. } => Ok(Operand::str(value.clone())),
        Expr::Bool { value, .. } => Ok(Operand::bool(*value)),
        Expr::Null { .. } => Ok(Operand::null()),
        Expr::Ident { name, .. } => Ok(Operand::name(name.clone())),
        Expr::This { .. } => Ok(Operand::name("this")),

        Expr::Array { elements, .. } => {
            let dst = ctx.new_temp();
            ctx.emit(Instr::Call {
                dst: Some(dst.clone()),
                func: "__new_array".into(),
                args: vec![Operand::int(elements.len() as i64)],
            })?;
            for (i, element) in elements.iter().enumerate() {
                let value = lower_expr(ctx, element)?;
                ctx.emit(Instr::Store {
                    array: dst.clone(),
                    index: Operand::int(i as i64),
                    value,
                })?;
            }
            Ok(dst)
        }

        Expr::Unary { op, expr, .. } => {
            let value = lower_expr(ctx, expr)?;
            let dst = ctx.new_temp();
            ctx.emit(Instr::Unary {
                dst: dst.clone(),
                op: *op,
                value,
            })?;
            Ok(dst)
        }

        Expr::Binary {
            op, left, right, ..
        } => {
            let left = lower_expr(ctx, left)?;
            let right = lower_expr(ctx, right)?;
            let dst = ctx.new_temp();
            ctx.emit(Instr::Bin {
                dst: dst.clone(),
                op: *op,
                left,
                right,
            })?;
            Ok(dst)
        }

        Expr::Ternary {
            cond, then, other, ..
        } => {
            let cond = lower_expr(ctx, cond)?;
            let l_then = ctx.new_label_hinted("then");
            let l_else = ctx.new_label_hinted("else");
            let l_end = ctx.new_label_hinted("end");
            let dst = ctx.new_temp();

            ctx.emit(Instr::IfGoto {
                cond,
                target: l_then.clone(),
            })?;
            ctx.emit(Instr::Goto {
                target: l_else.clone(),
            })?;

            ctx.start_block(l_then);
            let then_value = lower_expr(ctx, then)?;
            ctx.emit(Instr::Assign {
                dst: dst.clone(),
                src: then_value,
            })?;
            ctx.emit(Instr::Goto {
                target: l_end.clone(),
            })?;

            ctx.start_block(l_else);
            let other_value = lower_expr(ctx, other)?;
            ctx.emit(Instr::Assign {
                dst: dst.clone(),
                src: other_value,
            })?;
            ctx.emit(Instr::Goto {
                target: l_end.clone(),
            })?;

            ctx.start_block(l_end);
            Ok(dst)
        }

        Expr::Index { array, index, .. } => {
            let array = lower_expr(ctx, array)?;
            let index = lower_expr(ctx, index)?;
            let dst = ctx.new_temp();
            ctx.emit(Instr::Load {
                dst: dst.clone(),
                array,
                index,
            })?;
            Ok(dst)
        }

        Expr::Prop { obj, prop, .. } => {
            let obj = lower_expr(ctx, obj)?;
            let dst = ctx.new_temp();
            ctx.emit(Instr::GetProp {
                dst: dst.clone(),
                obj,
                prop: prop.clone(),
            })?;
            Ok(dst)
        }

        Expr::New {
            class_name, args, ..
        } => {
            let args = lower_args(ctx, args)?;
            let dst = ctx.new_temp();
            ctx.emit(Instr::NewObject {
                dst: dst.clone(),
                class_name: class_name.clone(),
                args,
            })?;
            Ok(dst)
        }

        Expr::Call { callee, args, .. } => {
            let (func, args) = prepare_call(ctx, callee, args)?;
            let dst = ctx.new_temp();
            ctx.emit(Instr::Call {
                dst: Some(dst.clone()),
                func,
                args,
            })?;
            Ok(dst)
        }

        // Assignment in expression position: perform the store, yield the
        // value.
        Expr::Assign { target, value, .. } => {
            let value = lower_expr(ctx, value)?;
            lower_assign_to(ctx, target, value.clone())?;
            Ok(value)
        }
    }
}

/// Lower a call's callee and arguments. Direct calls keep their name;
/// method calls go through the `__mcall__` convention with the receiver
/// prepended.
pub fn prepare_call(
    ctx: &mut LowerCtx,
    callee: &Expr,
    args: &[Expr],
) -> Result<(String, Vec<Operand>), LowerError> {
    match callee {
        Expr::Ident { name, .. } => Ok((name.clone(), lower_args(ctx, args)?)),
        Expr::Prop { obj, prop, .. } => {
            let receiver = lower_expr(ctx, obj)?;
            let mut all_args = vec![receiver];
            all_args.extend(lower_args(ctx, args)?);
            Ok((format!("__mcall__{prop}"), all_args))
        }
        _ => Err(LowerError::UnsupportedCallee),
    }
}

/// Store a computed value into an assignable target.
pub fn lower_assign_to(
    ctx: &mut LowerCtx,
    target: &Expr,
    value: Operand,
) -> Result<(), LowerError> {
    match target {
        Expr::Ident { name, .. } => ctx.emit(Instr::Assign {
            dst: Operand::name(name.clone()),
            src: value,
        }),
        Expr::Prop { obj, prop, .. } => {
            let obj = lower_expr(ctx, obj)?;
            ctx.emit(Instr::SetProp {
                obj,
                prop: prop.clone(),
                value,
            })
        }
        Expr::Index { array, index, .. } => {
            let array = lower_expr(ctx, array)?;
            let index = lower_expr(ctx, index)?;
            ctx.emit(Instr::Store {
                array,
                index,
                value,
            })
        }
        // The type checker rejects other targets before lowering runs.
        _ => Err(LowerError::UnsupportedAssignTarget),
    }
}

fn lower_args(ctx: &mut LowerCtx, args: &[Expr]) -> Result<Vec<Operand>, LowerError> {
    args.iter().map(|a| lower_expr(ctx, a)).collect()
}
