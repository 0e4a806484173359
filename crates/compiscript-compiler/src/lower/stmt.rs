//! Statement lowering: control flow normalized into labeled blocks.

use compiscript_tac::{BinOp, Instr, Operand};

use crate::parser::ast::{Block, Expr, Stmt, SwitchCase};

use super::context::{LowerCtx, LowerError};
use super::expr::{lower_assign_to, lower_expr, prepare_call};

pub fn lower_block(ctx: &mut LowerCtx, block: &Block) -> Result<(), LowerError> {
    lower_stmts(ctx, &block.statements)
}

pub fn lower_stmts(ctx: &mut LowerCtx, statements: &[Stmt]) -> Result<(), LowerError> {
    for stmt in statements {
        lower_stmt(ctx, stmt)?;
    }
    Ok(())
}

pub fn lower_stmt(ctx: &mut LowerCtx, stmt: &Stmt) -> Result<(), LowerError> {
    match stmt {
        Stmt::Block(block) => lower_block(ctx, block),

        // Nested declarations emit nothing here; functions and methods are
        // assembled at program level.
        Stmt::Function(_) | Stmt::Class(_) => Ok(()),

        Stmt::ExprStmt { expr, .. } => match expr {
            // Statement-position assignment and calls avoid dangling result
            // temps.
            Expr::Assign { target, value, .. } => {
                let value = lower_expr(ctx, value)?;
                lower_assign_to(ctx, target, value)
            }
            Expr::Call { callee, args, .. } => {
                let (func, args) = prepare_call(ctx, callee, args)?;
                ctx.emit(Instr::Call {
                    dst: None,
                    func,
                    args,
                })
            }
            other => lower_expr(ctx, other).map(|_| ()),
        },

        Stmt::Print { expr, .. } => {
            let value = lower_expr(ctx, expr)?;
            ctx.emit(Instr::Call {
                dst: None,
                func: "print".into(),
                args: vec![value],
            })
        }

        Stmt::VarDecl(decl) => match &decl.init {
            Some(init) => {
                let value = lower_expr(ctx, init)?;
                ctx.emit(Instr::Assign {
                    dst: Operand::name(decl.name.clone()),
                    src: value,
                })
            }
            None => Ok(()),
        },

        Stmt::Return { value, .. } => {
            let value = match value {
                Some(expr) => Some(lower_expr(ctx, expr)?),
                None => None,
            };
            ctx.emit(Instr::Return { value })
        }

        Stmt::If {
            cond,
            then_block,
            else_block,
            ..
        } => {
            let cond = lower_expr(ctx, cond)?;
            let l_then = ctx.new_label_hinted("then");
            // Without an else branch the else label doubles as the end label.
            let (l_else, l_end) = match else_block {
                Some(_) => {
                    let l_else = ctx.new_label_hinted("else");
                    let l_end = ctx.new_label_hinted("end");
                    (l_else, l_end)
                }
                None => {
                    let l_end = ctx.new_label_hinted("end");
                    (l_end.clone(), l_end)
                }
            };

            ctx.emit(Instr::IfGoto {
                cond,
                target: l_then.clone(),
            })?;
            ctx.emit(Instr::Goto {
                target: l_else.clone(),
            })?;

            ctx.start_block(l_then);
            lower_block(ctx, then_block)?;
            ctx.emit(Instr::Goto {
                target: l_end.clone(),
            })?;

            if let Some(else_block) = else_block {
                ctx.start_block(l_else);
                lower_block(ctx, else_block)?;
                ctx.emit(Instr::Goto {
                    target: l_end.clone(),
                })?;
            }

            ctx.start_block(l_end);
            Ok(())
        }

        Stmt::While { cond, body, .. } => {
            let l_head = ctx.new_label_hinted("while_head");
            let l_body = ctx.new_label_hinted("while_body");
            let l_end = ctx.new_label_hinted("while_end");

            ctx.emit(Instr::Goto {
                target: l_head.clone(),
            })?;
            ctx.start_block(l_head.clone());
            let cond = lower_expr(ctx, cond)?;
            ctx.emit(Instr::IfGoto {
                cond,
                target: l_body.clone(),
            })?;
            ctx.emit(Instr::Goto {
                target: l_end.clone(),
            })?;

            ctx.push_loop(l_end.clone(), l_head.clone());
            ctx.start_block(l_body);
            lower_block(ctx, body)?;
            ctx.emit(Instr::Goto { target: l_head })?;
            ctx.pop_loop();

            ctx.start_block(l_end);
            Ok(())
        }

        Stmt::DoWhile { body, cond, .. } => {
            let l_body = ctx.new_label_hinted("do_body");
            let l_head = ctx.new_label_hinted("do_head");
            let l_end = ctx.new_label_hinted("do_end");

            ctx.start_block(l_body.clone());
            ctx.push_loop(l_end.clone(), l_head.clone());
            lower_block(ctx, body)?;
            ctx.pop_loop();

            ctx.start_block(l_head);
            let cond = lower_expr(ctx, cond)?;
            ctx.emit(Instr::IfGoto {
                cond,
                target: l_body,
            })?;
            ctx.emit(Instr::Goto {
                target: l_end.clone(),
            })?;
            ctx.start_block(l_end);
            Ok(())
        }

        Stmt::For {
            init,
            cond,
            update,
            body,
            ..
        } => {
            if let Some(init) = init {
                lower_stmt(ctx, init)?;
            }

            let l_head = ctx.new_label_hinted("for_head");
            let l_body = ctx.new_label_hinted("for_body");
            let l_step = ctx.new_label_hinted("for_step");
            let l_end = ctx.new_label_hinted("for_end");

            ctx.emit(Instr::Goto {
                target: l_head.clone(),
            })?;
            ctx.start_block(l_head.clone());
            match cond {
                Some(cond) => {
                    let cond = lower_expr(ctx, cond)?;
                    ctx.emit(Instr::IfGoto {
                        cond,
                        target: l_body.clone(),
                    })?;
                    ctx.emit(Instr::Goto {
                        target: l_end.clone(),
                    })?;
                }
                // No condition: loop unconditionally.
                None => ctx.emit(Instr::Goto {
                    target: l_body.clone(),
                })?,
            }

            ctx.push_loop(l_end.clone(), l_step.clone());
            ctx.start_block(l_body);
            lower_block(ctx, body)?;
            ctx.emit(Instr::Goto {
                target: l_step.clone(),
            })?;
            ctx.pop_loop();

            ctx.start_block(l_step);
            if let Some(update) = update {
                match update {
                    Expr::Assign { target, value, .. } => {
                        let value = lower_expr(ctx, value)?;
                        lower_assign_to(ctx, target, value)?;
                    }
                    other => {
                        lower_expr(ctx, other)?;
                    }
                }
            }
            ctx.emit(Instr::Goto { target: l_head })?;

            ctx.start_block(l_end);
            Ok(())
        }

        Stmt::Foreach {
            var,
            iterable,
            body,
            ..
        } => lower_foreach(ctx, var, iterable, body),

        Stmt::Switch {
            cond,
            cases,
            default,
            ..
        } => lower_switch(ctx, cond, cases, default.as_deref()),

        Stmt::Break { .. } => {
            let target = ctx.break_target()?;
            ctx.emit(Instr::Goto { target })
        }

        Stmt::Continue { .. } => {
            let target = ctx.continue_target()?;
            ctx.emit(Instr::Goto { target })
        }

        Stmt::TryCatch { .. } => Err(LowerError::UnsupportedTryCatch),
    }
}

/// `foreach (v in iter) body` desugars to an index-driven while loop:
///
/// ```text
/// arr = iter; len = __len__(arr); i = 0;
/// while (i < len) { v = arr[i]; body; i = i + 1; }
/// ```
fn lower_foreach(
    ctx: &mut LowerCtx,
    var: &str,
    iterable: &Expr,
    body: &Block,
) -> Result<(), LowerError> {
    let arr = Operand::name(ctx.fresh_name("arr"));
    let len = Operand::name(ctx.fresh_name("len"));
    let i = Operand::name(ctx.fresh_name("i"));

    let iter_value = lower_expr(ctx, iterable)?;
    ctx.emit(Instr::Assign {
        dst: arr.clone(),
        src: iter_value,
    })?;

    let len_temp = ctx.new_temp();
    ctx.emit(Instr::Call {
        dst: Some(len_temp.clone()),
        func: "__len__".into(),
        args: vec![arr.clone()],
    })?;
    ctx.emit(Instr::Assign {
        dst: len.clone(),
        src: len_temp,
    })?;
    ctx.emit(Instr::Assign {
        dst: i.clone(),
        src: Operand::int(0),
    })?;

    let l_head = ctx.new_label_hinted("while_head");
    let l_body = ctx.new_label_hinted("while_body");
    let l_end = ctx.new_label_hinted("while_end");

    ctx.emit(Instr::Goto {
        target: l_head.clone(),
    })?;
    ctx.start_block(l_head.clone());
    let cond = ctx.new_temp();
    ctx.emit(Instr::Bin {
        dst: cond.clone(),
        op: BinOp::Lt,
        left: i.clone(),
        right: len,
    })?;
    ctx.emit(Instr::IfGoto {
        cond,
        target: l_body.clone(),
    })?;
    ctx.emit(Instr::Goto {
        target: l_end.clone(),
    })?;

    ctx.push_loop(l_end.clone(), l_head.clone());
    ctx.start_block(l_body);

    let element = ctx.new_temp();
    ctx.emit(Instr::Load {
        dst: element.clone(),
        array: arr,
        index: i.clone(),
    })?;
    ctx.emit(Instr::Assign {
        dst: Operand::name(var),
        src: element,
    })?;

    lower_block(ctx, body)?;

    let next = ctx.new_temp();
    ctx.emit(Instr::Bin {
        dst: next.clone(),
        op: BinOp::Add,
        left: i.clone(),
        right: Operand::int(1),
    })?;
    ctx.emit(Instr::Assign { dst: i, src: next })?;
    ctx.emit(Instr::Goto { target: l_head })?;
    ctx.pop_loop();

    ctx.start_block(l_end);
    Ok(())
}

/// Switch lowering: a comparison ladder into per-case blocks, no
/// fallthrough; every case body and the default jump to the end label.
fn lower_switch(
    ctx: &mut LowerCtx,
    cond: &Expr,
    cases: &[SwitchCase],
    default: Option<&[Stmt]>,
) -> Result<(), LowerError> {
    let cond = lower_expr(ctx, cond)?;

    // Case labels first, in order, then default, then end.
    let case_labels: Vec<_> = cases
        .iter()
        .map(|_| ctx.new_label_hinted("case"))
        .collect();
    let l_default = default.map(|_| ctx.new_label_hinted("switch_default"));
    let l_end = ctx.new_label_hinted("switch_end");

    for (label, case) in case_labels.iter().zip(cases) {
        let case_value = lower_expr(ctx, &case.expr)?;
        let t = ctx.new_temp();
        ctx.emit(Instr::Bin {
            dst: t.clone(),
            op: BinOp::Eq,
            left: cond.clone(),
            right: case_value,
        })?;
        ctx.emit(Instr::IfGoto {
            cond: t,
            target: label.clone(),
        })?;
    }
    ctx.emit(Instr::Goto {
        target: l_default.clone().unwrap_or_else(|| l_end.clone()),
    })?;

    for (label, case) in case_labels.into_iter().zip(cases) {
        ctx.start_block(label);
        lower_stmts(ctx, &case.body)?;
        ctx.emit(Instr::Goto {
            target: l_end.clone(),
        })?;
    }

    if let (Some(label), Some(default)) = (l_default, default) {
        ctx.start_block(label);
        lower_stmts(ctx, default)?;
        ctx.emit(Instr::Goto {
            target: l_end.clone(),
        })?;
    }

    ctx.start_block(l_end);
    Ok(())
}
