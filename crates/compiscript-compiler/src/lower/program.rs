//! Program assembly: one IR function per top-level function and per class
//! method (`Class::method`), plus a synthetic `main` wrapping loose
//! top-level statements, emitted last and only when such statements exist.

use compiscript_tac::{FrameBuilder, FrameLayout, Program, verify_program};
use indexmap::IndexMap;

use crate::parser::ast::{self, ClassMember, Stmt};

use super::context::{LowerCtx, LowerError};
use super::stmt::{lower_block, lower_stmt};

/// The lowered program plus the per-function frame layouts (informational
/// output for a back-end).
#[derive(Debug)]
pub struct LoweredProgram {
    pub program: Program,
    pub frames: IndexMap<String, FrameLayout>,
}

pub fn lower_program(ast: &ast::Program) -> Result<LoweredProgram, LowerError> {
    let mut ctx = LowerCtx::new();
    let mut frames = IndexMap::new();
    let mut loose: Vec<&Stmt> = Vec::new();

    for stmt in &ast.statements {
        match stmt {
            Stmt::Function(decl) => {
                let params: Vec<String> = decl.params.iter().map(|p| p.name.clone()).collect();
                ctx.begin_function(&decl.name, params);
                lower_block(&mut ctx, &decl.body)?;
                ctx.end_function();
                record_frame(&mut frames, &decl.name, &decl.params, &decl.body.statements);
            }
            Stmt::Class(class) => {
                for member in &class.members {
                    let ClassMember::Method(method) = member else {
                        continue;
                    };
                    let name = format!("{}::{}", class.name, method.name);
                    let params: Vec<String> =
                        method.params.iter().map(|p| p.name.clone()).collect();
                    ctx.begin_function(&name, params);
                    lower_block(&mut ctx, &method.body)?;
                    ctx.end_function();
                    record_frame(&mut frames, &name, &method.params, &method.body.statements);
                }
            }
            other => loose.push(other),
        }
    }

    if !loose.is_empty() {
        ctx.begin_function("main", Vec::new());
        for stmt in &loose {
            lower_stmt(&mut ctx, stmt)?;
        }
        ctx.end_function();
        let loose_stmts: Vec<Stmt> = loose.iter().map(|s| (*s).clone()).collect();
        record_frame(&mut frames, "main", &[], &loose_stmts);
    }

    verify_program(&ctx.program)?;
    Ok(LoweredProgram {
        program: ctx.program,
        frames,
    })
}

/// Seal a frame for a lowered function: params in declaration order, locals
/// harvested from the body's declarations (nested function bodies excluded).
fn record_frame(
    frames: &mut IndexMap<String, FrameLayout>,
    name: &str,
    params: &[ast::Param],
    body: &[Stmt],
) {
    let mut builder = FrameBuilder::new(name);
    for param in params {
        // Pass 1 already reported duplicate parameters; skip them here.
        let _ = builder.add_param(&param.name);
    }
    let mut locals = Vec::new();
    collect_locals(body, &mut locals);
    for local in locals {
        let _ = builder.add_local(local);
    }
    frames.insert(name.to_string(), builder.seal());
}

fn collect_locals(statements: &[Stmt], out: &mut Vec<String>) {
    for stmt in statements {
        match stmt {
            Stmt::VarDecl(decl) => {
                if !out.contains(&decl.name) {
                    out.push(decl.name.clone());
                }
            }
            Stmt::Block(block) => collect_locals(&block.statements, out),
            Stmt::If {
                then_block,
                else_block,
                ..
            } => {
                collect_locals(&then_block.statements, out);
                if let Some(else_block) = else_block {
                    collect_locals(&else_block.statements, out);
                }
            }
            Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => {
                collect_locals(&body.statements, out);
            }
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    collect_locals(std::slice::from_ref(init.as_ref()), out);
                }
                collect_locals(&body.statements, out);
            }
            Stmt::Foreach { var, body, .. } => {
                if !out.contains(var) {
                    out.push(var.clone());
                }
                collect_locals(&body.statements, out);
            }
            Stmt::Switch { cases, default, .. } => {
                for case in cases {
                    collect_locals(&case.body, out);
                }
                if let Some(default) = default {
                    collect_locals(default, out);
                }
            }
            Stmt::TryCatch {
                try_block,
                catch_block,
                ..
            } => {
                collect_locals(&try_block.statements, out);
                collect_locals(&catch_block.statements, out);
            }
            // Locals of nested functions live in their own frames.
            Stmt::Function(_) | Stmt::Class(_) => {}
            _ => {}
        }
    }
}

