//! Pass 3: flow-sensitive type and usage checking.
//!
//! Walks the AST with the scope tree from pass 1 and the types from pass 2.
//! Statement visitors return a "definitely returns" flag used for the
//! missing-return and dead-code analyses; the predicate is conservative:
//! loops and switch never count as terminating.

use std::collections::HashSet;

use compiscript_tac::{BinOp, UnOp};

use crate::diagnostics::{Code, Diagnostics};
use crate::parser::ast::{Block, ClassDecl, Expr, FunctionDecl, Program, Stmt, SwitchCase, VarDecl};
use crate::source::Pos;

use super::collect::DeclTables;
use super::link::parse_type_str;
use super::scope::{ScopeId, ScopeKind};
use super::symbol::{Symbol, VarSymbol};
use super::types::{self, Type, TypeError, is_assignable};

pub fn check(program: &Program, tables: &mut DeclTables, diagnostics: &mut Diagnostics) {
    let global = tables.global();
    let mut checker = Checker {
        diagnostics,
        tables,
        stack: vec![global],
        current_class: None,
        current_fn: None,
        loop_depth: 0,
    };
    for stmt in &program.statements {
        checker.check_stmt(stmt);
    }
}

/// The function whose body is being checked.
struct FnCtx {
    name: String,
    /// Scope holding the function's own symbol (captures are recorded there).
    sym_scope: ScopeId,
    ret: Type,
}

struct Checker<'d> {
    diagnostics: &'d mut Diagnostics,
    tables: &'d mut DeclTables,
    stack: Vec<ScopeId>,
    current_class: Option<String>,
    current_fn: Option<FnCtx>,
    loop_depth: u32,
}

impl Checker<'_> {
    fn scope(&self) -> ScopeId {
        *self.stack.last().expect("scope stack never empty")
    }

    fn error(&mut self, code: Code, message: impl Into<String>, pos: impl Into<Option<Pos>>) {
        self.diagnostics.error(code, message, pos);
    }

    fn parse_ann(&mut self, annotation: &str, pos: Pos) -> Type {
        parse_type_str(&self.tables.scopes, self.diagnostics, annotation, Some(pos))
    }

    fn require_boolean(&mut self, t: &Type, pos: Pos) {
        if !t.is_boolean() {
            self.error(
                Code::CondNotBool,
                format!("condition must be boolean, got {t}"),
                pos,
            );
        }
    }

    /// Innermost function scope on the stack, if any.
    fn current_function_scope(&self) -> Option<ScopeId> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|&id| self.tables.scopes.kind(id) == ScopeKind::Function)
    }

    /// Names of the function scopes on the stack, outermost first.
    fn function_path(&self) -> Vec<String> {
        self.stack
            .iter()
            .filter(|&&id| self.tables.scopes.kind(id) == ScopeKind::Function)
            .map(|&id| self.tables.scopes.get(id).name.clone())
            .collect()
    }

    /// The key the declaration collector used for a function declared right
    /// here.
    fn fn_key_for_current(&self, name: &str) -> String {
        let mut parts = self.function_path();
        parts.push(name.to_string());
        match &self.current_class {
            Some(class) => format!("{class}::{}", parts.join("::")),
            None => format!("::{}", parts.join("::")),
        }
    }

    /// The collector's key for a function symbol found in `decl_scope`.
    fn qualified_key_from_scope(&self, decl_scope: ScopeId, name: &str) -> String {
        let mut class = None;
        let mut parts: Vec<String> = Vec::new();
        let mut current = Some(decl_scope);
        while let Some(id) = current {
            let scope = self.tables.scopes.get(id);
            match scope.kind {
                ScopeKind::Function => parts.push(scope.name.clone()),
                ScopeKind::Class => class = Some(scope.name.clone()),
                _ => {}
            }
            current = scope.parent;
        }
        parts.reverse();
        parts.push(name.to_string());
        match class {
            Some(class) => format!("{class}::{}", parts.join("::")),
            None => format!("::{}", parts.join("::")),
        }
    }

    /// Records a capture when a value is resolved from an enclosing
    /// function's scope.
    fn maybe_capture(&mut self, name: &str, decl_scope: ScopeId) {
        let Some(fc) = &self.current_fn else { return };
        if self.tables.scopes.kind(decl_scope) != ScopeKind::Function {
            return;
        }
        let Some(active) = self.current_function_scope() else {
            return;
        };
        if decl_scope == active {
            return;
        }
        let (sym_scope, fn_name) = (fc.sym_scope, fc.name.clone());
        if let Some(Symbol::Function(f)) = self.tables.scopes.symbol_mut(sym_scope, &fn_name) {
            f.captured.insert(name.to_string());
        }
    }

    /// Member lookup up the inheritance chain. Returns the symbol and the
    /// class that defines it. The visited guard keeps reported inheritance
    /// cycles from looping here.
    fn member_lookup(&self, class_name: &str, member: &str) -> Option<(Symbol, String)> {
        let global = self.tables.global();
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = class_name.to_string();
        loop {
            if !visited.insert(current.clone()) {
                return None;
            }
            if let Some(&class_scope) = self.tables.class_scopes.get(&current)
                && let Some(symbol) = self.tables.scopes.resolve_local(class_scope, member)
            {
                return Some((symbol.clone(), current));
            }
            match self.tables.scopes.resolve(global, &current) {
                Some(Symbol::Class(c)) => match &c.base_name {
                    Some(base) => current = base.clone(),
                    None => return None,
                },
                _ => return None,
            }
        }
    }

    /// Parameter types of a function, looked up through its scope.
    fn fn_param_types(&self, key: &str, param_names: &[String]) -> Vec<Option<Type>> {
        match self.tables.function_scopes.get(key) {
            Some(&fn_scope) => param_names
                .iter()
                .map(|p| {
                    self.tables
                        .scopes
                        .resolve_local(fn_scope, p)
                        .and_then(|s| s.value_type().cloned())
                })
                .collect(),
            None => vec![None; param_names.len()],
        }
    }

    fn report_call_error(&mut self, error: TypeError, context: Option<&str>, pos: Pos) {
        let code = match error {
            TypeError::Arity { .. } => Code::CallArity,
            _ => Code::OpTypes,
        };
        let message = match context {
            Some(context) => format!("{context}: {error}"),
            None => error.to_string(),
        };
        self.error(code, message, pos);
    }

    fn type_of_symbol(symbol: &Symbol) -> Option<Type> {
        match symbol {
            Symbol::Class(c) => Some(Type::class(&c.name)),
            Symbol::Function(_) => None,
            other => other.value_type().cloned(),
        }
    }

    // ===== Blocks and statements =====

    fn check_block(&mut self, block: &Block) -> bool {
        let parent = self.scope();
        let block_scope = self
            .tables
            .scopes
            .alloc("{block}", ScopeKind::Block, parent);
        self.stack.push(block_scope);
        let must_return = self.check_stmts(&block.statements);
        self.stack.pop();
        must_return
    }

    /// Sequential flow: once a statement definitely returns, everything
    /// after it is dead.
    fn check_stmts(&mut self, statements: &[Stmt]) -> bool {
        let mut must_return = false;
        for stmt in statements {
            if must_return {
                self.error(
                    Code::DeadCode,
                    "unreachable code after return/break/continue",
                    stmt.pos(),
                );
                continue;
            }
            if self.check_stmt(stmt) {
                must_return = true;
            }
        }
        must_return
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Block(block) => self.check_block(block),
            Stmt::VarDecl(decl) => {
                self.check_var_decl(decl);
                false
            }
            Stmt::ExprStmt { expr, .. } | Stmt::Print { expr, .. } => {
                self.check_expr(expr);
                false
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                if let Some(t) = self.check_expr(cond) {
                    self.require_boolean(&t, cond.pos());
                }
                let then_returns = self.check_block(then_block);
                let else_returns = match else_block {
                    Some(block) => self.check_block(block),
                    None => false,
                };
                then_returns && else_returns
            }
            Stmt::While { cond, body, .. } => {
                if let Some(t) = self.check_expr(cond) {
                    self.require_boolean(&t, cond.pos());
                }
                self.loop_depth += 1;
                self.check_block(body);
                self.loop_depth -= 1;
                false
            }
            Stmt::DoWhile { body, cond, .. } => {
                self.loop_depth += 1;
                self.check_block(body);
                self.loop_depth -= 1;
                if let Some(t) = self.check_expr(cond) {
                    self.require_boolean(&t, cond.pos());
                }
                false
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                if let Some(cond) = cond
                    && let Some(t) = self.check_expr(cond)
                {
                    self.require_boolean(&t, cond.pos());
                }
                if let Some(update) = update {
                    self.check_expr(update);
                }
                self.loop_depth += 1;
                self.check_block(body);
                self.loop_depth -= 1;
                false
            }
            Stmt::Foreach {
                var,
                iterable,
                body,
                ..
            } => {
                let elem = match self.check_expr(iterable) {
                    Some(Type::Array { elem, rank }) => Some(if rank == 1 {
                        *elem
                    } else {
                        Type::Array {
                            elem,
                            rank: rank - 1,
                        }
                    }),
                    Some(other) => {
                        self.error(
                            Code::OpTypes,
                            format!("foreach requires an array, got {other}"),
                            iterable.pos(),
                        );
                        None
                    }
                    None => None,
                };
                // The iterator lives in the enclosing scope; foreach adds no
                // scope of its own beyond the body block.
                let enclosing = self.scope();
                self.tables.scopes.declare(
                    enclosing,
                    Symbol::Variable(VarSymbol {
                        name: var.clone(),
                        type_ann: None,
                        resolved: elem.clone(),
                    }),
                );
                if elem.is_some()
                    && let Some(Symbol::Variable(v)) =
                        self.tables.scopes.resolve_mut(enclosing, var)
                {
                    v.resolved = elem;
                }
                self.loop_depth += 1;
                self.check_block(body);
                self.loop_depth -= 1;
                false
            }
            Stmt::Switch {
                cond,
                cases,
                default,
                ..
            } => {
                self.check_switch(cond, cases, default.as_deref());
                false
            }
            Stmt::Break { pos } => {
                if self.loop_depth == 0 {
                    self.error(Code::BadBreakContinue, "`break` outside of a loop", *pos);
                }
                true
            }
            Stmt::Continue { pos } => {
                if self.loop_depth == 0 {
                    self.error(
                        Code::BadBreakContinue,
                        "`continue` outside of a loop",
                        *pos,
                    );
                }
                true
            }
            Stmt::Return { value, pos } => self.check_return(value.as_ref(), *pos),
            Stmt::TryCatch {
                try_block,
                err_name,
                catch_block,
                ..
            } => {
                self.check_block(try_block);
                let parent = self.scope();
                let catch_scope = self
                    .tables
                    .scopes
                    .alloc("{catch}", ScopeKind::Block, parent);
                self.stack.push(catch_scope);
                self.tables.scopes.declare(
                    catch_scope,
                    Symbol::Variable(VarSymbol::new(err_name, None)),
                );
                self.check_block(catch_block);
                self.stack.pop();
                false
            }
            Stmt::Function(decl) => {
                self.check_function_decl(decl);
                false
            }
            Stmt::Class(decl) => {
                self.check_class_decl(decl);
                false
            }
        }
    }

    fn check_var_decl(&mut self, decl: &VarDecl) {
        let at_top = matches!(
            self.tables.scopes.kind(self.scope()),
            ScopeKind::Global | ScopeKind::Class
        );
        if !at_top {
            let scope = self.scope();
            let sym = VarSymbol::new(&decl.name, decl.type_ann.clone());
            let symbol = if decl.is_const {
                Symbol::Const(sym)
            } else {
                Symbol::Variable(sym)
            };
            if !self.tables.scopes.declare(scope, symbol) {
                self.error(
                    Code::DuplicateId,
                    format!("duplicate identifier `{}`", decl.name),
                    decl.pos,
                );
            }
        }

        // Top-level annotations were already resolved by the linker; parsing
        // them again would duplicate E120.
        let annotated = if at_top {
            self.tables
                .scopes
                .resolve(self.scope(), &decl.name)
                .and_then(|s| s.value_type().cloned())
        } else {
            decl.type_ann
                .as_ref()
                .map(|ann| self.parse_ann(ann, decl.pos))
        };
        let init_type = decl.init.as_ref().and_then(|e| self.check_expr(e));

        if let (Some(dst), Some(val), Some(init)) = (&annotated, &init_type, &decl.init)
            && !is_assignable(val, dst)
        {
            self.error(
                Code::AssignIncompat,
                format!("cannot assign {val} to {dst}"),
                init.pos(),
            );
        }

        // Annotated type wins; otherwise infer from the initializer.
        let resolved = annotated.or(init_type);
        let scope = self.scope();
        if resolved.is_some()
            && let Some(symbol) = self.tables.scopes.resolve_mut(scope, &decl.name)
        {
            match symbol {
                Symbol::Variable(v) | Symbol::Const(v) => v.resolved = resolved,
                Symbol::Field(f) => f.resolved = resolved,
                _ => {}
            }
        }
    }

    fn check_return(&mut self, value: Option<&Expr>, pos: Pos) -> bool {
        let Some(fc) = &self.current_fn else {
            self.error(Code::ReturnOutside, "`return` outside of a function", pos);
            return true;
        };
        let expected = fc.ret.clone();
        match value {
            Some(expr) => {
                let value_type = self.check_expr(expr);
                if expected == Type::Void {
                    self.error(
                        Code::OpTypes,
                        "void function must not return a value",
                        pos,
                    );
                } else if let Some(vt) = value_type
                    && !is_assignable(&vt, &expected)
                {
                    self.error(
                        Code::AssignIncompat,
                        format!("return type {vt} is not assignable to {expected}"),
                        expr.pos(),
                    );
                }
            }
            None => {
                if expected != Type::Void {
                    self.error(
                        Code::MissingReturn,
                        format!("expected a return value of type {expected}"),
                        pos,
                    );
                }
            }
        }
        true
    }

    fn check_switch(&mut self, cond: &Expr, cases: &[SwitchCase], default: Option<&[Stmt]>) {
        let cond_type = self.check_expr(cond);

        // Scalar switch: boolean or string. Anything else records both a
        // condition diagnostic and an operand diagnostic, because downstream
        // consumers categorize them differently.
        let scalar = match &cond_type {
            Some(t) if t.is_boolean() || t.is_string() => Some(t.clone()),
            Some(t) => {
                self.error(
                    Code::CondNotBool,
                    format!("switch requires a `boolean` condition, got {t}"),
                    cond.pos(),
                );
                self.error(
                    Code::OpTypes,
                    format!("switch requires a `string` condition, got {t}"),
                    cond.pos(),
                );
                None
            }
            None => None,
        };

        let mut seen_labels: HashSet<String> = HashSet::new();
        for case in cases {
            let label_type = self.check_expr(&case.expr);
            if let (Some(want), Some(got)) = (&scalar, &label_type)
                && got != want
            {
                self.error(
                    Code::OpTypes,
                    format!("case label must be `{want}`, got {got}"),
                    case.expr.pos(),
                );
            }
            if let Expr::Str { value, .. } = &case.expr
                && !seen_labels.insert(value.clone())
            {
                self.error(
                    Code::DuplicateId,
                    format!("duplicate case label \"{value}\""),
                    case.expr.pos(),
                );
            }
            self.check_stmts(&case.body);
        }
        if let Some(default) = default {
            self.check_stmts(default);
        }
    }

    fn check_function_decl(&mut self, decl: &FunctionDecl) {
        let key = self.fn_key_for_current(&decl.name);
        let Some(&fn_scope) = self.tables.function_scopes.get(&key) else {
            return;
        };

        // Nested functions were collected under their outer function scope;
        // hang them off the block scope that lexically contains them now.
        let lexical_parent = self.scope();
        if self.tables.scopes.get(fn_scope).parent != Some(lexical_parent) {
            self.tables.scopes.set_parent(fn_scope, lexical_parent);
        }

        let (ret, sym_scope) = match self
            .tables
            .scopes
            .resolve_with_scope(self.scope(), &decl.name)
        {
            Some((Symbol::Function(f), scope)) => (
                f.resolved_return.clone().unwrap_or(Type::Void),
                scope,
            ),
            _ => (Type::Void, self.scope()),
        };

        let previous = self.current_fn.replace(FnCtx {
            name: decl.name.clone(),
            sym_scope,
            ret: ret.clone(),
        });

        self.stack.push(fn_scope);
        let must_return = self.check_block(&decl.body);
        self.stack.pop();

        if ret != Type::Void && !must_return {
            self.error(
                Code::MissingReturn,
                format!("not all paths return a value of type {ret}"),
                decl.pos,
            );
        }
        self.current_fn = previous;
    }

    fn check_class_decl(&mut self, decl: &ClassDecl) {
        let global = self.tables.global();
        let previous = self.current_class.take();
        self.current_class = match self.tables.scopes.resolve(global, &decl.name) {
            Some(Symbol::Class(_)) => Some(decl.name.clone()),
            _ => None,
        };

        if let Some(&class_scope) = self.tables.class_scopes.get(&decl.name) {
            self.stack.push(class_scope);
            // Field signatures are settled by passes 1 and 2; only method
            // bodies need checking.
            for member in &decl.members {
                if let crate::parser::ast::ClassMember::Method(method) = member {
                    self.check_function_decl(method);
                }
            }
            self.stack.pop();
        }
        self.current_class = previous;
    }

    // ===== Expressions =====

    fn check_expr(&mut self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::Int { .. } => Some(Type::Integer),
            Expr::Float { .. } => Some(Type::Float),
            Expr::Str { .. } => Some(Type::Str),
            Expr::Bool { .. } => Some(Type::Boolean),
            Expr::Null { .. } => Some(Type::Null),
            Expr::Array { elements, pos } => self.check_array_literal(elements, *pos),
            Expr::Ident { name, pos } => self.check_ident(name, *pos),
            Expr::This { pos } => match &self.current_class {
                Some(class) => Some(Type::class(class)),
                None => {
                    self.error(
                        Code::ThisContext,
                        "`this` can only be used inside class methods",
                        *pos,
                    );
                    None
                }
            },
            Expr::New {
                class_name,
                args,
                pos,
            } => self.check_new(class_name, args, *pos),
            Expr::Call { callee, args, pos } => self.check_call_expr(callee, args, *pos),
            Expr::Index {
                array,
                index,
                pos,
            } => {
                let array_type = self.check_expr(array);
                let index_type = self.check_expr(index);
                let (Some(at), Some(it)) = (array_type, index_type) else {
                    return None;
                };
                match types::index_elem(&at, &it) {
                    Ok(t) => Some(t),
                    Err(_) => {
                        self.error(
                            Code::IndexInvalid,
                            format!("invalid indexing of {at} with index {it}"),
                            *pos,
                        );
                        None
                    }
                }
            }
            Expr::Prop { obj, prop, pos } => self.check_prop_read(obj, prop, *pos),
            Expr::Unary { op, expr, pos } => {
                let operand = self.check_expr(expr)?;
                match op {
                    UnOp::Not => {
                        if let Err(e) = types::result_not(&operand) {
                            self.error(Code::OpTypes, e.to_string(), *pos);
                        }
                        Some(Type::Boolean)
                    }
                    UnOp::Neg => {
                        if !operand.is_numeric() {
                            self.error(
                                Code::OpTypes,
                                format!("operator `-` requires a numeric operand, got {operand}"),
                                *pos,
                            );
                        }
                        Some(operand)
                    }
                }
            }
            Expr::Binary {
                op,
                left,
                right,
                pos,
            } => {
                let lt = self.check_expr(left);
                let rt = self.check_expr(right);
                let (Some(lt), Some(rt)) = (lt, rt) else {
                    return None;
                };
                let result = match op {
                    BinOp::Add => types::result_add(&lt, &rt),
                    BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                        types::result_arith(&lt, &rt)
                    }
                    BinOp::And | BinOp::Or => types::result_logical(&lt, &rt),
                    BinOp::Eq | BinOp::Ne => types::result_equality(&lt, &rt),
                    BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                        types::result_relational(&lt, &rt)
                    }
                };
                match result {
                    Ok(t) => Some(t),
                    Err(e) => {
                        self.error(Code::OpTypes, e.to_string(), *pos);
                        // Comparisons still read as boolean downstream;
                        // arithmetic keeps the left type.
                        match op {
                            BinOp::And
                            | BinOp::Or
                            | BinOp::Eq
                            | BinOp::Ne
                            | BinOp::Lt
                            | BinOp::Le
                            | BinOp::Gt
                            | BinOp::Ge => Some(Type::Boolean),
                            _ => Some(lt),
                        }
                    }
                }
            }
            Expr::Ternary {
                cond,
                then,
                other,
                pos,
            } => {
                if let Some(t) = self.check_expr(cond) {
                    self.require_boolean(&t, cond.pos());
                }
                let t1 = self.check_expr(then);
                let t2 = self.check_expr(other);
                match (&t1, &t2) {
                    (Some(a), Some(b)) if a == b => t1,
                    (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => {
                        Some(types::unify_numeric(a, b).expect("both operands are numeric"))
                    }
                    (Some(a), Some(b)) => {
                        self.error(
                            Code::OpTypes,
                            format!("incompatible ternary branches: {a} and {b}"),
                            *pos,
                        );
                        t1
                    }
                    _ => t1.or(t2),
                }
            }
            Expr::Assign { target, value, pos } => self.check_assign(target, value, *pos),
        }
    }

    fn check_ident(&mut self, name: &str, pos: Pos) -> Option<Type> {
        let resolved = self
            .tables
            .scopes
            .resolve_with_scope(self.scope(), name)
            .map(|(symbol, scope)| (symbol.clone(), scope));
        let Some((symbol, decl_scope)) = resolved else {
            self.error(
                Code::Undeclared,
                format!("undeclared identifier `{name}`"),
                pos,
            );
            return None;
        };
        if matches!(
            symbol,
            Symbol::Variable(_) | Symbol::Const(_) | Symbol::Param(_)
        ) {
            self.maybe_capture(name, decl_scope);
        }
        Self::type_of_symbol(&symbol)
    }

    fn check_array_literal(&mut self, elements: &[Expr], pos: Pos) -> Option<Type> {
        if elements.is_empty() {
            self.error(
                Code::OpTypes,
                "empty array literal without explicit type",
                pos,
            );
            return Some(Type::array(Type::Void, 1));
        }

        let mut unified: Option<Type> = None;
        for element in elements {
            let element_type = self.check_expr(element);
            match (&unified, element_type) {
                (None, Some(t)) => unified = Some(t),
                (Some(u), Some(t)) if t != *u => {
                    if u.is_numeric() && t.is_numeric() {
                        unified =
                            Some(types::unify_numeric(u, &t).expect("both operands are numeric"));
                    } else {
                        self.error(
                            Code::OpTypes,
                            format!("incompatible array elements: {u} and {t}"),
                            element.pos(),
                        );
                    }
                }
                _ => {}
            }
        }
        Some(Type::array(unified.unwrap_or(Type::Void), 1))
    }

    fn check_new(&mut self, class_name: &str, args: &[Expr], pos: Pos) -> Option<Type> {
        let arg_types: Vec<Option<Type>> = args.iter().map(|a| self.check_expr(a)).collect();

        let global = self.tables.global();
        let is_class = matches!(
            self.tables.scopes.resolve(global, class_name),
            Some(Symbol::Class(_))
        );
        if !is_class {
            self.error(
                Code::MemberNotFound,
                format!("class `{class_name}` does not exist"),
                pos,
            );
            return Some(Type::class(class_name));
        }

        match self.member_lookup(class_name, "constructor") {
            Some((Symbol::Function(ctor), defining)) => {
                let params =
                    self.fn_param_types(&format!("{defining}::constructor"), &ctor.params);
                if let Err(e) = types::check_call(&arg_types, &params) {
                    self.report_call_error(
                        e,
                        Some(&format!("constructor of `{class_name}`")),
                        pos,
                    );
                }
            }
            _ => {
                if !args.is_empty() {
                    self.error(
                        Code::CallArity,
                        format!("`{class_name}` has no constructor; expected 0 arguments"),
                        pos,
                    );
                }
            }
        }
        Some(Type::class(class_name))
    }

    fn check_call_expr(&mut self, callee: &Expr, args: &[Expr], pos: Pos) -> Option<Type> {
        match callee {
            Expr::Ident { name, .. } => {
                let resolved = self
                    .tables
                    .scopes
                    .resolve_with_scope(self.scope(), name)
                    .map(|(symbol, scope)| (symbol.clone(), scope));
                let Some((Symbol::Function(f), decl_scope)) = resolved else {
                    self.error(
                        Code::Undeclared,
                        format!("call of `{name}` which is not a function"),
                        pos,
                    );
                    return None;
                };
                let key = self.qualified_key_from_scope(decl_scope, name);
                let params = self.fn_param_types(&key, &f.params);
                let arg_types: Vec<Option<Type>> =
                    args.iter().map(|a| self.check_expr(a)).collect();
                if let Err(e) = types::check_call(&arg_types, &params) {
                    self.report_call_error(e, None, pos);
                }
                Some(f.resolved_return.clone().unwrap_or(Type::Void))
            }
            Expr::Prop { obj, prop, .. } => {
                let obj_type = self.check_expr(obj)?;
                let Type::Class { name } = obj_type else {
                    self.error(
                        Code::MemberNotFound,
                        format!("property access `{prop}` on non-object {obj_type}"),
                        pos,
                    );
                    return None;
                };
                match self.member_lookup(&name, prop) {
                    Some((Symbol::Function(method), defining)) => {
                        let params =
                            self.fn_param_types(&format!("{defining}::{prop}"), &method.params);
                        let arg_types: Vec<Option<Type>> =
                            args.iter().map(|a| self.check_expr(a)).collect();
                        if let Err(e) = types::check_call(&arg_types, &params) {
                            self.report_call_error(e, None, pos);
                        }
                        Some(method.resolved_return.clone().unwrap_or(Type::Void))
                    }
                    Some(_) => {
                        for arg in args {
                            self.check_expr(arg);
                        }
                        self.error(
                            Code::OpTypes,
                            format!("`{prop}` is not a method of `{name}`"),
                            pos,
                        );
                        None
                    }
                    None => {
                        self.error(
                            Code::MemberNotFound,
                            format!("member `{prop}` does not exist on {name}"),
                            pos,
                        );
                        None
                    }
                }
            }
            other => {
                self.check_expr(other);
                self.error(Code::OpTypes, "call target is not a function", pos);
                None
            }
        }
    }

    fn check_prop_read(&mut self, obj: &Expr, prop: &str, pos: Pos) -> Option<Type> {
        let obj_type = self.check_expr(obj)?;
        let Type::Class { name } = obj_type else {
            self.error(
                Code::MemberNotFound,
                format!("property access `{prop}` on non-object {obj_type}"),
                pos,
            );
            return None;
        };
        match self.member_lookup(&name, prop) {
            Some((Symbol::Field(field), _)) => field.resolved.clone(),
            Some((Symbol::Function(method), defining)) => {
                let params = self
                    .fn_param_types(&format!("{defining}::{prop}"), &method.params)
                    .into_iter()
                    .map(|p| p.unwrap_or(Type::Void))
                    .collect();
                Some(Type::function(
                    params,
                    method.resolved_return.clone().unwrap_or(Type::Void),
                ))
            }
            Some(_) => None,
            None => {
                self.error(
                    Code::MemberNotFound,
                    format!("member `{prop}` does not exist on {name}"),
                    pos,
                );
                None
            }
        }
    }

    fn check_assign(&mut self, target: &Expr, value: &Expr, pos: Pos) -> Option<Type> {
        let rhs = self.check_expr(value);

        match target {
            Expr::This { pos } => {
                if self.current_class.is_none() {
                    self.error(
                        Code::ThisContext,
                        "`this` can only be used inside class methods",
                        *pos,
                    );
                } else {
                    self.error(Code::OpTypes, "cannot assign to `this`", *pos);
                }
                rhs
            }
            Expr::Ident { name, pos } => {
                let resolved = self
                    .tables
                    .scopes
                    .resolve_with_scope(self.scope(), name)
                    .map(|(symbol, _)| symbol.clone());
                let Some(symbol) = resolved else {
                    self.error(
                        Code::Undeclared,
                        format!("undeclared identifier `{name}`"),
                        *pos,
                    );
                    return rhs;
                };
                if matches!(symbol, Symbol::Const(_))
                    || matches!(&symbol, Symbol::Field(f) if !f.mutable)
                {
                    self.error(
                        Code::AssignToConst,
                        format!("cannot reassign const `{name}`"),
                        *pos,
                    );
                }
                let dst = Self::type_of_symbol(&symbol);
                if let (Some(dst), Some(val)) = (&dst, &rhs)
                    && !is_assignable(val, dst)
                {
                    self.error(
                        Code::AssignIncompat,
                        format!("cannot assign {val} to {dst}"),
                        value.pos(),
                    );
                }
                dst.or(rhs)
            }
            Expr::Prop { obj, prop, .. } => {
                let Some(obj_type) = self.check_expr(obj) else {
                    return rhs;
                };
                let Type::Class { name } = obj_type else {
                    self.error(
                        Code::MemberNotFound,
                        format!("property assignment on non-object {obj_type}"),
                        pos,
                    );
                    return rhs;
                };
                match self.member_lookup(&name, prop) {
                    Some((Symbol::Field(field), _)) => {
                        if !field.mutable {
                            self.error(
                                Code::AssignToConst,
                                format!("cannot reassign const `{prop}`"),
                                pos,
                            );
                            return field.resolved.clone().or(rhs);
                        }
                        let dst = field.resolved.clone();
                        if let (Some(dst), Some(val)) = (&dst, &rhs)
                            && !is_assignable(val, dst)
                        {
                            self.error(
                                Code::AssignIncompat,
                                format!("cannot assign {val} to {dst}"),
                                value.pos(),
                            );
                        }
                        dst.or(rhs)
                    }
                    _ => {
                        self.error(
                            Code::MemberNotFound,
                            format!("property `{prop}` does not exist"),
                            pos,
                        );
                        rhs
                    }
                }
            }
            Expr::Index { array, index, .. } => {
                let array_type = self.check_expr(array);
                let index_type = self.check_expr(index);
                let elem = match (array_type, index_type) {
                    (Some(at), Some(it)) => match types::index_elem(&at, &it) {
                        Ok(t) => Some(t),
                        Err(_) => {
                            self.error(
                                Code::IndexInvalid,
                                "invalid indexed assignment",
                                pos,
                            );
                            return rhs;
                        }
                    },
                    _ => None,
                };
                if let (Some(el), Some(val)) = (&elem, &rhs)
                    && !is_assignable(val, el)
                {
                    self.error(
                        Code::AssignIncompat,
                        format!("cannot assign {val} to {el}"),
                        value.pos(),
                    );
                }
                elem.or(rhs)
            }
            _ => {
                self.error(
                    Code::OpTypes,
                    "left-hand side of assignment is not assignable",
                    pos,
                );
                rhs
            }
        }
    }
}
