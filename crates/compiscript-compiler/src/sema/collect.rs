//! Pass 1: declaration collection.
//!
//! Declares top-level and class-level names, discovers nested functions and
//! their parameters, and records inheritance edges. Function and method
//! bodies are walked only to find nested declarations; locals are left to
//! the type checker so declaration order interacts correctly with inference.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::diagnostics::{Code, Diagnostics};
use crate::parser::ast::{Block, ClassDecl, ClassMember, FunctionDecl, Program, Stmt, VarDecl};
use crate::source::Pos;

use super::scope::{ScopeArena, ScopeId, ScopeKind};
use super::symbol::{ClassSymbol, FieldSymbol, FunctionSymbol, ParamSymbol, Symbol, VarSymbol};

/// Output of pass 1, threaded through the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct DeclTables {
    pub scopes: ScopeArena,
    /// class name → class scope
    pub class_scopes: IndexMap<String, ScopeId>,
    /// qualified key (`Class::outer::name` / `::outer::name`) → function scope
    pub function_scopes: IndexMap<String, ScopeId>,
    /// class name → base class name (if any), in declaration order
    pub class_bases: IndexMap<String, Option<String>>,
    /// class name → declaration position, for later diagnostics
    pub class_positions: IndexMap<String, Pos>,
}

impl DeclTables {
    pub fn global(&self) -> ScopeId {
        self.scopes.global()
    }
}

pub fn collect(program: &Program, diagnostics: &mut Diagnostics) -> DeclTables {
    let scopes = ScopeArena::new();
    let global = scopes.global();
    let mut collector = Collector {
        diagnostics,
        tables: DeclTables {
            scopes,
            class_scopes: IndexMap::new(),
            function_scopes: IndexMap::new(),
            class_bases: IndexMap::new(),
            class_positions: IndexMap::new(),
        },
        stack: vec![global],
    };

    for stmt in &program.statements {
        collector.collect_stmt(stmt);
    }
    collector.check_inheritance_cycles();
    collector.tables
}

struct Collector<'d> {
    diagnostics: &'d mut Diagnostics,
    tables: DeclTables,
    stack: Vec<ScopeId>,
}

impl Collector<'_> {
    fn current(&self) -> ScopeId {
        *self.stack.last().expect("scope stack never empty")
    }

    fn declare_or_error(&mut self, symbol: Symbol, pos: Pos) {
        let name = symbol.name().to_string();
        if !self.tables.scopes.declare(self.current(), symbol) {
            self.diagnostics.error(
                Code::DuplicateId,
                format!("duplicate identifier `{name}`"),
                pos,
            );
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(decl) => self.collect_var_decl(decl),
            Stmt::Function(decl) => self.collect_function(decl, false),
            Stmt::Class(decl) => self.collect_class(decl),
            // Remaining statements only matter for the declarations nested
            // inside them.
            Stmt::Block(block) => self.collect_block(block),
            Stmt::If {
                then_block,
                else_block,
                ..
            } => {
                self.collect_block(then_block);
                if let Some(else_block) = else_block {
                    self.collect_block(else_block);
                }
            }
            Stmt::While { body, .. }
            | Stmt::DoWhile { body, .. }
            | Stmt::Foreach { body, .. } => self.collect_block(body),
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    self.collect_stmt(init);
                }
                self.collect_block(body);
            }
            Stmt::Switch { cases, default, .. } => {
                for case in cases {
                    for stmt in &case.body {
                        self.collect_stmt(stmt);
                    }
                }
                if let Some(default) = default {
                    for stmt in default {
                        self.collect_stmt(stmt);
                    }
                }
            }
            Stmt::TryCatch {
                try_block,
                catch_block,
                ..
            } => {
                self.collect_block(try_block);
                self.collect_block(catch_block);
            }
            Stmt::ExprStmt { .. }
            | Stmt::Print { .. }
            | Stmt::Break { .. }
            | Stmt::Continue { .. }
            | Stmt::Return { .. } => {}
        }
    }

    fn collect_block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.collect_stmt(stmt);
        }
    }

    /// Variables and constants are declared here only at global and class
    /// level; locals belong to pass 3.
    fn collect_var_decl(&mut self, decl: &VarDecl) {
        match self.tables.scopes.kind(self.current()) {
            ScopeKind::Global => {
                let sym = VarSymbol::new(&decl.name, decl.type_ann.clone());
                let symbol = if decl.is_const {
                    Symbol::Const(sym)
                } else {
                    Symbol::Variable(sym)
                };
                self.declare_or_error(symbol, decl.pos);
            }
            ScopeKind::Class => {
                self.declare_or_error(
                    Symbol::Field(FieldSymbol {
                        name: decl.name.clone(),
                        type_ann: decl.type_ann.clone(),
                        resolved: None,
                        mutable: !decl.is_const,
                    }),
                    decl.pos,
                );
            }
            ScopeKind::Function | ScopeKind::Block => {}
        }
    }

    fn collect_function(&mut self, decl: &FunctionDecl, is_method: bool) {
        let owner = self.current();
        let declared = self.tables.scopes.declare(
            owner,
            Symbol::Function(FunctionSymbol::new(
                &decl.name,
                decl.return_ann.clone(),
                is_method,
            )),
        );
        if !declared {
            self.diagnostics.error(
                Code::DuplicateId,
                format!("duplicate identifier `{}`", decl.name),
                decl.pos,
            );
        }

        let fn_scope = self
            .tables
            .scopes
            .alloc(&decl.name, ScopeKind::Function, owner);
        let key = self.qualified_fn_key(&decl.name);
        self.tables.function_scopes.entry(key).or_insert(fn_scope);

        // Duplicates within one parameter list
        let mut seen: HashSet<&str> = HashSet::new();
        let mut param_names = Vec::new();
        for param in &decl.params {
            if !seen.insert(&param.name) {
                self.diagnostics.error(
                    Code::DuplicateParam,
                    format!("duplicate parameter `{}`", param.name),
                    param.pos,
                );
                continue;
            }
            self.tables.scopes.declare(
                fn_scope,
                Symbol::Param(ParamSymbol {
                    name: param.name.clone(),
                    type_ann: param.type_ann.clone(),
                    resolved: None,
                }),
            );
            param_names.push(param.name.clone());
        }

        if declared
            && let Some(Symbol::Function(f)) = self.tables.scopes.symbol_mut(owner, &decl.name)
        {
            f.params = param_names;
        }

        // Walk the body for nested functions
        self.stack.push(fn_scope);
        self.collect_block(&decl.body);
        self.stack.pop();
    }

    fn collect_class(&mut self, decl: &ClassDecl) {
        self.declare_or_error(
            Symbol::Class(ClassSymbol {
                name: decl.name.clone(),
                base_name: decl.base.clone(),
                resolved_base: None,
            }),
            decl.pos,
        );

        self.tables
            .class_positions
            .entry(decl.name.clone())
            .or_insert(decl.pos);
        self.tables
            .class_bases
            .entry(decl.name.clone())
            .or_insert_with(|| decl.base.clone());

        let class_scope = self
            .tables
            .scopes
            .alloc(&decl.name, ScopeKind::Class, self.current());
        self.tables
            .class_scopes
            .entry(decl.name.clone())
            .or_insert(class_scope);

        self.stack.push(class_scope);
        for member in &decl.members {
            match member {
                ClassMember::Field(field) => self.collect_var_decl(field),
                ClassMember::Method(method) => self.collect_function(method, true),
            }
        }
        self.stack.pop();
    }

    /// `Class::outer::...::name` for functions under a class, otherwise
    /// `::outer::...::name`.
    fn qualified_fn_key(&self, name: &str) -> String {
        let mut class = None;
        let mut parts: Vec<&str> = Vec::new();
        for &id in &self.stack {
            let scope = self.tables.scopes.get(id);
            match scope.kind {
                ScopeKind::Class => class = Some(scope.name.as_str()),
                ScopeKind::Function => parts.push(&scope.name),
                _ => {}
            }
        }
        parts.push(name);
        match class {
            Some(class) => format!("{class}::{}", parts.join("::")),
            None => format!("::{}", parts.join("::")),
        }
    }

    // ---- Inheritance cycles ----

    fn check_inheritance_cycles(&mut self) {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        fn dfs(
            node: &str,
            bases: &IndexMap<String, Option<String>>,
            positions: &IndexMap<String, Pos>,
            color: &mut IndexMap<String, Color>,
            diagnostics: &mut Diagnostics,
        ) {
            color.insert(node.to_string(), Color::Gray);
            if let Some(Some(base)) = bases.get(node)
                && bases.contains_key(base)
            {
                match color.get(base).copied().unwrap_or(Color::White) {
                    Color::Gray => diagnostics.error(
                        Code::InheritCycle,
                        format!("inheritance cycle involving `{node}` and `{base}`"),
                        positions.get(node).copied(),
                    ),
                    Color::White => dfs(base, bases, positions, color, diagnostics),
                    Color::Black => {}
                }
            }
            color.insert(node.to_string(), Color::Black);
        }

        let mut color: IndexMap<String, Color> = self
            .tables
            .class_bases
            .keys()
            .map(|k| (k.clone(), Color::White))
            .collect();

        let names: Vec<String> = self.tables.class_bases.keys().cloned().collect();
        for name in names {
            if color.get(&name).copied() == Some(Color::White) {
                dfs(
                    &name,
                    &self.tables.class_bases,
                    &self.tables.class_positions,
                    &mut color,
                    self.diagnostics,
                );
            }
        }
    }
}
