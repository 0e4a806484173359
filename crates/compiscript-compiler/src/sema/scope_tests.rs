use super::scope::{ScopeArena, ScopeKind};
use super::symbol::{Symbol, VarSymbol};

fn var(name: &str) -> Symbol {
    Symbol::Variable(VarSymbol::new(name, None))
}

#[test]
fn declare_rejects_same_scope_duplicates() {
    let mut arena = ScopeArena::new();
    let global = arena.global();
    assert!(arena.declare(global, var("x")));
    assert!(!arena.declare(global, var("x")));
    assert_eq!(arena.get(global).len(), 1);
}

#[test]
fn shadowing_resolves_to_innermost() {
    let mut arena = ScopeArena::new();
    let global = arena.global();
    let func = arena.alloc("f", ScopeKind::Function, global);
    let block = arena.alloc("{block}", ScopeKind::Block, func);

    arena.declare(global, var("x"));
    arena.declare(func, var("x"));

    let (_, found_in) = arena.resolve_with_scope(block, "x").unwrap();
    assert_eq!(found_in, func);

    let (_, found_in) = arena.resolve_with_scope(global, "x").unwrap();
    assert_eq!(found_in, global);
}

#[test]
fn resolution_walks_the_whole_chain() {
    let mut arena = ScopeArena::new();
    let global = arena.global();
    let class = arena.alloc("C", ScopeKind::Class, global);
    let method = arena.alloc("m", ScopeKind::Function, class);
    let block = arena.alloc("{block}", ScopeKind::Block, method);

    arena.declare(global, var("g"));
    arena.declare(class, var("f"));

    assert!(arena.resolve(block, "g").is_some());
    assert!(arena.resolve(block, "f").is_some());
    assert!(arena.resolve(block, "missing").is_none());
    assert!(arena.resolve_local(block, "g").is_none());
}

#[test]
fn symbol_order_is_declaration_order() {
    let mut arena = ScopeArena::new();
    let global = arena.global();
    arena.declare(global, var("b"));
    arena.declare(global, var("a"));
    arena.declare(global, var("c"));

    let names: Vec<&str> = arena
        .get(global)
        .symbols()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}
