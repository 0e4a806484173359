use indoc::indoc;

use crate::analyze;
use crate::diagnostics::{Code, Diagnostics};

use super::symbol::Symbol;

fn diagnostics_of(source: &str) -> Diagnostics {
    analyze(source).unwrap().diagnostics
}

fn codes(source: &str) -> Vec<Code> {
    diagnostics_of(source).iter().map(|d| d.code).collect()
}

// ---------- well-typed programs ----------

#[test]
fn assignments_calls_arrays_and_classes_check_clean() {
    let source = indoc! {r#"
        let a: integer; a = 3;
        let b: float; b = a;
        function sum(x: integer, y: integer): integer { return x + y; }
        let r: integer; r = sum(a, 2);
        let xs: integer[] = [1, 2, 3];
        let x0: integer = xs[0];
        class A { let v: integer; function get(): integer { return this.v; } }
        let o: A = new A();
    "#};
    let diagnostics = diagnostics_of(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());
}

#[test]
fn float_promotion_and_inference() {
    let source = indoc! {r#"
        let f: float = 1.25;
        let i: integer = 5;
        let f2: float = i;
        let g: float = 12e-1;
        let k = 1.0 + i;
        let m: float = 5.0 % 2;
    "#};
    let diagnostics = diagnostics_of(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());
}

// ---------- names and members ----------

#[test]
fn undeclared_identifier_and_missing_member() {
    let source = indoc! {r#"
        y = 1;
        class A { }
        let o: A = new A();
        o.x = 2;
    "#};
    let cs = codes(source);
    assert!(cs.contains(&Code::Undeclared), "{cs:?}");
    assert!(cs.contains(&Code::MemberNotFound), "{cs:?}");
}

#[test]
fn member_lookup_walks_the_inheritance_chain() {
    let source = indoc! {r#"
        class Animal {
          let name: string;
          function speak(): string { return this.name; }
        }
        class Dog : Animal { }
        let d: Dog = new Dog();
        let s: string = d.name;
        let t: string = d.speak();
    "#};
    let diagnostics = diagnostics_of(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());
}

#[test]
fn reported_inheritance_cycles_do_not_hang_member_lookup() {
    let source = indoc! {r#"
        class A : B { }
        class B : A { }
        let a: A = new A();
        a.missing = 1;
    "#};
    let cs = codes(source);
    assert!(cs.contains(&Code::InheritCycle), "{cs:?}");
    assert!(cs.contains(&Code::MemberNotFound), "{cs:?}");
}

// ---------- operators ----------

#[test]
fn condition_must_be_boolean_and_string_concat_types() {
    let source = indoc! {r#"
        let s: string = "hi";
        if (s) { }
        let t: string; t = s + s;
        let bad: integer; bad = s + s;
    "#};
    let cs = codes(source);
    assert!(cs.contains(&Code::CondNotBool), "{cs:?}");
    assert!(cs.contains(&Code::AssignIncompat), "{cs:?}");
}

#[test]
fn logical_and_relational_operand_rules() {
    let source = indoc! {r#"
        let ok: boolean = true && false;
        let bad: boolean = true && 1;
        let cmp: boolean = "a" < "b";
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(diagnostics.count_of(Code::OpTypes), 2, "{}", diagnostics.summary());
}

#[test]
fn equality_identical_or_numeric_only() {
    let source = indoc! {r#"
        let a: boolean = 1 == 2.0;
        let b: boolean = "x" != "y";
        let c: boolean = "x" == 1;
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(diagnostics.count_of(Code::OpTypes), 1, "{}", diagnostics.summary());
}

// ---------- flow ----------

#[test]
fn return_flow_and_dead_code() {
    let source = indoc! {r#"
        return 1;
        function f(a: integer): integer {
          if (a > 0) { return a; }
        }
        function g(): integer {
          return 1;
          let z: integer = 5;
        }
    "#};
    let cs = codes(source);
    assert!(cs.contains(&Code::ReturnOutside), "{cs:?}");
    assert!(cs.contains(&Code::MissingReturn), "{cs:?}");
    assert!(cs.contains(&Code::DeadCode), "{cs:?}");
}

#[test]
fn if_returns_only_when_both_branches_return() {
    let source = indoc! {r#"
        function ok(a: boolean): integer {
          if (a) { return 1; } else { return 2; }
        }
    "#};
    let diagnostics = diagnostics_of(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());
}

#[test]
fn loops_never_count_as_returning() {
    let source = indoc! {r#"
        function f(): integer {
          while (true) { return 1; }
        }
    "#};
    assert!(codes(source).contains(&Code::MissingReturn));
}

#[test]
fn switch_never_counts_as_returning() {
    let source = indoc! {r#"
        function f(s: string): integer {
          switch (s) {
            case "a": return 1;
            default: return 0;
          }
        }
    "#};
    assert!(codes(source).contains(&Code::MissingReturn));
}

#[test]
fn break_continue_legality() {
    let source = indoc! {r#"
        break;
        continue;
        while (true) { break; continue; }
        do { continue; } while (false);
        for (;;) { break; }
        foreach (v in [1]) { break; }
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(
        diagnostics.count_of(Code::BadBreakContinue),
        2,
        "{}",
        diagnostics.summary()
    );
}

#[test]
fn void_function_must_not_return_a_value() {
    let source = indoc! {r#"
        function f() { return 1; }
        function g(): integer { return; }
    "#};
    let cs = codes(source);
    assert!(cs.contains(&Code::OpTypes), "{cs:?}");
    assert!(cs.contains(&Code::MissingReturn), "{cs:?}");
}

#[test]
fn return_type_must_be_assignable() {
    let source = indoc! {r#"
        function f(): float { return 1; }
        function g(): integer { return 1.5; }
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(
        diagnostics.count_of(Code::AssignIncompat),
        1,
        "{}",
        diagnostics.summary()
    );
}

// ---------- switch ----------

#[test]
fn switch_on_string_is_fine() {
    let source = indoc! {r#"
        var x: string = "b";
        switch (x) {
          case "a": { var y: integer = 1; }
          case "b": { var z: integer = 2; }
          default: { var w: integer = 3; }
        }
    "#};
    let diagnostics = diagnostics_of(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());
}

#[test]
fn switch_on_boolean_is_fine() {
    let source = indoc! {r#"
        switch (true) {
          case true: { }
          default: { }
        }
    "#};
    let diagnostics = diagnostics_of(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());
}

#[test]
fn integer_switch_condition_emits_both_diagnostics() {
    let source = indoc! {r#"
        var x: integer = 10;
        switch (x) {
          case "a": { }
        }
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(diagnostics.count_of(Code::CondNotBool), 1, "{}", diagnostics.summary());
    assert_eq!(diagnostics.count_of(Code::OpTypes), 1, "{}", diagnostics.summary());
}

#[test]
fn case_label_must_match_switch_type() {
    let source = indoc! {r#"
        var x: string = "a";
        switch (x) {
          case 123: { }
          default: { }
        }
    "#};
    assert!(codes(source).contains(&Code::OpTypes));
}

#[test]
fn duplicate_string_case_labels() {
    let source = indoc! {r#"
        switch ("a") {
          case "a": { }
          case "a": { }
          default: { }
        }
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(
        diagnostics.count_of(Code::DuplicateId),
        1,
        "{}",
        diagnostics.summary()
    );
}

// ---------- this / constructors / calls ----------

#[test]
fn constructor_arity_and_argument_types() {
    let source = indoc! {r#"
        class C {
          let n: integer;
          function constructor(n: integer) { this.n = n; }
          function get(): integer { return this.n; }
        }
        let c: C = new C(1);
        let k: integer = c.get();
        let c2: C = new C("x");
        let c3: C = new C(1, 2);
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(diagnostics.count_of(Code::OpTypes), 1, "{}", diagnostics.summary());
    assert_eq!(diagnostics.count_of(Code::CallArity), 1, "{}", diagnostics.summary());
}

#[test]
fn class_without_constructor_rejects_arguments() {
    let source = indoc! {r#"
        class Empty { }
        let a: Empty = new Empty();
        let b: Empty = new Empty(1);
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(diagnostics.count_of(Code::CallArity), 1);
}

#[test]
fn new_of_unknown_class() {
    assert!(codes("let x = new Ghost();").contains(&Code::MemberNotFound));
}

#[test]
fn this_outside_method() {
    let source = indoc! {r#"
        let a: integer = 1;
        this = a;
    "#};
    assert!(codes(source).contains(&Code::ThisContext));
}

#[test]
fn assigning_to_this_inside_method() {
    let source = indoc! {r#"
        class C {
          function m() { this = null; }
        }
    "#};
    assert!(codes(source).contains(&Code::OpTypes));
}

#[test]
fn call_arity_and_argument_type_mismatches() {
    let source = indoc! {r#"
        function f(a: integer, b: string): integer { return a; }
        let x: integer = f(1, "s");
        let y: integer = f(1);
        let z: integer = f("s", "t");
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(diagnostics.count_of(Code::CallArity), 1, "{}", diagnostics.summary());
    assert_eq!(diagnostics.count_of(Code::OpTypes), 1, "{}", diagnostics.summary());
}

#[test]
fn calling_a_non_function_identifier() {
    let source = indoc! {r#"
        let v: integer = 3;
        v();
    "#};
    assert!(codes(source).contains(&Code::Undeclared));
}

// ---------- arrays ----------

#[test]
fn index_type_and_element_assignability() {
    let source = indoc! {r#"
        let xs: integer[] = [1, 2, 3];
        xs["a"] = 1;
        xs[0] = "z";
    "#};
    let cs = codes(source);
    assert!(cs.contains(&Code::IndexInvalid), "{cs:?}");
    assert!(cs.contains(&Code::AssignIncompat), "{cs:?}");
}

#[test]
fn array_literal_unification() {
    let ok = indoc! {r#"
        let a: float[] = [1, 2.5];
    "#};
    let diagnostics = diagnostics_of(ok);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());

    assert!(codes("let b = [1, \"x\"];").contains(&Code::OpTypes));
    assert!(codes("let c = [];").contains(&Code::OpTypes));
}

#[test]
fn foreach_requires_an_array_and_types_the_iterator() {
    let source = indoc! {r#"
        foreach (v in [1, 2]) {
          let x: integer = v;
        }
    "#};
    let diagnostics = diagnostics_of(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());

    assert!(codes("foreach (v in 5) { }").contains(&Code::OpTypes));
}

// ---------- const ----------

#[test]
fn const_reassignment() {
    let source = indoc! {r#"
        const PI: integer = 314;
        PI = 3;
    "#};
    assert!(codes(source).contains(&Code::AssignToConst));
}

#[test]
fn const_field_is_immutable_through_property_assignment() {
    let source = indoc! {r#"
        class C {
          const PI: integer = 3;
          let v: integer;
        }
        let o: C = new C();
        o.PI = 3;
        o.v = 4;
    "#};
    let diagnostics = diagnostics_of(source);
    assert_eq!(
        diagnostics.count_of(Code::AssignToConst),
        1,
        "{}",
        diagnostics.summary()
    );
}

// ---------- locals and shadowing ----------

#[test]
fn local_duplicate_in_same_block() {
    let source = indoc! {r#"
        function f() {
          let x: integer = 1;
          let x: integer = 2;
          return;
        }
    "#};
    assert!(codes(source).contains(&Code::DuplicateId));
}

#[test]
fn shadowing_across_scopes_is_permitted() {
    let source = indoc! {r#"
        let x: integer = 10;
        function f(): string {
          let x: string = "inner";
          return x;
        }
    "#};
    let diagnostics = diagnostics_of(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());
}

// ---------- closures ----------

#[test]
fn nested_function_captures_outer_names() {
    let source = indoc! {r#"
        function outer(a: integer): integer {
          function inner(b: integer): integer {
            return a + b;
          }
          return inner(5);
        }
    "#};
    let analysis = analyze(source).unwrap();
    assert!(analysis.is_ok(), "{}", analysis.diagnostics.summary());

    let outer_scope = analysis.tables.function_scopes["::outer"];
    let Some(Symbol::Function(inner)) = analysis
        .tables
        .scopes
        .resolve_local(outer_scope, "inner")
    else {
        panic!("expected nested function symbol");
    };
    assert!(inner.captured.contains("a"), "captured: {:?}", inner.captured);
    assert!(!inner.captured.contains("b"));
}

#[test]
fn own_parameters_are_not_captured() {
    let source = indoc! {r#"
        function f(a: integer): integer { return a; }
    "#};
    let analysis = analyze(source).unwrap();
    let global = analysis.tables.global();
    let Some(Symbol::Function(f)) = analysis.tables.scopes.resolve_local(global, "f") else {
        panic!();
    };
    assert!(f.captured.is_empty());
}

// ---------- ternary ----------

#[test]
fn ternary_branch_unification() {
    let diagnostics = diagnostics_of("let a: float = true ? 1 : 2.0;");
    assert!(!diagnostics.has_errors(), "{}", diagnostics.summary());

    assert!(codes("let b = true ? 1 : \"x\";").contains(&Code::OpTypes));
    assert!(codes("let c = 1 ? 2 : 3;").contains(&Code::CondNotBool));
}

// ---------- assignment targets ----------

#[test]
fn only_lvalues_are_assignable() {
    let source = indoc! {r#"
        function f(): integer { return 1; }
        f() = 2;
    "#};
    assert!(codes(source).contains(&Code::OpTypes));
}
