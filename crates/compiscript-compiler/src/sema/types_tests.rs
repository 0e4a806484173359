use super::types::*;

#[test]
fn add_numeric_and_string() {
    assert_eq!(result_add(&Type::Integer, &Type::Integer), Ok(Type::Integer));
    assert_eq!(result_add(&Type::Integer, &Type::Float), Ok(Type::Float));
    assert_eq!(result_add(&Type::Float, &Type::Integer), Ok(Type::Float));
    assert_eq!(result_add(&Type::Str, &Type::Str), Ok(Type::Str));
    assert!(result_add(&Type::Str, &Type::Integer).is_err());
}

#[test]
fn arithmetic_unifies_to_float() {
    assert_eq!(result_arith(&Type::Float, &Type::Integer), Ok(Type::Float));
    assert_eq!(
        result_arith(&Type::Integer, &Type::Integer),
        Ok(Type::Integer)
    );
    // `%` follows the same numeric unification
    assert_eq!(result_arith(&Type::Float, &Type::Integer), Ok(Type::Float));
    assert!(result_arith(&Type::Str, &Type::Integer).is_err());
}

#[test]
fn logical_operators_require_boolean() {
    assert_eq!(
        result_logical(&Type::Boolean, &Type::Boolean),
        Ok(Type::Boolean)
    );
    assert!(result_logical(&Type::Boolean, &Type::Integer).is_err());
    assert_eq!(result_not(&Type::Boolean), Ok(Type::Boolean));
    assert!(result_not(&Type::Integer).is_err());
}

#[test]
fn relational_and_equality() {
    assert_eq!(
        result_relational(&Type::Integer, &Type::Float),
        Ok(Type::Boolean)
    );
    assert!(result_relational(&Type::Str, &Type::Str).is_err());

    assert_eq!(result_equality(&Type::Str, &Type::Str), Ok(Type::Boolean));
    assert_eq!(
        result_equality(&Type::Integer, &Type::Float),
        Ok(Type::Boolean)
    );
    assert!(result_equality(&Type::Str, &Type::Integer).is_err());
}

#[test]
fn assignability_identity_for_all_shapes() {
    let samples = [
        Type::Boolean,
        Type::Integer,
        Type::Float,
        Type::Str,
        Type::Void,
        Type::Null,
        Type::array(Type::Integer, 2),
        Type::class("Dog"),
        Type::function(vec![Type::Integer], Type::Void),
    ];
    for t in &samples {
        assert!(is_assignable(t, t), "{t} should assign to itself");
    }
}

#[test]
fn numeric_promotion_is_one_way() {
    assert!(is_assignable(&Type::Integer, &Type::Float));
    assert!(!is_assignable(&Type::Float, &Type::Integer));
}

#[test]
fn null_assigns_only_to_reference_like() {
    assert!(is_assignable(&Type::Null, &Type::Str));
    assert!(is_assignable(&Type::Null, &Type::array(Type::Integer, 1)));
    assert!(is_assignable(&Type::Null, &Type::class("Dog")));
    assert!(!is_assignable(&Type::Null, &Type::Integer));
    assert!(!is_assignable(&Type::Null, &Type::Boolean));
    assert!(!is_assignable(&Type::Null, &Type::Void));
}

#[test]
fn arrays_are_invariant() {
    let int1 = Type::array(Type::Integer, 1);
    let float1 = Type::array(Type::Float, 1);
    let int2 = Type::array(Type::Integer, 2);
    assert!(!is_assignable(&int1, &float1));
    assert!(!is_assignable(&float1, &int1));
    assert!(!is_assignable(&int1, &int2));
    assert!(!is_assignable(&int2, &int1));
    assert!(is_assignable(&int2, &int2));
}

#[test]
fn nested_array_construction_normalizes_rank() {
    let nested = Type::array(Type::array(Type::Integer, 1), 1);
    assert_eq!(nested, Type::array(Type::Integer, 2));
    assert_eq!(nested.to_string(), "integer[][]");
}

#[test]
fn indexing_reduces_rank_then_yields_element() {
    let matrix = Type::array(Type::Str, 2);
    let row = index_elem(&matrix, &Type::Integer).unwrap();
    assert_eq!(row, Type::array(Type::Str, 1));
    let cell = index_elem(&row, &Type::Integer).unwrap();
    assert_eq!(cell, Type::Str);

    assert_eq!(
        index_elem(&matrix, &Type::Str),
        Err(TypeError::IndexNotInteger(Type::Str))
    );
    assert_eq!(
        index_elem(&Type::Integer, &Type::Integer),
        Err(TypeError::NotAnArray(Type::Integer))
    );
}

#[test]
fn call_checking_arity_and_argument_types() {
    let params = vec![Some(Type::Integer), Some(Type::Float)];

    assert_eq!(
        check_call(&[Some(Type::Integer), Some(Type::Float)], &params),
        Ok(())
    );
    // int promotes into the float parameter
    assert_eq!(
        check_call(&[Some(Type::Integer), Some(Type::Integer)], &params),
        Ok(())
    );
    assert_eq!(
        check_call(&[Some(Type::Integer)], &params),
        Err(TypeError::Arity {
            expected: 2,
            got: 1
        })
    );
    assert_eq!(
        check_call(&[Some(Type::Str), Some(Type::Float)], &params),
        Err(TypeError::ArgMismatch {
            index: 0,
            got: Type::Str,
            want: Type::Integer
        })
    );
    // Unannotated parameter is not checked
    assert_eq!(check_call(&[Some(Type::Str)], &[None]), Ok(()));
}

#[test]
fn display_forms() {
    assert_eq!(Type::array(Type::Integer, 1).to_string(), "integer[]");
    assert_eq!(
        Type::function(vec![Type::Integer, Type::Str], Type::Boolean).to_string(),
        "(integer, string) -> boolean"
    );
    assert_eq!(Type::class("Dog").to_string(), "Dog");
}
