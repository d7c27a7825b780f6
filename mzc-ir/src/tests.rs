//! Unit tests for the descriptor crate

use super::*;
use mzc_common::ScalarType;

#[test]
fn test_function_id() {
    let function = samples::add_numbers("/src/proj");
    let id = function.id();

    assert_eq!(id.param_types, vec![ScalarType::U8, ScalarType::U8]);
    assert_eq!(id.to_string(), "/src/proj::simple_add::add_numbers(u8, u8)");
}

#[test]
fn test_expr_display() {
    let expr = Expr::binary(
        BinaryOp::Add,
        Expr::local("a"),
        Expr::cast(Expr::literal(3, ScalarType::U8), ScalarType::U16),
    );
    assert_eq!(expr.to_string(), "(a + (3:u8 as u16))");

    let call = Expr::call_symbol("m_f", vec![Expr::local("x")]);
    assert_eq!(call.to_string(), "m_f(x)");
}

#[test]
fn test_fixed_literal() {
    let lit = Literal::fixed(3, 2, ScalarType::F8p8).unwrap();
    assert_eq!(lit.value, 384);
    assert!(Literal::fixed(3, 2, ScalarType::U8).is_none());
}

#[test]
fn test_binary_op_classes() {
    assert!(BinaryOp::Le.is_comparison());
    assert!(!BinaryOp::Add.is_comparison());
    assert!(BinaryOp::Shr.is_shift());
    assert_eq!(BinaryOp::Rem.to_string(), "%");
}

#[test]
fn test_simple_add_unit() {
    let unit = samples::simple_add_unit(samples::SAMPLE_PATH);
    assert_eq!(unit.functions.len(), 2);
    assert_eq!(unit.functions_named("main").count(), 1);

    let add_id = unit.functions[0].id();
    assert!(unit.get_function(&add_id).is_some());

    let main = &unit.functions[1];
    assert!(main.params.is_empty());
    assert_eq!(main.body.len(), 4);
    assert!(main.body[3].is_terminator());
}

#[test]
fn test_unit_json_round_trip() {
    let mut unit = samples::simple_add_unit("/p");
    unit.add_constant(ConstantDecl::new("LIMIT", ScalarType::U16, 1000));

    let json = serde_json::to_string_pretty(&unit).unwrap();
    let back: Unit = serde_json::from_str(&json).unwrap();
    assert_eq!(back, unit);
    assert_eq!(back.get_constant("LIMIT").map(|c| c.value), Some(1000));
}

#[test]
fn test_unit_from_handwritten_json() {
    let json = r#"{
        "name": "m",
        "functions": [{
            "path": "",
            "module": "m",
            "name": "main",
            "return_type": "u8",
            "body": [
                { "let": { "name": "x", "ty": "u8", "init": { "literal": { "value": 7, "ty": "u8" } } } },
                { "print": { "value": { "local": "x" } } },
                { "print": "newline" },
                { "return": { "local": "x" } }
            ]
        }]
    }"#;

    let unit: Unit = serde_json::from_str(json).unwrap();
    let main = &unit.functions[0];
    assert_eq!(main.return_type, Some(ScalarType::U8));
    assert!(!main.is_external);
    assert_eq!(main.body[2], Statement::Print(Print::Newline));
    assert_eq!(main.body[3], Statement::ret(Expr::local("x")));
}
