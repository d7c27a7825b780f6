//! Built-in sample units
//!
//! Small programs used by the driver's `demo` command and by tests.

use mzc_common::ScalarType;
use crate::{BinaryOp, Expr, FunctionBuilder, FunctionDecl, Print, Statement, Unit};

pub const SAMPLE_PATH: &str = "/Users/alice/dev/zvdb-minz";
pub const SAMPLE_MODULE: &str = "simple_add";

/// `fun add_numbers(a: u8, b: u8) -> u8 { return a + b; }`
pub fn add_numbers(path: &str) -> FunctionDecl {
    FunctionBuilder::new(path, SAMPLE_MODULE, "add_numbers")
        .param("a", ScalarType::U8)
        .param("b", ScalarType::U8)
        .returns(ScalarType::U8)
        .ret(Expr::binary(BinaryOp::Add, Expr::local("a"), Expr::local("b")))
        .build()
}

/// The `simple_add` program: `main` stores 42 and 13 in locals, adds them
/// through `add_numbers` and returns the result.
pub fn simple_add_unit(path: &str) -> Unit {
    let add = add_numbers(path);
    let add_id = add.id();

    let main = FunctionBuilder::new(path, SAMPLE_MODULE, "main")
        .returns(ScalarType::U8)
        .let_("x", ScalarType::U8, Expr::literal(42, ScalarType::U8))
        .let_("y", ScalarType::U8, Expr::literal(13, ScalarType::U8))
        .let_("result", ScalarType::U8, Expr::call(add_id, vec![Expr::local("x"), Expr::local("y")]))
        .ret(Expr::local("result"))
        .build();

    let mut unit = Unit::new(SAMPLE_MODULE);
    unit.add_function(add);
    unit.add_function(main);
    unit
}

/// `add_numbers` plus a `main` that prints `add_numbers(a, b)` on its own
/// line for every pair and returns 0.
pub fn add_numbers_driver_unit(path: &str, calls: &[(i64, i64)]) -> Unit {
    let add = add_numbers(path);
    let add_id = add.id();

    let mut main = FunctionBuilder::new(path, SAMPLE_MODULE, "main").returns(ScalarType::U8);
    for &(a, b) in calls {
        let call = Expr::call(
            add_id.clone(),
            vec![Expr::literal(a, ScalarType::U8), Expr::literal(b, ScalarType::U8)],
        );
        main = main.print(call).stmt(Statement::Print(Print::Newline));
    }
    let main = main.ret(Expr::literal(0, ScalarType::U8)).build();

    let mut unit = Unit::new(SAMPLE_MODULE);
    unit.add_function(add);
    unit.add_function(main);
    unit
}
