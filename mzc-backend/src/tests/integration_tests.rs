//! Integration tests using only the public generation API
//!
//! These tests check the emitted C text of whole units.

use mzc_common::{CompilerError, ScalarType};
use mzc_ir::samples::{self, SAMPLE_PATH};
use mzc_ir::{BinaryOp, Expr, FunctionBuilder, Print, Statement, Unit};
use pretty_assertions::assert_eq;
use crate::{generate_c, generate_c_default, CodegenOptions, ManglingMode, RuntimeMode};

const ADD: &str = "_Users_alice_dev_zvdb_minz_simple_add_add_numbers$u8$u8";
const MAIN: &str = "_Users_alice_dev_zvdb_minz_simple_add_main";

/// The text between `// name` and the closing brace of that definition
fn definition<'c>(code: &'c str, name: &str) -> &'c str {
    let start = code.find(&format!("// {name}\n")).unwrap();
    let end = start + code[start..].find("\n}\n").unwrap() + 3;
    &code[start..end]
}

#[test]
fn test_simple_add_definitions() {
    let code = generate_c_default(&samples::simple_add_unit(SAMPLE_PATH)).unwrap().code;

    let expected_add = format!(
        "// add_numbers
u8 {ADD}(u8 v_a, u8 v_b) {{
    u8 r3 = 0;
    u8 r4 = 0;
    u8 r5 = 0;

    r3 = v_a;
    r4 = v_b;
    r5 = (u8)((uint32_t)r3 + (uint32_t)r4);
    return r5;
}}
"
    );
    assert_eq!(definition(&code, "add_numbers"), expected_add);

    let expected_main = format!(
        "// main
u8 {MAIN}(void) {{
    u8 v_x = 0;
    u8 v_y = 0;
    u8 v_result = 0;
    u8 r2 = 0;
    u8 r4 = 0;
    u8 r6 = 0;
    u8 r7 = 0;
    u8 r8 = 0;
    u8 r9 = 0;
    u8 r10 = 0;
    u8 r11 = 0;

    r2 = 42;
    v_x = r2;
    r4 = 13;
    v_y = r4;
    r6 = v_x;
    r7 = v_y;
    r8 = r6;
    r9 = r7;
    r10 = {ADD}(r8, r9);
    v_result = r10;
    r11 = v_result;
    return r11;
}}
"
    );
    assert_eq!(definition(&code, "main"), expected_main);

    assert!(code.ends_with(&format!("int main(void) {{\n    return (int){MAIN}();\n}}\n")));
}

#[test]
fn test_section_order() {
    let code = generate_c_default(&samples::simple_add_unit(SAMPLE_PATH)).unwrap().code;

    let banner = code.find("// MinZ C generated code").unwrap();
    let include = code.find("#include <stdint.h>").unwrap();
    let typedefs = code.find("typedef uint8_t u8;").unwrap();
    let runtime = code.find("void print_u8(u8 value) {").unwrap();
    let declaration = code.find(&format!("u8 {ADD}(u8 v_a, u8 v_b);")).unwrap();
    let definition = code.find(&format!("u8 {ADD}(u8 v_a, u8 v_b) {{")).unwrap();
    let caller = code.find(&format!("u8 {MAIN}(void) {{")).unwrap();
    let wrapper = code.find("int main(void)").unwrap();

    assert!(banner < include && include < typedefs && typedefs < runtime);
    assert!(runtime < declaration && declaration < definition);
    assert!(definition < caller && caller < wrapper);
}

#[test]
fn test_output_is_deterministic() {
    let unit = samples::add_numbers_driver_unit(SAMPLE_PATH, &[(10, 20), (42, 13), (100, 200)]);
    let first = generate_c_default(&unit).unwrap();
    let second = generate_c_default(&unit).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_legacy_mangling_output() {
    let options = CodegenOptions { mangling: ManglingMode::Legacy, ..CodegenOptions::default() };
    let code = generate_c(&samples::simple_add_unit(SAMPLE_PATH), &options).unwrap().code;
    assert!(code.contains("u8 _Users_alice_dev_zvdb-minz_simple_add_add_numbers$u8$u8(u8 v_a, u8 v_b) {"));
    assert!(code.contains("return (int)_Users_alice_dev_zvdb-minz_simple_add_main();"));
}

#[test]
fn test_extern_runtime_and_no_banner() {
    let options = CodegenOptions {
        runtime: RuntimeMode::Extern,
        banner: false,
        ..CodegenOptions::default()
    };
    let code = generate_c(&samples::simple_add_unit(""), &options).unwrap().code;
    assert!(code.starts_with("#include <stdint.h>\n"));
    assert!(code.contains("void print_u8(u8 value);\n"));
    assert!(!code.contains("void print_u8(u8 value) {"));
}

#[test]
fn test_no_entry_wrapper() {
    let options = CodegenOptions { entry_point: None, ..CodegenOptions::default() };
    let code = generate_c(&samples::simple_add_unit(""), &options).unwrap().code;
    assert!(!code.contains("int main("));
}

#[test]
fn test_void_entry_wrapper() {
    let main = FunctionBuilder::new("", "hello", "main")
        .stmt(Statement::Print(Print::Str("hi\n".to_string())))
        .build();
    let mut unit = Unit::new("hello");
    unit.add_function(main);
    let code = generate_c_default(&unit).unwrap().code;

    assert!(code.contains("static const String hello_main_str0 = { 3u, \"hi\\n\" };\n"));
    assert!(code.contains("    print_string(&hello_main_str0);\n"));
    assert!(code.ends_with("int main(void) {\n    hello_main();\n    return 0;\n}\n"));
}

#[test]
fn test_reserved_registers_declared_on_request() {
    let options = CodegenOptions { declare_reserved_registers: true, ..CodegenOptions::default() };
    let code = generate_c(&samples::simple_add_unit(""), &options).unwrap().code;
    let add = definition(&code, "add_numbers");
    assert!(add.contains("    u8 r1 = 0;\n    u8 r2 = 0;\n    u8 r3 = 0;\n"));
    assert!(add.contains("    (void)r1;\n    (void)r2;\n"));
}

#[test]
fn test_unread_values_are_voided() {
    let f = FunctionBuilder::new("", "m", "f")
        .param("unused", ScalarType::U16)
        .let_("x", ScalarType::U8, Expr::literal(1, ScalarType::U8))
        .stmt(Statement::Expr(Expr::literal(7, ScalarType::U8)))
        .build();
    let mut unit = Unit::new("m");
    unit.add_function(f);
    let code = generate_c_default(&unit).unwrap().code;

    let expected = "// f
void m_f$u16(u16 v_unused) {
    u8 v_x = 0;
    u8 r3 = 0;
    u8 r4 = 0;
    (void)v_unused;
    (void)v_x;
    (void)r4;

    r3 = 1;
    v_x = r3;
    r4 = 7;
}
";
    assert_eq!(definition(&code, "f"), expected);
}

#[test]
fn test_control_flow_output() {
    let f = FunctionBuilder::new("", "m", "clamp")
        .param("v", ScalarType::U8)
        .returns(ScalarType::U8)
        .let_("i", ScalarType::U8, Expr::local("v"))
        .stmt(Statement::while_(
            Expr::binary(BinaryOp::Gt, Expr::local("i"), Expr::literal(9, ScalarType::U8)),
            vec![Statement::assign(
                "i",
                Expr::binary(BinaryOp::Sub, Expr::local("i"), Expr::literal(10, ScalarType::U8)),
            )],
        ))
        .stmt(Statement::branch(
            Expr::local("i"),
            vec![Statement::ret(Expr::local("i"))],
            vec![Statement::ret(Expr::literal(10, ScalarType::U8))],
        ))
        .build();
    let mut unit = Unit::new("m");
    unit.add_function(f);
    let code = generate_c_default(&unit).unwrap().code;

    let body = definition(&code, "clamp");
    assert!(body.contains(
        "    while (1) {
        r4 = v_i;
        r5 = 9;
        r6 = (u8)((uint32_t)r4 > (uint32_t)r5);
        if (!r6) break;
        r7 = v_i;
        r8 = 10;
        r9 = (u8)((uint32_t)r7 - (uint32_t)r8);
        v_i = r9;
    }
    r10 = v_i;
    if (r10) {
        r11 = v_i;
        return r11;
    } else {
        r12 = 10;
        return r12;
    }
}
"
    ));
}

#[test]
fn test_emulated_types_output() {
    let f = FunctionBuilder::new("", "m", "wide")
        .param("a", ScalarType::I24)
        .param("b", ScalarType::F8p8)
        .returns(ScalarType::U24)
        .let_("p", ScalarType::F8p8, Expr::binary(BinaryOp::Mul, Expr::local("b"), Expr::local("b")))
        .let_("s", ScalarType::I24, Expr::binary(BinaryOp::Add, Expr::local("a"), Expr::literal(-1, ScalarType::I24)))
        .ret(Expr::cast(Expr::local("s"), ScalarType::U24))
        .stmt(Statement::Print(Print::Value(Expr::local("p"))))
        .build();
    let mut unit = Unit::new("m");
    unit.add_function(f);
    let code = generate_c_default(&unit).unwrap().code;

    let body = definition(&code, "wide");
    assert!(body.starts_with("// wide\nu24 m_wide$i24$f8_8(i24 v_a, f8_8 v_b) {\n"));
    assert!(body.contains("r6 = (f8_8)(((int64_t)r4 * (int64_t)r5) / ((int64_t)1 << F8_8_SHIFT));\n"));
    assert!(body.contains(
        "r10 = (i24)((int32_t)(((uint32_t)((uint32_t)r8 + (uint32_t)r9) & 0xFFFFFFu) ^ 0x800000u) - 0x800000);\n"
    ));
    assert!(body.contains("r12 = (u24)((uint32_t)((int32_t)r11) & 0xFFFFFFu);\n"));
    // p is never read: the print after the return is unreachable
    assert!(body.contains("(void)v_p;\n"));
}

#[test]
fn test_preamble_macro_name_is_not_a_function_symbol() {
    let f = FunctionBuilder::new("", "F8_8", "SHIFT")
        .returns(ScalarType::U8)
        .ret(Expr::literal(1, ScalarType::U8))
        .build();
    let mut unit = Unit::new("shift");
    unit.add_function(f);

    let err = generate_c_default(&unit).unwrap_err();
    assert_eq!(
        err,
        CompilerError::MangleCollision {
            symbol: "F8_8_SHIFT".to_string(),
            first: "the C runtime".to_string(),
            second: "F8_8::SHIFT()".to_string(),
        }
    );
}
