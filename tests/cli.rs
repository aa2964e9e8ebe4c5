mod common;

use common::run_lox;

#[test]
fn successful_script_exits_0() {
    let output = run_lox("print 1;");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn parse_error_exits_65() {
    let output = run_lox("var = ;");
    assert_eq!(output.status.code(), Some(65));
}

#[test]
fn resolver_error_exits_65() {
    let output = run_lox("{ var a = a; }");
    assert_eq!(output.status.code(), Some(65));
}

#[test]
fn division_by_zero_exits_70() {
    let output = run_lox("1/0;");
    assert_eq!(output.status.code(), Some(70));
}

#[test]
fn runtime_error_is_reported_on_stderr() {
    let output = run_lox("1/0;");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("division by zero"));
}

#[test]
fn runtime_error_inside_an_initializer_is_not_swallowed() {
    let output = run_lox("class C { init() { 1/0; } } C();");
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("division by zero"));
}

#[test]
fn global_self_referential_initializer_reports_declared_but_not_initialized() {
    let output = run_lox("var a = a;");
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("declared but not initialized"));
}
