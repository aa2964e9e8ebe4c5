mod common;

use common::stdout_of;

#[test]
fn block_scoping_prints_inner_then_outer() {
    let out = stdout_of("var a=1; { var a=2; print a; } print a;");
    assert_eq!(out, "2\n1\n");
}

#[test]
fn closures_share_mutable_state_across_calls() {
    let out = stdout_of(
        "fun make(){var i=0; fun inc(){i=i+1; return i;} return inc;} var c=make(); print c(); print c();",
    );
    assert_eq!(out, "1\n2\n");
}

#[test]
fn class_constructor_and_method_roundtrip() {
    let out = stdout_of("class C { init(x){ this.x=x; } get(){ return this.x; } } print C(42).get();");
    assert_eq!(out, "42\n");
}

#[test]
fn for_loop_desugars_and_prints_each_iteration() {
    let out = stdout_of("for(var i=0;i<3;i=i+1) print i;");
    assert_eq!(out, "0\n1\n2\n");
}

#[test]
fn mixed_number_string_concatenation_stringifies_the_number() {
    let out = stdout_of("print \"a\" + 1;");
    assert_eq!(out, "a1\n");
}

#[test]
fn integral_numbers_print_without_a_decimal_point() {
    let out = stdout_of("print 3 * 2; print 3.5;");
    assert_eq!(out, "6\n3.5\n");
}

#[test]
fn postfix_increment_returns_the_post_increment_value() {
    let out = stdout_of("var a = 1; print a++; print a;");
    assert_eq!(out, "2\n2\n");
}
