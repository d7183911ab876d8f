use std::rc::Rc;

use loxwalk::callable::{Callable, NativeFunction};
use loxwalk::value::Value;
use loxwalk::{Lox, RunStatus};
use pretty_assertions::assert_eq;

/// Result of running one program: status, printed output, diagnostics.
struct Run {
    status: RunStatus,
    output: String,
    diagnostics: Vec<String>,
}

fn fixed_clock_lox() -> Lox<Vec<u8>> {
    Lox::with_clock(Vec::new(), Rc::new(|| 42.5))
}

fn run(code: &str) -> Run {
    let mut lox = fixed_clock_lox();
    let mut diagnostics: Vec<String> = Vec::new();

    let status = lox.run(code, &mut diagnostics);
    let output = String::from_utf8(lox.into_output()).expect("program output is UTF-8");

    Run {
        status,
        output,
        diagnostics,
    }
}

/// Run a program that must succeed and return what it printed.
fn output_of(code: &str) -> String {
    let run = run(code);
    assert_eq!(run.diagnostics, Vec::<String>::new());
    assert_eq!(run.status, RunStatus::Success);
    run.output
}

#[test]
fn operator_precedence() {
    assert_eq!(output_of("print 1 + 2 * 3; print (1 + 2) * 3;"), "7\n9\n");
}

#[test]
fn arithmetic_and_comparison() {
    let code = "\
        print 10 - 4 / 2;\n\
        print -(3 - 5);\n\
        print 7 > 3;\n\
        print 3 >= 3;\n\
        print 2 < 1;\n\
        print 2 <= 1;\n\
        print 1 / 0;";

    assert_eq!(output_of(code), "8\n2\ntrue\ntrue\nfalse\nfalse\nInfinity\n");
}

#[test]
fn stringification() {
    let code = "\
        print 4.0;\n\
        print 4.5;\n\
        print nil;\n\
        print -0.25;\n\
        print true;\n\
        print \"text\";\n\
        var unset;\n\
        print unset;";

    assert_eq!(output_of(code), "4\n4.5\nnil\n-0.25\ntrue\ntext\nnil\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(output_of("print \"a\" + \"b\";"), "ab\n");
}

#[test]
fn equality_rules() {
    let code = "\
        print nil == nil;\n\
        print nil == false;\n\
        print 1 == 1;\n\
        print \"a\" != \"a\";\n\
        print 1 == \"1\";\n\
        print (0/0) == (0/0);\n\
        fun f() {}\n\
        var g = f;\n\
        print f == g;\n\
        print clock == clock;";

    assert_eq!(
        output_of(code),
        "true\nfalse\ntrue\nfalse\nfalse\nfalse\ntrue\ntrue\n"
    );
}

#[test]
fn truthiness_in_conditions() {
    let code = "\
        if (0) print \"zero\";\n\
        if (\"\") print \"empty\";\n\
        if (nil) print \"nil\"; else print \"not nil\";\n\
        print !false;\n\
        print !!\"x\";";

    assert_eq!(output_of(code), "zero\nempty\nnot nil\ntrue\ntrue\n");
}

#[test]
fn shadowing_in_blocks() {
    assert_eq!(
        output_of("var a = 1; { var a = 2; print a; } print a;"),
        "2\n1\n"
    );
}

#[test]
fn nested_scopes_resolve_outward() {
    let code = "\
        var a = \"global a\";\n\
        var b = \"global b\";\n\
        {\n\
            var a = \"outer a\";\n\
            {\n\
                var a = \"inner a\";\n\
                print a;\n\
                print b;\n\
                b = \"changed b\";\n\
            }\n\
            print a;\n\
        }\n\
        print a;\n\
        print b;";

    assert_eq!(
        output_of(code),
        "inner a\nglobal b\nouter a\nglobal a\nchanged b\n"
    );
}

#[test]
fn redeclaration_overwrites() {
    assert_eq!(output_of("var a = 1; var a = a + 1; print a;"), "2\n");
}

#[test]
fn logical_operators_return_decisive_operand() {
    let code = "\
        print nil or \"fallback\";\n\
        print \"first\" or \"second\";\n\
        print nil and \"never\";\n\
        print 1 and 2;\n\
        print false or nil;";

    assert_eq!(output_of(code), "fallback\nfirst\nnil\n2\nnil\n");
}

#[test]
fn logical_operators_short_circuit() {
    let code = "\
        var calls = 0;\n\
        fun touch() { calls = calls + 1; return true; }\n\
        print true or touch();\n\
        print false and touch();\n\
        print calls;\n\
        print false or touch();\n\
        print calls;";

    assert_eq!(output_of(code), "true\nfalse\n0\ntrue\n1\n");
}

#[test]
fn while_and_for_loops() {
    let code = "\
        var i = 0;\n\
        while (i < 3) { print i; i = i + 1; }\n\
        for (var j = 10; j > 7; j = j - 1) print j;\n\
        var k = 0;\n\
        for (; k < 2;) k = k + 1;\n\
        print k;";

    assert_eq!(output_of(code), "0\n1\n2\n10\n9\n8\n2\n");
}

#[test]
fn for_loop_variable_is_scoped_to_the_loop() {
    let run = run("for (var i = 0; i < 1; i = i + 1) {} print i;");

    assert_eq!(run.status, RunStatus::RuntimeError);
    assert_eq!(run.diagnostics, vec!["Undefined variable 'i'.\n[line 1]"]);
}

#[test]
fn closures_share_mutable_captured_state() {
    let code = "\
        fun makeCounter() {\n\
            var i = 0;\n\
            fun inc() { i = i + 1; return i; }\n\
            return inc;\n\
        }\n\
        var c = makeCounter();\n\
        print c();\n\
        print c();";

    assert_eq!(output_of(code), "1\n2\n");
}

#[test]
fn closures_from_one_scope_see_each_others_writes() {
    let code = "\
        var get;\n\
        var set;\n\
        {\n\
            var shared = \"before\";\n\
            fun g() { return shared; }\n\
            fun s(v) { shared = v; }\n\
            get = g;\n\
            set = s;\n\
        }\n\
        set(\"after\");\n\
        print get();";

    assert_eq!(output_of(code), "after\n");
}

#[test]
fn independent_counters_do_not_share_state() {
    let code = "\
        fun makeCounter() {\n\
            var i = 0;\n\
            fun inc() { i = i + 1; return i; }\n\
            return inc;\n\
        }\n\
        var a = makeCounter();\n\
        var b = makeCounter();\n\
        a(); a();\n\
        print a();\n\
        print b();";

    assert_eq!(output_of(code), "3\n1\n");
}

#[test]
fn scoping_is_lexical_not_dynamic() {
    let code = "\
        var x = \"global\";\n\
        fun show() { print x; }\n\
        fun caller() { var x = \"caller\"; show(); }\n\
        caller();";

    assert_eq!(output_of(code), "global\n");
}

#[test]
fn recursion() {
    let code = "\
        fun fib(n) {\n\
            if (n < 2) return n;\n\
            return fib(n - 1) + fib(n - 2);\n\
        }\n\
        print fib(15);";

    assert_eq!(output_of(code), "610\n");
}

#[test]
fn recursive_calls_get_their_own_parameters() {
    let code = "\
        fun countdown(n) {\n\
            if (n > 0) countdown(n - 1);\n\
            print n;\n\
        }\n\
        countdown(2);";

    assert_eq!(output_of(code), "0\n1\n2\n");
}

#[test]
fn return_unwinds_loops_and_blocks() {
    let code = "\
        fun find() {\n\
            var i = 0;\n\
            while (true) {\n\
                {\n\
                    if (i == 3) return i;\n\
                }\n\
                i = i + 1;\n\
            }\n\
        }\n\
        print find();\n\
        var after = \"scope restored\";\n\
        print after;";

    assert_eq!(output_of(code), "3\nscope restored\n");
}

#[test]
fn functions_without_return_yield_nil() {
    let code = "\
        fun nothing() {}\n\
        fun bare() { return; }\n\
        print nothing();\n\
        print bare();";

    assert_eq!(output_of(code), "nil\nnil\n");
}

#[test]
fn functions_are_first_class_values() {
    let code = "\
        fun twice(f, x) { return f(f(x)); }\n\
        fun inc(n) { return n + 1; }\n\
        print twice(inc, 5);\n\
        print inc;\n\
        print clock;";

    assert_eq!(output_of(code), "7\n<fn inc>\n<native fn>\n");
}

#[test]
fn clock_native_uses_host_clock() {
    assert_eq!(output_of("print clock();"), "42.5\n");
}

#[test]
fn embedder_can_install_natives() {
    let mut lox = fixed_clock_lox();

    lox.interpreter_mut().define_global(
        "double",
        Value::Callable(Callable::Native(Rc::new(NativeFunction {
            name: "double".to_string(),
            arity: 1,
            func: Box::new(|args: &[Value]| match &args[0] {
                Value::Number(n) => Ok(Value::Number(n * 2.0)),
                _ => Err("double expects a number.".to_string()),
            }),
        }))),
    );

    let mut diagnostics: Vec<String> = Vec::new();
    assert_eq!(lox.run("print double(21);", &mut diagnostics), RunStatus::Success);
    assert_eq!(
        lox.run("double(\"x\");", &mut diagnostics),
        RunStatus::RuntimeError
    );

    assert_eq!(lox.output(), b"42\n");
    assert_eq!(diagnostics, vec!["double expects a number.\n[line 1]"]);
}

#[test]
fn arity_mismatch_halts_execution() {
    let run = run("fun f(a, b) {}\nprint \"before\";\nf(1);\nprint \"after\";");

    assert_eq!(run.status, RunStatus::RuntimeError);
    assert_eq!(run.output, "before\n");
    assert_eq!(run.diagnostics, vec!["Expected 2 arguments but got 1.\n[line 3]"]);
}

#[test]
fn native_arity_is_checked() {
    let run = run("clock(1);");

    assert_eq!(run.diagnostics, vec!["Expected 0 arguments but got 1.\n[line 1]"]);
}

#[test]
fn mixed_type_addition_is_a_runtime_error() {
    let run = run("print 1 + \"b\";");

    assert_eq!(run.status, RunStatus::RuntimeError);
    assert_eq!(run.output, "");
    assert_eq!(
        run.diagnostics,
        vec!["Operands must be two numbers or two strings.\n[line 1]"]
    );
}

#[test]
fn numeric_operators_reject_other_types() {
    assert_eq!(
        run("print -\"a\";").diagnostics,
        vec!["Operand must be a number.\n[line 1]"]
    );
    assert_eq!(
        run("print \"a\" < 1;").diagnostics,
        vec!["Operands must be numbers.\n[line 1]"]
    );
    assert_eq!(
        run("print nil * 2;").diagnostics,
        vec!["Operands must be numbers.\n[line 1]"]
    );
}

#[test]
fn undefined_variables() {
    assert_eq!(
        run("print missing;").diagnostics,
        vec!["Undefined variable 'missing'.\n[line 1]"]
    );
    assert_eq!(
        run("\n\nmissing = 1;").diagnostics,
        vec!["Undefined variable 'missing'.\n[line 3]"]
    );
}

#[test]
fn calling_a_non_callable() {
    let run = run("var x = \"not a function\";\nx();");

    assert_eq!(run.status, RunStatus::RuntimeError);
    assert_eq!(
        run.diagnostics,
        vec!["Can only call functions and classes.\n[line 2]"]
    );
}

#[test]
fn runtime_error_inside_call_aborts_everything() {
    let code = "\
        fun inner() { return nil + 1; }\n\
        fun outer() { inner(); print \"unreachable\"; }\n\
        outer();\n\
        print \"also unreachable\";";

    let run = run(code);

    assert_eq!(run.status, RunStatus::RuntimeError);
    assert_eq!(run.output, "");
    assert_eq!(run.diagnostics.len(), 1);
}

#[test]
fn syntax_errors_prevent_evaluation() {
    let run = run("print \"side effect\";\nprint 1 +;\nvar = 2;");

    assert_eq!(run.status, RunStatus::StaticError);
    assert_eq!(run.output, "");
    assert_eq!(
        run.diagnostics,
        vec![
            "[line 2] Error at ';': Expect expression.",
            "[line 3] Error at '=': Expect variable name.",
        ]
    );
}

#[test]
fn lexical_errors_are_reported_before_syntax_errors() {
    let run = run("print 1;\nvar a = #;");

    assert_eq!(run.status, RunStatus::StaticError);
    assert_eq!(run.output, "");
    assert_eq!(
        run.diagnostics,
        vec![
            "[line 2] Error: Unexpected character: #",
            "[line 2] Error at ';': Expect expression.",
        ]
    );
}

#[test]
fn lexical_error_alone_prevents_evaluation() {
    let run = run("print 1; $");

    assert_eq!(run.status, RunStatus::StaticError);
    assert_eq!(run.output, "");
    assert_eq!(run.diagnostics, vec!["[line 1] Error: Unexpected character: $"]);
}

#[test]
fn state_persists_across_runs() {
    let mut lox = fixed_clock_lox();
    let mut diagnostics: Vec<String> = Vec::new();

    let statuses = [
        lox.run("var total = 1;", &mut diagnostics),
        lox.run("fun add(n) { total = total + n; }", &mut diagnostics),
        lox.run("add(2); print total;", &mut diagnostics),
        lox.run("print nope;", &mut diagnostics),
        lox.run("add(3); print total;", &mut diagnostics),
    ];

    assert_eq!(
        statuses,
        [
            RunStatus::Success,
            RunStatus::Success,
            RunStatus::Success,
            RunStatus::RuntimeError,
            RunStatus::Success,
        ]
    );
    assert_eq!(lox.output(), b"3\n6\n");
}

#[test]
fn evaluate_single_expression() {
    let mut lox = fixed_clock_lox();
    let mut diagnostics: Vec<String> = Vec::new();

    assert_eq!(
        lox.evaluate("(1 + 2) * 3 == 9", &mut diagnostics),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        lox.evaluate("\"a\" + 1", &mut diagnostics),
        Err(RunStatus::RuntimeError)
    );
    assert_eq!(
        lox.evaluate("1 +", &mut diagnostics),
        Err(RunStatus::StaticError)
    );
    assert_eq!(diagnostics.len(), 2);
}
