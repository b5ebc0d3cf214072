use std::fs;

use pretty_assertions::assert_eq;
use sable::{
    Config, Error, Interpreter, Module, Privileges, Value,
    ast::Precedence,
    error::{ParseError, RuntimeError},
    interpreter::value::{array::Array, vec3::Vec3},
    run,
};
use walkdir::WalkDir;

#[test]
fn script_files_work() {
    let mut count = 0;

    for entry in WalkDir::new("tests/scripts").into_iter()
                                              .filter_map(Result::ok)
                                              .filter(|e| {
                                                  e.path().extension().is_some_and(|ext| ext == "sbl")
                                              })
    {
        let path = entry.path();
        count += 1;
        let mut interp = quiet();
        if let Err(e) = interp.run_file(path) {
            panic!("Script {path:?} failed:\n{e}");
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}

fn quiet() -> Interpreter {
    Interpreter::with_config(Config::default().with_echo_errors(false))
}

fn assert_success(src: &str) {
    if let Err(e) = run(src) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    if run(src).is_ok() {
        panic!("Script succeeded but was expected to fail")
    }
}

fn eval(src: &str) -> Value {
    run(src).unwrap_or_else(|e| panic!("Script failed: {e}"))
}

fn ints(values: &[i64]) -> Value {
    let values: Vec<Value> = values.iter().map(|i| Value::Int(*i)).collect();
    Array::from_values(&values, 1).unwrap().into()
}

#[test]
fn number_addition_widens_to_the_higher_rank() {
    assert_eq!(eval("null + 4;"), Value::Int(4));
    assert_eq!(eval("2 + 3;"), Value::Int(5));
    assert_eq!(eval("2 + 0.5;"), Value::Float(2.5));
    assert_eq!(eval("0.5 + 2;"), Value::Float(2.5));
    assert_eq!(eval("vec3(1, 2, 3) + 1;"), Value::Vec3(Vec3::new(2.0, 3.0, 4.0)));
    assert_eq!(eval("1.5 + vec3(1, 2, 3);"), Value::Vec3(Vec3::new(2.5, 3.5, 4.5)));
}

#[test]
fn assigned_literals_read_back_unchanged() {
    let cases = [("5", Value::Int(5)),
                 ("50.0", Value::Float(50.0)),
                 ("-9223372036854775808", Value::Int(i64::MIN)),
                 ("\"fish tacos\"", Value::from("fish tacos")),
                 ("[1,2,3,4]", ints(&[1, 2, 3, 4])),
                 ("[]", Value::from(Vec::<Value>::new()))];

    for (literal, expected) in cases {
        let mut interp = quiet();
        interp.run_script(&format!("var i; i = {literal};")).unwrap();
        assert_eq!(interp.resolve_variable("i"), expected, "literal {literal}");
    }
}

#[test]
fn strings_and_arrays_concatenate() {
    assert_eq!(eval("\"fish \" + \"tacos\";"), Value::from("fish tacos"));
    assert_eq!(eval("[1,2] + [3,4];"), ints(&[1, 2, 3, 4]));
}

#[test]
fn precedence_survives_rotation() {
    assert_eq!(eval("2*1+(2.0 + 3/2);"), Value::Float(5.0));
    assert_eq!(eval("1 + 2 * 3 - 4;"), Value::Int(3));
    assert_eq!(eval("10 - 2 - 3;"), Value::Int(5));
    assert_eq!(eval("1 < 2 && 3 > 2;"), Value::Int(1));
}

#[test]
fn parameters_do_not_leak() {
    let mut interp = quiet();
    interp.run_script("func j(a){return a;} i = j(999);").unwrap();
    assert_eq!(interp.resolve_variable("i"), Value::Int(999));
    assert_eq!(interp.resolve_variable("a"), Value::Null);
}

#[test]
fn function_definition_has_its_declared_shape() {
    let mut interp = quiet();
    interp.run_script("func i(a){return a;}").unwrap();

    let Value::Function(function) = interp.resolve_variable("i") else {
        panic!("i is not bound to a function");
    };
    assert_eq!(function.params, vec!["a".to_string()]);
    assert_eq!(function.statements().map(<[_]>::len), Some(1));
    assert_eq!(function.precedence, Precedence::Func);
}

#[test]
fn empty_list_takes_the_type_of_its_first_element() {
    let mut interp = quiet();
    interp.run_script("i = []; i += 7;").unwrap();
    assert_eq!(interp.resolve_variable("i"), ints(&[7]));
}

#[test]
fn dangling_else_runs_when_the_test_fails() {
    let mut interp = quiet();
    interp.run_script("var i = 0; if (false) { } else { i = 1; }").unwrap();
    assert_eq!(interp.resolve_variable("i"), Value::Int(1));
}

#[test]
fn taken_if_skips_its_else_and_stays_closed() {
    let mut interp = quiet();
    interp.run_script("var i = 0; if (true) { i = 1; } else { i = 2; } i = i + 10;").unwrap();
    assert_eq!(interp.resolve_variable("i"), Value::Int(11));

    assert!(matches!(run("if (true) { i = 1; } i = 3; else { i = 2; }"),
                     Err(Error::Parse(ParseError::DanglingElse { .. }))));
}

#[test]
fn if_chain_waits_for_a_following_else_across_lines() {
    let mut interp = quiet();
    assert!(!interp.submit_line("var i = 0;"));
    assert!(!interp.submit_line("if (i == 1) { i = 10; }"));
    assert!(!interp.is_idle());
    assert!(!interp.submit_line("else if (i == 0) { i = 20; }"));
    assert!(!interp.submit_line("else { i = 30; }"));
    assert_eq!(interp.resolve_variable("i"), Value::Int(20));
}

#[test]
fn errors_do_not_corrupt_later_statements() {
    let mut interp = quiet();
    assert!(!interp.submit_line("var total = 1;"));
    assert!(interp.submit_line("total = total + missing(2);"));
    assert!(interp.submit_line("func broken( {"));
    assert!(interp.is_idle());
    assert!(!interp.submit_line("total = total + 1;"));
    assert!(!interp.submit_line("func ok() { return total; }"));
    assert!(!interp.submit_line("var result = ok();"));
    assert_eq!(interp.resolve_variable("result"), Value::Int(2));
}

#[test]
fn error_inside_a_function_returns_to_the_global_scope() {
    let mut interp = quiet();
    interp.submit_line("func f() { var local = 1; return nosuch(); }");
    assert!(interp.submit_line("f();"));
    assert!(!interp.submit_line("var after = 5;"));
    assert_eq!(interp.resolve_variable("after"), Value::Int(5));
    assert_eq!(interp.resolve_variable("local"), Value::Null);
}

#[test]
fn closures_keep_their_scope() {
    let src = "func counter() {
                   var count = 0;
                   func next() { count = count + 1; return count; }
                   return next;
               }
               var c = counter();
               c();
               c();";
    assert_eq!(eval(src), Value::Int(2));
}

#[test]
fn closures_escaping_from_nested_scopes_keep_captured_locals() {
    let src = "func make() {
                   var x = 3;
                   if (true) { func inner() { return x; } return inner; }
               }
               var f = make();
               f();";
    assert_eq!(eval(src), Value::Int(3));

    let src = "func make() {
                   var total = 10;
                   for (var i = 0; i < 3; i++) {
                       if (i == 2) { func get() { return total + i; } return get; }
                   }
               }
               var g = make();
               g();";
    assert_eq!(eval(src), Value::Int(12));
}

#[test]
fn recursion() {
    let src = "func fib(n) {
                   if (n < 2) { return n; }
                   return fib(n - 1) + fib(n - 2);
               }
               fib(15);";
    assert_eq!(eval(src), Value::Int(610));
}

#[test]
fn loops() {
    assert_eq!(eval("var s = 0; for (var i = 0; i < 5; i++) { s = s + i; } s;"), Value::Int(10));
    assert_eq!(eval("var n = 0; while (n < 3) { n++; } n;"), Value::Int(3));
    assert_eq!(eval("var t = 0; foreach (x; [1, 2, 3]) { t += x; } t;"), Value::Int(6));
    assert_eq!(eval("var t = \"\"; foreach (c; \"abc\") { t = c + t; } t;"), Value::from("cba"));
}

#[test]
fn return_leaves_nested_loops() {
    let src = "func find(items, wanted) {
                   foreach (item; items) {
                       if (item == wanted) { return \"found\"; }
                   }
                   return \"missing\";
               }
               find([1, 2, 3], 2) + \" \" + find([1, 2, 3], 9);";
    assert_eq!(eval(src), Value::from("found missing"));
}

#[test]
fn foreach_needs_two_clauses() {
    assert!(matches!(run("foreach (x) { }"),
                     Err(Error::Parse(ParseError::ClauseCount { found: 1, .. }))));
}

#[test]
fn classes() {
    let src = "class Point {
                   var x = 0;
                   var y = 0;
                   func Point(a, b) { x = a; y = b; }
                   func sum() { return x + y; }
               }
               var p = Point(3, 4);
               var q = Point(1, 1);
               p.x = p.x + 10;
               p.sum() + q.sum();";
    assert_eq!(eval(src), Value::Int(19));
}

#[test]
fn classes_inherit_members_from_their_bases() {
    let src = "class Animal { var legs = 4; func speak() { return \"...\"; } }
               class Named { var name = \"rex\"; }
               class Dog, Animal, Named { func speak() { return name + \" says woof\"; } }
               var d = Dog();
               string(d.legs) + \" \" + d.speak();";
    assert_eq!(eval(src), Value::from("4 rex says woof"));

    assert!(matches!(run("class Cat, Missing { }"),
                     Err(Error::Runtime(RuntimeError::UnknownClass { .. }))));
}

#[test]
fn instances_do_not_share_scalar_members() {
    let src = "class Box { var v = 1; }
               var a = Box();
               var b = Box();
               a.v = 5;
               b.v;";
    assert_eq!(eval(src), Value::Int(1));
}

#[test]
fn unknown_members_are_errors() {
    assert_failure("class A { } var a = A(); a.nothing;");
    assert_failure("class A { } var a = A(); a.nothing();");
}

#[test]
fn dictionaries() {
    let src = "var d = dictionary();
               d[\"b\"] = 2;
               d[\"a\"] = 1;
               d[1] = \"int key\";
               d[\"1\"] = \"string key\";
               len(d);";
    assert_eq!(eval(src), Value::Int(4));

    assert_eq!(eval("var d = dictionary(); d[\"k\"] = 1; d[\"missing\"];"), Value::Null);
    assert_eq!(eval("var d = dictionary(); d[\"b\"] = 1; d[\"a\"] = 2; keys(d);").to_string(),
               "[\"a\", \"b\"]");

    let merged = "var a = dictionary(); a[\"x\"] = 1;
                  var b = dictionary(); b[\"x\"] = 2; b[\"y\"] = 3;
                  a += b;
                  a[\"x\"] + a[\"y\"];";
    assert_eq!(eval(merged), Value::Int(5));
}

#[test]
fn assignment_shares_storage_and_definition_copies() {
    assert_eq!(eval("var a = [1, \"two\"]; var b; b = a; b += 3; len(a);"), Value::Int(3));
    assert_eq!(eval("var a = [1, 2]; var b; b = a; b[0] = 9; a[0];"), Value::Int(9));
    assert_eq!(eval("var a = [1, 2]; var b = a; b[0] = 9; a[0];"), Value::Int(1));
    assert_eq!(eval("var a = [1, 2]; var b = a + [3]; len(a);"), Value::Int(2));
}

#[test]
fn typed_arrays_reject_other_element_types() {
    assert_failure("var a = [1, 2]; a += \"x\";");
    assert_failure("[1, 2] + [\"a\"];");
    assert_failure("array(1, \"a\");");
    assert_eq!(eval("var a = [1, 2]; a += 3; a;"), ints(&[1, 2, 3]));
}

#[test]
fn vectors() {
    assert_eq!(eval("var v = vec3(1, 2, 3); v.y = 5; v.y;"), Value::Float(5.0));
    assert_eq!(eval("var v = vec3(1, 2, 3); v[2];"), Value::Float(3.0));
    assert_eq!(eval("vec3(3, 4, 0) > vec3(1, 1, 1);"), Value::Int(1));
    assert_eq!(eval("-vec3(1, 0, 0);"), Value::Vec3(Vec3::new(-1.0, 0.0, 0.0)));
}

#[test]
fn comparisons() {
    assert_eq!(eval("2 == 2.0;"), Value::Int(1));
    assert_eq!(eval("\"a\" < \"b\";"), Value::Int(1));
    assert_eq!(eval("[1, 2] == [1, 2];"), Value::Int(1));
    assert_eq!(eval("[1, 2, 3] > [9];"), Value::Int(1));
    assert_failure("1 < \"a\";");
}

#[test]
fn member_call_syntax_falls_back_to_free_functions() {
    assert_eq!(eval("[1, 2, 3].len();"), Value::Int(3));
    assert_eq!(eval("\"abc\".typeof();"), Value::from("string"));
}

#[test]
fn conversions() {
    assert_eq!(eval("int(2.9);"), Value::Int(2));
    assert_eq!(eval("int(\"12\");"), Value::Int(12));
    assert_eq!(eval("int([1, 2, 3]);"), Value::Int(3));
    assert_eq!(eval("float(3);"), Value::Float(3.0));
    assert_eq!(eval("string(1.5);"), Value::from("1.5"));
    assert_eq!(eval("list([1, 2]);").to_string(), "[1, 2]");
    assert_eq!(eval("typeof(list([1, 2]));"), Value::from("list"));
}

#[test]
fn runtime_failures() {
    assert_failure("nosuch(1);");
    assert_failure("var l = [1, 2]; l[5];");
    assert_failure("1 / 0;");
    assert_failure("var x = 5; x();");
    assert_failure("assert(1 == 2, \"math is broken\");");
    assert_success("assert(1 == 1);");
}

#[test]
fn syntax_failures() {
    assert!(matches!(run("var s = \"abc;"), Err(Error::Parse(ParseError::UnterminatedString { .. }))));
    assert!(matches!(run("var x = 1 2;"), Err(Error::Parse(ParseError::MissingSeparator { .. }))));
    assert!(matches!(run("else { }"), Err(Error::Parse(ParseError::DanglingElse { .. }))));
    assert!(matches!(run("if (true) { } else x = 1;"),
                     Err(Error::Parse(ParseError::ExpectedAfterElse { .. }))));
    assert!(matches!(run("}"), Err(Error::Parse(ParseError::UnbalancedBrace { .. }))));
}

#[test]
fn errors_name_their_line() {
    let e = run("var a = 1;\nvar b = 2;\nb = nosuch(a);").unwrap_err();
    assert_eq!(e.line(), 3);
    assert!(e.to_string().starts_with("Error on line 3:"));
}

#[test]
fn host_functions() {
    let mut interp = quiet();
    interp.register_function("double", |args, _| {
              Ok(match &args[0] {
                  Value::Int(i) => Value::Int(i * 2),
                  other => other.clone(),
              })
          });
    interp.register_scoped_function("call_twice", |interp, args, _, line| {
              let Value::Function(f) = &args[0] else {
                  return Ok(Value::Null);
              };
              let once = interp.invoke(f, vec![args[1].clone()], None, line)?;
              interp.invoke(f, vec![once], None, line)
          });

    interp.run_script("func inc(x) { return x + 1; }").unwrap();
    assert_eq!(interp.run_script("call_twice(inc, double(20));").unwrap(), Value::Int(42));

    let inc = interp.resolve_variable("inc");
    assert_eq!(interp.call_function(&inc, vec![Value::Int(1)]).unwrap(), Value::Int(2));
    assert_eq!(interp.call_function(&Value::from("double"), vec![Value::Int(4)]).unwrap(),
               Value::Int(8));
    assert!(interp.call_function(&Value::Int(1), vec![]).is_err());
}

#[test]
fn modules_respect_privileges() {
    let module = || {
        Module::new("threads").requires(Privileges::THREADING)
                              .function("spawn_count", |_, _| Ok(Value::Int(0)))
    };

    let mut denied = quiet();
    assert!(!denied.register_module(module()));
    assert!(denied.run_script("spawn_count();").is_err());

    let config = Config::default().with_privileges(Privileges::THREADING)
                                  .with_echo_errors(false);
    let mut granted = Interpreter::with_config(config);
    assert!(granted.register_module(module()));
    assert_eq!(granted.run_script("spawn_count();").unwrap(), Value::Int(0));

    let mut plain = quiet();
    assert!(plain.register_module(Module::new("plain").function("one", |_, _| Ok(Value::Int(1)))));
}

#[test]
fn imports_run_in_the_importing_scope() {
    let dir = std::env::temp_dir().join(format!("sable-import-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("lib.sbl"), "var imported = 41;\nfunc bump(x) { return x + 1; }\n").unwrap();
    fs::write(dir.join("broken.sbl"), "var x = ;\n").unwrap();

    let config = Config::default().with_import_root(&dir).with_echo_errors(false);
    let mut interp = Interpreter::with_config(config);
    assert_eq!(interp.run_script("import \"lib.sbl\"; bump(imported);").unwrap(), Value::Int(42));

    assert!(matches!(interp.run_script("import \"missing.sbl\";"),
                     Err(Error::Runtime(RuntimeError::ImportFailed { .. }))));
    assert!(matches!(interp.run_script("import \"broken.sbl\";"),
                     Err(Error::Runtime(RuntimeError::ImportFailed { .. }))));

    fs::remove_dir_all(&dir).unwrap();
}
