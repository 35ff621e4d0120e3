use std::collections::HashMap;

use pretty_assertions::assert_eq;
use stackeval::{
    eval, Config, Empty, ErrorKind, EvalError, Evaluator, Macros, Operator, Operators, Value,
    Word,
};

fn env() -> HashMap<String, Value> {
    HashMap::from([
        ("name".to_string(), Value::from("Jack")),
        ("key".to_string(), Value::from("a7c34bd")),
    ])
}

fn get_result(src: &str) -> Result<Vec<Word>, EvalError> {
    let ops = Operators::new();
    let macros = Macros::standard();
    eval(src, &env(), &ops, Some(&macros))
}

fn assert_result(src: &str, expected: Word) {
    match get_result(src) {
        Ok(words) => assert_eq!(words, vec![expected], "Script {src:?}"),
        Err(e) => panic!("Script {src:?} failed: {e}"),
    }
}

fn assert_failure(src: &str, config: Config, kind: ErrorKind) {
    let ops = Operators::new();
    let env = env();
    match Evaluator::new(&env, &ops).with_config(config).eval(src) {
        Ok(words) => panic!("Script {src:?} succeeded with {words:?} but was expected to fail"),
        Err(e) => assert_eq!(e.kind, kind, "Script {src:?}"),
    }
}

#[test]
fn simple_algebra() {
    assert_result("2 2 2 prod 4 sum", Word::literal(12));
    assert_result("2 2 2 mul* 4 add*", Word::literal(12));
    assert_result("2 2 2 2 **", Word::literal(16));
}

#[test]
fn nested_algebra() {
    assert_result("2 (2 2 prod) 4 sum", Word::literal(10));
    assert_result("(2 2 2 sum) 4 *", Word::literal(24));
}

#[test]
fn string_concatenation_with_lookup() {
    assert_result("'hello ' name '!' sum", Word::literal("hello Jack!"));
    assert_result("   'hello [' name  ']!' +*2", Word::literal("hello [Jack]!"));
}

#[test]
fn filepath_construction() {
    assert_result(
        "'static' 'css' ('site-' key '.html' sum) pathjoin*",
        Word::literal("static/css/site-a7c34bd.html"),
    );
}

#[test]
fn booleans() {
    assert_result("True", Word::literal(true));
    assert_result("5 4 < !", Word::literal(true));
    assert_result("name exists key exists and", Word::literal(true));
}

#[test]
fn whole_stack_is_returned_in_order() {
    assert_eq!(
        get_result("(1 2 3) 'x'").unwrap(),
        vec![
            Word::literal(1),
            Word::literal(2),
            Word::literal(3),
            Word::literal("x"),
        ]
    );
    assert_eq!(get_result("").unwrap(), Vec::<Word>::new());
}

#[test]
fn unresolved_references() {
    let err = get_result("cake").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnresolvedReference("cake".to_string()));
}

#[test]
fn malformed_operators_are_references() {
    for src in ["2 2 *%", "2 2 **x", "2 2 ***", "2 2 +#", "2 2 sum*"] {
        let err = get_result(src).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::UnresolvedReference(_)),
            "Script {src:?} failed with {err}"
        );
    }
}

#[test]
fn mismatched_brackets() {
    assert_failure("( ( )", Config::default(), ErrorKind::ScopeUnderflow);
    assert_failure("( ( ) ) )", Config::default(), ErrorKind::ScopeUnderflow);
}

#[test]
fn unterminated_quote() {
    assert_failure("'hello name", Config::default(), ErrorKind::UnterminatedQuote);
}

#[test]
fn resource_limits() {
    assert_failure(
        "0 1 2 3 4 5 6 7 8 9 10",
        Config::default().with_stack_limit(10),
        ErrorKind::StackOverflow { limit: 10 },
    );
    assert_failure(
        "( ( ( ( ( ( ) ) ) ) ) )",
        Config::default().with_depth_limit(5),
        ErrorKind::ScopeOverflow { limit: 5 },
    );
    assert_failure(
        "0 1 2 3 4 5 6 add*",
        Config::default().with_greedy_limit(5),
        ErrorKind::IterationOverflow { limit: 5 },
    );
}

#[test]
fn error_display_names_the_position() {
    let err = get_result("1 2\n  )").unwrap_err();
    assert_eq!(
        err.to_string(),
        "scope brackets do not balance at token 2 (line 2, column 3)"
    );
}

#[test]
fn custom_operators_and_macros() {
    let mut ops = Operators::empty();
    ops.register(Operator::new("dup", 1, 2, |o| {
        Ok(vec![o.word(0)?.clone(), o.word(0)?.clone()])
    }));
    ops.register(Operator::new("times", 2, 1, |o| {
        Ok(vec![Word::literal(o.number(0)? * o.number(1)?)])
    }));
    let mut macros = Macros::new();
    macros.define("square", "dup times").unwrap();
    macros.define("quad", "square square").unwrap();

    let words = eval("3 dup*2", &Empty, &ops, Some(&macros)).unwrap();
    assert_eq!(words, vec![Word::literal(3); 3]);
    let words = eval("3 square", &Empty, &ops, Some(&macros)).unwrap();
    assert_eq!(words, vec![Word::literal(9)]);
    let err = eval("3 quad", &Empty, &ops, Some(&macros)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnresolvedReference("square".to_string()));
}

#[test]
fn raw_output_keeps_references() {
    let ops = Operators::new();
    let words = Evaluator::new(&Empty, &ops)
        .with_config(Config::default().with_resolve_trailing(false))
        .eval("'prefix' (later)")
        .unwrap();
    assert_eq!(words, vec![Word::literal("prefix"), Word::reference("later")]);
}

#[test]
fn independent_evaluations_share_registry_and_environment() {
    let ops = Operators::new();
    let env = env();
    std::thread::scope(|s| {
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let (ops, env) = (&ops, &env);
                s.spawn(move || {
                    let src = format!("({n} {n} add) name");
                    Evaluator::new(env, ops).eval(&src)
                })
            })
            .collect();
        for (n, handle) in (1..=4).zip(handles) {
            let words = handle.join().unwrap().unwrap();
            assert_eq!(words, vec![Word::literal(2 * n), Word::literal("Jack")]);
        }
    });
}
