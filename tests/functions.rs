use once_cell::sync::Lazy;
use serde_json::json;
use serde_json_query::functions::{
    validate_args, Evaluator, Function, FunctionArgType, TypedValue, Validator,
};
use serde_json_query::{Environment, JsonPath, ParseErrorKind};
#[cfg(feature = "trace")]
use test_log::test;

#[test]
fn length_of_strings_arrays_and_objects() {
    let value = json!([
        {"a": "ab"},
        {"a": [1, 2, 3]},
        {"a": {"x": 1, "y": 2}},
        {"a": 7},
        {}
    ]);
    let path = JsonPath::parse("$[?length(@.a) == 2]").unwrap();
    assert_eq!(
        path.query(&value).unwrap().values(),
        vec![json!({"a": "ab"}), json!({"a": {"x": 1, "y": 2}})]
    );
}

#[test]
fn length_counts_characters_not_bytes() {
    let value = json!([{"a": "åäö"}]);
    let path = JsonPath::parse("$[?length(@.a) == 3]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
}

#[test]
fn count_nodes() {
    let value = json!([{"a": [1, 2, 3]}, {"a": [1]}]);
    let path = JsonPath::parse("$[?count(@.a.*) > 1]").unwrap();
    assert_eq!(path.query(&value).unwrap().values(), vec![json!({"a": [1, 2, 3]})]);
}

#[test]
fn match_is_anchored_and_search_is_not() {
    let value = json!([
        {"date": "1974-05-11"},
        {"date": "1988-05-23"},
        {"date": "x1974-05-11x"}
    ]);
    let path = JsonPath::parse("$[?match(@.date, '1974-05-..')]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
    let path = JsonPath::parse("$[?search(@.date, '1974-05-..')]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 2);
}

#[test]
fn match_dot_does_not_match_newlines() {
    let value = json!([{"s": "ab"}, {"s": "a\n"}]);
    let path = JsonPath::parse("$[?match(@.s, 'a.')]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
}

#[test]
fn invalid_patterns_are_non_matches_by_default() {
    let value = json!([{"s": "ab"}]);
    let path = JsonPath::parse("$[?match(@.s, 'a(')]").unwrap();
    assert!(path.query(&value).unwrap().is_empty());
}

#[test]
fn invalid_patterns_propagate_with_regex_debug() {
    let value = json!([{"s": "ab"}]);
    let env = Environment::new().with_regex_debug(true);
    let path = env.compile("$[?match(@.s, 'a(')]").unwrap();
    assert!(path.query(&value).is_err());
}

#[test]
fn value_extracts_singular_results() {
    let value = json!([
        {"color": "red"},
        {"colors": ["red", "blue"]}
    ]);
    let path = JsonPath::parse("$[?value(@..color) == 'red']").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
}

#[test]
fn keys_function() {
    let value = json!([{"a": 1, "b": 2}, [1, 2]]);
    let path = JsonPath::parse("$[?keys(@) == ['a', 'b']]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
}

#[test]
fn typeof_function() {
    let value = json!([
        {"thing": 1},
        {"thing": "s"},
        {"thing": [1]},
        {"thing": {"a": 1}},
        {"thing": null},
        {}
    ]);
    for (t, count) in [
        ("number", 1),
        ("string", 1),
        ("array", 1),
        ("object", 1),
        ("null", 1),
        ("undefined", 1),
    ] {
        let path = JsonPath::parse(&format!("$[?typeof(@.thing) == '{t}']")).unwrap();
        assert_eq!(path.query(&value).unwrap().len(), count, "{t}");
    }
}

#[test]
fn is_function() {
    let value = json!([{"thing": [1]}, {"thing": 1}]);
    let path = JsonPath::parse("$[?is(@.thing, 'array')]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
    let path = JsonPath::parse("$[?is(@.other, 'missing')]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 2);
}

#[test]
fn startswith_function() {
    let value = json!([{"name": "foo_bar"}, {"name": "bar_foo"}]);
    let path = JsonPath::parse("$[?startswith(@.name, 'foo')]").unwrap();
    assert_eq!(path.query(&value).unwrap().values(), vec![json!({"name": "foo_bar"})]);
}

#[test]
fn well_typedness_is_enforced() {
    // a literal is not a nodelist
    let err = JsonPath::parse("$[?count('five') > 1]").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Type);
    // a ValueType function is not a standalone filter
    let err = JsonPath::parse("$[?length(@.a)]").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Type);
    // unknown functions are name errors
    let err = JsonPath::parse("$[?frobnicate(@.a)]").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Name);
}

static FIRST_EVALUATOR: Evaluator = Lazy::new(|| {
    Box::new(|mut args, _ctx| {
        Ok(match args.pop_front() {
            Some(TypedValue::Nodes(mut nodes)) if !nodes.is_empty() => {
                TypedValue::Value(nodes.remove(0))
            }
            Some(value @ TypedValue::Value(_)) => value,
            _ => TypedValue::Nothing,
        })
    })
});

static FIRST_VALIDATOR: Validator =
    Lazy::new(|| Box::new(|args| validate_args(&[FunctionArgType::Nodelist], args)));

inventory::submit! {
    Function::new("first", FunctionArgType::Value, &FIRST_EVALUATOR, &FIRST_VALIDATOR)
}

#[test]
fn registered_function() {
    let value = json!([
        {"books": [{"author": "Alexandre Dumas"}, {"author": "William Shirer"}]},
        {"books": [{"author": "Charles Dickens"}]}
    ]);
    let path = JsonPath::parse("$[?first(@.books.*.author) == 'Alexandre Dumas']").unwrap();
    let nodes = path.query(&value).unwrap();
    assert_eq!(nodes.paths(), vec!["$[0]"]);
}

#[test]
fn registered_function_composes() {
    let value = json!([{"a": ["xyz"]}]);
    let path = JsonPath::parse("$[?length(first(@.a.*)) == 3]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
}
