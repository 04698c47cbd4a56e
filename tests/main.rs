use serde_json::{json, Value};
use serde_json_query::{JsonPath, JsonPathExt, JsonPointer, NodeList, ParseErrorKind};
#[cfg(feature = "trace")]
use test_log::test;

fn simple_example_json() -> Value {
    json!({
        "foo": {
            "bar": ["baz", 42],
            "bop": {"thing": [10, 20, 30]},
        },
        "fizz": [1, 2, 3],
    })
}

#[test]
fn dot_name_and_bracket_name_are_equivalent() {
    let value = simple_example_json();
    let p1 = JsonPath::parse("$.foo.bar[0]").unwrap();
    let p2 = JsonPath::parse("$['foo']['bar'][0]").unwrap();
    assert_eq!(p1.query(&value).unwrap(), p2.query(&value).unwrap());
}

#[test]
fn negative_indices() {
    let value = json!([1, 2, 3, 4, 5]);
    let path = JsonPath::parse("$[-1]").unwrap();
    let nodes = path.query(&value).unwrap();
    assert_eq!(nodes.at_most_one().unwrap().unwrap().value(), &json!(5));
    assert_eq!(nodes.paths(), vec!["$[4]"]);
}

#[test]
fn slices() {
    let value = json!({"foo": [1, 2, 3, 4, 5]});
    let cases: &[(&str, &[i64])] = &[
        ("$.foo[:]", &[1, 2, 3, 4, 5]),
        ("$.foo[2:]", &[3, 4, 5]),
        ("$.foo[:2]", &[1, 2]),
        ("$.foo[::2]", &[1, 3, 5]),
        ("$.foo[::-1]", &[5, 4, 3, 2, 1]),
        ("$.foo[-2:]", &[4, 5]),
        ("$.foo[4:1:-2]", &[5, 3]),
        ("$.foo[0:5:0]", &[]),
    ];
    for (path, expect) in cases {
        let nodes = JsonPath::parse(path).unwrap().query(&value).unwrap();
        let expect: Vec<Value> = expect.iter().map(|&i| json!(i)).collect();
        assert_eq!(nodes.values(), expect, "{path}");
    }
}

#[test]
fn filters() {
    let value = json!({ "foo": [1, 2, 3, 4, 5] });
    let path = JsonPath::parse("$.foo[?@ > 2 && @ < 5]").unwrap();
    assert_eq!(path.query(&value).unwrap().all(), vec![3, 4]);
}

#[test]
fn filter_against_root() {
    let value = json!({
        "threshold": 3,
        "foo": [1, 2, 3, 4, 5],
    });
    let path = JsonPath::parse("$.foo[?@ >= $.threshold]").unwrap();
    assert_eq!(path.query(&value).unwrap().all(), vec![3, 4, 5]);
}

#[test]
fn filters_select_object_members() {
    let value = json!({"a": {"deep": 1}, "b": {"deep": 2}});
    let path = JsonPath::parse("$[?@.deep > 1]").unwrap();
    assert_eq!(path.query(&value).unwrap().paths(), vec!["$['b']"]);
}

#[test]
fn equality_is_structural() {
    let value = json!([
        {"pair": {"a": 1, "b": 2}},
        {"pair": {"b": 2, "a": 1}},
        {"pair": {"a": 1, "b": 3}},
        {"pair": [1, 2]},
    ]);
    // mapping equality is independent of member order
    let path = JsonPath::parse("$[?@.pair == {}]");
    assert!(path.is_err(), "object literals are not part of the grammar");
    let path = JsonPath::parse("$[?@.pair == $[1].pair]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 2);
    // 1 == 1.0, numerically
    let value = json!([{"n": 1}, {"n": 1.0}, {"n": "1"}]);
    let path = JsonPath::parse("$[?@.n == 1]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 2);
}

#[test]
fn ordering_comparisons_with_incompatible_types_are_false() {
    let value = json!([{"a": "x"}, {"a": 1}, {"a": null}, {"a": [1]}]);
    let path = JsonPath::parse("$[?@.a < 2]").unwrap();
    assert_eq!(path.query(&value).unwrap().values(), vec![json!({"a": 1})]);
    let path = JsonPath::parse("$[?@.a >= 'x']").unwrap();
    assert_eq!(path.query(&value).unwrap().values(), vec![json!({"a": "x"})]);
}

#[test]
fn ordering_is_undefined_for_arrays_and_objects() {
    let value = json!([
        {"a": [1], "b": [2]},
        {"a": {"k": 1}, "b": {"k": 2}},
        {"a": null, "b": null},
    ]);
    for query in ["$[?@.a < @.b]", "$[?@.a <= @.b]", "$[?@.a > @.b]", "$[?@.a >= @.b]"] {
        let path = JsonPath::parse(query).unwrap();
        assert!(path.query(&value).unwrap().is_empty(), "{query}");
    }
    // equality still applies to them
    let path = JsonPath::parse("$[?@.a == @.b]").unwrap();
    assert_eq!(path.query(&value).unwrap().values(), vec![json!({"a": null, "b": null})]);
}

#[test]
fn absent_values_compare_equal_only_to_absent() {
    let value = json!([{"a": 1}, {"b": 2}]);
    let path = JsonPath::parse("$[?@.missing == @.nothing]").unwrap();
    // both sides absent on every member
    assert_eq!(path.query(&value).unwrap().len(), 2);
    let path = JsonPath::parse("$[?@.a == @.nothing]").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
    let path = JsonPath::parse("$[?@.missing < 1]").unwrap();
    assert!(path.query(&value).unwrap().is_empty());
}

#[test]
fn descendant_on_scalars_does_not_recurse() {
    let value = json!({"word": "hello"});
    let path = JsonPath::parse("$.word..*").unwrap();
    assert!(path.query(&value).unwrap().is_empty());
    let path = JsonPath::parse("$..*").unwrap();
    assert_eq!(path.query(&value).unwrap().len(), 1);
}

#[test]
fn normalized_paths_use_bracket_notation() {
    let value = simple_example_json();
    let path = JsonPath::parse("$.foo.bop.thing[1]").unwrap();
    let nodes = path.query(&value).unwrap();
    let node = nodes.exactly_one().unwrap();
    assert_eq!(node.path(), "$['foo']['bop']['thing'][1]");
}

#[test]
fn every_node_round_trips_through_a_pointer() {
    let value = spec_store();
    let path = JsonPath::parse("$..*").unwrap();
    for node in &path.query(&value).unwrap() {
        let pointer = node.pointer();
        assert_eq!(
            pointer.resolve(node.root()).expect("resolves").as_ref(),
            node.value(),
            "{}",
            node.path(),
        );
        // and the same via serde_json's own pointer implementation
        assert_eq!(
            value.pointer(&node.location().as_json_pointer()).unwrap(),
            node.value(),
        );
    }
}

#[test]
fn every_node_location_round_trips_through_a_query() {
    let value = spec_store();
    let path = JsonPath::parse("$..[?@ || !@]").unwrap();
    for node in &path.query(&value).unwrap() {
        let reparsed = JsonPath::parse(&node.path()).expect("normalized paths reparse");
        let found = reparsed.query(&value).unwrap();
        assert_eq!(found.exactly_one().unwrap().value(), node.value());
    }
}

#[test]
fn queries_are_deterministic() {
    let value = spec_store();
    let path = JsonPath::parse("$..*").unwrap();
    let first = path.query(&value).unwrap();
    for _ in 0..3 {
        assert_eq!(path.query(&value).unwrap(), first);
    }
}

#[test]
fn strict_queries_agree_with_lenient_queries() {
    let value = spec_store();
    for query in [
        "$.store.book[*].author",
        "$..book[?@.price < 10]",
        "$.store.book[1:3]",
        "$..*",
        "$.store.book[?search(@.title, 'the')]",
    ] {
        let lenient = JsonPath::parse(query).unwrap().query(&value).unwrap();
        let strict = JsonPath::parse_strict(query).unwrap().query(&value).unwrap();
        assert_eq!(lenient, strict, "{query}");
    }
}

#[test]
fn interoperable_integer_bounds() {
    assert!(JsonPath::parse("$[9007199254740991]").is_ok());
    assert!(JsonPath::parse("$[-9007199254740991]").is_ok());
    let err = JsonPath::parse("$[9007199254740992]").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Index);
    assert!(JsonPath::parse("$[-9007199254740992]").is_err());
    assert!(JsonPath::parse("$[1:9007199254740992]").is_err());
}

#[test]
fn leading_zeros_are_rejected() {
    assert!(JsonPath::parse("$[010]").is_err());
    assert!(JsonPath::parse("$[01:2]").is_err());
}

#[test]
fn syntax_errors_carry_positions() {
    let err = JsonPath::parse("$.foo[").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
    assert!(err.position() >= 6, "position was {}", err.position());
    assert_eq!(err.line(), 1);
}

#[test]
fn ext_trait() {
    let value = json!({"foo": ["bar", "baz"]});
    let query = JsonPath::parse("$.foo[*]").unwrap();
    let nodes = value.json_path(&query).unwrap();
    assert_eq!(nodes.all(), vec!["bar", "baz"]);
}

#[test]
fn empty_nodelist_behaviors() {
    let value = json!({"foo": 1});
    let path = JsonPath::parse("$.bar").unwrap();
    let nodes: NodeList = path.query(&value).unwrap();
    assert!(nodes.is_empty());
    assert!(nodes.at_most_one().unwrap().is_none());
    assert!(nodes.exactly_one().is_err());
    assert_eq!(nodes.values_or_singular(), json!([]));
}

#[test]
fn patch_test_matches_pointer_resolution() {
    use serde_json_query::{JsonPatch, PatchError};
    let data = json!({"baz": "qux", "n": 1});
    let resolved = JsonPointer::parse("/baz").unwrap().resolve(&data).unwrap();
    assert_eq!(resolved.as_ref(), &json!("qux"));
    let patch = JsonPatch::new().test("/baz", json!("qux")).unwrap();
    assert!(patch.apply_to(&data).is_ok());
    let patch = JsonPatch::new().test("/baz", json!("bar")).unwrap();
    assert!(matches!(
        patch.apply_to(&data),
        Err(PatchError::TestFailure { index: 0 })
    ));
    // deep equality is numeric, like the filter engine's
    let patch = JsonPatch::new().test("/n", json!(1.0)).unwrap();
    assert!(patch.apply_to(&data).is_ok());
}

fn spec_store() -> Value {
    json!({
        "store": {
            "book": [
                {
                    "category": "reference",
                    "author": "Nigel Rees",
                    "title": "Sayings of the Century",
                    "price": 8.95
                },
                {
                    "category": "fiction",
                    "author": "Evelyn Waugh",
                    "title": "Sword of Honour",
                    "price": 12.99
                }
            ],
            "bicycle": {
                "color": "red",
                "price": 399
            }
        }
    })
}
