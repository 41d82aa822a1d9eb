//! End-to-end exercise of a realistic consumer grammar: revision references
//! of the form `rev`, optionally followed by `^N` (parent) and `~N`
//! (ancestor) suffixes in any mix.

mod common;

use common::REVISION_GRAMMAR;
use serde_json::json;
use skein::{ParseValue, RunOptions};

fn parse_ref(input: &str) -> serde_json::Value {
    REVISION_GRAMMAR
        .parse(input, "ref")
        .unwrap_or_else(|e| panic!("'{input}' should parse: {e}"))
        .into()
}

#[test]
fn plain_revision_has_no_suffixes() {
    assert_eq!(
        parse_ref("HEAD"),
        json!({ "rev": "HEAD", "suffixes": [] })
    );
}

#[test]
fn parent_and_ancestor_suffixes_mix_in_order() {
    assert_eq!(
        parse_ref("main^2~3"),
        json!({
            "rev": "main",
            "suffixes": [
                { "type": "parent", "n": 2.0 },
                { "type": "ancestor", "n": 3.0 },
            ],
        })
    );
}

#[test]
fn bare_suffix_markers_default_to_one() {
    assert_eq!(
        parse_ref("master^^^"),
        json!({
            "rev": "master",
            "suffixes": [
                { "type": "parent", "n": 1.0 },
                { "type": "parent", "n": 1.0 },
                { "type": "parent", "n": 1.0 },
            ],
        })
    );
}

#[test]
fn revision_names_may_contain_slashes_and_dots() {
    assert_eq!(
        parse_ref("tags/foo~3"),
        json!({
            "rev": "tags/foo",
            "suffixes": [{ "type": "ancestor", "n": 3.0 }],
        })
    );
}

#[test]
fn garbage_after_the_reference_is_rejected() {
    let err = REVISION_GRAMMAR.parse("main^2 extra", "ref").unwrap_err();
    assert!(err.message().contains("trailing input"));

    // Unless the caller opts out of full consumption.
    let value = REVISION_GRAMMAR
        .run(
            "main^2 extra",
            "ref",
            RunOptions {
                require_full_consumption: false,
            },
        )
        .unwrap();
    let record = value.as_map().unwrap();
    assert_eq!(record.get("rev"), Some(&ParseValue::Text("main".into())));
}

#[test]
fn empty_input_does_not_name_a_revision() {
    assert!(REVISION_GRAMMAR.parse("", "ref").is_err());
}
