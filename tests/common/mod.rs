//! Shared grammar fixtures for the integration suites.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use skein::{Grammar, GrammarBuilder, ParseValue};

lazy_static! {
    static ref REV_CHAR: Regex = Regex::new(r"[\w/.\-]").unwrap();
    static ref DIGIT: Regex = Regex::new(r"\d").unwrap();
    pub static ref REVISION_GRAMMAR: Grammar = revision_grammar();
}

fn is_rev_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    REV_CHAR.is_match(c.encode_utf8(&mut buf))
}

fn is_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT.is_match(c.encode_utf8(&mut buf))
}

fn number_action(value: ParseValue) -> ParseValue {
    let digits = value.as_text().expect("number rule collects digits");
    ParseValue::Number(digits.parse::<f64>().expect("digit run parses"))
}

/// `^` and `~` suffixes share a shape: the marker literal plus an optional
/// count, defaulting to 1.
fn suffix_record(kind: &str, value: ParseValue) -> ParseValue {
    let items = value.into_list().expect("suffix rules are sequences");
    let n = items
        .get(1)
        .and_then(|node| node.value.as_number())
        .unwrap_or(1.0);
    let mut record = BTreeMap::new();
    record.insert("type".to_string(), ParseValue::Text(kind.to_string()));
    record.insert("n".to_string(), ParseValue::Number(n));
    ParseValue::Map(record)
}

fn parent_action(value: ParseValue) -> ParseValue {
    suffix_record("parent", value)
}

fn ancestor_action(value: ParseValue) -> ParseValue {
    suffix_record("ancestor", value)
}

fn ref_action(value: ParseValue) -> ParseValue {
    let items = value.into_list().expect("ref rule is a sequence");
    let rev = items[0].value.as_text().expect("rev is text").to_string();
    let suffixes = items
        .get(1)
        .and_then(|node| node.value.as_list())
        .map(|nodes| nodes.to_vec())
        .unwrap_or_default();
    let mut record = BTreeMap::new();
    record.insert("rev".to_string(), ParseValue::Text(rev));
    record.insert("suffixes".to_string(), ParseValue::List(suffixes));
    ParseValue::Map(record)
}

/// The revision-reference grammar: a revision name followed by any mix of
/// `^N` (parent) and `~N` (ancestor) suffixes, as in `main^2~3`.
pub fn revision_grammar() -> Grammar {
    let mut builder = GrammarBuilder::new();

    builder.rule("rev", |a| a.char_run(is_rev_char));
    builder.rule("number", |a| a.char_run(is_digit));
    builder.rule("parent", |a| {
        a.sequence(vec![a.literal("^"), a.optional(a.rule("number"))])
    });
    builder.rule("ancestor", |a| {
        a.sequence(vec![a.literal("~"), a.optional(a.rule("number"))])
    });
    builder.rule("suffix", |a| {
        a.first_match(vec![a.rule("parent"), a.rule("ancestor")])
    });
    builder.rule("ref", |a| {
        a.sequence(vec![a.rule("rev"), a.optional(a.repeat(a.rule("suffix")))])
    });

    builder.action("number", number_action);
    builder.action("parent", parent_action);
    builder.action("ancestor", ancestor_action);
    builder.action("ref", ref_action);

    builder.finish().expect("revision grammar is well-formed")
}
