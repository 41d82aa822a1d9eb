//! Parse results and semantic parse values.
//!
//! Every parser communicates through the tri-state [`ParseOutcome`]. The
//! three states are deliberately not collapsible into a `Result`: `NoMatch`
//! means "this alternative does not apply here" and is safe to backtrack
//! over, while `Malformed` means "this alternative applies and the input is
//! broken" and must propagate as a hard failure. No combinator is permitted
//! to turn `Malformed` into `NoMatch`; conflating the two would let grammars
//! silently accept corrupt input by falling through to an unrelated
//! alternative that happens to match a prefix.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open range of symbol positions in the input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A single-position span, used when a failure points at one symbol.
    pub fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

/// The semantic payload of a successful match.
///
/// `Nothing` is the discardable marker: [`Sequence`](crate::combinators::Sequence)
/// and [`Repeat`](crate::combinators::Repeat) skip children carrying it when
/// collecting their value lists, so positionally-required-but-semantically-
/// irrelevant matches (discarded whitespace, absent optionals) never clutter
/// the tree handed to actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParseValue {
    Nothing,
    Text(String),
    Number(f64),
    List(Vec<ParseNode>),
    Map(BTreeMap<String, ParseValue>),
}

impl ParseValue {
    pub fn is_nothing(&self) -> bool {
        matches!(self, ParseValue::Nothing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParseValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParseValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParseNode]> {
        match self {
            ParseValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ParseValue>> {
        match self {
            ParseValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<ParseNode>> {
        match self {
            ParseValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the type name of this value as a string (for diagnostics and
    /// action error messages).
    pub fn type_name(&self) -> &'static str {
        match self {
            ParseValue::Nothing => "Nothing",
            ParseValue::Text(_) => "Text",
            ParseValue::Number(_) => "Number",
            ParseValue::List(_) => "List",
            ParseValue::Map(_) => "Map",
        }
    }

    fn pretty(&self) -> String {
        match self {
            ParseValue::Nothing => "#nothing".to_string(),
            ParseValue::Text(s) => format!("{:?}", s),
            ParseValue::Number(n) => n.to_string(),
            ParseValue::List(items) => {
                let inner = items
                    .iter()
                    .map(|n| format!("{}:{}", n.tag, n.value.pretty()))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("({})", inner)
            }
            ParseValue::Map(entries) => {
                let inner = entries
                    .iter()
                    .map(|(k, v)| format!("{} {}", k, v.pretty()))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{{{}}}", inner)
            }
        }
    }
}

impl fmt::Display for ParseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

impl From<ParseValue> for serde_json::Value {
    fn from(value: ParseValue) -> Self {
        match value {
            ParseValue::Nothing => serde_json::Value::Null,
            ParseValue::Text(s) => serde_json::Value::String(s),
            ParseValue::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ParseValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(|n| n.value.into()).collect())
            }
            ParseValue::Map(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into()))
                    .collect(),
            ),
        }
    }
}

/// A tagged node of the parse tree: which primitive or grammar rule produced
/// the value, and the value itself. Rule invocation re-stamps the tag with
/// the rule name, so actions can filter collected children by origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseNode {
    pub tag: String,
    pub value: ParseValue,
}

impl ParseNode {
    pub fn new(tag: impl Into<String>, value: ParseValue) -> Self {
        Self {
            tag: tag.into(),
            value,
        }
    }
}

/// What went wrong inside a `Malformed` result: the tag of the parser that
/// detected the breakage, a message, and the symbol span it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedDetail {
    pub tag: String,
    pub message: String,
    pub span: Span,
}

/// The tri-state result every parser returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The parser matched; the fork was committed.
    Matched(ParseNode),
    /// This alternative does not apply here. The cursor is untouched and a
    /// sibling alternative may be tried.
    NoMatch,
    /// The input is syntactically broken. Propagates as a hard failure;
    /// never absorbed by `FirstMatch` or `Optional`.
    Malformed(MalformedDetail),
}

impl ParseOutcome {
    pub fn matched(tag: impl Into<String>, value: ParseValue) -> Self {
        ParseOutcome::Matched(ParseNode::new(tag, value))
    }

    pub fn malformed(tag: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        ParseOutcome::Malformed(MalformedDetail {
            tag: tag.into(),
            message: message.into(),
            span,
        })
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, ParseOutcome::Matched(_))
    }
}

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn nothing_marker_is_recognized() {
        assert!(ParseValue::Nothing.is_nothing());
        assert!(!ParseValue::Text("".into()).is_nothing());
    }

    #[test]
    fn json_conversion_preserves_structure() {
        let mut entries = BTreeMap::new();
        entries.insert("rev".to_string(), ParseValue::Text("main".into()));
        entries.insert(
            "suffixes".to_string(),
            ParseValue::List(vec![ParseNode::new("n", ParseValue::Number(2.0))]),
        );
        let json: serde_json::Value = ParseValue::Map(entries).into();
        assert_eq!(json, serde_json::json!({ "rev": "main", "suffixes": [2.0] }));
    }

    #[test]
    fn pretty_prints_tagged_lists() {
        let value = ParseValue::List(vec![
            ParseNode::new("literal", ParseValue::Text("^".into())),
            ParseNode::new("number", ParseValue::Number(2.0)),
        ]);
        assert_eq!(value.to_string(), r#"(literal:"^" number:2)"#);
    }
}
