//! Combinators: parsers built by composing other parsers. None of these
//! consume input themselves; they orchestrate their children's fork/commit
//! cycles and enforce the tri-state propagation rules. In particular, a
//! `Malformed` child is never downgraded to `NoMatch`.

use std::collections::BTreeSet;

use crate::cursor::Cursor;
use crate::grammar::Grammar;
use crate::outcome::{ParseOutcome, ParseValue};
use crate::parser::{Parse, ParserRef};

/// Runs children in order; all must match. Collects the children's nodes,
/// skipping discardable payloads. Commits once, at the end; a failure
/// anywhere leaves the original cursor untouched.
pub struct Sequence {
    children: Vec<ParserRef>,
}

impl Sequence {
    pub fn new(children: Vec<ParserRef>) -> Self {
        Self { children }
    }
}

impl Parse for Sequence {
    fn parse(&self, cursor: &mut Cursor, grammar: &Grammar) -> ParseOutcome {
        let mut fork = cursor.fork();
        let mut items = Vec::new();
        for child in &self.children {
            match child.parse(&mut fork, grammar) {
                ParseOutcome::Matched(node) => {
                    if !node.value.is_nothing() {
                        items.push(node);
                    }
                }
                ParseOutcome::NoMatch => return ParseOutcome::NoMatch,
                ParseOutcome::Malformed(detail) => return ParseOutcome::Malformed(detail),
            }
        }
        cursor.commit(&fork);
        ParseOutcome::matched("sequence", ParseValue::List(items))
    }

    fn referenced_rules(&self, acc: &mut BTreeSet<String>) {
        for child in &self.children {
            child.referenced_rules(acc);
        }
    }
}

/// Zero-or-more repetitions of a child, optionally interleaved with a
/// separator parser.
///
/// Separator results are collected like any other child (callers filter by
/// tag). With `allow_trailing` unset, a separator not followed by another
/// element is rolled back and left unconsumed.
///
/// A round that matches while consuming nothing is collected once and ends
/// the loop; repetition of a zero-length match cannot loop forever.
pub struct Repeat {
    child: ParserRef,
    separator: Option<ParserRef>,
    allow_trailing: bool,
}

impl Repeat {
    pub fn new(child: ParserRef) -> Self {
        Self {
            child,
            separator: None,
            allow_trailing: false,
        }
    }

    pub fn with_separator(child: ParserRef, separator: ParserRef, allow_trailing: bool) -> Self {
        Self {
            child,
            separator: Some(separator),
            allow_trailing,
        }
    }
}

impl Parse for Repeat {
    fn parse(&self, cursor: &mut Cursor, grammar: &Grammar) -> ParseOutcome {
        let mut fork = cursor.fork();
        let mut items = Vec::new();
        let mut first = true;
        loop {
            let round_start = fork.position();
            let mut attempt = fork.fork();
            let mut pending = Vec::new();

            // After the first element a separator, when configured, leads
            // each round. It stays uncommitted until the element lands.
            if !first {
                if let Some(separator) = &self.separator {
                    match separator.parse(&mut attempt, grammar) {
                        ParseOutcome::NoMatch => break,
                        ParseOutcome::Malformed(detail) => {
                            return ParseOutcome::Malformed(detail)
                        }
                        ParseOutcome::Matched(node) => {
                            if !node.value.is_nothing() {
                                pending.push(node);
                            }
                        }
                    }
                }
            }

            match self.child.parse(&mut attempt, grammar) {
                ParseOutcome::Malformed(detail) => return ParseOutcome::Malformed(detail),
                ParseOutcome::NoMatch => {
                    if !first && self.separator.is_some() && self.allow_trailing {
                        // Keep the trailing separator.
                        fork.commit(&attempt);
                        items.append(&mut pending);
                    }
                    break;
                }
                ParseOutcome::Matched(node) => {
                    fork.commit(&attempt);
                    items.append(&mut pending);
                    if !node.value.is_nothing() {
                        items.push(node);
                    }
                    first = false;
                    if fork.position() == round_start {
                        break;
                    }
                }
            }
        }
        cursor.commit(&fork);
        ParseOutcome::matched("repeat", ParseValue::List(items))
    }

    fn referenced_rules(&self, acc: &mut BTreeSet<String>) {
        self.child.referenced_rules(acc);
        if let Some(separator) = &self.separator {
            separator.referenced_rules(acc);
        }
    }
}

/// Tries the child; absence is success. `NoMatch` becomes a discardable
/// match, `Malformed` still propagates: optionality absorbs "didn't
/// apply", never "applied badly".
pub struct Optional {
    child: ParserRef,
}

impl Optional {
    pub fn new(child: ParserRef) -> Self {
        Self { child }
    }
}

impl Parse for Optional {
    fn parse(&self, cursor: &mut Cursor, grammar: &Grammar) -> ParseOutcome {
        let mut fork = cursor.fork();
        match self.child.parse(&mut fork, grammar) {
            ParseOutcome::Matched(node) => {
                cursor.commit(&fork);
                ParseOutcome::Matched(node)
            }
            ParseOutcome::NoMatch => ParseOutcome::matched("optional", ParseValue::Nothing),
            ParseOutcome::Malformed(detail) => ParseOutcome::Malformed(detail),
        }
    }

    fn referenced_rules(&self, acc: &mut BTreeSet<String>) {
        self.child.referenced_rules(acc);
    }
}

/// Ordered choice. Alternatives are tried strictly left to right from the
/// same starting position; the first `Matched` or the first `Malformed`
/// ends the search, whichever is encountered first in try order.
pub struct FirstMatch {
    children: Vec<ParserRef>,
}

impl FirstMatch {
    pub fn new(children: Vec<ParserRef>) -> Self {
        Self { children }
    }
}

impl Parse for FirstMatch {
    fn parse(&self, cursor: &mut Cursor, grammar: &Grammar) -> ParseOutcome {
        for child in &self.children {
            let mut fork = cursor.fork();
            match child.parse(&mut fork, grammar) {
                ParseOutcome::Matched(node) => {
                    cursor.commit(&fork);
                    return ParseOutcome::Matched(node);
                }
                // Broken input: stop trying alternatives, commit nothing.
                ParseOutcome::Malformed(detail) => return ParseOutcome::Malformed(detail),
                ParseOutcome::NoMatch => {}
            }
        }
        ParseOutcome::NoMatch
    }

    fn referenced_rules(&self, acc: &mut BTreeSet<String>) {
        for child in &self.children {
            child.referenced_rules(acc);
        }
    }
}

/// Requires and consumes the child's match positionally but replaces its
/// payload with the discardable marker, so collecting parents drop it.
pub struct Discard {
    child: ParserRef,
}

impl Discard {
    pub fn new(child: ParserRef) -> Self {
        Self { child }
    }
}

impl Parse for Discard {
    fn parse(&self, cursor: &mut Cursor, grammar: &Grammar) -> ParseOutcome {
        let mut fork = cursor.fork();
        match self.child.parse(&mut fork, grammar) {
            ParseOutcome::Matched(node) => {
                cursor.commit(&fork);
                ParseOutcome::matched(node.tag, ParseValue::Nothing)
            }
            other => other,
        }
    }

    fn referenced_rules(&self, acc: &mut BTreeSet<String>) {
        self.child.referenced_rules(acc);
    }
}
