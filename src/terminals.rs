//! Terminal parsers: the primitives that read symbols directly off the
//! cursor. Combinators never touch the cursor themselves; everything that
//! consumes input lives here.

use std::collections::BTreeSet;

use crate::cursor::Cursor;
use crate::grammar::Grammar;
use crate::outcome::{ParseOutcome, ParseValue, Span};
use crate::parser::Parse;

/// Predicate over a single input symbol, used by [`CharRun`] and as the stop
/// condition of [`RunUntil`].
pub type CharPredicate = fn(char) -> bool;

/// Matches an exact symbol sequence.
pub struct Literal {
    text: String,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Parse for Literal {
    fn parse(&self, cursor: &mut Cursor, _grammar: &Grammar) -> ParseOutcome {
        let mut fork = cursor.fork();
        for expected in self.text.chars() {
            match fork.advance() {
                Some(c) if c == expected => {}
                // Mismatch or end of input: discard the fork.
                _ => return ParseOutcome::NoMatch,
            }
        }
        cursor.commit(&fork);
        ParseOutcome::matched("literal", ParseValue::Text(self.text.clone()))
    }
}

/// Greedily consumes symbols while a predicate holds. Requires at least one
/// symbol; callers wanting zero-or-more wrap it in `Optional`.
pub struct CharRun {
    predicate: CharPredicate,
}

impl CharRun {
    pub fn new(predicate: CharPredicate) -> Self {
        Self { predicate }
    }
}

impl Parse for CharRun {
    fn parse(&self, cursor: &mut Cursor, _grammar: &Grammar) -> ParseOutcome {
        let mut fork = cursor.fork();
        let mut consumed = String::new();
        while let Some(c) = fork.peek() {
            if !(self.predicate)(c) {
                break;
            }
            consumed.push(c);
            fork.advance();
        }
        if consumed.is_empty() {
            return ParseOutcome::NoMatch;
        }
        cursor.commit(&fork);
        ParseOutcome::matched("run", ParseValue::Text(consumed))
    }
}

/// Consumes symbols into a buffer until the stop predicate fires, with a
/// one-symbol escape: `escape` suppresses the stop condition for the symbol
/// after it and is itself dropped from the buffer.
///
/// An escape symbol as the last symbol of input has nothing to escape; that
/// input is malformed, not unmatched and not a truncated match.
pub struct RunUntil {
    stop: CharPredicate,
    escape: char,
}

impl RunUntil {
    pub fn new(stop: CharPredicate, escape: char) -> Self {
        Self { stop, escape }
    }
}

impl Parse for RunUntil {
    fn parse(&self, cursor: &mut Cursor, _grammar: &Grammar) -> ParseOutcome {
        let mut fork = cursor.fork();
        let mut buffer = String::new();
        let mut escape_pending = false;
        loop {
            let Some(c) = fork.peek() else {
                if escape_pending {
                    return ParseOutcome::malformed(
                        "until",
                        "unterminated escape sequence",
                        Span::at(fork.position().saturating_sub(1)),
                    );
                }
                break;
            };
            if escape_pending {
                // The escaped symbol is taken verbatim, stop condition and all.
                buffer.push(c);
                fork.advance();
                escape_pending = false;
            } else if c == self.escape {
                fork.advance();
                escape_pending = true;
            } else if (self.stop)(c) {
                break;
            } else {
                buffer.push(c);
                fork.advance();
            }
        }
        if buffer.is_empty() {
            return ParseOutcome::NoMatch;
        }
        cursor.commit(&fork);
        ParseOutcome::matched("until", ParseValue::Text(buffer))
    }
}

/// Invokes a named grammar rule. Resolution happens at parse time against
/// the grammar registry, which is what allows rules to reference rules
/// defined later in the same grammar, themselves included.
pub struct RuleRef {
    name: String,
}

impl RuleRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Parse for RuleRef {
    fn parse(&self, cursor: &mut Cursor, grammar: &Grammar) -> ParseOutcome {
        grammar.invoke(&self.name, cursor)
    }

    fn referenced_rules(&self, acc: &mut BTreeSet<String>) {
        acc.insert(self.name.clone());
    }
}

/// Consumes nothing and always matches, with a discardable payload. Used as
/// a placeholder arm.
pub struct Empty;

impl Parse for Empty {
    fn parse(&self, _cursor: &mut Cursor, _grammar: &Grammar) -> ParseOutcome {
        ParseOutcome::matched("empty", ParseValue::Nothing)
    }
}

/// Never matches. Used to explicitly prune a grammar branch.
pub struct Fail;

impl Parse for Fail {
    fn parse(&self, _cursor: &mut Cursor, _grammar: &Grammar) -> ParseOutcome {
        ParseOutcome::NoMatch
    }
}
