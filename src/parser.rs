//! The primitive parser contract.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cursor::Cursor;
use crate::grammar::Grammar;
use crate::outcome::ParseOutcome;

/// The interface every terminal and combinator implements.
///
/// Parsers are stateless values: construction-time parameters only, no
/// per-call mutable state. The same instance is shared across every
/// invocation of the grammar, including recursive ones, which is why the
/// trait takes `&self` and why [`ParserRef`] is an `Arc`.
///
/// The grammar is threaded through `parse` as an indirection table:
/// [`RuleRef`](crate::terminals::RuleRef) resolves rule names against it at
/// parse time, which is what lets a rule reference another rule defined
/// later in the same grammar (forward and mutual recursion) without any
/// placeholder-cell machinery.
pub trait Parse: Send + Sync {
    /// Attempts a match at the cursor's position.
    ///
    /// Implementations must not consume from `cursor` directly: fork it,
    /// consume from the fork, and commit the fork back only on an accepted
    /// match. On `NoMatch` and `Malformed` the cursor must be left exactly
    /// where it was.
    fn parse(&self, cursor: &mut Cursor, grammar: &Grammar) -> ParseOutcome;

    /// Accumulates the names of every rule this parser (transitively)
    /// references, for definition-time grammar validation. Terminals other
    /// than `RuleRef` have nothing to report.
    fn referenced_rules(&self, _acc: &mut BTreeSet<String>) {}
}

/// Shared handle to a parser. Grammars, combinators, and user code all hold
/// parsers through this type.
pub type ParserRef = Arc<dyn Parse>;
