//! Grammar registry and driver.
//!
//! A grammar binds rule names to parser instances and optional post-parse
//! actions. Rules are defined through [`GrammarBuilder`] with the [`Dsl`]
//! builder API; [`GrammarBuilder::finish`] validates the definition (every
//! referenced rule exists, no duplicate names) and freezes it into an
//! immutable [`Grammar`]. The registry is a single source of truth: rule
//! references resolve against it by name at parse time, so a rule may freely
//! reference rules defined later in the same grammar, itself included.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::combinators::{Discard, FirstMatch, Optional, Repeat, Sequence};
use crate::cursor::Cursor;
use crate::diagnostics::SkeinError;
use crate::outcome::{MalformedDetail, ParseNode, ParseOutcome, ParseValue, Span};
use crate::parser::ParserRef;
use crate::terminals::{CharPredicate, CharRun, Empty, Fail, Literal, RuleRef, RunUntil};

/// Post-parse transform applied to a rule's matched value before the result
/// is handed back to the invoking parser.
pub type RuleAction = fn(ParseValue) -> ParseValue;

struct RuleEntry {
    parser: ParserRef,
    action: Option<RuleAction>,
}

/// The builder-API object passed to each rule's builder closure: one
/// constructor per primitive and combinator kind.
///
/// Custom terminals need no constructor here: any `Arc<dyn Parse>` built by
/// the caller participates like a built-in.
pub struct Dsl;

impl Dsl {
    pub fn literal(&self, text: &str) -> ParserRef {
        Arc::new(Literal::new(text))
    }

    pub fn char_run(&self, predicate: CharPredicate) -> ParserRef {
        Arc::new(CharRun::new(predicate))
    }

    pub fn run_until(&self, stop: CharPredicate, escape: char) -> ParserRef {
        Arc::new(RunUntil::new(stop, escape))
    }

    /// A by-name reference to another rule of the same grammar.
    pub fn rule(&self, name: &str) -> ParserRef {
        Arc::new(RuleRef::new(name))
    }

    pub fn empty(&self) -> ParserRef {
        Arc::new(Empty)
    }

    pub fn fail(&self) -> ParserRef {
        Arc::new(Fail)
    }

    pub fn sequence(&self, children: Vec<ParserRef>) -> ParserRef {
        Arc::new(Sequence::new(children))
    }

    pub fn repeat(&self, child: ParserRef) -> ParserRef {
        Arc::new(Repeat::new(child))
    }

    pub fn repeat_sep(
        &self,
        child: ParserRef,
        separator: ParserRef,
        allow_trailing: bool,
    ) -> ParserRef {
        Arc::new(Repeat::with_separator(child, separator, allow_trailing))
    }

    pub fn optional(&self, child: ParserRef) -> ParserRef {
        Arc::new(Optional::new(child))
    }

    pub fn first_match(&self, children: Vec<ParserRef>) -> ParserRef {
        Arc::new(FirstMatch::new(children))
    }

    pub fn discard(&self, child: ParserRef) -> ParserRef {
        Arc::new(Discard::new(child))
    }
}

/// Collects rule definitions and actions, then validates and freezes them
/// into a [`Grammar`].
#[derive(Default)]
pub struct GrammarBuilder {
    rules: HashMap<String, ParserRef>,
    actions: HashMap<String, RuleAction>,
    duplicates: Vec<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a rule. The builder closure receives the [`Dsl`] API object
    /// and returns the rule's parser; it may reference rules that are not
    /// defined yet.
    pub fn rule(&mut self, name: &str, build: impl FnOnce(&Dsl) -> ParserRef) -> &mut Self {
        if self.rules.insert(name.to_string(), build(&Dsl)).is_some() {
            self.duplicates.push(name.to_string());
        }
        self
    }

    /// Attaches a post-parse transform to a rule.
    pub fn action(&mut self, name: &str, action: RuleAction) -> &mut Self {
        self.actions.insert(name.to_string(), action);
        self
    }

    /// Validates the definition and returns the immutable grammar.
    ///
    /// Rejected here, unconditionally: duplicate rule names, a `rule(..)`
    /// reference to a name no rule defines, and an action attached to an
    /// undefined rule. These are grammar-author bugs and never degrade to a
    /// parse-time `NoMatch`.
    pub fn finish(self) -> Result<Grammar, SkeinError> {
        if !self.duplicates.is_empty() {
            return Err(SkeinError::grammar(format!(
                "duplicate rule definition: {}",
                self.duplicates.join(", ")
            )));
        }

        let mut referenced = BTreeSet::new();
        for parser in self.rules.values() {
            parser.referenced_rules(&mut referenced);
        }
        let missing: Vec<&String> = referenced
            .iter()
            .filter(|name| !self.rules.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(SkeinError::grammar(format!(
                "reference to undefined rule: {}",
                missing
                    .iter()
                    .map(|s| format!("'{}'", s))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        for name in self.actions.keys() {
            if !self.rules.contains_key(name) {
                return Err(SkeinError::grammar(format!(
                    "action attached to undefined rule '{}'",
                    name
                )));
            }
        }

        let Self { rules, actions, .. } = self;
        let rules = rules
            .into_iter()
            .map(|(name, parser)| {
                let action = actions.get(&name).copied();
                (name, RuleEntry { parser, action })
            })
            .collect();
        Ok(Grammar { rules })
    }
}

/// Options for a single driver invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// When set (the default), a successful match that leaves trailing input
    /// behind is converted into a parse error.
    pub require_full_consumption: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            require_full_consumption: true,
        }
    }
}

/// An immutable rule registry plus the driver entry point. Read-only after
/// construction; independent parses may run against one shared grammar from
/// multiple threads.
pub struct Grammar {
    rules: HashMap<String, RuleEntry>,
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("rules", &self.rules.keys().collect::<BTreeSet<_>>())
            .finish()
    }
}

impl Grammar {
    /// Invokes a named rule at the cursor's position: forks, delegates to the
    /// rule's parser, applies the rule's action, re-stamps the result tag
    /// with the rule name, and commits on a match.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not defined. [`GrammarBuilder::finish`] makes
    /// that unreachable for every reference inside the grammar; hitting it
    /// means a hand-constructed `RuleRef` bypassed validation.
    pub fn invoke(&self, name: &str, cursor: &mut Cursor) -> ParseOutcome {
        let Some(entry) = self.rules.get(name) else {
            panic!("rule '{}' is not defined in this grammar", name);
        };
        let mut fork = cursor.fork();
        match entry.parser.parse(&mut fork, self) {
            ParseOutcome::Matched(node) => {
                let mut value = node.value;
                if let Some(action) = entry.action {
                    value = action(value);
                }
                cursor.commit(&fork);
                ParseOutcome::Matched(ParseNode::new(name, value))
            }
            ParseOutcome::NoMatch => ParseOutcome::NoMatch,
            // Re-stamp so the failure names the grammar rule, but keep the
            // detail: malformed input stays a hard failure.
            ParseOutcome::Malformed(detail) => ParseOutcome::Malformed(MalformedDetail {
                tag: name.to_string(),
                ..detail
            }),
        }
    }

    /// Runs `entry_rule` against `input`. All-or-nothing: the result is the
    /// rule's (action-transformed) value or a [`SkeinError`]; no partial
    /// success is exposed.
    pub fn run(
        &self,
        input: &str,
        entry_rule: &str,
        options: RunOptions,
    ) -> Result<ParseValue, SkeinError> {
        if !self.rules.contains_key(entry_rule) {
            return Err(SkeinError::grammar(format!(
                "entry rule '{}' is not defined in this grammar",
                entry_rule
            )));
        }

        let mut cursor = Cursor::new(input);
        match self.invoke(entry_rule, &mut cursor) {
            ParseOutcome::Matched(node) => {
                if options.require_full_consumption && !cursor.at_end() {
                    return Err(SkeinError::parse_in(
                        format!(
                            "rule '{}' matched, but trailing input was not consumed",
                            entry_rule
                        ),
                        input,
                        Span::new(cursor.position(), cursor.len()),
                    )
                    .with_help("pass require_full_consumption: false to accept a prefix match"));
                }
                Ok(node.value)
            }
            ParseOutcome::NoMatch => Err(SkeinError::parse_in(
                format!("input does not match rule '{}'", entry_rule),
                input,
                Span::new(0, cursor.len().max(1)),
            )),
            ParseOutcome::Malformed(detail) => Err(SkeinError::parse_in(
                format!("malformed input in rule '{}': {}", detail.tag, detail.message),
                input,
                detail.span,
            )),
        }
    }

    /// [`Grammar::run`] with default options.
    pub fn parse(&self, input: &str, entry_rule: &str) -> Result<ParseValue, SkeinError> {
        self.run(input, entry_rule, RunOptions::default())
    }

    /// The names of all defined rules, for introspection.
    pub fn rule_names(&self) -> Vec<String> {
        self.rules.keys().cloned().collect()
    }
}
