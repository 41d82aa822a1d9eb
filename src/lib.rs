//! Skein: a backtracking parser-combinator engine.
//!
//! Grammars are built out of composable parsing primitives (literals,
//! character runs, sequences, repetition, ordered choice) and recursive
//! named rules, and produce a structured, semantically-labeled parse tree
//! from an input character stream. Backtracking rides on a forkable
//! [`Cursor`]; results travel as the tri-state [`ParseOutcome`], which keeps
//! "this alternative didn't apply" strictly apart from "this alternative
//! matched garbage".
//!
//! ```
//! use skein::{GrammarBuilder, ParseValue};
//!
//! let mut builder = GrammarBuilder::new();
//! builder.rule("greeting", |a| {
//!     a.sequence(vec![
//!         a.literal("hello"),
//!         a.discard(a.char_run(|c| c == ' ')),
//!         a.rule("name"),
//!     ])
//! });
//! builder.rule("name", |a| a.char_run(|c| c.is_ascii_alphabetic()));
//! let grammar = builder.finish().unwrap();
//!
//! let value = grammar.parse("hello skein", "greeting").unwrap();
//! let items = value.as_list().unwrap();
//! assert_eq!(items[1].tag, "name");
//! assert_eq!(items[1].value, ParseValue::Text("skein".into()));
//! ```

pub use crate::diagnostics::{ErrorContext, SkeinError};

pub mod combinators;
pub mod cursor;
pub mod diagnostics;
pub mod grammar;
pub mod outcome;
pub mod parser;
pub mod terminals;

pub use crate::cursor::Cursor;
pub use crate::grammar::{Dsl, Grammar, GrammarBuilder, RuleAction, RunOptions};
pub use crate::outcome::{MalformedDetail, ParseNode, ParseOutcome, ParseValue, Span};
pub use crate::parser::{Parse, ParserRef};
pub use crate::terminals::CharPredicate;
