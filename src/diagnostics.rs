//! The crate error type.
//!
//! Parsing failures inside the engine never travel as errors: combinators
//! communicate exclusively through [`ParseOutcome`](crate::outcome::ParseOutcome)
//! so that backtracking stays cheap on the "try the next alternative" path.
//! The grammar driver is the single place where a failure crosses the engine
//! boundary, and it crosses as a [`SkeinError`]. Grammar-definition mistakes
//! (undefined rule references, duplicate names, unknown entry rules) are the
//! other producer; those fail at definition or first-use time, never as a
//! silent non-match.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::outcome::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Minimal, composable error context for diagnostics: the input the failure
/// points into, a byte span within it, and an optional help message.
#[derive(Debug, Default)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<Span>,
    pub help: Option<String>,
}

/// Unified error type for both Skein failure surfaces: parse failures
/// raised by the driver, and grammar-definition errors.
#[derive(Debug, Error)]
pub enum SkeinError {
    #[error("Parse error: {message}")]
    Parse { message: String, ctx: ErrorContext },
    #[error("Grammar error: {message}")]
    Grammar { message: String, ctx: ErrorContext },
}

impl SkeinError {
    /// A parse error with no source attached.
    pub fn parse(message: impl Into<String>) -> Self {
        SkeinError::Parse {
            message: message.into(),
            ctx: ErrorContext::default(),
        }
    }

    /// A parse error pointing into `input`. `span` is in symbol (char)
    /// positions as tracked by the cursor; it is converted to byte offsets
    /// here, at the boundary, so miette can label the original text.
    pub fn parse_in(message: impl Into<String>, input: &str, span: Span) -> Self {
        SkeinError::Parse {
            message: message.into(),
            ctx: ErrorContext {
                source: Some(Arc::new(NamedSource::new("input", input.to_string()))),
                span: Some(to_byte_span(input, span)),
                help: None,
            },
        }
    }

    /// A grammar-definition error.
    pub fn grammar(message: impl Into<String>) -> Self {
        SkeinError::Grammar {
            message: message.into(),
            ctx: ErrorContext::default(),
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.ctx_mut().help = Some(help.into());
        self
    }

    pub fn message(&self) -> &str {
        match self {
            SkeinError::Parse { message, .. } | SkeinError::Grammar { message, .. } => message,
        }
    }

    fn ctx(&self) -> &ErrorContext {
        match self {
            SkeinError::Parse { ctx, .. } | SkeinError::Grammar { ctx, .. } => ctx,
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            SkeinError::Parse { ctx, .. } | SkeinError::Grammar { ctx, .. } => ctx,
        }
    }
}

impl Diagnostic for SkeinError {
    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.ctx().span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.message().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts a char-position span (as tracked by the cursor) into a byte
/// span into `input`, clamping at the end of the text.
pub fn to_byte_span(input: &str, span: Span) -> Span {
    let byte_at = |char_pos: usize| {
        input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(input.len())
    };
    Span {
        start: byte_at(span.start),
        end: byte_at(span.end),
    }
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn parse_error_renders_span_and_help() {
        let err = SkeinError::parse_in("trailing input", "abcx", Span::new(3, 4))
            .with_help("remove the trailing symbols");
        let report = Report::new(err);
        let output = format!("{report:?}");
        assert!(output.contains("trailing input"));
        assert!(output.contains("remove the trailing symbols"));
    }

    #[test]
    fn grammar_error_has_no_source() {
        let err = SkeinError::grammar("reference to undefined rule: 'numbr'");
        assert!(err.ctx().source.is_none());
        assert!(format!("{err}").contains("Grammar error"));
    }

    #[test]
    fn byte_span_conversion_handles_multibyte_symbols() {
        // 'é' is two bytes: char positions 2..3 start at byte 3.
        let input = "héllo";
        assert_eq!(to_byte_span(input, Span::new(2, 3)), Span::new(3, 4));
        // Past-the-end positions clamp to the text length.
        assert_eq!(to_byte_span(input, Span::new(5, 9)), Span::new(6, 6));
    }
}
