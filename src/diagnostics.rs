//! The error taxonomy of the engine.
//!
//! There are exactly two kinds of outcome that are not success. A *parse
//! failure* is a normal evaluation result: the input did not match, the trace
//! has been rewound to the failing fragment's entry position, and choice or
//! repetition fragments are free to backtrack over it. A *configuration
//! error* (a named fragment referencing an unregistered rule) indicates a
//! malformed grammar, not malformed input: it is fatal, aborts the parse
//! immediately, and is never backtracked over.
//!
//! All variants live in one [`ParseError`] enum with `thiserror` and `miette`
//! derives; [`ParseError::is_fatal`] is how the engine tells the two classes
//! apart.

use miette::Diagnostic;
use thiserror::Error;

/// Every way a parse can go wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    /// A fragment did not match the input at `at`. Internal soft failure;
    /// ordinarily consumed by choice/repetition fragments, surfaced only when
    /// the caller evaluates a fragment directly.
    #[error("input did not match at token position {at}")]
    Mismatch { at: usize },

    /// A rewrite or lens hook rejected an otherwise successful sub-parse.
    /// Soft: the enclosing fragment fails and rewinds like any mismatch.
    #[error("semantic hook rejected the parse at token position {at}: {reason}")]
    Rejected { at: usize, reason: String },

    /// Top-level failure reported by [`parse`](crate::eval::parse). The
    /// position is the trace's high-water mark, which under ordered-choice
    /// backtracking is a better "failed near here" signal than wherever the
    /// final alternative happened to give up.
    #[error("parse failed near token position {furthest}")]
    #[diagnostic(help(
        "this is the furthest position any alternative reached; earlier failures were backtracked over"
    ))]
    NoParse { furthest: usize },

    /// A named fragment referenced a rule absent from the grammar table.
    /// Fatal: this is a malformed grammar, not malformed input.
    #[error("no grammar rule registered under the name `{name}`")]
    #[diagnostic(help("register the rule with Grammar::register before parsing"))]
    UnknownRule { name: String },
}

impl ParseError {
    pub(crate) fn mismatch(at: usize) -> Self {
        ParseError::Mismatch { at }
    }

    /// Whether this error aborts the parse instead of being a backtrackable
    /// failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseError::UnknownRule { .. })
    }
}
