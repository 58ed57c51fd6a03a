//! The combinator algebra: fragment variants and construction operators.
//!
//! A [`Parser`] value is an immutable description of how to parse, never of
//! parse progress; all mutable state lives in [`State`](crate::state::State).
//! Child links are `Arc`s, so fragments form a cheaply-clonable graph that a
//! grammar builds once and reuses across every parse, including parses
//! running on other threads.
//!
//! The construction operators flatten as they build: chaining [`Parser::or`]
//! onto an existing choice extends its alternative list instead of nesting
//! choice-of-choice wrappers (same for [`Parser::then`] and sequences), so
//! evaluation never has to unwrap towers of two-element nodes.

use std::fmt;
use std::ops::{Add, BitOr, Not};
use std::sync::Arc;

use crate::ast::Ast;
use crate::state::State;
use crate::token::{Lexer, Token};

/// Zero-width test run against the whole parse state.
pub type PredicateFn<C> = dyn Fn(&mut State<C>) -> bool + Send + Sync;

/// Test a literal rule applies to the current token.
pub type TokenTest = dyn Fn(&Token) -> bool + Send + Sync;

/// Produces the alternate lexer a literal rule switches to.
pub type LexerFactory = dyn Fn() -> Box<dyn Lexer> + Send + Sync;

/// Post-processes a successful sub-parse's tree. An `Err` is propagated as a
/// parse failure of the enclosing fragment.
pub type RewriteFn<C> = dyn Fn(&State<C>, Ast<C>) -> Result<Ast<C>, String> + Send + Sync;

/// Derives a new semantic context from the old one and a sub-parse's tree.
pub type LensFn<C> = dyn Fn(&C, &Ast<C>) -> Result<C, String> + Send + Sync;

/// A single-token matching rule, optionally switching lexical mode.
///
/// When `lexer` is present, the engine installs the produced lexer as the
/// active token source while this literal is being matched and restores the
/// previous one on the same backtracking boundary, whether the match
/// succeeded or not. Tokens already buffered in the trace are unaffected; a
/// mode switch only governs fresh fetches.
#[derive(Clone)]
pub struct LiteralRule {
    pub test: Arc<TokenTest>,
    pub lexer: Option<Arc<LexerFactory>>,
}

impl fmt::Debug for LiteralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Literal")
            .field("lexer", &self.lexer.is_some())
            .finish()
    }
}

/// One grammar fragment: the closed variant set of the algebra.
///
/// Leaves are built with the associated constructors
/// ([`Parser::literal`], [`Parser::predicate`], [`Parser::anything`],
/// [`Parser::named`]); larger fragments with the combinator methods and the
/// `|` (ordered choice), `+` (sequence) and `!` (negative lookahead)
/// operators.
#[derive(Clone)]
pub enum Parser<C> {
    /// Zero-width semantic test against the parse state.
    Predicate(Arc<PredicateFn<C>>),
    /// Consumes exactly one token satisfying the rule's test.
    Literal(LiteralRule),
    /// Consumes exactly one token unconditionally; fails only at end of input.
    Anything,
    /// Ordered sequence evaluated on one continuing cursor.
    And(Vec<Arc<Parser<C>>>),
    /// Ordered choice: first success wins, alternatives tried from one entry
    /// position.
    Or(Vec<Arc<Parser<C>>>),
    /// Greedy repetition of `body`; `at_most: None` means unbounded.
    Repeat {
        at_least: usize,
        at_most: Option<usize>,
        body: Arc<Parser<C>>,
    },
    /// Negative lookahead: zero-width success iff `body` fails here.
    Except(Arc<Parser<C>>),
    /// Reference to a rule in the grammar table, resolved at evaluation time.
    Named(String),
    /// Applies a rewrite hook to the body's tree on success.
    Rewrite {
        body: Arc<Parser<C>>,
        rewrite: Arc<RewriteFn<C>>,
    },
    /// Threads a derived semantic context into subsequent parsing on success.
    Lens {
        lens: Arc<LensFn<C>>,
        body: Arc<Parser<C>>,
    },
}

// ----------------------------------------------------------------------------
// Leaf constructors
// ----------------------------------------------------------------------------

impl<C> Parser<C> {
    /// A zero-width fragment that succeeds iff `test` does.
    pub fn predicate(test: impl Fn(&mut State<C>) -> bool + Send + Sync + 'static) -> Self {
        Parser::Predicate(Arc::new(test))
    }

    /// Consumes one token satisfying `test`.
    pub fn literal(test: impl Fn(&Token) -> bool + Send + Sync + 'static) -> Self {
        Parser::Literal(LiteralRule {
            test: Arc::new(test),
            lexer: None,
        })
    }

    /// Consumes one token satisfying `test`, fetching it (and nothing that
    /// was already buffered) through the lexer produced by `factory`.
    pub fn literal_with_lexer(
        test: impl Fn(&Token) -> bool + Send + Sync + 'static,
        factory: impl Fn() -> Box<dyn Lexer> + Send + Sync + 'static,
    ) -> Self {
        Parser::Literal(LiteralRule {
            test: Arc::new(test),
            lexer: Some(Arc::new(factory)),
        })
    }

    /// Consumes any one token.
    pub fn anything() -> Self {
        Parser::Anything
    }

    /// A reference to the grammar rule registered under `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Parser::Named(name.into())
    }

    /// Consumes one token whose kind equals `name`.
    pub fn token_named(name: impl Into<String>) -> Self {
        let name = name.into();
        Parser::literal(move |token| token.name == name)
    }

    /// Consumes one token whose lexeme equals `text`.
    pub fn token_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Parser::literal(move |token| !token.is_end() && token.lexeme == text)
    }

    /// Matches the end-of-input sentinel without consuming anything real.
    pub fn end_of_input() -> Self {
        Parser::literal(Token::is_end)
    }
}

// ----------------------------------------------------------------------------
// Combinator operators
// ----------------------------------------------------------------------------

impl<C> Parser<C> {
    /// Ordered choice. Flattens choice-of-choice at construction time: the
    /// result of `a.or(b).or(c)` is one choice over `[a, b, c]`.
    pub fn or(self, other: Parser<C>) -> Self {
        let mut list = match self {
            Parser::Or(list) => list,
            leaf => vec![Arc::new(leaf)],
        };
        match other {
            Parser::Or(tail) => list.extend(tail),
            leaf => list.push(Arc::new(leaf)),
        }
        Parser::Or(list)
    }

    /// Sequencing. Flattens sequence-of-sequence the same way [`Parser::or`]
    /// flattens choices.
    pub fn then(self, other: Parser<C>) -> Self {
        let mut list = match self {
            Parser::And(list) => list,
            leaf => vec![Arc::new(leaf)],
        };
        match other {
            Parser::And(tail) => list.extend(tail),
            leaf => list.push(Arc::new(leaf)),
        }
        Parser::And(list)
    }

    /// Greedy unbounded repetition requiring at least `at_least` matches.
    pub fn repeated(self, at_least: usize) -> Self {
        Parser::Repeat {
            at_least,
            at_most: None,
            body: Arc::new(self),
        }
    }

    /// Greedy repetition with both bounds.
    pub fn repeated_between(self, at_least: usize, at_most: usize) -> Self {
        Parser::Repeat {
            at_least,
            at_most: Some(at_most),
            body: Arc::new(self),
        }
    }

    /// Zero-or-one occurrences; sugar for `repeated_between(0, 1)`.
    pub fn optional(self) -> Self {
        self.repeated_between(0, 1)
    }

    /// `item (separator item)*`, built flat as a two-child sequence.
    pub fn join(self, separator: Parser<C>) -> Self {
        let item = Arc::new(self);
        let pair = Parser::And(vec![Arc::new(separator), Arc::clone(&item)]);
        let tail = Parser::Repeat {
            at_least: 0,
            at_most: None,
            body: Arc::new(pair),
        };
        Parser::And(vec![item, Arc::new(tail)])
    }

    /// Applies `rewrite` to this fragment's tree on success. The hook runs
    /// against the post-parse state; returning `Err` fails the whole fragment
    /// and rewinds it.
    pub fn rewrite(
        self,
        rewrite: impl Fn(&State<C>, Ast<C>) -> Result<Ast<C>, String> + Send + Sync + 'static,
    ) -> Self {
        Parser::Rewrite {
            body: Arc::new(self),
            rewrite: Arc::new(rewrite),
        }
    }

    /// On success, replaces the state's semantic context with
    /// `lens(old_context, tree)`, visible to everything parsed afterwards.
    pub fn lens(
        self,
        lens: impl Fn(&C, &Ast<C>) -> Result<C, String> + Send + Sync + 'static,
    ) -> Self {
        Parser::Lens {
            lens: Arc::new(lens),
            body: Arc::new(self),
        }
    }
}

/// Ordered choice, `a | b`.
impl<C> BitOr for Parser<C> {
    type Output = Parser<C>;

    fn bitor(self, rhs: Parser<C>) -> Parser<C> {
        self.or(rhs)
    }
}

/// Sequencing, `a + b`.
impl<C> Add for Parser<C> {
    type Output = Parser<C>;

    fn add(self, rhs: Parser<C>) -> Parser<C> {
        self.then(rhs)
    }
}

/// Negative lookahead, `!a`.
impl<C> Not for Parser<C> {
    type Output = Parser<C>;

    fn not(self) -> Parser<C> {
        Parser::Except(Arc::new(self))
    }
}

impl<C> fmt::Debug for Parser<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parser::Predicate(_) => f.write_str("Predicate"),
            Parser::Literal(rule) => fmt::Debug::fmt(rule, f),
            Parser::Anything => f.write_str("Anything"),
            Parser::And(children) => f.debug_tuple("And").field(children).finish(),
            Parser::Or(alternatives) => f.debug_tuple("Or").field(alternatives).finish(),
            Parser::Repeat {
                at_least,
                at_most,
                body,
            } => f
                .debug_struct("Repeat")
                .field("at_least", at_least)
                .field("at_most", at_most)
                .field("body", body)
                .finish(),
            Parser::Except(body) => f.debug_tuple("Except").field(body).finish(),
            Parser::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Parser::Rewrite { body, .. } => f.debug_tuple("Rewrite").field(body).finish(),
            Parser::Lens { body, .. } => f.debug_tuple("Lens").field(body).finish(),
        }
    }
}
