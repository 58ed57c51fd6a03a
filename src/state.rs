//! Per-parse mutable state and the named-rule table.
//!
//! A [`Grammar`] is the immutable side: a registry of named fragments,
//! populated before any evaluation begins and shared read-only across as many
//! concurrent parses as the caller likes (cloning a grammar only clones `Arc`
//! handles to its rules, so handing each parse its own copy is cheap). A [`State`]
//! is the mutable side: one per top-level parse, exclusively owned by that
//! parse, bundling the left-recursion guard set, the user's semantic context
//! value, and the token [`Trace`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::parser::Parser;
use crate::token::Lexer;
use crate::trace::Trace;

/// One live entry in the left-recursion guard set.
///
/// At most one entry exists per `(position, rule)` pair; the entry is removed
/// on every return path of the named-rule evaluation, success and failure
/// alike, so the set always reflects exactly the rules currently on the
/// evaluation stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct GuardKey {
    pub position: usize,
    pub rule: String,
}

/// Registry of named grammar rules.
///
/// Named fragments resolve against this table at evaluation time, not at
/// construction time, which is what lets mutually-recursive rules be
/// registered in any order.
///
/// # Examples
///
/// ```rust
/// use weft::{Grammar, Parser};
///
/// let mut grammar: Grammar<()> = Grammar::new();
/// grammar.register("digit", Parser::literal(|t| t.lexeme.chars().all(|c| c.is_ascii_digit())));
/// assert!(grammar.rule("digit").is_some());
/// assert!(grammar.rule("letter").is_none());
/// ```
#[derive(Clone)]
pub struct Grammar<C> {
    rules: HashMap<String, Arc<Parser<C>>>,
}

impl<C> std::fmt::Debug for Grammar<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar").field("rules", &self.rules).finish()
    }
}

impl<C> Grammar<C> {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registers `fragment` under `name`, replacing any previous binding.
    pub fn register(&mut self, name: impl Into<String>, fragment: Parser<C>) {
        self.rules.insert(name.into(), Arc::new(fragment));
    }

    /// Looks up the fragment registered under `name`.
    pub fn rule(&self, name: &str) -> Option<&Arc<Parser<C>>> {
        self.rules.get(name)
    }

    /// The number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<C> Default for Grammar<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone> Grammar<C> {
    /// Convenience wrapper around [`crate::parse`], leaving this grammar
    /// reusable for further parses.
    pub fn parse(
        &self,
        fragment: &Parser<C>,
        lexer: Box<dyn Lexer>,
        context: C,
    ) -> Result<(crate::ast::Ast<C>, State<C>), crate::diagnostics::ParseError> {
        crate::eval::parse(fragment, self.clone(), lexer, context)
    }
}

/// Mutable context threaded through one parse invocation.
///
/// Owns the guard set, the semantic context value (replaced wholesale by
/// `Lens` fragments), and the trace. Construct one per top-level parse and
/// discard it afterwards; it must never be shared between concurrent
/// evaluations.
pub struct State<C> {
    guards: HashSet<GuardKey>,
    /// User-defined semantic context, visible to predicates and hooks.
    pub context: C,
    pub trace: Trace,
    grammar: Grammar<C>,
}

impl<C: std::fmt::Debug> std::fmt::Debug for State<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("guards", &self.guards)
            .field("context", &self.context)
            .field("trace", &self.trace)
            .field("grammar", &self.grammar)
            .finish()
    }
}

impl<C> State<C> {
    /// Creates a fresh state reading tokens from `lexer`.
    pub fn new(grammar: Grammar<C>, context: C, lexer: Box<dyn Lexer>) -> Self {
        Self {
            guards: HashSet::new(),
            context,
            trace: Trace::new(lexer),
            grammar,
        }
    }

    /// Pass-through to the trace's cursor position.
    pub fn cursor(&self) -> usize {
        self.trace.cursor()
    }

    /// Pass-through to the trace's high-water mark.
    pub fn max_fetched(&self) -> usize {
        self.trace.max_fetched()
    }

    /// Whether the whole input has been consumed (the cursor sits on the
    /// end-of-input sentinel). Callers wanting "parsed everything" semantics
    /// check this after a successful parse.
    pub fn consumed_all(&mut self) -> bool {
        self.trace.at_end()
    }

    pub(crate) fn rule(&self, name: &str) -> Option<Arc<Parser<C>>> {
        self.grammar.rule(name).cloned()
    }

    /// Inserts a guard entry; returns false if the same rule is already being
    /// evaluated at the same position.
    pub(crate) fn guard_enter(&mut self, key: GuardKey) -> bool {
        self.guards.insert(key)
    }

    /// Removes a guard entry. Called on every exit path of a named rule.
    pub(crate) fn guard_exit(&mut self, key: &GuardKey) {
        self.guards.remove(key);
    }
}
