//! Backtrackable record of fetched tokens.
//!
//! The [`Trace`] sits between the evaluation engine and the lexer. Tokens are
//! fetched lazily, buffered forever (within one parse), and re-read freely as
//! the engine backtracks: rewinding moves the cursor, never the buffer, so no
//! input is ever lexed twice. A stack of active lexers supports lexical-mode
//! switching: a literal rule may push an alternate lexer for the duration of
//! its own match, and fresh fetches always come from the top of the stack.

use crate::token::{Lexer, Token};

/// Opaque cursor checkpoint returned by [`Trace::mark`].
///
/// A checkpoint is just a position; restoring one is a plain integer store
/// and releases no resources, which is what makes backtracking cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl Checkpoint {
    /// The cursor position this checkpoint was taken at.
    pub fn position(&self) -> usize {
        self.0
    }
}

/// Append-only token buffer with a movable read cursor.
///
/// Invariants:
/// - `cursor <= tokens.len()` at all times;
/// - [`Trace::restore`] only moves the cursor, it never truncates the buffer;
/// - `max_fetched` is monotonically non-decreasing and records the furthest
///   cursor position ever reached, which is the best signal for "parse failed
///   near X" diagnostics under ordered-choice backtracking.
pub struct Trace {
    tokens: Vec<Token>,
    cursor: usize,
    max_fetched: usize,
    lexers: Vec<Box<dyn Lexer>>,
}

impl std::fmt::Debug for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trace")
            .field("tokens", &self.tokens)
            .field("cursor", &self.cursor)
            .field("max_fetched", &self.max_fetched)
            .field("lexers", &self.lexers.len())
            .finish()
    }
}

impl Trace {
    /// Creates an empty trace reading from `base`.
    pub fn new(base: Box<dyn Lexer>) -> Self {
        Self {
            tokens: Vec::new(),
            cursor: 0,
            max_fetched: 0,
            lexers: vec![base],
        }
    }

    /// The token at the cursor, fetching from the active lexer if it has not
    /// been buffered yet. Past the end of input this is the sentinel.
    pub fn current(&mut self) -> &Token {
        self.fill_to(self.cursor);
        self.max_fetched = self.max_fetched.max(self.cursor);
        // fill_to guarantees the buffer covers the cursor or ends in the
        // sentinel, and buffers at least one token.
        let index = self.cursor.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Consumes and returns the token at the cursor.
    ///
    /// Consuming the end-of-input sentinel is a no-op: the sentinel is
    /// returned but the cursor does not move, so the sentinel can be matched
    /// any number of times without the trace growing.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is_end() {
            self.cursor += 1;
            self.max_fetched = self.max_fetched.max(self.cursor);
        }
        token
    }

    /// Records the current cursor position for a later [`Trace::restore`].
    pub fn mark(&self) -> Checkpoint {
        Checkpoint(self.cursor)
    }

    /// Rewinds the cursor to a previously marked position.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        debug_assert!(checkpoint.0 <= self.tokens.len());
        self.cursor = checkpoint.0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_fetched(&self) -> usize {
        self.max_fetched
    }

    /// Whether the cursor sits on the end-of-input sentinel.
    pub fn at_end(&mut self) -> bool {
        self.current().is_end()
    }

    /// Installs `lexer` as the active token source for subsequent fetches.
    ///
    /// Already-buffered tokens are unaffected: a mode switch only governs
    /// tokens that have not been fetched yet.
    pub fn push_lexer(&mut self, lexer: Box<dyn Lexer>) {
        self.lexers.push(lexer);
    }

    /// Removes the most recently pushed lexer. The base lexer is never popped.
    pub fn pop_lexer(&mut self) {
        if self.lexers.len() > 1 {
            self.lexers.pop();
        }
    }

    fn fill_to(&mut self, index: usize) {
        while self.tokens.len() <= index {
            if self.tokens.last().is_some_and(Token::is_end) {
                break;
            }
            let token = match self.lexers.last_mut() {
                Some(lexer) => lexer.next_token(),
                // The lexer stack is never empty; synthesize the sentinel
                // rather than panic if that invariant is ever broken.
                None => Token::end_of_input(self.tokens.len()),
            };
            self.tokens.push(token);
        }
    }
}
