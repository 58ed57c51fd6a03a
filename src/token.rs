//! Token type and the lexer boundary.
//!
//! The engine is tokenizer-agnostic: it pulls [`Token`]s on demand through the
//! [`Lexer`] trait and never looks inside a token beyond what a literal rule's
//! test function asks of it. End of input is signalled in-band with a sentinel
//! token rather than an `Option`, so grammars that need to match end-of-input
//! explicitly can do so with an ordinary literal rule.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved token name carried by the end-of-input sentinel.
pub const END_OF_INPUT: &str = "<end-of-input>";

/// One unit of lexer output.
///
/// `name` is the token's kind as assigned by the lexer, `lexeme` is the
/// matched text, and `offset` is the lexer-defined position (byte offset,
/// token index — the engine only reports it, never interprets it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub lexeme: String,
    pub offset: usize,
}

impl Token {
    pub fn new(name: impl Into<String>, lexeme: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            lexeme: lexeme.into(),
            offset,
        }
    }

    /// The end-of-input sentinel at the given offset.
    pub fn end_of_input(offset: usize) -> Self {
        Self {
            name: END_OF_INPUT.to_string(),
            lexeme: String::new(),
            offset,
        }
    }

    /// Whether this token is the end-of-input sentinel.
    pub fn is_end(&self) -> bool {
        self.name == END_OF_INPUT
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end() {
            write!(f, "{}", END_OF_INPUT)
        } else {
            write!(f, "{}({:?})", self.name, self.lexeme)
        }
    }
}

/// Pull-based token supplier.
///
/// Implementations must yield [`Token::end_of_input`] once the input is
/// exhausted, and must keep yielding it if polled again. The engine buffers
/// every fetched token in the [`Trace`](crate::trace::Trace), so a lexer is
/// never asked to re-produce a token it already handed out.
pub trait Lexer {
    fn next_token(&mut self) -> Token;
}

/// Adapts any token iterator into a [`Lexer`], appending the sentinel when
/// the iterator runs dry.
///
/// # Examples
///
/// ```rust
/// use weft::{Lexer, Token, TokenIter};
///
/// let mut lexer = TokenIter::new(vec![Token::new("digit", "7", 0)]);
/// assert_eq!(lexer.next_token().lexeme, "7");
/// assert!(lexer.next_token().is_end());
/// assert!(lexer.next_token().is_end());
/// ```
pub struct TokenIter<I> {
    tokens: I,
    yielded: usize,
}

impl<I: Iterator<Item = Token>> TokenIter<I> {
    pub fn new(tokens: impl IntoIterator<Item = Token, IntoIter = I>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            yielded: 0,
        }
    }
}

impl<I: Iterator<Item = Token>> Lexer for TokenIter<I> {
    fn next_token(&mut self) -> Token {
        match self.tokens.next() {
            Some(token) => {
                self.yielded += 1;
                token
            }
            // The sentinel's offset is the count of real tokens; callers that
            // need byte offsets should encode them in their own tokens.
            None => Token::end_of_input(self.yielded),
        }
    }
}
