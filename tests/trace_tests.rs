// tests/trace_tests.rs
//
// The trace must fetch lazily, rewind cheaply, and never ask the lexer for a
// token twice. The counting lexer below makes the "no re-lexing" guarantee
// observable from outside.

use std::cell::Cell;
use std::rc::Rc;

use weft::{Lexer, Token, TokenIter, Trace};

struct CountingLexer {
    tokens: Vec<Token>,
    next: usize,
    calls: Rc<Cell<usize>>,
}

impl Lexer for CountingLexer {
    fn next_token(&mut self) -> Token {
        self.calls.set(self.calls.get() + 1);
        match self.tokens.get(self.next) {
            Some(token) => {
                self.next += 1;
                token.clone()
            }
            None => Token::end_of_input(self.tokens.len()),
        }
    }
}

fn counting_trace(lexemes: &[&str]) -> (Trace, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let tokens = lexemes
        .iter()
        .enumerate()
        .map(|(i, text)| Token::new("word", *text, i))
        .collect();
    let lexer = CountingLexer {
        tokens,
        next: 0,
        calls: Rc::clone(&calls),
    };
    (Trace::new(Box::new(lexer)), calls)
}

#[test]
fn tokens_are_fetched_lazily() {
    let (mut trace, calls) = counting_trace(&["a", "b", "c"]);
    assert_eq!(calls.get(), 0);

    assert_eq!(trace.current().lexeme, "a");
    assert_eq!(calls.get(), 1);

    // Re-reading the same position hits the buffer, not the lexer.
    assert_eq!(trace.current().lexeme, "a");
    assert_eq!(calls.get(), 1);
}

#[test]
fn restore_does_not_relex() {
    let (mut trace, calls) = counting_trace(&["a", "b", "c"]);
    let start = trace.mark();
    trace.advance();
    trace.advance();
    trace.advance();
    let fetched = calls.get();

    trace.restore(start);
    assert_eq!(trace.current().lexeme, "a");
    trace.advance();
    assert_eq!(trace.current().lexeme, "b");
    assert_eq!(calls.get(), fetched);
}

#[test]
fn advance_returns_the_consumed_token() {
    let (mut trace, _) = counting_trace(&["a", "b"]);
    assert_eq!(trace.advance().lexeme, "a");
    assert_eq!(trace.advance().lexeme, "b");
    assert_eq!(trace.cursor(), 2);
}

#[test]
fn max_fetched_survives_backtracking() {
    let (mut trace, _) = counting_trace(&["a", "b", "c"]);
    let start = trace.mark();
    trace.advance();
    trace.advance();
    trace.advance();
    assert_eq!(trace.max_fetched(), 3);

    trace.restore(start);
    assert_eq!(trace.cursor(), 0);
    assert_eq!(trace.max_fetched(), 3);
}

#[test]
fn end_of_input_is_a_sentinel_not_an_error() {
    let (mut trace, calls) = counting_trace(&[]);
    assert!(trace.current().is_end());

    // Consuming the sentinel is a no-op; the buffer does not grow.
    let before = calls.get();
    trace.advance();
    trace.advance();
    assert_eq!(trace.cursor(), 0);
    assert_eq!(calls.get(), before);
}

#[test]
fn pushed_lexer_governs_fresh_fetches_only() {
    let (mut trace, _) = counting_trace(&["a", "b"]);
    assert_eq!(trace.advance().lexeme, "a");

    let alternate = TokenIter::new(vec![Token::new("alt", "!", 0)]);
    trace.push_lexer(Box::new(alternate));
    assert_eq!(trace.current().lexeme, "!");
    trace.advance();
    trace.pop_lexer();

    // Back on the base lexer for the next unbuffered position.
    assert_eq!(trace.current().lexeme, "b");
}
