//! The evaluation engine: a recursive interpreter over the fragment graph.
//!
//! Given a fragment and a mutable [`State`], evaluation either succeeds with
//! an [`Ast`] node (cursor advanced past whatever was consumed) or fails with
//! the cursor — and, where a lens installed one, the semantic context —
//! restored to the fragment's entry values. No fragment ever leaks partial
//! consumption on failure; backtracking is strictly LIFO and restores nothing
//! beyond the cursor integer and the saved context value.
//!
//! Fatal configuration errors (see [`ParseError::is_fatal`]) are the one
//! exception to the rewind discipline: they abort the parse immediately and
//! are never caught by choice, repetition, or lookahead fragments.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::ast::Ast;
use crate::diagnostics::ParseError;
use crate::parser::{LensFn, LiteralRule, Parser, PredicateFn, RewriteFn};
use crate::state::{GuardKey, State};
use crate::token::Lexer;

type Parsed<C> = Result<Ast<C>, ParseError>;

/// Runs `fragment` once against a fresh state and returns the tree together
/// with the final state.
///
/// The returned state's [`State::cursor`] tells how much input was consumed;
/// callers wanting whole-input semantics additionally check
/// [`State::consumed_all`]. A soft failure is reported as
/// [`ParseError::NoParse`] carrying the trace's high-water mark; fatal errors
/// pass through unchanged.
pub fn parse<C: Clone>(
    fragment: &Parser<C>,
    grammar: crate::state::Grammar<C>,
    lexer: Box<dyn Lexer>,
    context: C,
) -> Result<(Ast<C>, State<C>), ParseError> {
    let mut state = State::new(grammar, context, lexer);
    match evaluate(fragment, &mut state) {
        Ok(ast) => Ok((ast, state)),
        Err(error) if error.is_fatal() => Err(error),
        Err(_) => Err(ParseError::NoParse {
            furthest: state.max_fetched(),
        }),
    }
}

/// Evaluates one fragment against the given state.
///
/// This is the structural recursion the whole engine is made of; `parse` is
/// a thin wrapper around it. Exposed so embedders can drive evaluation with a
/// hand-built state (for instance to resume with a pre-seeded context).
pub fn evaluate<C: Clone>(fragment: &Parser<C>, state: &mut State<C>) -> Parsed<C> {
    match fragment {
        Parser::Predicate(test) => eval_predicate(test.as_ref(), state),
        Parser::Literal(rule) => eval_literal(rule, state),
        Parser::Anything => eval_anything(state),
        Parser::And(children) => eval_and(children, state),
        Parser::Or(alternatives) => eval_or(alternatives, state),
        Parser::Repeat {
            at_least,
            at_most,
            body,
        } => eval_repeat(*at_least, *at_most, body, state),
        Parser::Except(body) => eval_except(body, state),
        Parser::Named(name) => eval_named(name, state),
        Parser::Rewrite { body, rewrite } => eval_rewrite(body, rewrite.as_ref(), state),
        Parser::Lens { lens, body } => eval_lens(lens.as_ref(), body, state),
    }
}

// ----------------------------------------------------------------------------
// Per-variant interpretation rules
// ----------------------------------------------------------------------------

fn eval_predicate<C: Clone>(test: &PredicateFn<C>, state: &mut State<C>) -> Parsed<C> {
    let entry = state.trace.mark();
    let holds = test(state);
    // Predicates are zero-width by contract; rewind whatever lookahead the
    // test performed.
    state.trace.restore(entry);
    if holds {
        Ok(Ast::Empty)
    } else {
        Err(ParseError::mismatch(entry.position()))
    }
}

fn eval_literal<C: Clone>(rule: &LiteralRule, state: &mut State<C>) -> Parsed<C> {
    let switched = match &rule.lexer {
        Some(factory) => {
            state.trace.push_lexer(factory());
            true
        }
        None => false,
    };
    // The test sees the sentinel too, so an explicit end-of-input literal is
    // an ordinary rule; consuming the sentinel is a cursor no-op.
    let matched = (rule.test)(state.trace.current());
    let result = if matched {
        Ok(Ast::Token(state.trace.advance()))
    } else {
        Err(ParseError::mismatch(state.cursor()))
    };
    if switched {
        // Revert the lexical mode on the literal's own backtracking boundary,
        // regardless of outcome.
        state.trace.pop_lexer();
    }
    result
}

fn eval_anything<C: Clone>(state: &mut State<C>) -> Parsed<C> {
    if state.trace.at_end() {
        return Err(ParseError::mismatch(state.cursor()));
    }
    Ok(Ast::Token(state.trace.advance()))
}

fn eval_and<C: Clone>(children: &[Arc<Parser<C>>], state: &mut State<C>) -> Parsed<C> {
    let entry = state.trace.mark();
    let entry_context = state.context.clone();
    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        match evaluate(child, state) {
            Ok(node) => nodes.push(node),
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                // The whole sequence rewinds to its own entry, not just to
                // the failing child's.
                state.trace.restore(entry);
                state.context = entry_context;
                return Err(error);
            }
        }
    }
    Ok(Ast::Seq(nodes))
}

fn eval_or<C: Clone>(alternatives: &[Arc<Parser<C>>], state: &mut State<C>) -> Parsed<C> {
    let entry = state.trace.mark();
    let entry_context = state.context.clone();
    for alternative in alternatives {
        match evaluate(alternative, state) {
            // Ordered choice: first success is returned unmodified, even if a
            // later alternative would consume more.
            Ok(node) => return Ok(node),
            Err(error) if error.is_fatal() => return Err(error),
            Err(_) => {
                trace!(position = entry.position(), "alternative failed, backtracking");
                state.trace.restore(entry);
                state.context = entry_context.clone();
            }
        }
    }
    Err(ParseError::mismatch(entry.position()))
}

fn eval_repeat<C: Clone>(
    at_least: usize,
    at_most: Option<usize>,
    body: &Parser<C>,
    state: &mut State<C>,
) -> Parsed<C> {
    let entry = state.trace.mark();
    let entry_context = state.context.clone();
    let mut nodes = Vec::new();
    loop {
        if at_most.is_some_and(|most| nodes.len() >= most) {
            break;
        }
        let round = state.trace.mark();
        let round_context = state.context.clone();
        match evaluate(body, state) {
            Ok(node) => {
                nodes.push(node);
                // A zero-width success would repeat forever; collect it once
                // and stop.
                if state.cursor() == round.position() {
                    break;
                }
            }
            Err(error) if error.is_fatal() => return Err(error),
            Err(_) => {
                state.trace.restore(round);
                state.context = round_context;
                break;
            }
        }
    }
    if nodes.len() < at_least {
        state.trace.restore(entry);
        state.context = entry_context;
        return Err(ParseError::mismatch(entry.position()));
    }
    Ok(Ast::Seq(nodes))
}

fn eval_except<C: Clone>(body: &Parser<C>, state: &mut State<C>) -> Parsed<C> {
    let entry = state.trace.mark();
    let entry_context = state.context.clone();
    let outcome = evaluate(body, state);
    // Lookahead never consumes, whichever way the body went.
    state.trace.restore(entry);
    state.context = entry_context;
    match outcome {
        Err(error) if error.is_fatal() => Err(error),
        Err(_) => Ok(Ast::Empty),
        Ok(_) => Err(ParseError::mismatch(entry.position())),
    }
}

fn eval_named<C: Clone>(name: &str, state: &mut State<C>) -> Parsed<C> {
    let Some(rule) = state.rule(name) else {
        return Err(ParseError::UnknownRule {
            name: name.to_string(),
        });
    };
    let key = GuardKey {
        position: state.cursor(),
        rule: name.to_string(),
    };
    if !state.guard_enter(key.clone()) {
        // The rule is already being evaluated at this exact position: a
        // non-progressing self-reference. Reject instead of looping; a
        // recursive call after any consumption carries a different key and
        // passes.
        trace!(rule = name, position = key.position, "left-recursion guard rejected re-entry");
        return Err(ParseError::mismatch(key.position));
    }
    debug!(rule = name, position = key.position, "entering named rule");
    let outcome = evaluate(&rule, state);
    state.guard_exit(&key);
    let body = outcome?;
    Ok(Ast::Rule {
        name: name.to_string(),
        body: Box::new(body),
    })
}

fn eval_rewrite<C: Clone>(
    body: &Parser<C>,
    rewrite: &RewriteFn<C>,
    state: &mut State<C>,
) -> Parsed<C> {
    let entry = state.trace.mark();
    let entry_context = state.context.clone();
    let node = evaluate(body, state)?;
    // The hook runs against the post-body state.
    match rewrite(&*state, node) {
        Ok(node) => Ok(node),
        Err(reason) => {
            state.trace.restore(entry);
            state.context = entry_context;
            Err(ParseError::Rejected {
                at: entry.position(),
                reason,
            })
        }
    }
}

fn eval_lens<C: Clone>(lens: &LensFn<C>, body: &Parser<C>, state: &mut State<C>) -> Parsed<C> {
    let entry = state.trace.mark();
    let entry_context = state.context.clone();
    let node = evaluate(body, state)?;
    match lens(&state.context, &node) {
        Ok(next) => {
            // Install the derived context wholesale; siblings parsed after
            // this fragment see it.
            state.context = next;
            Ok(node)
        }
        Err(reason) => {
            state.trace.restore(entry);
            state.context = entry_context;
            Err(ParseError::Rejected {
                at: entry.position(),
                reason,
            })
        }
    }
}
