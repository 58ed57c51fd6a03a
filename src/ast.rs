//! Syntax-tree results of fragment evaluation.
//!
//! Every successful evaluation produces an [`Ast`] node tagged with the kind
//! of fragment that built it, so rewrite and lens hooks can match on shape.
//! Trees are plainly owned: children belong to their parent, nothing is
//! shared, and the whole tree is handed to the caller of the parse.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::token::Token;

/// An annotated syntax-tree node, generic over the semantic context type.
///
/// # Examples
///
/// ```rust
/// use weft::{Ast, Token};
///
/// let node: Ast<()> = Ast::Seq(vec![
///     Ast::Token(Token::new("digit", "4", 0)),
///     Ast::Token(Token::new("digit", "2", 1)),
/// ]);
/// assert_eq!(node.tokens().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ast<C> {
    /// Zero-width success: produced by predicates and negative lookahead.
    Empty,
    /// A single consumed token: produced by literal and anything fragments.
    Token(Token),
    /// An ordered run of children: produced by sequences and repetitions.
    Seq(Vec<Ast<C>>),
    /// A named rule's result, wrapping the body it parsed.
    Rule { name: String, body: Box<Ast<C>> },
    /// A semantic value injected by a rewrite hook in place of raw syntax.
    Value(C),
}

impl<C> Ast<C> {
    /// Unwraps a sequence node into its children.
    pub fn into_seq(self) -> Option<Vec<Ast<C>>> {
        if let Ast::Seq(children) = self {
            Some(children)
        } else {
            None
        }
    }

    /// Collects every token in the tree, left to right.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            Ast::Empty | Ast::Value(_) => {}
            Ast::Token(token) => out.push(token),
            Ast::Seq(children) => {
                for child in children {
                    child.collect_tokens(out);
                }
            }
            Ast::Rule { body, .. } => body.collect_tokens(out),
        }
    }
}

impl<C: fmt::Debug> Ast<C> {
    /// Pretty-prints the tree in an s-expression style, mainly for tests and
    /// debugging output.
    pub fn pretty(&self) -> String {
        match self {
            Ast::Empty => "()".to_string(),
            Ast::Token(token) => token.lexeme.clone(),
            Ast::Seq(children) => {
                let inner = children
                    .iter()
                    .map(Ast::pretty)
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("({})", inner)
            }
            Ast::Rule { name, body } => format!("({} {})", name, body.pretty()),
            Ast::Value(value) => format!("{:?}", value),
        }
    }
}
