pub use crate::ast::Ast;
pub use crate::diagnostics::ParseError;
pub use crate::eval::{evaluate, parse};
pub use crate::parser::{LiteralRule, Parser};
pub use crate::state::{Grammar, State};
pub use crate::token::{Lexer, Token, TokenIter, END_OF_INPUT};
pub use crate::trace::{Checkpoint, Trace};

pub mod ast;
pub mod diagnostics;
pub mod eval;
pub mod parser;
pub mod state;
pub mod token;
pub mod trace;
