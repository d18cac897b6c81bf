//! Lexing, parsing and the enriched syntax tree.
//!
//! ```text
//! Lexer ─▶ CollectorTokenSource ─▶ Parser ─▶ SyntaxNode
//!                  │                              ▲
//!                  └──── hidden tokens ──▶ attach_comments
//! ```

mod builder;
mod collector;
mod comments;
mod parser;
mod token;
mod tree;

pub use builder::{Checkpoint, TreeAdaptor, TreeBuilder};
pub use collector::CollectorTokenSource;
pub use comments::attach_comments;
pub use parser::{Parse, ParseOptions, parse_source};
pub use token::{COMMENT_KINDS, Lexer, Token, TokenKind, TokenSource, tokenize};
pub use tree::{
    Descendants, ErrorNode, SyntaxError, SyntaxKind, SyntaxNode, TreeError, TreeNode, TreeView,
};
