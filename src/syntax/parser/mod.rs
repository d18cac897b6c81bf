//! Error-tolerant recursive-descent parser for the Java subset.
//!
//! The parser consumes the significant tokens of a fully lexed input and builds
//! the enriched tree through a [`TreeBuilder`]. Parse functions return
//! `Option<()>`: `None` means the construct could not be completed and an error
//! was recorded. Recovery points (top-level declarations, class members and
//! block statements) turn the failed region into an error node and resume.

mod expressions;
mod items;
mod recovery;
mod statements;
mod support;
mod types;

use smol_str::SmolStr;

use super::builder::TreeBuilder;
use super::collector::CollectorTokenSource;
use super::comments::attach_comments;
use super::token::{COMMENT_KINDS, Lexer, Token, TokenKind, TokenSource};
use super::tree::{SyntaxError, SyntaxKind, SyntaxNode};

/// Options for [`parse_source`].
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Token kinds recorded by the collector.
    pub hidden: Vec<TokenKind>,
    /// Attach collected comments to declaration nodes.
    pub attach_comments: bool,
    /// Name used in logs.
    pub source_name: SmolStr,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            hidden: COMMENT_KINDS.to_vec(),
            attach_comments: true,
            source_name: SmolStr::new_static("<source>"),
        }
    }
}

/// The result of parsing one source text.
#[derive(Debug)]
pub struct Parse {
    pub root: SyntaxNode,
    /// Every token, hidden ones included, ending with `Eof`.
    pub tokens: Vec<Token>,
    /// The tokens recorded by the collector.
    pub hidden: Vec<Token>,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Lex, collect, parse and enrich one source text.
pub fn parse_source(text: &str, options: &ParseOptions) -> Parse {
    let lexer = Lexer::new(text, options.source_name.clone());
    let mut source = CollectorTokenSource::new(lexer, options.hidden.iter().copied());
    let mut tokens = Vec::new();
    loop {
        let token = source.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    let hidden = source.into_collected();

    let mut parser = Parser::new(text, &tokens);
    parser.compilation_unit();
    let (mut root, errors) = parser.into_parts();

    if options.attach_comments {
        attach_comments(&mut root, &tokens, &hidden);
    }

    tracing::debug!(
        source = %options.source_name,
        tokens = tokens.len(),
        errors = errors.len(),
        "parsed source"
    );

    Parse {
        root,
        tokens,
        hidden,
        errors,
    }
}

pub(crate) struct Parser<'t> {
    source: &'t str,
    tokens: &'t [Token],
    /// Stream indices of the significant tokens, ending with `Eof`.
    significant: Vec<usize>,
    /// Position in `significant`.
    pos: usize,
    builder: TreeBuilder,
    errors: Vec<SyntaxError>,
}

impl<'t> Parser<'t> {
    /// `tokens` must end with an `Eof` token.
    pub(crate) fn new(source: &'t str, tokens: &'t [Token]) -> Self {
        let significant: Vec<usize> = tokens
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.index)
            .collect();
        let anchor = significant
            .first()
            .and_then(|&i| tokens.get(i))
            .cloned()
            .unwrap_or_else(|| eof_token(source));
        Self {
            source,
            tokens,
            significant,
            pos: 0,
            builder: TreeBuilder::new(SyntaxKind::CompilationUnit, anchor),
            errors: Vec::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (SyntaxNode, Vec<SyntaxError>) {
        (self.builder.finish(), self.errors)
    }
}

fn eof_token(source: &str) -> Token {
    let end = crate::base::TextSize::from(source.len() as u32);
    Token {
        kind: TokenKind::Eof,
        text: SmolStr::default(),
        range: crate::base::TextRange::empty(end),
        line: 1,
        column: 0,
        index: 0,
    }
}
