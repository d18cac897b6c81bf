//! A pass-through token source that logs hidden-channel tokens.

use rustc_hash::FxHashSet;

use super::token::{COMMENT_KINDS, Token, TokenKind, TokenSource};

/// Wraps an upstream [`TokenSource`] and records every token whose kind is in
/// the hidden set. The stream seen by the consumer is unchanged.
///
/// The log only grows, in stream order, and can be inspected at any time
/// while parsing is still in progress.
pub struct CollectorTokenSource<S> {
    source: S,
    hidden: FxHashSet<TokenKind>,
    collected: Vec<Token>,
}

impl<S: TokenSource> CollectorTokenSource<S> {
    pub fn new(source: S, hidden: impl IntoIterator<Item = TokenKind>) -> Self {
        Self {
            source,
            hidden: hidden.into_iter().collect(),
            collected: Vec::new(),
        }
    }

    /// Collect line, block and doc comments.
    pub fn with_comments(source: S) -> Self {
        Self::new(source, COMMENT_KINDS)
    }

    pub fn collected(&self) -> &[Token] {
        &self.collected
    }

    pub fn into_collected(self) -> Vec<Token> {
        self.collected
    }

    pub fn is_hidden(&self, kind: TokenKind) -> bool {
        self.hidden.contains(&kind)
    }
}

impl<S: TokenSource> TokenSource for CollectorTokenSource<S> {
    fn next_token(&mut self) -> Token {
        let token = self.source.next_token();
        if self.hidden.contains(&token.kind) {
            tracing::trace!(kind = ?token.kind, line = token.line, "collected hidden token");
            self.collected.push(token.clone());
        }
        token
    }

    fn source_name(&self) -> String {
        format!("collector({})", self.source.source_name())
    }
}
