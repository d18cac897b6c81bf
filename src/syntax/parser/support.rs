//! Cursor, lookahead and node helpers shared by the grammar modules.

use super::Parser;
use crate::syntax::builder::Checkpoint;
use crate::syntax::token::{Token, TokenKind};
use crate::syntax::tree::{SyntaxError, SyntaxKind};

impl<'t> Parser<'t> {
    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// The token `n` significant tokens ahead. Past the end this is `Eof`.
    pub(super) fn nth_token(&self, n: usize) -> &'t Token {
        let last = self.significant.len().saturating_sub(1);
        let idx = self.significant.get(self.pos + n).or(self.significant.get(last));
        match idx {
            Some(&i) => &self.tokens[i],
            None => &self.tokens[self.tokens.len() - 1],
        }
    }

    pub(super) fn nth(&self, n: usize) -> TokenKind {
        self.nth_token(n).kind
    }

    pub(super) fn current(&self) -> &'t Token {
        self.nth_token(0)
    }

    pub(super) fn kind(&self) -> TokenKind {
        self.nth(0)
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub(super) fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind())
    }

    pub(super) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Whether the tokens at `n` and `n + 1` touch with nothing in between.
    pub(super) fn adjacent(&self, n: usize) -> bool {
        let a = self.nth_token(n);
        let b = self.nth_token(n + 1);
        a.range.end() == b.range.start() && a.kind != TokenKind::Eof
    }

    /// Add the current token as a leaf and advance. Never moves past `Eof`.
    pub(super) fn bump(&mut self) {
        if self.at_eof() {
            return;
        }
        let token = self.current().clone();
        self.builder.token(token);
        self.pos += 1;
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or record an error. Does not consume on mismatch.
    pub(super) fn expect(&mut self, kind: TokenKind, what: &str) -> Option<()> {
        if self.eat(kind) {
            Some(())
        } else {
            self.error_expected(what);
            None
        }
    }

    /// The `}` closing a body. At end of file the error is recorded but the
    /// body still closes, so a truncated file keeps what it declared.
    pub(super) fn expect_closing_brace(&mut self) -> Option<()> {
        if self.eat(TokenKind::RBrace) {
            return Some(());
        }
        self.error_expected("`}`");
        self.at_eof().then_some(())
    }

    pub(super) fn expect_ident(&mut self) -> Option<()> {
        self.expect(TokenKind::Ident, "identifier")
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    pub(super) fn error_expected(&mut self, what: &str) {
        let token = self.current();
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("`{}`", token.text)
        };
        let error = SyntaxError::at(token, format!("expected {what}, found {found}"));
        tracing::trace!(%error, "syntax error");
        self.errors.push(error);
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    pub(super) fn start(&mut self, kind: SyntaxKind) {
        let anchor = self.current().clone();
        self.builder.start_node(kind, anchor);
    }

    pub(super) fn finish(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    pub(super) fn start_at(&mut self, cp: Checkpoint, kind: SyntaxKind) {
        let anchor = self.current().clone();
        self.builder.start_node_at(cp, kind, anchor);
    }

    /// Wrap a single token in a node of `kind`.
    pub(super) fn token_node(&mut self, kind: SyntaxKind) {
        self.start(kind);
        self.bump();
        self.finish();
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    /// Offset of the token matching the opening delimiter at offset `n`.
    pub(super) fn matching(&self, n: usize, open: TokenKind, close: TokenKind) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = n;
        loop {
            match self.nth(i) {
                TokenKind::Eof => return None,
                k if k == open => depth += 1,
                k if k == close => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// Skip a type starting at offset `n` without building anything. Returns
    /// the offset just past it.
    pub(super) fn scan_type(&self, n: usize) -> Option<usize> {
        let mut i = n;
        while self.nth(i) == TokenKind::At {
            i = self.scan_annotation(i)?;
        }
        if self.nth(i).is_primitive_type() {
            i += 1;
        } else {
            loop {
                if self.nth(i) != TokenKind::Ident {
                    return None;
                }
                i += 1;
                if self.nth(i) == TokenKind::Lt {
                    i = self.scan_type_arguments(i)?;
                }
                if self.nth(i) == TokenKind::Dot && self.nth(i + 1) == TokenKind::Ident {
                    i += 1;
                } else {
                    break;
                }
            }
        }
        while self.nth(i) == TokenKind::LBracket && self.nth(i + 1) == TokenKind::RBracket {
            i += 2;
        }
        Some(i)
    }

    fn scan_type_arguments(&self, n: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = n;
        loop {
            match self.nth(i) {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                TokenKind::Ident
                | TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::Question
                | TokenKind::Extends
                | TokenKind::Super
                | TokenKind::Amp
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::At => {}
                k if k.is_primitive_type() => {}
                _ => return None,
            }
            i += 1;
        }
    }

    fn scan_annotation(&self, n: usize) -> Option<usize> {
        let mut i = n + 1;
        if self.nth(i) != TokenKind::Ident {
            return None;
        }
        i += 1;
        while self.nth(i) == TokenKind::Dot && self.nth(i + 1) == TokenKind::Ident {
            i += 2;
        }
        if self.nth(i) == TokenKind::LParen {
            i = self.matching(i, TokenKind::LParen, TokenKind::RParen)? + 1;
        }
        Some(i)
    }

    /// Whether a local variable declaration starts here: optional modifiers,
    /// a type, then a name followed by `=`, `;`, `,`, `[` or `:`.
    pub(super) fn at_local_var_decl(&self) -> bool {
        let mut i = 0;
        loop {
            match self.nth(i) {
                TokenKind::Final => i += 1,
                TokenKind::At if self.nth(i + 1) != TokenKind::Interface => {
                    match self.scan_annotation(i) {
                        Some(next) => i = next,
                        None => return false,
                    }
                }
                _ => break,
            }
        }
        let Some(after_type) = self.scan_type(i) else {
            return false;
        };
        self.nth(after_type) == TokenKind::Ident
            && matches!(
                self.nth(after_type + 1),
                TokenKind::Eq
                    | TokenKind::Semicolon
                    | TokenKind::Comma
                    | TokenKind::LBracket
                    | TokenKind::Colon
            )
    }
}
