//! Error recovery: turning a failed construct into an error node.

use super::Parser;
use crate::syntax::builder::Checkpoint;
use crate::syntax::token::{Token, TokenKind};
use crate::syntax::tree::SyntaxError;

/// Where to resume after an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Resume {
    /// After `;`, after a balanced `{ ... }`, or before `}`.
    Member,
    /// Same resume points as `Member`, inside blocks.
    Statement,
    /// Before the next type declaration keyword.
    TopLevel,
}

impl<'t> Parser<'t> {
    /// Run `parse`; if it fails, replace whatever it built with an error node
    /// and skip ahead to the resume point.
    pub(super) fn recovering(&mut self, resume: Resume, parse: impl FnOnce(&mut Self) -> Option<()>) {
        let cp = self.checkpoint();
        let errors_before = self.errors.len();
        let pos_before = self.pos;
        if parse(self).is_some() {
            return;
        }
        self.recover(cp, resume, errors_before, pos_before);
    }

    fn recover(&mut self, cp: Checkpoint, resume: Resume, errors_before: usize, pos_before: usize) {
        let mut skipped = self.builder.abandon(cp);
        let made_progress = self.pos > pos_before;
        skipped.extend(self.skip_to(resume, made_progress));

        if self.errors.len() == errors_before {
            let token = skipped.first().unwrap_or(self.current()).clone();
            self.errors.push(SyntaxError::at(&token, "unexpected input"));
        }
        let Some(error) = self.errors.last().cloned() else {
            return;
        };
        let adaptor = self.builder.adaptor();
        if let Some(node) = adaptor.error_node(self.source, skipped, error) {
            self.builder.push_child(node);
        }
    }

    /// Advance to the resume point, returning the skipped tokens. Unless
    /// `made_progress`, at least one token is consumed when possible so the
    /// caller's loop cannot stall.
    fn skip_to(&mut self, resume: Resume, made_progress: bool) -> Vec<Token> {
        let mut skipped = Vec::new();
        let mut depth = 0usize;
        let mut must_consume = !made_progress;

        loop {
            let token = self.current();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::RBrace if depth == 0 => {
                    if must_consume && resume == Resume::TopLevel {
                        skipped.push(self.advance());
                    }
                    break;
                }
                TokenKind::Semicolon if depth == 0 && resume != Resume::TopLevel => {
                    skipped.push(self.advance());
                    break;
                }
                TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Public
                | TokenKind::Abstract
                | TokenKind::At
                    if depth == 0 && resume == Resume::TopLevel && !must_consume =>
                {
                    break;
                }
                TokenKind::LBrace => {
                    depth += 1;
                    skipped.push(self.advance());
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    skipped.push(self.advance());
                    if depth == 0 && resume != Resume::TopLevel {
                        break;
                    }
                }
                _ => {
                    skipped.push(self.advance());
                }
            }
            must_consume = false;
        }
        skipped
    }

    /// Move past the current token without adding it to the tree.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }
}
