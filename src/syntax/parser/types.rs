//! Type references, type arguments and type parameters.

use super::Parser;
use crate::syntax::token::TokenKind;
use crate::syntax::tree::SyntaxKind;

impl<'t> Parser<'t> {
    /// `int[]`, `java.util.Map<K, List<V>>.Entry`, `String...` (the ellipsis
    /// is left to the caller).
    pub(super) fn type_ref(&mut self) -> Option<()> {
        self.start(SyntaxKind::TypeRef);
        self.skip_type_annotations()?;
        if self.kind().is_primitive_type() {
            self.bump();
        } else {
            self.class_type_segments()?;
        }
        self.dims();
        self.finish();
        Some(())
    }

    /// A type without trailing dimensions, as used after `new`.
    pub(super) fn type_ref_no_dims(&mut self) -> Option<()> {
        self.start(SyntaxKind::TypeRef);
        if self.kind().is_primitive_type() {
            self.bump();
        } else {
            self.class_type_segments()?;
        }
        self.finish();
        Some(())
    }

    fn class_type_segments(&mut self) -> Option<()> {
        loop {
            self.expect(TokenKind::Ident, "type")?;
            if self.at(TokenKind::Lt) {
                self.type_arguments()?;
            }
            if self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Ident {
                self.bump();
            } else {
                return Some(());
            }
        }
    }

    fn skip_type_annotations(&mut self) -> Option<()> {
        while self.at(TokenKind::At) && self.nth(1) == TokenKind::Ident {
            self.start(SyntaxKind::Annotation);
            self.bump();
            self.qualified_name()?;
            self.finish();
        }
        Some(())
    }

    fn dims(&mut self) {
        while self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket {
            self.bump();
            self.bump();
        }
    }

    /// `<A, ? extends B, ?>`, also the diamond `<>`.
    pub(super) fn type_arguments(&mut self) -> Option<()> {
        self.start(SyntaxKind::TypeArguments);
        self.expect(TokenKind::Lt, "`<`")?;
        if !self.at(TokenKind::Gt) {
            loop {
                if self.at(TokenKind::Question) {
                    self.start(SyntaxKind::Wildcard);
                    self.bump();
                    if self.at_any(&[TokenKind::Extends, TokenKind::Super]) {
                        self.bump();
                        self.type_ref()?;
                    }
                    self.finish();
                } else {
                    self.type_ref()?;
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::Gt, "`>`")?;
        self.finish();
        Some(())
    }

    /// `<T extends Comparable<T> & Serializable, U>` if present.
    pub(super) fn type_parameters_opt(&mut self) -> Option<()> {
        if !self.at(TokenKind::Lt) {
            return Some(());
        }
        self.start(SyntaxKind::TypeParameters);
        self.bump();
        loop {
            self.start(SyntaxKind::TypeParameter);
            self.skip_type_annotations()?;
            self.expect_ident()?;
            if self.eat(TokenKind::Extends) {
                self.type_ref()?;
                while self.eat(TokenKind::Amp) {
                    self.type_ref()?;
                }
            }
            self.finish();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "`>`")?;
        self.finish();
        Some(())
    }
}
