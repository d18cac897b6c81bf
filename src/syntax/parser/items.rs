//! Compilation units, type declarations and class members.

use super::Parser;
use super::recovery::Resume;
use crate::syntax::builder::Checkpoint;
use crate::syntax::token::TokenKind;
use crate::syntax::tree::SyntaxKind;

impl<'t> Parser<'t> {
    pub(crate) fn compilation_unit(&mut self) {
        if self.at_package_decl() {
            self.recovering(Resume::TopLevel, Self::package_decl);
        }
        while self.at(TokenKind::Import) {
            self.recovering(Resume::TopLevel, Self::import_decl);
        }
        while !self.at_eof() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            self.recovering(Resume::TopLevel, |p| {
                let cp = p.checkpoint();
                p.modifiers();
                p.type_declaration(cp)
            });
        }
    }

    fn at_package_decl(&self) -> bool {
        let mut i = 0;
        while self.nth(i) == TokenKind::At && self.nth(i + 1) != TokenKind::Interface {
            i += 2;
            while self.nth(i) == TokenKind::Dot {
                i += 2;
            }
            if self.nth(i) == TokenKind::LParen {
                match self.matching(i, TokenKind::LParen, TokenKind::RParen) {
                    Some(close) => i = close + 1,
                    None => return false,
                }
            }
        }
        self.nth(i) == TokenKind::Package
    }

    fn package_decl(&mut self) -> Option<()> {
        self.start(SyntaxKind::PackageDecl);
        self.modifiers();
        self.expect(TokenKind::Package, "`package`")?;
        self.qualified_name()?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        self.finish();
        Some(())
    }

    fn import_decl(&mut self) -> Option<()> {
        self.start(SyntaxKind::ImportDecl);
        self.bump();
        self.eat(TokenKind::Static);
        self.qualified_name()?;
        if self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Star {
            self.bump();
            self.bump();
        }
        self.expect(TokenKind::Semicolon, "`;`")?;
        self.finish();
        Some(())
    }

    /// `a.b.c`, stopping before a `.` that is not followed by an identifier.
    pub(super) fn qualified_name(&mut self) -> Option<()> {
        self.start(SyntaxKind::QualifiedName);
        self.expect_ident()?;
        while self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Ident {
            self.bump();
            self.bump();
        }
        self.finish();
        Some(())
    }

    // ------------------------------------------------------------------
    // Modifiers and annotations
    // ------------------------------------------------------------------

    /// Always produces a `Modifiers` node, possibly empty.
    pub(super) fn modifiers(&mut self) {
        self.start(SyntaxKind::Modifiers);
        loop {
            let kind = self.kind();
            let switch_label = matches!(self.nth(1), TokenKind::Colon | TokenKind::Arrow);
            if kind == TokenKind::Default && switch_label {
                break;
            }
            if kind.is_modifier() {
                self.bump();
            } else if kind == TokenKind::At && self.nth(1) == TokenKind::Ident {
                self.annotation();
            } else {
                break;
            }
        }
        self.finish();
    }

    /// `@Name` or `@a.b.Name(...)`. Callers check that an identifier follows
    /// the `@`. Arguments are kept as raw tokens.
    fn annotation(&mut self) {
        self.start(SyntaxKind::Annotation);
        self.bump();
        self.start(SyntaxKind::QualifiedName);
        self.bump();
        while self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Ident {
            self.bump();
            self.bump();
        }
        self.finish();
        if self.at(TokenKind::LParen) {
            match self.matching(0, TokenKind::LParen, TokenKind::RParen) {
                Some(close) => {
                    self.start(SyntaxKind::AnnotationArgs);
                    for _ in 0..=close {
                        self.bump();
                    }
                    self.finish();
                }
                None => self.error_expected("`)`"),
            }
        }
        self.finish();
    }

    // ------------------------------------------------------------------
    // Type declarations
    // ------------------------------------------------------------------

    /// Whether a type declaration starts here, possibly after modifiers.
    pub(super) fn at_type_declaration(&self) -> bool {
        let mut i = 0;
        loop {
            let kind = self.nth(i);
            if kind.is_modifier() {
                i += 1;
            } else if kind == TokenKind::At && self.nth(i + 1) == TokenKind::Ident {
                i += 2;
                while self.nth(i) == TokenKind::Dot {
                    i += 2;
                }
                if self.nth(i) == TokenKind::LParen {
                    match self.matching(i, TokenKind::LParen, TokenKind::RParen) {
                        Some(close) => i = close + 1,
                        None => return false,
                    }
                }
            } else {
                break;
            }
        }
        match self.nth(i) {
            TokenKind::Class | TokenKind::Interface | TokenKind::Enum => true,
            TokenKind::At => self.nth(i + 1) == TokenKind::Interface,
            _ => false,
        }
    }

    /// The declaration after its modifiers, which were added since `cp`.
    pub(super) fn type_declaration(&mut self, cp: Checkpoint) -> Option<()> {
        match self.kind() {
            TokenKind::Class => {
                self.start_at(cp, SyntaxKind::ClassDecl);
                self.bump();
                self.expect_ident()?;
                self.type_parameters_opt()?;
                if self.at(TokenKind::Extends) {
                    self.start(SyntaxKind::ExtendsClause);
                    self.bump();
                    self.type_ref()?;
                    self.finish();
                }
                self.implements_opt()?;
                self.class_body()?;
            }
            TokenKind::Interface => {
                self.start_at(cp, SyntaxKind::InterfaceDecl);
                self.bump();
                self.expect_ident()?;
                self.type_parameters_opt()?;
                if self.at(TokenKind::Extends) {
                    self.start(SyntaxKind::ExtendsClause);
                    self.bump();
                    self.type_list()?;
                    self.finish();
                }
                self.class_body()?;
            }
            TokenKind::Enum => {
                self.start_at(cp, SyntaxKind::EnumDecl);
                self.bump();
                self.expect_ident()?;
                self.implements_opt()?;
                self.enum_body()?;
            }
            TokenKind::At if self.nth(1) == TokenKind::Interface => {
                self.start_at(cp, SyntaxKind::AnnotationDecl);
                self.bump();
                self.bump();
                self.expect_ident()?;
                self.class_body()?;
            }
            _ => {
                self.error_expected("type declaration");
                return None;
            }
        }
        self.finish();
        Some(())
    }

    fn implements_opt(&mut self) -> Option<()> {
        if self.at(TokenKind::Implements) {
            self.start(SyntaxKind::ImplementsClause);
            self.bump();
            self.type_list()?;
            self.finish();
        }
        Some(())
    }

    fn type_list(&mut self) -> Option<()> {
        self.type_ref()?;
        while self.eat(TokenKind::Comma) {
            self.type_ref()?;
        }
        Some(())
    }

    pub(super) fn class_body(&mut self) -> Option<()> {
        self.start(SyntaxKind::ClassBody);
        self.expect(TokenKind::LBrace, "`{`")?;
        self.members();
        self.expect_closing_brace()?;
        self.finish();
        Some(())
    }

    fn members(&mut self) {
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            self.recovering(Resume::Member, Self::member);
        }
    }

    fn enum_body(&mut self) -> Option<()> {
        self.start(SyntaxKind::EnumBody);
        self.expect(TokenKind::LBrace, "`{`")?;
        while self.at(TokenKind::Ident) || self.at(TokenKind::At) {
            self.recovering(Resume::Member, Self::enum_constant);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if self.eat(TokenKind::Semicolon) {
            self.members();
        }
        self.expect_closing_brace()?;
        self.finish();
        Some(())
    }

    fn enum_constant(&mut self) -> Option<()> {
        self.start(SyntaxKind::EnumConstant);
        self.modifiers();
        self.expect_ident()?;
        if self.at(TokenKind::LParen) {
            self.arguments()?;
        }
        if self.at(TokenKind::LBrace) {
            self.class_body()?;
        }
        self.finish();
        Some(())
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn member(&mut self) -> Option<()> {
        let cp = self.checkpoint();

        if self.at(TokenKind::LBrace)
            || (self.at(TokenKind::Static) && self.nth(1) == TokenKind::LBrace)
        {
            self.start(SyntaxKind::Initializer);
            self.eat(TokenKind::Static);
            self.block()?;
            self.finish();
            return Some(());
        }

        self.modifiers();

        match self.kind() {
            TokenKind::Class | TokenKind::Interface | TokenKind::Enum => {
                return self.type_declaration(cp);
            }
            TokenKind::At if self.nth(1) == TokenKind::Interface => {
                return self.type_declaration(cp);
            }
            _ => {}
        }

        self.type_parameters_opt()?;

        if self.at(TokenKind::Ident) && self.nth(1) == TokenKind::LParen {
            self.start_at(cp, SyntaxKind::ConstructorDecl);
            self.bump();
            self.method_rest()?;
            self.finish();
            return Some(());
        }

        if self.at(TokenKind::Void) {
            self.bump();
        } else {
            self.type_ref()?;
        }

        if self.at(TokenKind::Ident) && self.nth(1) == TokenKind::LParen {
            self.start_at(cp, SyntaxKind::MethodDecl);
            self.bump();
            self.method_rest()?;
            self.finish();
            return Some(());
        }

        self.start_at(cp, SyntaxKind::FieldDecl);
        self.variable_declarators()?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        self.finish();
        Some(())
    }

    /// Parameters, dimensions, throws clause, then a body, `;` or an
    /// annotation default.
    fn method_rest(&mut self) -> Option<()> {
        self.formal_parameters()?;
        while self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket {
            self.bump();
            self.bump();
        }
        if self.at(TokenKind::Throws) {
            self.start(SyntaxKind::ThrowsClause);
            self.bump();
            self.type_list()?;
            self.finish();
        }
        if self.eat(TokenKind::Default) {
            self.element_value()?;
            self.expect(TokenKind::Semicolon, "`;`")?;
        } else if !self.eat(TokenKind::Semicolon) {
            self.block()?;
        }
        Some(())
    }

    fn element_value(&mut self) -> Option<()> {
        match self.kind() {
            TokenKind::LBrace => self.array_init(),
            TokenKind::At => {
                self.annotation();
                Some(())
            }
            _ => self.expr(),
        }
    }

    fn formal_parameters(&mut self) -> Option<()> {
        self.start(SyntaxKind::FormalParameters);
        self.expect(TokenKind::LParen, "`(`")?;
        if !self.at(TokenKind::RParen) {
            loop {
                self.parameter()?;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        self.finish();
        Some(())
    }

    pub(super) fn parameter(&mut self) -> Option<()> {
        self.start(SyntaxKind::Parameter);
        self.modifiers();
        self.type_ref()?;
        self.eat(TokenKind::Ellipsis);
        if !self.eat(TokenKind::This) {
            self.expect_ident()?;
        }
        while self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket {
            self.bump();
            self.bump();
        }
        self.finish();
        Some(())
    }

    /// `a = 1, b[] = {2}` as a sequence of `VariableDeclarator`s.
    pub(super) fn variable_declarators(&mut self) -> Option<()> {
        loop {
            self.start(SyntaxKind::VariableDeclarator);
            self.expect_ident()?;
            while self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket {
                self.bump();
                self.bump();
            }
            if self.eat(TokenKind::Eq) {
                self.variable_initializer()?;
            }
            self.finish();
            if !self.eat(TokenKind::Comma) {
                return Some(());
            }
        }
    }

    pub(super) fn variable_initializer(&mut self) -> Option<()> {
        if self.at(TokenKind::LBrace) {
            self.array_init()
        } else {
            self.expr()
        }
    }
}
