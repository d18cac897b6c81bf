//! Blocks and statements.

use super::Parser;
use super::recovery::Resume;
use crate::syntax::token::TokenKind;
use crate::syntax::tree::SyntaxKind;

impl<'t> Parser<'t> {
    pub(super) fn block(&mut self) -> Option<()> {
        self.start(SyntaxKind::Block);
        self.expect(TokenKind::LBrace, "`{`")?;
        self.block_statements(&[TokenKind::RBrace]);
        self.expect_closing_brace()?;
        self.finish();
        Some(())
    }

    /// Statements up to (not including) one of `end`.
    fn block_statements(&mut self, end: &[TokenKind]) {
        while !self.at_any(end) && !self.at(TokenKind::RBrace) && !self.at_eof() {
            self.recovering(Resume::Statement, Self::block_statement);
        }
    }

    fn block_statement(&mut self) -> Option<()> {
        if self.at_type_declaration() {
            let cp = self.checkpoint();
            self.modifiers();
            return self.type_declaration(cp);
        }
        if self.at_local_var_decl() {
            self.local_var_decl()?;
            self.expect(TokenKind::Semicolon, "`;`")?;
            self.finish();
            return Some(());
        }
        self.statement()
    }

    /// A local variable declaration without its terminator. The node is left
    /// open so the caller can add the `;`.
    fn local_var_decl(&mut self) -> Option<()> {
        self.start(SyntaxKind::LocalVarDecl);
        self.modifiers();
        self.type_ref()?;
        self.variable_declarators()
    }

    fn statement(&mut self) -> Option<()> {
        match self.kind() {
            TokenKind::LBrace => self.block(),
            TokenKind::Semicolon => {
                self.token_node(SyntaxKind::EmptyStmt);
                Some(())
            }
            TokenKind::If => self.if_stmt(),
            TokenKind::While => {
                self.start(SyntaxKind::WhileStmt);
                self.bump();
                self.paren_expr()?;
                self.statement()?;
                self.finish();
                Some(())
            }
            TokenKind::Do => {
                self.start(SyntaxKind::DoStmt);
                self.bump();
                self.statement()?;
                self.expect(TokenKind::While, "`while`")?;
                self.paren_expr()?;
                self.expect(TokenKind::Semicolon, "`;`")?;
                self.finish();
                Some(())
            }
            TokenKind::For => self.for_stmt(),
            TokenKind::Return => self.simple_stmt(SyntaxKind::ReturnStmt, true),
            TokenKind::Throw => self.simple_stmt(SyntaxKind::ThrowStmt, false),
            TokenKind::Break => self.jump_stmt(SyntaxKind::BreakStmt),
            TokenKind::Continue => self.jump_stmt(SyntaxKind::ContinueStmt),
            TokenKind::Switch => self.switch_stmt(),
            TokenKind::Try => self.try_stmt(),
            TokenKind::Synchronized => {
                self.start(SyntaxKind::SyncStmt);
                self.bump();
                self.paren_expr()?;
                self.block()?;
                self.finish();
                Some(())
            }
            TokenKind::Assert => {
                self.start(SyntaxKind::AssertStmt);
                self.bump();
                self.expr()?;
                if self.eat(TokenKind::Colon) {
                    self.expr()?;
                }
                self.expect(TokenKind::Semicolon, "`;`")?;
                self.finish();
                Some(())
            }
            TokenKind::Ident if self.nth(1) == TokenKind::Colon => {
                self.start(SyntaxKind::LabeledStmt);
                self.bump();
                self.bump();
                self.statement()?;
                self.finish();
                Some(())
            }
            _ => {
                self.start(SyntaxKind::ExprStmt);
                self.expr()?;
                self.expect(TokenKind::Semicolon, "`;`")?;
                self.finish();
                Some(())
            }
        }
    }

    fn paren_expr(&mut self) -> Option<()> {
        self.expect(TokenKind::LParen, "`(`")?;
        self.expr()?;
        self.expect(TokenKind::RParen, "`)`")
    }

    fn if_stmt(&mut self) -> Option<()> {
        self.start(SyntaxKind::IfStmt);
        self.bump();
        self.paren_expr()?;
        self.statement()?;
        if self.eat(TokenKind::Else) {
            self.statement()?;
        }
        self.finish();
        Some(())
    }

    /// `return x;`, `throw e;`.
    fn simple_stmt(&mut self, kind: SyntaxKind, optional_expr: bool) -> Option<()> {
        self.start(kind);
        self.bump();
        if !(optional_expr && self.at(TokenKind::Semicolon)) {
            self.expr()?;
        }
        self.expect(TokenKind::Semicolon, "`;`")?;
        self.finish();
        Some(())
    }

    fn jump_stmt(&mut self, kind: SyntaxKind) -> Option<()> {
        self.start(kind);
        self.bump();
        self.eat(TokenKind::Ident);
        self.expect(TokenKind::Semicolon, "`;`")?;
        self.finish();
        Some(())
    }

    fn for_stmt(&mut self) -> Option<()> {
        let cp = self.checkpoint();
        self.bump();
        self.expect(TokenKind::LParen, "`(`")?;

        if self.at_local_var_decl() && self.at_for_each_colon() {
            self.start_at(cp, SyntaxKind::ForEachStmt);
            self.modifiers();
            self.type_ref()?;
            self.expect_ident()?;
            self.expect(TokenKind::Colon, "`:`")?;
            self.expr()?;
        } else {
            self.start_at(cp, SyntaxKind::ForStmt);
            self.start(SyntaxKind::ForInit);
            if self.at_local_var_decl() {
                self.local_var_decl()?;
                self.finish();
            } else if !self.at(TokenKind::Semicolon) {
                self.expr_list()?;
            }
            self.finish();
            self.expect(TokenKind::Semicolon, "`;`")?;
            if !self.at(TokenKind::Semicolon) {
                self.expr()?;
            }
            self.expect(TokenKind::Semicolon, "`;`")?;
            self.start(SyntaxKind::ForUpdate);
            if !self.at(TokenKind::RParen) {
                self.expr_list()?;
            }
            self.finish();
        }
        self.expect(TokenKind::RParen, "`)`")?;
        self.statement()?;
        self.finish();
        Some(())
    }

    /// Whether the declaration ahead is a for-each header (`T x :`).
    fn at_for_each_colon(&self) -> bool {
        let mut i = 0;
        while !matches!(
            self.nth(i),
            TokenKind::Colon | TokenKind::Semicolon | TokenKind::Eq | TokenKind::Eof
        ) {
            i += 1;
        }
        self.nth(i) == TokenKind::Colon
    }

    fn expr_list(&mut self) -> Option<()> {
        self.expr()?;
        while self.eat(TokenKind::Comma) {
            self.expr()?;
        }
        Some(())
    }

    fn switch_stmt(&mut self) -> Option<()> {
        self.start(SyntaxKind::SwitchStmt);
        self.bump();
        self.paren_expr()?;
        self.expect(TokenKind::LBrace, "`{`")?;
        while self.at_any(&[TokenKind::Case, TokenKind::Default]) {
            self.switch_case()?;
        }
        self.expect_closing_brace()?;
        self.finish();
        Some(())
    }

    fn switch_case(&mut self) -> Option<()> {
        self.start(SyntaxKind::SwitchCase);
        if self.eat(TokenKind::Case) {
            // Labels stop short of lambdas so `case A ->` is not misread.
            self.conditional()?;
            while self.eat(TokenKind::Comma) {
                self.conditional()?;
            }
        } else {
            self.bump();
        }
        if self.eat(TokenKind::Arrow) {
            if self.at(TokenKind::LBrace) {
                self.block()?;
            } else if self.at(TokenKind::Throw) {
                self.statement()?;
            } else {
                self.start(SyntaxKind::ExprStmt);
                self.expr()?;
                self.expect(TokenKind::Semicolon, "`;`")?;
                self.finish();
            }
        } else {
            self.expect(TokenKind::Colon, "`:` or `->`")?;
            self.block_statements(&[TokenKind::Case, TokenKind::Default]);
        }
        self.finish();
        Some(())
    }

    fn try_stmt(&mut self) -> Option<()> {
        self.start(SyntaxKind::TryStmt);
        self.bump();
        if self.eat(TokenKind::LParen) {
            while !self.at(TokenKind::RParen) && !self.at_eof() {
                self.start(SyntaxKind::ResourceSpec);
                if self.at_local_var_decl() {
                    self.modifiers();
                    self.type_ref()?;
                    self.variable_declarators()?;
                } else {
                    self.expr()?;
                }
                self.finish();
                if !self.eat(TokenKind::Semicolon) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "`)`")?;
        }
        self.block()?;
        while self.at(TokenKind::Catch) {
            self.start(SyntaxKind::CatchClause);
            self.bump();
            self.expect(TokenKind::LParen, "`(`")?;
            self.modifiers();
            self.type_ref()?;
            while self.eat(TokenKind::Pipe) {
                self.type_ref()?;
            }
            self.expect_ident()?;
            self.expect(TokenKind::RParen, "`)`")?;
            self.block()?;
            self.finish();
        }
        if self.at(TokenKind::Finally) {
            self.start(SyntaxKind::FinallyClause);
            self.bump();
            self.block()?;
            self.finish();
        }
        self.finish();
        Some(())
    }
}
