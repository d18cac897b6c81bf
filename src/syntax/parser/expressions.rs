//! Expressions, by precedence climbing.
//!
//! `>>`, `>>>` and `>>=` arrive as adjacent `>` / `>=` tokens and are
//! recognized here by adjacency.

use super::Parser;
use crate::syntax::token::TokenKind;
use crate::syntax::tree::SyntaxKind;

/// A binary operator at the cursor: precedence and width in tokens.
#[derive(Clone, Copy)]
struct BinaryOp {
    precedence: u8,
    width: usize,
    instanceof: bool,
}

impl<'t> Parser<'t> {
    pub(super) fn expr(&mut self) -> Option<()> {
        if self.at_lambda() {
            return self.lambda();
        }
        let cp = self.checkpoint();
        self.conditional()?;
        if let Some(width) = self.assignment_op() {
            self.start_at(cp, SyntaxKind::AssignExpr);
            for _ in 0..width {
                self.bump();
            }
            self.expr()?;
            self.finish();
        }
        Some(())
    }

    /// Width of the assignment operator at the cursor, if any.
    fn assignment_op(&self) -> Option<usize> {
        let kind = self.kind();
        if kind.is_assignment_op() {
            return Some(1);
        }
        if kind == TokenKind::Gt && self.adjacent(0) {
            match self.nth(1) {
                TokenKind::GtEq => return Some(2),
                TokenKind::Gt if self.adjacent(1) && self.nth(2) == TokenKind::GtEq => {
                    return Some(3);
                }
                _ => {}
            }
        }
        None
    }

    pub(super) fn conditional(&mut self) -> Option<()> {
        let cp = self.checkpoint();
        self.binary(0)?;
        if self.at(TokenKind::Question) {
            self.start_at(cp, SyntaxKind::ConditionalExpr);
            self.bump();
            self.expr()?;
            self.expect(TokenKind::Colon, "`:`")?;
            if self.at_lambda() {
                self.lambda()?;
            } else {
                self.conditional()?;
            }
            self.finish();
        }
        Some(())
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = |precedence, width| BinaryOp {
            precedence,
            width,
            instanceof: false,
        };
        let found = match self.kind() {
            TokenKind::PipePipe => op(1, 1),
            TokenKind::AmpAmp => op(2, 1),
            TokenKind::Pipe => op(3, 1),
            TokenKind::Caret => op(4, 1),
            TokenKind::Amp => op(5, 1),
            TokenKind::EqEq | TokenKind::BangEq => op(6, 1),
            TokenKind::Lt | TokenKind::LtEq | TokenKind::GtEq => op(7, 1),
            TokenKind::Instanceof => BinaryOp {
                precedence: 7,
                width: 1,
                instanceof: true,
            },
            TokenKind::Gt => {
                if self.assignment_op().is_some() {
                    return None;
                }
                if self.nth(1) == TokenKind::Gt && self.adjacent(0) {
                    if self.nth(2) == TokenKind::Gt && self.adjacent(1) {
                        op(8, 3)
                    } else {
                        op(8, 2)
                    }
                } else {
                    op(7, 1)
                }
            }
            TokenKind::Shl => op(8, 1),
            TokenKind::Plus | TokenKind::Minus => op(9, 1),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => op(10, 1),
            _ => return None,
        };
        Some(found)
    }

    fn binary(&mut self, min_precedence: u8) -> Option<()> {
        let cp = self.checkpoint();
        self.unary()?;
        while let Some(op) = self.binary_op() {
            if op.precedence < min_precedence {
                break;
            }
            if op.instanceof {
                self.start_at(cp, SyntaxKind::InstanceOfExpr);
                self.bump();
                self.eat(TokenKind::Final);
                self.type_ref()?;
                self.eat(TokenKind::Ident);
                self.finish();
                continue;
            }
            self.start_at(cp, SyntaxKind::BinaryExpr);
            for _ in 0..op.width {
                self.bump();
            }
            self.binary(op.precedence + 1)?;
            self.finish();
        }
        Some(())
    }

    fn unary(&mut self) -> Option<()> {
        match self.kind() {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => {
                self.start(SyntaxKind::UnaryExpr);
                self.bump();
                self.unary()?;
                self.finish();
                Some(())
            }
            TokenKind::LParen if self.at_cast() => {
                self.start(SyntaxKind::CastExpr);
                self.bump();
                self.type_ref()?;
                while self.eat(TokenKind::Amp) {
                    self.type_ref()?;
                }
                self.expect(TokenKind::RParen, "`)`")?;
                if self.at_lambda() {
                    self.lambda()?;
                } else {
                    self.unary()?;
                }
                self.finish();
                Some(())
            }
            _ => self.postfix(),
        }
    }

    /// `(int) x`, `(String) o`, `(List<T>) o`; not `(a) + b`.
    fn at_cast(&self) -> bool {
        let Some(after) = self.scan_type(1) else {
            return false;
        };
        let mut close = after;
        while self.nth(close) == TokenKind::Amp {
            match self.scan_type(close + 1) {
                Some(next) => close = next,
                None => return false,
            }
        }
        if self.nth(close) != TokenKind::RParen {
            return false;
        }
        if self.nth(1).is_primitive_type() {
            return true;
        }
        let next = self.nth(close + 1);
        next == TokenKind::Ident
            || next.is_literal()
            || matches!(
                next,
                TokenKind::LParen
                    | TokenKind::This
                    | TokenKind::Super
                    | TokenKind::New
                    | TokenKind::Bang
                    | TokenKind::Tilde
            )
    }

    fn postfix(&mut self) -> Option<()> {
        let cp = self.checkpoint();
        self.primary()?;
        loop {
            match self.kind() {
                TokenKind::Dot => match self.nth(1) {
                    TokenKind::Ident if self.nth(2) == TokenKind::LParen => {
                        self.start_at(cp, SyntaxKind::MethodCall);
                        self.bump();
                        self.bump();
                        self.arguments()?;
                        self.finish();
                    }
                    TokenKind::Lt => {
                        self.start_at(cp, SyntaxKind::MethodCall);
                        self.bump();
                        self.type_arguments()?;
                        self.expect_ident()?;
                        self.arguments()?;
                        self.finish();
                    }
                    TokenKind::Ident | TokenKind::This => {
                        self.start_at(cp, SyntaxKind::FieldAccess);
                        self.bump();
                        self.bump();
                        self.finish();
                    }
                    TokenKind::Super => {
                        self.start_at(cp, SyntaxKind::FieldAccess);
                        self.bump();
                        self.bump();
                        self.finish();
                    }
                    TokenKind::Class => {
                        self.start_at(cp, SyntaxKind::ClassLiteral);
                        self.bump();
                        self.bump();
                        self.finish();
                    }
                    TokenKind::New => {
                        self.start_at(cp, SyntaxKind::FieldAccess);
                        self.bump();
                        self.new_expr()?;
                        self.finish();
                    }
                    _ => {
                        self.bump();
                        self.error_expected("member name");
                        return None;
                    }
                },
                TokenKind::LBracket => {
                    self.start_at(cp, SyntaxKind::ArrayAccess);
                    self.bump();
                    self.expr()?;
                    self.expect(TokenKind::RBracket, "`]`")?;
                    self.finish();
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    self.start_at(cp, SyntaxKind::PostfixExpr);
                    self.bump();
                    self.finish();
                }
                TokenKind::ColonColon => {
                    self.start_at(cp, SyntaxKind::MethodRef);
                    self.bump();
                    if !self.eat(TokenKind::New) {
                        self.expect_ident()?;
                    }
                    self.finish();
                }
                _ => return Some(()),
            }
        }
    }

    fn primary(&mut self) -> Option<()> {
        let kind = self.kind();
        match kind {
            k if k.is_literal() => {
                self.token_node(SyntaxKind::Literal);
                Some(())
            }
            TokenKind::This | TokenKind::Super if self.nth(1) == TokenKind::LParen => {
                self.start(SyntaxKind::MethodCall);
                self.bump();
                self.arguments()?;
                self.finish();
                Some(())
            }
            TokenKind::This => {
                self.token_node(SyntaxKind::ThisExpr);
                Some(())
            }
            TokenKind::Super => {
                self.token_node(SyntaxKind::SuperExpr);
                Some(())
            }
            TokenKind::Ident if self.nth(1) == TokenKind::LParen => {
                self.start(SyntaxKind::MethodCall);
                self.bump();
                self.arguments()?;
                self.finish();
                Some(())
            }
            TokenKind::Ident if self.at_array_type_literal() => {
                self.start(SyntaxKind::ClassLiteral);
                self.type_ref()?;
                self.expect(TokenKind::Dot, "`.`")?;
                self.expect(TokenKind::Class, "`class`")?;
                self.finish();
                Some(())
            }
            TokenKind::Ident => {
                self.token_node(SyntaxKind::NameRef);
                Some(())
            }
            TokenKind::LParen => {
                self.start(SyntaxKind::ParenExpr);
                self.bump();
                self.expr()?;
                self.expect(TokenKind::RParen, "`)`")?;
                self.finish();
                Some(())
            }
            TokenKind::New => self.new_expr(),
            TokenKind::LBrace => self.array_init(),
            TokenKind::Void => {
                self.start(SyntaxKind::ClassLiteral);
                self.bump();
                self.expect(TokenKind::Dot, "`.`")?;
                self.expect(TokenKind::Class, "`class`")?;
                self.finish();
                Some(())
            }
            k if k.is_primitive_type() => {
                // `int.class`, `int[].class`, `int[]::new`
                self.start(SyntaxKind::ClassLiteral);
                self.type_ref()?;
                if self.eat(TokenKind::Dot) {
                    self.expect(TokenKind::Class, "`class`")?;
                }
                self.finish();
                Some(())
            }
            _ => {
                self.error_expected("expression");
                None
            }
        }
    }

    /// `String[].class` or `String[]::new`.
    fn at_array_type_literal(&self) -> bool {
        self.scan_type(0).is_some_and(|after| {
            self.nth(after.saturating_sub(1)) == TokenKind::RBracket
                && matches!(self.nth(after), TokenKind::Dot | TokenKind::ColonColon)
        })
    }

    fn new_expr(&mut self) -> Option<()> {
        let cp = self.checkpoint();
        self.bump();
        if self.at(TokenKind::Lt) {
            self.type_arguments()?;
        }
        self.type_ref_no_dims()?;
        if self.at(TokenKind::LBracket) {
            self.start_at(cp, SyntaxKind::NewArray);
            while self.at(TokenKind::LBracket) {
                self.bump();
                if !self.at(TokenKind::RBracket) {
                    self.expr()?;
                }
                self.expect(TokenKind::RBracket, "`]`")?;
            }
            if self.at(TokenKind::LBrace) {
                self.array_init()?;
            }
        } else {
            self.start_at(cp, SyntaxKind::NewObject);
            self.arguments()?;
            if self.at(TokenKind::LBrace) {
                self.class_body()?;
            }
        }
        self.finish();
        Some(())
    }

    pub(super) fn arguments(&mut self) -> Option<()> {
        self.start(SyntaxKind::Arguments);
        self.expect(TokenKind::LParen, "`(`")?;
        if !self.at(TokenKind::RParen) {
            loop {
                self.expr()?;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        self.finish();
        Some(())
    }

    pub(super) fn array_init(&mut self) -> Option<()> {
        self.start(SyntaxKind::ArrayInit);
        self.expect(TokenKind::LBrace, "`{`")?;
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            self.variable_initializer()?;
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        self.finish();
        Some(())
    }

    // ------------------------------------------------------------------
    // Lambdas
    // ------------------------------------------------------------------

    fn at_lambda(&self) -> bool {
        match self.kind() {
            TokenKind::Ident => self.nth(1) == TokenKind::Arrow,
            TokenKind::LParen => self
                .matching(0, TokenKind::LParen, TokenKind::RParen)
                .is_some_and(|close| self.nth(close + 1) == TokenKind::Arrow),
            _ => false,
        }
    }

    fn lambda(&mut self) -> Option<()> {
        self.start(SyntaxKind::LambdaExpr);
        self.start(SyntaxKind::LambdaParams);
        if self.eat(TokenKind::LParen) {
            if !self.at(TokenKind::RParen) {
                loop {
                    if self.at(TokenKind::Ident)
                        && matches!(self.nth(1), TokenKind::Comma | TokenKind::RParen)
                    {
                        self.bump();
                    } else {
                        self.parameter()?;
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "`)`")?;
        } else {
            self.expect_ident()?;
        }
        self.finish();
        self.expect(TokenKind::Arrow, "`->`")?;
        if self.at(TokenKind::LBrace) {
            self.block()?;
        } else {
            self.expr()?;
        }
        self.finish();
        Some(())
    }
}
