//! Third pass: function bodies and field initializers.
//!
//! Type references inside a body become dependencies of the enclosing type.
//! Field accesses are recorded for names that resolve to a field of the
//! enclosing types and are not shadowed by a local variable, and for
//! `this.name`. Compound assignments and `++`/`--` both read and write.

use smol_str::SmolStr;

use super::ScanError;
use super::unit::{PendingBody, UnitScan};
use crate::graph::{Access, AccessKind, FieldId, FunctionId};
use crate::syntax::{SyntaxKind, SyntaxNode, Token, TokenKind, TreeView};

/// Local variables in scope, one frame per block-like node.
struct Locals {
    frames: Vec<Vec<SmolStr>>,
}

impl Locals {
    fn new(parameters: Vec<SmolStr>) -> Self {
        Self {
            frames: vec![parameters],
        }
    }

    fn push(&mut self) {
        self.frames.push(Vec::new());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn declare(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(name.into());
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|frame| frame.iter().any(|n| n == name))
    }
}

/// What a body walk needs besides the local variables.
struct BodyContext {
    owner: usize,
    function: Option<FunctionId>,
    type_params: Vec<SmolStr>,
}

fn opens_scope(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Block
            | SyntaxKind::ForStmt
            | SyntaxKind::ForEachStmt
            | SyntaxKind::CatchClause
            | SyntaxKind::LambdaExpr
            | SyntaxKind::TryStmt
            | SyntaxKind::SwitchStmt
            | SyntaxKind::SwitchCase
    )
}

impl<'t> UnitScan<'_, 't> {
    pub(super) fn scan_bodies(&mut self) -> Result<(), ScanError> {
        let bodies = std::mem::take(&mut self.bodies);
        for PendingBody {
            owner,
            function,
            node,
            locals,
            type_params,
        } in bodies
        {
            let context = BodyContext {
                owner,
                function,
                type_params,
            };
            let mut locals = Locals::new(locals);
            self.walk(node, &context, &mut locals)?;
        }
        Ok(())
    }

    fn walk(&mut self, node: &'t SyntaxNode, cx: &BodyContext, locals: &mut Locals) -> Result<(), ScanError> {
        let kind = node.kind();
        // Nested types are scanned as types of their own.
        if kind.is_type_declaration() || kind == SyntaxKind::ClassBody {
            return Ok(());
        }

        let scoped = opens_scope(kind);
        if scoped {
            locals.push();
        }
        match kind {
            SyntaxKind::TypeRef => {
                self.type_use(node, cx.owner, &cx.type_params, 0)?;
            }
            SyntaxKind::Annotation => self.annotation(node, cx.owner)?,
            SyntaxKind::VariableDeclarator
            | SyntaxKind::ForEachStmt
            | SyntaxKind::CatchClause
            | SyntaxKind::Parameter
            | SyntaxKind::InstanceOfExpr => {
                if let Some(name) = node.child_token(TokenKind::Ident) {
                    locals.declare(&name.text);
                }
                self.walk_children(node, cx, locals)?;
            }
            SyntaxKind::LambdaParams => {
                for name in node.children().iter().filter_map(SyntaxNode::token) {
                    if name.kind == TokenKind::Ident {
                        locals.declare(&name.text);
                    }
                }
                self.walk_children(node, cx, locals)?;
            }
            SyntaxKind::AssignExpr => self.assignment(node, cx, locals)?,
            SyntaxKind::UnaryExpr | SyntaxKind::PostfixExpr => {
                let increments = node
                    .children()
                    .iter()
                    .any(|c| matches!(c.token_kind(), Some(TokenKind::PlusPlus | TokenKind::MinusMinus)));
                let target = if increments {
                    node.nodes().next().and_then(|operand| self.field_target(operand, cx, locals))
                } else {
                    None
                };
                match target {
                    Some((field, at)) => {
                        self.record_access(cx, field, at, AccessKind::Read);
                        self.record_access(cx, field, at, AccessKind::Write);
                    }
                    None => self.walk_children(node, cx, locals)?,
                }
            }
            SyntaxKind::NameRef => {
                if let Some((field, at)) = self.field_target(node, cx, locals) {
                    self.record_access(cx, field, at, AccessKind::Read);
                }
            }
            SyntaxKind::FieldAccess => match self.field_target(node, cx, locals) {
                Some((field, at)) => self.record_access(cx, field, at, AccessKind::Read),
                None => self.qualified_access(node, cx, locals)?,
            },
            SyntaxKind::MethodCall | SyntaxKind::MethodRef | SyntaxKind::ClassLiteral => {
                self.qualified_access(node, cx, locals)?
            }
            _ => self.walk_children(node, cx, locals)?,
        }
        if scoped {
            locals.pop();
        }
        Ok(())
    }

    fn walk_children(&mut self, node: &'t SyntaxNode, cx: &BodyContext, locals: &mut Locals) -> Result<(), ScanError> {
        for child in node.nodes() {
            self.walk(child, cx, locals)?;
        }
        Ok(())
    }

    /// `target.member`: a capitalized target that is neither a local nor a
    /// field names a type, as in `Math.max(a, b)`.
    fn qualified_access(&mut self, node: &'t SyntaxNode, cx: &BodyContext, locals: &mut Locals) -> Result<(), ScanError> {
        let mut children = node.nodes();
        if let Some(target) = children.next() {
            match self.type_target(target, cx, locals) {
                Some(name) => {
                    self.reference(&[name], cx.owner)?;
                }
                None => self.walk(target, cx, locals)?,
            }
        }
        for child in children {
            self.walk(child, cx, locals)?;
        }
        Ok(())
    }

    fn type_target(&self, node: &'t SyntaxNode, cx: &BodyContext, locals: &Locals) -> Option<&'t Token> {
        if node.kind() != SyntaxKind::NameRef {
            return None;
        }
        let name = node.child_token(TokenKind::Ident)?;
        let capitalized = name.text.chars().next().is_some_and(char::is_uppercase);
        if !capitalized || locals.contains(&name.text) || self.field_named(&name.text, cx.owner).is_some() {
            return None;
        }
        Some(name)
    }

    fn assignment(&mut self, node: &'t SyntaxNode, cx: &BodyContext, locals: &mut Locals) -> Result<(), ScanError> {
        let children = node.children();
        let Some((lhs, rest)) = children.split_first() else {
            return Ok(());
        };
        let operator: Vec<TokenKind> = rest.iter().filter_map(SyntaxNode::token_kind).collect();
        let plain = operator == [TokenKind::Eq];

        match self.field_target(lhs, cx, locals) {
            Some((field, at)) => {
                if !plain {
                    self.record_access(cx, field, at, AccessKind::Read);
                }
                self.record_access(cx, field, at, AccessKind::Write);
            }
            None => self.walk(lhs, cx, locals)?,
        }
        for child in rest.iter().filter(|c| !c.is_error() && c.kind() != SyntaxKind::Token) {
            self.walk(child, cx, locals)?;
        }
        Ok(())
    }

    /// The field an expression denotes: an unshadowed simple name or
    /// `this.name`.
    fn field_target(&self, node: &'t SyntaxNode, cx: &BodyContext, locals: &Locals) -> Option<(FieldId, u32)> {
        match node.kind() {
            SyntaxKind::NameRef => {
                let name = node.child_token(TokenKind::Ident)?;
                if locals.contains(&name.text) {
                    return None;
                }
                self.field_named(&name.text, cx.owner).map(|field| (field, name.line))
            }
            SyntaxKind::FieldAccess => {
                let mut children = node.children().iter();
                if children.next()?.kind() != SyntaxKind::ThisExpr {
                    return None;
                }
                let name = node.child_token(TokenKind::Ident)?;
                self.types[cx.owner].fields.get(&name.text).map(|&field| (field, name.line))
            }
            SyntaxKind::ParenExpr => self.field_target(node.nodes().next()?, cx, locals),
            _ => None,
        }
    }

    /// A field declared by `owner` or an enclosing type.
    fn field_named(&self, name: &str, owner: usize) -> Option<FieldId> {
        let mut current = Some(owner);
        while let Some(index) = current {
            let ty = &self.types[index];
            if let Some(&field) = ty.fields.get(name) {
                return Some(field);
            }
            current = ty.parent;
        }
        None
    }

    fn record_access(&mut self, cx: &BodyContext, field: FieldId, line: u32, kind: AccessKind) {
        if !self.config.record_accesses {
            return;
        }
        // Field initializers have no function to attribute the access to.
        let Some(function) = cx.function else {
            return;
        };
        self.accesses.push(Access {
            function,
            field,
            line,
            kind,
        });
    }
}
