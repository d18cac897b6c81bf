//! The enriched concrete syntax tree.
//!
//! Every significant token of the input appears as a leaf. Composite nodes
//! additionally carry the comments attached to them and a memoized last line.
//! Regions the parser could not make sense of become [`ErrorNode`]s, a variant
//! of [`SyntaxNode`] that answers the same read-only queries but refuses
//! structural mutation.

use std::cell::OnceCell;
use std::fmt;

use thiserror::Error;

use super::token::{Token, TokenKind};
use crate::base::TextRange;

// ============================================================================
// KINDS
// ============================================================================

/// Node kinds of the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// A single token.
    Token,
    /// A region skipped by error recovery.
    Error,

    CompilationUnit,
    PackageDecl,
    ImportDecl,
    QualifiedName,

    ClassDecl,
    InterfaceDecl,
    EnumDecl,
    AnnotationDecl,
    Modifiers,
    Annotation,
    AnnotationArgs,
    TypeParameters,
    TypeParameter,
    ExtendsClause,
    ImplementsClause,
    ThrowsClause,
    ClassBody,
    EnumBody,
    EnumConstant,
    FieldDecl,
    VariableDeclarator,
    MethodDecl,
    ConstructorDecl,
    Initializer,
    FormalParameters,
    Parameter,

    TypeRef,
    TypeArguments,
    Wildcard,

    Block,
    LocalVarDecl,
    ExprStmt,
    IfStmt,
    WhileStmt,
    DoStmt,
    ForStmt,
    ForInit,
    ForUpdate,
    ForEachStmt,
    ReturnStmt,
    ThrowStmt,
    BreakStmt,
    ContinueStmt,
    SwitchStmt,
    SwitchCase,
    TryStmt,
    ResourceSpec,
    CatchClause,
    FinallyClause,
    SyncStmt,
    LabeledStmt,
    AssertStmt,
    EmptyStmt,

    AssignExpr,
    ConditionalExpr,
    BinaryExpr,
    InstanceOfExpr,
    UnaryExpr,
    PostfixExpr,
    CastExpr,
    ParenExpr,
    FieldAccess,
    MethodCall,
    ArrayAccess,
    NewObject,
    NewArray,
    ArrayInit,
    Arguments,
    Literal,
    NameRef,
    ThisExpr,
    SuperExpr,
    ClassLiteral,
    LambdaExpr,
    LambdaParams,
    MethodRef,
}

impl SyntaxKind {
    /// Type declarations: class, interface, enum and annotation type.
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassDecl
                | SyntaxKind::InterfaceDecl
                | SyntaxKind::EnumDecl
                | SyntaxKind::AnnotationDecl
        )
    }

    /// Nodes that receive attached comments.
    pub fn is_declaration(self) -> bool {
        self.is_type_declaration()
            || matches!(
                self,
                SyntaxKind::PackageDecl
                    | SyntaxKind::ImportDecl
                    | SyntaxKind::EnumConstant
                    | SyntaxKind::FieldDecl
                    | SyntaxKind::MethodDecl
                    | SyntaxKind::ConstructorDecl
                    | SyntaxKind::Initializer
                    | SyntaxKind::LocalVarDecl
            )
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// A parse diagnostic. Produced alongside a tree, never instead of one.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    /// 1-indexed.
    pub line: u32,
    /// 0-indexed.
    pub column: u32,
    pub range: TextRange,
    pub found: Option<TokenKind>,
}

impl SyntaxError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: token.line,
            column: token.column,
            range: token.range,
            found: Some(token.kind),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("error nodes cannot take children")]
    ErrorNodeIsImmutable,
}

// ============================================================================
// READ-ONLY INTERFACE
// ============================================================================

/// Queries shared by both tree node variants.
pub trait TreeView {
    fn kind(&self) -> SyntaxKind;

    /// Token text for leaves, the anchor token's text for composites, the
    /// skipped source for error nodes.
    fn text(&self) -> &str;

    /// 1-indexed line of the node's first token.
    fn line(&self) -> u32;

    /// 0-indexed column of the node's first token.
    fn column(&self) -> u32;

    fn children(&self) -> &[SyntaxNode];

    fn child(&self, index: usize) -> Option<&SyntaxNode> {
        self.children().get(index)
    }

    fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Stream index of the first token covered, if any.
    fn token_start_index(&self) -> Option<usize>;

    /// Stream index of the last token covered, if any.
    fn token_stop_index(&self) -> Option<usize>;

    /// Line of the last leaf below this node.
    fn last_line(&self) -> u32;

    fn preceding_comments(&self) -> &[Token];

    fn following_comments(&self) -> &[Token];
}

// ============================================================================
// NODES
// ============================================================================

/// A regular tree node. Leaves carry their token; composites use their first
/// token as anchor.
#[derive(Clone)]
pub struct TreeNode {
    kind: SyntaxKind,
    token: Token,
    children: Vec<SyntaxNode>,
    bounds: Option<(usize, usize)>,
    preceding: Vec<Token>,
    following: Vec<Token>,
    last_line: OnceCell<u32>,
}

impl TreeNode {
    pub(crate) fn new(kind: SyntaxKind, anchor: Token) -> Self {
        Self {
            kind,
            token: anchor,
            children: Vec::new(),
            bounds: None,
            preceding: Vec::new(),
            following: Vec::new(),
            last_line: OnceCell::new(),
        }
    }

    pub(crate) fn leaf(token: Token) -> Self {
        let index = token.index;
        let mut node = Self::new(SyntaxKind::Token, token);
        node.bounds = Some((index, index));
        node
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == SyntaxKind::Token
    }

    pub fn add_child(&mut self, child: SyntaxNode) {
        self.bounds = match (self.bounds, child.bounds()) {
            (None, b) => b,
            (a, None) => a,
            (Some((start, stop)), Some((child_start, child_stop))) => {
                Some((start.min(child_start), stop.max(child_stop)))
            }
        };
        self.children.push(child);
        self.last_line = OnceCell::new();
    }

    pub(crate) fn take_children_from(&mut self, at: usize) -> Vec<SyntaxNode> {
        let taken = self.children.split_off(at);
        self.recompute_bounds();
        self.last_line = OnceCell::new();
        taken
    }

    pub(crate) fn children_mut(&mut self) -> &mut [SyntaxNode] {
        &mut self.children
    }

    fn recompute_bounds(&mut self) {
        if self.is_leaf() {
            return;
        }
        let mut bounds = None;
        for child in &self.children {
            bounds = match (bounds, child.bounds()) {
                (None, b) => b,
                (a, None) => a,
                (Some((s, _)), Some((_, e))) => Some((s, e)),
            };
        }
        self.bounds = bounds;
    }

    pub fn add_preceding(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.preceding.extend(tokens);
    }

    pub fn add_following(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.following.extend(tokens);
    }
}

impl TreeView for TreeNode {
    fn kind(&self) -> SyntaxKind {
        self.kind
    }

    fn text(&self) -> &str {
        &self.token.text
    }

    fn line(&self) -> u32 {
        self.children.first().map_or(self.token.line, |c| c.line())
    }

    fn column(&self) -> u32 {
        self.children.first().map_or(self.token.column, |c| c.column())
    }

    fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    fn token_start_index(&self) -> Option<usize> {
        self.bounds.map(|(start, _)| start)
    }

    fn token_stop_index(&self) -> Option<usize> {
        self.bounds.map(|(_, stop)| stop)
    }

    fn last_line(&self) -> u32 {
        *self.last_line.get_or_init(|| match self.children.last() {
            Some(child) => child.last_line(),
            None => self.token.line,
        })
    }

    fn preceding_comments(&self) -> &[Token] {
        &self.preceding
    }

    fn following_comments(&self) -> &[Token] {
        &self.following
    }
}

/// A region of input skipped by error recovery.
#[derive(Clone)]
pub struct ErrorNode {
    start: Token,
    stop: Token,
    text: String,
    tokens: Vec<Token>,
    error: SyntaxError,
    preceding: Vec<Token>,
    following: Vec<Token>,
}

impl ErrorNode {
    pub(crate) fn new(
        start: Token,
        stop: Token,
        text: String,
        tokens: Vec<Token>,
        error: SyntaxError,
    ) -> Self {
        Self {
            start,
            stop,
            text,
            tokens,
            error,
            preceding: Vec::new(),
            following: Vec::new(),
        }
    }

    pub fn error(&self) -> &SyntaxError {
        &self.error
    }

    pub fn start_token(&self) -> &Token {
        &self.start
    }

    pub fn stop_token(&self) -> &Token {
        &self.stop
    }

    /// The significant tokens that were skipped.
    pub fn skipped(&self) -> &[Token] {
        &self.tokens
    }

    pub fn add_preceding(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.preceding.extend(tokens);
    }

    pub fn add_following(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.following.extend(tokens);
    }
}

impl TreeView for ErrorNode {
    fn kind(&self) -> SyntaxKind {
        SyntaxKind::Error
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn line(&self) -> u32 {
        self.start.line
    }

    fn column(&self) -> u32 {
        self.start.column
    }

    fn children(&self) -> &[SyntaxNode] {
        &[]
    }

    fn token_start_index(&self) -> Option<usize> {
        Some(self.start.index)
    }

    fn token_stop_index(&self) -> Option<usize> {
        Some(self.stop.index)
    }

    fn last_line(&self) -> u32 {
        self.stop.line
    }

    fn preceding_comments(&self) -> &[Token] {
        &self.preceding
    }

    fn following_comments(&self) -> &[Token] {
        &self.following
    }
}

/// A node of the enriched tree.
#[derive(Clone)]
pub enum SyntaxNode {
    Node(TreeNode),
    Error(ErrorNode),
}

impl SyntaxNode {
    fn view(&self) -> &dyn TreeView {
        match self {
            SyntaxNode::Node(node) => node,
            SyntaxNode::Error(node) => node,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SyntaxNode::Error(_))
    }

    pub fn as_node(&self) -> Option<&TreeNode> {
        match self {
            SyntaxNode::Node(node) => Some(node),
            SyntaxNode::Error(_) => None,
        }
    }

    /// The token of a leaf node.
    pub fn token(&self) -> Option<&Token> {
        match self {
            SyntaxNode::Node(node) if node.is_leaf() => Some(node.token()),
            _ => None,
        }
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        self.token().map(|t| t.kind)
    }

    /// Add a child. Error nodes are immutable.
    pub fn add_child(&mut self, child: SyntaxNode) -> Result<(), TreeError> {
        match self {
            SyntaxNode::Node(node) => {
                node.add_child(child);
                Ok(())
            }
            SyntaxNode::Error(_) => Err(TreeError::ErrorNodeIsImmutable),
        }
    }

    pub fn add_preceding(&mut self, tokens: impl IntoIterator<Item = Token>) {
        match self {
            SyntaxNode::Node(node) => node.add_preceding(tokens),
            SyntaxNode::Error(node) => node.add_preceding(tokens),
        }
    }

    pub fn add_following(&mut self, tokens: impl IntoIterator<Item = Token>) {
        match self {
            SyntaxNode::Node(node) => node.add_following(tokens),
            SyntaxNode::Error(node) => node.add_following(tokens),
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut [SyntaxNode] {
        match self {
            SyntaxNode::Node(node) => node.children_mut(),
            SyntaxNode::Error(_) => &mut [],
        }
    }

    fn bounds(&self) -> Option<(usize, usize)> {
        Some((self.token_start_index()?, self.token_stop_index()?))
    }

    /// Composite (non-leaf, non-error) children.
    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children()
            .iter()
            .filter(|c| !c.is_error() && c.kind() != SyntaxKind::Token)
    }

    /// First composite child of the given kind.
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children().iter().find(|c| c.kind() == kind)
    }

    /// First leaf child with the given token kind.
    pub fn child_token(&self, kind: TokenKind) -> Option<&Token> {
        self.children().iter().find_map(|c| c.token().filter(|t| t.kind == kind))
    }

    pub fn has_child_token(&self, kind: TokenKind) -> bool {
        self.child_token(kind).is_some()
    }

    /// Pre-order traversal including `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All leaf tokens below this node, error nodes contributing their
    /// skipped tokens.
    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens(&self, out: &mut Vec<Token>) {
        match self {
            SyntaxNode::Node(node) if node.is_leaf() => out.push(node.token().clone()),
            SyntaxNode::Node(node) => {
                for child in node.children() {
                    child.collect_tokens(out);
                }
            }
            SyntaxNode::Error(node) => out.extend(node.skipped().iter().cloned()),
        }
    }
}

impl TreeView for SyntaxNode {
    fn kind(&self) -> SyntaxKind {
        self.view().kind()
    }

    fn text(&self) -> &str {
        self.view().text()
    }

    fn line(&self) -> u32 {
        self.view().line()
    }

    fn column(&self) -> u32 {
        self.view().column()
    }

    fn children(&self) -> &[SyntaxNode] {
        self.view().children()
    }

    fn token_start_index(&self) -> Option<usize> {
        self.view().token_start_index()
    }

    fn token_stop_index(&self) -> Option<usize> {
        self.view().token_stop_index()
    }

    fn last_line(&self) -> u32 {
        self.view().last_line()
    }

    fn preceding_comments(&self) -> &[Token] {
        self.view().preceding_comments()
    }

    fn following_comments(&self) -> &[Token] {
        self.view().following_comments()
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn go(node: &SyntaxNode, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let indent = "  ".repeat(depth);
            match node {
                SyntaxNode::Node(n) if n.is_leaf() => {
                    writeln!(f, "{indent}{:?} {:?}", n.token().kind, n.text())
                }
                SyntaxNode::Node(n) => {
                    writeln!(f, "{indent}{:?}@{}..{}", n.kind(), n.line(), n.last_line())?;
                    for child in n.children() {
                        go(child, depth + 1, f)?;
                    }
                    Ok(())
                }
                SyntaxNode::Error(e) => writeln!(f, "{indent}Error {:?} ({})", e.text(), e.error()),
            }
        }
        go(self, 0, f)
    }
}
