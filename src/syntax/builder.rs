//! Node construction: the [`TreeAdaptor`] factory and the stack-based
//! [`TreeBuilder`] the parser drives.

use super::token::Token;
use super::tree::{ErrorNode, SyntaxError, SyntaxKind, SyntaxNode, TreeNode, TreeView};

/// Factory for tree nodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeAdaptor;

impl TreeAdaptor {
    /// A composite node anchored on `anchor`, without children.
    pub fn create(&self, kind: SyntaxKind, anchor: Token) -> TreeNode {
        TreeNode::new(kind, anchor)
    }

    pub fn create_leaf(&self, token: Token) -> SyntaxNode {
        SyntaxNode::Node(TreeNode::leaf(token))
    }

    /// An error node covering `tokens`, which must be non-empty.
    ///
    /// `source` is the full input; the node keeps the slice from the first
    /// token's start to the last token's end as its text.
    pub fn error_node(
        &self,
        source: &str,
        tokens: Vec<Token>,
        error: SyntaxError,
    ) -> Option<SyntaxNode> {
        let start = tokens.first()?.clone();
        let stop = tokens.last()?.clone();
        let from = usize::from(start.range.start());
        let to = usize::from(stop.range.end());
        let text = source.get(from..to).unwrap_or_default().to_string();
        Some(SyntaxNode::Error(ErrorNode::new(
            start, stop, text, tokens, error,
        )))
    }

    /// Copy a node's payload: kind and anchor token, or the whole error node.
    /// Children and comments are not copied.
    pub fn dup_node(&self, node: &SyntaxNode) -> SyntaxNode {
        match node {
            SyntaxNode::Node(n) if n.is_leaf() => self.create_leaf(n.token().clone()),
            SyntaxNode::Node(n) => SyntaxNode::Node(self.create(n.kind(), n.token().clone())),
            SyntaxNode::Error(e) => SyntaxNode::Error(ErrorNode::new(
                e.start_token().clone(),
                e.stop_token().clone(),
                e.text().to_string(),
                e.skipped().to_vec(),
                e.error().clone(),
            )),
        }
    }
}

/// A position in the builder that a later node can be started at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    depth: usize,
    children: usize,
}

/// Builds a tree top-down from start/token/finish events.
///
/// `start_node_at` wraps children added since a checkpoint, which is how
/// left-recursive constructs such as binary expressions are built.
pub struct TreeBuilder {
    adaptor: TreeAdaptor,
    root: TreeNode,
    open: Vec<TreeNode>,
}

impl TreeBuilder {
    pub fn new(root: SyntaxKind, anchor: Token) -> Self {
        let adaptor = TreeAdaptor;
        Self {
            root: adaptor.create(root, anchor),
            adaptor,
            open: Vec::new(),
        }
    }

    pub fn adaptor(&self) -> TreeAdaptor {
        self.adaptor
    }

    fn top(&mut self) -> &mut TreeNode {
        self.open.last_mut().unwrap_or(&mut self.root)
    }

    pub fn start_node(&mut self, kind: SyntaxKind, anchor: Token) {
        self.open.push(self.adaptor.create(kind, anchor));
    }

    pub fn token(&mut self, token: Token) {
        let leaf = self.adaptor.create_leaf(token);
        self.push_child(leaf);
    }

    pub fn push_child(&mut self, child: SyntaxNode) {
        self.top().add_child(child);
    }

    pub fn finish_node(&mut self) {
        if let Some(node) = self.open.pop() {
            self.push_child(SyntaxNode::Node(node));
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        let top = self.open.last().unwrap_or(&self.root);
        Checkpoint {
            depth: self.open.len(),
            children: top.children().len(),
        }
    }

    /// Start a node whose first children are those added since `cp`.
    pub fn start_node_at(&mut self, cp: Checkpoint, kind: SyntaxKind, anchor: Token) {
        self.close_to(cp.depth);
        let top = self.top();
        let moved = top.take_children_from(cp.children.min(top.children().len()));
        let anchor = moved
            .first()
            .and_then(|c| c.tokens().into_iter().next())
            .unwrap_or(anchor);
        let mut node = self.adaptor.create(kind, anchor);
        for child in moved {
            node.add_child(child);
        }
        self.open.push(node);
    }

    /// Discard everything built since `cp`, returning the tokens it covered.
    /// Nodes left open above the checkpoint are closed first.
    pub fn abandon(&mut self, cp: Checkpoint) -> Vec<Token> {
        self.close_to(cp.depth);
        let top = self.top();
        let at = cp.children.min(top.children().len());
        top.take_children_from(at)
            .iter()
            .flat_map(SyntaxNode::tokens)
            .collect()
    }

    fn close_to(&mut self, depth: usize) {
        while self.open.len() > depth {
            self.finish_node();
        }
    }

    /// Close every open node and return the root.
    pub fn finish(mut self) -> SyntaxNode {
        self.close_to(0);
        SyntaxNode::Node(self.root)
    }
}
