//! Attaching hidden-channel comments to declaration nodes.
//!
//! A comment between two significant tokens `p` and `n` belongs to:
//! - the declaration ending at `p` as a *following* comment, when it starts on
//!   `p`'s line;
//! - the declaration starting at `n` as a *preceding* comment otherwise.

use rustc_hash::FxHashSet;

use super::token::Token;
use super::tree::{SyntaxNode, TreeView};

struct Layout<'a> {
    tokens: &'a [Token],
    /// Stream indices of significant tokens, ascending.
    significant: Vec<usize>,
    /// Comments in stream order.
    comments: Vec<&'a Token>,
    /// Stop indices of declaration nodes.
    declaration_stops: FxHashSet<usize>,
}

impl Layout<'_> {
    fn previous_significant(&self, index: usize) -> Option<usize> {
        let pos = self.significant.partition_point(|&i| i < index);
        pos.checked_sub(1).map(|p| self.significant[p])
    }

    fn next_significant(&self, index: usize) -> Option<usize> {
        let pos = self.significant.partition_point(|&i| i <= index);
        self.significant.get(pos).copied()
    }

    /// Comments with stream index strictly between `after` and `before`.
    fn comments_between(&self, after: Option<usize>, before: usize) -> &[&Token] {
        let lo = match after {
            Some(after) => self.comments.partition_point(|t| t.index <= after),
            None => 0,
        };
        let hi = self.comments.partition_point(|t| t.index < before);
        &self.comments[lo..hi.max(lo)]
    }

    fn preceding(&self, start: usize) -> Vec<Token> {
        let previous = self.previous_significant(start);
        let previous_line = previous
            .filter(|p| self.declaration_stops.contains(p))
            .map(|p| self.tokens[p].line);
        self.comments_between(previous, start)
            .iter()
            .filter(|t| Some(t.line) != previous_line)
            .map(|t| (*t).clone())
            .collect()
    }

    fn following(&self, stop: usize) -> Vec<Token> {
        let stop_line = self.tokens[stop].line;
        let next = self.next_significant(stop).unwrap_or(self.tokens.len());
        self.comments_between(Some(stop), next)
            .iter()
            .filter(|t| t.line == stop_line)
            .map(|t| (*t).clone())
            .collect()
    }
}

/// Attach the comment tokens of `hidden` to the declaration nodes of `root`.
///
/// `tokens` is the full token stream the tree was parsed from. Hidden tokens
/// that are not comments are ignored.
pub fn attach_comments(root: &mut SyntaxNode, tokens: &[Token], hidden: &[Token]) {
    let mut comments: Vec<&Token> = hidden.iter().filter(|t| t.kind.is_comment()).collect();
    comments.sort_by_key(|t| t.index);

    let mut declaration_stops = FxHashSet::default();
    for node in root.descendants().filter(|n| n.kind().is_declaration()) {
        declaration_stops.extend(node.token_stop_index());
    }

    let layout = Layout {
        tokens,
        significant: tokens
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.index)
            .collect(),
        comments,
        declaration_stops,
    };
    attach(root, &layout);
}

fn attach(node: &mut SyntaxNode, layout: &Layout<'_>) {
    if node.kind().is_declaration() {
        if let (Some(start), Some(stop)) = (node.token_start_index(), node.token_stop_index()) {
            if stop < layout.tokens.len() {
                let preceding = layout.preceding(start);
                let following = layout.following(stop);
                node.add_preceding(preceding);
                node.add_following(following);
            }
        }
    }
    for child in node.children_mut() {
        attach(child, layout);
    }
}
