use super::kind::NodeKind;
use crate::lexer::LexError;
use crate::span::Span;
use crate::token::Token;
use std::fmt;
use std::ops::Range;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A syntax node stored in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// Kind tag.
    pub kind: NodeKind,
    /// Byte range from the first to the last code token.
    pub span: Span,
    /// Ordered children.
    pub children: Vec<NodeId>,
    /// Enclosing node. A lookup, not an owner.
    pub parent: Option<NodeId>,
    /// Range into the tree's token list.
    pub tokens: Range<usize>,
}

/// Token ranges of `node` that none of its children cover, in order.
///
/// Children cover their own ranges, so walking the gaps of every node
/// visits each token once.
pub(crate) fn uncovered(nodes: &[Node], node: &Node) -> Vec<Range<usize>> {
    let end = node.tokens.end;
    let mut gaps = Vec::with_capacity(node.children.len() + 1);
    let mut next = node.tokens.start;
    for child in &node.children {
        let covered = &nodes[child.0].tokens;
        if covered.start > next {
            gaps.push(next..covered.start.min(end));
        }
        next = next.max(covered.end);
    }
    if next < end {
        gaps.push(next..end);
    }
    gaps
}

/// An unexpected token and the recovery it caused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    /// Location of the unexpected input.
    pub span: Span,
    /// What the parser expected.
    pub message: String,
}

/// Concrete syntax tree for one buffer.
///
/// The tree owns every node and token. Nodes never outlive the tree; a
/// rewritten buffer gets a fresh tree.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) tokens: Vec<Token>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) owners: Vec<NodeId>,
    pub(crate) root: NodeId,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) lex_errors: Vec<LexError>,
}

impl SyntaxTree {
    /// Lexes and parses `source`. Never fails: problems are recorded in
    /// [`Self::errors`] and [`Self::lex_errors`].
    #[must_use]
    pub fn parse(source: &str) -> Self {
        super::parser::parse(source)
    }

    /// The `SourceFile` node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root)
    }

    /// View of the node with the given id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All tokens, trivia included.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Parser recoveries.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Lexer problems.
    #[must_use]
    pub fn lex_errors(&self) -> &[LexError] {
        &self.lex_errors
    }

    /// Deepest node whose token range covers the token at `index`.
    #[must_use]
    pub fn owner(&self, index: usize) -> NodeRef<'_> {
        let id = self.owners.get(index).copied().unwrap_or(self.root);
        self.node(id)
    }

    /// Index of the nearest code token before `index`.
    #[must_use]
    pub fn prev_code_token(&self, index: usize) -> Option<usize> {
        (0..index.min(self.tokens.len()))
            .rev()
            .find(|&i| !self.tokens[i].is_trivia())
    }

    /// Index of the nearest code token after `index`.
    #[must_use]
    pub fn next_code_token(&self, index: usize) -> Option<usize> {
        (index + 1..self.tokens.len()).find(|&i| !self.tokens[i].is_trivia())
    }

    /// Index of the token starting exactly at byte `offset`.
    #[must_use]
    pub fn token_at_offset(&self, offset: usize) -> Option<usize> {
        self.tokens
            .binary_search_by(|t| t.span.start.cmp(&offset))
            .ok()
    }

    /// Indented outline of the tree, one node per line.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut lines = Vec::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id.0];
            lines.push(format!(
                "{}{:?} {}..{}",
                "  ".repeat(depth),
                node.kind,
                node.span.start,
                node.span.end
            ));
            for child in node.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        lines.join("\n")
    }
}

/// Borrowed, copyable view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}..{}", self.kind(), self.span().start, self.span().end)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> NodeRef<'a> {
    fn raw(self) -> &'a Node {
        &self.tree.nodes[self.id.0]
    }

    /// Arena id.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Owning tree.
    #[must_use]
    pub fn tree(self) -> &'a SyntaxTree {
        self.tree
    }

    /// Kind tag.
    #[must_use]
    pub fn kind(self) -> NodeKind {
        self.raw().kind
    }

    /// Byte span.
    #[must_use]
    pub fn span(self) -> Span {
        self.raw().span
    }

    /// Range into [`SyntaxTree::tokens`].
    #[must_use]
    pub fn token_range(self) -> Range<usize> {
        self.raw().tokens.clone()
    }

    /// Enclosing node.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'a>> {
        self.raw().parent.map(|id| self.tree.node(id))
    }

    /// Enclosing nodes from the parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Ordered children.
    pub fn children(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + ExactSizeIterator {
        let tree = self.tree;
        self.raw().children.iter().map(move |id| tree.node(*id))
    }

    /// Child at position `index`.
    #[must_use]
    pub fn child(self, index: usize) -> Option<NodeRef<'a>> {
        self.raw().children.get(index).map(|id| self.tree.node(*id))
    }

    /// First child of the given kind.
    #[must_use]
    pub fn find_child(self, kind: NodeKind) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// Position among the parent's children.
    #[must_use]
    pub fn index_in_parent(self) -> Option<usize> {
        self.parent()
            .and_then(|p| p.raw().children.iter().position(|id| *id == self.id))
    }

    /// Sibling before this node.
    #[must_use]
    pub fn prev_sibling(self) -> Option<NodeRef<'a>> {
        let index = self.index_in_parent()?;
        index.checked_sub(1).and_then(|i| self.parent()?.child(i))
    }

    /// Sibling after this node.
    #[must_use]
    pub fn next_sibling(self) -> Option<NodeRef<'a>> {
        let index = self.index_in_parent()?;
        self.parent()?.child(index + 1)
    }

    /// All nodes below this one in pre-order, excluding this node.
    pub fn descendants(self) -> impl Iterator<Item = NodeRef<'a>> {
        let tree = self.tree;
        let mut stack: Vec<NodeId> = self.raw().children.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(tree.nodes[id.0].children.iter().rev().copied());
            Some(tree.node(id))
        })
    }

    /// Tokens covered by this node, trivia between code tokens included.
    #[must_use]
    pub fn tokens(self) -> &'a [Token] {
        &self.tree.tokens[self.raw().tokens.clone()]
    }

    /// Code tokens covered by this node, with their indices.
    pub fn code_tokens(self) -> impl Iterator<Item = (usize, &'a Token)> {
        let tokens = &self.tree.tokens;
        self.raw()
            .tokens
            .clone()
            .map(move |i| (i, &tokens[i]))
            .filter(|(_, t)| !t.is_trivia())
    }

    /// Code tokens of this node that no child covers.
    pub fn direct_tokens(self) -> impl Iterator<Item = (usize, &'a Token)> {
        let tokens = &self.tree.tokens;
        uncovered(&self.tree.nodes, self.raw())
            .into_iter()
            .flatten()
            .map(move |i| (i, &tokens[i]))
            .filter(|(_, t)| !t.is_trivia())
    }

    /// First code token.
    #[must_use]
    pub fn first_token(self) -> Option<(usize, &'a Token)> {
        self.code_tokens().next()
    }

    /// Last code token.
    #[must_use]
    pub fn last_token(self) -> Option<(usize, &'a Token)> {
        let range = self.raw().tokens.clone();
        range
            .rev()
            .map(|i| (i, &self.tree.tokens[i]))
            .find(|(_, t)| !t.is_trivia())
    }

    /// Source text covered by the node.
    #[must_use]
    pub fn text(self) -> String {
        self.tokens().iter().map(|t| t.text.as_str()).collect()
    }

    /// Returns true if any direct token is the keyword `kw`.
    #[must_use]
    pub fn has_keyword(self, kw: &str) -> bool {
        self.direct_tokens().any(|(_, t)| t.is_keyword(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation() {
        let tree = SyntaxTree::parse("let a = 1\nlet b = f(a)\n");
        let root = tree.root();
        assert_eq!(root.kind(), NodeKind::SourceFile);
        assert_eq!(root.children().len(), 2);

        let second = root.child(1).unwrap();
        assert_eq!(second.prev_sibling(), root.child(0));
        assert_eq!(second.next_sibling(), None);
        assert_eq!(second.parent(), Some(root));

        let call = second
            .descendants()
            .find(|n| n.kind() == NodeKind::CallExpr)
            .unwrap();
        assert_eq!(call.text(), "f(a)");
        assert_eq!(call.ancestors().last(), Some(root));
    }

    #[test]
    fn direct_tokens_skip_children() {
        let tree = SyntaxTree::parse("if a { b }");
        let stmt = tree.root().child(0).unwrap();
        let direct: Vec<_> = stmt.direct_tokens().map(|(_, t)| t.text.as_str()).collect();
        assert_eq!(direct, vec!["if"]);
    }

    #[test]
    fn trivia_is_owned_by_deepest_cover() {
        let tree = SyntaxTree::parse("f(a,  b)");
        let ws = tree
            .tokens()
            .iter()
            .position(|t| t.text == "  ")
            .unwrap();
        assert_eq!(tree.owner(ws).kind(), NodeKind::ArgumentList);
    }

    #[test]
    fn member_chain_links_own_only_their_suffix() {
        let tree = SyntaxTree::parse("a.b.c.d");
        let chain: Vec<_> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::MemberAccessExpr)
            .collect();
        assert_eq!(chain.len(), 3);
        for (link, name) in chain.iter().zip(["d", "c", "b"]) {
            let direct: Vec<_> = link.direct_tokens().map(|(_, t)| t.text.as_str()).collect();
            assert_eq!(direct, vec![".", name]);
        }

        let last = tree.tokens().len() - 1;
        assert_eq!(tree.owner(last).id(), chain[0].id());
        assert_eq!(tree.owner(1).id(), chain[2].id());
        assert_eq!(tree.owner(0).kind(), NodeKind::IdentifierExpr);
    }
}
