/// Red Tree - positioned view over a Green Tree
/// Based on the Red-Green Syntax Tree pattern
///
/// The green tree only knows widths. The red tree resolves every element
/// to an absolute byte range once and keeps parent links, so that lookups
/// by position and bottom-up walks are cheap. Elements live in a flat table
/// indexed by `SyntaxNodeId`, in pre-order.
use super::green::{GreenNodeArena, GreenNodeId, SyntaxKind};
use super::token::TokenKind;
use std::fmt::Write;
use std::ops::Range;

/// Index of an element in a `SyntaxTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntaxNodeId(pub usize);

/// Either an internal node or a token, with its absolute range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxElement {
    pub green: GreenNodeId,
    pub kind: Option<SyntaxKind>,
    pub token_kind: Option<TokenKind>,
    pub range: Range<usize>,
    pub parent: Option<SyntaxNodeId>,
    pub index_in_parent: usize,
    pub children: Vec<SyntaxNodeId>,
}

impl SyntaxElement {
    pub fn is_token(&self) -> bool {
        self.token_kind.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    elements: Vec<SyntaxElement>,
}

impl SyntaxTree {
    /// Lay out the green tree rooted at `root` starting from offset 0
    pub fn new(arena: &GreenNodeArena, root: GreenNodeId) -> Self {
        let mut tree = Self {
            elements: Vec::with_capacity(arena.len()),
        };
        tree.push(arena, root, 0, None, 0);
        tree
    }

    fn push(
        &mut self,
        arena: &GreenNodeArena,
        green: GreenNodeId,
        offset: usize,
        parent: Option<SyntaxNodeId>,
        index_in_parent: usize,
    ) -> SyntaxNodeId {
        let id = SyntaxNodeId(self.elements.len());
        self.elements.push(SyntaxElement {
            green,
            kind: arena.kind(green),
            token_kind: arena.token_kind(green),
            range: offset..offset + arena.width(green),
            parent,
            index_in_parent,
            children: Vec::new(),
        });
        if let Some(children) = arena.children(green) {
            let mut child_offset = offset;
            let mut ids = Vec::with_capacity(children.len());
            for (index, &child) in children.iter().enumerate() {
                ids.push(self.push(arena, child, child_offset, Some(id), index));
                child_offset += arena.width(child);
            }
            self.elements[id.0].children = ids;
        }
        id
    }

    pub fn root(&self) -> SyntaxNodeId {
        SyntaxNodeId(0)
    }

    pub fn get(&self, id: SyntaxNodeId) -> &SyntaxElement {
        &self.elements[id.0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn kind(&self, id: SyntaxNodeId) -> Option<SyntaxKind> {
        self.get(id).kind
    }

    pub fn token_kind(&self, id: SyntaxNodeId) -> Option<TokenKind> {
        self.get(id).token_kind
    }

    pub fn range(&self, id: SyntaxNodeId) -> Range<usize> {
        self.get(id).range.clone()
    }

    pub fn parent(&self, id: SyntaxNodeId) -> Option<SyntaxNodeId> {
        self.get(id).parent
    }

    pub fn children(&self, id: SyntaxNodeId) -> &[SyntaxNodeId] {
        &self.get(id).children
    }

    pub fn prev_sibling(&self, id: SyntaxNodeId) -> Option<SyntaxNodeId> {
        let element = self.get(id);
        let index = element.index_in_parent.checked_sub(1)?;
        self.children(element.parent?).get(index).copied()
    }

    pub fn next_sibling(&self, id: SyntaxNodeId) -> Option<SyntaxNodeId> {
        let element = self.get(id);
        self.children(element.parent?)
            .get(element.index_in_parent + 1)
            .copied()
    }

    /// Source text covered by an element
    pub fn text<'a>(&self, id: SyntaxNodeId, source: &'a str) -> &'a str {
        source.get(self.get(id).range.clone()).unwrap_or("")
    }

    /// Parent chain, nearest first, `id` excluded
    pub fn ancestors(&self, id: SyntaxNodeId) -> impl Iterator<Item = SyntaxNodeId> + '_ {
        std::iter::successors(self.parent(id), |&p| self.parent(p))
    }

    /// `id` and everything below it in pre-order
    pub fn descendants(&self, id: SyntaxNodeId) -> impl Iterator<Item = SyntaxNodeId> + '_ {
        // pre-order layout keeps a subtree contiguous
        let end = self.subtree_end(id);
        (id.0..end).map(SyntaxNodeId)
    }

    fn subtree_end(&self, id: SyntaxNodeId) -> usize {
        let mut current = id;
        while let Some(&last) = self.children(current).last() {
            current = last;
        }
        current.0 + 1
    }

    /// Innermost element containing `offset`.
    /// An element starting exactly at `offset` wins over one ending there.
    /// Offsets at or past the end resolve to the root.
    pub fn resolve(&self, offset: usize) -> SyntaxNodeId {
        let mut current = self.root();
        'descend: loop {
            for &child in self.children(current) {
                let range = &self.get(child).range;
                if range.start <= offset && offset < range.end {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Indented textual dump, one element per line
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        self.dump_into(self.root(), source, 0, &mut out);
        out
    }

    fn dump_into(&self, id: SyntaxNodeId, source: &str, depth: usize, out: &mut String) {
        let element = self.get(id);
        let indent = "  ".repeat(depth);
        let range = &element.range;
        let _ = match (element.kind, element.token_kind) {
            (Some(kind), _) => writeln!(out, "{indent}{kind}@{}..{}", range.start, range.end),
            (None, Some(token)) => writeln!(
                out,
                "{indent}{token:?}@{}..{} {:?}",
                range.start,
                range.end,
                self.text(id, source)
            ),
            (None, None) => Ok(()),
        };
        for &child in self.children(id) {
            self.dump_into(child, source, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_to_cst;

    #[test]
    fn test_ranges_and_parents() {
        let source = "Foo = 'Bar'";
        let (tree, _) = parse_to_cst(source);
        let root = tree.root();
        assert_eq!(tree.range(root), 0..source.len());

        let node = tree.children(root)[0];
        assert_eq!(tree.kind(node), Some(SyntaxKind::Node));
        let token = tree
            .children(node)
            .iter()
            .copied()
            .find(|&c| tree.kind(c) == Some(SyntaxKind::Token));
        let Some(token) = token else {
            panic!("no token node");
        };
        assert_eq!(tree.text(token, source), "'Bar'");
        assert_eq!(tree.ancestors(token).collect::<Vec<_>>(), vec![node, root]);

        let before = tree.prev_sibling(token).map(|t| tree.token_kind(t));
        assert_eq!(before, Some(Some(TokenKind::Whitespace)));
        assert_eq!(tree.next_sibling(token), None);
        assert_eq!(tree.prev_sibling(node), None);
    }

    #[test]
    fn test_resolve() {
        let source = "Foo = Bar // c";
        let (tree, _) = parse_to_cst(source);

        let at_start = tree.resolve(0);
        assert_eq!(tree.token_kind(at_start), Some(TokenKind::Ident));
        assert_eq!(tree.kind(tree.parent(at_start).unwrap()), Some(SyntaxKind::Identifier));

        // boundary between `Bar` and the space resolves to the space
        let after_bar = tree.resolve(9);
        assert_eq!(tree.token_kind(after_bar), Some(TokenKind::Whitespace));

        let in_comment = tree.resolve(11);
        assert_eq!(tree.token_kind(in_comment), Some(TokenKind::SingleLineComment));

        assert_eq!(tree.resolve(source.len()), tree.root());
    }

    #[test]
    fn test_descendants_are_contiguous() {
        let (tree, _) = parse_to_cst("A = (x | y)\nB = z");
        let first = tree.children(tree.root())[0];
        let inside = tree.descendants(first).collect::<Vec<_>>();
        assert!(inside.iter().all(|&d| d == first || tree.ancestors(d).any(|a| a == first)));
        assert!(tree.range(first).end <= 11);
    }

    #[test]
    fn test_dump() {
        let (tree, _) = parse_to_cst("A=x");
        assert_eq!(
            tree.dump("A=x"),
            "Grammar@0..3\n  Node@0..3\n    Identifier@0..1\n      Ident@0..1 \"A\"\n    Assign@1..2 \"=\"\n    Identifier@2..3\n      Ident@2..3 \"x\"\n"
        );
    }
}
