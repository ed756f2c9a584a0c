/// Position-free layer of the concrete tree.
///
/// A green node only knows its kind, its children and its width in bytes.
/// A definition parsed from one revision of a grammar can therefore be
/// spliced into the tree of the next revision unchanged.
use super::token::TokenKind;
use slotmap::{SlotMap, new_key_type};
use std::collections::HashSet;

new_key_type! {
    /// Key of a node in a `GreenNodeArena`
    pub struct GreenNodeId;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreenNode {
    /// A lexed token
    Token {
        kind: TokenKind,
        width: usize,
    },

    Internal {
        kind: SyntaxKind,
        children: Vec<GreenNodeId>,
        width: usize, // sum of the children
    },
}

impl GreenNode {
    pub fn width(&self) -> usize {
        match self {
            GreenNode::Token { width, .. } => *width,
            GreenNode::Internal { width, .. } => *width,
        }
    }

    pub fn kind(&self) -> Option<SyntaxKind> {
        match self {
            GreenNode::Token { .. } => None,
            GreenNode::Internal { kind, .. } => Some(*kind),
        }
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        match self {
            GreenNode::Token { kind, .. } => Some(*kind),
            GreenNode::Internal { .. } => None,
        }
    }

    /// `None` for tokens
    pub fn children(&self) -> Option<&[GreenNodeId]> {
        match self {
            GreenNode::Token { .. } => None,
            GreenNode::Internal { children, .. } => Some(children),
        }
    }
}

/// Storage of every green node of a document, old revisions included until
/// `retain_reachable` runs
#[derive(Debug, Default, Clone)]
pub struct GreenNodeArena {
    nodes: SlotMap<GreenNodeId, GreenNode>,
}

impl GreenNodeArena {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    pub fn alloc_token(&mut self, kind: TokenKind, width: usize) -> GreenNodeId {
        self.nodes.insert(GreenNode::Token { kind, width })
    }

    /// The width is derived from the children
    pub fn alloc_internal(&mut self, kind: SyntaxKind, children: Vec<GreenNodeId>) -> GreenNodeId {
        let width = children.iter().map(|&id| self.nodes[id].width()).sum();
        self.nodes.insert(GreenNode::Internal {
            kind,
            children,
            width,
        })
    }

    pub fn get(&self, id: GreenNodeId) -> &GreenNode {
        &self.nodes[id]
    }

    pub fn contains(&self, id: GreenNodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn width(&self, id: GreenNodeId) -> usize {
        self.nodes[id].width()
    }

    pub fn kind(&self, id: GreenNodeId) -> Option<SyntaxKind> {
        self.nodes[id].kind()
    }

    pub fn token_kind(&self, id: GreenNodeId) -> Option<TokenKind> {
        self.nodes[id].token_kind()
    }

    pub fn children(&self, id: GreenNodeId) -> Option<&[GreenNodeId]> {
        self.nodes[id].children()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node not reachable from `roots`.
    /// Returns the number of removed nodes.
    pub fn retain_reachable(&mut self, roots: &[GreenNodeId]) -> usize {
        let mut reachable = HashSet::with_capacity(self.nodes.len());
        let mut stack = roots.to_vec();
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(children) = self.nodes.get(id).and_then(GreenNode::children) {
                stack.extend_from_slice(children);
            }
        }
        let before = self.nodes.len();
        self.nodes.retain(|id, _| reachable.contains(&id));
        before - self.nodes.len()
    }
}

/// Syntax kinds - types of internal CST nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Top-level
    Grammar,
    Node,

    // Leaves wrapped as nodes
    Identifier,
    Token,

    // Rules
    Sequence,
    Alternative,
    Group,
    Repetition,
    Optional,
    Label,

    // Error markers
    Error,         // Unexpected tokens, or zero-width when something is missing
    UnclosedToken, // Zero-width, a quoted token without closing quote
    UnclosedGroup, // Zero-width, a group without closing paren
}

impl SyntaxKind {
    pub fn is_error(self) -> bool {
        matches!(
            self,
            SyntaxKind::Error | SyntaxKind::UnclosedToken | SyntaxKind::UnclosedGroup
        )
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SyntaxKind::Grammar => write!(f, "Grammar"),
            SyntaxKind::Node => write!(f, "Node"),
            SyntaxKind::Identifier => write!(f, "Identifier"),
            SyntaxKind::Token => write!(f, "Token"),
            SyntaxKind::Sequence => write!(f, "Sequence"),
            SyntaxKind::Alternative => write!(f, "Alternative"),
            SyntaxKind::Group => write!(f, "Group"),
            SyntaxKind::Repetition => write!(f, "Repetition"),
            SyntaxKind::Optional => write!(f, "Optional"),
            SyntaxKind::Label => write!(f, "Label"),
            SyntaxKind::Error => write!(f, "Error"),
            SyntaxKind::UnclosedToken => write!(f, "UnclosedToken"),
            SyntaxKind::UnclosedGroup => write!(f, "UnclosedGroup"),
        }
    }
}

/// A child position of the node being built, for wrapping what follows it
#[derive(Clone, Copy, Debug)]
pub struct Marker {
    pub pos: usize,
}

/// Stack-based construction of green nodes, in parse order
pub struct GreenTreeBuilder {
    arena: GreenNodeArena,
    stack: Vec<(SyntaxKind, Vec<GreenNodeId>)>,
}

impl GreenTreeBuilder {
    pub fn new() -> Self {
        Self::with_arena(GreenNodeArena::new())
    }

    /// Continue building into an arena that already holds reusable subtrees
    pub fn with_arena(arena: GreenNodeArena) -> Self {
        Self {
            arena,
            stack: Vec::new(),
        }
    }

    pub fn arena(&self) -> &GreenNodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> GreenNodeArena {
        self.arena
    }

    pub fn marker(&self) -> Marker {
        Marker {
            pos: self.stack.last().map_or(0, |(_, children)| children.len()),
        }
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.stack.push((kind, Vec::new()));
    }

    /// Open a node adopting every child added since `marker`.
    /// This is how a sequence learns it is a sequence after its first item.
    pub fn start_node_at(&mut self, marker: Marker, kind: SyntaxKind) {
        if let Some((_, children)) = self.stack.last_mut() {
            let pos = marker.pos.min(children.len());
            let adopted = children.drain(pos..).collect();
            self.stack.push((kind, adopted));
        } else {
            self.stack.push((kind, Vec::new()));
        }
    }

    pub fn add_token(&mut self, kind: TokenKind, width: usize) {
        let token = self.arena.alloc_token(kind, width);
        self.add_node(token);
    }

    /// Splice an existing subtree as a child
    pub fn add_node(&mut self, id: GreenNodeId) {
        if let Some((_, children)) = self.stack.last_mut() {
            children.push(id);
        }
    }

    /// Close the innermost open node, attaching it to its parent
    pub fn finish_node(&mut self) -> Option<GreenNodeId> {
        let (kind, children) = self.stack.pop()?;
        let node_id = self.arena.alloc_internal(kind, children);

        if let Some((_, parent_children)) = self.stack.last_mut() {
            parent_children.push(node_id);
        }

        Some(node_id)
    }
}

impl Default for GreenTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
