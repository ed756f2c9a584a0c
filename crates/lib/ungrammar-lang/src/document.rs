//! The analysed state of one ungrammar buffer.
use crate::ast::Grammar;
use crate::index::{DefinitionMap, IdentifierMap, build_indices};
use crate::parser::fragment::apply_changes;
use crate::parser::{
    ChangedRange, Fragment, GreenNodeArena, GreenNodeId, ParsedCst, SyntaxKind, SyntaxNodeId,
    SyntaxTree, TokenKind, parse_to_cst, reparse_to_cst,
};
use crate::text_document::{Location, Range, TextDocument};
use itertools::Itertools;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct UngramDocument {
    text: String,
    arena: GreenNodeArena,
    root: GreenNodeId,
    tree: SyntaxTree,
    fragments: Vec<Fragment>,
    grammar: Grammar,
    unknowns: Vec<SyntaxNodeId>,
    definitions: DefinitionMap,
    identifiers: IdentifierMap,
}

/// Unknowns that are expected punctuation or benign trivia
fn is_benign(tree: &SyntaxTree, id: SyntaxNodeId) -> bool {
    tree.token_kind(id).is_some_and(TokenKind::is_structural)
}

impl UngramDocument {
    /// Analyse `text` from scratch
    pub fn parse(text: &str) -> Self {
        let (tree, parsed) = parse_to_cst(text);
        Self::analyse(text, tree, parsed)
    }

    /// Re-analyse after the buffer changed to `text`, reusing unchanged definitions
    pub fn reparse(&mut self, text: &str) {
        let start = Instant::now();
        let changes = ChangedRange::between(&self.text, text)
            .into_iter()
            .collect::<Vec<_>>();
        let reusable = apply_changes(&self.fragments, &changes);
        let reusable_count = reusable.len();

        let arena = std::mem::take(&mut self.arena);
        let (tree, parsed) = reparse_to_cst(text, arena, reusable);
        *self = Self::analyse(text, tree, parsed);
        let collected = self.arena.retain_reachable(&[self.root]);

        log::debug!(
            "reparsed {} bytes in {:?}: {reusable_count} reusable definitions, {collected} green nodes collected",
            text.len(),
            start.elapsed()
        );
    }

    fn analyse(text: &str, tree: SyntaxTree, parsed: ParsedCst) -> Self {
        let mut unknowns = Vec::new();
        let grammar = Grammar::build(&tree, tree.root(), &mut unknowns);
        unknowns.retain(|&id| !is_benign(&tree, id));
        let (definitions, identifiers) = build_indices(&tree, text, &grammar);
        Self {
            text: text.to_string(),
            arena: parsed.arena,
            root: parsed.root,
            tree,
            fragments: parsed.fragments,
            grammar,
            unknowns,
            definitions,
            identifiers,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn arena(&self) -> &GreenNodeArena {
        &self.arena
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn unknowns(&self) -> &[SyntaxNodeId] {
        &self.unknowns
    }

    pub fn definitions(&self) -> &DefinitionMap {
        &self.definitions
    }

    pub fn identifiers(&self) -> &IdentifierMap {
        &self.identifiers
    }

    /// Innermost element at `offset`, see [`SyntaxTree::resolve`]
    pub fn node_at(&self, offset: usize) -> SyntaxNodeId {
        self.tree.resolve(offset)
    }

    /// Whether the element at `offset` is, or lies inside, a node of `kind`
    pub fn is_in(&self, kind: SyntaxKind, offset: usize) -> bool {
        let node = self.node_at(offset);
        self.tree.kind(node) == Some(kind)
            || self
                .tree
                .ancestors(node)
                .any(|a| self.tree.kind(a) == Some(kind))
    }

    pub fn is_in_comment(&self, offset: usize) -> bool {
        self.tree.token_kind(self.node_at(offset)) == Some(TokenKind::SingleLineComment)
    }

    pub fn is_in_token(&self, offset: usize) -> bool {
        self.is_in(SyntaxKind::Token, offset)
    }

    pub fn is_in_identifier(&self, offset: usize) -> bool {
        self.is_in(SyntaxKind::Identifier, offset)
    }

    /// The `Identifier` node at `offset`, if any
    pub fn identifier_at(&self, offset: usize) -> Option<SyntaxNodeId> {
        let node = self.node_at(offset);
        std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .find(|&n| self.tree.kind(n) == Some(SyntaxKind::Identifier))
            .filter(|&n| !self.tree.range(n).is_empty())
    }

    /// Name of the identifier at `offset`, if any
    pub fn identifier_name_at(&self, offset: usize) -> Option<&str> {
        self.identifier_at(offset).map(|id| self.node_text(id))
    }

    pub fn node_text(&self, id: SyntaxNodeId) -> &str {
        self.tree.text(id, &self.text)
    }

    pub fn node_range(&self, id: SyntaxNodeId, document: &TextDocument) -> Range {
        document.range_of(self.tree.range(id))
    }

    /// Text of the definition a declaring identifier belongs to
    pub fn definition_text(&self, declaration: SyntaxNodeId) -> Option<&str> {
        self.tree
            .parent(declaration)
            .filter(|&p| self.tree.kind(p) == Some(SyntaxKind::Node))
            .map(|p| self.node_text(p))
    }

    fn locations(&self, ids: &[SyntaxNodeId], document: &TextDocument) -> Vec<Location> {
        ids.iter()
            .map(|&id| Location {
                uri: document.uri.clone(),
                range: self.node_range(id, document),
            })
            .collect()
    }

    pub fn definition_locations(&self, name: &str, document: &TextDocument) -> Vec<Location> {
        self.locations(self.definitions.get(name), document)
    }

    pub fn identifier_locations(&self, name: &str, document: &TextDocument) -> Vec<Location> {
        self.locations(self.identifiers.get(name), document)
    }

    /// Declarations of `name` followed by its uses
    pub fn references(&self, name: &str, document: &TextDocument) -> Vec<Location> {
        let mut locations = self.definition_locations(name, document);
        locations.extend(self.identifier_locations(name, document));
        locations
    }

    /// Hover markdown for every declaration of `name`
    pub fn definitions_markdown(&self, name: &str) -> Option<String> {
        let markdown = self
            .definitions
            .get(name)
            .iter()
            .filter_map(|&id| self.definition_text(id))
            .map(|text| format!("```ungrammar\n{text}\n```"))
            .join("\n");
        (!markdown.is_empty()).then_some(markdown)
    }
}
