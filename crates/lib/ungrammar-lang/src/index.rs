//! Definition and identifier indices over the typed AST.
use crate::ast::visitor::AstVisitor;
use crate::ast::{AstAcceptor, Grammar, Identifier, Label, Node};
use crate::parser::{SyntaxNodeId, SyntaxTree};
use std::collections::HashMap;

/// Names mapped to their occurrences, iterated in order of first insertion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    order: Vec<String>,
    entries: HashMap<String, Vec<SyntaxNodeId>>,
}

/// Rule name to the identifiers declaring it
pub type DefinitionMap = NameMap;
/// Rule name to the identifiers referring to it
pub type IdentifierMap = NameMap;

impl NameMap {
    pub fn insert(&mut self, name: &str, id: SyntaxNodeId) {
        match self.entries.get_mut(name) {
            Some(ids) => ids.push(id),
            None => {
                self.order.push(name.to_string());
                self.entries.insert(name.to_string(), vec![id]);
            }
        }
    }

    /// Occurrences of `name`, empty when it was never inserted
    pub fn get(&self, name: &str) -> &[SyntaxNodeId] {
        self.entries.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SyntaxNodeId])> {
        self.names().map(|name| (name, self.get(name)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

struct IndexCollector<'a> {
    tree: &'a SyntaxTree,
    source: &'a str,
    definitions: DefinitionMap,
    identifiers: IdentifierMap,
}

impl<'a> IndexCollector<'a> {
    fn name_of(&self, identifier: &Identifier) -> Option<&'a str> {
        Some(identifier.name(self.tree, self.source)).filter(|name| !name.is_empty())
    }
}

impl AstVisitor for IndexCollector<'_> {
    fn visit_node(&mut self, node: &Node) {
        if let Some(name) = &node.name
            && let Some(text) = self.name_of(name)
        {
            self.definitions.insert(text, name.syntax);
        }
        if let Some(rule) = &node.rule {
            self.visit_rule(rule);
        }
    }

    fn visit_label(&mut self, label: &Label) {
        // the label name is neither a definition nor a reference
        if let Some(rule) = &label.rule {
            self.visit_rule(rule);
        }
    }

    fn visit_identifier(&mut self, identifier: &Identifier) {
        if let Some(name) = self.name_of(identifier) {
            self.identifiers.insert(name, identifier.syntax);
        }
    }
}

/// Collect definition names and references of a grammar
pub fn build_indices(tree: &SyntaxTree, source: &str, grammar: &Grammar) -> (DefinitionMap, IdentifierMap) {
    let mut collector = IndexCollector {
        tree,
        source,
        definitions: DefinitionMap::default(),
        identifiers: IdentifierMap::default(),
    };
    grammar.accept(&mut collector);
    (collector.definitions, collector.identifiers)
}
