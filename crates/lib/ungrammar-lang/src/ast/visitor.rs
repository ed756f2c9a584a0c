//! Visitor over the typed AST.
//!
//! Every `visit_*` method defaults to [`walk`], which visits the children of
//! the node in source order. A visitor overrides only the variants it cares
//! about, e.g. collecting the identifiers:
//!
//! ```text
//! struct Names(Vec<SyntaxNodeId>);
//!
//! impl AstVisitor for Names {
//!     fn visit_identifier(&mut self, identifier: &Identifier) {
//!         self.0.push(identifier.syntax);
//!     }
//! }
//!
//! grammar.accept(&mut names);
//! ```
use super::{
    Alternative, AstAcceptor, Grammar, Group, Identifier, Label, Node, Optional, Repetition, Rule,
    Sequence, Token,
};

pub trait AstVisitor {
    fn visit_grammar(&mut self, grammar: &Grammar) {
        walk(self, grammar);
    }

    fn visit_node(&mut self, node: &Node) {
        walk(self, node);
    }

    /// Entry point for a rule of unknown variant
    fn visit_rule(&mut self, rule: &Rule) {
        rule.as_ast().accept(self);
    }

    fn visit_sequence(&mut self, sequence: &Sequence) {
        walk(self, sequence);
    }

    fn visit_alternative(&mut self, alternative: &Alternative) {
        walk(self, alternative);
    }

    fn visit_group(&mut self, group: &Group) {
        walk(self, group);
    }

    fn visit_repetition(&mut self, repetition: &Repetition) {
        walk(self, repetition);
    }

    fn visit_optional(&mut self, optional: &Optional) {
        walk(self, optional);
    }

    fn visit_label(&mut self, label: &Label) {
        walk(self, label);
    }

    fn visit_identifier(&mut self, identifier: &Identifier) {
        walk(self, identifier);
    }

    fn visit_token(&mut self, token: &Token) {
        walk(self, token);
    }
}

/// Visit every child of `node` in order
pub fn walk<V, A>(visitor: &mut V, node: &A)
where
    V: AstVisitor + ?Sized,
    A: AstAcceptor + ?Sized,
{
    for child in node.children() {
        child.accept(visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{SyntaxNodeId, parse_to_cst};

    #[derive(Default)]
    struct Collect {
        identifiers: Vec<SyntaxNodeId>,
        tokens: usize,
        labels: usize,
    }

    impl AstVisitor for Collect {
        fn visit_identifier(&mut self, identifier: &Identifier) {
            self.identifiers.push(identifier.syntax);
        }

        fn visit_token(&mut self, _token: &Token) {
            self.tokens += 1;
        }

        fn visit_label(&mut self, label: &Label) {
            self.labels += 1;
            walk(self, label);
        }
    }

    #[test]
    fn test_default_visits_recurse() {
        let source = "Foo = A (b:'x' | C)*\nBar = 'y'?";
        let (tree, _) = parse_to_cst(source);
        let grammar = Grammar::build(&tree, tree.root(), &mut Vec::new());

        let mut collect = Collect::default();
        grammar.accept(&mut collect);

        let names = collect
            .identifiers
            .iter()
            .map(|&id| tree.text(id, source))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Foo", "A", "b", "C", "Bar"]);
        assert_eq!(collect.tokens, 2);
        assert_eq!(collect.labels, 1);
    }

    #[test]
    fn test_visit_rule_dispatches_on_variant() {
        let source = "Foo = 'x'";
        let (tree, _) = parse_to_cst(source);
        let grammar = Grammar::build(&tree, tree.root(), &mut Vec::new());

        let mut collect = Collect::default();
        if let Some(rule) = &grammar.nodes[0].rule {
            collect.visit_rule(rule);
        }
        assert_eq!(collect.tokens, 1);
        assert!(collect.identifiers.is_empty());
    }
}
