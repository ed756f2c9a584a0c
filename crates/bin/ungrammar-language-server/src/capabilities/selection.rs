use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::ast::visitor::{AstVisitor, walk};
use ungrammar_lang::ast::{Alternative, AstAcceptor, Group, Identifier, Node, Sequence, Token};
use ungrammar_lang::text_document::TextDocument;

use crate::convert::to_lsp_range;

struct SelectionRangeVisitor<'a> {
    document: &'a TextDocument,
    ungram: &'a UngramDocument,
    parent: Option<Range>,
    selections: Vec<SelectionRange>,
}

impl SelectionRangeVisitor<'_> {
    fn select<A: AstAcceptor>(&mut self, acceptor: &A) {
        let range = to_lsp_range(self.ungram.node_range(acceptor.syntax(), self.document));
        let parent = self.parent.replace(range);
        walk(self, acceptor);
        self.parent = parent;
        self.selections.push(SelectionRange {
            range,
            parent: parent.map(|range| Box::new(SelectionRange { range, parent: None })),
        });
    }
}

impl AstVisitor for SelectionRangeVisitor<'_> {
    fn visit_node(&mut self, node: &Node) {
        self.select(node);
    }

    fn visit_sequence(&mut self, sequence: &Sequence) {
        self.select(sequence);
    }

    fn visit_alternative(&mut self, alternative: &Alternative) {
        self.select(alternative);
    }

    fn visit_group(&mut self, group: &Group) {
        self.select(group);
    }

    fn visit_identifier(&mut self, _identifier: &Identifier) {}

    fn visit_token(&mut self, _token: &Token) {}
}

/// Ranges of definitions and compound rules, innermost first, each linked
/// to the range directly enclosing it
pub fn selection_ranges(document: &TextDocument, ungram: &UngramDocument) -> Vec<SelectionRange> {
    let mut visitor = SelectionRangeVisitor {
        document,
        ungram,
        parent: None,
        selections: Vec::new(),
    };
    ungram.grammar().accept(&mut visitor);
    visitor.selections
}
