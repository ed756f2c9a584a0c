use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::ast::visitor::AstVisitor;
use ungrammar_lang::ast::{AstAcceptor, Node};
use ungrammar_lang::text_document::TextDocument;

use crate::convert::to_lsp_range;

pub const IMPLEMENTATION_COMMAND: &str = "ungram.implementation";

struct CodeLensVisitor<'a> {
    document: &'a TextDocument,
    ungram: &'a UngramDocument,
    lenses: Vec<CodeLens>,
}

impl AstVisitor for CodeLensVisitor<'_> {
    fn visit_node(&mut self, node: &Node) {
        let Some(name) = &node.name else {
            return;
        };
        let text = self.ungram.node_text(name.syntax);
        if text.is_empty() {
            return;
        }
        let count = self.ungram.identifiers().get(text).len();
        let plural = if count > 1 { "s" } else { "" };
        self.lenses.push(CodeLens {
            range: to_lsp_range(self.ungram.node_range(name.syntax, self.document)),
            command: Some(Command::new(
                format!("{count} Implementation{plural}"),
                IMPLEMENTATION_COMMAND.to_string(),
                None,
            )),
            data: None,
        });
    }
}

/// A lens over every definition name counting the uses of that name
pub fn code_lens(document: &TextDocument, ungram: &UngramDocument) -> Vec<CodeLens> {
    let mut visitor = CodeLensVisitor {
        document,
        ungram,
        lenses: Vec::new(),
    };
    ungram.grammar().accept(&mut visitor);
    visitor.lenses
}
