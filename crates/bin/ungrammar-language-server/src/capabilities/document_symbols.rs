use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::TextDocument;

use crate::convert::to_lsp_range;

/// A function symbol for every declaration, spanning its whole definition
pub fn document_symbols(document: &TextDocument, ungram: &UngramDocument) -> Vec<DocumentSymbol> {
    let tree = ungram.tree();
    ungram
        .definitions()
        .iter()
        .flat_map(|(name, declarations)| declarations.iter().map(move |&id| (name, id)))
        .filter_map(|(name, declaration)| {
            let node = tree.parent(declaration)?;
            #[allow(deprecated)]
            let symbol = DocumentSymbol {
                name: name.to_string(),
                detail: None,
                kind: SymbolKind::FUNCTION,
                tags: None,
                deprecated: None,
                range: to_lsp_range(ungram.node_range(node, document)),
                selection_range: to_lsp_range(ungram.node_range(declaration, document)),
                children: None,
            };
            Some(symbol)
        })
        .collect()
}
