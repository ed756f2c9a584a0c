use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::{self, TextDocument};

use super::offset_of;
use crate::convert::to_lsp_range;

fn highlight(location: text_document::Location, kind: DocumentHighlightKind) -> DocumentHighlight {
    DocumentHighlight {
        range: to_lsp_range(location.range),
        kind: Some(kind),
    }
}

/// Declarations of the name under the cursor as writes, its uses as reads
pub fn document_highlight(
    document: &TextDocument,
    ungram: &UngramDocument,
    position: Position,
) -> Option<Vec<DocumentHighlight>> {
    let name = ungram.identifier_name_at(offset_of(document, position))?;
    let declarations = ungram
        .definition_locations(name, document)
        .into_iter()
        .map(|l| highlight(l, DocumentHighlightKind::WRITE));
    let uses = ungram
        .identifier_locations(name, document)
        .into_iter()
        .map(|l| highlight(l, DocumentHighlightKind::READ));
    Some(declarations.chain(uses).collect())
}
