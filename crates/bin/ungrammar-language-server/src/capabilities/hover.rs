use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::TextDocument;

use super::offset_of;
use crate::convert::to_lsp_range;

/// Definitions of the identifier under the cursor, as markdown code blocks
pub fn hover(document: &TextDocument, ungram: &UngramDocument, position: Position) -> Option<Hover> {
    let identifier = ungram.identifier_at(offset_of(document, position))?;
    let markdown = ungram.definitions_markdown(ungram.node_text(identifier))?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: markdown,
        }),
        range: Some(to_lsp_range(ungram.node_range(identifier, document))),
    })
}
