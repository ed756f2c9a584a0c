use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::TextDocument;

use super::offset_of;
use crate::convert::to_lsp_location;

/// Declarations of the identifier under the cursor
pub fn definition(
    document: &TextDocument,
    ungram: &UngramDocument,
    position: Position,
) -> Option<GotoDefinitionResponse> {
    let name = ungram.identifier_name_at(offset_of(document, position))?;
    let mut locations = ungram
        .definition_locations(name, document)
        .iter()
        .filter_map(to_lsp_location)
        .collect::<Vec<_>>();
    match locations.len() {
        0 => None,
        1 => locations.pop().map(GotoDefinitionResponse::Scalar),
        _ => Some(GotoDefinitionResponse::Array(locations)),
    }
}
