use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::TextDocument;

use super::offset_of;
use crate::convert::to_lsp_location;

/// Uses of the identifier under the cursor, preceded by its declarations
/// when `include_declaration` is set
pub fn references(
    document: &TextDocument,
    ungram: &UngramDocument,
    position: Position,
    include_declaration: bool,
) -> Option<Vec<Location>> {
    let name = ungram.identifier_name_at(offset_of(document, position))?;
    let locations = if include_declaration {
        ungram.references(name, document)
    } else {
        ungram.identifier_locations(name, document)
    };
    Some(locations.iter().filter_map(to_lsp_location).collect())
}
