use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::{TextDocument, get_changes};

use super::offset_of;
use crate::convert::{to_lsp_changes, to_lsp_range};

/// Range of the identifier that would be renamed
pub fn prepare_rename(
    document: &TextDocument,
    ungram: &UngramDocument,
    position: Position,
) -> Option<PrepareRenameResponse> {
    let identifier = ungram.identifier_at(offset_of(document, position))?;
    Some(PrepareRenameResponse::Range(to_lsp_range(
        ungram.node_range(identifier, document),
    )))
}

/// Replace every declaration and use of the name under the cursor
pub fn rename(
    document: &TextDocument,
    ungram: &UngramDocument,
    position: Position,
    new_name: &str,
) -> Option<WorkspaceEdit> {
    let name = ungram.identifier_name_at(offset_of(document, position))?;
    let references = ungram.references(name, document);
    if references.is_empty() {
        return None;
    }
    Some(WorkspaceEdit {
        changes: Some(to_lsp_changes(get_changes(&references, new_name))),
        ..Default::default()
    })
}
