//! Language features, each a pure function of an open document.
pub mod code_action;
pub mod code_lens;
pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod document_symbols;
pub mod folding;
pub mod formatting;
pub mod highlight;
pub mod hover;
pub mod references;
pub mod rename;
pub mod selection;
pub mod semantic_tokens;

use tower_lsp::lsp_types::Position;
use ungrammar_lang::text_document::TextDocument;

use crate::convert::from_lsp_position;

/// Byte offset of an LSP position
pub(crate) fn offset_of(document: &TextDocument, position: Position) -> usize {
    document.offset_at(from_lsp_position(position))
}
