use tower_lsp::lsp_types::*;
use ungrammar_fmt::{FormatOptions, format, format_document};
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::TextDocument;

use crate::convert::{from_lsp_range, to_lsp_text_edit};

/// Edits reformatting the document, or only the definitions inside `range`
pub fn formatting(
    document: &TextDocument,
    ungram: &UngramDocument,
    range: Option<Range>,
) -> Vec<TextEdit> {
    let options = FormatOptions::default();
    let edits = match range {
        Some(range) => format(document, ungram, from_lsp_range(range), &options),
        None => format_document(document, ungram, &options),
    };
    edits.into_iter().map(to_lsp_text_edit).collect()
}
