use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::diagnostics::validate;
use ungrammar_lang::text_document::TextDocument;

use crate::convert::to_lsp_range;

pub const SOURCE: &str = "ungrammar";

/// Syntax and name problems of a document, nothing for an empty one
pub fn diagnostics(document: &TextDocument, ungram: &UngramDocument) -> Vec<Diagnostic> {
    if document.text().is_empty() {
        return Vec::new();
    }
    validate(document, ungram)
        .into_iter()
        .map(|d| Diagnostic {
            range: to_lsp_range(d.range),
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::Number(d.code.value())),
            source: Some(SOURCE.to_string()),
            message: d.message,
            ..Default::default()
        })
        .collect()
}
