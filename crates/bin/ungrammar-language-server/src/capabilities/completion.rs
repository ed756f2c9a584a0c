use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::TextDocument;

use super::offset_of;

/// Every defined name, unless the cursor is in a comment or a quoted token
pub fn completion(
    document: &TextDocument,
    ungram: &UngramDocument,
    position: Position,
) -> CompletionList {
    let offset = offset_of(document, position);
    // a cursor right after the last character of a comment still types into it
    let in_comment =
        ungram.is_in_comment(offset) || (offset > 0 && ungram.is_in_comment(offset - 1));
    if in_comment || ungram.is_in_token(offset) {
        return CompletionList {
            is_incomplete: false,
            items: Vec::new(),
        };
    }

    let items = ungram
        .definitions()
        .names()
        .map(|name| {
            let documentation = ungram
                .definitions_markdown(name)
                .unwrap_or_else(|| name.to_string());
            CompletionItem {
                label: name.to_string(),
                kind: Some(CompletionItemKind::VARIABLE),
                commit_characters: Some(vec!["=".to_string()]),
                documentation: Some(Documentation::MarkupContent(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: documentation,
                })),
                ..Default::default()
            }
        })
        .collect();

    CompletionList {
        is_incomplete: false,
        items,
    }
}
