#![allow(dead_code)]
use tower_lsp::lsp_types::{Position, Range, Url};
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::TextDocument;
use ungrammar_language_server::convert::{to_lsp_position, to_lsp_range};

pub const URI: &str = "test://test.ungram";

pub fn url() -> Url {
    Url::parse(URI).unwrap()
}

pub fn open(text: &str) -> (TextDocument, UngramDocument) {
    (TextDocument::new(URI, 0, text), UngramDocument::parse(text))
}

/// Strip the first `|` not followed by another `|`, returning the opened
/// document and the cursor position
pub fn open_at_cursor(marked: &str) -> (TextDocument, UngramDocument, Position) {
    let bytes = marked.as_bytes();
    let offset = (0..bytes.len())
        .find(|&i| bytes[i] == b'|' && bytes.get(i + 1) != Some(&b'|'))
        .unwrap();
    let text = format!("{}{}", &marked[..offset], &marked[offset + 1..]);
    let (document, ungram) = open(&text);
    let position = to_lsp_position(document.position_at(offset));
    (document, ungram, position)
}

pub fn range(document: &TextDocument, offset: usize, length: usize) -> Range {
    to_lsp_range(document.range_of(offset..offset + length))
}
