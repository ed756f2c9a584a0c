//! Conversions between the document model types and `lsp_types`.
use std::collections::HashMap;

use tower_lsp::lsp_types;
use tower_lsp::lsp_types::Url;
use ungrammar_lang::text_document::{Location, Position, Range, TextEdit};

pub fn to_lsp_position(position: Position) -> lsp_types::Position {
    lsp_types::Position::new(position.line, position.character)
}

pub fn from_lsp_position(position: lsp_types::Position) -> Position {
    Position::new(position.line, position.character)
}

pub fn to_lsp_range(range: Range) -> lsp_types::Range {
    lsp_types::Range::new(to_lsp_position(range.start), to_lsp_position(range.end))
}

pub fn from_lsp_range(range: lsp_types::Range) -> Range {
    Range::new(from_lsp_position(range.start), from_lsp_position(range.end))
}

pub fn to_lsp_url(uri: &str) -> Option<Url> {
    match Url::parse(uri) {
        Ok(url) => Some(url),
        Err(e) => {
            log::warn!("invalid document uri {uri}: {e}");
            None
        }
    }
}

pub fn to_lsp_location(location: &Location) -> Option<lsp_types::Location> {
    Some(lsp_types::Location::new(
        to_lsp_url(&location.uri)?,
        to_lsp_range(location.range),
    ))
}

pub fn to_lsp_text_edit(edit: TextEdit) -> lsp_types::TextEdit {
    lsp_types::TextEdit::new(to_lsp_range(edit.range), edit.new_text)
}

pub fn to_lsp_changes(
    changes: HashMap<String, Vec<TextEdit>>,
) -> HashMap<Url, Vec<lsp_types::TextEdit>> {
    changes
        .into_iter()
        .filter_map(|(uri, edits)| {
            let edits = edits.into_iter().map(to_lsp_text_edit).collect();
            Some((to_lsp_url(&uri)?, edits))
        })
        .collect()
}
