use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::TextDocument;

/// One fold per definition spanning several lines
pub fn folding_ranges(document: &TextDocument, ungram: &UngramDocument) -> Vec<FoldingRange> {
    ungram
        .definitions()
        .iter()
        .flat_map(|(_, declarations)| declarations.iter().copied())
        .filter_map(|declaration| ungram.tree().parent(declaration))
        .map(|node| ungram.node_range(node, document))
        .filter(|range| range.start.line != range.end.line)
        .map(|range| FoldingRange {
            start_line: range.start.line,
            end_line: range.end.line,
            ..Default::default()
        })
        .collect()
}
