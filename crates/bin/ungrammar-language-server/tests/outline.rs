mod common;

use common::{open, range};
use tower_lsp::lsp_types::*;
use ungrammar_language_server::capabilities::{
    code_lens, diagnostics, document_symbols, folding, formatting, selection, semantic_tokens,
};

fn lenses(text: &str) -> Vec<(Range, String)> {
    let (document, ungram) = open(text);
    code_lens::code_lens(&document, &ungram)
        .into_iter()
        .map(|lens| {
            let command = lens.command.unwrap();
            assert_eq!(command.command, code_lens::IMPLEMENTATION_COMMAND);
            (lens.range, command.title)
        })
        .collect()
}

#[test]
fn test_code_lens() {
    let (single, _) = open("Foo = 'Bar'");
    assert_eq!(
        lenses("Foo = 'Bar'"),
        vec![(range(&single, 0, 3), "0 Implementation".to_string())]
    );
    let (document, _) = open("Foo = Bar Bar\nBar = 'Boo'");
    assert_eq!(
        lenses("Foo = Bar Bar\nBar = 'Boo'"),
        vec![
            (range(&document, 0, 3), "0 Implementation".to_string()),
            (range(&document, 14, 3), "2 Implementations".to_string()),
        ]
    );
    assert_eq!(
        lenses("Foo = Bar\nBar = Foo")
            .into_iter()
            .map(|(_, title)| title)
            .collect::<Vec<_>>(),
        vec!["1 Implementation", "1 Implementation"]
    );
    assert!(lenses("// Foo = 'Bar'").is_empty());
}

fn symbols(text: &str) -> Vec<(String, Range, Range)> {
    let (document, ungram) = open(text);
    document_symbols::document_symbols(&document, &ungram)
        .into_iter()
        .map(|symbol| {
            assert_eq!(symbol.kind, SymbolKind::FUNCTION);
            (symbol.name, symbol.range, symbol.selection_range)
        })
        .collect()
}

#[test]
fn test_document_symbols() {
    let (single, _) = open("Foo = 'Bar'");
    assert_eq!(
        symbols("Foo = 'Bar'"),
        vec![("Foo".to_string(), range(&single, 0, 11), range(&single, 0, 3))]
    );
    assert_eq!(range(&single, 0, 11).end, Position::new(0, 11));

    let (document, _) = open("Foo = Bar\nBar = 'Boo'");
    assert_eq!(
        symbols("Foo = Bar\nBar = 'Boo'"),
        vec![
            ("Foo".to_string(), range(&document, 0, 9), range(&document, 0, 3)),
            ("Bar".to_string(), range(&document, 10, 11), range(&document, 10, 3)),
        ]
    );
    assert!(symbols("// Foo = Bar Bar = 'Boo'").is_empty());
}

fn folds(text: &str) -> Vec<(u32, u32)> {
    let (document, ungram) = open(text);
    folding::folding_ranges(&document, &ungram)
        .into_iter()
        .map(|f| (f.start_line, f.end_line))
        .collect()
}

#[test]
fn test_folding() {
    assert!(folds("Foo='Bar'").is_empty());
    assert_eq!(folds("Foo =\n  'Bar'\n| 'Boo'"), vec![(0, 2)]);
    assert!(folds("// Foo=\n//   'Bar'\n// | 'Boo'").is_empty());
}

/// Each selection as its range and its parent's range, as offset pairs
fn selections(text: &str) -> Vec<((usize, usize), Option<(usize, usize)>)> {
    let (document, ungram) = open(text);
    let span = |r: Range| {
        let start = document.offset_at(ungrammar_language_server::convert::from_lsp_position(r.start));
        let end = document.offset_at(ungrammar_language_server::convert::from_lsp_position(r.end));
        (start, end - start)
    };
    selection::selection_ranges(&document, &ungram)
        .into_iter()
        .map(|s| {
            if let Some(parent) = &s.parent {
                assert!(parent.parent.is_none());
            }
            (span(s.range), s.parent.map(|p| span(p.range)))
        })
        .collect()
}

#[test]
fn test_selection_ranges() {
    assert_eq!(selections("Foo = 'Bar'"), vec![((0, 11), None)]);
    assert_eq!(
        selections("Foo = 'Bar' | 'Boo'"),
        vec![((6, 13), Some((0, 19))), ((0, 19), None)]
    );
    assert_eq!(
        selections("Foo = 'Bar' 'Boo'"),
        vec![((6, 11), Some((0, 17))), ((0, 17), None)]
    );
    assert_eq!(
        selections("Foo = ('Bar')"),
        vec![((6, 7), Some((0, 13))), ((0, 13), None)]
    );
    assert_eq!(
        selections("Foo = ('Bar' | 'Boo' 'Tar')"),
        vec![
            ((15, 11), Some((7, 19))),
            ((7, 19), Some((6, 21))),
            ((6, 21), Some((0, 27))),
            ((0, 27), None),
        ]
    );
    assert!(selections("// Foo = ('Bar' | 'Boo' 'Tar')").is_empty());
}

fn token_data(text: &str) -> Vec<u32> {
    let (document, ungram) = open(text);
    semantic_tokens::semantic_tokens_full(&document, &ungram)
        .data
        .into_iter()
        .flat_map(|t| {
            [
                t.delta_line,
                t.delta_start,
                t.length,
                t.token_type,
                t.token_modifiers_bitset,
            ]
        })
        .collect()
}

#[test]
fn test_semantic_token_legend_is_unique() {
    let legend = semantic_tokens::semantic_token_legend();
    let types = legend.token_types.iter().map(|t| t.as_str()).collect::<std::collections::HashSet<_>>();
    assert_eq!(types.len(), legend.token_types.len());
    let modifiers = legend
        .token_modifiers
        .iter()
        .map(|m| m.as_str())
        .collect::<std::collections::HashSet<_>>();
    assert_eq!(modifiers.len(), legend.token_modifiers.len());
}

#[test]
fn test_semantic_tokens() {
    const HEAD: [u32; 10] = [0, 0, 3, 2, 1, 0, 4, 1, 1, 0];
    let with_head = |rest: &[u32]| [HEAD.as_slice(), rest].concat();

    assert_eq!(token_data("Foo = 'Bar'"), with_head(&[0, 2, 5, 3, 0]));
    assert_eq!(
        token_data("Foo = 'Bar' 'Boo'"),
        with_head(&[0, 2, 5, 3, 0, 0, 6, 5, 3, 0])
    );
    assert_eq!(
        token_data("Foo = Bar\nBar = 'Boo'"),
        with_head(&[0, 2, 3, 2, 0, 1, 0, 3, 2, 1, 0, 4, 1, 1, 0, 0, 2, 5, 3, 0])
    );
    assert_eq!(token_data("// Foo = 'Bar'"), vec![0, 0, 14, 0, 0]);
    assert_eq!(
        token_data("Foo = 'Bar' | 'Boo'"),
        with_head(&[0, 2, 5, 3, 0, 0, 6, 1, 1, 0, 0, 2, 5, 3, 0])
    );
    assert_eq!(
        token_data("Foo = 'Bar'?"),
        with_head(&[0, 2, 5, 3, 0, 0, 5, 1, 1, 0])
    );
    assert_eq!(
        token_data("Foo = 'Bar'*"),
        with_head(&[0, 2, 5, 3, 0, 0, 5, 1, 1, 0])
    );
    assert_eq!(
        token_data("Foo = lab:'Bar'"),
        with_head(&[0, 2, 3, 4, 0, 0, 4, 5, 3, 0])
    );
    assert_eq!(token_data("Foo = ('Bar')"), with_head(&[0, 3, 5, 3, 0]));
}

#[test]
fn test_semantic_tokens_count_utf16_units() {
    assert_eq!(token_data("// 日本語"), vec![0, 0, 6, 0, 0]);
}

#[test]
fn test_semantic_tokens_range() {
    let (document, ungram) = open("Foo = Bar\nBar = 'Boo'");
    let second_line = Range::new(Position::new(1, 0), Position::new(1, 11));
    let tokens = semantic_tokens::semantic_tokens_range(&document, &ungram, second_line);
    let data = tokens
        .data
        .into_iter()
        .map(|t| (t.delta_line, t.delta_start, t.length, t.token_type))
        .collect::<Vec<_>>();
    assert_eq!(data, vec![(1, 0, 3, 2), (0, 4, 1, 1), (0, 2, 5, 3)]);
}

#[test]
fn test_diagnostics() {
    let (document, ungram) = open("Foo = Bar");
    let found = diagnostics::diagnostics(&document, &ungram);
    assert_eq!(found.len(), 1);
    let diagnostic = &found[0];
    assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diagnostic.source.as_deref(), Some(diagnostics::SOURCE));
    assert_eq!(diagnostic.code, Some(NumberOrString::Number(201)));
    assert_eq!(diagnostic.range, range(&document, 6, 3));

    let (document, ungram) = open("");
    assert!(diagnostics::diagnostics(&document, &ungram).is_empty());

    let (document, ungram) = open("Foo = 'Bar'");
    assert!(diagnostics::diagnostics(&document, &ungram).is_empty());
}

#[test]
fn test_formatting() {
    let (document, ungram) = open("Foo='Bar'|'Boo'");
    let edits = formatting::formatting(&document, &ungram, None);
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].new_text, "Foo =\n  'Bar' | 'Boo'");
    assert_eq!(edits[0].range, range(&document, 0, 15));

    let (document, ungram) = open("Foo=(Bar");
    assert!(formatting::formatting(&document, &ungram, None).is_empty());
}
