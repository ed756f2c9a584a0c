mod common;

use common::{open_at_cursor, range, url};
use tower_lsp::lsp_types::*;
use ungrammar_language_server::capabilities::{
    code_action, completion, definition, highlight, hover, references, rename,
};

fn hover_markdown(marked: &str) -> Option<String> {
    let (document, ungram, position) = open_at_cursor(marked);
    hover::hover(&document, &ungram, position).map(|hover| match hover.contents {
        HoverContents::Markup(content) => {
            assert_eq!(content.kind, MarkupKind::Markdown);
            content.value
        }
        other => panic!("unexpected hover contents {other:?}"),
    })
}

#[test]
fn test_hover() {
    let foo = Some("```ungrammar\nFoo='Bar'\n```".to_string());
    assert_eq!(hover_markdown("|Foo='Bar'"), foo);
    assert_eq!(hover_markdown("F|oo='Bar'"), foo);
    assert_eq!(
        hover_markdown("Foo=B|ar\nBar='Boo'"),
        Some("```ungrammar\nBar='Boo'\n```".to_string())
    );
    assert_eq!(hover_markdown("Foo='Bar'\n// Joo=F|oo"), None);
    assert_eq!(hover_markdown("Foo='Bar'\nJoo='F|oo'"), None);
}

#[test]
fn test_hover_range_is_the_identifier() {
    let (document, ungram, position) = open_at_cursor("Foo=B|ar\nBar='Boo'");
    let hover = hover::hover(&document, &ungram, position).unwrap();
    assert_eq!(hover.range, Some(range(&document, 4, 3)));
}

fn complete(marked: &str) -> CompletionList {
    let (document, ungram, position) = open_at_cursor(marked);
    completion::completion(&document, &ungram, position)
}

#[test]
fn test_complete_node() {
    let list = complete("Foo=Bar\nBar='Boo'\n|");
    let labels = list.items.iter().map(|i| i.label.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["Foo", "Bar"]);

    let bar = &list.items[1];
    assert_eq!(bar.kind, Some(CompletionItemKind::VARIABLE));
    assert_eq!(bar.commit_characters, Some(vec!["=".to_string()]));
    assert_eq!(
        bar.documentation,
        Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: "```ungrammar\nBar='Boo'\n```".to_string(),
        }))
    );
}

#[test]
fn test_complete_in_token_and_comment() {
    assert!(complete("Foo='Bar'\nBar='|'").items.is_empty());
    assert!(complete("Foo='Bar'\n// Hello |\nBar='foo'").items.is_empty());
    assert!(complete("Foo='Bar'\n// He|llo\nBar='foo'").items.is_empty());
}

fn goto(marked: &str) -> (Vec<Range>, Option<GotoDefinitionResponse>) {
    let (document, ungram, position) = open_at_cursor(marked);
    let result = definition::definition(&document, &ungram, position);
    let ranges = match &result {
        Some(GotoDefinitionResponse::Scalar(location)) => vec![location.range],
        Some(GotoDefinitionResponse::Array(locations)) => {
            locations.iter().map(|l| l.range).collect()
        }
        _ => Vec::new(),
    };
    (ranges, result)
}

#[test]
fn test_definition() {
    let (document, _, _) = open_at_cursor("|Foo='Bar'");
    let (ranges, result) = goto("|Foo='Bar'");
    assert!(matches!(result, Some(GotoDefinitionResponse::Scalar(ref l)) if l.uri == url()));
    assert_eq!(ranges, vec![range(&document, 0, 3)]);

    let (ranges, _) = goto("Fo|o='Bar'");
    assert_eq!(ranges, vec![range(&document, 0, 3)]);

    let (document, _, _) = open_at_cursor("Foo=B|ard\nBard='Boo'");
    let (ranges, _) = goto("Foo=B|ard\nBard='Boo'");
    assert_eq!(ranges, vec![range(&document, 9, 4)]);

    assert!(goto("Foo=Bar\nBar='F|oo'").1.is_none());
    assert!(goto("Foo=Bar\n// Bar=F|oo").1.is_none());
    assert!(goto("Foo=B|oo").1.is_none());
}

#[test]
fn test_definition_of_redeclared_name() {
    let (ranges, result) = goto("Foo=Bar\nFoo='Bar'\nBar=Fo|o");
    assert!(matches!(result, Some(GotoDefinitionResponse::Array(_))));
    assert_eq!(ranges.len(), 2);
}

fn reference_ranges(marked: &str, include_declaration: bool) -> Option<Vec<(usize, usize)>> {
    let (document, ungram, position) = open_at_cursor(marked);
    let offsets = |r: Range| {
        let start = document.offset_at(ungrammar_language_server::convert::from_lsp_position(r.start));
        let end = document.offset_at(ungrammar_language_server::convert::from_lsp_position(r.end));
        (start, end - start)
    };
    references::references(&document, &ungram, position, include_declaration)
        .map(|locations| locations.into_iter().map(|l| offsets(l.range)).collect())
}

#[test]
fn test_references() {
    assert_eq!(reference_ranges("|Foo='Bar'", true), Some(vec![(0, 3)]));
    assert_eq!(reference_ranges("Fo|o='Bar'", true), Some(vec![(0, 3)]));
    assert_eq!(
        reference_ranges("Foo=B|ard\nBard='Boo'", true),
        Some(vec![(9, 4), (4, 4)])
    );
    assert_eq!(reference_ranges("Foo=Bar\nBar='F|oo'", true), None);
    assert_eq!(reference_ranges("Foo=Bar\n// Bar=F|oo", true), None);
}

#[test]
fn test_references_of_undefined_and_redeclared() {
    assert_eq!(reference_ranges("Foo=Bar\nBar=B|oo", true), Some(vec![(12, 3)]));
    assert_eq!(
        reference_ranges("Foo=Bar\nBar=B|oo Boo", true),
        Some(vec![(12, 3), (16, 3)])
    );
    assert_eq!(
        reference_ranges("Foo=Bar\nFoo='Bar'\nBar=Fo|o", true),
        Some(vec![(0, 3), (8, 3), (22, 3)])
    );
}

#[test]
fn test_references_without_declaration() {
    assert_eq!(
        reference_ranges("Foo=B|ard\nBard='Boo'", false),
        Some(vec![(4, 4)])
    );
    assert_eq!(reference_ranges("|Foo='Bar'", false), Some(vec![]));
}

#[test]
fn test_document_highlight() {
    let (document, ungram, position) = open_at_cursor("Foo=B|ard\nBard='Boo'");
    let highlights = highlight::document_highlight(&document, &ungram, position).unwrap();
    assert_eq!(
        highlights,
        vec![
            DocumentHighlight {
                range: range(&document, 9, 4),
                kind: Some(DocumentHighlightKind::WRITE),
            },
            DocumentHighlight {
                range: range(&document, 4, 4),
                kind: Some(DocumentHighlightKind::READ),
            },
        ]
    );

    let (document, ungram, position) = open_at_cursor("Foo='B|ar'");
    assert!(highlight::document_highlight(&document, &ungram, position).is_none());
}

fn rename_edits(marked: &str, new_name: &str) -> Option<Vec<(Range, String)>> {
    let (document, ungram, position) = open_at_cursor(marked);
    let edit = rename::rename(&document, &ungram, position, new_name)?;
    let mut changes = edit.changes.unwrap();
    assert_eq!(changes.len(), 1);
    let edits = changes.remove(&url()).unwrap();
    Some(edits.into_iter().map(|e| (e.range, e.new_text)).collect())
}

#[test]
fn test_rename() {
    let (document, _, _) = open_at_cursor("Foo=B|ard\nBard='Boo'");
    assert_eq!(
        rename_edits("Foo=B|ard\nBard='Boo'", "Boo"),
        Some(vec![
            (range(&document, 9, 4), "Boo".to_string()),
            (range(&document, 4, 4), "Boo".to_string()),
        ])
    );
    assert_eq!(
        rename_edits("|Foo='Bar'", "Boo"),
        Some(vec![(range(&document, 0, 3), "Boo".to_string())])
    );
    assert_eq!(rename_edits("Foo=Bar\nBar='F|oo'", "Boo"), None);
    assert_eq!(rename_edits("Foo=Bar\n// Bar=F|oo", "Boo"), None);
}

#[test]
fn test_rename_undefined_and_redeclared() {
    let (document, _, _) = open_at_cursor("Foo=Bar\nFoo='Bar'\nBar=Fo|o");
    let edits = rename_edits("Foo=Bar\nBar=B|oo Boo", "Lo").unwrap();
    assert_eq!(edits.len(), 2);
    assert!(edits.iter().all(|(_, text)| text == "Lo"));

    assert_eq!(
        rename_edits("Foo=Bar\nFoo='Bar'\nBar=Fo|o", "Boo")
            .unwrap()
            .into_iter()
            .map(|(r, _)| r)
            .collect::<Vec<_>>(),
        vec![
            range(&document, 0, 3),
            range(&document, 8, 3),
            range(&document, 22, 3),
        ]
    );
}

#[test]
fn test_prepare_rename() {
    let (document, ungram, position) = open_at_cursor("Foo=B|ard\nBard='Boo'");
    assert_eq!(
        rename::prepare_rename(&document, &ungram, position),
        Some(PrepareRenameResponse::Range(range(&document, 4, 4)))
    );
    let (document, ungram, position) = open_at_cursor("Foo='B|ar'");
    assert_eq!(rename::prepare_rename(&document, &ungram, position), None);
}

fn actions(marked: &str) -> Option<Vec<(String, String)>> {
    let (document, ungram, position) = open_at_cursor(marked);
    let result = code_action::code_action(&document, &ungram, Range::new(position, position))?;
    Some(
        result
            .into_iter()
            .map(|action| match action {
                CodeActionOrCommand::CodeAction(action) => {
                    let mut changes = action.edit.unwrap().changes.unwrap();
                    let edits = changes.remove(&url()).unwrap();
                    (action.title, edits[0].new_text.clone())
                }
                CodeActionOrCommand::Command(command) => panic!("unexpected {command:?}"),
            })
            .collect(),
    )
}

#[test]
fn test_code_action_on_node() {
    assert_eq!(
        actions("F|oo='Bar'"),
        Some(vec![
            ("Transform to Camel Case".to_string(), "foo".to_string()),
            ("Transform to Snake Case".to_string(), "foo".to_string()),
            ("Transform to Constant Case".to_string(), "FOO".to_string()),
        ])
    );
}

#[test]
fn test_code_action_edits_every_reference() {
    let (document, ungram, position) = open_at_cursor("Foo=hello_wo|rld\nhello_world='x'");
    let result = code_action::code_action(&document, &ungram, Range::new(position, position)).unwrap();
    let CodeActionOrCommand::CodeAction(camel) = &result[0] else {
        panic!("expected a code action");
    };
    assert_eq!(camel.title, "Transform to Camel Case");
    let edits = &camel.edit.as_ref().unwrap().changes.as_ref().unwrap()[&url()];
    assert_eq!(edits.len(), 2);
    assert!(edits.iter().all(|e| e.new_text == "helloWorld"));
}

#[test]
fn test_code_action_outside_identifiers() {
    assert_eq!(actions("Foo='B|ar'"), None);
    assert_eq!(actions("Foo='Bar' // F|oo = 'Too'"), None);
}

#[test]
fn test_split_word() {
    use code_action::{split_word, to_camel_case, to_constant_case, to_pascal_case, to_snake_case};
    assert_eq!(split_word("helloWorld"), vec!["hello", "world"]);
    assert_eq!(split_word("HelloWorld"), vec!["hello", "world"]);
    assert_eq!(split_word("HelloWorldFOO"), vec!["hello", "world", "foo"]);
    assert_eq!(split_word("hello_world"), vec!["hello", "world"]);
    assert_eq!(split_word("HELLO_WORLD"), vec!["hello", "world"]);
    assert_eq!(to_camel_case("hello_world"), "helloWorld");
    assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
    assert_eq!(to_snake_case("helloWorld"), "hello_world");
    assert_eq!(to_constant_case("helloWorld"), "HELLO_WORLD");
}
