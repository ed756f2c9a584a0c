//! Case conversion actions for rule names.
use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::{Location, TextDocument, get_changes};

use super::offset_of;
use crate::convert::to_lsp_changes;

/// Actions renaming the identifier at the start of `range` to another case
pub fn code_action(
    document: &TextDocument,
    ungram: &UngramDocument,
    range: Range,
) -> Option<CodeActionResponse> {
    let name = ungram.identifier_name_at(offset_of(document, range.start))?;
    let references = ungram.references(name, document);
    if references.is_empty() {
        return None;
    }

    let conversions: [(&str, fn(&str) -> String); 4] = [
        ("Transform to Camel Case", to_camel_case),
        ("Transform to Pascal Case", to_pascal_case),
        ("Transform to Snake Case", to_snake_case),
        ("Transform to Constant Case", to_constant_case),
    ];
    let actions = conversions
        .into_iter()
        .filter_map(|(title, convert)| rename_action(&references, title, name, &convert(name)))
        .collect();
    Some(actions)
}

fn rename_action(
    references: &[Location],
    title: &str,
    old_name: &str,
    new_name: &str,
) -> Option<CodeActionOrCommand> {
    if old_name == new_name {
        return None;
    }
    Some(CodeActionOrCommand::CodeAction(CodeAction {
        title: title.to_string(),
        edit: Some(WorkspaceEdit {
            changes: Some(to_lsp_changes(get_changes(references, new_name))),
            ..Default::default()
        }),
        ..Default::default()
    }))
}

/// Lowercase words of an identifier.
///
/// A word starts at each uppercase letter, except inside a run of capitals
/// where only the last capital before a lowercase letter starts one.
/// Underscores separate words and are dropped.
pub fn split_word(text: &str) -> Vec<String> {
    let chars = text.chars().collect::<Vec<_>>();
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_upper = false;

    for (i, &c) in chars.iter().enumerate() {
        let upper = c.is_ascii_uppercase();
        if prev_upper && upper {
            let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if next_lower {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        } else if upper {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        } else if c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
        prev_upper = upper;
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.into_iter().map(|w| w.to_ascii_lowercase()).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn to_pascal_case(text: &str) -> String {
    split_word(text).iter().map(|w| capitalize(w)).collect()
}

pub fn to_camel_case(text: &str) -> String {
    let pascal = to_pascal_case(text);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn to_snake_case(text: &str) -> String {
    split_word(text).join("_")
}

pub fn to_constant_case(text: &str) -> String {
    to_snake_case(text).to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_word() {
        assert_eq!(split_word("fooBar"), vec!["foo", "bar"]);
        assert_eq!(split_word("FooBar"), vec!["foo", "bar"]);
        assert_eq!(split_word("foo_bar"), vec!["foo", "bar"]);
        assert_eq!(split_word("FOO_BAR"), vec!["foo", "bar"]);
        assert_eq!(split_word("HTMLElement"), vec!["html", "element"]);
        assert_eq!(split_word("__foo__"), vec!["foo"]);
        assert!(split_word("_").is_empty());
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_camel_case("FooBar"), "fooBar");
        assert_eq!(to_pascal_case("foo_bar"), "FooBar");
        assert_eq!(to_snake_case("FooBar"), "foo_bar");
        assert_eq!(to_constant_case("fooBar"), "FOO_BAR");
        assert_eq!(to_camel_case("_"), "");
    }
}
