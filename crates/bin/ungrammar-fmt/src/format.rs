//! Layout of definitions, driven by a visitor over the typed AST.
//!
//! Each definition is printed as `Name =` followed by its rule on the next
//! lines. A sequence or an alternative stays on one line while it fits the
//! remaining width, otherwise every item gets its own line. Comments are
//! collected by position and re-attached to the item they follow, which
//! forces the surrounding list to split.

use std::ops::Range as Span;

use ungrammar_lang::UngramDocument;
use ungrammar_lang::ast::visitor::AstVisitor;
use ungrammar_lang::ast::{
    Alternative, AstAcceptor, Grammar, Group, Identifier, Label, Node, Optional, Repetition, Rule,
    Sequence, Token,
};
use ungrammar_lang::diagnostics::{ErrorCode, reportable, validate};
use ungrammar_lang::log;
use ungrammar_lang::parser::{SyntaxNodeId, SyntaxTree, TokenKind};
use ungrammar_lang::text_document::{Range, TextDocument, TextEdit};
use ungrammar_lang::utils::error::ReportableError;

use crate::GLOBAL_DATA;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub width: usize,
    pub indent_size: usize,
}

impl Default for FormatOptions {
    /// Options of the process-wide configuration
    fn default() -> Self {
        match GLOBAL_DATA.try_lock() {
            Ok(gdata) => Self {
                width: gdata.width,
                indent_size: gdata.indent_size,
            },
            Err(_) => Self {
                width: 80,
                indent_size: 2,
            },
        }
    }
}

/// Edits reformatting the definitions lying fully inside `range`.
/// The whole document is reformatted when `range` covers all of it.
/// Documents with syntax errors are left untouched.
pub fn format(
    document: &TextDocument,
    ungram: &UngramDocument,
    range: Range,
    options: &FormatOptions,
) -> Vec<TextEdit> {
    if has_syntax_errors(ungram) {
        log::debug!("{} has syntax errors, not formatting", document.uri);
        return Vec::new();
    }
    let span = document.offset_at(range.start)..document.offset_at(range.end);
    let mut visitor = FormatVisitor::new(ungram.tree(), ungram.text(), span, options);
    ungram.grammar().accept(&mut visitor);

    match visitor.edit_range {
        Some(edit_range) if !visitor.code.is_empty() => vec![TextEdit {
            range: document.range_of(edit_range),
            new_text: visitor.code,
        }],
        _ => Vec::new(),
    }
}

pub fn format_document(
    document: &TextDocument,
    ungram: &UngramDocument,
    options: &FormatOptions,
) -> Vec<TextEdit> {
    let range = Range::new(
        document.position_at(0),
        document.position_at(document.text().len()),
    );
    format(document, ungram, range, options)
}

/// Format a whole source text, ending it with a line break
pub fn pretty_print(src: &str, width: usize) -> Result<String, Vec<Box<dyn ReportableError>>> {
    let document = TextDocument::new("", 0, src);
    let ungram = UngramDocument::parse(src);
    if has_syntax_errors(&ungram) {
        let syntax_errors = validate(&document, &ungram)
            .into_iter()
            .filter(|d| {
                !matches!(
                    d.code,
                    ErrorCode::RedeclaredDefinition | ErrorCode::UndefinedIdentifier
                )
            })
            .collect();
        return Err(reportable(syntax_errors));
    }

    let options = FormatOptions {
        width,
        ..FormatOptions::default()
    };
    let mut formatted = document.apply_edits(&format_document(&document, &ungram, &options));
    if !formatted.is_empty() && !formatted.ends_with('\n') {
        formatted.push('\n');
    }
    Ok(formatted)
}

/// Whether formatting could lose text. Stray `\r` is trivia and is dropped anyway.
fn has_syntax_errors(ungram: &UngramDocument) -> bool {
    let tree = ungram.tree();
    ungram
        .unknowns()
        .iter()
        .any(|&id| tree.token_kind(id) != Some(TokenKind::WhitespaceR))
}

#[derive(Debug, Clone, Copy)]
enum Joiner {
    Sequence,
    Alternative,
}

#[derive(Debug)]
enum Entry {
    Item(String),
    Comment(String),
}

impl Entry {
    fn code(&self) -> &str {
        match self {
            Entry::Item(code) | Entry::Comment(code) => code,
        }
    }
}

impl Joiner {
    fn inline(self) -> &'static str {
        match self {
            Joiner::Sequence => " ",
            Joiner::Alternative => " | ",
        }
    }

    fn split(self, entries: &[Entry]) -> String {
        let mut code = String::new();
        for entry in entries {
            if !code.is_empty() {
                code.push_str(match (self, entry) {
                    (Joiner::Alternative, Entry::Item(_)) => "\n| ",
                    _ => "\n",
                });
            }
            code.push_str(entry.code());
        }
        code
    }
}

struct FormatVisitor<'a> {
    tree: &'a SyntaxTree,
    source: &'a str,
    comments: Vec<SyntaxNodeId>,
    range: Span<usize>,
    edit_range: Option<Span<usize>>,
    indent_size: usize,
    max_size: usize,
    indent: usize,
    /// Span searched for comments by the next list, when wider than the list itself
    bounds: Option<Span<usize>>,
    code: String,
    split: bool,
    /// Comments found inside the last visited item, printed after it
    trailing: Vec<String>,
}

impl<'a> FormatVisitor<'a> {
    fn new(tree: &'a SyntaxTree, source: &'a str, range: Span<usize>, options: &FormatOptions) -> Self {
        let comments = tree
            .descendants(tree.root())
            .filter(|&id| tree.token_kind(id) == Some(TokenKind::SingleLineComment))
            .collect();
        Self {
            tree,
            source,
            comments,
            range,
            edit_range: None,
            indent_size: options.indent_size,
            max_size: options.width,
            indent: 0,
            bounds: None,
            code: String::new(),
            split: false,
            trailing: Vec::new(),
        }
    }

    fn span(&self, node: &impl AstAcceptor) -> Span<usize> {
        self.tree.range(node.syntax())
    }

    fn text(&self, node: &impl AstAcceptor) -> &'a str {
        self.tree.text(node.syntax(), self.source)
    }

    fn comments_between(&self, from: usize, to: usize) -> Vec<String> {
        self.comments
            .iter()
            .filter(|&&id| {
                let range = self.tree.range(id);
                range.start >= from && range.end <= to
            })
            .map(|&id| self.tree.text(id, self.source).trim_end().to_string())
            .collect()
    }

    /// Comments between definitions; they become part of the replaced text
    fn attached_comments(&mut self, from: usize, to: usize) -> Vec<String> {
        let ranges = self
            .comments
            .iter()
            .map(|&id| self.tree.range(id))
            .filter(|range| range.start >= from && range.end <= to)
            .collect::<Vec<_>>();
        for range in ranges {
            self.extend_edit_range(range);
        }
        self.comments_between(from, to)
    }

    fn extend_edit_range(&mut self, span: Span<usize>) {
        self.edit_range = Some(match self.edit_range.take() {
            Some(current) => current.start.min(span.start)..current.end.max(span.end),
            None => span,
        });
    }

    fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let (indent, max_size) = (self.indent, self.max_size);
        self.indent += self.indent_size;
        self.max_size = self.max_size.saturating_sub(self.indent_size);
        let result = f(self);
        self.indent = indent;
        self.max_size = max_size;
        result
    }

    fn visit_rules(&mut self, rules: &[Rule], joiner: Joiner, bounds: Span<usize>) {
        let limit = self.max_size.saturating_sub(self.indent);
        let entries = self.nested(|this| {
            let mut entries = Vec::new();
            let mut from = bounds.start;
            for rule in rules {
                let span = this.span(rule);
                entries.extend(this.comments_between(from, span.start).into_iter().map(Entry::Comment));
                this.bounds = None;
                rule.accept(this);
                entries.push(Entry::Item(std::mem::take(&mut this.code)));
                entries.extend(std::mem::take(&mut this.trailing).into_iter().map(Entry::Comment));
                from = span.end;
            }
            entries.extend(this.comments_between(from, bounds.end).into_iter().map(Entry::Comment));
            entries
        });

        let has_comment = entries.iter().any(|e| matches!(e, Entry::Comment(_)));
        let inline = (!has_comment).then(|| {
            entries
                .iter()
                .map(Entry::code)
                .collect::<Vec<_>>()
                .join(joiner.inline())
        });
        match inline {
            Some(code) if rules.len() < 2 || code.chars().count() <= limit => {
                self.code = code;
                self.split = false;
            }
            _ => {
                self.code = joiner.split(&entries);
                self.split = true;
            }
        }
        self.trailing.clear();
    }

    /// Render `rule` followed by `suffix`, hoisting comments between them
    fn visit_postfix(&mut self, rule: Option<&Rule>, span: Span<usize>, suffix: &str) {
        let (code, mut trailing, inner_end) = match rule {
            Some(rule) => {
                self.bounds = None;
                rule.accept(self);
                let code = std::mem::take(&mut self.code);
                (code, std::mem::take(&mut self.trailing), self.span(rule).end)
            }
            None => (String::new(), Vec::new(), span.start),
        };
        trailing.extend(self.comments_between(inner_end, span.end));
        self.code = format!("{code}{suffix}");
        self.trailing = trailing;
    }
}

impl AstVisitor for FormatVisitor<'_> {
    fn visit_grammar(&mut self, grammar: &Grammar) {
        let whole = self.tree.range(grammar.syntax) == self.range;
        if whole {
            self.edit_range = Some(self.range.clone());
        }

        let mut codes = Vec::new();
        let mut prev_end = 0;
        for node in &grammar.nodes {
            let span = self.span(node);
            let from = prev_end.max(self.range.start);
            prev_end = span.end;
            if !whole && (span.start < self.range.start || span.end > self.range.end) {
                continue;
            }
            node.accept(self);
            let mut lines = self.attached_comments(from, span.start);
            lines.push(std::mem::take(&mut self.code));
            codes.push(lines.join("\n"));
        }

        let mut code = codes.join("\n\n");
        if let Some(last) = grammar.nodes.last() {
            let from = self.span(last).end.max(self.range.start);
            let trailing = self.attached_comments(from, self.range.end);
            if !trailing.is_empty() {
                code = [code, trailing.join("\n")]
                    .into_iter()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n\n");
            }
        }
        self.code = code;
    }

    fn visit_node(&mut self, node: &Node) {
        let span = self.span(node);
        self.extend_edit_range(span.clone());
        let name = node.name.as_ref().map_or("", |n| self.text(n));
        let Some(rule) = &node.rule else {
            self.code = format!("{name} =");
            return;
        };

        let after_name = node.name.as_ref().map_or(span.start, |n| self.span(n).end);
        let rule_span = self.span(rule);
        let code = self.nested(|this| {
            let mut lines = this.comments_between(after_name, rule_span.start);
            this.bounds = None;
            rule.accept(this);
            lines.push(std::mem::take(&mut this.code));
            lines.append(&mut this.trailing);
            lines.join("\n")
        });
        let indent = self.indent + self.indent_size;
        self.code = format!("{name} =\n{}", indent_definition(&code, indent));
    }

    fn visit_sequence(&mut self, sequence: &Sequence) {
        let bounds = self.bounds.take().unwrap_or_else(|| self.span(sequence));
        self.visit_rules(&sequence.rules, Joiner::Sequence, bounds);
    }

    fn visit_alternative(&mut self, alternative: &Alternative) {
        let bounds = self.bounds.take().unwrap_or_else(|| self.span(alternative));
        self.visit_rules(&alternative.rules, Joiner::Alternative, bounds);
    }

    fn visit_group(&mut self, group: &Group) {
        let span = self.span(group);
        // skip the opening parenthesis
        let inner = (span.start + 1).min(span.end)..span.end;
        match group.rule.as_deref() {
            Some(rule @ (Rule::Sequence(_) | Rule::Alternative(_))) => {
                self.bounds = Some(inner);
                rule.accept(self);
            }
            Some(rule) => self.visit_rules(std::slice::from_ref(rule), Joiner::Sequence, inner),
            None => {
                self.code.clear();
                self.split = false;
            }
        }
        self.code = if self.split {
            format!("(\n{}\n)", indent_lines(&self.code, self.indent_size))
        } else {
            format!("({})", self.code)
        };
        self.trailing.clear();
    }

    fn visit_repetition(&mut self, repetition: &Repetition) {
        let span = self.span(repetition);
        self.visit_postfix(repetition.rule.as_deref(), span, "*");
    }

    fn visit_optional(&mut self, optional: &Optional) {
        let span = self.span(optional);
        self.visit_postfix(optional.rule.as_deref(), span, "?");
    }

    fn visit_label(&mut self, label: &Label) {
        let span = self.span(label);
        let name = label.label.as_ref().map_or("", |l| self.text(l));
        match label.rule.as_deref() {
            Some(rule) => {
                let rule_span = self.span(rule);
                let mut trailing = self.comments_between(span.start, rule_span.start);
                self.bounds = None;
                rule.accept(self);
                trailing.append(&mut self.trailing);
                trailing.extend(self.comments_between(rule_span.end, span.end));
                self.code = format!("{name}:{}", self.code);
                self.trailing = trailing;
            }
            None => {
                self.code = format!("{name}:");
                self.trailing = self.comments_between(span.start, span.end);
            }
        }
    }

    fn visit_identifier(&mut self, identifier: &Identifier) {
        self.code = self.text(identifier).to_string();
        self.trailing.clear();
    }

    fn visit_token(&mut self, token: &Token) {
        self.code = self.text(token).to_string();
        self.trailing.clear();
    }
}

fn indent_lines(text: &str, size: usize) -> String {
    text.split('\n')
        .map(|line| format!("{:size$}{line}", ""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent a rule under its definition, keeping `| ` continuations two columns to the left
fn indent_definition(text: &str, size: usize) -> String {
    text.split('\n')
        .map(|line| {
            let width = if line.trim_start().starts_with('|') {
                size.saturating_sub(2)
            } else {
                size
            };
            format!("{:width$}{line}", "")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
