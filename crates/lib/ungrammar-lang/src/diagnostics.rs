//! Problems derived from unknown nodes and from the indices.
use crate::document::UngramDocument;
use crate::parser::{SyntaxKind, SyntaxNodeId, TokenKind};
use crate::text_document::{Range, TextDocument};
use crate::utils::error::ReportableError;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unexpected = 0,
    UnexpectedWhitespaceR = 1,
    InvalidEscape = 2,
    Missing = 100,
    NodeChildExpected = 101,
    EndOfTokenExpected = 102,
    EndOfGroupExpected = 103,
    DefinitionExpected = 104,
    RedeclaredDefinition = 200,
    UndefinedIdentifier = 201,
}

impl ErrorCode {
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// A problem at a byte range of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub code: ErrorCode,
    pub span: std::ops::Range<usize>,
}

/// A problem with its message and position, always of error severity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub range: Range,
    pub span: std::ops::Range<usize>,
}

impl ReportableError for Diagnostic {
    fn get_labels(&self) -> Vec<(std::ops::Range<usize>, String)> {
        vec![(self.span.clone(), self.message.clone())]
    }
}

fn classify(doc: &UngramDocument, unknown: SyntaxNodeId) -> ErrorCode {
    let tree = doc.tree();
    let parent_kind = |id: SyntaxNodeId| tree.parent(id).and_then(|p| tree.kind(p));
    match (tree.token_kind(unknown), tree.kind(unknown)) {
        (Some(TokenKind::InvalidEscape), _) => ErrorCode::InvalidEscape,
        (Some(TokenKind::WhitespaceR), _) => ErrorCode::UnexpectedWhitespaceR,
        (_, Some(SyntaxKind::UnclosedToken)) => ErrorCode::EndOfTokenExpected,
        (_, Some(SyntaxKind::UnclosedGroup)) => ErrorCode::EndOfGroupExpected,
        _ if tree.range(unknown).is_empty() => match parent_kind(unknown) {
            Some(SyntaxKind::Node) => ErrorCode::NodeChildExpected,
            Some(SyntaxKind::Identifier)
                if tree
                    .parent(unknown)
                    .is_some_and(|p| parent_kind(p) == Some(SyntaxKind::Node)) =>
            {
                ErrorCode::DefinitionExpected
            }
            _ => ErrorCode::Missing,
        },
        _ => ErrorCode::Unexpected,
    }
}

fn syntax_problems(doc: &UngramDocument) -> impl Iterator<Item = Problem> + '_ {
    doc.unknowns().iter().map(|&unknown| Problem {
        code: classify(doc, unknown),
        span: doc.tree().range(unknown),
    })
}

fn undefined_identifier_problems(doc: &UngramDocument) -> impl Iterator<Item = Problem> + '_ {
    doc.identifiers()
        .iter()
        .filter(|(name, _)| !doc.definitions().contains(name))
        .flat_map(|(_, ids)| ids.iter())
        .map(|&id| Problem {
            code: ErrorCode::UndefinedIdentifier,
            span: doc.tree().range(id),
        })
}

fn redeclared_definition_problems(doc: &UngramDocument) -> impl Iterator<Item = Problem> + '_ {
    doc.definitions()
        .iter()
        .filter(|(_, ids)| ids.len() > 1)
        .flat_map(|(_, ids)| ids.iter())
        .map(|&id| Problem {
            code: ErrorCode::RedeclaredDefinition,
            span: doc.tree().range(id),
        })
}

/// Syntax problems, then undefined identifiers, then redeclarations
pub fn get_problems(doc: &UngramDocument) -> Vec<Problem> {
    syntax_problems(doc)
        .chain(undefined_identifier_problems(doc))
        .chain(redeclared_definition_problems(doc))
        .collect()
}

fn escape_line_endings(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            c => c.to_string(),
        })
        .collect()
}

pub fn problem_message(doc: &UngramDocument, problem: &Problem) -> String {
    let text = doc.text().get(problem.span.clone()).unwrap_or("");
    match problem.code {
        ErrorCode::InvalidEscape => format!("Unexpected escape `{text}`."),
        ErrorCode::UnexpectedWhitespaceR => format!(
            "Unexpected `{}`, only Unix-style line endings allowed.",
            escape_line_endings(text)
        ),
        ErrorCode::EndOfTokenExpected => "Expected an end of token `'`.".to_string(),
        ErrorCode::EndOfGroupExpected => "Expected an end of group `)`.".to_string(),
        ErrorCode::DefinitionExpected => "Expected an Definition".to_string(),
        ErrorCode::NodeChildExpected => {
            "Missing something. Maybe Identifier, `=`, or Rule".to_string()
        }
        ErrorCode::Missing => "Missing something.".to_string(),
        ErrorCode::Unexpected => format!("Unexpected `{text}`"),
        ErrorCode::RedeclaredDefinition => format!("Cannot redeclare '{text}'."),
        ErrorCode::UndefinedIdentifier => format!("Cannot find name '{text}'."),
    }
}

/// Diagnostics for a document, without duplicates at the same start and message
pub fn validate(document: &TextDocument, doc: &UngramDocument) -> Vec<Diagnostic> {
    let mut seen = HashSet::new();
    get_problems(doc)
        .into_iter()
        .map(|problem| Diagnostic {
            code: problem.code,
            message: problem_message(doc, &problem),
            range: document.range_of(problem.span.clone()),
            span: problem.span,
        })
        .filter(|d| seen.insert(format!("{} {} {}", d.range.start.line, d.range.start.character, d.message)))
        .collect()
}

/// Diagnostics as boxed reportable errors, for rendering with `ariadne`
pub fn reportable(diagnostics: Vec<Diagnostic>) -> Vec<Box<dyn ReportableError>> {
    diagnostics
        .into_iter()
        .map(|d| Box::new(d) as Box<dyn ReportableError>)
        .collect()
}
