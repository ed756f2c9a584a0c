use std::collections::HashSet;
use std::ops::Range as Span;

use tower_lsp::lsp_types::*;
use ungrammar_lang::UngramDocument;
use ungrammar_lang::parser::{SyntaxKind, SyntaxNodeId, TokenKind};
use ungrammar_lang::text_document::TextDocument;

use super::offset_of;

pub fn semantic_token_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: vec![
            SemanticTokenType::COMMENT,  // 0: // comments
            SemanticTokenType::OPERATOR, // 1: = | * ?
            SemanticTokenType::VARIABLE, // 2: rule names
            SemanticTokenType::STRING,   // 3: 'quoted tokens'
            SemanticTokenType::PROPERTY, // 4: label names
        ],
        token_modifiers: vec![SemanticTokenModifier::DEFINITION],
    }
}

// Token type indices
pub const COMMENT: u32 = 0;
pub const OPERATOR: u32 = 1;
pub const VARIABLE: u32 = 2;
pub const STRING: u32 = 3;
pub const PROPERTY: u32 = 4;

// Token modifier bits
pub const DEFINITION: u32 = 1 << 0;

pub struct SemanticTokensBuilder {
    /// The list of tokens encoded as 5-tuples of integers
    data: Vec<u32>,
    /// Previous token's line number for delta encoding
    prev_line: u32,
    /// Previous token's character offset for delta encoding
    prev_char: u32,
}

impl Default for SemanticTokensBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticTokensBuilder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            prev_line: 0,
            prev_char: 0,
        }
    }

    pub fn push(&mut self, line: u32, start_char: u32, length: u32, token_type: u32, token_modifiers: u32) {
        let delta_line = line - self.prev_line;
        let delta_char = if delta_line == 0 {
            start_char - self.prev_char
        } else {
            start_char
        };

        self.data
            .extend_from_slice(&[delta_line, delta_char, length, token_type, token_modifiers]);

        self.prev_line = line;
        self.prev_char = start_char;
    }

    pub fn build(self) -> SemanticTokens {
        let tokens = self
            .data
            .chunks(5)
            .map(|chunk| SemanticToken {
                delta_line: chunk[0],
                delta_start: chunk[1],
                length: chunk[2],
                token_type: chunk[3],
                token_modifiers_bitset: chunk[4],
            })
            .collect();

        SemanticTokens {
            result_id: None,
            data: tokens,
        }
    }
}

struct Classifier<'a> {
    ungram: &'a UngramDocument,
    declarations: HashSet<SyntaxNodeId>,
    uses: HashSet<SyntaxNodeId>,
}

impl<'a> Classifier<'a> {
    fn new(ungram: &'a UngramDocument) -> Self {
        let flatten = |map: &ungrammar_lang::index::NameMap| {
            map.iter()
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect::<HashSet<_>>()
        };
        Self {
            ungram,
            declarations: flatten(ungram.definitions()),
            uses: flatten(ungram.identifiers()),
        }
    }

    /// Type and modifiers of an element, `None` when it is not highlighted
    fn classify(&self, id: SyntaxNodeId) -> Option<(u32, u32)> {
        let tree = self.ungram.tree();
        let parent = tree.parent(id);
        let parent_kind = parent.and_then(|p| tree.kind(p));
        if parent_kind.is_some_and(SyntaxKind::is_error) {
            return None;
        }
        if tree.kind(id) == Some(SyntaxKind::Token) {
            return Some((STRING, 0));
        }
        match tree.token_kind(id)? {
            TokenKind::SingleLineComment => Some((COMMENT, 0)),
            TokenKind::Assign | TokenKind::Pipe | TokenKind::Star | TokenKind::Question => {
                Some((OPERATOR, 0))
            }
            TokenKind::Ident if parent_kind == Some(SyntaxKind::Identifier) => {
                let identifier = parent?;
                if self.declarations.contains(&identifier) {
                    Some((VARIABLE, DEFINITION))
                } else if self.uses.contains(&identifier) {
                    Some((VARIABLE, 0))
                } else if tree.parent(identifier).and_then(|p| tree.kind(p)) == Some(SyntaxKind::Label) {
                    Some((PROPERTY, 0))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

fn collect(document: &TextDocument, ungram: &UngramDocument, span: Option<Span<usize>>) -> SemanticTokens {
    let tree = ungram.tree();
    let classifier = Classifier::new(ungram);
    let mut builder = SemanticTokensBuilder::new();

    for id in tree.descendants(tree.root()) {
        let range = tree.range(id);
        if range.is_empty() {
            continue;
        }
        // pieces of a quoted token are covered by the token itself
        if tree.parent(id).and_then(|p| tree.kind(p)) == Some(SyntaxKind::Token) {
            continue;
        }
        if let Some(span) = &span
            && (range.end <= span.start || range.start >= span.end)
        {
            continue;
        }
        let Some((token_type, modifiers)) = classifier.classify(id) else {
            continue;
        };
        let start = document.position_at(range.start);
        let length = ungram.node_text(id).encode_utf16().count() as u32;
        builder.push(start.line, start.character, length, token_type, modifiers);
    }

    builder.build()
}

/// Highlighting of the whole document
pub fn semantic_tokens_full(document: &TextDocument, ungram: &UngramDocument) -> SemanticTokens {
    collect(document, ungram, None)
}

/// Highlighting of the elements overlapping `range`
pub fn semantic_tokens_range(
    document: &TextDocument,
    ungram: &UngramDocument,
    range: Range,
) -> SemanticTokens {
    let span = offset_of(document, range.start)..offset_of(document, range.end);
    collect(document, ungram, Some(span))
}
