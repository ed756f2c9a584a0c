/// Lexical units of the ungrammar notation.
/// Tokens refer to the source by byte range and carry no text of their own.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,

    // Punctuation
    Assign,     // =
    Colon,      // :
    Pipe,       // |
    Star,       // *
    Question,   // ?
    ParenBegin, // (
    ParenEnd,   // )

    // Pieces of a quoted token, always adjacent to each other
    LiteralStart, // opening '
    LiteralText,
    InvalidEscape,
    LiteralEnd, // closing '

    // Trivia (whitespace and comments)
    Whitespace,
    LineBreak,
    WhitespaceR,
    SingleLineComment,

    // Special
    Error, // Unrecognized run of characters
    Eof,
}

impl TokenKind {
    /// Trivia never takes part in parsing decisions, but it stays in the tree.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineBreak
                | TokenKind::WhitespaceR
                | TokenKind::SingleLineComment
        )
    }

    /// Punctuation and benign trivia that the typed builder does not claim.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineBreak
                | TokenKind::SingleLineComment
                | TokenKind::Assign
                | TokenKind::Colon
                | TokenKind::Pipe
                | TokenKind::Star
                | TokenKind::Question
                | TokenKind::ParenBegin
                | TokenKind::ParenEnd
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Pipe => write!(f, "|"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Question => write!(f, "?"),
            TokenKind::ParenBegin => write!(f, "("),
            TokenKind::ParenEnd => write!(f, ")"),
            TokenKind::LiteralStart => write!(f, "literal_start"),
            TokenKind::LiteralText => write!(f, "literal_text"),
            TokenKind::InvalidEscape => write!(f, "invalid_escape"),
            TokenKind::LiteralEnd => write!(f, "literal_end"),
            TokenKind::Whitespace => write!(f, "whitespace"),
            TokenKind::LineBreak => write!(f, "linebreak"),
            TokenKind::WhitespaceR => write!(f, "whitespace_r"),
            TokenKind::SingleLineComment => write!(f, "single_line_comment"),
            TokenKind::Error => write!(f, "error"),
            TokenKind::Eof => write!(f, "eof"),
        }
    }
}

/// A lexed token, `start` and `length` in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub length: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, length: usize) -> Self {
        Self {
            kind,
            start,
            length,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end()).unwrap_or("")
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}
