//! Text buffer with LSP-style positions.
//!
//! Positions count lines from zero and characters in UTF-16 code units.
//! Byte offsets are what the parser and the document model work with.
use ropey::Rope;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

/// An incremental change, or a full replacement when `range` is `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub range: Option<Range>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TextDocument {
    pub uri: String,
    pub version: i32,
    text: String,
    rope: Rope,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, version: i32, text: impl Into<String>) -> Self {
        let text = text.into();
        let rope = Rope::from_str(&text);
        Self {
            uri: uri.into(),
            version,
            text,
            rope,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Byte offset of a position, clamped to the end of its line and to the document
    pub fn offset_at(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.rope.len_lines() {
            return self.rope.len_bytes();
        }
        let line_start = self.rope.line_to_char(line);
        let line_slice = self.rope.line(line);
        let len = line_slice.len_chars();
        let line_break = (0..len)
            .take_while(|i| matches!(line_slice.char(len - 1 - i), '\n' | '\r'))
            .count();
        let content_chars = len - line_break;
        let line_start_cu = self.rope.char_to_utf16_cu(line_start);
        let line_end_cu = self.rope.char_to_utf16_cu(line_start + content_chars);
        let target = (line_start_cu + position.character as usize).min(line_end_cu);
        self.rope.char_to_byte(self.rope.utf16_cu_to_char(target))
    }

    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_bytes());
        let char_idx = self.rope.byte_to_char(offset);
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        let character =
            self.rope.char_to_utf16_cu(char_idx) - self.rope.char_to_utf16_cu(line_start);
        Position::new(line as u32, character as u32)
    }

    pub fn range_of(&self, span: std::ops::Range<usize>) -> Range {
        Range::new(self.position_at(span.start), self.position_at(span.end))
    }

    pub fn get_text(&self, range: Range) -> &str {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end).max(start);
        self.text.get(start..end).unwrap_or("")
    }

    /// Text resulting from applying `edits`, which must not overlap
    pub fn apply_edits(&self, edits: &[TextEdit]) -> String {
        let mut spans = edits
            .iter()
            .map(|edit| {
                let start = self.offset_at(edit.range.start);
                let end = self.offset_at(edit.range.end).max(start);
                (start, end, edit.new_text.as_str())
            })
            .collect::<Vec<_>>();
        spans.sort_by_key(|&(start, end, _)| (start, end));

        let mut result = String::with_capacity(self.text.len());
        let mut last = 0;
        for (start, end, new_text) in spans {
            if start < last {
                log::warn!("overlapping edit at {start} skipped");
                continue;
            }
            result.push_str(&self.text[last..start]);
            result.push_str(new_text);
            last = end;
        }
        result.push_str(&self.text[last..]);
        result
    }

    /// Apply content changes in order and bump the version
    pub fn update(&mut self, changes: &[ContentChange], version: i32) {
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = self.rope.byte_to_char(self.offset_at(range.start));
                    let end = self.rope.byte_to_char(self.offset_at(range.end)).max(start);
                    self.rope.remove(start..end);
                    self.rope.insert(start, &change.text);
                }
                None => self.rope = Rope::from_str(&change.text),
            }
        }
        self.text = self.rope.to_string();
        self.version = version;
    }
}

/// Group replacement edits by document
pub fn get_changes(locations: &[Location], new_text: &str) -> HashMap<String, Vec<TextEdit>> {
    let mut changes: HashMap<String, Vec<TextEdit>> = HashMap::new();
    for location in locations {
        changes
            .entry(location.uri.clone())
            .or_default()
            .push(TextEdit {
                range: location.range,
                new_text: new_text.to_string(),
            });
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_round_trip() {
        let doc = TextDocument::new("test://a", 0, "Foo = 'Bar'\nBar = 'x'");
        assert_eq!(doc.position_at(0), Position::new(0, 0));
        assert_eq!(doc.position_at(12), Position::new(1, 0));
        assert_eq!(doc.offset_at(Position::new(1, 3)), 15);
        assert_eq!(doc.offset_at(doc.position_at(17)), 17);
    }

    #[test]
    fn test_offset_is_clamped() {
        let doc = TextDocument::new("test://a", 0, "ab\ncd");
        assert_eq!(doc.offset_at(Position::new(0, 10)), 2);
        assert_eq!(doc.offset_at(Position::new(7, 0)), 5);
        assert_eq!(doc.position_at(100), Position::new(1, 2));
    }

    #[test]
    fn test_utf16_columns() {
        let doc = TextDocument::new("test://a", 0, "// 𝄞é\nA");
        // U+1D11E takes two UTF-16 code units and four bytes
        assert_eq!(doc.position_at(7), Position::new(0, 5));
        assert_eq!(doc.offset_at(Position::new(0, 5)), 7);
        assert_eq!(doc.get_text(Range::new(Position::new(0, 3), Position::new(0, 6))), "𝄞é");
    }

    #[test]
    fn test_only_lsp_line_breaks_count() {
        let source = "// a\u{2028}b\u{85}c\u{c}\nFoo = Bar\r\nBaz";
        let doc = TextDocument::new("test://a", 0, source);
        let bar = source.find("Bar").unwrap();
        assert_eq!(doc.position_at(bar), Position::new(1, 6));
        let baz = source.find("Baz").unwrap();
        assert_eq!(doc.position_at(baz), Position::new(2, 0));
        assert_eq!(doc.offset_at(Position::new(1, 6)), bar);
        assert_eq!(doc.offset_at(Position::new(1, 100)), bar + 3);
    }

    #[test]
    fn test_incremental_update() {
        let mut doc = TextDocument::new("test://a", 0, "Foo = Bar\nBar = 'x'");
        doc.update(
            &[ContentChange {
                range: Some(Range::new(Position::new(0, 6), Position::new(0, 9))),
                text: "Baz".to_string(),
            }],
            1,
        );
        assert_eq!(doc.text(), "Foo = Baz\nBar = 'x'");
        assert_eq!(doc.version, 1);

        doc.update(
            &[ContentChange {
                range: None,
                text: "A = B".to_string(),
            }],
            2,
        );
        assert_eq!(doc.text(), "A = B");
    }

    #[test]
    fn test_update_applies_changes_in_order() {
        let mut doc = TextDocument::new("test://a", 0, "A = B");
        doc.update(
            &[
                ContentChange {
                    range: Some(Range::new(Position::new(0, 5), Position::new(0, 5))),
                    text: "\nB = 'x'".to_string(),
                },
                ContentChange {
                    range: Some(Range::new(Position::new(1, 5), Position::new(1, 8))),
                    text: "'yy'".to_string(),
                },
                ContentChange {
                    range: Some(Range::new(Position::new(9, 0), Position::new(9, 0))),
                    text: "\n".to_string(),
                },
            ],
            3,
        );
        assert_eq!(doc.text(), "A = B\nB = 'yy'\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.version, 3);
    }

    #[test]
    fn test_apply_edits_and_changes() {
        let doc = TextDocument::new("test://a", 0, "Foo=Bar\nBar='x'");
        let locations = vec![
            Location {
                uri: doc.uri.clone(),
                range: doc.range_of(8..11),
            },
            Location {
                uri: doc.uri.clone(),
                range: doc.range_of(4..7),
            },
        ];
        let changes = get_changes(&locations, "Baz");
        assert_eq!(changes[&doc.uri].len(), 2);
        assert_eq!(doc.apply_edits(&changes[&doc.uri]), "Foo=Baz\nBaz='x'");
    }
}
