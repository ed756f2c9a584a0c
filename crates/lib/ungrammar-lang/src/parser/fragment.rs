/// Reuse fragments for incremental reparsing
///
/// Every top-level definition of a parse is remembered together with the
/// stretch of text its shape depended on. After an edit, fragments whose
/// text is untouched are shifted into the coordinates of the new text and
/// handed to the parser, which splices their green subtrees in place of
/// parsing the same tokens again.
use super::green::GreenNodeId;

/// A reusable top-level subtree of a previous parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub green: GreenNodeId,
    /// Byte offset of the first token of the definition
    pub from: usize,
    /// Byte offset just past the last token of the definition
    pub to: usize,
    /// End of the text the parser looked at to decide where the definition stops
    pub lookahead_to: usize,
}

impl Fragment {
    /// Whether the decision about the end of the definition depended on end of input
    pub fn reaches_eof(&self, text_len: usize) -> bool {
        self.lookahead_to >= text_len
    }
}

/// A replaced byte range, `from_a..to_a` in the old text became `from_b..to_b` in the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangedRange {
    pub from_a: usize,
    pub to_a: usize,
    pub from_b: usize,
    pub to_b: usize,
}

impl ChangedRange {
    /// Smallest single change turning `old` into `new`, `None` when both are equal.
    pub fn between(old: &str, new: &str) -> Option<Self> {
        if old == new {
            return None;
        }
        let (a, b) = (old.as_bytes(), new.as_bytes());
        let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
        let max_suffix = a.len().min(b.len()) - prefix;
        let suffix = a
            .iter()
            .rev()
            .zip(b.iter().rev())
            .take(max_suffix)
            .take_while(|(x, y)| x == y)
            .count();
        Some(Self {
            from_a: prefix,
            to_a: a.len() - suffix,
            from_b: prefix,
            to_b: b.len() - suffix,
        })
    }

    fn shift(&self) -> isize {
        self.to_b as isize - self.to_a as isize
    }
}

/// Carry fragments across a list of changes.
/// Fragments touched by any change are dropped, the others are moved into
/// the coordinates of the new text. The result stays ordered by `from`.
pub fn apply_changes(fragments: &[Fragment], changes: &[ChangedRange]) -> Vec<Fragment> {
    let mut result = fragments.to_vec();
    for change in changes {
        result = result
            .into_iter()
            .filter_map(|fragment| {
                if fragment.lookahead_to < change.from_a {
                    // end decided by a header in front of the edit
                    Some(fragment)
                } else if fragment.from >= change.to_a {
                    let shift = change.shift();
                    let move_by = |pos: usize| (pos as isize + shift) as usize;
                    Some(Fragment {
                        green: fragment.green,
                        from: move_by(fragment.from),
                        to: move_by(fragment.to),
                        lookahead_to: move_by(fragment.lookahead_to),
                    })
                } else {
                    None
                }
            })
            .collect();
    }
    log::trace!("{} of {} fragments reusable", result.len(), fragments.len());
    result
}
