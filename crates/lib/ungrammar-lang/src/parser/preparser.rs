/// Pre-parser separating trivia from syntax tokens
/// Produces the index sequence of significant tokens the CST parser walks over
use super::token::Token;
use std::ops::Range;

/// Pre-parsed result with non-trivia token indices
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PreParsedTokens {
    /// Indices into the original token array for non-trivia tokens, `Eof` included
    pub token_indices: Vec<usize>,
}

impl PreParsedTokens {
    /// Get the non-trivia token at the given index
    pub fn get_token<'a>(&self, idx: usize, tokens: &'a [Token]) -> Option<&'a Token> {
        self.token_indices.get(idx).and_then(|&i| tokens.get(i))
    }

    /// Raw token indices of the trivia run in front of the significant token `idx`
    pub fn leading_trivia(&self, idx: usize) -> Range<usize> {
        let end = self.token_indices.get(idx).copied().unwrap_or(0);
        let start = match idx.checked_sub(1) {
            Some(prev) => self.token_indices.get(prev).map_or(end, |&i| i + 1),
            None => 0,
        };
        start..end
    }

    pub fn len(&self) -> usize {
        self.token_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_indices.is_empty()
    }
}

/// Pre-parse tokens, keeping the positions of everything that is not trivia
pub fn preparse(tokens: &[Token]) -> PreParsedTokens {
    let token_indices = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.is_trivia())
        .map(|(i, _)| i)
        .collect();
    PreParsedTokens { token_indices }
}
