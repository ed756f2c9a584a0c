//! Lossless parsing of ungrammar sources.
//!
//! Text is tokenized with a chumsky lexer, trivia is set aside by the
//! pre-parser and a hand-written recursive descent parser builds a green
//! tree, which is then laid out as a positioned [`SyntaxTree`].
pub mod cst_parser;
pub mod fragment;
pub mod green;
pub mod lexer;
pub mod preparser;
pub mod red;
pub mod token;

pub use cst_parser::ParsedCst;
pub use fragment::{ChangedRange, Fragment};
pub use green::{GreenNodeArena, GreenNodeId, SyntaxKind};
pub use red::{SyntaxElement, SyntaxNodeId, SyntaxTree};
pub use token::{Token, TokenKind};

/// Parse `source` from scratch
pub fn parse_to_cst(source: &str) -> (SyntaxTree, ParsedCst) {
    let tokens = lexer::tokenize(source);
    let preparsed = preparser::preparse(&tokens);
    let parsed = cst_parser::parse_cst(tokens, &preparsed);
    let tree = SyntaxTree::new(&parsed.arena, parsed.root);
    (tree, parsed)
}

/// Parse `source` into `arena`, splicing in the still valid `fragments` of an earlier parse
pub fn reparse_to_cst(
    source: &str,
    arena: GreenNodeArena,
    fragments: Vec<Fragment>,
) -> (SyntaxTree, ParsedCst) {
    let tokens = lexer::tokenize(source);
    let preparsed = preparser::preparse(&tokens);
    let parsed = cst_parser::reparse_cst(tokens, &preparsed, arena, fragments);
    let tree = SyntaxTree::new(&parsed.arena, parsed.root);
    (tree, parsed)
}
