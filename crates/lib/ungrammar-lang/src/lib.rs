//! Language tooling core for **ungrammar**, the notation describing the shape of syntax trees.
//!
//! The pipeline runs from text to a lossless concrete syntax tree
//! ([`parser`]), to a typed overlay ([`ast`]), to the analysed
//! [`document::UngramDocument`] with its name indices ([`index`]) and the
//! problems derived from it ([`diagnostics`]). Editing a document reparses
//! it incrementally, reusing untouched definitions of the previous tree.

pub mod ast;
pub mod diagnostics;
pub mod document;
pub mod index;
pub mod parser;
pub mod text_document;
pub mod utils;

pub use document::UngramDocument;
pub use log;
