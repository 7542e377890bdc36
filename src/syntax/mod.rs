//! Syntax trees for marker placement
//!
//! Provides tree-sitter parsing with:
//! - Language detection from file-type tags, extensions and shebangs
//! - Incremental re-parsing with a per-buffer tree cache
//!
//! Only Python ships a grammar. Other languages are detected so that
//! enabling markers on them can be refused.

mod languages;
mod parser;

pub use languages::LanguageId;
pub use parser::{ParserState, SyntaxProvider};
