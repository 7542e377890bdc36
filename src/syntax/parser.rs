//! Tree-sitter parser state
//!
//! Owns one parser per grammar and caches the last tree per buffer so
//! re-parses after an edit are incremental.

use std::collections::HashMap;

use tree_sitter::{InputEdit, Parser, Point, Tree};

use super::languages::LanguageId;
use crate::error::DefmarkError;
use crate::host::BufferId;

/// Produces syntax trees on demand
///
/// Implementations may return a stale tree or fail outright; callers treat
/// failure as "no definitions found".
pub trait SyntaxProvider {
    fn parse(
        &mut self,
        buffer: BufferId,
        source: &str,
        language: LanguageId,
    ) -> Result<Tree, DefmarkError>;

    /// Drop any cached state for a closed buffer
    fn forget(&mut self, buffer: BufferId);
}

/// Last successful parse of a buffer
struct CachedTree {
    language: LanguageId,
    tree: Tree,
    source: String,
}

/// Convert a byte offset to a tree-sitter Point (row, column in bytes)
fn byte_to_point(text: &str, byte_offset: usize) -> Point {
    let prefix = &text.as_bytes()[..byte_offset.min(text.len())];
    let row = prefix.iter().filter(|&&b| b == b'\n').count();
    let column = match prefix.iter().rposition(|&b| b == b'\n') {
        Some(nl) => prefix.len() - nl - 1,
        None => prefix.len(),
    };
    Point { row, column }
}

/// Diff two sources into the single edit that turns `old_src` into `new_src`.
/// Returns None if they are identical.
fn diff_to_edit(old_src: &str, new_src: &str) -> Option<InputEdit> {
    if old_src == new_src {
        return None;
    }

    let old_bytes = old_src.as_bytes();
    let new_bytes = new_src.as_bytes();

    let start = old_bytes
        .iter()
        .zip(new_bytes)
        .take_while(|(a, b)| a == b)
        .count();

    // Common suffix, not overlapping the prefix
    let max_suffix = old_bytes.len().min(new_bytes.len()) - start;
    let suffix = old_bytes
        .iter()
        .rev()
        .zip(new_bytes.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let old_end = old_bytes.len() - suffix;
    let new_end = new_bytes.len() - suffix;

    Some(InputEdit {
        start_byte: start,
        old_end_byte: old_end,
        new_end_byte: new_end,
        start_position: byte_to_point(old_src, start),
        old_end_position: byte_to_point(old_src, old_end),
        new_end_position: byte_to_point(new_src, new_end),
    })
}

/// Parsers and per-buffer tree cache (tree-sitter parsers are !Sync)
#[derive(Default)]
pub struct ParserState {
    parsers: HashMap<LanguageId, Parser>,
    cache: HashMap<BufferId, CachedTree>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser for a language, created on first use
    fn parser_for(&mut self, language: LanguageId) -> Result<&mut Parser, DefmarkError> {
        if !self.parsers.contains_key(&language) {
            let grammar = language
                .grammar()
                .ok_or_else(|| DefmarkError::ParserUnavailable {
                    language,
                    reason: "no grammar bundled".to_string(),
                })?;

            let mut parser = Parser::new();
            parser
                .set_language(&grammar)
                .map_err(|e| DefmarkError::ParserUnavailable {
                    language,
                    reason: e.to_string(),
                })?;
            self.parsers.insert(language, parser);
        }

        self.parsers
            .get_mut(&language)
            .ok_or_else(|| DefmarkError::ParserUnavailable {
                language,
                reason: "parser missing after initialisation".to_string(),
            })
    }

    /// Number of buffers with a cached tree
    pub fn cached_buffers(&self) -> usize {
        self.cache.len()
    }
}

impl SyntaxProvider for ParserState {
    fn parse(
        &mut self,
        buffer: BufferId,
        source: &str,
        language: LanguageId,
    ) -> Result<Tree, DefmarkError> {
        // Take the cached tree out so the parser can be borrowed mutably
        let mut previous = self
            .cache
            .remove(&buffer)
            .filter(|cached| cached.language == language);

        if let Some(cached) = previous.take_if(|cached| cached.source == source) {
            tracing::trace!("Source unchanged for buffer {}, reusing tree", buffer);
            let tree = cached.tree.clone();
            self.cache.insert(buffer, cached);
            return Ok(tree);
        }

        let old_tree = previous.as_mut().and_then(|cached| {
            let edit = diff_to_edit(&cached.source, source)?;
            tracing::trace!(
                "Incremental parse of buffer {}: bytes {}..{} -> {}..{}",
                buffer,
                edit.start_byte,
                edit.old_end_byte,
                edit.start_byte,
                edit.new_end_byte
            );
            cached.tree.edit(&edit);
            Some(&cached.tree)
        });

        let parser = self.parser_for(language)?;
        let tree = match parser.parse(source, old_tree) {
            Some(tree) => tree,
            None if old_tree.is_some() => {
                tracing::warn!(
                    "Incremental parse failed for buffer {}, falling back to full parse",
                    buffer
                );
                parser
                    .parse(source, None)
                    .ok_or_else(|| DefmarkError::ParserUnavailable {
                        language,
                        reason: "parse failed".to_string(),
                    })?
            }
            None => {
                return Err(DefmarkError::ParserUnavailable {
                    language,
                    reason: "parse failed".to_string(),
                })
            }
        };

        self.cache.insert(
            buffer,
            CachedTree {
                language,
                tree: tree.clone(),
                source: source.to_owned(),
            },
        );
        Ok(tree)
    }

    fn forget(&mut self, buffer: BufferId) {
        self.cache.remove(&buffer);
    }
}
