//! Definition site location
//!
//! Runs one tree-sitter query per target kind over a freshly parsed tree
//! and reports the 0-based line each match starts on. Nothing is cached
//! between calls; the syntax provider is free to reuse trees internally.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor, Tree};

use crate::error::DefmarkError;
use crate::host::{BufferId, BufferSource};
use crate::syntax::{LanguageId, SyntaxProvider};

/// Kind of structural definition a marker can precede
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Function,
    /// A function wrapped together with its decorator lines
    DecoratedFunction,
    Class,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 3] = [
        DefinitionKind::Function,
        DefinitionKind::DecoratedFunction,
        DefinitionKind::Class,
    ];

    /// Python query matching this kind; every pattern captures `@definition`
    ///
    /// A decorated class is anchored at its first decorator, like a
    /// decorated function, but keeps the class marker.
    fn python_query(&self) -> &'static str {
        match self {
            DefinitionKind::Function => "(function_definition) @definition",
            DefinitionKind::DecoratedFunction => {
                "(decorated_definition definition: (function_definition)) @definition"
            }
            DefinitionKind::Class => {
                "(class_definition) @definition
                 (decorated_definition definition: (class_definition)) @definition"
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DefinitionKind::Function => "function",
            DefinitionKind::DecoratedFunction => "decorated function",
            DefinitionKind::Class => "class",
        }
    }
}

/// A located definition: its kind and the line it starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefinitionSite {
    pub kind: DefinitionKind,
    pub anchor_line: usize,
}

/// Compiled queries for the target grammar
pub struct Locator {
    language: LanguageId,
    queries: Vec<(DefinitionKind, Query)>,
}

impl std::fmt::Debug for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locator")
            .field("language", &self.language)
            .field(
                "kinds",
                &self.queries.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Locator {
    /// Compile queries for `kinds` against the language's grammar
    pub fn new(language: LanguageId, kinds: &[DefinitionKind]) -> Result<Self, DefmarkError> {
        let grammar = language
            .grammar()
            .ok_or_else(|| DefmarkError::ParserUnavailable {
                language,
                reason: "no grammar bundled".to_string(),
            })?;

        let mut queries = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let query = Query::new(&grammar, kind.python_query()).map_err(|e| {
                DefmarkError::ParserUnavailable {
                    language,
                    reason: format!("query for {} failed to compile: {:?}", kind.label(), e),
                }
            })?;
            queries.push((kind, query));
        }

        Ok(Self { language, queries })
    }

    /// Locator for every definition kind in Python
    pub fn python() -> Result<Self, DefmarkError> {
        Self::new(LanguageId::Python, &DefinitionKind::ALL)
    }

    /// The language this locator's queries were compiled for
    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Collect sites from an already parsed tree, kind by kind
    pub fn sites_in_tree(&self, tree: &Tree, source: &str) -> Vec<DefinitionSite> {
        let mut sites = Vec::new();
        let mut cursor = QueryCursor::new();

        for (kind, query) in &self.queries {
            let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());
            while let Some(query_match) = matches.next() {
                for capture in query_match.captures {
                    sites.push(DefinitionSite {
                        kind: *kind,
                        anchor_line: capture.node.start_position().row,
                    });
                }
            }
        }

        sites
    }

    /// Parse the buffer and locate every definition site
    ///
    /// `ParserUnavailable` means "no sites"; callers recover from it.
    pub fn locate<H, P>(
        &self,
        host: &H,
        provider: &mut P,
        buffer: BufferId,
    ) -> Result<Vec<DefinitionSite>, DefmarkError>
    where
        H: BufferSource + ?Sized,
        P: SyntaxProvider + ?Sized,
    {
        let source = host
            .text(buffer)
            .ok_or(DefmarkError::InvalidBuffer(buffer))?;
        let tree = provider.parse(buffer, &source, self.language)?;
        let sites = self.sites_in_tree(&tree, &source);

        tracing::trace!("Located {} definition sites in buffer {}", sites.len(), buffer);
        Ok(sites)
    }
}
