//! Marker glyph runs
//!
//! Each definition kind maps to a fixed-width run of one glyph, rendered
//! with the host's comment style.

use crate::locator::DefinitionKind;

/// Number of glyphs in every marker
pub const MARKER_WIDTH: usize = 100;

/// Style tag passed to the overlay primitive
pub const MARKER_STYLE: &str = "comment";

/// Glyph and style for one kind of marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpec {
    pub glyph: char,
    pub style: &'static str,
}

/// Marker drawn above functions (plain and decorated)
pub const FUNCTION_MARKER: MarkerSpec = MarkerSpec {
    glyph: '~',
    style: MARKER_STYLE,
};

/// Marker drawn above classes
pub const CLASS_MARKER: MarkerSpec = MarkerSpec {
    glyph: '#',
    style: MARKER_STYLE,
};

impl MarkerSpec {
    /// Marker for a definition kind
    pub fn for_kind(kind: DefinitionKind) -> Self {
        match kind {
            DefinitionKind::Function | DefinitionKind::DecoratedFunction => FUNCTION_MARKER,
            DefinitionKind::Class => CLASS_MARKER,
        }
    }

    /// The rendered glyph run
    pub fn text(&self) -> String {
        std::iter::repeat(self.glyph).take(MARKER_WIDTH).collect()
    }
}
