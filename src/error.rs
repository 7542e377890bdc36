//! Error taxonomy for marker placement
//!
//! Nothing here is fatal to the host. Every variant maps to a degraded
//! outcome ("fewer or no markers shown") plus a warning.

use crate::host::BufferId;
use crate::syntax::LanguageId;

/// Errors surfaced by the locator, overlay manager, scheduler and config loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefmarkError {
    /// No parser for the language, or the parse itself failed
    ParserUnavailable {
        language: LanguageId,
        reason: String,
    },
    /// The buffer was closed or is otherwise unusable
    InvalidBuffer(BufferId),
    /// The host overlay primitive rejected a line
    OverlayPlacementFailed { line: usize, reason: String },
    /// A configuration field had the wrong type or an unknown value
    InvalidConfiguration { field: String, reason: String },
    /// Enabling was refused because the buffer is not in the target language
    LanguageMismatch {
        detected: LanguageId,
        target: LanguageId,
    },
}

impl std::fmt::Display for DefmarkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefmarkError::ParserUnavailable { language, reason } => {
                write!(
                    f,
                    "Parser unavailable for {}: {}",
                    language.display_name(),
                    reason
                )
            }
            DefmarkError::InvalidBuffer(buffer) => write!(f, "Invalid buffer: {}", buffer),
            DefmarkError::OverlayPlacementFailed { line, reason } => {
                write!(f, "Overlay placement failed at line {}: {}", line, reason)
            }
            DefmarkError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            DefmarkError::LanguageMismatch { detected, target } => write!(
                f,
                "Buffer language is {}, expected {}",
                detected.display_name(),
                target.display_name()
            ),
        }
    }
}

impl std::error::Error for DefmarkError {}
