//! Host editor ports
//!
//! The core never talks to a concrete editor. It sees buffers, overlays and
//! notifications only through the traits below, which an adapter implements
//! for a real host. [`memory::MemoryHost`] is the in-process adapter used by
//! the CLI and the tests.

pub mod memory;

use std::path::PathBuf;

use crate::error::DefmarkError;
use crate::syntax::LanguageId;

pub use memory::MemoryHost;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque identifier for one open buffer (allocated by the host)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Groups overlays so they can be cleared together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceId(pub u32);

/// Handle returned by the host for a placed overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// One overlay as reported back by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayEntry {
    pub id: OverlayId,
    pub buffer: BufferId,
    pub line: usize,
    pub text: String,
    pub style: String,
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}

// ============================================================================
// Ports
// ============================================================================

/// Read-only access to buffer text and metadata
pub trait BufferSource {
    /// Whether the buffer is still open
    fn is_valid(&self, buffer: BufferId) -> bool;

    /// Content of a single line without its terminator, `None` past the end
    fn line(&self, buffer: BufferId, line: usize) -> Option<String>;

    /// Full buffer text (lines joined with `\n`)
    fn text(&self, buffer: BufferId) -> Option<String>;

    /// Explicit file-type tag, if the host assigned one
    fn file_type(&self, buffer: BufferId) -> Option<String>;

    /// Backing file path, if any
    fn path(&self, buffer: BufferId) -> Option<PathBuf>;

    /// Detected language: file-type tag, then extension, then shebang
    fn language(&self, buffer: BufferId) -> LanguageId {
        let file_type = self.file_type(buffer);
        let path = self.path(buffer);
        let first_line = self.line(buffer, 0);
        LanguageId::detect(file_type.as_deref(), path.as_deref(), first_line.as_deref())
    }
}

/// Non-destructive overlay primitive
pub trait OverlayStore {
    fn set_overlay(
        &mut self,
        buffer: BufferId,
        namespace: NamespaceId,
        line: usize,
        text: &str,
        style: &str,
    ) -> Result<OverlayId, DefmarkError>;

    /// Remove a single overlay; returns false if it did not exist
    fn remove_overlay(&mut self, buffer: BufferId, namespace: NamespaceId, id: OverlayId)
        -> bool;

    fn clear_namespace(&mut self, buffer: BufferId, namespace: NamespaceId);

    fn list_overlays(&self, buffer: BufferId, namespace: NamespaceId) -> Vec<OverlayEntry>;
}

/// Informational messages shown to the user (never blocking)
pub trait Notifier {
    fn notify(&mut self, level: NotifyLevel, message: &str);
}

/// Everything the scheduler needs from the host
pub trait Host: BufferSource + OverlayStore + Notifier {}

impl<T: BufferSource + OverlayStore + Notifier> Host for T {}
