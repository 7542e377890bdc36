//! In-memory host adapter
//!
//! Holds buffers as line vectors and overlays in ordered maps. Mirrors the
//! behaviour of an editor extmark API closely enough to drive the scheduler
//! end to end: overlays on lines past the end of the buffer are rejected,
//! and several overlays may share a line (callers keep that invariant).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::{
    BufferId, BufferSource, NamespaceId, Notifier, NotifyLevel, OverlayEntry, OverlayId,
    OverlayStore,
};
use crate::error::DefmarkError;

#[derive(Debug, Clone, Default)]
struct MemoryBuffer {
    lines: Vec<String>,
    file_type: Option<String>,
    path: Option<PathBuf>,
    overlays: HashMap<NamespaceId, BTreeMap<OverlayId, OverlayEntry>>,
}

/// A host that keeps everything in process memory
#[derive(Debug, Default)]
pub struct MemoryHost {
    buffers: HashMap<BufferId, MemoryBuffer>,
    next_buffer: u64,
    next_overlay: u64,
    /// Every notification received, oldest first
    pub notifications: Vec<(NotifyLevel, String)>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scratch buffer with the given lines
    pub fn open(&mut self, lines: &[&str]) -> BufferId {
        let id = self.allocate();
        self.buffers.insert(
            id,
            MemoryBuffer {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                ..Default::default()
            },
        );
        id
    }

    /// Open a buffer from text, splitting on newlines
    pub fn open_text(&mut self, text: &str, path: Option<&Path>) -> BufferId {
        let id = self.allocate();
        self.buffers.insert(
            id,
            MemoryBuffer {
                lines: split_lines(text),
                path: path.map(Path::to_path_buf),
                ..Default::default()
            },
        );
        id
    }

    fn allocate(&mut self) -> BufferId {
        self.next_buffer += 1;
        BufferId(self.next_buffer)
    }

    /// Close (wipe) a buffer, dropping its overlays
    pub fn close(&mut self, buffer: BufferId) -> bool {
        self.buffers.remove(&buffer).is_some()
    }

    pub fn set_file_type(&mut self, buffer: BufferId, file_type: Option<&str>) {
        if let Some(buf) = self.buffers.get_mut(&buffer) {
            buf.file_type = file_type.map(str::to_string);
        }
    }

    pub fn set_path(&mut self, buffer: BufferId, path: Option<&Path>) {
        if let Some(buf) = self.buffers.get_mut(&buffer) {
            buf.path = path.map(Path::to_path_buf);
        }
    }

    /// Replace the whole buffer content
    pub fn set_text(&mut self, buffer: BufferId, text: &str) {
        if let Some(buf) = self.buffers.get_mut(&buffer) {
            buf.lines = split_lines(text);
        }
    }

    /// Replace a single line; appends blank lines if needed
    pub fn set_line(&mut self, buffer: BufferId, line: usize, content: &str) {
        if let Some(buf) = self.buffers.get_mut(&buffer) {
            if line >= buf.lines.len() {
                buf.lines.resize(line + 1, String::new());
            }
            buf.lines[line] = content.to_string();
        }
    }

    /// Insert a line before `line` (or append at the end)
    pub fn insert_line(&mut self, buffer: BufferId, line: usize, content: &str) {
        if let Some(buf) = self.buffers.get_mut(&buffer) {
            let at = line.min(buf.lines.len());
            buf.lines.insert(at, content.to_string());
        }
    }

    pub fn line_count(&self, buffer: BufferId) -> usize {
        self.buffers.get(&buffer).map_or(0, |b| b.lines.len())
    }

    /// Render the buffer with overlays drawn over their lines
    ///
    /// When several namespaces mark the same line the lowest overlay id wins.
    pub fn render(&self, buffer: BufferId) -> Vec<String> {
        let Some(buf) = self.buffers.get(&buffer) else {
            return Vec::new();
        };

        let mut by_line: BTreeMap<usize, &OverlayEntry> = BTreeMap::new();
        for entries in buf.overlays.values() {
            for entry in entries.values() {
                by_line
                    .entry(entry.line)
                    .and_modify(|existing| {
                        if entry.id < existing.id {
                            *existing = entry;
                        }
                    })
                    .or_insert(entry);
            }
        }

        buf.lines
            .iter()
            .enumerate()
            .map(|(idx, line)| match by_line.get(&idx) {
                Some(entry) => entry.text.clone(),
                None => line.clone(),
            })
            .collect()
    }
}

fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    for line in &mut lines {
        if line.ends_with('\r') {
            line.pop();
        }
    }
    // A trailing newline terminates the last line rather than opening a new one
    if lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

impl BufferSource for MemoryHost {
    fn is_valid(&self, buffer: BufferId) -> bool {
        self.buffers.contains_key(&buffer)
    }

    fn line(&self, buffer: BufferId, line: usize) -> Option<String> {
        self.buffers.get(&buffer)?.lines.get(line).cloned()
    }

    fn text(&self, buffer: BufferId) -> Option<String> {
        self.buffers.get(&buffer).map(|b| b.lines.join("\n"))
    }

    fn file_type(&self, buffer: BufferId) -> Option<String> {
        self.buffers.get(&buffer)?.file_type.clone()
    }

    fn path(&self, buffer: BufferId) -> Option<PathBuf> {
        self.buffers.get(&buffer)?.path.clone()
    }
}

impl OverlayStore for MemoryHost {
    fn set_overlay(
        &mut self,
        buffer: BufferId,
        namespace: NamespaceId,
        line: usize,
        text: &str,
        style: &str,
    ) -> Result<OverlayId, DefmarkError> {
        let buf = self
            .buffers
            .get_mut(&buffer)
            .ok_or(DefmarkError::InvalidBuffer(buffer))?;

        if line >= buf.lines.len() {
            return Err(DefmarkError::OverlayPlacementFailed {
                line,
                reason: format!("line out of range (buffer has {} lines)", buf.lines.len()),
            });
        }

        self.next_overlay += 1;
        let id = OverlayId(self.next_overlay);
        buf.overlays.entry(namespace).or_default().insert(
            id,
            OverlayEntry {
                id,
                buffer,
                line,
                text: text.to_string(),
                style: style.to_string(),
            },
        );
        Ok(id)
    }

    fn remove_overlay(
        &mut self,
        buffer: BufferId,
        namespace: NamespaceId,
        id: OverlayId,
    ) -> bool {
        self.buffers
            .get_mut(&buffer)
            .and_then(|b| b.overlays.get_mut(&namespace))
            .is_some_and(|entries| entries.remove(&id).is_some())
    }

    fn clear_namespace(&mut self, buffer: BufferId, namespace: NamespaceId) {
        if let Some(buf) = self.buffers.get_mut(&buffer) {
            buf.overlays.remove(&namespace);
        }
    }

    fn list_overlays(&self, buffer: BufferId, namespace: NamespaceId) -> Vec<OverlayEntry> {
        self.buffers
            .get(&buffer)
            .and_then(|b| b.overlays.get(&namespace))
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryHost {
    fn notify(&mut self, level: NotifyLevel, message: &str) {
        self.notifications.push((level, message.to_string()));
    }
}
