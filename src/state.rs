//! Per-buffer marker state
//!
//! An explicit store owned by the scheduler. Buffers without an entry are
//! `Disabled`; closing a buffer drops its entry.

use std::collections::HashMap;

use crate::host::BufferId;

/// Whether markers are maintained for a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferState {
    #[default]
    Disabled,
    Enabled,
}

impl BufferState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, BufferState::Enabled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BufferState::Disabled => "disabled",
            BufferState::Enabled => "enabled",
        }
    }
}

/// Everything the scheduler tracks for one buffer
#[derive(Debug, Clone, Default)]
pub struct BufferEntry {
    pub state: BufferState,
    /// Auto-enable has already been attempted for this buffer
    pub auto_enable_attempted: bool,
    /// Generation of the refresh currently waiting on its debounce timer
    pub pending: Option<u64>,
}

/// Per-buffer state table
#[derive(Debug, Default)]
pub struct StateStore {
    entries: HashMap<BufferId, BufferEntry>,
    /// Store-wide counter so a reused buffer id never matches a stale timer
    next_generation: u64,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, buffer: BufferId) -> BufferState {
        self.entries
            .get(&buffer)
            .map(|entry| entry.state)
            .unwrap_or_default()
    }

    pub fn set_state(&mut self, buffer: BufferId, state: BufferState) {
        self.entry_mut(buffer).state = state;
    }

    pub fn get(&self, buffer: BufferId) -> Option<&BufferEntry> {
        self.entries.get(&buffer)
    }

    pub fn get_mut(&mut self, buffer: BufferId) -> Option<&mut BufferEntry> {
        self.entries.get_mut(&buffer)
    }

    pub fn entry_mut(&mut self, buffer: BufferId) -> &mut BufferEntry {
        self.entries.entry(buffer).or_default()
    }

    /// Record a new refresh trigger, superseding any pending one. Returns the
    /// generation the debounce timer must hand back.
    pub fn schedule(&mut self, buffer: BufferId) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.entry_mut(buffer).pending = Some(generation);
        generation
    }

    /// Consume a due refresh. True only if `generation` is the pending one.
    pub fn take_due(&mut self, buffer: BufferId, generation: u64) -> bool {
        match self.entries.get_mut(&buffer) {
            Some(entry) if entry.pending == Some(generation) => {
                entry.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Forget a buffer entirely
    pub fn remove(&mut self, buffer: BufferId) -> Option<BufferEntry> {
        self.entries.remove(&buffer)
    }

    /// Buffers currently enabled, in id order
    pub fn enabled_buffers(&self) -> Vec<BufferId> {
        let mut buffers: Vec<BufferId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.state.is_enabled())
            .map(|(id, _)| *id)
            .collect();
        buffers.sort();
        buffers
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_disabled() {
        let store = StateStore::new();
        assert_eq!(store.state(BufferId(1)), BufferState::Disabled);
        assert!(store.is_empty());
    }

    #[test]
    fn test_latest_generation_wins() {
        let mut store = StateStore::new();
        let buf = BufferId(1);
        let first = store.schedule(buf);
        let second = store.schedule(buf);

        assert!(!store.take_due(buf, first));
        assert!(store.take_due(buf, second));
        // Consumed
        assert!(!store.take_due(buf, second));
    }

    #[test]
    fn test_removed_buffer_drops_pending() {
        let mut store = StateStore::new();
        let buf = BufferId(1);
        let generation = store.schedule(buf);
        store.remove(buf);
        assert!(!store.take_due(buf, generation));
    }

    #[test]
    fn test_enabled_buffers_sorted() {
        let mut store = StateStore::new();
        store.set_state(BufferId(3), BufferState::Enabled);
        store.set_state(BufferId(1), BufferState::Enabled);
        store.set_state(BufferId(2), BufferState::Disabled);
        assert_eq!(store.enabled_buffers(), vec![BufferId(1), BufferId(3)]);
    }
}
