//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use defmark::event::Cmd;
use defmark::host::BufferSource;
use defmark::{BufferId, Event, MemoryHost, PluginConfig, RefreshEvent, Scheduler};

pub fn function_rule() -> String {
    "~".repeat(100)
}

pub fn class_rule() -> String {
    "#".repeat(100)
}

/// Config with inline refreshes so every edit is applied immediately
pub fn immediate_config() -> PluginConfig {
    PluginConfig {
        debounce_ms: 0,
        ..PluginConfig::default()
    }
}

/// Config that never auto-enables, with inline refreshes
pub fn manual_config() -> PluginConfig {
    PluginConfig {
        auto_enable: false,
        debounce_ms: 0,
        ..PluginConfig::default()
    }
}

pub fn scheduler(config: PluginConfig) -> Scheduler {
    Scheduler::new(config).unwrap()
}

/// Open a buffer tagged as Python
pub fn open_python(host: &mut MemoryHost, lines: &[&str]) -> BufferId {
    let buffer = host.open(lines);
    host.set_file_type(buffer, Some("python"));
    buffer
}

/// Open a Python buffer and deliver the events a host sends on first display
pub fn enter_python(
    host: &mut MemoryHost,
    scheduler: &mut Scheduler,
    lines: &[&str],
) -> BufferId {
    let buffer = open_python(host, lines);
    assert_eq!(scheduler.handle(host, Event::BufferEntered(buffer)), None);
    assert_eq!(scheduler.handle(host, Event::FileTypeDetected(buffer)), None);
    buffer
}

/// Marker text by line, as the overlay manager sees it
pub fn markers(host: &MemoryHost, scheduler: &Scheduler, buffer: BufferId) -> BTreeMap<usize, String> {
    scheduler.overlays().active_markers(host, buffer)
}

/// Edit and return the deferred refresh the scheduler asked for
pub fn edit(
    host: &mut MemoryHost,
    scheduler: &mut Scheduler,
    buffer: BufferId,
    trigger: RefreshEvent,
) -> Option<Cmd> {
    scheduler.handle(host, Event::Edited(trigger, buffer))
}

/// Deliver a deferred refresh as if its timer fired
pub fn fire(host: &mut MemoryHost, scheduler: &mut Scheduler, cmd: &Cmd) {
    assert_eq!(scheduler.handle(host, cmd.due_event()), None);
}

pub fn assert_delay(cmd: &Cmd, ms: u64) {
    assert_eq!(cmd.delay(), Duration::from_millis(ms));
}

pub fn text(host: &MemoryHost, buffer: BufferId) -> String {
    host.text(buffer).unwrap_or_default()
}
