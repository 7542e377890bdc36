//! Headless runtime tests
//!
//! These use real timer threads, so waits are generous.

mod common;

use std::time::Duration;

use common::*;
use defmark::runtime::Runtime;
use defmark::syntax::ParserState;
use defmark::{BufferId, BufferState, CommandId, Event, MemoryHost, PluginConfig, RefreshEvent};

const WAIT: Duration = Duration::from_secs(5);

fn runtime(config: PluginConfig, lines: &[&str]) -> (Runtime<ParserState>, BufferId) {
    let mut host = MemoryHost::new();
    let buffer = open_python(&mut host, lines);
    let mut runtime = Runtime::new(scheduler(config), host);
    runtime.dispatch(Event::BufferEntered(buffer));
    (runtime, buffer)
}

#[test]
fn test_debounced_refresh_lands() {
    let (mut runtime, buffer) = runtime(PluginConfig::default(), &["x = 1"]);

    runtime.host_mut().set_text(buffer, "\ndef f():\n    pass");
    assert!(runtime.dispatch(Event::Edited(RefreshEvent::TextChanged, buffer)));
    assert!(runtime.wait_for_message(WAIT));

    let active = runtime.scheduler().overlays().list_active(runtime.host(), buffer);
    assert_eq!(active.into_iter().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn test_burst_of_edits_refreshes_once() {
    let (mut runtime, buffer) = runtime(PluginConfig::default(), &["x = 1"]);

    runtime.host_mut().set_text(buffer, "\nclass A:\n    pass");
    for _ in 0..5 {
        assert!(runtime.dispatch(Event::Edited(RefreshEvent::TextChangedInsert, buffer)));
    }

    // Every timer fires; only the last one refreshes
    let mut delivered = 0;
    while delivered < 5 && runtime.wait_for_message(WAIT) {
        delivered += 1;
    }
    assert_eq!(delivered, 5);

    let markers = runtime.scheduler().overlays().active_markers(runtime.host(), buffer);
    assert_eq!(markers.get(&0), Some(&class_rule()));
}

#[test]
fn test_commands_run_inline() {
    let (mut runtime, buffer) = runtime(manual_config(), &["", "def f():", "    pass"]);
    assert_eq!(runtime.scheduler().status(buffer), BufferState::Disabled);

    assert!(!runtime.dispatch(Event::Command(CommandId::Enable, buffer)));

    assert_eq!(runtime.scheduler().status(buffer), BufferState::Enabled);
    assert_eq!(runtime.process_async_messages(), 0);
    assert_eq!(runtime.host().render(buffer)[0], function_rule());
}

#[test]
fn test_nothing_pending_times_out() {
    let (mut runtime, _) = runtime(immediate_config(), &["x = 1"]);
    assert!(!runtime.wait_for_message(Duration::from_millis(20)));
}
