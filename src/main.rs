use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Duration;

use defmark::cli::{CliArgs, Invocation, Mode};
use defmark::fs_watcher::FileWatcher;
use defmark::host::{BufferSource, NotifyLevel};
use defmark::runtime::Runtime;
use defmark::syntax::ParserState;
use defmark::{BufferId, CommandId, Event, MemoryHost, PluginConfig, RefreshEvent, Scheduler};

/// How long a burst of writes may last before the watcher reports it
const WATCH_DEBOUNCE: Duration = Duration::from_millis(100);

/// How often the watch loop wakes to run due refreshes
const WATCH_TICK: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    defmark::tracing::init();

    let invocation = CliArgs::parse()
        .into_invocation()
        .map_err(anyhow::Error::msg)?;

    let config = load_config(&invocation);
    let scheduler = Scheduler::new(config).context("Failed to build the definition locator")?;

    let (host, buffer) = open_file(&invocation.file, invocation.filetype.as_deref())?;
    let mut runtime = Runtime::new(scheduler, host);

    match invocation.mode {
        Mode::Show => {
            enter(&mut runtime, buffer);
            if !runtime.scheduler().status(buffer).is_enabled() {
                runtime.dispatch(Event::Command(CommandId::Enable, buffer));
            }
            print_buffer(&runtime, buffer);
        }
        Mode::Run(commands) => {
            enter(&mut runtime, buffer);
            for command in commands {
                runtime.dispatch(Event::Command(command, buffer));
            }
            print_status(&runtime, buffer);
        }
        Mode::Watch => watch(&mut runtime, buffer, &invocation)?,
    }

    flush_notifications(runtime.host_mut());
    Ok(())
}

fn load_config(invocation: &Invocation) -> PluginConfig {
    match &invocation.config_path {
        Some(path) => {
            let (config, warnings) = PluginConfig::load_from(path);
            for warning in warnings {
                tracing::warn!("{}: {}", path.display(), warning);
            }
            config
        }
        None => PluginConfig::load(),
    }
}

fn open_file(path: &Path, filetype: Option<&str>) -> Result<(MemoryHost, BufferId)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut host = MemoryHost::new();
    let buffer = host.open_text(&text, Some(path));
    if filetype.is_some() {
        host.set_file_type(buffer, filetype);
    }
    Ok((host, buffer))
}

/// Deliver the events an editor sends when a file is first shown
fn enter(runtime: &mut Runtime<ParserState>, buffer: BufferId) {
    runtime.dispatch(Event::BufferEntered(buffer));
    runtime.dispatch(Event::FileTypeDetected(buffer));
}

fn print_buffer(runtime: &Runtime<ParserState>, buffer: BufferId) {
    for line in runtime.host().render(buffer) {
        println!("{}", line);
    }
}

fn print_status(runtime: &Runtime<ParserState>, buffer: BufferId) {
    let scheduler = runtime.scheduler();
    let host = runtime.host();
    println!(
        "{} ({}): {}",
        host.path(buffer)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| buffer.to_string()),
        host.language(buffer).display_name(),
        scheduler.status(buffer).label()
    );
    for line in scheduler.overlays().list_active(host, buffer) {
        println!("  marker above line {}", line + 2);
    }
}

fn watch(
    runtime: &mut Runtime<ParserState>,
    buffer: BufferId,
    invocation: &Invocation,
) -> Result<()> {
    let watcher = FileWatcher::new(&invocation.file, WATCH_DEBOUNCE)
        .with_context(|| format!("Failed to watch {}", invocation.file.display()))?;

    enter(runtime, buffer);
    print_buffer(runtime, buffer);
    flush_notifications(runtime.host_mut());

    loop {
        let mut redraw = false;

        if watcher.wait_for_change(WATCH_TICK) {
            match std::fs::read_to_string(watcher.path()) {
                Ok(text) => {
                    runtime.host_mut().set_text(buffer, &text);
                    // Deferred refreshes redraw when they land
                    redraw = !runtime.dispatch(Event::Edited(RefreshEvent::PostSave, buffer));
                }
                Err(e) => {
                    tracing::warn!("Failed to reload {}: {}", watcher.path().display(), e);
                }
            }
        }

        redraw |= runtime.process_async_messages() > 0;

        if redraw {
            println!("----- {} -----", watcher.path().display());
            print_buffer(runtime, buffer);
            flush_notifications(runtime.host_mut());
        }
    }
}

fn flush_notifications(host: &mut MemoryHost) {
    for (level, message) in host.notifications.drain(..) {
        match level {
            NotifyLevel::Info => eprintln!("{}", message),
            NotifyLevel::Warn => eprintln!("warning: {}", message),
            NotifyLevel::Error => eprintln!("error: {}", message),
        }
    }
}
