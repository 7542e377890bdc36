//! defmark - definition markers for Python buffers
//!
//! Draws a non-destructive rule over the blank line above every function and
//! class definition, and keeps those rules in sync as the buffer is edited.
//! The host editor is reached only through the ports in [`host`]; all
//! decisions are made by the [`Scheduler`] in response to [`Event`]s.

pub mod admission;
pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod event;
pub mod fs_watcher;
pub mod host;
pub mod locator;
pub mod marker;
pub mod overlay;
pub mod runtime;
pub mod scheduler;
pub mod state;
pub mod syntax;
pub mod tracing;

// Re-export commonly used types
pub use commands::{CommandId, CommandOutcome};
pub use config::PluginConfig;
pub use error::DefmarkError;
pub use event::{Cmd, Event, RefreshEvent};
pub use host::{BufferId, Host, MemoryHost};
pub use scheduler::Scheduler;
pub use state::BufferState;
