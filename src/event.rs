//! Events fed to the scheduler and commands it hands back
//!
//! Host editor callbacks are translated into [`Event`] values and passed to
//! `Scheduler::handle`. Side effects the scheduler cannot perform itself
//! (starting a timer) come back as a [`Cmd`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::commands::CommandId;
use crate::host::BufferId;

/// Edit events that may trigger a refresh (configurable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefreshEvent {
    #[serde(rename = "text-changed")]
    TextChanged,
    #[serde(rename = "text-changed-in-insert-mode")]
    TextChangedInsert,
    #[serde(rename = "post-save")]
    PostSave,
    #[serde(rename = "insert-leave")]
    InsertLeave,
}

impl RefreshEvent {
    pub const ALL: [RefreshEvent; 4] = [
        RefreshEvent::TextChanged,
        RefreshEvent::TextChangedInsert,
        RefreshEvent::PostSave,
        RefreshEvent::InsertLeave,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RefreshEvent::TextChanged => "text-changed",
            RefreshEvent::TextChangedInsert => "text-changed-in-insert-mode",
            RefreshEvent::PostSave => "post-save",
            RefreshEvent::InsertLeave => "insert-leave",
        }
    }
}

impl fmt::Display for RefreshEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RefreshEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RefreshEvent::ALL
            .into_iter()
            .find(|event| event.name() == s)
            .ok_or_else(|| format!("unknown refresh event '{}'", s))
    }
}

/// Host notifications the scheduler reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The user entered a buffer
    BufferEntered(BufferId),
    /// The host assigned (or re-assigned) a file type
    FileTypeDetected(BufferId),
    /// An edit-related event that may trigger a refresh
    Edited(RefreshEvent, BufferId),
    /// The buffer was closed or wiped
    BufferClosed(BufferId),
    /// A debounce timer started by [`Cmd::ScheduleRefresh`] fired
    RefreshDue { buffer: BufferId, generation: u64 },
    /// A user command against a buffer
    Command(CommandId, BufferId),
}

impl Event {
    pub fn buffer(&self) -> BufferId {
        match self {
            Event::BufferEntered(buffer)
            | Event::FileTypeDetected(buffer)
            | Event::Edited(_, buffer)
            | Event::BufferClosed(buffer)
            | Event::RefreshDue { buffer, .. }
            | Event::Command(_, buffer) => *buffer,
        }
    }
}

/// Side effects for the host to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Feed `Event::RefreshDue { buffer, generation }` back after `delay`
    ScheduleRefresh {
        buffer: BufferId,
        generation: u64,
        delay: Duration,
    },
}

impl Cmd {
    /// The event to deliver once this command's timer fires
    pub fn due_event(&self) -> Event {
        match self {
            Cmd::ScheduleRefresh {
                buffer, generation, ..
            } => Event::RefreshDue {
                buffer: *buffer,
                generation: *generation,
            },
        }
    }

    pub fn delay(&self) -> Duration {
        match self {
            Cmd::ScheduleRefresh { delay, .. } => *delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_event_names_round_trip() {
        for event in RefreshEvent::ALL {
            assert_eq!(event.name().parse::<RefreshEvent>(), Ok(event));
        }
        assert!("buffer-entered".parse::<RefreshEvent>().is_err());
    }

    #[test]
    fn test_refresh_event_yaml_names() {
        let yaml = serde_yaml::to_string(&RefreshEvent::TextChangedInsert).unwrap();
        assert_eq!(yaml.trim(), "text-changed-in-insert-mode");
    }

    #[test]
    fn test_cmd_due_event() {
        let cmd = Cmd::ScheduleRefresh {
            buffer: BufferId(4),
            generation: 9,
            delay: Duration::from_millis(30),
        };
        assert_eq!(
            cmd.due_event(),
            Event::RefreshDue {
                buffer: BufferId(4),
                generation: 9
            }
        );
        assert_eq!(cmd.delay(), Duration::from_millis(30));
        assert_eq!(cmd.due_event().buffer(), BufferId(4));
    }
}
