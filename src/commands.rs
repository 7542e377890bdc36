//! User-facing commands
//!
//! Three zero-argument triggers against the current buffer. Hosts bind them
//! to keys or a command palette by name.

use std::fmt;
use std::str::FromStr;

// ============================================================================
// Command Registry
// ============================================================================

/// Identifies a command the host can invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    Enable,
    Disable,
    Toggle,
}

/// A command definition for the host's command surface
#[derive(Debug, Clone)]
pub struct CommandDef {
    pub id: CommandId,
    /// Stable name hosts bind to
    pub name: &'static str,
    /// Human readable label
    pub label: &'static str,
}

/// Static registry of all available commands
pub static COMMANDS: &[CommandDef] = &[
    CommandDef {
        id: CommandId::Enable,
        name: "enable-for-current-buffer",
        label: "Show Definition Markers",
    },
    CommandDef {
        id: CommandId::Disable,
        name: "disable-for-current-buffer",
        label: "Hide Definition Markers",
    },
    CommandDef {
        id: CommandId::Toggle,
        name: "toggle-for-current-buffer",
        label: "Toggle Definition Markers",
    },
];

impl CommandId {
    pub fn def(self) -> &'static CommandDef {
        match self {
            CommandId::Enable => &COMMANDS[0],
            CommandId::Disable => &COMMANDS[1],
            CommandId::Toggle => &COMMANDS[2],
        }
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COMMANDS
            .iter()
            .find(|def| def.name == s.trim())
            .map(|def| def.id)
            .ok_or_else(|| format!("unknown command '{}'", s))
    }
}

/// Result of running a command, for the host to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Markers are now showing (with how many were placed)
    Enabled { markers: usize },
    /// Markers were hidden; `had_markers` is false if nothing was showing
    Disabled { had_markers: bool },
    /// The command could not run (wrong language, closed buffer)
    Refused,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, CommandOutcome::Refused)
    }

    /// Short message for a notification
    pub fn describe(&self) -> String {
        match self {
            CommandOutcome::Enabled { markers } => {
                format!("Definition markers enabled ({} shown)", markers)
            }
            CommandOutcome::Disabled { .. } => "Definition markers disabled".to_string(),
            CommandOutcome::Refused => "Definition markers unavailable here".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_matches_ids() {
        for def in COMMANDS {
            assert_eq!(def.id.def().name, def.name);
        }
    }

    #[test]
    fn test_parse_command_names() {
        assert_eq!(
            "enable-for-current-buffer".parse::<CommandId>(),
            Ok(CommandId::Enable)
        );
        assert_eq!(
            "toggle-for-current-buffer".parse::<CommandId>(),
            Ok(CommandId::Toggle)
        );
        assert!("toggle".parse::<CommandId>().is_err());
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(
            CommandId::Disable.to_string(),
            "disable-for-current-buffer"
        );
    }

    #[test]
    fn test_outcome_success() {
        assert!(CommandOutcome::Enabled { markers: 0 }.is_success());
        assert!(CommandOutcome::Disabled { had_markers: false }.is_success());
        assert!(!CommandOutcome::Refused.is_success());
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            CommandOutcome::Enabled { markers: 3 }.describe(),
            "Definition markers enabled (3 shown)"
        );
    }
}
