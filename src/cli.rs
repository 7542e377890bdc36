//! Command-line argument parsing
//!
//! Supports:
//! - Printing a file with its definition markers
//! - Running marker commands against a file
//! - Watching a file and re-printing on every save

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::CommandId;

/// Definition markers for Python files
#[derive(Parser, Debug)]
#[command(name = "defmark", version, about = "Definition markers for Python files")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Config file to use instead of ~/.config/defmark/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// File-type tag to assign, overriding extension and shebang detection
    #[arg(long, global = true, value_name = "TYPE")]
    pub filetype: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print the file with markers drawn over their lines
    Show {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run commands in order, then print status and marker lines
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// enable-for-current-buffer, disable-for-current-buffer, toggle-for-current-buffer
        #[arg(value_name = "COMMAND", required = true)]
        commands: Vec<CommandId>,
    },
    /// Re-print the annotated file whenever it changes on disk
    Watch {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// What the binary should do, validated
#[derive(Debug, Clone)]
pub struct Invocation {
    pub file: PathBuf,
    pub mode: Mode,
    pub config_path: Option<PathBuf>,
    pub filetype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Show,
    Run(Vec<CommandId>),
    Watch,
}

impl CliArgs {
    /// Convert parsed CLI args into an invocation
    pub fn into_invocation(self) -> Result<Invocation, String> {
        let (file, mode) = match self.command {
            CliCommand::Show { file } => (file, Mode::Show),
            CliCommand::Run { file, commands } => (file, Mode::Run(commands)),
            CliCommand::Watch { file } => (file, Mode::Watch),
        };

        if file.is_dir() {
            return Err(format!("{} is a directory", file.display()));
        }

        let filetype = self.filetype.filter(|t| !t.trim().is_empty());

        Ok(Invocation {
            file,
            mode,
            config_path: self.config,
            filetype,
        })
    }
}
