//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A press-and-hold voice message recorder for the terminal
#[derive(Parser)]
#[command(name = "holdrec")]
#[command(version)]
#[command(about = "Press-and-hold voice message recording with slide-to-lock")]
#[command(
    long_about = "A press-and-hold voice message recorder for the terminal.\n\n\
Hold the mouse button on the record control to capture a voice message with a\n\
live amplitude indicator. Release inside the bar to send, release outside to\n\
cancel, or drag upward to lock the recording hands-free.\n\n\
DEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\n\
EXAMPLES:\n    # Record voice messages into the current directory\n    $ holdrec\n    \n    # Record into a specific directory\n    $ holdrec record -o ~/voice\n    \n    # List audio input devices\n    $ holdrec list-devices\n    \n    # Edit configuration file\n    $ holdrec config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/holdrec/holdrec.toml\n    Logs:               ~/.local/state/holdrec/holdrec.log.*"
)]
struct Cli {
    /// Directory where sent voice clips are written (record default command)
    #[arg(short, long, value_name = "DIR", global = true)]
    output: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record voice messages with the press-and-hold control (default)
    ///
    /// Hold the mouse button on the record control to record. Release inside
    /// the bar to send, release outside to cancel, drag upward to lock.
    #[command(visible_alias = "r")]
    Record {
        /// Directory where sent voice clips are written
        #[arg(short, long, value_name = "DIR")]
        output: Option<String>,
    },

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in holdrec.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio and UI settings. Uses $EDITOR or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "holdrec", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Record { .. }) => {
            // Default command is record. If both the top-level and the explicit
            // record options are present, the explicit ones take precedence.
            let output = match cli.command {
                Some(Commands::Record { output }) => output,
                None => cli.output,
                _ => unreachable!(),
            };
            commands::handle_record(output).await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
