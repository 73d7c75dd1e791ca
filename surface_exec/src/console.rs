//! # Operator Console Module
//!
//! A small interactive prompt running on its own thread. Commands are sent
//! to the main loop over a channel and drained there without blocking, so
//! the console can never stall telegram production.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

// Internal
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PROMPT: &str = "rov> ";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Commands the operator can issue from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Toggle the calibration flag sent in every telegram
    ToggleCalibrate,

    /// Start or stop the video record pipeline
    ToggleRecord,

    /// Print the most recent control vector
    Status,

    /// Shut the executable down
    Quit,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Spawn the console thread, returning the channel its commands arrive on.
pub fn spawn(shutdown: Arc<AtomicBool>) -> Receiver<ConsoleCommand> {
    let (tx, rx) = channel();

    thread::spawn(move || console_loop(tx, shutdown));

    rx
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Read lines from the operator until quit or shutdown.
fn console_loop(tx: Sender<ConsoleCommand>, shutdown: Arc<AtomicBool>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            warn!("Could not start the operator console: {}", e);
            return;
        }
    };

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line).ok();

                if line == "help" {
                    print_help();
                    continue;
                }

                match parse(line) {
                    Some(cmd) => {
                        let quit = cmd == ConsoleCommand::Quit;

                        if tx.send(cmd).is_err() || quit {
                            break;
                        }
                    }
                    None => println!("Unknown command \"{}\", try \"help\"", line),
                }
            }
            // ^C or ^D at the prompt requests shutdown
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                tx.send(ConsoleCommand::Quit).ok();
                break;
            }
            Err(e) => {
                warn!("Console read error: {:?}", e);
                break;
            }
        }
    }
}

/// Parse a console line into a command.
fn parse(line: &str) -> Option<ConsoleCommand> {
    match line {
        "cal" => Some(ConsoleCommand::ToggleCalibrate),
        "rec" => Some(ConsoleCommand::ToggleRecord),
        "status" => Some(ConsoleCommand::Status),
        "quit" | "exit" => Some(ConsoleCommand::Quit),
        _ => None,
    }
}

fn print_help() {
    println!("Available commands:");
    println!("    cal     toggle the calibration flag");
    println!("    rec     start/stop recording the video stream");
    println!("    status  print the most recent control vector");
    println!("    quit    shut down the surface station");
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse("cal"), Some(ConsoleCommand::ToggleCalibrate));
        assert_eq!(parse("rec"), Some(ConsoleCommand::ToggleRecord));
        assert_eq!(parse("status"), Some(ConsoleCommand::Status));
        assert_eq!(parse("quit"), Some(ConsoleCommand::Quit));
        assert_eq!(parse("exit"), Some(ConsoleCommand::Quit));
        assert_eq!(parse("nonsense"), None);
    }
}
