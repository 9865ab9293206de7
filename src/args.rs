//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. It supports the standard help,
//! version, and debug flags, the one-shot commands, the library editing
//! commands, and gracefully handles unknown options.

use chrono::NaiveTime;
use std::path::PathBuf;

use crate::logger::Log;
use crate::utils::parse_time_of_day;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run automation until stopped
    Run { debug_enabled: bool },
    /// Evaluate once, apply the wallpaper and exit
    Once { debug_enabled: bool },
    /// Show what would be selected at a given time without applying anything
    Preview {
        debug_enabled: bool,
        time: NaiveTime,
    },
    /// Print the image library
    List { debug_enabled: bool },
    /// Add an image with a known brightness to the library
    Add {
        debug_enabled: bool,
        path: PathBuf,
        brightness: f32,
    },
    /// Drop an image from the library
    Remove { debug_enabled: bool, path: PathBuf },
    /// Enable or disable a library image
    SetEnabled {
        debug_enabled: bool,
        path: PathBuf,
        enabled: bool,
    },
    /// Put a library image on the desktop now
    Set { debug_enabled: bool, path: PathBuf },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Library edit requested on the command line, before the debug flag is known.
enum LibraryEdit {
    Add(PathBuf, f32),
    Remove(PathBuf),
    SetEnabled(PathBuf, bool),
    Set(PathBuf),
}

impl LibraryEdit {
    fn into_action(self, debug_enabled: bool) -> CliAction {
        match self {
            LibraryEdit::Add(path, brightness) => CliAction::Add {
                debug_enabled,
                path,
                brightness,
            },
            LibraryEdit::Remove(path) => CliAction::Remove {
                debug_enabled,
                path,
            },
            LibraryEdit::SetEnabled(path, enabled) => CliAction::SetEnabled {
                debug_enabled,
                path,
                enabled,
            },
            LibraryEdit::Set(path) => CliAction::Set {
                debug_enabled,
                path,
            },
        }
    }
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    ///
    /// # Returns
    /// ParsedArgs containing the determined action
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut run_once = false;
        let mut run_list = false;
        let mut run_preview = false;
        let mut preview_time: Option<NaiveTime> = None;
        let mut edits: Vec<LibraryEdit> = Vec::new();
        let mut unknown_arg_found = false;

        // Convert to vector for easier indexed access
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = &args_vec[i];
            match arg_str.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--once" | "-o" => run_once = true,
                "--list" | "-l" => run_list = true,
                "--preview" | "-p" => {
                    run_preview = true;
                    // Parse: --preview <HH:MM[:SS]>
                    if let Some(value) = args_vec.get(i + 1) {
                        match parse_time_of_day(value) {
                            Ok(time) => preview_time = Some(time),
                            Err(e) => {
                                Log::log_warning(&format!("{}", e));
                                unknown_arg_found = true;
                            }
                        }
                        i += 1; // Skip the parsed argument
                    } else {
                        Log::log_warning(
                            "Missing time for --preview. Usage: --preview <HH:MM[:SS]>",
                        );
                        unknown_arg_found = true;
                    }
                }
                "--add" | "-a" => {
                    // Parse: --add <PATH> <BRIGHTNESS>
                    match (args_vec.get(i + 1), args_vec.get(i + 2)) {
                        (Some(path), Some(value)) => {
                            match value.parse::<f32>() {
                                Ok(brightness) => {
                                    edits.push(LibraryEdit::Add(PathBuf::from(path), brightness))
                                }
                                Err(_) => {
                                    Log::log_warning(&format!(
                                        "Invalid brightness '{}': expected a number between 0 and 1",
                                        value
                                    ));
                                    unknown_arg_found = true;
                                }
                            }
                            i += 2;
                        }
                        _ => {
                            Log::log_warning(
                                "Missing value for --add. Usage: --add <PATH> <BRIGHTNESS>",
                            );
                            unknown_arg_found = true;
                            i = args_vec.len();
                        }
                    }
                }
                "--remove" | "--enable" | "--disable" | "--set" => {
                    // Parse: --<command> <PATH>
                    if let Some(path) = args_vec.get(i + 1) {
                        let path = PathBuf::from(path);
                        edits.push(match arg_str.as_str() {
                            "--remove" => LibraryEdit::Remove(path),
                            "--enable" => LibraryEdit::SetEnabled(path, true),
                            "--disable" => LibraryEdit::SetEnabled(path, false),
                            _ => LibraryEdit::Set(path),
                        });
                        i += 1;
                    } else {
                        Log::log_warning(&format!(
                            "Missing path for {}. Usage: {} <PATH>",
                            arg_str, arg_str
                        ));
                        unknown_arg_found = true;
                    }
                }
                _ => {
                    // Check if the argument starts with a dash, indicating it's an option
                    if arg_str.starts_with('-') {
                        Log::log_warning(&format!("Unknown option: {}", arg_str));
                        unknown_arg_found = true;
                    }
                    // Non-option arguments are currently ignored
                }
            }
            i += 1;
        }

        // A library edit runs on its own
        let other_commands = usize::from(run_once) + usize::from(run_list) + usize::from(run_preview);
        if edits.len() > 1 || (!edits.is_empty() && other_commands > 0) {
            Log::log_warning("Library commands cannot be combined with other commands");
            unknown_arg_found = true;
        }

        // Determine the action based on parsed flags
        let action = if display_version {
            CliAction::ShowVersion
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if let Some(edit) = edits.pop() {
            edit.into_action(debug_enabled)
        } else if run_preview {
            match preview_time {
                Some(time) => CliAction::Preview {
                    debug_enabled,
                    time,
                },
                None => CliAction::ShowHelpDueToError,
            }
        } else if run_list {
            CliAction::List { debug_enabled }
        } else if run_once {
            CliAction::Once { debug_enabled }
        } else {
            CliAction::Run { debug_enabled }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    Log::log_version();
    Log::log_pipe();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    Log::log_version();
    Log::log_block_start(env!("CARGO_PKG_DESCRIPTION"));
    Log::log_block_start("Usage: lumawall [OPTIONS]");
    Log::log_block_start("Options:");
    Log::log_indented("-d, --debug               Enable detailed debug output");
    Log::log_indented("-h, --help                Print help information");
    Log::log_indented("-l, --list                List the image library");
    Log::log_indented("-o, --once                Apply the wallpaper for now and exit");
    Log::log_indented("-p, --preview <HH:MM>     Show the image selected at a time of day");
    Log::log_indented("-V, --version             Print version information");
    Log::log_block_start("Library:");
    Log::log_indented("-a, --add <PATH> <0..1>   Add an image with its brightness");
    Log::log_indented("    --remove <PATH>       Remove an image from the library");
    Log::log_indented("    --enable <PATH>       Let automation select an image again");
    Log::log_indented("    --disable <PATH>      Keep an image out of automatic selection");
    Log::log_indented("    --set <PATH>          Set a library image as wallpaper now");
    Log::log_end();
}
