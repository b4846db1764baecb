//! Command-line argument parsing and processing.
//!
//! Arguments are parsed by hand into a [`CliAction`]. Global flags
//! (`--config`, `--debug`, `--help`, `--version`) may appear anywhere; the
//! first bare word selects the command and the words after it are that
//! command's arguments.

/// Options of the `simulate` command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulateOptions {
    /// Only simulate this light (defaults to every configured light).
    pub light: Option<String>,
    pub mode: Option<String>,
    pub brightness: Option<u32>,
    pub brightness_override: Option<u32>,
    /// Write the simulation output to a file instead of the terminal.
    pub log_to_file: bool,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Fast-forward a time range and print every driver command
    Simulate {
        debug_enabled: bool,
        config_dir: Option<String>,
        start_time: String,
        end_time: String,
        options: SimulateOptions,
    },
    /// Print the trip points of a day
    Table {
        debug_enabled: bool,
        config_dir: Option<String>,
        mode: Option<String>,
        date: Option<String>,
    },
    /// List the configured modes
    Modes {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Detailed help for one command
    ShowCommandHelp(String),

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// `args` includes the program name, as `std::env::args()` does.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let action = Self::parse_action(args).unwrap_or(CliAction::ShowHelpDueToError);
        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }

    fn parse_action<I, S>(args: I) -> Option<CliAction>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut config_dir: Option<String> = None;
        let mut words: Vec<String> = Vec::new();

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        // Pull the global flags out; everything else belongs to the command
        let mut i = 0;
        while i < args_vec.len() {
            match args_vec[i].as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--config" | "-c" => match args_vec.get(i + 1) {
                    Some(dir) if !dir.starts_with('-') => {
                        config_dir = Some(dir.clone());
                        i += 1;
                    }
                    _ => {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        return None;
                    }
                },
                _ => words.push(args_vec[i].clone()),
            }
            i += 1;
        }

        if display_version {
            return Some(CliAction::ShowVersion);
        }

        let Some((command, rest)) = words.split_first() else {
            return Some(if display_help {
                CliAction::ShowHelp
            } else {
                CliAction::Run {
                    debug_enabled,
                    config_dir,
                }
            });
        };

        if display_help {
            return Some(match canonical_command(command) {
                Some(name) => CliAction::ShowCommandHelp(name.to_string()),
                None => CliAction::ShowHelp,
            });
        }

        match command.as_str() {
            "run" => {
                reject_extra("run", rest)?;
                Some(CliAction::Run {
                    debug_enabled,
                    config_dir,
                })
            }
            "simulate" | "sim" => {
                let (start_time, end_time, options) = parse_simulate(rest)?;
                Some(CliAction::Simulate {
                    debug_enabled,
                    config_dir,
                    start_time,
                    end_time,
                    options,
                })
            }
            "table" => {
                let mut options = OptionCursor::new("table", rest);
                let mut mode = None;
                let mut date = None;
                while let Some(flag) = options.next_flag()? {
                    match flag {
                        "--mode" | "-m" => mode = Some(options.value(flag)?),
                        "--date" => date = Some(options.value(flag)?),
                        other => return unknown_option("table", other),
                    }
                }
                Some(CliAction::Table {
                    debug_enabled,
                    config_dir,
                    mode,
                    date,
                })
            }
            "modes" => {
                reject_extra("modes", rest)?;
                Some(CliAction::Modes {
                    debug_enabled,
                    config_dir,
                })
            }
            "help" => match rest {
                [] => Some(CliAction::ShowHelp),
                [topic] => match canonical_command(topic) {
                    Some(name) => Some(CliAction::ShowCommandHelp(name.to_string())),
                    None => {
                        log_warning!("Unknown command: {topic}");
                        None
                    }
                },
                _ => {
                    log_warning!("Usage: rightlight help [command]");
                    None
                }
            },
            _ => {
                log_warning!("Unknown command: {command}");
                None
            }
        }
    }
}

/// Command names accepted by `help <command>`.
fn canonical_command(word: &str) -> Option<&'static str> {
    match word {
        "run" => Some("run"),
        "simulate" | "sim" => Some("simulate"),
        "table" => Some("table"),
        "modes" => Some("modes"),
        "help" => Some("help"),
        _ => None,
    }
}

fn parse_simulate(rest: &[String]) -> Option<(String, String, SimulateOptions)> {
    let (start_time, end_time) = match rest {
        [start, end, ..] if !start.starts_with('-') && !end.starts_with('-') => {
            (start.clone(), end.clone())
        }
        _ => {
            log_warning!(
                "Missing time range. Usage: rightlight simulate \"<start>\" \"<end>\" [options]"
            );
            log_indented!("Times use the format \"YYYY-MM-DD HH:MM:SS\"");
            return None;
        }
    };

    let mut options = SimulateOptions::default();
    let mut cursor = OptionCursor::new("simulate", &rest[2..]);
    while let Some(flag) = cursor.next_flag()? {
        match flag {
            "--light" | "-l" => options.light = Some(cursor.value(flag)?),
            "--mode" | "-m" => options.mode = Some(cursor.value(flag)?),
            "--brightness" | "-b" => options.brightness = Some(cursor.number(flag)?),
            "--override" | "-o" => options.brightness_override = Some(cursor.number(flag)?),
            "--log" => options.log_to_file = true,
            other => return unknown_option("simulate", other),
        }
    }

    Some((start_time, end_time, options))
}

/// Walks `--flag value` pairs of a command.
struct OptionCursor<'a> {
    command: &'static str,
    rest: &'a [String],
    index: usize,
}

impl<'a> OptionCursor<'a> {
    fn new(command: &'static str, rest: &'a [String]) -> Self {
        Self {
            command,
            rest,
            index: 0,
        }
    }

    /// Next flag, `Some(None)` when done, `None` on a stray word.
    fn next_flag(&mut self) -> Option<Option<&'a str>> {
        let Some(word) = self.rest.get(self.index) else {
            return Some(None);
        };
        self.index += 1;
        if word.starts_with('-') {
            Some(Some(word.as_str()))
        } else {
            log_warning!("Unexpected argument for {}: {word}", self.command);
            None
        }
    }

    fn value(&mut self, flag: &str) -> Option<String> {
        match self.rest.get(self.index) {
            Some(value) if !value.starts_with('-') => {
                self.index += 1;
                Some(value.clone())
            }
            _ => {
                log_warning!("Missing value for {flag}");
                None
            }
        }
    }

    fn number(&mut self, flag: &str) -> Option<u32> {
        let value = self.value(flag)?;
        match value.parse::<u32>() {
            Ok(number) => Some(number),
            Err(_) => {
                log_warning!("Invalid value for {flag}: {value}");
                None
            }
        }
    }
}

fn reject_extra(command: &str, rest: &[String]) -> Option<()> {
    match rest.first() {
        Some(extra) => {
            log_warning!("Unexpected argument for {command}: {extra}");
            None
        }
        None => Some(()),
    }
}

fn unknown_option<T>(command: &str, flag: &str) -> Option<T> {
    log_warning!("Unknown option for {command}: {flag}");
    None
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    crate::common::logger::write_output(&format!("┗ {}\n", env!("CARGO_PKG_DESCRIPTION")));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("rightlight [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Drive the configured lights (default)");
    log_indented!("simulate <start> <end> Fast-forward a time range and print each command");
    log_indented!("table                  Print the trip points of a day");
    log_indented!("modes                  List the available modes");
    log_indented!("help [command]         Show help for a command");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(args: &[&str]) -> CliAction {
        let mut full = vec!["rightlight"];
        full.extend_from_slice(args);
        ParsedArgs::parse(full).action
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(
            action(&[]),
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
            }
        );
    }

    #[test]
    fn test_parse_global_flags_anywhere() {
        assert_eq!(
            action(&["run", "--debug", "--config", "/tmp/rl"]),
            CliAction::Run {
                debug_enabled: true,
                config_dir: Some("/tmp/rl".to_string()),
            }
        );
        assert_eq!(
            action(&["-c", "/tmp/rl", "modes"]),
            CliAction::Modes {
                debug_enabled: false,
                config_dir: Some("/tmp/rl".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(action(&["--help"]), CliAction::ShowHelp);
        assert_eq!(action(&["-V"]), CliAction::ShowVersion);
        assert_eq!(action(&["help"]), CliAction::ShowHelp);
        assert_eq!(
            action(&["help", "sim"]),
            CliAction::ShowCommandHelp("simulate".to_string())
        );
        assert_eq!(
            action(&["table", "--help"]),
            CliAction::ShowCommandHelp("table".to_string())
        );
        assert_eq!(action(&["help", "bogus"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_simulate() {
        assert_eq!(
            action(&[
                "simulate",
                "2024-06-15 00:00:00",
                "2024-06-16 00:00:00",
                "--light",
                "light.desk",
                "--mode",
                "Vivid",
                "--brightness",
                "200",
                "--override",
                "40",
                "--log",
            ]),
            CliAction::Simulate {
                debug_enabled: false,
                config_dir: None,
                start_time: "2024-06-15 00:00:00".to_string(),
                end_time: "2024-06-16 00:00:00".to_string(),
                options: SimulateOptions {
                    light: Some("light.desk".to_string()),
                    mode: Some("Vivid".to_string()),
                    brightness: Some(200),
                    brightness_override: Some(40),
                    log_to_file: true,
                },
            }
        );
    }

    #[test]
    fn test_parse_simulate_errors() {
        assert_eq!(action(&["simulate"]), CliAction::ShowHelpDueToError);
        assert_eq!(
            action(&["simulate", "2024-06-15 00:00:00", "--log"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            action(&["simulate", "a", "b", "--brightness", "lots"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            action(&["simulate", "a", "b", "--speed", "2"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_table() {
        assert_eq!(
            action(&["table", "--mode", "Normal", "--date", "2024-06-15"]),
            CliAction::Table {
                debug_enabled: false,
                config_dir: None,
                mode: Some("Normal".to_string()),
                date: Some("2024-06-15".to_string()),
            }
        );
        assert_eq!(action(&["table", "--mode"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(action(&["dance"]), CliAction::ShowHelpDueToError);
        assert_eq!(action(&["modes", "extra"]), CliAction::ShowHelpDueToError);
        assert_eq!(action(&["--config"]), CliAction::ShowHelpDueToError);
    }
}
