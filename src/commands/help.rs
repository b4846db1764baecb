//! Help command implementation.
//!
//! Dispatches `rightlight help [command]` to general or command-specific help.

/// Show brief usage for a command (used for error messages)
pub fn show_command_usage(command: &str) {
    match command {
        "run" => log_block_start!("Usage: rightlight [run]"),
        "simulate" => log_block_start!(
            "Usage: rightlight simulate \"<start>\" \"<end>\" [--light ID] [--mode M] [--brightness N] [--override N] [--log]"
        ),
        "table" => log_block_start!("Usage: rightlight table [--mode M] [--date YYYY-MM-DD]"),
        "modes" => log_block_start!("Usage: rightlight modes"),
        _ => log_block_start!("Usage: rightlight [OPTIONS] [COMMAND]"),
    }
}

/// Run the help command (dispatcher)
///
/// `None` shows the general command overview.
pub fn run_help_command(command: Option<&str>) {
    match command {
        None => display_general_help(),
        Some("run") => display_run_help(),
        Some("simulate") | Some("sim") => display_simulate_help(),
        Some("table") => display_table_help(),
        Some("modes") => display_modes_help(),
        Some("help") => display_help_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
}

fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("run                     Drive the configured lights (default)");
    log_indented!("simulate <start> <end>  Fast-forward a time range, printing each command");
    log_indented!("table                   Print the trip points of a day");
    log_indented!("modes                   List the available modes");
    log_indented!("help [COMMAND]          Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'rightlight help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'rightlight --help' to see all options and general usage.");
    log_end!();
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Drive the configured lights");
    show_command_usage("run");
    log_block_start!("Description:");
    log_indented!("Turns on every [[lights]] entry with its startup mode and keeps");
    log_indented!("following the mode's curve until SIGINT or SIGTERM.");
    log_indented!("On shutdown every light stops following its curve.");
    log_end!();
}

fn display_simulate_help() {
    log_version!();
    log_block_start!("simulate - Run a time range on a simulated clock");
    show_command_usage("simulate");
    log_block_start!("Arguments:");
    log_indented!("<start>, <end>       Local times as \"YYYY-MM-DD HH:MM:SS\"");
    log_block_start!("Options:");
    log_indented!("-l, --light <ID>       Only simulate this light");
    log_indented!("-m, --mode <MODE>      Mode to start in");
    log_indented!("-b, --brightness <N>   Master brightness, 0-255");
    log_indented!("-o, --override <N>     Brightness override added on top");
    log_indented!("--log                  Write the output to a log file");
    log_block_start!("Examples:");
    log_indented!("rightlight simulate \"2024-06-15 04:00:00\" \"2024-06-15 09:00:00\"");
    log_indented!("rightlight simulate \"2024-06-15 00:00:00\" \"2024-06-15 00:30:00\" -m Vivid");
    log_end!();
}

fn display_table_help() {
    log_version!();
    log_block_start!("table - Print the trip points of a day");
    show_command_usage("table");
    log_block_start!("Options:");
    log_indented!("-m, --mode <MODE>      Only this mode, every anchor listed");
    log_indented!("--date <YYYY-MM-DD>    Day to compute (defaults to today)");
    log_end!();
}

fn display_modes_help() {
    log_version!();
    log_block_start!("modes - List the available modes");
    show_command_usage("modes");
    log_block_start!("Description:");
    log_indented!("Built-in modes plus any [palettes] from the configuration.");
    log_end!();
}

fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: rightlight help [COMMAND]");
    log_block_start!("Examples:");
    log_indented!("rightlight help");
    log_indented!("rightlight help simulate");
    log_end!();
}
