//! Main application entry point.
//!
//! Parses the command line and hands off to the matching command handler in
//! `rightlight::commands`. Errors are reported through the logger and turn
//! into a non-zero exit status.

use rightlight::args::{self, CliAction, ParsedArgs};
use rightlight::commands;
use rightlight::common::constants::EXIT_FAILURE;
use rightlight::common::logger::Log;
use rightlight::{log_end, log_error_exit, log_pipe};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    if let Err(e) = dispatch(parsed_args.action) {
        log_pipe!();
        log_error_exit!("{e:#}");
        log_end!();
        std::process::exit(EXIT_FAILURE);
    }
}

fn dispatch(action: CliAction) -> anyhow::Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::ShowCommandHelp(command) => {
            commands::help::run_help_command(Some(&command));
            Ok(())
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            Log::set_debug(debug_enabled);
            commands::run::run_daemon(debug_enabled, config_dir)
        }
        CliAction::Simulate {
            debug_enabled,
            config_dir,
            start_time,
            end_time,
            options,
        } => {
            Log::set_debug(debug_enabled);
            commands::simulate::handle_simulate_command(
                &start_time,
                &end_time,
                options,
                debug_enabled,
                config_dir,
            )
        }
        CliAction::Table {
            debug_enabled,
            config_dir,
            mode,
            date,
        } => {
            Log::set_debug(debug_enabled);
            commands::table::handle_table_command(mode, date, config_dir)
        }
        CliAction::Modes {
            debug_enabled,
            config_dir,
        } => {
            Log::set_debug(debug_enabled);
            commands::modes::handle_modes_command(config_dir)
        }
    }
}
