//! Command-line command handlers.
//!
//! Each command lives in its own submodule. Handlers load the configuration
//! themselves so `--config` is honored the same way everywhere.

pub mod help;
pub mod modes;
pub mod run;
pub mod simulate;
pub mod table;

use anyhow::Result;

use crate::config::{self, Config};

/// Apply `--config` and load (or create) the configuration file.
pub(crate) fn load_config(config_dir: Option<String>) -> Result<Config> {
    if config_dir.is_some() {
        config::set_config_dir(config_dir)?;
    }
    config::load()
}
