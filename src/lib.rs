//! # RightLight Library
//!
//! Internal library for the rightlight binary.
//!
//! This library exists to enable testing of the controller internals and to
//! keep CLI dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Core Logic**: `core` holds the per-light controllers, the trip-point
//!   tables, interpolation, the timer queue and the `Core` event loop
//! - **Geographic**: `geo` computes sunrise/sunset and the boundaries of a day
//! - **Drivers**: `backend` turns light commands into output (log, JSON lines)
//! - **Configuration**: `config` for TOML-based settings with validation
//! - **Commands**: `commands` for the CLI subcommands (run, simulate, table, modes)
//! - **Infrastructure**: time sources, signal handling, logging and utilities

// Logger macros must be declared first to be visible in every later module
#[macro_use]
pub mod common;

pub mod args;
pub mod backend;
pub mod commands;
pub mod config;
pub mod core;
pub mod geo;
pub mod signals;
pub mod time_source;

pub use crate::core::{Core, ControllerError, LightAttributes, RightLight, TurnOnRequest};
