//! Implementation of the `simulate` command.
//!
//! A simulated clock is installed before anything is logged, so every line
//! carries the simulated time. The configured lights are then driven through
//! the dry-run driver while the clock fast-forwards from task to task, which
//! prints every command the daemon would have sent over the range.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::rc::Rc;
use std::sync::Arc;

use crate::args::SimulateOptions;
use crate::backend::log::LogDriver;
use crate::common::logger::{Log, LoggerGuard};
use crate::common::utils::format_duration;
use crate::config::Config;
use crate::core::{Core, LightEnvironment, TurnOnRequest};
use crate::time_source::{self, SimulatedTimeSource, TimeSource};

/// Handle `rightlight simulate <start> <end> [options]`.
pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    options: SimulateOptions,
    debug_enabled: bool,
    config_dir: Option<String>,
) -> Result<()> {
    let start = time_source::parse_datetime(start_time).context("Invalid start time")?;
    let end = time_source::parse_datetime(end_time).context("Invalid end time")?;
    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    // Installed before any logging so timestamps are simulated from the first line
    let clock = Arc::new(SimulatedTimeSource::fast_forward(start, end));
    time_source::init_time_source(clock.clone());

    let _log_guard = if options.log_to_file {
        Some(start_log_file()?)
    } else {
        None
    };

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );
    if let Ok(duration) = end.signed_duration_since(start).to_std() {
        log_indented!("Total simulated time: {}", format_duration(duration));
    }
    log_indented!("Time acceleration: fast-forward (instant execution)");
    if debug_enabled {
        log_pipe!();
        log_debug!("Simulated time source initialized");
    }

    let config = super::load_config(config_dir)?;
    let lights = plan_lights(&config, &options)?;

    let env = Rc::new(LightEnvironment::from_config(&config)?);
    let mut core = Core::new(clock.clone(), Box::new(LogDriver::new()), env);

    let ran = run_simulation(&mut core, &lights, end)?;

    log_block_start!("Simulation complete");
    log_indented!("{ran} scheduled task(s) ran for {} light(s)", lights.len());
    log_end!();
    Ok(())
}

/// The lights to simulate and the request each one starts with.
///
/// `--light` narrows the run to one entity (configured or not); `--mode`,
/// `--brightness` and `--override` replace the configured startup values.
pub fn plan_lights(config: &Config, options: &SimulateOptions) -> Result<Vec<(String, TurnOnRequest)>> {
    let mut lights: Vec<(String, TurnOnRequest)> = match &options.light {
        Some(entity_id) => {
            let request = config
                .lights()
                .iter()
                .find(|light| &light.entity_id == entity_id)
                .map(|light| light.startup_request())
                .unwrap_or_default();
            vec![(entity_id.clone(), request)]
        }
        None => config
            .lights()
            .iter()
            .map(|light| (light.entity_id.clone(), light.startup_request()))
            .collect(),
    };

    if lights.is_empty() {
        anyhow::bail!("No lights configured; pass --light <entity_id> to simulate one");
    }

    for (_, request) in &mut lights {
        if let Some(mode) = &options.mode {
            request.mode = mode.clone();
        }
        if let Some(brightness) = options.brightness {
            request.brightness = brightness;
        }
        if let Some(brightness_override) = options.brightness_override {
            request.brightness_override = brightness_override;
        }
    }
    Ok(lights)
}

/// Register and start every planned light, then run the core until `end`.
///
/// Returns the number of scheduled tasks that ran. Lights that fail to start
/// are reported and left idle.
pub fn run_simulation(
    core: &mut Core,
    lights: &[(String, TurnOnRequest)],
    end: DateTime<Local>,
) -> Result<usize> {
    for (entity_id, request) in lights {
        core.add_light(entity_id)?;
        log_block_start!(
            "Turning on {entity_id} ({}, brightness {}, override {})",
            request.mode,
            request.brightness,
            request.brightness_override
        );
        if let Err(e) = core.turn_on(entity_id, request.clone()) {
            log_warning!("Could not start {entity_id}: {e}");
        }
    }

    let ran = core.run_until(end);
    log_debug!(
        "Simulation stopped at {} with {} task(s) outstanding",
        core.clock().now().format("%Y-%m-%d %H:%M:%S"),
        core.timers().len()
    );
    Ok(ran)
}

fn start_log_file() -> Result<LoggerGuard> {
    let filename = format!(
        "rightlight-simulation-{}.log",
        Local::now().format("%Y%m%d-%H%M%S")
    );
    log_block_start!("Writing simulation output to {filename}");
    log_end!();
    Log::start_file_logging(filename).context("Failed to start file logging")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{Recorded, RecordingDriver};
    use crate::config::{LightConfig, SolarSource};
    use crate::time_source::parse_datetime;

    fn config_with(lights: Vec<LightConfig>) -> Config {
        Config {
            solar_source: Some(SolarSource::Manual),
            lights: Some(lights),
            ..Default::default()
        }
    }

    fn light(entity_id: &str, mode: &str, brightness: u32) -> LightConfig {
        LightConfig {
            entity_id: entity_id.to_string(),
            mode: Some(mode.to_string()),
            brightness: Some(brightness),
            brightness_override: None,
        }
    }

    #[test]
    fn test_plan_uses_configured_lights() {
        let config = config_with(vec![light("light.a", "Vivid", 200), light("light.b", "Normal", 90)]);
        let plan = plan_lights(&config, &SimulateOptions::default()).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].0, "light.a");
        assert_eq!(plan[0].1, TurnOnRequest::mode("Vivid").with_brightness(200));
    }

    #[test]
    fn test_plan_overrides() {
        let config = config_with(vec![light("light.a", "Vivid", 200)]);
        let options = SimulateOptions {
            light: Some("light.a".to_string()),
            mode: Some("Normal".to_string()),
            brightness_override: Some(40),
            ..Default::default()
        };
        let plan = plan_lights(&config, &options).unwrap();
        assert_eq!(
            plan,
            vec![(
                "light.a".to_string(),
                TurnOnRequest::default().with_brightness(200).with_override(40)
            )]
        );
    }

    #[test]
    fn test_plan_unconfigured_light_and_empty_config() {
        let config = config_with(Vec::new());
        assert!(plan_lights(&config, &SimulateOptions::default()).is_err());

        let options = SimulateOptions {
            light: Some("light.spare".to_string()),
            ..Default::default()
        };
        let plan = plan_lights(&config, &options).unwrap();
        assert_eq!(plan, vec![("light.spare".to_string(), TurnOnRequest::default())]);
    }

    #[test]
    fn test_run_simulation_over_a_morning() {
        Log::set_enabled(false);
        let start = parse_datetime("2024-06-15 04:00:00").unwrap();
        let end = parse_datetime("2024-06-15 08:00:00").unwrap();
        let clock = Arc::new(SimulatedTimeSource::fast_forward(start, end));

        let config = config_with(vec![light("light.a", "Normal", 255)]);
        let env = Rc::new(LightEnvironment::from_config(&config).unwrap());
        let driver = RecordingDriver::with_clock(clock.clone());
        let mut core = Core::new(clock.clone(), Box::new(driver.clone()), env);

        let plan = plan_lights(&config, &SimulateOptions::default()).unwrap();
        let ran = run_simulation(&mut core, &plan, end).unwrap();

        assert!(ran > 0);
        assert_eq!(clock.now(), end);
        // Every command lands in chronological order
        let timeline = driver.timeline();
        assert!(timeline.windows(2).all(|pair| pair[0].0 <= pair[1].0));
        assert!(timeline.iter().all(|(_, c)| matches!(c, Recorded::On(_))));
    }
}
