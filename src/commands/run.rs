//! The daemon: drive every configured light until a shutdown signal arrives.

use anyhow::Result;
use std::sync::Arc;

use crate::backend::create_driver;
use crate::config::LightConfig;
use crate::core::Core;
use crate::signals::setup_signal_handler;
use crate::time_source::{self, RealTimeSource};

/// Run the daemon in real time.
pub fn run_daemon(debug_enabled: bool, config_dir: Option<String>) -> Result<()> {
    log_version!();
    if debug_enabled {
        log_pipe!();
        log_debug!("Debug mode enabled - showing every interpolation");
    }

    time_source::init_time_source(Arc::new(RealTimeSource));
    let config = super::load_config(config_dir)?;
    config.log_config();

    if config.lights().is_empty() {
        log_pipe!();
        log_warning!("No lights configured, nothing to drive");
        log_indented!("Add a [[lights]] entry to the configuration");
        log_end!();
        return Ok(());
    }

    let signal_state = setup_signal_handler(debug_enabled)?;
    let driver = create_driver(&config)?;
    let mut core = Core::from_config(&config, time_source::global(), driver)?;

    log_block_start!(
        "Driving {} light(s) through the {} driver",
        config.lights().len(),
        core.driver_name()
    );
    let started = start_lights(&mut core, config.lights());
    if started == 0 {
        log_pipe!();
        log_warning!("No light could be started; waiting for scheduled retries is pointless");
        log_end!();
        return Ok(());
    }

    core.run(&signal_state.running)?;

    log_block_start!("Disabling lights");
    core.disable_all();
    log_end!();
    Ok(())
}

/// Apply each light's startup request. Returns how many lights started.
pub fn start_lights(core: &mut Core, lights: &[LightConfig]) -> usize {
    lights
        .iter()
        .filter(|light| {
            let request = light.startup_request();
            match core.turn_on(&light.entity_id, request) {
                Ok(transition) => {
                    log_decorated!(
                        "{} started: next anchor in {}",
                        light.entity_id,
                        crate::common::utils::format_duration(transition.span.remaining)
                    );
                    true
                }
                Err(e) => {
                    log_warning!("Could not start {}: {e}", light.entity_id);
                    false
                }
            }
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::RecordingDriver;
    use crate::time_source::{SimulatedTimeSource, parse_datetime};

    fn light(entity_id: &str, mode: Option<&str>) -> LightConfig {
        LightConfig {
            entity_id: entity_id.to_string(),
            mode: mode.map(str::to_string),
            brightness: None,
            brightness_override: None,
        }
    }

    #[test]
    fn test_start_lights_skips_failures() {
        crate::common::logger::Log::set_enabled(false);
        let start = parse_datetime("2024-06-15 12:00:00").unwrap();
        let clock = Arc::new(SimulatedTimeSource::fast_forward(
            start,
            start + chrono::Duration::hours(1),
        ));

        let config = crate::config::Config {
            solar_source: Some(crate::config::SolarSource::Manual),
            lights: Some(vec![
                light("light.a", None),
                light("light.b", Some("Vivid")),
                light("light.c", None),
            ]),
            ..Default::default()
        };
        let driver = RecordingDriver::with_clock(clock.clone());
        driver.fail_for("light.c");
        let mut core = Core::from_config(&config, clock, Box::new(driver.clone())).unwrap();

        assert_eq!(start_lights(&mut core, config.lights()), 2);
        assert_eq!(driver.len(), 2);
        assert_eq!(core.timers().len(), 4);
    }
}
