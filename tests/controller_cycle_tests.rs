use chrono::{DateTime, Local};
use serde_json::Value;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;

use rightlight::backend::json::JsonDriver;
use rightlight::backend::recording::{Recorded, RecordingDriver};
use rightlight::backend::{LightColor, LightCommand};
use rightlight::common::logger::Log;
use rightlight::config::{self, Config};
use rightlight::core::{Core, LightAttributes, TurnOnRequest};
use rightlight::time_source::{SimulatedTimeSource, parse_datetime};

const CONFIG: &str = r#"
solar_source = "manual"
sunrise = "06:00:00"
sunset = "20:00:00"

[palettes]
Sunrise = [[255, 80, 0], [255, 160, 40]]

[[lights]]
entity_id = "light.living_room"

[[lights]]
entity_id = "light.gameroom"
mode = "Vivid"
"#;

fn at(s: &str) -> DateTime<Local> {
    parse_datetime(s).unwrap()
}

fn config() -> Config {
    config::loading::parse(CONFIG).unwrap()
}

fn simulated(start: &str, end: &str) -> Arc<SimulatedTimeSource> {
    Log::set_enabled(false);
    Arc::new(SimulatedTimeSource::fast_forward(at(start), at(end)))
}

fn immediate_commands(driver: &RecordingDriver, entity_id: &str) -> Vec<(DateTime<Local>, LightCommand)> {
    driver
        .timeline()
        .into_iter()
        .filter_map(|(instant, recorded)| match recorded {
            Recorded::On(command) if command.entity_id == entity_id && command.transition == 0.1 => {
                Some((instant, command))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn test_normal_curve_recomputes_after_every_anchor() {
    let clock = simulated("2024-06-15 00:00:30", "2024-06-16 00:00:01");
    let driver = RecordingDriver::with_clock(clock.clone());
    let config = config();
    let mut core = Core::from_config(&config, clock.clone(), Box::new(driver.clone())).unwrap();

    core.turn_on("light.living_room", TurnOnRequest::default())
        .unwrap();
    core.run_until(at("2024-06-16 00:00:01"));

    let instants: Vec<String> = immediate_commands(&driver, "light.living_room")
        .iter()
        .map(|(instant, _)| instant.format("%d %H:%M:%S").to_string())
        .collect();
    assert_eq!(
        instants,
        vec![
            "15 00:00:30",
            "15 05:00:01",
            "15 05:30:01",
            "15 06:00:01",
            "15 06:30:01",
            "15 18:30:01",
            "15 19:30:01",
            "15 20:00:01",
            "15 22:30:01",
            "16 00:00:00",
        ]
    );

    // The rebuilt table belongs to the new day
    let light = core.light("light.living_room").unwrap();
    assert_eq!(light.state().day().unwrap().date, at("2024-06-16 00:00:00").date_naive());
}

#[test]
fn test_commits_land_on_anchor_values() {
    let clock = simulated("2024-06-15 05:10:00", "2024-06-15 06:00:00");
    let driver = RecordingDriver::with_clock(clock.clone());
    let mut core = Core::from_config(&config(), clock.clone(), Box::new(driver.clone())).unwrap();

    core.turn_on("light.living_room", TurnOnRequest::default())
        .unwrap();
    core.run_until(at("2024-06-15 06:00:00"));

    let commits: Vec<LightCommand> = driver
        .commands()
        .into_iter()
        .filter_map(|recorded| match recorded {
            Recorded::On(command) if command.transition > 0.1 => Some(command),
            _ => None,
        })
        .collect();

    // sunrise-30 (2700K @ 170) then sunrise (3200K @ 155)
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].brightness, Some(170));
    assert_eq!(commits[0].transition, 1200.0);
    assert_eq!(commits[1].brightness, Some(155));
    assert_eq!(commits[1].transition, 1799.0);
}

#[test]
fn test_lights_run_independently() {
    let clock = simulated("2024-06-15 12:01:00", "2024-06-15 12:10:00");
    let driver = RecordingDriver::with_clock(clock.clone());
    let config = config();
    let mut core = Core::from_config(&config, clock.clone(), Box::new(driver.clone())).unwrap();

    for light in config.lights() {
        core.turn_on(&light.entity_id, light.startup_request()).unwrap();
    }
    core.disable_and_turn_off("light.living_room").unwrap();
    core.run_until(at("2024-06-15 12:10:00"));

    // The color light kept cycling every two minutes
    let gameroom = immediate_commands(&driver, "light.gameroom");
    assert_eq!(gameroom.len(), 5);
    assert!(
        gameroom
            .iter()
            .all(|(_, command)| matches!(command.color, Some(LightColor::Rgb(_))))
    );

    // The living room was turned off and stayed quiet
    let living: Vec<Recorded> = driver
        .commands()
        .into_iter()
        .filter(|recorded| recorded.entity_id() == "light.living_room")
        .collect();
    assert_eq!(living.len(), 2);
    assert!(matches!(living[1], Recorded::Off { .. }));
}

#[test]
fn test_custom_palette_mode() {
    let clock = simulated("2024-06-15 00:01:00", "2024-06-15 00:10:00");
    let driver = RecordingDriver::with_clock(clock.clone());
    let mut core = Core::from_config(&config(), clock.clone(), Box::new(driver.clone())).unwrap();

    assert!(core.color_modes().contains(&"Sunrise".to_string()));
    let transition = core
        .turn_on("light.gameroom", TurnOnRequest::mode("Sunrise"))
        .unwrap();

    // Halfway between [255, 80, 0] and [255, 160, 40]
    assert_eq!(transition.now.color, Some(LightColor::Rgb([255, 120, 20])));
    assert_eq!(transition.commit.color, Some(LightColor::Rgb([255, 160, 40])));
}

#[test]
fn test_specific_attributes_interrupt_the_curve() {
    let clock = simulated("2024-06-15 12:00:00", "2024-06-15 13:00:00");
    let driver = RecordingDriver::with_clock(clock.clone());
    let mut core = Core::from_config(&config(), clock.clone(), Box::new(driver.clone())).unwrap();

    core.turn_on("light.living_room", TurnOnRequest::default())
        .unwrap();
    core.turn_on_specific(
        "light.living_room",
        LightAttributes {
            brightness: Some(40),
            color: Some(LightColor::Rgb([255, 0, 0])),
        },
    )
    .unwrap();
    core.run_until(at("2024-06-15 13:00:00"));

    let commands = driver.commands();
    // curve command, specific command, resend; nothing from the cancelled chain
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[1], commands[2]);
    assert!(core.timers().is_empty());
}

/// Writer shared between the test and the driver owned by `Core`.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_json_driver_emits_service_calls() {
    let clock = simulated("2024-06-15 02:30:00", "2024-06-15 02:31:00");
    let buffer = SharedBuffer::default();
    let mut core = Core::from_config(
        &config(),
        clock.clone(),
        Box::new(JsonDriver::new(buffer.clone())),
    )
    .unwrap();

    core.turn_on("light.living_room", TurnOnRequest::default())
        .unwrap();
    core.run_until(at("2024-06-15 02:31:00"));
    core.disable_and_turn_off("light.living_room").unwrap();

    let output = String::from_utf8(buffer.0.borrow().clone()).unwrap();
    let calls: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0]["type"], "call_service");
    assert_eq!(calls[0]["service"], "light.turn_on");
    assert_eq!(calls[0]["data"]["entity_id"], "light.living_room");
    assert_eq!(calls[0]["data"]["brightness"], 135);
    assert_eq!(calls[0]["data"]["kelvin"], 2088);
    assert_eq!(calls[1]["data"]["transition"], 9000.0);
    assert_eq!(calls[2]["service"], "light.turn_off");
    assert_eq!(calls[2]["data"]["transition"], 0.1);
}
