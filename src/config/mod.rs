//! Configuration for rightlight.
//!
//! The configuration lives in `rightlight.toml`, in `$XDG_CONFIG_HOME/rightlight/`
//! or in the directory given with `--config`. Every field is optional and
//! falls back to the constants in [`crate::common::constants`]:
//!
//! ```toml
//! #[Location]
//! solar_source = "geo"      # "geo" (computed from coordinates) or "manual"
//! latitude = 52.5200
//! longitude = 13.4050
//! sunrise = "06:30:00"      # manual source only
//! sunset = "19:00:00"       # manual source only
//!
//! #[Driver]
//! driver = "log"            # "log" (dry run) or "json" (service calls on stdout)
//!
//! #[Timings]
//! on_transition = 0.1       # seconds for the immediate white command
//! color_transition = 0.1    # seconds for the immediate color command
//! off_transition = 0.1
//! specific_transition = 0.2
//! resend_delay = 0.6        # second send of a specific command
//! commit_delay = 0.5        # added to the on transition before the commit
//! color_step_minutes = 2    # spacing of color anchors
//!
//! #[White curve]
//! ct_high = 5000
//! ct_scalar = 0.35
//! overflow_ct_multiplier = 6
//!
//! [[normal_anchors]]        # replaces the whole default curve
//! at = "sunrise"            # midnight | sunrise | sunset | end_of_day | HH:MM:SS
//! offset_minutes = -60
//! kelvin = 2500
//! brightness = 120
//!
//! [palettes]                # adds or replaces color modes
//! Sunset = [[255, 80, 0], [255, 0, 40]]
//!
//! [[lights]]
//! entity_id = "light.living_room"
//! mode = "Normal"
//! brightness = 255
//! brightness_override = 0
//! ```

pub mod builder;
pub mod loading;
pub mod validation;

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::common::constants::*;
use crate::core::TurnOnRequest;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};


/// Where sunrise and sunset come from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolarSource {
    /// Computed from `latitude`/`longitude`.
    #[default]
    Geo,
    /// Fixed `sunrise`/`sunset` clock times.
    Manual,
}

impl SolarSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolarSource::Geo => "geo",
            SolarSource::Manual => "manual",
        }
    }
}

/// Which light driver applies commands.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Print commands through the logger.
    #[default]
    Log,
    /// Write Home Assistant service calls as JSON lines to stdout.
    Json,
}

impl DriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Log => "log",
            DriverKind::Json => "json",
        }
    }
}

/// One `[[normal_anchors]]` entry.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NormalAnchorConfig {
    pub at: String,
    pub offset_minutes: Option<i64>,
    pub kelvin: u32,
    pub brightness: u8,
}

/// One `[[lights]]` entry.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LightConfig {
    pub entity_id: String,
    /// Mode applied at startup.
    pub mode: Option<String>,
    pub brightness: Option<u32>,
    pub brightness_override: Option<u32>,
}

impl LightConfig {
    /// The `turn_on` request applied to this light at startup.
    pub fn startup_request(&self) -> TurnOnRequest {
        TurnOnRequest {
            mode: self.mode.clone().unwrap_or_else(|| NORMAL_MODE.to_string()),
            brightness: self.brightness.unwrap_or(DEFAULT_BRIGHTNESS),
            brightness_override: self
                .brightness_override
                .unwrap_or(DEFAULT_BRIGHTNESS_OVERRIDE),
        }
    }
}

/// Contents of `rightlight.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    pub solar_source: Option<SolarSource>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sunrise: Option<String>, // HH:MM:SS, manual source
    pub sunset: Option<String>,  // HH:MM:SS, manual source

    pub driver: Option<DriverKind>,

    pub on_transition: Option<f64>,
    pub color_transition: Option<f64>,
    pub off_transition: Option<f64>,
    pub specific_transition: Option<f64>,
    pub resend_delay: Option<f64>,
    pub commit_delay: Option<f64>,
    pub color_step_minutes: Option<u32>,

    pub ct_high: Option<f64>,
    pub ct_scalar: Option<f64>,
    pub overflow_ct_multiplier: Option<f64>,

    pub normal_anchors: Option<Vec<NormalAnchorConfig>>,
    pub palettes: Option<BTreeMap<String, Vec<[u8; 3]>>>,
    pub lights: Option<Vec<LightConfig>>,
}

impl Config {
    pub fn lights(&self) -> &[LightConfig] {
        self.lights.as_deref().unwrap_or(&[])
    }

    /// Print a summary of the effective configuration.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");

        let source = self.solar_source.unwrap_or_default();
        match source {
            SolarSource::Geo => {
                if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
                    let lat_dir = if lat >= 0.0 { "N" } else { "S" };
                    let lon_dir = if lon >= 0.0 { "E" } else { "W" };
                    log_indented!(
                        "Sun times: geo ({:.4}°{lat_dir}, {:.4}°{lon_dir})",
                        lat.abs(),
                        lon.abs()
                    );
                }
            }
            SolarSource::Manual => log_indented!(
                "Sun times: manual (sunrise {}, sunset {})",
                self.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE),
                self.sunset.as_deref().unwrap_or(DEFAULT_SUNSET)
            ),
        }

        log_indented!("Driver: {}", self.driver.unwrap_or_default().as_str());
        log_indented!(
            "Transitions: on {}s, color {}s, off {}s",
            self.on_transition.unwrap_or(DEFAULT_ON_TRANSITION),
            self.color_transition.unwrap_or(DEFAULT_COLOR_TRANSITION),
            self.off_transition.unwrap_or(DEFAULT_OFF_TRANSITION)
        );
        if let Some(anchors) = &self.normal_anchors {
            log_indented!("Normal curve: {} custom anchors", anchors.len());
        }
        if let Some(palettes) = &self.palettes {
            let names: Vec<&str> = palettes.keys().map(String::as_str).collect();
            log_indented!("Custom palettes: {}", names.join(", "));
        }
        for light in self.lights() {
            let request = light.startup_request();
            log_indented!(
                "Light {}: {} @ {} (+{})",
                light.entity_id,
                request.mode,
                request.brightness,
                request.brightness_override
            );
        }
    }
}
