//! Light driver abstraction.
//!
//! Controllers never talk to hardware directly. They produce absolute
//! [`LightCommand`]s and hand them to a [`LightDriver`], which applies them
//! through whatever transport is configured:
//!
//! - **Log**: dry run, every command is printed through the logger
//! - **Json**: one Home Assistant style `call_service` object per line on a writer
//! - **Recording**: in-memory capture for tests (`testing-support` feature)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::{Config, DriverKind};

pub mod json;
pub mod log;
#[cfg(any(test, feature = "testing-support"))]
pub mod recording;

/// Color attribute of a command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightColor {
    /// Color temperature in Kelvin.
    Kelvin(u32),
    /// Color temperature in mireds.
    Mireds(u32),
    Rgb([u8; 3]),
}

impl std::fmt::Display for LightColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kelvin(k) => write!(f, "{k}K"),
            Self::Mireds(m) => write!(f, "{m} mireds"),
            Self::Rgb([r, g, b]) => write!(f, "rgb({r}, {g}, {b})"),
        }
    }
}

/// An absolute "turn on" request for one light.
#[derive(Debug, Clone, PartialEq)]
pub struct LightCommand {
    pub entity_id: String,
    pub brightness: Option<u8>,
    pub color: Option<LightColor>,
    /// Transition duration in seconds.
    pub transition: f64,
}

impl LightCommand {
    pub fn new(entity_id: impl Into<String>, transition: f64) -> Self {
        Self {
            entity_id: entity_id.into(),
            brightness: None,
            color: None,
            transition,
        }
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn with_color(mut self, color: LightColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Service data in the shape Home Assistant's `light.turn_on` accepts.
    pub fn service_data(&self) -> Value {
        let mut data = Map::new();
        data.insert("entity_id".into(), json!(self.entity_id));
        if let Some(brightness) = self.brightness {
            data.insert("brightness".into(), json!(brightness));
        }
        match self.color {
            Some(LightColor::Kelvin(k)) => {
                data.insert("kelvin".into(), json!(k));
            }
            Some(LightColor::Mireds(m)) => {
                data.insert("color_temp".into(), json!(m));
            }
            Some(LightColor::Rgb(rgb)) => {
                data.insert("rgb_color".into(), json!(rgb));
            }
            None => {}
        }
        data.insert("transition".into(), json!(self.transition));
        Value::Object(data)
    }
}

impl std::fmt::Display for LightCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on", self.entity_id)?;
        if let Some(brightness) = self.brightness {
            write!(f, " brightness={brightness}")?;
        }
        if let Some(color) = self.color {
            write!(f, " color={color}")?;
        }
        write!(f, " transition={:.1}s", self.transition)
    }
}

/// Applies commands to lights.
///
/// Failures are reported to the caller and never retried by the driver.
#[cfg_attr(test, mockall::automock)]
pub trait LightDriver {
    /// Turn a light on with the given absolute attributes.
    fn set_on(&mut self, command: &LightCommand) -> Result<()>;

    /// Turn a light off over `transition` seconds.
    fn set_off(&mut self, entity_id: &str, transition: f64) -> Result<()>;

    /// Human-readable name for log output.
    fn driver_name(&self) -> &'static str;
}

/// Create the driver selected in the configuration.
pub fn create_driver(config: &Config) -> Result<Box<dyn LightDriver>> {
    match config.driver.unwrap_or_default() {
        DriverKind::Log => Ok(Box::new(log::LogDriver::new())),
        DriverKind::Json => Ok(Box::new(json::JsonDriver::stdout())),
    }
}
