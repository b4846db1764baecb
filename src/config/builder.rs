//! Default configuration file generation.
//!
//! The default file is assembled with [`ConfigBuilder`], which aligns the
//! trailing comments of every setting so the file stays readable when the
//! constants change.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::{DriverKind, SolarSource};
use crate::common::constants::*;

/// Write the commented default configuration to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content()).context("Failed to write default config file")?;
    Ok(())
}

/// Text of the default configuration.
///
/// It uses the manual solar source so it is valid without coordinates.
pub fn default_config_content() -> String {
    ConfigBuilder::new()
        .add_section("Location")
        .add_setting(
            "solar_source",
            &format!("\"{}\"", SolarSource::Manual.as_str()),
            "\"geo\" (latitude/longitude) or \"manual\" (sunrise/sunset below)",
        )
        .add_setting(
            "sunrise",
            &format!("\"{DEFAULT_SUNRISE}\""),
            "Manual sunrise time (HH:MM:SS)",
        )
        .add_setting(
            "sunset",
            &format!("\"{DEFAULT_SUNSET}\""),
            "Manual sunset time (HH:MM:SS)",
        )
        .add_comment("latitude = 52.5200    # Required for solar_source = \"geo\"")
        .add_comment("longitude = 13.4050")
        .add_section("Driver")
        .add_setting(
            "driver",
            &format!("\"{}\"", DriverKind::default().as_str()),
            "\"log\" (dry run) or \"json\" (service calls on stdout)",
        )
        .add_section("Timings")
        .add_setting(
            "on_transition",
            &DEFAULT_ON_TRANSITION.to_string(),
            &format!("Seconds for the immediate white command (0-{MAXIMUM_TRANSITION_SECS})"),
        )
        .add_setting(
            "color_transition",
            &DEFAULT_COLOR_TRANSITION.to_string(),
            &format!("Seconds for the immediate color command (0-{MAXIMUM_TRANSITION_SECS})"),
        )
        .add_setting(
            "off_transition",
            &DEFAULT_OFF_TRANSITION.to_string(),
            "Seconds to fade out when turned off",
        )
        .add_setting(
            "specific_transition",
            &DEFAULT_SPECIFIC_TRANSITION.to_string(),
            "Seconds for fixed (non-curve) commands",
        )
        .add_setting(
            "resend_delay",
            &DEFAULT_RESEND_DELAY.to_string(),
            "Seconds before a fixed command is sent again",
        )
        .add_setting(
            "commit_delay",
            &DEFAULT_COMMIT_DELAY.to_string(),
            "Seconds after the immediate command before fading to the next anchor",
        )
        .add_setting(
            "color_step_minutes",
            &DEFAULT_COLOR_STEP_MINUTES.to_string(),
            &format!(
                "Minutes between color anchors ({MINIMUM_COLOR_STEP_MINUTES}-{MAXIMUM_COLOR_STEP_MINUTES})"
            ),
        )
        .add_section("White curve")
        .add_setting(
            "ct_high",
            &DEFAULT_CT_HIGH.to_string(),
            &format!("Kelvin a dimmed anchor is pulled away from ({MINIMUM_TEMP}-{MAXIMUM_TEMP})"),
        )
        .add_setting(
            "ct_scalar",
            &DEFAULT_CT_SCALAR.to_string(),
            &format!("Strength of the dimming compensation ({MINIMUM_CT_SCALAR}-{MAXIMUM_CT_SCALAR})"),
        )
        .add_setting(
            "overflow_ct_multiplier",
            &DEFAULT_OVERFLOW_CT_MULTIPLIER.to_string(),
            "Kelvin added per unit of brightness above 255",
        )
        .add_section("Lights")
        .add_table("lights")
        .add_setting("entity_id", "\"light.living_room\"", "Entity to control")
        .add_setting(
            "mode",
            &format!("\"{NORMAL_MODE}\""),
            "Normal, Vivid, Bright, One, Two or a custom palette",
        )
        .add_setting(
            "brightness",
            &DEFAULT_BRIGHTNESS.to_string(),
            "Master brightness (0-255)",
        )
        .add_setting(
            "brightness_override",
            &DEFAULT_BRIGHTNESS_OVERRIDE.to_string(),
            &format!("Extra brightness, beyond 255 shifts color temperature (0-{MAXIMUM_BRIGHTNESS_OVERRIDE})"),
        )
        .build()
}

/// Builder for aligned configuration text.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    /// `[[name]]` array-of-tables header
    Table(String),
    Comment(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_table(mut self, name: &str) -> Self {
        self.entries.push(ConfigEntry::Table(format!("[[{name}]]")));
        self
    }

    fn add_comment(mut self, text: &str) -> Self {
        self.entries.push(ConfigEntry::Comment(format!("# {text}")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        // One space between the longest setting and its comment
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !result.is_empty() {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Table(header) | ConfigEntry::Comment(header) => result.push(header),
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}
