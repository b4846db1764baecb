//! Configuration validation.
//!
//! Rejects values that would make the controllers misbehave: out-of-range
//! numbers, unknown modes, duplicate lights, empty palettes and Normal
//! anchors that are out of order on today's sun times.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::collections::HashSet;

use super::{Config, SolarSource};
use crate::common::constants::*;
use crate::core::LightEnvironment;
use crate::core::mode::{AnchorTime, ModeRegistry};

pub fn validate_config(config: &Config) -> Result<()> {
    validate_location(config)?;

    validate_transition(config.on_transition, "on_transition")?;
    validate_transition(config.color_transition, "color_transition")?;
    validate_transition(config.off_transition, "off_transition")?;
    validate_transition(config.specific_transition, "specific_transition")?;
    validate_transition(config.resend_delay, "resend_delay")?;
    validate_transition(config.commit_delay, "commit_delay")?;

    if let Some(step) = config.color_step_minutes
        && !(MINIMUM_COLOR_STEP_MINUTES..=MAXIMUM_COLOR_STEP_MINUTES).contains(&step)
    {
        anyhow::bail!(
            "color_step_minutes ({step}) must be between {MINIMUM_COLOR_STEP_MINUTES} and {MAXIMUM_COLOR_STEP_MINUTES} minutes"
        );
    }

    validate_white_curve(config)?;
    validate_palettes(config)?;
    validate_anchors(config)?;
    validate_lights(config)?;
    validate_anchor_order(config)?;

    Ok(())
}

fn validate_location(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {lat})");
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!("longitude must be between -180 and 180 degrees (got {lon})");
    }

    match config.solar_source.unwrap_or_default() {
        SolarSource::Geo => {
            if config.latitude.is_none() || config.longitude.is_none() {
                anyhow::bail!(
                    "solar_source = \"geo\" requires latitude and longitude (or use solar_source = \"manual\")"
                );
            }
        }
        SolarSource::Manual => {
            let sunrise = config.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE);
            let sunset = config.sunset.as_deref().unwrap_or(DEFAULT_SUNSET);
            let sunrise = NaiveTime::parse_from_str(sunrise, "%H:%M:%S")
                .context("Invalid sunrise time format, use HH:MM:SS")?;
            let sunset = NaiveTime::parse_from_str(sunset, "%H:%M:%S")
                .context("Invalid sunset time format, use HH:MM:SS")?;
            if sunrise >= sunset {
                anyhow::bail!(
                    "sunrise ({}) must be before sunset ({})",
                    sunrise.format("%H:%M:%S"),
                    sunset.format("%H:%M:%S")
                );
            }
        }
    }
    Ok(())
}

fn validate_transition(value: Option<f64>, field: &str) -> Result<()> {
    if let Some(secs) = value
        && !(secs.is_finite() && (0.0..=MAXIMUM_TRANSITION_SECS).contains(&secs))
    {
        anyhow::bail!("{field} ({secs}) must be between 0 and {MAXIMUM_TRANSITION_SECS} seconds");
    }
    Ok(())
}

fn validate_white_curve(config: &Config) -> Result<()> {
    if let Some(ct_high) = config.ct_high
        && !(f64::from(MINIMUM_TEMP)..=f64::from(MAXIMUM_TEMP)).contains(&ct_high)
    {
        anyhow::bail!("ct_high ({ct_high}) must be between {MINIMUM_TEMP} and {MAXIMUM_TEMP} Kelvin");
    }

    if let Some(scalar) = config.ct_scalar
        && !(MINIMUM_CT_SCALAR..=MAXIMUM_CT_SCALAR).contains(&scalar)
    {
        anyhow::bail!(
            "ct_scalar ({scalar}) must be between {MINIMUM_CT_SCALAR} and {MAXIMUM_CT_SCALAR}"
        );
    }

    if let Some(multiplier) = config.overflow_ct_multiplier
        && !(MINIMUM_OVERFLOW_CT_MULTIPLIER..=MAXIMUM_OVERFLOW_CT_MULTIPLIER).contains(&multiplier)
    {
        anyhow::bail!(
            "overflow_ct_multiplier ({multiplier}) must be between {MINIMUM_OVERFLOW_CT_MULTIPLIER} and {MAXIMUM_OVERFLOW_CT_MULTIPLIER}"
        );
    }
    Ok(())
}

fn validate_palettes(config: &Config) -> Result<()> {
    for (name, colors) in config.palettes.iter().flatten() {
        if name == NORMAL_MODE {
            anyhow::bail!("'{NORMAL_MODE}' is the white curve and cannot be a palette");
        }
        if name.trim().is_empty() {
            anyhow::bail!("Palette names cannot be empty");
        }
        if colors.is_empty() {
            anyhow::bail!("Palette '{name}' needs at least one color");
        }
    }
    Ok(())
}

fn validate_anchors(config: &Config) -> Result<()> {
    let Some(anchors) = &config.normal_anchors else {
        return Ok(());
    };

    if anchors.is_empty() {
        anyhow::bail!("normal_anchors needs at least one anchor (remove it to use the default curve)");
    }

    for (index, anchor) in anchors.iter().enumerate() {
        AnchorTime::parse(&anchor.at)
            .with_context(|| format!("normal_anchors[{index}]"))?;
        if !(MINIMUM_TEMP..=MAXIMUM_TEMP).contains(&anchor.kelvin) {
            anyhow::bail!(
                "normal_anchors[{index}].kelvin ({}) must be between {MINIMUM_TEMP} and {MAXIMUM_TEMP}",
                anchor.kelvin
            );
        }
    }
    Ok(())
}

fn validate_lights(config: &Config) -> Result<()> {
    let mut modes: HashSet<String> = ModeRegistry::builtin().names().into_iter().collect();
    modes.extend(config.palettes.iter().flat_map(|p| p.keys().cloned()));

    let mut seen = HashSet::new();
    for light in config.lights() {
        if light.entity_id.trim().is_empty() {
            anyhow::bail!("Lights need a non-empty entity_id");
        }
        if !seen.insert(light.entity_id.as_str()) {
            anyhow::bail!("Light '{}' is configured more than once", light.entity_id);
        }
        if let Some(mode) = &light.mode
            && !modes.contains(mode.as_str())
        {
            let mut available: Vec<&str> = modes.iter().map(String::as_str).collect();
            available.sort_unstable();
            anyhow::bail!(
                "Light '{}' uses unknown mode '{mode}' (available: {})",
                light.entity_id,
                available.join(", ")
            );
        }
        if let Some(brightness) = light.brightness
            && brightness > u32::from(u8::MAX)
        {
            anyhow::bail!(
                "Light '{}' brightness ({brightness}) must be between 0 and 255",
                light.entity_id
            );
        }
        if let Some(brightness_override) = light.brightness_override
            && brightness_override > MAXIMUM_BRIGHTNESS_OVERRIDE
        {
            anyhow::bail!(
                "Light '{}' brightness_override ({brightness_override}) must be between 0 and {MAXIMUM_BRIGHTNESS_OVERRIDE}",
                light.entity_id
            );
        }
    }
    Ok(())
}

/// Normal anchors must be strictly increasing on today's sun times.
///
/// Skipped when today's sun times cannot be computed; the controllers fall
/// back at runtime in that case.
fn validate_anchor_order(config: &Config) -> Result<()> {
    if config.normal_anchors.is_none() {
        return Ok(());
    }

    let env = LightEnvironment::from_config(config)?;
    let today = crate::time_source::global().today();
    let day = match env.daylight.boundaries(today) {
        Ok(day) => day,
        Err(e) => {
            log_warning!("Skipping anchor order check, no sun times for {today}: {e:#}");
            return Ok(());
        }
    };

    let mut previous: Option<(String, chrono::DateTime<chrono::Local>)> = None;
    for anchor in env.modes.normal_anchors() {
        let instant = anchor.resolve(&day)?;
        if let Some((label, before)) = &previous
            && instant <= *before
        {
            anyhow::bail!(
                "Normal anchor {} ({}) must come after {label} ({}) on {today}",
                anchor.label(),
                instant.format("%H:%M:%S"),
                before.format("%H:%M:%S")
            );
        }
        previous = Some((anchor.label(), instant));
    }
    Ok(())
}
