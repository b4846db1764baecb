//! What a controller runs against.
//!
//! [`LightEnvironment`] is built once from the configuration and shared by
//! every light. [`LightContext`] bundles the collaborators an operation
//! borrows for its duration: the clock, the scheduler and the driver.

use anyhow::Result;

use super::interpolate::WhiteCurve;
use super::mode::ModeRegistry;
use super::scheduler::Scheduler;
use crate::backend::LightDriver;
use crate::common::constants::*;
use crate::config::{Config, SolarSource};
use crate::geo::{AstronomicalSolar, Daylight, ManualSolar, SolarTimeProvider};
use crate::time_source::TimeSource;

/// Transition and delay durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    pub on_transition: f64,
    pub color_transition: f64,
    pub off_transition: f64,
    pub specific_transition: f64,
    pub resend_delay: f64,
    /// Added to the on transition before the commit fires.
    pub commit_delay: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            on_transition: DEFAULT_ON_TRANSITION,
            color_transition: DEFAULT_COLOR_TRANSITION,
            off_transition: DEFAULT_OFF_TRANSITION,
            specific_transition: DEFAULT_SPECIFIC_TRANSITION,
            resend_delay: DEFAULT_RESEND_DELAY,
            commit_delay: DEFAULT_COMMIT_DELAY,
        }
    }
}

impl Timings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            on_transition: config.on_transition.unwrap_or(DEFAULT_ON_TRANSITION),
            color_transition: config.color_transition.unwrap_or(DEFAULT_COLOR_TRANSITION),
            off_transition: config.off_transition.unwrap_or(DEFAULT_OFF_TRANSITION),
            specific_transition: config
                .specific_transition
                .unwrap_or(DEFAULT_SPECIFIC_TRANSITION),
            resend_delay: config.resend_delay.unwrap_or(DEFAULT_RESEND_DELAY),
            commit_delay: config.commit_delay.unwrap_or(DEFAULT_COMMIT_DELAY),
        }
    }
}

/// Shared, read-only inputs of every controller.
#[derive(Debug)]
pub struct LightEnvironment {
    pub daylight: Daylight,
    pub modes: ModeRegistry,
    pub timings: Timings,
    pub white: WhiteCurve,
    pub color_step_minutes: u32,
}

impl LightEnvironment {
    /// Environment with built-in modes and default tuning.
    pub fn new(daylight: Daylight) -> Self {
        Self {
            daylight,
            modes: ModeRegistry::builtin(),
            timings: Timings::default(),
            white: WhiteCurve::default(),
            color_step_minutes: DEFAULT_COLOR_STEP_MINUTES,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider: Box<dyn SolarTimeProvider> = match config.solar_source.unwrap_or_default() {
            SolarSource::Geo => Box::new(AstronomicalSolar),
            SolarSource::Manual => Box::new(ManualSolar::parse(
                config.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE),
                config.sunset.as_deref().unwrap_or(DEFAULT_SUNSET),
            )?),
        };
        let daylight = Daylight::new(
            provider,
            config.latitude.unwrap_or(0.0),
            config.longitude.unwrap_or(0.0),
        );

        Ok(Self {
            daylight,
            modes: ModeRegistry::from_config(config)?,
            timings: Timings::from_config(config),
            white: WhiteCurve {
                ct_high: config.ct_high.unwrap_or(DEFAULT_CT_HIGH),
                ct_scalar: config.ct_scalar.unwrap_or(DEFAULT_CT_SCALAR),
                overflow_ct_multiplier: config
                    .overflow_ct_multiplier
                    .unwrap_or(DEFAULT_OVERFLOW_CT_MULTIPLIER),
            },
            color_step_minutes: config
                .color_step_minutes
                .unwrap_or(DEFAULT_COLOR_STEP_MINUTES),
        })
    }
}

/// Collaborators borrowed by one controller operation.
pub struct LightContext<'a> {
    pub clock: &'a dyn TimeSource,
    pub scheduler: &'a mut dyn Scheduler,
    pub driver: &'a mut dyn LightDriver,
}
