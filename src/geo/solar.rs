//! Solar time providers.
//!
//! A provider answers one question: at which UTC instant does the sun rise or
//! set at a location on a calendar date. [`AstronomicalSolar`] computes it,
//! [`ManualSolar`] returns fixed local clock times from the configuration.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::time_source::local_datetime;

/// Source of sunrise and sunset instants.
#[cfg_attr(test, mockall::automock)]
pub trait SolarTimeProvider {
    fn sunrise_utc(&self, latitude: f64, longitude: f64, date: NaiveDate) -> Result<DateTime<Utc>>;
    fn sunset_utc(&self, latitude: f64, longitude: f64, date: NaiveDate) -> Result<DateTime<Utc>>;
}

/// Astronomical sunrise/sunset via the `sunrise` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstronomicalSolar;

impl AstronomicalSolar {
    fn event(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        event: SolarEvent,
    ) -> Result<DateTime<Utc>> {
        let coord = Coordinates::new(latitude, longitude).ok_or_else(|| {
            anyhow::anyhow!("Invalid coordinates: {latitude:.4}°, {longitude:.4}°")
        })?;
        let name = event_name(&event);
        let instant = SolarDay::new(coord, date).event_time(event);

        // Polar day and night produce instants far from the requested date
        let distance = (instant.date_naive() - date).num_days().abs();
        if distance > 1 {
            anyhow::bail!(
                "No {name} on {date} at {latitude:.4}°, {longitude:.4}°"
            );
        }
        Ok(instant)
    }
}

fn event_name(event: &SolarEvent) -> &'static str {
    match event {
        SolarEvent::Sunrise => "sunrise",
        SolarEvent::Sunset => "sunset",
        _ => "solar event",
    }
}

impl SolarTimeProvider for AstronomicalSolar {
    fn sunrise_utc(&self, latitude: f64, longitude: f64, date: NaiveDate) -> Result<DateTime<Utc>> {
        self.event(latitude, longitude, date, SolarEvent::Sunrise)
    }

    fn sunset_utc(&self, latitude: f64, longitude: f64, date: NaiveDate) -> Result<DateTime<Utc>> {
        self.event(latitude, longitude, date, SolarEvent::Sunset)
    }
}

/// Fixed local sunrise and sunset clock times.
///
/// Coordinates are ignored.
#[derive(Debug, Clone, Copy)]
pub struct ManualSolar {
    sunrise: NaiveTime,
    sunset: NaiveTime,
}

impl ManualSolar {
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self { sunrise, sunset }
    }

    /// Parse "HH:MM:SS" clock times.
    pub fn parse(sunrise: &str, sunset: &str) -> Result<Self> {
        let sunrise = NaiveTime::parse_from_str(sunrise, "%H:%M:%S")
            .with_context(|| format!("Invalid sunrise time '{sunrise}'"))?;
        let sunset = NaiveTime::parse_from_str(sunset, "%H:%M:%S")
            .with_context(|| format!("Invalid sunset time '{sunset}'"))?;
        Ok(Self::new(sunrise, sunset))
    }

    fn on(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>> {
        local_datetime(date.and_time(time))
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| anyhow::anyhow!("{time} does not exist on {date} in the local timezone"))
    }
}

impl SolarTimeProvider for ManualSolar {
    fn sunrise_utc(&self, _latitude: f64, _longitude: f64, date: NaiveDate) -> Result<DateTime<Utc>> {
        self.on(date, self.sunrise)
    }

    fn sunset_utc(&self, _latitude: f64, _longitude: f64, date: NaiveDate) -> Result<DateTime<Utc>> {
        self.on(date, self.sunset)
    }
}
