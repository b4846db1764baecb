//! Local day boundaries used to anchor trip points.
//!
//! All instants are normalized onto one calendar date: a sunrise the provider
//! reports on the neighbouring UTC day keeps its local time of day but moves
//! onto `date`.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};

use super::solar::SolarTimeProvider;
use crate::common::constants::{LATE_EVENING_HOUR, LATE_EVENING_MINUTE};
use crate::time_source::local_datetime;

/// The named instants of one local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBoundaries {
    pub date: NaiveDate,
    /// 00:00:00
    pub midnight_early: DateTime<Local>,
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
    /// 22:30:00
    pub late_evening: DateTime<Local>,
    /// 23:59:59
    pub midnight_late: DateTime<Local>,
    /// Set when these boundaries were carried over from an earlier day
    /// because the solar provider failed.
    pub degraded: bool,
}

impl DayBoundaries {
    /// Query `provider` and build the boundaries of `date`.
    pub fn for_date(
        provider: &dyn SolarTimeProvider,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<Self> {
        let sunrise = provider
            .sunrise_utc(latitude, longitude, date)
            .with_context(|| format!("Failed to get sunrise for {date}"))?;
        let sunset = provider
            .sunset_utc(latitude, longitude, date)
            .with_context(|| format!("Failed to get sunset for {date}"))?;

        let sunrise = sunrise.with_timezone(&Local).time();
        let sunset = sunset.with_timezone(&Local).time();

        let boundaries = Self::from_times(date, sunrise, sunset)?;
        log_debug!(
            "Day boundaries for {date}: sunrise {}, sunset {}",
            sunrise.format("%H:%M:%S"),
            sunset.format("%H:%M:%S")
        );
        Ok(boundaries)
    }

    /// Build boundaries from local sunrise and sunset clock times.
    pub fn from_times(date: NaiveDate, sunrise: NaiveTime, sunset: NaiveTime) -> Result<Self> {
        if sunrise >= sunset {
            anyhow::bail!(
                "Sunrise ({}) must come before sunset ({}) on {date}",
                sunrise.format("%H:%M:%S"),
                sunset.format("%H:%M:%S")
            );
        }

        let late_evening = NaiveTime::from_hms_opt(LATE_EVENING_HOUR, LATE_EVENING_MINUTE, 0)
            .context("Invalid late evening time")?;

        Ok(Self {
            date,
            midnight_early: on(date, NaiveTime::MIN)?,
            sunrise: on(date, sunrise)?,
            sunset: on(date, sunset)?,
            late_evening: on(date, late_evening)?,
            midnight_late: on(date, end_of_day())?,
            degraded: false,
        })
    }

    /// The same clock times re-anchored onto another date, marked degraded.
    pub fn shifted_to(&self, date: NaiveDate) -> Result<Self> {
        let mut shifted = Self::from_times(date, self.sunrise.time(), self.sunset.time())?;
        shifted.degraded = true;
        Ok(shifted)
    }

    /// A local clock time on this day.
    pub fn at(&self, time: NaiveTime) -> Result<DateTime<Local>> {
        on(self.date, time)
    }
}

/// 23:59:59, the last anchor of every day.
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

fn on(date: NaiveDate, time: NaiveTime) -> Result<DateTime<Local>> {
    local_datetime(date.and_time(time))
        .ok_or_else(|| anyhow::anyhow!("{time} does not exist on {date} in the local timezone"))
}
