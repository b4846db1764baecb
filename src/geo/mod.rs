//! Sunrise/sunset providers and the per-day boundary instants derived from them.
//!
//! - [`solar`]: the [`SolarTimeProvider`] seam with astronomical and manual sources
//! - [`times`]: [`DayBoundaries`], the local instants a trip-point table is anchored on

pub mod solar;
pub mod times;

pub use solar::{AstronomicalSolar, ManualSolar, SolarTimeProvider};
pub use times::DayBoundaries;

use anyhow::Result;
use chrono::NaiveDate;


/// A solar provider bound to one location.
///
/// This is what a controller holds: everything needed to produce the
/// boundaries of any calendar day.
pub struct Daylight {
    provider: Box<dyn SolarTimeProvider>,
    latitude: f64,
    longitude: f64,
}

impl Daylight {
    pub fn new(provider: Box<dyn SolarTimeProvider>, latitude: f64, longitude: f64) -> Self {
        Self {
            provider,
            latitude,
            longitude,
        }
    }

    /// Compute the boundaries of `date` in the local timezone.
    pub fn boundaries(&self, date: NaiveDate) -> Result<DayBoundaries> {
        DayBoundaries::for_date(self.provider.as_ref(), self.latitude, self.longitude, date)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Debug for Daylight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daylight")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .finish_non_exhaustive()
    }
}
