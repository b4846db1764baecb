//! Time source abstraction for real and simulated time.
//!
//! Controllers never read the system clock directly. They receive a
//! [`TimeSource`], which lets the simulate command and the test suite run whole
//! days of scheduled transitions instantly and deterministically.

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

/// Process-wide source used by the logger for simulation timestamps.
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Sleep for the specified duration (or simulate it).
    fn sleep(&self, duration: StdDuration);

    fn is_simulated(&self) -> bool;

    /// Whether a simulation has reached its end (always false for real time).
    fn is_ended(&self) -> bool {
        false
    }
}

/// Wall-clock time.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Simulated time between a start and an end instant.
///
/// Two modes are supported:
/// - fast-forward (`multiplier == 0.0`): `sleep` advances the clock instantly;
/// - accelerated (`multiplier > 0.0`): `sleep` blocks for `duration / multiplier`
///   of real time, then advances the clock by `duration`.
///
/// The clock never moves past `end_time`.
pub struct SimulatedTimeSource {
    end_time: DateTime<Local>,
    time_multiplier: f64,
    current: Mutex<DateTime<Local>>,
}

impl SimulatedTimeSource {
    /// Create a simulated source; negative multipliers fall back to 3600x.
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        let time_multiplier = if multiplier == 0.0 {
            0.0
        } else if multiplier < 0.0 || !multiplier.is_finite() {
            3600.0
        } else {
            multiplier
        };
        Self {
            end_time,
            time_multiplier,
            current: Mutex::new(start_time),
        }
    }

    /// Fast-forward source, the form used by tests.
    pub fn fast_forward(start_time: DateTime<Local>, end_time: DateTime<Local>) -> Self {
        Self::new(start_time, end_time, 0.0)
    }

    /// Move the clock forward by `duration` without sleeping.
    pub fn advance(&self, duration: StdDuration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let step = ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::zero());
        *current = (*current + step).min(self.end_time);
    }

    /// Jump to an absolute instant (clamped to the end time).
    pub fn set(&self, instant: DateTime<Local>) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = instant.min(self.end_time);
    }

    pub fn end_time(&self) -> DateTime<Local> {
        self.end_time
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: StdDuration) {
        let remaining = crate::common::utils::until(self.now(), self.end_time);
        let duration = duration.min(remaining);

        if self.time_multiplier > 0.0 && !duration.is_zero() {
            std::thread::sleep(StdDuration::from_secs_f64(
                duration.as_secs_f64() / self.time_multiplier,
            ));
        }
        self.advance(duration);
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.now() >= self.end_time
    }
}

/// Install the process-wide time source (call once at startup).
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the process-wide source has been installed.
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// The process-wide source, defaulting to real time.
pub fn global() -> Arc<dyn TimeSource> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).clone()
}

pub fn now() -> DateTime<Local> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

pub fn is_simulated() -> bool {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .is_simulated()
}

/// Resolve a naive local datetime, taking the earlier instant on DST folds.
pub fn local_datetime(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&naive).earliest()
}

/// Parse "YYYY-MM-DD HH:MM:SS" as a local time.
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        anyhow::anyhow!("Invalid datetime format '{s}': {e}. Use YYYY-MM-DD HH:MM:SS")
    })?;
    local_datetime(naive).ok_or_else(|| anyhow::anyhow!("'{s}' does not exist in the local timezone"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Local> {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn test_fast_forward_sleep_advances_instantly() {
        let clock = SimulatedTimeSource::fast_forward(
            at("2024-06-15 12:00:00"),
            at("2024-06-15 13:00:00"),
        );
        clock.sleep(StdDuration::from_secs(90));
        assert_eq!(clock.now(), at("2024-06-15 12:01:30"));
        assert!(!clock.is_ended());
    }

    #[test]
    fn test_simulation_stops_at_end_time() {
        let clock = SimulatedTimeSource::fast_forward(
            at("2024-06-15 12:00:00"),
            at("2024-06-15 12:10:00"),
        );
        clock.sleep(StdDuration::from_secs(3600));
        assert_eq!(clock.now(), at("2024-06-15 12:10:00"));
        assert!(clock.is_ended());
    }

    #[test]
    fn test_today_follows_simulated_clock() {
        let clock = SimulatedTimeSource::fast_forward(
            at("2024-06-15 23:59:30"),
            at("2024-06-16 01:00:00"),
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        clock.advance(StdDuration::from_secs(60));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("2024-06-15T12:00").is_err());
        assert!(parse_datetime("yesterday").is_err());
    }
}
