//! Small shared helpers: interpolation, duration conversion and path display.

use chrono::{DateTime, Local};
use std::path::Path;
use std::time::Duration as StdDuration;

/// Linear interpolation between `start` and `end` at `progress`.
///
/// `progress` is not clamped; callers pass an already clamped ratio.
pub fn interpolate_f64(start: f64, end: f64, progress: f64) -> f64 {
    start + (end - start) * progress
}

/// Convert fractional seconds (configuration values) into a `Duration`.
///
/// Negative and non-finite inputs collapse to zero.
pub fn seconds(secs: f64) -> StdDuration {
    if secs.is_finite() && secs > 0.0 {
        StdDuration::from_secs_f64(secs)
    } else {
        StdDuration::ZERO
    }
}

/// Add a std duration to a local instant, saturating at the representable range.
pub fn add_std(instant: DateTime<Local>, duration: StdDuration) -> DateTime<Local> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|d| instant.checked_add_signed(d))
        .unwrap_or(instant)
}

/// Non-negative distance from `from` to `to` as a std duration.
pub fn until(from: DateTime<Local>, to: DateTime<Local>) -> StdDuration {
    to.signed_duration_since(from)
        .to_std()
        .unwrap_or(StdDuration::ZERO)
}

/// Render a path with the home directory replaced by `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Human readable `1h 02m 03s` style rendering of a duration.
pub fn format_duration(duration: StdDuration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {secs:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}
