//! Locating "now" between two trip points and interpolating the target.

use chrono::{DateTime, Duration, Local};
use std::time::Duration as StdDuration;

use super::trip_points::TripPoint;
use crate::common::constants::*;
use crate::common::utils::interpolate_f64;

/// The anchors bracketing an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub prev: TripPoint,
    pub next: TripPoint,
    pub prev_index: usize,
    pub next_index: usize,
    /// Position between `prev` and `next`, within [0, 1].
    pub ratio: f64,
    /// Whole seconds until `next`, at least one.
    pub remaining: StdDuration,
}

/// Find the anchors around `now`.
///
/// - `next` is the first anchor at or after `now` and `prev` the one before it.
/// - When `next` is the first anchor, `prev` is the last anchor moved back one
///   day, so the span still brackets `now`.
/// - After the last anchor the span is the final pair with ratio 1.
///
/// Returns `None` only for an empty curve.
pub fn locate(points: &[TripPoint], now: DateTime<Local>) -> Option<Span> {
    let last = points.len().checked_sub(1)?;
    let next_index = points.partition_point(|point| point.instant < now);

    let (prev_index, next_index, mut prev) = if next_index > last {
        let prev_index = last.saturating_sub(1);
        (prev_index, last, points[prev_index])
    } else if next_index == 0 {
        let mut wrapped = points[last];
        wrapped.instant -= Duration::days(1);
        (last, 0, wrapped)
    } else {
        (next_index - 1, next_index, points[next_index - 1])
    };
    let next = points[next_index];

    // A single-anchor curve wraps onto itself
    if prev.instant >= next.instant {
        prev.instant -= Duration::days(1);
    }

    let span = next.instant.signed_duration_since(prev.instant);
    let elapsed = now.signed_duration_since(prev.instant);
    let ratio = if span <= Duration::zero() {
        1.0
    } else {
        (elapsed.num_milliseconds() as f64 / span.num_milliseconds() as f64).clamp(0.0, 1.0)
    };

    let remaining = next
        .instant
        .signed_duration_since(now)
        .num_seconds()
        .max(MINIMUM_REMAINING_SECS as i64);

    Some(Span {
        prev,
        next,
        prev_index,
        next_index,
        ratio,
        remaining: StdDuration::from_secs(remaining as u64),
    })
}

/// Tuning of the white curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteCurve {
    /// Temperature a dimmed anchor is pulled away from.
    pub ct_high: f64,
    pub ct_scalar: f64,
    /// Kelvin added per unit of brightness above 255.
    pub overflow_ct_multiplier: f64,
}

impl Default for WhiteCurve {
    fn default() -> Self {
        Self {
            ct_high: DEFAULT_CT_HIGH,
            ct_scalar: DEFAULT_CT_SCALAR,
            overflow_ct_multiplier: DEFAULT_OVERFLOW_CT_MULTIPLIER,
        }
    }
}

impl WhiteCurve {
    /// Effective brightness and temperature at an anchor.
    fn anchor(&self, kelvin: u32, brightness_max: u8, requested: f64) -> (f64, f64) {
        let scale = f64::from(brightness_max) / MAX_BRIGHTNESS;
        let brightness = scale * requested;
        let kelvin = f64::from(kelvin);
        let ct = kelvin - (self.ct_high - kelvin) * (1.0 - scale) * self.ct_scalar;
        (brightness, ct)
    }
}

/// Interpolated white state: now, and the exact values at the next anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteState {
    pub brightness: f64,
    pub kelvin: f64,
    pub brightness_next: f64,
    pub kelvin_next: f64,
}

/// Interpolate between two white anchors given as `(kelvin, brightness_max)`.
///
/// Brightness above 255 is traded for warmer-to-cooler temperature: the excess
/// times the overflow multiplier is added to the current temperature.
pub fn interpolate_white(
    prev: (u32, u8),
    next: (u32, u8),
    ratio: f64,
    brightness: u32,
    brightness_override: u32,
    curve: &WhiteCurve,
) -> WhiteState {
    let requested = f64::from(brightness) + f64::from(brightness_override);
    let (br_prev, ct_prev) = curve.anchor(prev.0, prev.1, requested);
    let (br_next, ct_next) = curve.anchor(next.0, next.1, requested);

    let mut br = interpolate_f64(br_prev, br_next, ratio);
    let mut ct = interpolate_f64(ct_prev, ct_next, ratio);
    if br > MAX_BRIGHTNESS {
        ct += (br - MAX_BRIGHTNESS) * curve.overflow_ct_multiplier;
        br = MAX_BRIGHTNESS;
    }

    WhiteState {
        brightness: br,
        kelvin: ct,
        brightness_next: br_next.min(MAX_BRIGHTNESS),
        kelvin_next: ct_next,
    }
}

/// Per-channel interpolation: the color now and the next anchor's color.
pub fn interpolate_color(prev: [u8; 3], next: [u8; 3], ratio: f64) -> ([u8; 3], [u8; 3]) {
    let mut now = [0u8; 3];
    for (channel, value) in now.iter_mut().enumerate() {
        let mixed = interpolate_f64(f64::from(prev[channel]), f64::from(next[channel]), ratio);
        *value = to_u8(mixed);
    }
    (now, next)
}

/// Round into a command byte.
pub fn to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Round into a command temperature.
pub fn to_kelvin(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}
