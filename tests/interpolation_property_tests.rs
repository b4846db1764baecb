use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime};
use proptest::prelude::*;
use rightlight::core::interpolate::{WhiteCurve, interpolate_color, interpolate_white, locate};
use rightlight::core::mode::ModeRegistry;
use rightlight::core::trip_points::TripPointTable;
use rightlight::geo::DayBoundaries;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn table(sunrise_secs: u32, sunset_secs: u32, step_minutes: u32) -> TripPointTable {
    let day = DayBoundaries::from_times(
        date(),
        NaiveTime::from_num_seconds_from_midnight_opt(sunrise_secs, 0).unwrap(),
        NaiveTime::from_num_seconds_from_midnight_opt(sunset_secs, 0).unwrap(),
    )
    .unwrap();
    TripPointTable::build(&ModeRegistry::builtin(), &day, step_minutes).unwrap()
}

fn instant(table: &TripPointTable, seconds: u32) -> DateTime<Local> {
    table.day().midnight_early + Duration::seconds(i64::from(seconds))
}

/// Sunrise between 04:00 and 09:00
fn sunrise_strategy() -> impl Strategy<Value = u32> {
    (4 * 3600u32)..(9 * 3600)
}

/// Sunset between 16:00 and 21:00
fn sunset_strategy() -> impl Strategy<Value = u32> {
    (16 * 3600u32)..(21 * 3600)
}

/// Any second of the day, 00:00:00 through 23:59:59
fn second_of_day() -> impl Strategy<Value = u32> {
    0..86_400u32
}

fn rgb_strategy() -> impl Strategy<Value = [u8; 3]> {
    prop::array::uniform3(any::<u8>())
}

/// Properties of the per-day tables and `locate`
#[cfg(test)]
mod locate_tests {
    use super::*;

    proptest! {
        /// Every curve is strictly increasing and spans the whole day
        #[test]
        fn test_tables_strictly_increase(
            sunrise in sunrise_strategy(),
            sunset in sunset_strategy(),
            step in 1u32..=60,
        ) {
            let table = table(sunrise, sunset, step);
            for mode in ModeRegistry::builtin().names() {
                let points = table.points(&mode).unwrap();
                prop_assert!(points.windows(2).all(|pair| pair[0].instant < pair[1].instant));
                prop_assert_eq!(points[0].instant, table.day().midnight_early);
                prop_assert_eq!(points[points.len() - 1].instant, table.day().midnight_late);
            }
        }

        /// The located span brackets now and the ratio stays within [0, 1]
        #[test]
        fn test_span_brackets_now(
            sunrise in sunrise_strategy(),
            sunset in sunset_strategy(),
            second in second_of_day(),
        ) {
            let table = table(sunrise, sunset, 2);
            let now = instant(&table, second);

            for mode in ModeRegistry::builtin().names() {
                let span = locate(table.points(&mode).unwrap(), now).unwrap();
                prop_assert!(span.prev.instant <= now, "{mode}: prev after now");
                prop_assert!(now <= span.next.instant, "{mode}: next before now");
                prop_assert!((0.0..=1.0).contains(&span.ratio));
                prop_assert!(span.remaining.as_secs() >= 1);

                let gap = span.next.instant.signed_duration_since(span.prev.instant);
                prop_assert!(span.remaining.as_secs() as i64 <= gap.num_seconds().max(1));
            }
        }

        /// One second later never moves backwards along the curve
        #[test]
        fn test_ratio_advances_within_span(
            sunrise in sunrise_strategy(),
            sunset in sunset_strategy(),
            second in 0..86_398u32,
        ) {
            let table = table(sunrise, sunset, 2);
            let points = table.points("Normal").unwrap();
            let now = locate(points, instant(&table, second)).unwrap();
            let later = locate(points, instant(&table, second + 1)).unwrap();

            if now.next_index == later.next_index {
                prop_assert!(later.ratio >= now.ratio);
                prop_assert!(later.remaining <= now.remaining);
            }
        }
    }
}

/// Properties of the white and color interpolation
#[cfg(test)]
mod interpolation_tests {
    use super::*;

    fn anchor_strategy() -> impl Strategy<Value = (u32, u8)> {
        (2000u32..=6500, any::<u8>())
    }

    proptest! {
        /// Brightness never leaves 0-255, whatever the override
        #[test]
        fn test_white_brightness_bounds(
            prev in anchor_strategy(),
            next in anchor_strategy(),
            ratio in 0.0f64..=1.0,
            brightness in 0u32..=255,
            brightness_override in 0u32..=1020,
        ) {
            let state = interpolate_white(prev, next, ratio, brightness, brightness_override, &WhiteCurve::default());
            prop_assert!((0.0..=255.0).contains(&state.brightness));
            prop_assert!((0.0..=255.0).contains(&state.brightness_next));
            prop_assert!(state.kelvin.is_finite());
            prop_assert!(state.kelvin_next.is_finite());
        }

        /// At the ends of a span the white state equals the anchor values
        #[test]
        fn test_white_endpoints(
            prev in anchor_strategy(),
            next in anchor_strategy(),
            brightness in 0u32..=255,
        ) {
            let curve = WhiteCurve::default();
            let at_next = interpolate_white(prev, next, 1.0, brightness, 0, &curve);
            prop_assert!((at_next.brightness - at_next.brightness_next).abs() < 1e-9);
            prop_assert!((at_next.kelvin - at_next.kelvin_next).abs() < 1e-9);

            let at_prev = interpolate_white(prev, next, 0.0, brightness, 0, &curve);
            let expected = f64::from(prev.1) / 255.0 * f64::from(brightness);
            prop_assert!((at_prev.brightness - expected).abs() < 1e-9);
        }

        /// Each color channel lies between the two anchors' channels
        #[test]
        fn test_color_channels_between_anchors(
            prev in rgb_strategy(),
            next in rgb_strategy(),
            ratio in 0.0f64..=1.0,
        ) {
            let (now, target) = interpolate_color(prev, next, ratio);
            prop_assert_eq!(target, next);
            for channel in 0..3 {
                let low = prev[channel].min(next[channel]);
                let high = prev[channel].max(next[channel]);
                prop_assert!(low <= now[channel] && now[channel] <= high);
            }
        }
    }
}
