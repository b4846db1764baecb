//! Per-day trip-point tables.
//!
//! A table maps every mode to a strictly increasing list of (instant, target)
//! pairs covering one local calendar day, from 00:00:00 to 23:59:59.

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate};
use std::collections::HashMap;

use super::mode::{Curve, ModeRegistry, NormalAnchor};
use crate::geo::DayBoundaries;

/// Target state at an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TripTarget {
    White { kelvin: u32, brightness_max: u8 },
    Color([u8; 3]),
}

impl std::fmt::Display for TripTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White {
                kelvin,
                brightness_max,
            } => write!(f, "{kelvin}K @ {brightness_max}"),
            Self::Color([r, g, b]) => write!(f, "rgb({r}, {g}, {b})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripPoint {
    pub instant: DateTime<Local>,
    pub target: TripTarget,
}

/// All modes' trip points for one day.
#[derive(Debug, Clone)]
pub struct TripPointTable {
    day: DayBoundaries,
    curves: HashMap<String, Vec<TripPoint>>,
}

impl TripPointTable {
    /// Generate every mode in `registry` for `day`.
    ///
    /// Normal anchors that do not fall strictly after the previously kept
    /// anchor are dropped with a warning. Empty palettes produce no curve.
    pub fn build(registry: &ModeRegistry, day: &DayBoundaries, step_minutes: u32) -> Result<Self> {
        let mut curves = HashMap::new();
        for mode in registry.iter() {
            let points = match &mode.curve {
                Curve::White(anchors) => white_points(anchors, day)?,
                Curve::Color(palette) if palette.is_empty() => {
                    log_warning!("Mode '{}' has an empty palette and was skipped", mode.name);
                    continue;
                }
                Curve::Color(palette) => color_points(palette, day, step_minutes),
            };
            curves.insert(mode.name.clone(), points);
        }

        Ok(Self {
            day: day.clone(),
            curves,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.day.date
    }

    pub fn day(&self) -> &DayBoundaries {
        &self.day
    }

    /// Whether this table was built from a previous day's sun times.
    pub fn is_degraded(&self) -> bool {
        self.day.degraded
    }

    pub fn points(&self, mode: &str) -> Option<&[TripPoint]> {
        self.curves.get(mode).map(Vec::as_slice)
    }
}

fn white_points(anchors: &[NormalAnchor], day: &DayBoundaries) -> Result<Vec<TripPoint>> {
    let mut points: Vec<TripPoint> = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        let instant = anchor.resolve(day)?;
        if let Some(last) = points.last()
            && instant <= last.instant
        {
            log_warning!(
                "Dropping Normal anchor {} ({}) on {}: not after the previous anchor",
                anchor.label(),
                instant.format("%H:%M:%S"),
                day.date
            );
            continue;
        }
        points.push(TripPoint {
            instant,
            target: TripTarget::White {
                kelvin: anchor.kelvin,
                brightness_max: anchor.brightness_max,
            },
        });
    }
    Ok(points)
}

fn color_points(palette: &[[u8; 3]], day: &DayBoundaries, step_minutes: u32) -> Vec<TripPoint> {
    let step = Duration::minutes(i64::from(step_minutes.max(1)));
    let mut points = Vec::new();
    let mut instant = day.midnight_early;
    let mut index = 0;

    while instant < day.midnight_late {
        points.push(TripPoint {
            instant,
            target: TripTarget::Color(palette[index % palette.len()]),
        });
        index += 1;
        instant += step;
    }

    // Closing anchor so the curve reaches the day's last second
    points.push(TripPoint {
        instant: day.midnight_late,
        target: TripTarget::Color(palette[index % palette.len()]),
    });
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::VIVID_PALETTE;
    use crate::core::mode::AnchorTime;
    use chrono::NaiveTime;

    fn june_day() -> DayBoundaries {
        DayBoundaries::from_times(
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn hms(point: &TripPoint) -> String {
        point.instant.format("%H:%M:%S").to_string()
    }

    #[test]
    fn test_normal_curve_anchors() {
        let table = TripPointTable::build(&ModeRegistry::builtin(), &june_day(), 2).unwrap();
        let normal = table.points("Normal").unwrap();

        let times: Vec<String> = normal.iter().map(hms).collect();
        assert_eq!(
            times,
            vec![
                "00:00:00", "05:00:00", "05:30:00", "06:00:00", "06:30:00", "18:30:00",
                "19:30:00", "20:00:00", "22:30:00", "23:59:59"
            ]
        );
        assert_eq!(
            normal[1].target,
            TripTarget::White {
                kelvin: 2500,
                brightness_max: 120
            }
        );
        assert!(normal.windows(2).all(|w| w[0].instant < w[1].instant));
    }

    #[test]
    fn test_color_curve_cycles_palette() {
        let table = TripPointTable::build(&ModeRegistry::builtin(), &june_day(), 2).unwrap();
        let vivid = table.points("Vivid").unwrap();

        assert_eq!(vivid.len(), 721);
        assert_eq!(hms(&vivid[0]), "00:00:00");
        assert_eq!(hms(&vivid[1]), "00:02:00");
        assert_eq!(vivid[10].target, TripTarget::Color(VIVID_PALETTE[1]));
        assert_eq!(hms(&vivid[719]), "23:58:00");
        assert_eq!(hms(&vivid[720]), "23:59:59");
        assert_eq!(vivid[720].target, TripTarget::Color(VIVID_PALETTE[720 % 9]));
        assert!(vivid.windows(2).all(|w| w[0].instant < w[1].instant));
    }

    #[test]
    fn test_two_color_palette_alternates() {
        let table = TripPointTable::build(&ModeRegistry::builtin(), &june_day(), 2).unwrap();
        let one = table.points("One").unwrap();
        assert_eq!(one[0].target, one[2].target);
        assert_ne!(one[0].target, one[1].target);
    }

    #[test]
    fn test_custom_step() {
        let table = TripPointTable::build(&ModeRegistry::builtin(), &june_day(), 60).unwrap();
        // 00:00 .. 23:00 plus the closing anchor
        assert_eq!(table.points("Bright").unwrap().len(), 25);
    }

    #[test]
    fn test_out_of_order_anchor_is_dropped() {
        crate::common::logger::Log::set_enabled(false);
        let mut registry = ModeRegistry::builtin();
        registry.set_normal_anchors(vec![
            NormalAnchor::new(AnchorTime::Midnight, 0, (2500, 150)),
            NormalAnchor::new(AnchorTime::Sunset, 0, (2700, 255)),
            // 05:00, before the sunset anchor
            NormalAnchor::new(AnchorTime::Sunrise, -60, (2500, 120)),
            NormalAnchor::new(AnchorTime::EndOfDay, 0, (2500, 150)),
        ]);

        let table = TripPointTable::build(&registry, &june_day(), 2).unwrap();
        let times: Vec<String> = table.points("Normal").unwrap().iter().map(hms).collect();
        assert_eq!(times, vec!["00:00:00", "20:00:00", "23:59:59"]);
    }

    #[test]
    fn test_empty_palette_is_skipped() {
        crate::common::logger::Log::set_enabled(false);
        let mut registry = ModeRegistry::builtin();
        registry.set_palette("Empty", Vec::new());
        let table = TripPointTable::build(&registry, &june_day(), 2).unwrap();
        assert!(table.points("Empty").is_none());
        assert!(table.points("Two").is_some());
    }
}
