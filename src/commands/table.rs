//! Implementation of the `table` command: print a day's trip points.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::core::trip_points::{TripPoint, TripPointTable};
use crate::core::{ControllerError, LightEnvironment};
use crate::time_source;

/// Color curves longer than this are abbreviated unless asked for by name.
const SUMMARY_POINTS: usize = 6;

/// Handle `rightlight table [--mode M] [--date YYYY-MM-DD]`.
pub fn handle_table_command(
    mode: Option<String>,
    date: Option<String>,
    config_dir: Option<String>,
) -> Result<()> {
    let config = super::load_config(config_dir)?;
    let env = LightEnvironment::from_config(&config)?;

    let date = match date {
        Some(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{date}'. Use YYYY-MM-DD"))?,
        None => time_source::global().today(),
    };

    let modes = match mode {
        Some(mode) if !env.modes.contains(&mode) => {
            return Err(ControllerError::UnknownMode {
                mode,
                available: env.modes.names(),
            }
            .into());
        }
        Some(mode) => vec![(mode, true)],
        None => env.modes.names().into_iter().map(|name| (name, false)).collect(),
    };

    let day = env.daylight.boundaries(date)?;
    let table = TripPointTable::build(&env.modes, &day, env.color_step_minutes)?;

    log_version!();
    log_block_start!("Trip points for {date}");
    log_indented!(
        "Sunrise {}, sunset {}",
        day.sunrise.format("%H:%M:%S"),
        day.sunset.format("%H:%M:%S")
    );

    for (name, full) in modes {
        let points = table.points(&name).unwrap_or(&[]);
        log_block_start!("{name} ({} anchors)", points.len());
        for line in render_points(points, full) {
            log_indented!("{line}");
        }
    }
    log_end!();
    Ok(())
}

/// One line per anchor, or the first and last few when `full` is false and
/// the curve is long.
pub fn render_points(points: &[TripPoint], full: bool) -> Vec<String> {
    let line = |point: &TripPoint| format!("{}  {}", point.instant.format("%H:%M:%S"), point.target);

    if full || points.len() <= SUMMARY_POINTS * 2 {
        return points.iter().map(line).collect();
    }

    let mut lines: Vec<String> = points[..SUMMARY_POINTS].iter().map(line).collect();
    lines.push(format!("... {} more ...", points.len() - SUMMARY_POINTS * 2));
    lines.extend(points[points.len() - SUMMARY_POINTS..].iter().map(line));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mode::ModeRegistry;
    use crate::geo::DayBoundaries;
    use chrono::NaiveTime;

    fn table() -> TripPointTable {
        let day = DayBoundaries::from_times(
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        )
        .unwrap();
        TripPointTable::build(&ModeRegistry::builtin(), &day, 2).unwrap()
    }

    #[test]
    fn test_render_white_curve_in_full() {
        let table = table();
        let lines = render_points(table.points("Normal").unwrap(), false);
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "00:00:00  2500K @ 150");
        assert_eq!(lines[9], "23:59:59  2500K @ 150");
    }

    #[test]
    fn test_render_long_color_curve_abbreviated() {
        let table = table();
        let points = table.points("Vivid").unwrap();

        let lines = render_points(points, false);
        assert_eq!(lines.len(), SUMMARY_POINTS * 2 + 1);
        assert_eq!(lines[SUMMARY_POINTS], format!("... {} more ...", points.len() - 12));
        assert!(lines[0].starts_with("00:00:00  rgb("));

        assert_eq!(render_points(points, true).len(), points.len());
    }
}
