//! Mode registry: which curves exist and how each one is generated.
//!
//! "Normal" is the only white curve (color temperature plus a brightness
//! ceiling per anchor). Every other mode is a color palette cycled through
//! the day at a fixed step.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, NaiveTime};

use crate::common::constants::*;
use crate::config::Config;
use crate::geo::DayBoundaries;

/// Where a Normal anchor sits in the day, before its offset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorTime {
    Midnight,
    Sunrise,
    Sunset,
    /// Fixed local clock time.
    Clock(NaiveTime),
    /// 23:59:59
    EndOfDay,
}

impl AnchorTime {
    /// Parse `midnight`, `sunrise`, `sunset`, `end_of_day` or `HH:MM:SS`.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "midnight" => Ok(Self::Midnight),
            "sunrise" => Ok(Self::Sunrise),
            "sunset" => Ok(Self::Sunset),
            "end_of_day" => Ok(Self::EndOfDay),
            other => NaiveTime::parse_from_str(other, "%H:%M:%S")
                .map(Self::Clock)
                .with_context(|| {
                    format!(
                        "Invalid anchor '{value}'. Use midnight, sunrise, sunset, end_of_day or HH:MM:SS"
                    )
                }),
        }
    }
}

impl std::fmt::Display for AnchorTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Midnight => write!(f, "midnight"),
            Self::Sunrise => write!(f, "sunrise"),
            Self::Sunset => write!(f, "sunset"),
            Self::Clock(time) => write!(f, "{}", time.format("%H:%M:%S")),
            Self::EndOfDay => write!(f, "end_of_day"),
        }
    }
}

/// One anchor of the white curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalAnchor {
    pub at: AnchorTime,
    pub offset_minutes: i64,
    pub kelvin: u32,
    pub brightness_max: u8,
}

impl NormalAnchor {
    pub fn new(at: AnchorTime, offset_minutes: i64, (kelvin, brightness_max): (u32, u8)) -> Self {
        Self {
            at,
            offset_minutes,
            kelvin,
            brightness_max,
        }
    }

    /// The anchor's instant on `day`.
    pub fn resolve(&self, day: &DayBoundaries) -> Result<DateTime<Local>> {
        let base = match self.at {
            AnchorTime::Midnight => day.midnight_early,
            AnchorTime::Sunrise => day.sunrise,
            AnchorTime::Sunset => day.sunset,
            AnchorTime::Clock(time) => day.at(time)?,
            AnchorTime::EndOfDay => day.midnight_late,
        };
        Ok(base + Duration::minutes(self.offset_minutes))
    }

    pub fn label(&self) -> String {
        match self.offset_minutes {
            0 => self.at.to_string(),
            m if m > 0 => format!("{}+{m}m", self.at),
            m => format!("{}{m}m", self.at),
        }
    }
}

/// The default white curve.
pub fn default_normal_anchors() -> Vec<NormalAnchor> {
    let late_evening = NaiveTime::from_hms_opt(LATE_EVENING_HOUR, LATE_EVENING_MINUTE, 0)
        .unwrap_or(NaiveTime::MIN);
    vec![
        NormalAnchor::new(AnchorTime::Midnight, 0, NORMAL_MIDNIGHT),
        NormalAnchor::new(AnchorTime::Sunrise, -60, NORMAL_SUNRISE_MINUS_60),
        NormalAnchor::new(AnchorTime::Sunrise, -30, NORMAL_SUNRISE_MINUS_30),
        NormalAnchor::new(AnchorTime::Sunrise, 0, NORMAL_SUNRISE),
        NormalAnchor::new(AnchorTime::Sunrise, 30, NORMAL_SUNRISE_PLUS_30),
        NormalAnchor::new(AnchorTime::Sunset, -90, NORMAL_SUNSET_MINUS_90),
        NormalAnchor::new(AnchorTime::Sunset, -30, NORMAL_SUNSET_MINUS_30),
        NormalAnchor::new(AnchorTime::Sunset, 0, NORMAL_SUNSET),
        NormalAnchor::new(AnchorTime::Clock(late_evening), 0, NORMAL_LATE_EVENING),
        NormalAnchor::new(AnchorTime::EndOfDay, 0, NORMAL_END_OF_DAY),
    ]
}

/// How a mode's trip points are generated.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    White(Vec<NormalAnchor>),
    Color(Vec<[u8; 3]>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    pub name: String,
    pub curve: Curve,
}

impl Mode {
    pub fn is_white(&self) -> bool {
        matches!(self.curve, Curve::White(_))
    }
}

/// Ordered set of modes, "Normal" first.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeRegistry {
    modes: Vec<Mode>,
}

impl Default for ModeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModeRegistry {
    /// Normal plus the Vivid, Bright, One and Two palettes.
    pub fn builtin() -> Self {
        let mut registry = Self {
            modes: vec![Mode {
                name: NORMAL_MODE.to_string(),
                curve: Curve::White(default_normal_anchors()),
            }],
        };
        registry.set_palette("Vivid", VIVID_PALETTE.to_vec());
        registry.set_palette("Bright", BRIGHT_PALETTE.to_vec());
        registry.set_palette("One", ONE_PALETTE.to_vec());
        registry.set_palette("Two", TWO_PALETTE.to_vec());
        registry
    }

    /// Built-in modes with the configured anchors and palettes applied.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::builtin();

        if let Some(anchors) = &config.normal_anchors {
            let anchors = anchors
                .iter()
                .map(|anchor| {
                    Ok(NormalAnchor {
                        at: AnchorTime::parse(&anchor.at)?,
                        offset_minutes: anchor.offset_minutes.unwrap_or(0),
                        kelvin: anchor.kelvin,
                        brightness_max: anchor.brightness,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            registry.set_normal_anchors(anchors);
        }

        if let Some(palettes) = &config.palettes {
            for (name, colors) in palettes {
                registry.set_palette(name, colors.clone());
            }
        }

        Ok(registry)
    }

    /// Replace a palette or append a new color mode.
    pub fn set_palette(&mut self, name: &str, colors: Vec<[u8; 3]>) {
        match self.modes.iter_mut().find(|mode| mode.name == name) {
            Some(mode) => mode.curve = Curve::Color(colors),
            None => self.modes.push(Mode {
                name: name.to_string(),
                curve: Curve::Color(colors),
            }),
        }
    }

    pub fn set_normal_anchors(&mut self, anchors: Vec<NormalAnchor>) {
        if let Some(normal) = self.modes.iter_mut().find(|mode| mode.name == NORMAL_MODE) {
            normal.curve = Curve::White(anchors);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|mode| mode.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Mode names in registry order.
    pub fn names(&self) -> Vec<String> {
        self.modes.iter().map(|mode| mode.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mode> {
        self.modes.iter()
    }

    /// The white curve's anchors.
    pub fn normal_anchors(&self) -> &[NormalAnchor] {
        match self.get(NORMAL_MODE).map(|mode| &mode.curve) {
            Some(Curve::White(anchors)) => anchors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_modes() {
        let registry = ModeRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec!["Normal", "Vivid", "Bright", "One", "Two"]
        );
        assert!(registry.get("Normal").unwrap().is_white());
        assert!(!registry.get("Vivid").unwrap().is_white());
        assert_eq!(registry.normal_anchors().len(), 10);
        assert!(registry.get("normal").is_none());
    }

    #[test]
    fn test_set_palette_replaces_or_appends() {
        let mut registry = ModeRegistry::builtin();
        registry.set_palette("One", vec![[1, 2, 3]]);
        registry.set_palette("Sunset", vec![[255, 80, 0], [255, 0, 40]]);

        assert_eq!(
            registry.get("One").unwrap().curve,
            Curve::Color(vec![[1, 2, 3]])
        );
        assert_eq!(registry.names().last().unwrap(), "Sunset");
        assert_eq!(registry.names().len(), 6);
    }

    #[test]
    fn test_anchor_time_parse() {
        assert_eq!(AnchorTime::parse("Sunrise").unwrap(), AnchorTime::Sunrise);
        assert_eq!(AnchorTime::parse("end_of_day").unwrap(), AnchorTime::EndOfDay);
        assert_eq!(
            AnchorTime::parse("22:30:00").unwrap(),
            AnchorTime::Clock(NaiveTime::from_hms_opt(22, 30, 0).unwrap())
        );
        assert!(AnchorTime::parse("noon").is_err());
    }

    #[test]
    fn test_anchor_labels() {
        let anchors = default_normal_anchors();
        assert_eq!(anchors[0].label(), "midnight");
        assert_eq!(anchors[1].label(), "sunrise-60m");
        assert_eq!(anchors[4].label(), "sunrise+30m");
        assert_eq!(anchors[8].label(), "22:30:00");
    }
}
