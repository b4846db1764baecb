//! Application constants and default values for rightlight.
//!
//! Defaults are used whenever the matching configuration option is absent; the
//! validation limits bound what a configuration may override them with.

// ═══ Default Mode Selection ═══

pub const NORMAL_MODE: &str = "Normal"; // The only white (temperature) curve
pub const DEFAULT_BRIGHTNESS: u32 = 255;
pub const DEFAULT_BRIGHTNESS_OVERRIDE: u32 = 0;
pub const DEFAULT_SUNRISE: &str = "06:30:00"; // manual solar source only
pub const DEFAULT_SUNSET: &str = "19:00:00"; // manual solar source only

// ═══ White Curve Tuning ═══

pub const DEFAULT_CT_HIGH: f64 = 5000.0; // Kelvin that a fully dimmed anchor is pulled away from
pub const DEFAULT_CT_SCALAR: f64 = 0.35;
pub const DEFAULT_OVERFLOW_CT_MULTIPLIER: f64 = 6.0; // Kelvin per unit of brightness above 255
pub const MAX_BRIGHTNESS: f64 = 255.0;

// ═══ Transition Timing (seconds) ═══

pub const DEFAULT_ON_TRANSITION: f64 = 0.1;
pub const DEFAULT_COLOR_TRANSITION: f64 = 0.1;
pub const DEFAULT_OFF_TRANSITION: f64 = 0.1;
pub const DEFAULT_SPECIFIC_TRANSITION: f64 = 0.2;
pub const DEFAULT_RESEND_DELAY: f64 = 0.6; // second send of turn_on_specific
pub const DEFAULT_COMMIT_DELAY: f64 = 0.5; // added to the on transition
pub const RECOMPUTE_SLACK_SECS: u64 = 1; // recompute fires this long after the anchor
pub const MINIMUM_REMAINING_SECS: u64 = 1;
pub const DEFAULT_COLOR_STEP_MINUTES: u32 = 2;

// ═══ Scheduling ═══

pub const PENDING_QUEUE_CAPACITY: usize = 3;
pub const CHECK_INTERVAL_SECS: u64 = 1; // Longest real-time sleep before re-checking the running flag

// ═══ Default Normal Curve ═══
// (Kelvin, maximum brightness) per anchor

pub const NORMAL_MIDNIGHT: (u32, u8) = (2500, 150);
pub const NORMAL_SUNRISE_MINUS_60: (u32, u8) = (2500, 120);
pub const NORMAL_SUNRISE_MINUS_30: (u32, u8) = (2700, 170);
pub const NORMAL_SUNRISE: (u32, u8) = (3200, 155);
pub const NORMAL_SUNRISE_PLUS_30: (u32, u8) = (4700, 255);
pub const NORMAL_SUNSET_MINUS_90: (u32, u8) = (4200, 255);
pub const NORMAL_SUNSET_MINUS_30: (u32, u8) = (3200, 255);
pub const NORMAL_SUNSET: (u32, u8) = (2700, 255);
pub const NORMAL_LATE_EVENING: (u32, u8) = (2500, 255);
pub const NORMAL_END_OF_DAY: (u32, u8) = (2500, 150);
pub const LATE_EVENING_HOUR: u32 = 22;
pub const LATE_EVENING_MINUTE: u32 = 30;

// ═══ Default Color Palettes ═══

pub const VIVID_PALETTE: [[u8; 3]; 9] = [
    [255, 0, 0],
    [202, 0, 127],
    [130, 0, 255],
    [0, 0, 255],
    [0, 90, 190],
    [0, 200, 200],
    [0, 255, 0],
    [255, 255, 0],
    [255, 127, 0],
];

pub const BRIGHT_PALETTE: [[u8; 3]; 9] = [
    [255, 100, 100],
    [202, 80, 127],
    [150, 70, 255],
    [90, 90, 255],
    [60, 100, 190],
    [70, 200, 200],
    [80, 255, 80],
    [255, 255, 0],
    [255, 127, 70],
];

pub const ONE_PALETTE: [[u8; 3]; 2] = [[0, 104, 255], [255, 0, 255]];

pub const TWO_PALETTE: [[u8; 3]; 2] = [[255, 0, 255], [0, 104, 255]];

// ═══ Validation Limits ═══

pub const MINIMUM_TEMP: u32 = 1000;
pub const MAXIMUM_TEMP: u32 = 20000;
pub const MINIMUM_CT_SCALAR: f64 = 0.0;
pub const MAXIMUM_CT_SCALAR: f64 = 1.0;
pub const MINIMUM_OVERFLOW_CT_MULTIPLIER: f64 = 0.0;
pub const MAXIMUM_OVERFLOW_CT_MULTIPLIER: f64 = 50.0;
pub const MAXIMUM_TRANSITION_SECS: f64 = 60.0;
pub const MINIMUM_COLOR_STEP_MINUTES: u32 = 1;
pub const MAXIMUM_COLOR_STEP_MINUTES: u32 = 60;
pub const MAXIMUM_BRIGHTNESS_OVERRIDE: u32 = 1020;

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;
