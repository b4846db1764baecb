//! Failure kinds of controller operations.

use chrono::NaiveDate;

/// Error returned by [`RightLight`](super::controller::RightLight) and
/// [`Core`](super::Core) operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerError {
    /// The requested mode is not in the registry.
    UnknownMode {
        mode: String,
        available: Vec<String>,
    },
    /// No day boundaries could be computed and no earlier day exists to fall back on.
    SolarUnavailable { date: NaiveDate, reason: String },
    /// The driver rejected a command. Not retried.
    Driver {
        driver: &'static str,
        entity_id: String,
        reason: String,
    },
    /// No controller is configured for this entity id.
    UnknownLight(String),
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMode { mode, available } => {
                write!(f, "Unknown mode '{mode}' (available: {})", available.join(", "))
            }
            Self::SolarUnavailable { date, reason } => {
                write!(f, "No sunrise/sunset data for {date}: {reason}")
            }
            Self::Driver {
                driver,
                entity_id,
                reason,
            } => write!(f, "{driver} driver failed for {entity_id}: {reason}"),
            Self::UnknownLight(entity_id) => write!(f, "No light configured as '{entity_id}'"),
        }
    }
}

impl std::error::Error for ControllerError {}
