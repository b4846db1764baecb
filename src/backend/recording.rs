//! In-memory driver for tests.
//!
//! The recorded commands live behind an `Rc<RefCell<..>>` so a test can keep
//! a handle after moving the driver into a controller or `Core`.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use super::{LightCommand, LightDriver};
use crate::time_source::TimeSource;

/// A command as seen by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    On(LightCommand),
    Off { entity_id: String, transition: f64 },
}

impl Recorded {
    pub fn entity_id(&self) -> &str {
        match self {
            Self::On(command) => &command.entity_id,
            Self::Off { entity_id, .. } => entity_id,
        }
    }
}

#[derive(Default)]
struct Shared {
    log: Vec<(chrono::DateTime<chrono::Local>, Recorded)>,
    failing: HashSet<String>,
    clock: Option<Arc<dyn TimeSource>>,
}

/// Records every command with the instant it was sent.
#[derive(Clone, Default)]
pub struct RecordingDriver {
    shared: Rc<RefCell<Shared>>,
}

impl RecordingDriver {
    /// Timestamps come from the process-wide time source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamps come from `clock`.
    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        let driver = Self::default();
        driver.shared.borrow_mut().clock = Some(clock);
        driver
    }

    /// Make every command for `entity_id` fail until [`Self::recover`].
    pub fn fail_for(&self, entity_id: &str) {
        self.shared.borrow_mut().failing.insert(entity_id.to_string());
    }

    pub fn recover(&self, entity_id: &str) {
        self.shared.borrow_mut().failing.remove(entity_id);
    }

    pub fn commands(&self) -> Vec<Recorded> {
        self.shared
            .borrow()
            .log
            .iter()
            .map(|(_, command)| command.clone())
            .collect()
    }

    /// Commands paired with the (possibly simulated) time they were sent.
    pub fn timeline(&self) -> Vec<(chrono::DateTime<chrono::Local>, Recorded)> {
        self.shared.borrow().log.clone()
    }

    pub fn last(&self) -> Option<Recorded> {
        self.shared.borrow().log.last().map(|(_, c)| c.clone())
    }

    pub fn len(&self) -> usize {
        self.shared.borrow().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.shared.borrow_mut().log.clear();
    }

    fn record(&self, entity_id: &str, command: Recorded) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        if shared.failing.contains(entity_id) {
            anyhow::bail!("{entity_id} is unreachable");
        }
        let at = match &shared.clock {
            Some(clock) => clock.now(),
            None => crate::time_source::now(),
        };
        shared.log.push((at, command));
        Ok(())
    }
}

impl LightDriver for RecordingDriver {
    fn set_on(&mut self, command: &LightCommand) -> Result<()> {
        self.record(&command.entity_id, Recorded::On(command.clone()))
    }

    fn set_off(&mut self, entity_id: &str, transition: f64) -> Result<()> {
        self.record(
            entity_id,
            Recorded::Off {
                entity_id: entity_id.to_string(),
                transition,
            },
        )
    }

    fn driver_name(&self) -> &'static str {
        "Recording"
    }
}
