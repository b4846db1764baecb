//! Dry-run driver that prints commands instead of sending them.

use anyhow::Result;

use super::{LightCommand, LightDriver};

#[derive(Debug, Default)]
pub struct LogDriver {
    sent: usize,
}

impl LogDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands printed so far.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl LightDriver for LogDriver {
    fn set_on(&mut self, command: &LightCommand) -> Result<()> {
        self.sent += 1;
        log_decorated!("{command}");
        Ok(())
    }

    fn set_off(&mut self, entity_id: &str, transition: f64) -> Result<()> {
        self.sent += 1;
        log_decorated!("{entity_id} off transition={transition:.1}s");
        Ok(())
    }

    fn driver_name(&self) -> &'static str {
        "Log"
    }
}
