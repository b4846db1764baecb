//! Driver that writes Home Assistant style service calls as JSON lines.
//!
//! Each command becomes one object:
//!
//! ```json
//! {"type":"call_service","service":"light.turn_on","data":{"entity_id":"light.desk","brightness":135,"kelvin":2088,"transition":0.1}}
//! ```
//!
//! A bridge process reading the stream forwards the calls to the home
//! automation host.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use std::io::Write;

use super::{LightCommand, LightDriver};

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Message<'a> {
    CallService { service: &'a str, data: Value },
}

pub struct JsonDriver<W: Write> {
    writer: W,
}

impl JsonDriver<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonDriver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn send(&mut self, service: &str, data: Value) -> Result<()> {
        let line = serde_json::to_string(&Message::CallService { service, data })
            .context("Failed to serialize service call")?;
        writeln!(self.writer, "{line}").context("Failed to write service call")?;
        self.writer.flush().context("Failed to flush service call")
    }
}

impl<W: Write> LightDriver for JsonDriver<W> {
    fn set_on(&mut self, command: &LightCommand) -> Result<()> {
        self.send("light.turn_on", command.service_data())
    }

    fn set_off(&mut self, entity_id: &str, transition: f64) -> Result<()> {
        self.send(
            "light.turn_off",
            json!({ "entity_id": entity_id, "transition": transition }),
        )
    }

    fn driver_name(&self) -> &'static str {
        "JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LightColor;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_one_call_per_line() {
        let mut driver = JsonDriver::new(Vec::new());
        let command = LightCommand::new("light.desk", 0.1)
            .with_brightness(200)
            .with_color(LightColor::Kelvin(2700));
        driver.set_on(&command).unwrap();
        driver.set_off("light.desk", 0.1).unwrap();

        let output = String::from_utf8(driver.into_inner()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "call_service");
        assert_eq!(lines[0]["service"], "light.turn_on");
        assert_eq!(lines[0]["data"]["kelvin"], 2700);
        assert_eq!(lines[1]["service"], "light.turn_off");
        assert_eq!(lines[1]["data"]["entity_id"], "light.desk");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut driver = JsonDriver::new(BrokenPipe);
        let result = driver.set_off("light.desk", 0.1);
        assert!(result.is_err());
    }
}
