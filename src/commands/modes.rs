//! Implementation of the `modes` command.

use anyhow::Result;

use crate::core::mode::{Curve, ModeRegistry};

/// Handle `rightlight modes`: list every mode a light can be turned on in.
pub fn handle_modes_command(config_dir: Option<String>) -> Result<()> {
    let config = super::load_config(config_dir)?;
    let modes = ModeRegistry::from_config(&config)?;

    log_version!();
    log_block_start!("Available modes:");
    for line in describe_modes(&modes) {
        log_indented!("{line}");
    }
    log_end!();
    Ok(())
}

pub fn describe_modes(modes: &ModeRegistry) -> Vec<String> {
    modes
        .iter()
        .map(|mode| match &mode.curve {
            Curve::White(anchors) => {
                format!("{:<10} white curve, {} anchors", mode.name, anchors.len())
            }
            Curve::Color(palette) => {
                format!("{:<10} color cycle, {} colors", mode.name, palette.len())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_builtin_modes() {
        let lines = describe_modes(&ModeRegistry::builtin());
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Normal     white curve, 10 anchors");
        assert_eq!(lines[1], "Vivid      color cycle, 9 colors");
        assert_eq!(lines[3], "One        color cycle, 2 colors");
    }
}
