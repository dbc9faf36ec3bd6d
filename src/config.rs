use serde::{Deserialize, Serialize};
use std::io;

use crate::error::Result;
use crate::quirks::{Preset, Quirks};

/// instructions per second out of the box
pub const DEFAULT_CPU_SPEED: u32 = 700;

/// CPU speeds offered when cycling; 0 stops the CPU entirely
const CPU_SPEED_STEPS: [u32; 4] = [700, 1000, 1500, 2100];

/// font bases the interpreter area can hold a low-res font at
pub const FONT_BASES: [u16; 2] = [0x000, 0x050];

/// Machine-wide settings. Restored to the defaults by a full emulator reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// instructions per second
    pub cpu_speed: u32,
    /// where the low-res font lives, 0x000 or 0x050
    pub font_base: u16,
    pub quirks: Quirks,
    /// log every unknown opcode
    pub diagnose_unknown: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cpu_speed: DEFAULT_CPU_SPEED,
            font_base: FONT_BASES[0],
            quirks: Quirks::default(),
            diagnose_unknown: false,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config.sanitised())
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self> {
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config.sanitised())
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.quirks = Quirks::preset(preset);
        self
    }

    /// unrecognised font bases fall back to 0x000
    fn sanitised(mut self) -> Self {
        if !FONT_BASES.contains(&self.font_base) {
            log::warn!(
                "font base {:#05x} not supported, using {:#05x}",
                self.font_base,
                FONT_BASES[0]
            );
            self.font_base = FONT_BASES[0];
        }
        self
    }
}

/// the next CPU speed in the cycle 700 -> 1000 -> 1500 -> 2100 -> 0 -> 700
pub fn next_cpu_speed(current: u32) -> u32 {
    match CPU_SPEED_STEPS.iter().find(|s| current < **s) {
        Some(speed) => *speed,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.cpu_speed, 700);
        assert_eq!(c.font_base, 0);
        assert!(!c.diagnose_unknown);
    }

    #[test]
    fn test_partial_json() -> Result<()> {
        let c = Config::from_json(r#"{ "cpu_speed": 1500, "quirks": { "jump_uses_vx": true } }"#)?;
        assert_eq!(c.cpu_speed, 1500);
        assert!(c.quirks.jump_uses_vx);
        assert!(!c.quirks.shift_uses_vy);
        Ok(())
    }

    #[test]
    fn test_block_transfer_old_name() -> Result<()> {
        let c = Config::from_json(r#"{ "quirks": { "block_transfer_advances_i": true } }"#)?;
        assert!(c.quirks.block_transfer_keeps_i);
        let c = Config::from_json(r#"{ "quirks": { "block_transfer_advances_i": false } }"#)?;
        assert!(!c.quirks.block_transfer_keeps_i);
        Ok(())
    }

    #[test]
    fn test_bad_font_base_falls_back() -> Result<()> {
        let c = Config::from_json(r#"{ "font_base": 300 }"#)?;
        assert_eq!(c.font_base, 0);
        let c = Config::from_json(r#"{ "font_base": 80 }"#)?;
        assert_eq!(c.font_base, 0x050);
        Ok(())
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            Config::from_json("{ nope"),
            Err(crate::error::VmError::Config(_))
        ));
    }

    #[test]
    fn test_cpu_speed_cycle() {
        assert_eq!(next_cpu_speed(0), 700);
        assert_eq!(next_cpu_speed(699), 700);
        assert_eq!(next_cpu_speed(700), 1000);
        assert_eq!(next_cpu_speed(1000), 1500);
        assert_eq!(next_cpu_speed(1500), 2100);
        assert_eq!(next_cpu_speed(2100), 0);
        assert_eq!(next_cpu_speed(5000), 0);
    }
}
