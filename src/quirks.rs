use serde::{Deserialize, Serialize};

/// The two families of behaviour programs are written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Chip8,
    SuperChip,
}

impl Preset {
    pub fn toggled(self) -> Preset {
        match self {
            Preset::Chip8 => Preset::SuperChip,
            Preset::SuperChip => Preset::Chip8,
        }
    }
}

/// Behavioural toggles read by the dispatcher. Only ever changed between
/// instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quirks {
    /// 8XY6/8XYE shift Vx in place; when off Vx is first loaded from Vy
    pub shift_uses_vy: bool,
    /// BXNN jumps to XNN + Vx instead of BNNN jumping to NNN + V0
    pub jump_uses_vx: bool,
    /// FX55/FX65 leave I alone; when off I ends up past the last register.
    /// Older configs call it `block_transfer_advances_i`, with true still
    /// meaning I is left alone
    #[serde(alias = "block_transfer_advances_i")]
    pub block_transfer_keeps_i: bool,
    /// 8XY1/8XY2/8XY3 zero VF afterwards
    pub reset_flag_on_bitwise_op: bool,
    /// SUPER-CHIP opcodes (scrolling, modes, exit, big sprites, big font,
    /// flag registers) do something; when off they're no-ops
    pub extended_instruction_set: bool,
}

/// Legacy CHIP-8 semantics, with the extension opcodes still available so
/// SUPER-CHIP programs that don't depend on the quirks run out of the box.
impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            extended_instruction_set: true,
            ..Quirks::preset(Preset::Chip8)
        }
    }
}

impl Quirks {
    pub fn preset(preset: Preset) -> Self {
        let superchip = preset == Preset::SuperChip;
        Quirks {
            shift_uses_vy: superchip,
            jump_uses_vx: superchip,
            block_transfer_keeps_i: superchip,
            reset_flag_on_bitwise_op: !superchip,
            extended_instruction_set: superchip,
        }
    }

    /// which preset the behavioural quirks currently match, if any
    pub fn matches(&self) -> Option<Preset> {
        [Preset::Chip8, Preset::SuperChip].into_iter().find(|p| {
            let q = Quirks::preset(*p);
            q.shift_uses_vy == self.shift_uses_vy
                && q.jump_uses_vx == self.jump_uses_vx
                && q.block_transfer_keeps_i == self.block_transfer_keeps_i
                && q.reset_flag_on_bitwise_op == self.reset_flag_on_bitwise_op
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_opposites() {
        let c = Quirks::preset(Preset::Chip8);
        let s = Quirks::preset(Preset::SuperChip);
        assert!(!c.shift_uses_vy && s.shift_uses_vy);
        assert!(!c.jump_uses_vx && s.jump_uses_vx);
        assert!(!c.block_transfer_keeps_i && s.block_transfer_keeps_i);
        assert!(c.reset_flag_on_bitwise_op && !s.reset_flag_on_bitwise_op);
        assert!(!c.extended_instruction_set && s.extended_instruction_set);
    }

    #[test]
    fn test_default_is_legacy_with_extensions() {
        let q = Quirks::default();
        assert_eq!(q.matches(), Some(Preset::Chip8));
        assert!(q.extended_instruction_set);
    }

    #[test]
    fn test_matches_ignores_extensions() {
        let mut q = Quirks::preset(Preset::SuperChip);
        q.extended_instruction_set = false;
        assert_eq!(q.matches(), Some(Preset::SuperChip));
    }

    #[test]
    fn test_individual_toggles() {
        let mut q = Quirks::preset(Preset::Chip8);
        q.jump_uses_vx = true;
        assert_eq!(q.matches(), None);
    }

    #[test]
    fn test_deserialize_partial() -> Result<(), serde_json::Error> {
        let q: Quirks = serde_json::from_str(r#"{ "shift_uses_vy": true }"#)?;
        assert!(q.shift_uses_vy);
        assert!(q.reset_flag_on_bitwise_op);
        let p: Preset = serde_json::from_str(r#""superchip""#)?;
        assert_eq!(p, Preset::SuperChip);
        Ok(())
    }
}
