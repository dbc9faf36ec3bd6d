//! Property-based tests for VM invariants.
//!
//! Each property builds a tiny program around the instruction under test and
//! checks the machine state after stepping it.

use chip8_vm::framebuffer::Framebuffer;
use chip8_vm::memory::MemoryMap;
use chip8_vm::sound::Mute;
use chip8_vm::{Chip8Interpreter, Clock, Config, Instruction, Resolution};
use proptest::prelude::*;
use std::time::Duration;

fn vm_with(program: &[u8]) -> Chip8Interpreter {
    let mut vm = Chip8Interpreter::new(Config::default());
    vm.load(program).expect("program fits");
    vm
}

fn word(op: u16) -> [u8; 2] {
    op.to_be_bytes()
}

proptest! {
    /// Property: a jump lands exactly on its 12 bit target
    #[test]
    fn prop_jump_lands_on_target(addr in 0u16..=0x0fff) {
        let mut vm = vm_with(&word(0x1000 | addr));
        vm.step().expect("jump never fails");
        prop_assert_eq!(vm.registers().pc(), addr);
    }

    /// Property: call then return puts the PC back after the call
    #[test]
    fn prop_call_return_restores_pc(target in 0x0204u16..0x0ffe) {
        let mut vm = vm_with(&word(0x2000 | target));
        vm.memory_mut().write_slice(target, &word(0x00ee));
        vm.step().expect("call never fails");
        prop_assert_eq!(vm.registers().pc(), target);
        vm.step().expect("stack has the return address");
        prop_assert_eq!(vm.registers().pc(), 0x202);
        prop_assert!(vm.stack().is_empty());
    }

    /// Property: clear-screen blanks any screen, and doing it again changes nothing
    #[test]
    fn prop_clear_is_idempotent(
        sprites in prop::collection::vec((any::<u8>(), any::<u8>(), any::<u8>()), 0..20),
        high in any::<bool>(),
    ) {
        let res = if high { Resolution::High } else { Resolution::Low };
        let mut fb = Framebuffer::new(res);
        for (x, y, row) in sprites {
            fb.draw_sprite(x, y, &[row]);
        }
        fb.clear();
        prop_assert_eq!(fb.lit(), 0);
        let once = fb.clone();
        fb.clear();
        prop_assert_eq!(fb, once);
    }

    /// Property: drawing the same sprite twice in the same place restores the screen
    #[test]
    fn prop_draw_twice_is_identity(
        background in prop::collection::vec((0u8..64, 0u8..32, any::<u8>()), 0..10),
        sprite in prop::collection::vec(any::<u8>(), 1..16),
        x in 0u8..56,
        y in 0u8..17,
    ) {
        let mut fb = Framebuffer::default();
        for (bx, by, row) in background {
            fb.draw_sprite(bx, by, &[row]);
        }
        let before = fb.clone();
        fb.draw_sprite(x, y, &sprite);
        fb.draw_sprite(x, y, &sprite);
        prop_assert_eq!(fb, before);
    }

    /// Property: 8XY4 carries exactly when the true sum doesn't fit in a byte
    #[test]
    fn prop_add_carry(a in any::<u8>(), b in any::<u8>()) {
        let mut vm = vm_with(&word(0x8124));
        vm.registers_mut().v[1] = a;
        vm.registers_mut().v[2] = b;
        vm.step().expect("add never fails");
        prop_assert_eq!(vm.registers().v[1], a.wrapping_add(b));
        prop_assert_eq!(vm.registers().v[0xf], (a as u16 + b as u16 > 0xff) as u8);
    }

    /// Property: 8XY5 sets VF when there was no borrow
    #[test]
    fn prop_sub_borrow(a in any::<u8>(), b in any::<u8>()) {
        let mut vm = vm_with(&word(0x8125));
        vm.registers_mut().v[1] = a;
        vm.registers_mut().v[2] = b;
        vm.step().expect("sub never fails");
        prop_assert_eq!(vm.registers().v[1], a.wrapping_sub(b));
        prop_assert_eq!(vm.registers().v[0xf], (a >= b) as u8);
    }

    /// Property: whatever the CPU speed, one second is 60 timer ticks
    #[test]
    fn prop_one_second_is_sixty_ticks(
        speed in 0u32..3000,
        delay in any::<u8>(),
        frame_ms in 1u64..50,
    ) {
        let mut vm = Chip8Interpreter::new(Config { cpu_speed: speed, ..Config::default() });
        vm.load(&word(0x1200)).expect("program fits");
        vm.timers_mut().delay = delay;
        let mut clock = Clock::new();
        let mut elapsed = Duration::ZERO;
        let frame = Duration::from_millis(frame_ms);
        while elapsed + frame <= Duration::from_secs(1) {
            clock.advance(frame, &mut vm, &mut Mute::new());
            elapsed += frame;
        }
        clock.advance(Duration::from_secs(1) - elapsed, &mut vm, &mut Mute::new());
        prop_assert_eq!(vm.timers().delay, delay.saturating_sub(60));
    }

    /// Property: every opcode decodes to something, and executing it never
    /// leaves the PC outside memory
    #[test]
    fn prop_any_opcode_is_safe(op in any::<u16>(), regs in any::<[u8; 16]>()) {
        let mut vm = vm_with(&word(op));
        vm.registers_mut().v = regs;
        let _ = Instruction::from(op).to_string();
        let _ = vm.step();
        prop_assert!(vm.registers().pc() <= 0x0fff);
        prop_assert!(vm.registers().i() <= 0x0fff);
    }
}
