use log::warn;
use std::time::Duration;

use crate::error::{Result, VmError};
use crate::interpreter::{Chip8Interpreter, Step};
use crate::sound::Sound;

/// delay and sound timers always count down at 60Hz
pub const TIMER_HZ: u128 = 60;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// The two 8 bit countdown timers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// one 60Hz tick; both count down to 0 and stay there
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// should the tone be playing?
    pub fn tone(&self) -> bool {
        self.sound > 0
    }
}

/// What happened during one call to Clock::advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// 60Hz timer ticks
    pub ticks: u32,
    /// instructions attempted, including ones that only re-polled for a key
    pub steps: u32,
    /// non-fatal faults (e.g. return with an empty stack)
    pub faults: u32,
    /// the program asked to exit (00FD)
    pub exit: bool,
    /// the sound device refused a beep or stop; the rest of the frame ran
    pub sound_failed: bool,
}

/// Turns wall-clock time into timer ticks and instruction steps. The two
/// schedules have separate accumulators: the timers run at 60Hz whatever
/// the CPU speed, and keep running while the CPU is paused.
///
/// Accumulators are kept as `nanoseconds * rate` so there is no drift; one
/// second of elapsed time is always exactly 60 ticks.
#[derive(Debug, Default)]
pub struct Clock {
    timer_acc: u128,
    cpu_acc: u128,
    paused: bool,
    step_requested: bool,
    tone: bool,
}

impl Clock {
    pub fn new() -> Self {
        Clock::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// pause/unpause the CPU schedule. timers keep going regardless
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.step_requested = false;
    }

    /// run exactly one instruction on the next advance, if paused
    pub fn request_step(&mut self) {
        if self.paused {
            self.step_requested = true;
        }
    }

    /// back to running, with nothing accumulated
    pub fn reset(&mut self) {
        *self = Clock {
            tone: self.tone,
            ..Clock::default()
        };
    }

    /// move time on by `elapsed`: tick the timers, then run the CPU.
    /// A failing sound device is reported, not retried, and doesn't stop
    /// the frame.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        vm: &mut Chip8Interpreter,
        sound: &mut dyn Sound,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        let nanos = elapsed.as_nanos();

        self.timer_acc += nanos * TIMER_HZ;
        while self.timer_acc >= NANOS_PER_SEC {
            self.timer_acc -= NANOS_PER_SEC;
            vm.tick_timers();
            report.ticks += 1;
            if !report.sound_failed {
                if let Err(e) = self.sync_tone(vm.tone(), sound) {
                    warn!("{}", e);
                    report.sound_failed = true;
                }
            }
        }

        self.cpu_acc += nanos * vm.config().cpu_speed as u128;
        if self.paused {
            self.cpu_acc = 0;
            if self.step_requested {
                self.step_requested = false;
                self.run_one(vm, &mut report);
            }
        }
        while self.cpu_acc >= NANOS_PER_SEC && !report.exit {
            self.cpu_acc -= NANOS_PER_SEC;
            self.run_one(vm, &mut report);
        }
        report
    }

    fn run_one(&mut self, vm: &mut Chip8Interpreter, report: &mut FrameReport) {
        report.steps += 1;
        match vm.step() {
            Ok(Step::Exit) => report.exit = true,
            Ok(_) => (),
            Err(e) => {
                warn!("{}", e);
                report.faults += 1;
            }
        }
    }

    /// only tell the sound device about changes
    pub fn sync_tone(&mut self, tone: bool, sound: &mut dyn Sound) -> Result<()> {
        if tone == self.tone {
            return Ok(());
        }
        let result = if tone { sound.beep() } else { sound.stop() };
        result.map_err(|e| VmError::Sound(e.to_string()))?;
        self.tone = tone;
        Ok(())
    }
}
