/// # environment
///
/// Sets everything up and runs the main loop. Once per frame it:
///
///  1. polls the input device for key state and hotkeys
///  2. acts on the hotkeys (reset, pause, speed, preset...)
///  3. hands the key state to the VM
///  4. moves the clock on by however long the last frame took, which ticks
///     the timers and runs as many instructions as the CPU speed allows
///  5. draws the framebuffer
///
/// The frame rate only decides how often that happens. How many ticks and
/// instructions run is decided by elapsed time alone.
use log::{debug, info, warn};
use spin_sleep::LoopHelper;
use std::time::Duration;

use crate::config::next_cpu_speed;
use crate::display::Display;
use crate::error::{Result, VmError};
use crate::input::{Command, Input};
use crate::interpreter::{Chip8Interpreter, ResetKind, State};
use crate::quirks::{Preset, Quirks};
use crate::sound::{Mute, Sound};
use crate::timer::{Clock, FrameReport};

/// how often input is polled and the screen redrawn
pub const FRAME_RATE: f64 = 60.0;

/// a stall longer than this (a debugger, a suspended terminal) isn't
/// caught up on
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

pub struct Environment<'a> {
    vm: Chip8Interpreter,
    clock: Clock,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    muted: bool,
    show_debug: bool,
    running: bool,
}

impl<'a> Environment<'a> {
    pub fn new(
        vm: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        Environment {
            vm,
            clock: Clock::new(),
            display,
            input,
            sound,
            muted: false,
            show_debug: false,
            running: true,
        }
    }

    pub fn vm(&self) -> &Chip8Interpreter {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut Chip8Interpreter {
        &mut self.vm
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_debug(&mut self, show: bool) {
        self.show_debug = show;
    }

    /// one pass of the main loop, `elapsed` after the last one
    pub fn run_frame(&mut self, elapsed: Duration) -> Result<FrameReport> {
        let frame = self.input.poll()?;
        for cmd in frame.commands.iter() {
            self.command(*cmd);
        }
        self.vm.refresh_keys(frame.held, frame.released);

        let mut mute = Mute::new();
        let sound: &mut dyn Sound = if self.muted {
            &mut mute
        } else {
            &mut *self.sound
        };
        let mut report = FrameReport::default();
        if self.vm.is_loaded() {
            report = self.clock.advance(elapsed, &mut self.vm, sound);
        } else if let Err(e) = self.clock.sync_tone(self.vm.tone(), sound) {
            // nothing to run, but a tone from before an unload still has to stop
            warn!("{}", e);
            report.sound_failed = true;
        }
        if report.sound_failed && !self.muted {
            warn!("sound device failed, muting");
            self.muted = true;
        }
        if report.exit {
            info!("program exited");
            self.running = false;
        }

        let status = if self.show_debug {
            Some(status_line(&self.vm, &self.clock))
        } else {
            None
        };
        self.display.draw(self.vm.framebuffer(), status.as_deref())?;
        Ok(report)
    }

    /// run frames at FRAME_RATE until the program exits or the user quits
    pub fn main_loop(&mut self) -> Result<()> {
        let mut pacer = LoopHelper::builder().build_with_target_rate(FRAME_RATE);
        while self.running {
            let elapsed = pacer.loop_start().min(MAX_FRAME_TIME);
            self.run_frame(elapsed)?;
            pacer.loop_sleep();
        }
        if !self.muted {
            self.sound.stop().map_err(|e| VmError::Sound(e.to_string()))?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: Command) {
        debug!("hotkey: {:?}", cmd);
        match cmd {
            Command::Quit => self.running = false,
            Command::ResetProgram => self.vm.reset(ResetKind::Program),
            Command::Unload => self.vm.reset(ResetKind::Unload),
            Command::ResetEmulator => {
                self.vm.reset(ResetKind::Emulator);
                self.clock.reset();
            }
            Command::CycleSpeed => {
                let speed = next_cpu_speed(self.vm.config().cpu_speed);
                info!("cpu speed {} instructions/s", speed);
                self.vm.config_mut().cpu_speed = speed;
            }
            Command::TogglePreset => {
                let quirks = &mut self.vm.config_mut().quirks;
                let preset = quirks.matches().map_or(Preset::Chip8, Preset::toggled);
                info!("switching to {:?} quirks", preset);
                *quirks = Quirks::preset(preset);
            }
            Command::Pause => self.clock.toggle_pause(),
            Command::Step => self.clock.request_step(),
            Command::ToggleDebug => self.show_debug = !self.show_debug,
        }
    }
}

/// registers, timers and the next instruction on one line
pub fn status_line(vm: &Chip8Interpreter, clock: &Clock) -> String {
    let regs = vm.registers();
    let v: Vec<String> = regs.v.iter().map(|r| format!("{:02x}", r)).collect();
    let preset = match vm.config().quirks.matches() {
        Some(Preset::Chip8) => "chip8",
        Some(Preset::SuperChip) => "schip",
        None => "custom",
    };
    let mut line = format!(
        "PC {:03x} I {:03x} V {} DT {:02x} ST {:02x} SP {} | {} | {} ips {}",
        regs.pc(),
        regs.i(),
        v.join(" "),
        vm.timers().delay,
        vm.timers().sound,
        vm.stack().depth(),
        vm.current_instruction(),
        vm.config().cpu_speed,
        preset,
    );
    if clock.is_paused() {
        line.push_str(" [paused]");
    }
    if let State::AwaitingKey { .. } = vm.state() {
        line.push_str(" [key?]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::display::DummyDisplay;
    use crate::input::{DummyInput, InputFrame};
    use std::error::Error;

    const FRAME: Duration = Duration::from_millis(10);

    fn loaded(program: &[u8]) -> Result<Chip8Interpreter> {
        let mut vm = Chip8Interpreter::new(Config::default());
        vm.load(program)?;
        Ok(vm)
    }

    fn with_commands(cmds: &[Command]) -> DummyInput {
        DummyInput::new(vec![InputFrame {
            commands: cmds.to_vec(),
            ..InputFrame::default()
        }])
    }

    #[test]
    fn test_frame_runs_and_draws() -> Result<()> {
        let (mut d, mut i, mut s) = (DummyDisplay::new(), DummyInput::default(), Mute::new());
        let mut env = Environment::new(loaded(&[0x70, 0x01, 0x12, 0x00])?, &mut d, &mut i, &mut s);
        // 700 ips for 10ms is 7 instructions
        let report = env.run_frame(FRAME)?;
        assert_eq!(report.steps, 7);
        assert_eq!(env.vm().registers().v[0], 4);
        drop(env);
        assert_eq!(d.frames, 1);
        assert_eq!(d.last_status, None);
        Ok(())
    }

    #[test]
    fn test_nothing_loaded_runs_nothing() -> Result<()> {
        let (mut d, mut i, mut s) = (DummyDisplay::new(), DummyInput::default(), Mute::new());
        let vm = Chip8Interpreter::new(Config::default());
        let mut env = Environment::new(vm, &mut d, &mut i, &mut s);
        assert_eq!(env.run_frame(FRAME)?.steps, 0);
        assert_eq!(env.vm().registers().pc(), 0x200);
        Ok(())
    }

    #[test]
    fn test_quit() -> Result<()> {
        let (mut d, mut s) = (DummyDisplay::new(), Mute::new());
        let mut i = with_commands(&[Command::Quit]);
        let mut env = Environment::new(loaded(&[0x12, 0x00])?, &mut d, &mut i, &mut s);
        env.run_frame(FRAME)?;
        assert!(!env.is_running());
        Ok(())
    }

    #[test]
    fn test_exit_opcode_stops_loop() -> Result<()> {
        let (mut d, mut i, mut s) = (DummyDisplay::new(), DummyInput::default(), Mute::new());
        let mut env = Environment::new(loaded(&[0x00, 0xfd])?, &mut d, &mut i, &mut s);
        env.main_loop()?;
        assert!(!env.is_running());
        Ok(())
    }

    #[test]
    fn test_pause_and_step() -> Result<()> {
        let (mut d, mut s) = (DummyDisplay::new(), Mute::new());
        let mut i = DummyInput::new(vec![
            InputFrame {
                commands: vec![Command::Pause],
                ..InputFrame::default()
            },
            InputFrame::default(),
            InputFrame {
                commands: vec![Command::Step],
                ..InputFrame::default()
            },
        ]);
        let mut env = Environment::new(loaded(&[0x70, 0x01, 0x12, 0x00])?, &mut d, &mut i, &mut s);
        assert_eq!(env.run_frame(FRAME)?.steps, 0);
        assert_eq!(env.run_frame(FRAME)?.steps, 0);
        assert_eq!(env.run_frame(FRAME)?.steps, 1);
        assert_eq!(env.vm().registers().v[0], 1);
        Ok(())
    }

    #[test]
    fn test_speed_and_preset_hotkeys() -> Result<()> {
        let (mut d, mut s) = (DummyDisplay::new(), Mute::new());
        let mut i = with_commands(&[Command::CycleSpeed, Command::TogglePreset]);
        let mut env = Environment::new(loaded(&[0x12, 0x00])?, &mut d, &mut i, &mut s);
        env.run_frame(FRAME)?;
        let config = env.vm().config();
        assert_eq!(config.cpu_speed, 1000);
        assert_eq!(config.quirks.matches(), Some(Preset::SuperChip));
        assert!(config.quirks.extended_instruction_set);
        Ok(())
    }

    #[test]
    fn test_reset_emulator_unpauses() -> Result<()> {
        let (mut d, mut s) = (DummyDisplay::new(), Mute::new());
        let mut i = DummyInput::new(vec![
            InputFrame {
                commands: vec![Command::Pause, Command::CycleSpeed],
                ..InputFrame::default()
            },
            InputFrame {
                commands: vec![Command::ResetEmulator],
                ..InputFrame::default()
            },
        ]);
        let mut env = Environment::new(loaded(&[0x12, 0x00])?, &mut d, &mut i, &mut s);
        env.run_frame(FRAME)?;
        assert!(env.clock().is_paused());
        env.run_frame(FRAME)?;
        assert!(!env.clock().is_paused());
        assert_eq!(env.vm().config(), &Config::default());
        assert!(!env.vm().is_loaded());
        Ok(())
    }

    #[test]
    fn test_keys_reach_the_vm() -> Result<()> {
        let (mut d, mut s) = (DummyDisplay::new(), Mute::new());
        let mut i = DummyInput::new(DummyInput::tap(0xc));
        let mut env = Environment::new(loaded(&[0xf5, 0x0a, 0x12, 0x02])?, &mut d, &mut i, &mut s);
        env.run_frame(FRAME)?;
        assert_eq!(env.vm().state(), State::AwaitingKey { x: 5 });
        env.run_frame(FRAME)?;
        assert_eq!(env.vm().state(), State::Running);
        assert_eq!(env.vm().registers().v[5], 0xc);
        Ok(())
    }

    #[test]
    fn test_debug_status_line() -> Result<()> {
        let (mut d, mut s) = (DummyDisplay::new(), Mute::new());
        let mut i = with_commands(&[Command::ToggleDebug, Command::Pause]);
        let mut env = Environment::new(loaded(&[0xa2, 0x2a])?, &mut d, &mut i, &mut s);
        env.run_frame(FRAME)?;
        drop(env);
        let status = d.last_status.unwrap_or_default();
        assert!(status.starts_with("PC 200 I 200 V 00"));
        assert!(status.contains("| LD I, 22A |"));
        assert!(status.ends_with("[paused]"));
        Ok(())
    }

    struct BrokenSpeaker;

    impl Sound for BrokenSpeaker {
        fn beep(&mut self) -> std::result::Result<(), Box<dyn Error>> {
            Err("no speaker".into())
        }

        fn stop(&mut self) -> std::result::Result<(), Box<dyn Error>> {
            Err("no speaker".into())
        }
    }

    #[test]
    fn test_broken_sound_mutes() -> Result<()> {
        let (mut d, mut i, mut s) = (DummyDisplay::new(), DummyInput::default(), BrokenSpeaker);
        let mut env = Environment::new(loaded(&[0x12, 0x00])?, &mut d, &mut i, &mut s);
        env.vm_mut().timers_mut().sound = 10;
        env.run_frame(FRAME * 2)?;
        assert!(env.muted);
        // carries on without it
        assert!(env.run_frame(FRAME * 2)?.ticks > 0);
        assert!(env.is_running());
        Ok(())
    }

    #[test]
    fn test_broken_sound_loses_no_time() -> Result<()> {
        let (mut d, mut i, mut s) = (DummyDisplay::new(), DummyInput::default(), BrokenSpeaker);
        let mut env = Environment::new(loaded(&[0x12, 0x00])?, &mut d, &mut i, &mut s);
        env.vm_mut().timers_mut().delay = 100;
        env.vm_mut().timers_mut().sound = 100;
        // one tick's worth of time, and 11 instructions at 700 ips
        let report = env.run_frame(Duration::from_micros(16_667))?;
        assert!(report.sound_failed);
        assert_eq!(report.ticks, 1);
        assert_eq!(report.steps, 11);
        assert_eq!(env.vm().timers().delay, 99);
        // the failed tick isn't run a second time
        assert_eq!(env.run_frame(Duration::ZERO)?.ticks, 0);
        assert_eq!(env.vm().timers().delay, 99);
        Ok(())
    }

    /// a speaker you can check on
    #[derive(Default)]
    struct Speaker {
        on: bool,
    }

    impl Sound for Speaker {
        fn beep(&mut self) -> std::result::Result<(), Box<dyn Error>> {
            self.on = true;
            Ok(())
        }

        fn stop(&mut self) -> std::result::Result<(), Box<dyn Error>> {
            self.on = false;
            Ok(())
        }
    }

    #[test]
    fn test_unload_stops_the_beep() -> Result<()> {
        let (mut d, mut s) = (DummyDisplay::new(), Speaker::default());
        let mut i = DummyInput::new(vec![
            InputFrame::default(),
            InputFrame {
                commands: vec![Command::Unload],
                ..InputFrame::default()
            },
        ]);
        let mut env = Environment::new(loaded(&[0x12, 0x00])?, &mut d, &mut i, &mut s);
        env.vm_mut().timers_mut().sound = 200;
        env.run_frame(FRAME * 2)?;
        env.run_frame(FRAME)?;
        assert!(!env.vm().is_loaded());
        assert!(!env.vm().tone());
        for _ in 0..10 {
            env.run_frame(FRAME)?;
        }
        drop(env);
        assert!(!s.on);
        Ok(())
    }
}
