use clap::Parser;
use log::{info, warn};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use chip8_vm::config::{Config, FONT_BASES};
use chip8_vm::display::MonoTermDisplay;
use chip8_vm::environment::Environment;
use chip8_vm::input::StdinInput;
use chip8_vm::interpreter::Chip8Interpreter;
use chip8_vm::quirks::Preset;
use chip8_vm::sound::{Mute, SimpleBeep, Sound};
use chip8_vm::storage::{FileFlagStore, DEFAULT_FLAG_FILE};

/// Run a CHIP-8 or SUPER-CHIP program in the terminal.
///
/// Keypad: 1234 / qwer / asdf / zxcv. Hotkeys: Esc quit, K restart program,
/// L unload, O reset emulator, H cpu speed, P quirk preset, M pause,
/// N single step, F3 registers.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// program to load at 0x200
    rom: PathBuf,

    /// instructions per second (0 stops the CPU)
    #[arg(short, long)]
    speed: Option<u32>,

    /// quirk preset
    #[arg(short, long, value_parser = parse_preset)]
    preset: Option<Preset>,

    /// JSON file with cpu_speed, font_base, quirks and diagnose_unknown
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// where the low-res font lives: 0 or 80 (0x50)
    #[arg(long, value_parser = parse_font_base)]
    font_base: Option<u16>,

    /// where FX75 keeps the flag registers
    #[arg(long, default_value = DEFAULT_FLAG_FILE)]
    flags_file: PathBuf,

    /// log unknown opcodes (RUST_LOG=debug to see them)
    #[arg(long)]
    diagnose_unknown: bool,

    /// no beeps
    #[arg(long)]
    mute: bool,

    /// show the register line from the start
    #[arg(long)]
    debug: bool,
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    match s.to_ascii_lowercase().as_str() {
        "chip8" | "chip-8" => Ok(Preset::Chip8),
        "superchip" | "super-chip" | "schip" => Ok(Preset::SuperChip),
        _ => Err(format!("unknown preset '{}', expected chip8 or superchip", s)),
    }
}

fn parse_font_base(s: &str) -> Result<u16, String> {
    let base = match s.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| e.to_string())?;
    if FONT_BASES.contains(&base) {
        Ok(base)
    } else {
        Err(format!("font base must be one of {:?}", FONT_BASES))
    }
}

fn load_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => Config::from_reader(File::open(path)?)?,
        None => Config::default(),
    };
    if let Some(preset) = args.preset {
        config = config.with_preset(preset);
    }
    if let Some(speed) = args.speed {
        config.cpu_speed = speed;
    }
    if let Some(base) = args.font_base {
        config.font_base = base;
    }
    config.diagnose_unknown |= args.diagnose_unknown;
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    // initialise
    let config = load_config(&args)?;
    info!("{:?}", config);
    let mut interpreter =
        Chip8Interpreter::with_flag_store(config, Box::new(FileFlagStore::new(&args.flags_file)));

    // load a program
    let mut f = File::open(&args.rom)?;
    interpreter.load_program(&mut f)?;

    let mut beep = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if args.mute {
        &mut mute
    } else {
        &mut beep
    };
    let mut input = StdinInput::new()?;
    let mut display = MonoTermDisplay::new()?;

    let mut env = Environment::new(interpreter, &mut display, &mut input, sound);
    env.set_debug(args.debug);
    if let Err(e) = env.main_loop() {
        warn!("{}", e);
        return Err(e.into());
    }
    drop(env);

    // shove a newline on stdout so the shell prompt doesn't land in the last frame
    println!();
    Ok(())
}
