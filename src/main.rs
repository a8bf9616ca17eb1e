use anyhow::Context;
use clap::Parser;
use log::info;
use std::fs::File;
use std::path::PathBuf;

use chip8vm::config::{
    Config, Quirks, DEFAULT_FRAME_RATE, DEFAULT_INSTRUCTIONS_PER_FRAME, DEFAULT_KEY_HOLD_FRAMES,
};
use chip8vm::display::MonoTermDisplay;
use chip8vm::emulator::Emulator;
use chip8vm::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use chip8vm::input::StdinInput;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

/// Run a CHIP-8 program in the terminal. Esc or Ctrl-C quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// path to the ROM to run
    rom: PathBuf,

    /// frames per second; the timers tick once per frame
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
    frame_rate: u32,

    /// instructions executed each frame
    #[arg(short, long, default_value_t = DEFAULT_INSTRUCTIONS_PER_FRAME)]
    ipf: u32,

    /// seed for RND, for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// no beeper
    #[arg(long)]
    mute: bool,

    /// stop on an unknown opcode instead of skipping it
    #[arg(long)]
    halt_on_unknown: bool,

    /// frames a key stays down after being pressed
    #[arg(long, default_value_t = DEFAULT_KEY_HOLD_FRAMES)]
    key_hold_frames: u8,

    /// 8xy6/8xyE shift Vy into Vx
    #[arg(long)]
    shift_uses_vy: bool,

    /// Fx55/Fx65 advance I past the registers transferred
    #[arg(long)]
    load_store_increments_i: bool,

    /// Fx1E sets VF when I passes 0xFFF
    #[arg(long)]
    index_overflow_sets_vf: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            frame_rate: self.frame_rate,
            instructions_per_frame: self.ipf,
            seed: self.seed,
            halt_on_unknown_opcode: self.halt_on_unknown,
            key_hold_frames: self.key_hold_frames,
            quirks: Quirks {
                shift_uses_vy: self.shift_uses_vy,
                load_store_increments_i: self.load_store_increments_i,
                index_overflow_sets_vf: self.index_overflow_sets_vf,
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.config();

    // open the ROM before the terminal goes raw so errors are readable
    let mut f = File::open(&args.rom)
        .with_context(|| format!("couldn't open ROM {}", args.rom.display()))?;

    let mut display = MonoTermDisplay::new(SCREEN_WIDTH, SCREEN_HEIGHT)?;
    let mut input = StdinInput::new(config.key_hold_frames)?;
    let mut beeper = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if args.mute { &mut mute } else { &mut beeper };

    let mut emulator = Emulator::new(&mut display, &mut input, sound, config);
    emulator
        .load_program(&mut f)
        .with_context(|| format!("couldn't load ROM {}", args.rom.display()))?;
    let frames = emulator.main_loop(args.max_frames)?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..(SCREEN_HEIGHT / 2) {
        println!();
    }
    info!("ran {} frames", frames);
    Ok(())
}
