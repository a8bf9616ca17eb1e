//! # emulator
//!
//! The environment around the interpreter: once a frame it reads the keys,
//! runs a batch of instructions, redraws if the screen changed and updates
//! the beeper, then sleeps out the rest of the frame.
//!
//! Only the first instruction of a frame is a full timestep, so the timers
//! count down once per frame whatever the instruction rate.
use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Input;
use crate::interpreter::Chip8Interpreter;
use crate::random::SeededRandom;
use crate::sound::Sound;
use log::{info, warn};
use std::io;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error(transparent)]
    Machine(#[from] Chip8Error),

    #[error("terminal i/o failed")]
    Io(#[from] io::Error),

    #[error("sound device failed: {0}")]
    Sound(String),
}

pub struct Emulator<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
}

impl<'a> Emulator<'a> {
    pub fn new(
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: Config,
    ) -> Self {
        let random = Box::new(SeededRandom::new(config.seed));
        let mut interpreter = Chip8Interpreter::new(random, config.quirks);
        interpreter.load_font();
        Emulator {
            interpreter,
            display,
            input,
            sound,
            config,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        self.interpreter.load_program(reader)
    }

    /// run frames until the user quits, max_frames is reached or something
    /// fails. returns the number of frames run
    pub fn main_loop(&mut self, max_frames: Option<u64>) -> Result<u64, EmulatorError> {
        info!(
            "running {} instructions per frame at {} frames per second",
            self.config.instructions_per_frame(),
            self.config.frame_rate
        );
        let frame_duration = self.config.frame_duration();
        let mut frames = 0;

        let result = loop {
            if max_frames.map_or(false, |max| frames >= max) {
                break Ok(frames);
            }
            let started = Instant::now();
            if let Err(e) = self.run_frame() {
                break Err(e);
            }
            frames += 1;
            if self.input.quit_requested() {
                info!("quit requested after {} frames", frames);
                break Ok(frames);
            }
            if let Some(rest) = frame_duration.checked_sub(started.elapsed()) {
                spin_sleep::sleep(rest);
            }
        };

        // don't leave the beeper going, whatever happened
        let silenced = self.sound.follow_timer(0).map_err(sound_error);
        let frames = result?;
        silenced?;
        Ok(frames)
    }

    /// one frame: keys in, instructions, then screen and sound out
    pub fn run_frame(&mut self) -> Result<(), EmulatorError> {
        let mask = self.input.key_mask()?;
        self.interpreter.set_input_mask(mask);

        for n in 0..self.config.instructions_per_frame() {
            let result = if n == 0 {
                self.interpreter.execute_timestep()
            } else {
                self.interpreter.execute_current_instruction()
            };
            match result {
                Ok(()) => {}
                Err(Chip8Error::UnknownOpcode(diagnostic)) if !self.config.halt_on_unknown_opcode => {
                    warn!(
                        "skipping unknown opcode {:#06x} at {:#05x}",
                        diagnostic.word(),
                        diagnostic.program_counter
                    );
                    self.interpreter.skip_instruction();
                }
                Err(e) => return Err(e.into()),
            }
            // nothing else happens until the next frame brings new keys
            if self.interpreter.is_waiting_for_key() {
                break;
            }
        }

        if self.interpreter.take_redraw() {
            self.display.draw(self.interpreter.machine().framebuffer())?;
        }
        self.sound
            .follow_timer(self.interpreter.machine().sound_timer())
            .map_err(sound_error)
    }
}

fn sound_error(e: Box<dyn std::error::Error>) -> EmulatorError {
    EmulatorError::Sound(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::sound::Mute;
    use std::error::Error;

    /// remembers every change it was asked to make
    #[derive(Default)]
    struct RecordingSound {
        sounding: bool,
        events: Vec<&'static str>,
    }

    impl Sound for RecordingSound {
        fn start(&mut self) -> Result<(), Box<dyn Error>> {
            self.sounding = true;
            self.events.push("start");
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Box<dyn Error>> {
            self.sounding = false;
            self.events.push("stop");
            Ok(())
        }

        fn is_sounding(&self) -> bool {
            self.sounding
        }
    }

    fn fast_config() -> Config {
        Config {
            frame_rate: 1000,
            instructions_per_frame: 4,
            seed: Some(8),
            ..Config::default()
        }
    }

    #[test]
    fn test_draws_glyph_once() -> Result<(), EmulatorError> {
        // LD I, 0x000; DRW V0, V0, 5; JP 0x204
        let mut prog: &[u8] = &[0xa0, 0x00, 0xd0, 0x05, 0x12, 0x04];
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0; 3]);
        let mut sound = Mute::new();
        let mut emulator = Emulator::new(&mut display, &mut input, &mut sound, fast_config());
        emulator.load_program(&mut prog)?;
        let frames = emulator.main_loop(None)?;
        assert_eq!(frames, 3);
        assert_eq!(emulator.interpreter().machine().program_counter(), 0x204);
        drop(emulator);

        assert_eq!(display.frames, 1);
        let frame = display.last.unwrap();
        assert_eq!(frame.get(0, 0), 1);
        assert_eq!(frame.get(3, 0), 1);
        assert_eq!(frame.get(1, 1), 0);
        Ok(())
    }

    #[test]
    fn test_max_frames() -> Result<(), EmulatorError> {
        let mut prog: &[u8] = &[0x12, 0x00];
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0; 10]);
        let mut sound = Mute::new();
        let mut emulator = Emulator::new(&mut display, &mut input, &mut sound, fast_config());
        emulator.load_program(&mut prog)?;
        assert_eq!(emulator.main_loop(Some(2))?, 2);
        Ok(())
    }

    #[test]
    fn test_unknown_opcode_skipped() -> Result<(), EmulatorError> {
        let mut prog: &[u8] = &[0xff, 0xff, 0x61, 0x05, 0x12, 0x04];
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0]);
        let mut sound = Mute::new();
        let mut emulator = Emulator::new(&mut display, &mut input, &mut sound, fast_config());
        emulator.load_program(&mut prog)?;
        emulator.main_loop(None)?;
        assert_eq!(emulator.interpreter().machine().register(1), 5);
        Ok(())
    }

    #[test]
    fn test_unknown_opcode_halts_when_asked() -> Result<(), EmulatorError> {
        let mut prog: &[u8] = &[0xff, 0xff, 0x61, 0x05];
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0]);
        let mut sound = Mute::new();
        let config = Config {
            halt_on_unknown_opcode: true,
            ..fast_config()
        };
        let mut emulator = Emulator::new(&mut display, &mut input, &mut sound, config);
        emulator.load_program(&mut prog)?;
        match emulator.main_loop(None) {
            Err(EmulatorError::Machine(Chip8Error::UnknownOpcode(d))) => {
                assert_eq!(d.word(), 0xffff);
            }
            other => panic!("expected UnknownOpcode, got {:?}", other),
        }
        assert_eq!(emulator.interpreter().machine().program_counter(), 0x200);
        Ok(())
    }

    #[test]
    fn test_stack_error_halts() -> Result<(), EmulatorError> {
        let mut prog: &[u8] = &[0x00, 0xee];
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0]);
        let mut sound = Mute::new();
        let mut emulator = Emulator::new(&mut display, &mut input, &mut sound, fast_config());
        emulator.load_program(&mut prog)?;
        assert!(matches!(
            emulator.main_loop(None),
            Err(EmulatorError::Machine(Chip8Error::StackEmpty { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_waits_for_key_across_frames() -> Result<(), EmulatorError> {
        // LD V3, K; JP 0x202
        let mut prog: &[u8] = &[0xf3, 0x0a, 0x12, 0x02];
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0, 0, 1 << 0x5]);
        let mut sound = Mute::new();
        let mut emulator = Emulator::new(&mut display, &mut input, &mut sound, fast_config());
        emulator.load_program(&mut prog)?;

        emulator.run_frame()?;
        emulator.run_frame()?;
        assert!(emulator.interpreter().is_waiting_for_key());
        assert_eq!(emulator.interpreter().machine().program_counter(), 0x200);

        emulator.run_frame()?;
        assert!(!emulator.interpreter().is_waiting_for_key());
        assert_eq!(emulator.interpreter().machine().register(3), 0x5);
        assert_eq!(emulator.interpreter().machine().program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_sound_follows_timer() -> Result<(), EmulatorError> {
        // LD V0, 3; LD ST, V0; JP 0x204
        let mut prog: &[u8] = &[0x60, 0x03, 0xf0, 0x18, 0x12, 0x04];
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0; 10]);
        let mut sound = RecordingSound::default();
        let mut emulator = Emulator::new(&mut display, &mut input, &mut sound, fast_config());
        emulator.load_program(&mut prog)?;

        emulator.run_frame()?;
        assert_eq!(emulator.interpreter().machine().sound_timer(), 3);
        emulator.run_frame()?;
        emulator.run_frame()?;
        assert_eq!(emulator.interpreter().machine().sound_timer(), 1);
        emulator.run_frame()?;
        assert_eq!(emulator.interpreter().machine().sound_timer(), 0);
        drop(emulator);

        assert_eq!(sound.events, vec!["start", "stop"]);
        Ok(())
    }

    #[test]
    fn test_timers_tick_once_per_frame() -> Result<(), EmulatorError> {
        // LD V0, 60; LD DT, V0; JP 0x204
        let mut prog: &[u8] = &[0x60, 0x3c, 0xf0, 0x15, 0x12, 0x04];
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0; 10]);
        let mut sound = Mute::new();
        let config = Config {
            instructions_per_frame: 20,
            ..fast_config()
        };
        let mut emulator = Emulator::new(&mut display, &mut input, &mut sound, config);
        emulator.load_program(&mut prog)?;
        for _ in 0..5 {
            emulator.run_frame()?;
        }
        assert_eq!(emulator.interpreter().machine().delay_timer(), 56);
        Ok(())
    }
}
