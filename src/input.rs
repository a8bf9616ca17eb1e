use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// the COSMAC VIP hex keypad laid over the left-hand side of a qwerty
/// keyboard:
///
///   1 2 3 C      1 2 3 4
///   4 5 6 D      q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// reads keypresses
pub trait Input {
    /// the keys that are down right now, bit k set for key k. called once
    /// per frame
    fn key_mask(&mut self) -> Result<u16, io::Error>;

    /// whether the user has asked to leave the emulator
    fn quit_requested(&self) -> bool;
}

/// keyboard input from the terminal, using crossterm
///
/// terminals report presses but not releases, so a pressed key is held down
/// for a fixed number of frames (auto-repeat keeps it down while held)
pub struct StdinInput {
    keymap: HashMap<char, u8>,
    held: [u8; 16],
    hold_frames: u8,
    quit: bool,
}

impl StdinInput {
    pub fn new(hold_frames: u8) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; 16],
            hold_frames: hold_frames.max(1),
            quit: false,
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true;
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => self.held[*mapped_key as usize] = self.hold_frames,
                        None => debug!("can't map {:?} to a COSMAC key", key),
                    },
                    KeyCode::Esc => self.quit = true,
                    other => debug!("ignoring key {:?}", other),
                },
                other => debug!("ignoring terminal event {:?}", other),
            }
        }
        Ok(())
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn key_mask(&mut self) -> Result<u16, io::Error> {
        self.read_stdin()?;
        Ok(hold_mask(&mut self.held))
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// mask of keys with frames left on them, counting each one down
fn hold_mask(held: &mut [u8; 16]) -> u16 {
    let mut mask = 0;
    for (key, frames) in held.iter_mut().enumerate() {
        if *frames > 0 {
            mask |= 1 << key;
            *frames -= 1;
        }
    }
    mask
}

/// dummy Input implementation for testing; plays back one mask per frame,
/// then asks to quit
pub struct DummyInput {
    masks: VecDeque<u16>,
}

impl DummyInput {
    pub fn new(masks: &[u16]) -> Self {
        DummyInput {
            masks: masks.iter().copied().collect(),
        }
    }
}

impl Input for DummyInput {
    fn key_mask(&mut self) -> Result<u16, io::Error> {
        Ok(self.masks.pop_front().unwrap_or(0))
    }

    fn quit_requested(&self) -> bool {
        self.masks.is_empty()
    }
}
