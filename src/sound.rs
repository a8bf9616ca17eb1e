use beep::beep;
use std::error::Error;

/// the single tone a CHIP-8 can make. the machine never makes sound itself;
/// the host polls the sound timer once a frame and hands it to follow_timer
pub trait Sound {
    fn start(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_sounding(&self) -> bool;

    /// sound while the timer is non-zero; only touches the device on a change
    fn follow_timer(&mut self, sound_timer: u8) -> Result<(), Box<dyn Error>> {
        match (sound_timer > 0, self.is_sounding()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => Ok(()),
        }
    }
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker tone through the beep crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Sound for SimpleBeep {
    fn start(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.is_beeping = false;
        Ok(())
    }

    fn is_sounding(&self) -> bool {
        self.is_beeping
    }
}

/// keeps track of whether it should be sounding, and doesn't
#[derive(Default)]
pub struct Mute {
    sounding: bool,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }
}

impl Sound for Mute {
    fn start(&mut self) -> Result<(), Box<dyn Error>> {
        self.sounding = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.sounding = false;
        Ok(())
    }

    fn is_sounding(&self) -> bool {
        self.sounding
    }
}
