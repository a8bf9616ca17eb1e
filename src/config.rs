use std::time::Duration;

/// the points where CHIP-8 interpreters historically disagree. the defaults
/// give the behaviour most modern programs expect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 8xy6/8xyE shift Vy into Vx, as the COSMAC VIP did, instead of
    /// shifting Vx in place
    pub shift_uses_vy: bool,

    /// Fx55/Fx65 leave I pointing just past the last register transferred
    pub load_store_increments_i: bool,

    /// Fx1E sets VF when I goes past 0xFFF (and clears it otherwise). off
    /// means Fx1E never touches VF
    pub index_overflow_sets_vf: bool,
}

pub const DEFAULT_FRAME_RATE: u32 = 60;
pub const DEFAULT_INSTRUCTIONS_PER_FRAME: u32 = 10;
pub const DEFAULT_KEY_HOLD_FRAMES: u8 = 6;

/// how the host drives the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// frames (and so timer ticks) per second
    pub frame_rate: u32,
    /// instructions per frame; the first of them also ticks the timers
    pub instructions_per_frame: u32,
    /// seed for RND; None seeds from entropy
    pub seed: Option<u64>,
    /// stop on an unknown opcode rather than logging it and skipping it
    pub halt_on_unknown_opcode: bool,
    /// terminals only report presses, so a key stays down for this many frames.
    /// one press still answers a single LD Vx, K however long it is held
    pub key_hold_frames: u8,
    pub quirks: Quirks,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            frame_rate: DEFAULT_FRAME_RATE,
            instructions_per_frame: DEFAULT_INSTRUCTIONS_PER_FRAME,
            seed: None,
            halt_on_unknown_opcode: false,
            key_hold_frames: DEFAULT_KEY_HOLD_FRAMES,
            quirks: Quirks::default(),
        }
    }
}

impl Config {
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    /// never zero, otherwise the timers would stop
    pub fn instructions_per_frame(&self) -> u32 {
        self.instructions_per_frame.max(1)
    }
}
