//! # chip8vm
//!
//! A CHIP-8 virtual machine with a terminal front end.
//!
//! ## Design
//!
//! * the interpreter core is a pure state machine: no I/O, no globals, no
//!   blocking. one owned [`machine::Machine`] is driven by exclusive reference
//! * opcodes decode into a tagged enum and execute from a single exhaustive
//!   match
//! * every failure comes back as a value; the host decides whether to halt,
//!   skip or carry on
//! * the ambiguous corners of the instruction set are explicit [`config::Quirks`]
//! * display, input, audio and randomness are traits so alternatives plug in
//!   (terminal versions for real use, dummies for tests)
//!
//! Model
//!
//! ```text
//! Emulator
//!  |-- display, input, sound, config
//!  |-- interpreter(random, quirks)
//!  |    |-- decoder (instruction)
//!  |    `-- machine state (memory, registers, stack, timers, framebuffer, keys)
//!  `-- main loop, once per frame
//!       |-- key mask -> interpreter
//!       |-- execute_timestep(), then instructions_per_frame - 1 more
//!       |   instructions, stopping early while waiting for a key
//!       |-- redraw if 00E0 or Dxyn ran
//!       |-- beep while the sound timer is non-zero
//!       `-- sleep out the rest of the frame
//! ```
pub mod bits;
pub mod config;
pub mod display;
pub mod emulator;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod random;
pub mod sound;

pub use error::Chip8Error;
pub use interpreter::Chip8Interpreter;
pub use machine::Machine;
