use crate::bits::byte_to_nibbles;
use crate::machine::STACK_SIZE;
use crate::memory::MAX_ROM_SIZE;
use std::fmt;
use std::io;
use thiserror::Error;

/// everything the interpreter can hand back to its host
///
/// none of these are retried internally; the host decides whether to halt,
/// skip the instruction or carry on
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("ROM is {0} bytes but only {} bytes of program memory are available", MAX_ROM_SIZE)]
    RomTooLarge(usize),

    #[error("return with an empty call stack at {program_counter:#05x}")]
    StackEmpty { program_counter: u16 },

    #[error("call with all {} stack frames in use at {program_counter:#05x}", STACK_SIZE)]
    StackFull { program_counter: u16 },

    #[error("unknown opcode {:#06x} at {:#05x}", .0.word(), .0.program_counter)]
    UnknownOpcode(Box<Diagnostic>),

    #[error("failed to read ROM")]
    Io(#[from] io::Error),
}

/// snapshot of the machine taken when an instruction could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub bytes: [u8; 2],
    pub program_counter: u16,
    pub stack_pointer: u8,
    pub register_i: u16,
    pub registers: [u8; 16],
}

impl Diagnostic {
    pub fn word(&self) -> u16 {
        u16::from_be_bytes(self.bytes)
    }

    pub fn nibbles(&self) -> [u8; 4] {
        let (n1, n2) = byte_to_nibbles(self.bytes[0]);
        let (n3, n4) = byte_to_nibbles(self.bytes[1]);
        [n1, n2, n3, n4]
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [n1, n2, n3, n4] = self.nibbles();
        writeln!(f, "unrecognised instruction {:X}{:X}{:X}{:X}", n1, n2, n3, n4)?;
        writeln!(
            f,
            "  bytes      {:3} {:3}        (0x{:02X} 0x{:02X})",
            self.bytes[0], self.bytes[1], self.bytes[0], self.bytes[1]
        )?;
        writeln!(f, "  nibbles    {} {} {} {}", n1, n2, n3, n4)?;
        writeln!(f, "  pc         {:#05x}", self.program_counter)?;
        writeln!(f, "  sp         {}", self.stack_pointer)?;
        writeln!(f, "  i          {:#05x}", self.register_i)?;
        write!(f, "  registers ")?;
        for (n, v) in self.registers.iter().enumerate() {
            write!(f, " V{:X}={:02X}", n, v)?;
        }
        Ok(())
    }
}
