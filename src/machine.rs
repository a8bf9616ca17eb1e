//! # machine
//!
//! All of the mutable state of the virtual CPU. Only the interpreter writes
//! registers, stack, timers and the screen; the host gets read access plus
//! the handful of things it legitimately supplies (ROM, font, key mask).
use crate::error::{Chip8Error, Diagnostic};
use crate::framebuffer::Framebuffer;
use crate::memory::{Chip8MemoryMap, MemoryMap, PROGRAM_ADDR};

pub const STACK_SIZE: usize = 16;
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG: usize = 0xf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    pub(crate) memory: Chip8MemoryMap,
    pub(crate) stack: [u16; STACK_SIZE],
    pub(crate) stack_pointer: u8,
    pub(crate) registers: [u8; REGISTER_COUNT],
    pub(crate) register_i: u16,
    pub(crate) program_counter: u16,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) input_mask: u16,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// everything zeroed, ready to run from 0x200
    pub fn new() -> Self {
        Machine {
            memory: Chip8MemoryMap::new(),
            stack: [0; STACK_SIZE],
            stack_pointer: 0,
            registers: [0; REGISTER_COUNT],
            register_i: 0,
            program_counter: PROGRAM_ADDR,
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: Framebuffer::new(),
            input_mask: 0,
        }
    }

    /// back to the state new() gives, reusing the existing buffers
    pub fn reset(&mut self) {
        self.memory.clear();
        self.stack = [0; STACK_SIZE];
        self.stack_pointer = 0;
        self.registers = [0; REGISTER_COUNT];
        self.register_i = 0;
        self.program_counter = PROGRAM_ADDR;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.framebuffer.clear();
        self.input_mask = 0;
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(rom)
    }

    pub fn load_font(&mut self) {
        self.memory.load_font();
    }

    /// set by the host before each timestep; bit k is key k
    pub fn set_input_mask(&mut self, mask: u16) {
        self.input_mask = mask;
    }

    pub fn input_mask(&self) -> u16 {
        self.input_mask
    }

    pub fn is_key_down(&self, key: u8) -> bool {
        self.input_mask & (1 << (key & 0x0f)) != 0
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    pub fn register(&self, x: usize) -> u8 {
        self.registers[x & 0x0f]
    }

    pub fn register_i(&self) -> u16 {
        self.register_i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    /// the live call frames, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer as usize]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    /// the audio sink should sound while this is non-zero
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// the instruction word at the program counter
    pub fn current_word(&self) -> u16 {
        self.memory.get_word(self.program_counter)
    }

    /// count both timers down by one, stopping at zero
    pub(crate) fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub(crate) fn advance(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(2);
    }

    /// always move on one instruction, then one more if cond holds
    pub(crate) fn skip_if(&mut self, cond: bool) {
        self.advance();
        if cond {
            self.advance();
        }
    }

    pub(crate) fn push(&mut self, addr: u16) -> Result<(), Chip8Error> {
        if self.stack_pointer as usize == STACK_SIZE {
            return Err(Chip8Error::StackFull {
                program_counter: self.program_counter,
            });
        }
        self.stack[self.stack_pointer as usize] = addr;
        self.stack_pointer += 1;
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<u16, Chip8Error> {
        if self.stack_pointer == 0 {
            return Err(Chip8Error::StackEmpty {
                program_counter: self.program_counter,
            });
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer as usize])
    }

    pub(crate) fn diagnostic(&self) -> Diagnostic {
        Diagnostic {
            bytes: self.current_word().to_be_bytes(),
            program_counter: self.program_counter,
            stack_pointer: self.stack_pointer,
            register_i: self.register_i,
            registers: self.registers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_machine() {
        let m = Machine::new();
        assert_eq!(m.program_counter(), 0x200);
        assert_eq!(m.stack_pointer(), 0);
        assert!(m.stack().is_empty());
        assert_eq!(m.registers(), &[0; 16]);
        assert_eq!(m.register_i(), 0);
        assert_eq!(m.delay_timer(), 0);
        assert_eq!(m.sound_timer(), 0);
        assert!(m.framebuffer().is_blank());
        assert_eq!(m.input_mask(), 0);
    }

    #[test]
    fn test_reset_restores_initial_state() -> Result<(), Chip8Error> {
        let mut m = Machine::new();
        m.load_font();
        m.load_rom(&[0x12, 0x34])?;
        m.push(0x0222)?;
        m.registers[3] = 9;
        m.register_i = 0x123;
        m.program_counter = 0x400;
        m.delay_timer = 4;
        m.sound_timer = 5;
        m.framebuffer.set(1, 1, true);
        m.set_input_mask(0x00ff);
        m.reset();
        assert_eq!(m, Machine::new());
        Ok(())
    }

    #[test]
    fn test_timers_floor_at_zero() {
        let mut m = Machine::new();
        m.delay_timer = 2;
        m.sound_timer = 1;
        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (1, 0));
        m.tick_timers();
        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (0, 0));
    }

    #[test]
    fn test_stack_full_leaves_stack_pointer() -> Result<(), Chip8Error> {
        let mut m = Machine::new();
        for n in 0..16 {
            m.push(0x200 + n * 2)?;
        }
        assert_eq!(m.stack_pointer(), 16);
        match m.push(0x300) {
            Err(Chip8Error::StackFull { program_counter: 0x200 }) => {}
            other => panic!("expected StackFull, got {:?}", other),
        }
        assert_eq!(m.stack_pointer(), 16);
        assert_eq!(m.stack()[15], 0x21e);
        Ok(())
    }

    #[test]
    fn test_stack_empty_leaves_stack_pointer() {
        let mut m = Machine::new();
        assert!(matches!(m.pop(), Err(Chip8Error::StackEmpty { .. })));
        assert_eq!(m.stack_pointer(), 0);
    }

    #[test]
    fn test_stack_is_lifo() -> Result<(), Chip8Error> {
        let mut m = Machine::new();
        m.push(0x202)?;
        m.push(0x404)?;
        assert_eq!(m.stack(), &[0x202, 0x404]);
        assert_eq!(m.pop()?, 0x404);
        assert_eq!(m.pop()?, 0x202);
        Ok(())
    }

    #[test]
    fn test_key_mask() {
        let mut m = Machine::new();
        m.set_input_mask(0b1000_0000_0000_0010);
        assert!(m.is_key_down(0x1));
        assert!(m.is_key_down(0xf));
        assert!(!m.is_key_down(0x0));
        // only the low nibble picks the key
        assert!(m.is_key_down(0x11));
    }

    #[test]
    fn test_diagnostic_snapshot() -> Result<(), Chip8Error> {
        let mut m = Machine::new();
        m.load_rom(&[0x5a, 0xb1])?;
        m.registers[0xa] = 0x3c;
        m.push(0x250)?;
        let d = m.diagnostic();
        assert_eq!(d.bytes, [0x5a, 0xb1]);
        assert_eq!(d.program_counter, 0x200);
        assert_eq!(d.stack_pointer, 1);
        assert_eq!(d.registers[0xa], 0x3c);
        Ok(())
    }
}
