//! # interpreter
//!
//! Fetch, decode and execute against a [`Machine`]. One call to
//! [`Chip8Interpreter::execute_current_instruction`] runs exactly one
//! instruction; [`Chip8Interpreter::execute_timestep`] ticks the timers first.
//!
//! Program counter rules:
//!  * ordinary instructions move on 2 bytes
//!  * JP, CALL, RET and JP V0 set it outright
//!  * the skip family always moves on 2, then 2 more when the condition holds
//!  * LD Vx, K leaves it alone until a key is down, so the same instruction
//!    runs again next time. A key it takes is spent until the input mask
//!    shows it released, so one press held over several frames answers one
//!    LD Vx, K and not every one that follows
//!  * anything that fails leaves it alone
//!
//! Nothing here does I/O or blocks. The host supplies keys through the
//! input mask, reads the screen after a redraw and the sound timer for the
//! beeper.
use crate::config::Quirks;
use crate::error::Chip8Error;
use crate::instruction::Opcode;
use crate::machine::{Machine, FLAG};
use crate::memory::{font_glyph_addr, MemoryMap};
use crate::random::RandomSource;
use log::{debug, trace, warn};
use std::io;

pub struct Chip8Interpreter {
    machine: Machine,
    random: Box<dyn RandomSource>,
    quirks: Quirks,
    redraw: bool,
    waiting_for_key: bool,
    /// keys taken by LD Vx, K and not yet released
    spent_keys: u16,
}

impl Chip8Interpreter {
    pub fn new(random: Box<dyn RandomSource>, quirks: Quirks) -> Self {
        Chip8Interpreter {
            machine: Machine::new(),
            random,
            quirks,
            redraw: false,
            waiting_for_key: false,
            spent_keys: 0,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// load a chip8 program from a byte slice
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        self.machine.load_rom(rom)
    }

    /// load a chip8 program from a file or whatever
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        self.machine.memory.load_program_from(reader)
    }

    pub fn load_font(&mut self) {
        self.machine.load_font();
    }

    /// zero the machine; the font and program need loading again afterwards
    pub fn reset(&mut self) {
        self.machine.reset();
        self.redraw = false;
        self.waiting_for_key = false;
        self.spent_keys = 0;
    }

    pub fn set_input_mask(&mut self, mask: u16) {
        self.spent_keys &= mask;
        self.machine.set_input_mask(mask);
    }

    /// whether the screen changed since the last call
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// whether the last instruction run was LD Vx, K with no key down
    pub fn is_waiting_for_key(&self) -> bool {
        self.waiting_for_key
    }

    /// step over the current instruction without running it; lets a host
    /// carry on past an unknown opcode
    pub fn skip_instruction(&mut self) {
        self.machine.advance();
    }

    /// tick both timers, then run one instruction
    pub fn execute_timestep(&mut self) -> Result<(), Chip8Error> {
        self.machine.tick_timers();
        self.execute_current_instruction()
    }

    pub fn execute_current_instruction(&mut self) -> Result<(), Chip8Error> {
        let word = self.machine.current_word();
        let opcode = Opcode::decode(word);
        trace!(
            "{:#05x}: {:04x} {}",
            self.machine.program_counter,
            word,
            opcode
        );
        if !matches!(opcode, Opcode::LdKey(_)) {
            self.waiting_for_key = false;
        }
        self.execute(opcode)
    }

    fn execute(&mut self, opcode: Opcode) -> Result<(), Chip8Error> {
        use Opcode::*;

        let quirks = self.quirks;
        let m = &mut self.machine;

        match opcode {
            Sys(nnn) => {
                debug!("ignoring SYS {:#05x} at {:#05x}", nnn, m.program_counter);
                m.advance();
            }
            Cls => {
                m.framebuffer.clear();
                self.redraw = true;
                m.advance();
            }
            Ret => m.program_counter = m.pop()?,
            Jp(nnn) => m.program_counter = nnn,
            Call(nnn) => {
                m.push(m.program_counter.wrapping_add(2))?;
                m.program_counter = nnn;
            }
            SeByte(x, kk) => m.skip_if(m.registers[x as usize] == kk),
            SneByte(x, kk) => m.skip_if(m.registers[x as usize] != kk),
            SeReg(x, y) => m.skip_if(m.registers[x as usize] == m.registers[y as usize]),
            SneReg(x, y) => m.skip_if(m.registers[x as usize] != m.registers[y as usize]),
            LdByte(x, kk) => {
                m.registers[x as usize] = kk;
                m.advance();
            }
            AddByte(x, kk) => {
                m.registers[x as usize] = m.registers[x as usize].wrapping_add(kk);
                m.advance();
            }
            LdReg(x, y) => {
                m.registers[x as usize] = m.registers[y as usize];
                m.advance();
            }
            Or(x, y) => {
                m.registers[x as usize] |= m.registers[y as usize];
                m.advance();
            }
            And(x, y) => {
                m.registers[x as usize] &= m.registers[y as usize];
                m.advance();
            }
            Xor(x, y) => {
                m.registers[x as usize] ^= m.registers[y as usize];
                m.advance();
            }
            // for the flag-setting ALU ops VF is written last, so with x == F
            // the flag wins over the result
            AddReg(x, y) => {
                let (sum, carry) = m.registers[x as usize].overflowing_add(m.registers[y as usize]);
                m.registers[x as usize] = sum;
                m.registers[FLAG] = carry as u8;
                m.advance();
            }
            Sub(x, y) => {
                let (vx, vy) = (m.registers[x as usize], m.registers[y as usize]);
                m.registers[x as usize] = vx.wrapping_sub(vy);
                m.registers[FLAG] = (vx >= vy) as u8;
                m.advance();
            }
            Subn(x, y) => {
                let (vx, vy) = (m.registers[x as usize], m.registers[y as usize]);
                m.registers[x as usize] = vy.wrapping_sub(vx);
                m.registers[FLAG] = (vy >= vx) as u8;
                m.advance();
            }
            Shr(x, y) => {
                let src = if quirks.shift_uses_vy { y } else { x };
                let v = m.registers[src as usize];
                m.registers[x as usize] = v >> 1;
                m.registers[FLAG] = v & 0x01;
                m.advance();
            }
            Shl(x, y) => {
                let src = if quirks.shift_uses_vy { y } else { x };
                let v = m.registers[src as usize];
                m.registers[x as usize] = v << 1;
                m.registers[FLAG] = v >> 7;
                m.advance();
            }
            LdI(nnn) => {
                m.register_i = nnn;
                m.advance();
            }
            JpV0(nnn) => m.program_counter = nnn + u16::from(m.registers[0]),
            Rnd(x, kk) => {
                m.registers[x as usize] = self.random.next_byte() & kk;
                m.advance();
            }
            Drw(x, y, n) => {
                let mut sprite = [0u8; 15];
                let rows = &mut sprite[..n as usize];
                m.memory.read_into(m.register_i, rows);
                let erased = m.framebuffer.draw_sprite(
                    m.registers[x as usize],
                    m.registers[y as usize],
                    rows,
                );
                m.registers[FLAG] = erased as u8;
                self.redraw = true;
                m.advance();
            }
            Skp(x) => m.skip_if(m.is_key_down(m.registers[x as usize])),
            Sknp(x) => m.skip_if(!m.is_key_down(m.registers[x as usize])),
            LdRegDt(x) => {
                m.registers[x as usize] = m.delay_timer;
                m.advance();
            }
            LdKey(x) => {
                let fresh = m.input_mask & !self.spent_keys;
                if fresh == 0 {
                    if !self.waiting_for_key {
                        debug!("waiting for a key at {:#05x}", m.program_counter);
                    }
                    self.waiting_for_key = true;
                } else {
                    // lowest numbered key wins when several are down
                    self.waiting_for_key = false;
                    let key = fresh.trailing_zeros();
                    self.spent_keys |= 1 << key;
                    m.registers[x as usize] = key as u8;
                    m.advance();
                }
            }
            LdDtReg(x) => {
                m.delay_timer = m.registers[x as usize];
                m.advance();
            }
            LdSt(x) => {
                m.sound_timer = m.registers[x as usize];
                m.advance();
            }
            AddI(x) => {
                let i = m.register_i.wrapping_add(u16::from(m.registers[x as usize]));
                m.register_i = i;
                if quirks.index_overflow_sets_vf {
                    m.registers[FLAG] = (i > 0x0fff) as u8;
                }
                m.advance();
            }
            LdF(x) => {
                m.register_i = font_glyph_addr(m.registers[x as usize]);
                m.advance();
            }
            LdB(x) => {
                let v = m.registers[x as usize];
                m.memory.write(m.register_i, &[v / 100, v / 10 % 10, v % 10]);
                m.advance();
            }
            LdDerefIReg(x) => {
                let count = x as usize + 1;
                m.memory.write(m.register_i, &m.registers[..count]);
                if quirks.load_store_increments_i {
                    m.register_i = m.register_i.wrapping_add(count as u16);
                }
                m.advance();
            }
            LdRegDerefI(x) => {
                let count = x as usize + 1;
                m.memory.read_into(m.register_i, &mut m.registers[..count]);
                if quirks.load_store_increments_i {
                    m.register_i = m.register_i.wrapping_add(count as u16);
                }
                m.advance();
            }
            Unknown(_) => {
                let diagnostic = m.diagnostic();
                warn!("{}", diagnostic);
                return Err(Chip8Error::UnknownOpcode(Box::new(diagnostic)));
            }
        }
        Ok(())
    }
}
