//! # instruction
//!
//! Decoding of the 35 CHIP-8 instruction forms. The decoder is a pure
//! function from the 16-bit word to an [`Opcode`]; anything that isn't a
//! recognised form comes back as [`Opcode::Unknown`] rather than failing, so
//! the interpreter can report it with the machine state attached.
//!
//! Operand naming follows the usual CHIP-8 convention:
//!
//! * `nnn` - 12-bit address, nibbles 2..=4
//! * `kk`  - 8-bit immediate, nibbles 3..=4
//! * `x`   - register index in nibble 2
//! * `y`   - register index in nibble 3
//! * `n`   - 4-bit immediate in nibble 4
use crate::bits::{nibbles_to_address, nibbles_to_byte, word_to_nibbles};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 0nnn - machine code routine on the COSMAC; ignored. 0000 is Unknown
    Sys(u16),
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SeByte(u8, u8),
    /// 4xkk
    SneByte(u8, u8),
    /// 5xy0
    SeReg(u8, u8),
    /// 6xkk
    LdByte(u8, u8),
    /// 7xkk
    AddByte(u8, u8),
    /// 8xy0
    LdReg(u8, u8),
    /// 8xy1
    Or(u8, u8),
    /// 8xy2
    And(u8, u8),
    /// 8xy3
    Xor(u8, u8),
    /// 8xy4
    AddReg(u8, u8),
    /// 8xy5
    Sub(u8, u8),
    /// 8xy6; y only matters with the shift quirk
    Shr(u8, u8),
    /// 8xy7
    Subn(u8, u8),
    /// 8xyE; y only matters with the shift quirk
    Shl(u8, u8),
    /// 9xy0
    SneReg(u8, u8),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxkk
    Rnd(u8, u8),
    /// Dxyn
    Drw(u8, u8, u8),
    /// Ex9E
    Skp(u8),
    /// ExA1
    Sknp(u8),
    /// Fx07
    LdRegDt(u8),
    /// Fx0A
    LdKey(u8),
    /// Fx15
    LdDtReg(u8),
    /// Fx18
    LdSt(u8),
    /// Fx1E
    AddI(u8),
    /// Fx29
    LdF(u8),
    /// Fx33
    LdB(u8),
    /// Fx55
    LdDerefIReg(u8),
    /// Fx65
    LdRegDerefI(u8),
    /// anything else, with the raw word
    Unknown(u16),
}

impl Opcode {
    pub fn decode(word: u16) -> Opcode {
        use Opcode::*;

        let [n1, x, y, n] = word_to_nibbles(word);
        let nnn = nibbles_to_address(x, y, n);
        let kk = nibbles_to_byte(y, n);

        match (n1, x, y, n) {
            (0x0, 0x0, 0xe, 0x0) => Cls,
            (0x0, 0x0, 0xe, 0xe) => Ret,
            // all zeroes is blank memory, not a machine code call
            (0x0, 0x0, 0x0, 0x0) => Unknown(word),
            (0x0, _, _, _) => Sys(nnn),
            (0x1, _, _, _) => Jp(nnn),
            (0x2, _, _, _) => Call(nnn),
            (0x3, _, _, _) => SeByte(x, kk),
            (0x4, _, _, _) => SneByte(x, kk),
            (0x5, _, _, 0x0) => SeReg(x, y),
            (0x6, _, _, _) => LdByte(x, kk),
            (0x7, _, _, _) => AddByte(x, kk),
            (0x8, _, _, 0x0) => LdReg(x, y),
            (0x8, _, _, 0x1) => Or(x, y),
            (0x8, _, _, 0x2) => And(x, y),
            (0x8, _, _, 0x3) => Xor(x, y),
            (0x8, _, _, 0x4) => AddReg(x, y),
            (0x8, _, _, 0x5) => Sub(x, y),
            (0x8, _, _, 0x6) => Shr(x, y),
            (0x8, _, _, 0x7) => Subn(x, y),
            (0x8, _, _, 0xe) => Shl(x, y),
            (0x9, _, _, 0x0) => SneReg(x, y),
            (0xa, _, _, _) => LdI(nnn),
            (0xb, _, _, _) => JpV0(nnn),
            (0xc, _, _, _) => Rnd(x, kk),
            (0xd, _, _, _) => Drw(x, y, n),
            (0xe, _, 0x9, 0xe) => Skp(x),
            (0xe, _, 0xa, 0x1) => Sknp(x),
            (0xf, _, 0x0, 0x7) => LdRegDt(x),
            (0xf, _, 0x0, 0xa) => LdKey(x),
            (0xf, _, 0x1, 0x5) => LdDtReg(x),
            (0xf, _, 0x1, 0x8) => LdSt(x),
            (0xf, _, 0x1, 0xe) => AddI(x),
            (0xf, _, 0x2, 0x9) => LdF(x),
            (0xf, _, 0x3, 0x3) => LdB(x),
            (0xf, _, 0x5, 0x5) => LdDerefIReg(x),
            (0xf, _, 0x6, 0x5) => LdRegDerefI(x),
            _ => Unknown(word),
        }
    }
}

/// assembler-ish mnemonics, used when tracing execution
impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Opcode::*;

        match *self {
            Sys(nnn) => write!(f, "SYS {:#05x}", nnn),
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(nnn) => write!(f, "JP {:#05x}", nnn),
            Call(nnn) => write!(f, "CALL {:#05x}", nnn),
            SeByte(x, kk) => write!(f, "SE V{:X}, {:#04x}", x, kk),
            SneByte(x, kk) => write!(f, "SNE V{:X}, {:#04x}", x, kk),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte(x, kk) => write!(f, "LD V{:X}, {:#04x}", x, kk),
            AddByte(x, kk) => write!(f, "ADD V{:X}, {:#04x}", x, kk),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x, y) => write!(f, "SHR V{:X} {{, V{:X}}}", x, y),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, y) => write!(f, "SHL V{:X} {{, V{:X}}}", x, y),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(nnn) => write!(f, "LD I, {:#05x}", nnn),
            JpV0(nnn) => write!(f, "JP V0, {:#05x}", nnn),
            Rnd(x, kk) => write!(f, "RND V{:X}, {:#04x}", x, kk),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdRegDt(x) => write!(f, "LD V{:X}, DT", x),
            LdKey(x) => write!(f, "LD V{:X}, K", x),
            LdDtReg(x) => write!(f, "LD DT, V{:X}", x),
            LdSt(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdF(x) => write!(f, "LD F, V{:X}", x),
            LdB(x) => write!(f, "LD B, V{:X}", x),
            LdDerefIReg(x) => write!(f, "LD [I], V{:X}", x),
            LdRegDerefI(x) => write!(f, "LD V{:X}, [I]", x),
            Unknown(word) => write!(f, "??? {:#06x}", word),
        }
    }
}
