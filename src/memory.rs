use crate::bits::bytes_to_word;
use crate::error::Chip8Error;
use log::info;
use std::io::{self, Read};

// NB. addresses are u16 as per the chip-8 and wrap at the top of RAM;
//     lengths are usize to stop endless casting

/// how much RAM we have
pub const MEMORY_SIZE: usize = 4096;

/// where the program is loaded; everything below is reserved
pub const PROGRAM_ADDR: u16 = 0x0200;

/// the most program we can fit between PROGRAM_ADDR and the top of RAM
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_ADDR as usize;

/// where the hex font lives, and how tall each glyph is
pub const FONT_ADDR: u16 = 0x0000;
pub const FONT_GLYPH_BYTES: u16 = 5;

const ADDR_MASK: u16 = (MEMORY_SIZE - 1) as u16;

/// Represents the addressable memory of the machine
pub trait MemoryMap {
    /// read one byte; addresses past the top of RAM wrap to the bottom
    fn get_byte(&self, addr: u16) -> u8;

    /// write one byte; addresses wrap as for get_byte
    fn set_byte(&mut self, addr: u16, value: u8);

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> u16 {
        bytes_to_word(self.get_byte(addr), self.get_byte(addr.wrapping_add(1)))
    }

    /// fill buf from consecutive addresses starting at addr
    fn read_into(&self, addr: u16, buf: &mut [u8]) {
        for (offset, b) in buf.iter_mut().enumerate() {
            *b = self.get_byte(addr.wrapping_add(offset as u16));
        }
    }

    /// write a chunk of bytes into consecutive addresses starting at addr
    fn write(&mut self, addr: u16, data: &[u8]) {
        for (offset, b) in data.iter().enumerate() {
            self.set_byte(addr.wrapping_add(offset as u16), *b);
        }
    }

    /// get a r/o slice of the underlying memory; None if it runs off the end
    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]>;
}

/// Defines the memory map the interpreter core expects
///
///   0x0000-0x004f  font (16 glyphs, 5 bytes each)
///   0x0050-0x01ff  reserved
///   0x0200-0x0fff  program
///
/// the stack, registers and display live outside of addressable memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8MemoryMap {
    bytes: Box<[u8; MEMORY_SIZE]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    fn set_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = value;
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]> {
        let a = addr as usize;
        self.bytes.get(a..a.checked_add(len)?)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// all-zero memory; the font is loaded separately
    pub fn new() -> Self {
        Chip8MemoryMap {
            bytes: Box::new([0u8; MEMORY_SIZE]),
        }
    }

    /// zero everything in place
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// copy the hex font into the bottom of memory
    pub fn load_font(&mut self) {
        self.write(FONT_ADDR, &CHIP8_FONT);
    }

    /// load a CHIP-8 program at 0x200; nothing is written if it doesn't fit
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge(rom.len()));
        }
        let start = PROGRAM_ADDR as usize;
        self.bytes[start..start + rom.len()].copy_from_slice(rom);
        info!("loaded {} byte program at {:#05x}", rom.len(), PROGRAM_ADDR);
        Ok(())
    }

    /// read a whole program from somewhere and load it at 0x200; stops
    /// reading one byte past the limit, so an endless reader is still rejected
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut buf = Vec::with_capacity(MAX_ROM_SIZE + 1);
        reader.take(MAX_ROM_SIZE as u64 + 1).read_to_end(&mut buf)?;
        if buf.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge(buf.len()));
        }
        self.load_program(&buf)
    }
}

/// address of the glyph for the low nibble of digit
pub fn font_glyph_addr(digit: u8) -> u16 {
    FONT_ADDR + u16::from(digit & 0x0f) * FONT_GLYPH_BYTES
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        assert!(m.bytes.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        dst.write(8, &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            dst.get_ro_slice(0, 16).unwrap(),
            &[0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_write_wraps_at_top_of_ram() {
        let mut m = Chip8MemoryMap::new();
        m.write(0x0ffe, &[1, 2, 3, 4]);
        assert_eq!(m.get_ro_slice(0x0ffe, 2).unwrap(), &[1, 2]);
        assert_eq!(m.get_ro_slice(0, 2).unwrap(), &[3, 4]);
        assert_eq!(m.get_byte(0x1000), 3);
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(0, &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(m.get_word(0x4), 0x0405);
    }

    #[test]
    fn test_read_word_across_top_of_ram() {
        let mut m = Chip8MemoryMap::new();
        m.set_byte(0x0fff, 0xab);
        m.set_byte(0x0000, 0xcd);
        assert_eq!(m.get_word(0x0fff), 0xabcd);
    }

    #[test]
    fn test_read_into() {
        let mut m = Chip8MemoryMap::new();
        m.write(0x300, &[9, 8, 7]);
        let mut buf = [0; 3];
        m.read_into(0x300, &mut buf);
        assert_eq!(buf, [9, 8, 7]);
    }

    #[test]
    fn test_ro_slice_past_top_of_ram() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(4089, 8), None);
        assert_eq!(m.get_ro_slice(4088, 8).map(<[u8]>::len), Some(8));
        assert_eq!(m.get_ro_slice(0xffff, usize::MAX), None);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2).unwrap(), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_load_from_reader() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x12, 0x00];
        dst.load_program_from(&mut prog)?;
        assert_eq!(dst.get_word(PROGRAM_ADDR), 0x1200);
        Ok(())
    }

    #[test]
    fn test_program_load_max_size() -> Result<(), Chip8Error> {
        let rom: Vec<u8> = (0..MAX_ROM_SIZE).map(|n| (n % 251) as u8 + 1).collect();
        let mut m = Chip8MemoryMap::new();
        m.load_program(&rom)?;
        assert_eq!(m.get_byte(512), rom[0]);
        assert_eq!(m.get_byte(4095), rom[3583]);
        Ok(())
    }

    #[test]
    fn test_program_too_large_rejected_wholesale() {
        let mut m = Chip8MemoryMap::new();
        let rom = vec![0xaa; MAX_ROM_SIZE + 1];
        match m.load_program(&rom) {
            Err(Chip8Error::RomTooLarge(3585)) => {}
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
        assert_eq!(m, Chip8MemoryMap::new());
    }

    /// endless supply of one byte, counting how many were handed out
    struct Endless {
        byte: u8,
        handed_out: usize,
    }

    impl io::Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf.fill(self.byte);
            self.handed_out += buf.len();
            Ok(buf.len())
        }
    }

    #[test]
    fn test_program_from_endless_reader_rejected() {
        let mut m = Chip8MemoryMap::new();
        let mut reader = Endless {
            byte: 0x12,
            handed_out: 0,
        };
        match m.load_program_from(&mut reader) {
            Err(Chip8Error::RomTooLarge(n)) => assert_eq!(n, MAX_ROM_SIZE + 1),
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
        assert!(reader.handed_out <= MAX_ROM_SIZE + 1);
        assert_eq!(m, Chip8MemoryMap::new());
    }

    #[test]
    fn test_program_from_reader_max_size() -> Result<(), Chip8Error> {
        let rom = vec![0x34; MAX_ROM_SIZE];
        let mut m = Chip8MemoryMap::new();
        m.load_program_from(&mut rom.as_slice())?;
        assert_eq!(m.get_byte(0x0fff), 0x34);
        Ok(())
    }

    #[test]
    fn test_font_layout() {
        let mut m = Chip8MemoryMap::new();
        m.load_font();
        assert_eq!(m.get_ro_slice(0, 80).unwrap(), &CHIP8_FONT[..]);
        assert_eq!(font_glyph_addr(0x0), 0);
        assert_eq!(font_glyph_addr(0xa), 50);
        assert_eq!(font_glyph_addr(0x1f), 75);
        assert_eq!(m.get_ro_slice(font_glyph_addr(0xb), 5).unwrap(), &[0xE0, 0x90, 0xE0, 0x90, 0xE0]);
    }

    #[test]
    fn test_clear() {
        let mut m = Chip8MemoryMap::new();
        m.load_font();
        m.clear();
        assert_eq!(m, Chip8MemoryMap::new());
    }
}
