//! # bits
//!
//! CHIP-8 instructions are two bytes, read high byte first, and almost every
//! operand is some run of the four nibbles in that word. Everything here is
//! plain unsigned masking and shifting; nothing sign-extends.

/// split a byte into (top, bottom) nibbles
pub fn byte_to_nibbles(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0f)
}

/// pack two nibbles into a byte; bits above the low nibble of each are dropped
pub fn nibbles_to_byte(top: u8, bottom: u8) -> u8 {
    ((top & 0x0f) << 4) | (bottom & 0x0f)
}

/// pack three nibbles into a 12-bit address, most significant first
pub fn nibbles_to_address(n1: u8, n2: u8, n3: u8) -> u16 {
    (u16::from(n1 & 0x0f) << 8) | (u16::from(n2 & 0x0f) << 4) | u16::from(n3 & 0x0f)
}

/// join two bytes into a big-endian instruction word
pub fn bytes_to_word(high: u8, low: u8) -> u16 {
    (u16::from(high) << 8) | u16::from(low)
}

/// split an instruction word into its four nibbles, most significant first
pub fn word_to_nibbles(word: u16) -> [u8; 4] {
    let [high, low] = word.to_be_bytes();
    let (n1, n2) = byte_to_nibbles(high);
    let (n3, n4) = byte_to_nibbles(low);
    [n1, n2, n3, n4]
}
