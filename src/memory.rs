use crate::error::VmError;
use std::io;
use std::io::Read;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents memory map, ROM, RAM etc.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16, len: usize) -> Result<(), io::Error> {
        let bytes = self.get_rw_slice(addr, len);
        let mut d: &[u8] = data;
        d.read_exact(bytes)?;
        Ok(())
    }

    /// get a big-endian two-byte word (instructions, stack)
    fn get_word(&self, addr: u16) -> u16 {
        let word = self.get_ro_slice(addr, 2);
        ((word[0] as u16) << 8) | (word[1] as u16)
    }

    /// put a big-endian two-byte word
    fn set_word(&mut self, addr: u16, value: u16) {
        let word = self.get_rw_slice(addr, 2);
        word[0] = (value >> 8) as u8;
        word[1] = value as u8;
    }

    /// get a r/w slice of the underlying memory (heap)
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory (heap)
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];
}

/// Defines the CHIP-8 standard memory map, 4K configuration:
///   0x0000-0x01ff  interpreter (font at 0x050)
///   0x0200-0x0e9f  program
///   0x0ea0-0x0ecf  stack
///   0x0ed0-0x0eef  work area
///   0x0ef0-0x0eff  chip-8 variables
///   0x0f00-0x0fff  display
///
/// chip-8 programs *should* not access these directly
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub stack_base: u16,
    pub stack_addr: u16,
    pub work_addr: u16,
    pub var_addr: u16,
    pub display_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = addr as usize;
        &mut self.bytes[a..(a + len)]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = addr as usize;
        &self.bytes[a..(a + len)]
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: u16 = 4096;

/// offsets from the top of RAM
const CHIP8_STACK_BASE_OFFSET: u16 = 0x0160;
const CHIP8_STACK_OFFSET: u16 = 0x0131; // not! 0x0160; stack grows downward into real memory
const CHIP8_WORK_OFFSET: u16 = 0x0130;
const CHIP8_VAR_OFFSET: u16 = 0x0110;
const CHIP8_DISPLAY_OFFSET: u16 = 0x100;

/// bytes in the display page; 64x32 pixels at one bit each
pub const CHIP8_DISPLAY_SIZE_BYTES: usize = 0x100;

/// where the program is loaded
const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

impl Chip8MemoryMap {
    /// initialises CHIP-8 with contemporary memory contents
    pub fn new() -> Result<Self, io::Error> {
        let mut mm = Chip8MemoryMap {
            bytes: Box::new([0u8; CHIP8_RAM_SIZE_BYTES as usize]),
            program_addr: CHIP8_PROGRAM_ADDR,
            stack_base: CHIP8_RAM_SIZE_BYTES - CHIP8_STACK_BASE_OFFSET,
            stack_addr: CHIP8_RAM_SIZE_BYTES - CHIP8_STACK_OFFSET,
            work_addr: CHIP8_RAM_SIZE_BYTES - CHIP8_WORK_OFFSET,
            var_addr: CHIP8_RAM_SIZE_BYTES - CHIP8_VAR_OFFSET,
            display_addr: CHIP8_RAM_SIZE_BYTES - CHIP8_DISPLAY_OFFSET,
        };
        mm.write(
            &CHIP8_CONTEMPORARY_FONT,
            CHIP8_CONTEMPORARY_FONT_ADDR,
            CHIP8_CONTEMPORARY_FONT.len(),
        )?;
        Ok(mm)
    }

    /// how many bytes a program may occupy
    pub fn program_capacity(&self) -> usize {
        (self.stack_base - self.program_addr) as usize
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), VmError> {
        if program.len() > self.program_capacity() {
            return Err(VmError::ProgramTooLarge {
                len: program.len(),
                max: self.program_capacity(),
            });
        }
        self.write(program, self.program_addr, program.len())?;
        Ok(())
    }

    /// address of the hex digit sprite for the low nibble of `digit`
    pub fn font_addr(&self, digit: u8) -> u16 {
        CHIP8_CONTEMPORARY_FONT_ADDR + (digit & 0x0f) as u16 * CHIP8_FONT_HEIGHT
    }

    /// the display page, as handed to a Display
    pub fn display(&self) -> &[u8] {
        self.get_ro_slice(self.display_addr, CHIP8_DISPLAY_SIZE_BYTES)
    }

    pub fn display_mut(&mut self) -> &mut [u8] {
        let addr = self.display_addr;
        self.get_rw_slice(addr, CHIP8_DISPLAY_SIZE_BYTES)
    }

    /// all of RAM
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// whether a whole two-byte word is readable at `addr`
    pub fn has_word(&self, addr: u16) -> bool {
        (addr as usize) + 1 < self.bytes.len()
    }

    /// read one byte, wrapping around the top of memory like the VIP's 12-bit
    /// address bus
    pub fn byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize % self.bytes.len()]
    }

    pub fn set_byte(&mut self, addr: u16, value: u8) {
        let len = self.bytes.len();
        self.bytes[addr as usize % len] = value;
    }
}

const CHIP8_FONT_HEIGHT: u16 = 5;
const CHIP8_CONTEMPORARY_FONT_ADDR: u16 = 0x050;
const CHIP8_CONTEMPORARY_FONT: [u8; 80] = [
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
