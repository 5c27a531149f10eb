/// # interpreter
///
/// (from: https://laurencescotford.com/chip-8-on-the-cosmac-vip-initialisation/)
/// RCA1802 has 16 16bit registers, each of which can be a program counter.
/// The ones the CHIP-8 interpreter gives meaning to are kept here:
///  2. stack pointer                            -- 0xecf; grows down into the stack area
///  5. chip-8 program counter                   -- 0x200
///  8.0 (low bits) tone timer
///  8.1 (high bits) general timer
///  9. random number
///  A. I pointer
///  B. display page pointer                     -- 0xf00; last page of RAM
/// VX/VY live in the variables page on the real thing; here they are a plain
/// array, which the debugger reads through `MachineView`.
use crate::error::VmError;
use crate::instruction::{disassemble_word, Instruction};
use crate::machine::MachineView;
use crate::memory::{self, MemoryMap};
use std::io;
use tracing::debug;

const SCREEN_WIDTH: usize = 64;
const SCREEN_HEIGHT: usize = 32;

/// any non-zero seed will do for the xorshift
const RANDOM_SEED: u16 = 0xace1;

pub struct Chip8Interpreter {
    memory: memory::Chip8MemoryMap,
    program: Vec<u8>,
    v: [u8; 16],
    stack_pointer: u16,
    program_counter: u16,
    tone_timer: u8,
    general_timer: u8,
    random: u16,
    i: u16,
}

impl Chip8Interpreter {
    pub fn new() -> Result<Chip8Interpreter, io::Error> {
        let m = memory::Chip8MemoryMap::new()?;
        let mut i = Chip8Interpreter {
            memory: m,
            program: Vec::new(),
            v: [0; 16],
            stack_pointer: 0x0000,
            program_counter: 0x0000,
            tone_timer: 0x00,
            general_timer: 0x00,
            random: RANDOM_SEED,
            i: 0x0000,
        };
        i.stack_pointer = i.memory.stack_addr;
        i.program_counter = i.memory.program_addr;
        Ok(i)
    }

    /// load a chip8 program; it is kept so a reboot can load it again
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), VmError> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.memory.load_program(&program)?;
        debug!("loaded {} byte program", program.len());
        self.program = program;
        Ok(())
    }

    /// back to power-on state, with the last loaded program in memory
    pub fn reboot(&mut self) -> Result<(), VmError> {
        let program = std::mem::take(&mut self.program);
        *self = Chip8Interpreter::new()?;
        self.memory.load_program(&program)?;
        self.program = program;
        Ok(())
    }

    /// the display page, ready for a Display to draw
    pub fn screen(&self) -> &[u8] {
        self.memory.display()
    }

    /// 60Hz timer interrupt
    pub fn tick_timers(&mut self) {
        self.general_timer = self.general_timer.saturating_sub(1);
        self.tone_timer = self.tone_timer.saturating_sub(1);
    }

    /// the beeper sounds whenever the tone timer is running
    pub fn is_beeping(&self) -> bool {
        self.tone_timer > 0
    }

    /// fetch, decode and execute one instruction. `keys` are the COSMAC
    /// keypad keys currently held. On error the program counter is left on
    /// the offending instruction.
    pub fn step(&mut self, keys: &[u8]) -> Result<(), VmError> {
        let addr = self.program_counter;
        if !self.memory.has_word(addr) {
            return Err(VmError::PcOutOfRange { addr });
        }
        let opcode = self.memory.get_word(addr);
        let instruction =
            Instruction::decode(opcode).ok_or(VmError::UnknownOpcode { opcode, addr })?;
        self.program_counter = addr.wrapping_add(2);
        if let Err(e) = self.execute(instruction, keys) {
            self.program_counter = addr;
            return Err(e);
        }
        Ok(())
    }

    fn execute(&mut self, instruction: Instruction, keys: &[u8]) -> Result<(), VmError> {
        use Instruction::*;

        match instruction {
            // machine code routines aren't emulated
            Sys(_) => {}
            Cls => self.memory.display_mut().fill(0),
            Ret => self.program_counter = self.pop()?,
            Jp(nnn) => self.program_counter = nnn,
            Call(nnn) => {
                self.push(self.program_counter, nnn)?;
                self.program_counter = nnn;
            }
            SeImm(x, kk) => self.skip_if(self.v[x as usize] == kk),
            SneImm(x, kk) => self.skip_if(self.v[x as usize] != kk),
            SeReg(x, y) => self.skip_if(self.v[x as usize] == self.v[y as usize]),
            LdImm(x, kk) => self.v[x as usize] = kk,
            AddImm(x, kk) => self.v[x as usize] = self.v[x as usize].wrapping_add(kk),
            LdReg(x, y) => self.v[x as usize] = self.v[y as usize],
            // the VIP's logic ops clobber VF
            Or(x, y) => self.logic(x, y, |a, b| a | b),
            And(x, y) => self.logic(x, y, |a, b| a & b),
            Xor(x, y) => self.logic(x, y, |a, b| a ^ b),
            AddReg(x, y) => {
                let (sum, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
                self.set_with_flag(x, sum, carry as u8);
            }
            Sub(x, y) => {
                let (diff, borrow) = self.v[x as usize].overflowing_sub(self.v[y as usize]);
                self.set_with_flag(x, diff, !borrow as u8);
            }
            Subn(x, y) => {
                let (diff, borrow) = self.v[y as usize].overflowing_sub(self.v[x as usize]);
                self.set_with_flag(x, diff, !borrow as u8);
            }
            Shr(x, y) => {
                let value = self.v[y as usize];
                self.set_with_flag(x, value >> 1, value & 0x01);
            }
            Shl(x, y) => {
                let value = self.v[y as usize];
                self.set_with_flag(x, value << 1, value >> 7);
            }
            SneReg(x, y) => self.skip_if(self.v[x as usize] != self.v[y as usize]),
            LdI(nnn) => self.i = nnn,
            JpV0(nnn) => self.program_counter = nnn.wrapping_add(self.v[0] as u16),
            Rnd(x, kk) => self.v[x as usize] = self.next_random() & kk,
            Drw(x, y, n) => self.draw_sprite(x, y, n),
            Skp(x) => self.skip_if(keys.contains(&(self.v[x as usize] & 0x0f))),
            Sknp(x) => self.skip_if(!keys.contains(&(self.v[x as usize] & 0x0f))),
            LdFromDt(x) => self.v[x as usize] = self.general_timer,
            LdKey(x) => match keys.first() {
                Some(&key) => self.v[x as usize] = key,
                // spin on this instruction until something is pressed
                None => self.program_counter = self.program_counter.wrapping_sub(2),
            },
            LdToDt(x) => self.general_timer = self.v[x as usize],
            LdToSt(x) => self.tone_timer = self.v[x as usize],
            AddI(x) => self.i = self.i.wrapping_add(self.v[x as usize] as u16),
            LdFont(x) => self.i = self.memory.font_addr(self.v[x as usize]),
            LdBcd(x) => {
                let value = self.v[x as usize];
                self.memory.set_byte(self.i, value / 100);
                self.memory.set_byte(self.i.wrapping_add(1), value / 10 % 10);
                self.memory.set_byte(self.i.wrapping_add(2), value % 10);
            }
            Store(x) => {
                for r in 0..=x {
                    self.memory
                        .set_byte(self.i.wrapping_add(r as u16), self.v[r as usize]);
                }
                self.i = self.i.wrapping_add(x as u16 + 1);
            }
            Load(x) => {
                for r in 0..=x {
                    self.v[r as usize] = self.memory.byte(self.i.wrapping_add(r as u16));
                }
                self.i = self.i.wrapping_add(x as u16 + 1);
            }
        }
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    fn logic(&mut self, x: u8, y: u8, op: impl Fn(u8, u8) -> u8) {
        let result = op(self.v[x as usize], self.v[y as usize]);
        self.set_with_flag(x, result, 0);
    }

    /// VF is written last, so it wins when it is also the destination
    fn set_with_flag(&mut self, x: u8, value: u8, flag: u8) {
        self.v[x as usize] = value;
        self.v[0xf] = flag;
    }

    /// return addresses are stored big-endian, two bytes per entry, from
    /// the top of the stack area downward
    fn push(&mut self, value: u16, target: u16) -> Result<(), VmError> {
        if self.stack_pointer <= self.memory.stack_base {
            return Err(VmError::StackOverflow {
                addr: self.program_counter.wrapping_sub(2),
                target,
            });
        }
        self.memory.set_word(self.stack_pointer - 1, value);
        self.stack_pointer -= 2;
        Ok(())
    }

    fn pop(&mut self) -> Result<u16, VmError> {
        if self.stack_pointer >= self.memory.stack_addr {
            return Err(VmError::StackUnderflow {
                addr: self.program_counter.wrapping_sub(2),
            });
        }
        self.stack_pointer += 2;
        Ok(self.memory.get_word(self.stack_pointer - 1))
    }

    /// XOR an n-row sprite from I onto the display page; sprites wrap their
    /// start position but clip at the right and bottom edges
    fn draw_sprite(&mut self, x: u8, y: u8, n: u8) {
        let left = self.v[x as usize] as usize % SCREEN_WIDTH;
        let top = self.v[y as usize] as usize % SCREEN_HEIGHT;
        let rows: Vec<u8> = (0..n as u16)
            .map(|row| self.memory.byte(self.i.wrapping_add(row)))
            .collect();

        let display = self.memory.display_mut();
        let mut collision = false;
        for (row, sprite) in rows.iter().enumerate() {
            let py = top + row;
            if py >= SCREEN_HEIGHT {
                break;
            }
            for bit in 0..8 {
                let px = left + bit;
                if px >= SCREEN_WIDTH {
                    break;
                }
                if sprite & (0x80 >> bit) == 0 {
                    continue;
                }
                let offset = py * SCREEN_WIDTH + px;
                let mask = 0x80 >> (offset % 8);
                collision |= display[offset / 8] & mask != 0;
                display[offset / 8] ^= mask;
            }
        }
        self.v[0xf] = collision as u8;
    }

    /// xorshift in the spare random register
    fn next_random(&mut self) -> u8 {
        let mut r = self.random;
        r ^= r << 7;
        r ^= r >> 9;
        r ^= r << 8;
        self.random = r;
        (r >> 8) as u8 ^ r as u8
    }
}

impl MachineView for Chip8Interpreter {
    fn program_counter(&self) -> u16 {
        self.program_counter
    }

    fn stack_pointer(&self) -> u16 {
        self.stack_pointer
    }

    fn index(&self) -> u16 {
        self.i
    }

    fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    fn delay_timer(&self) -> u8 {
        self.general_timer
    }

    fn sound_timer(&self) -> u8 {
        self.tone_timer
    }

    fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    fn disassemble(&self, addr: u16) -> String {
        if !self.memory.has_word(addr) {
            return String::new();
        }
        disassemble_word(addr, self.memory.get_word(addr))
    }
}
