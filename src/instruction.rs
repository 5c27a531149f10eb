use std::fmt;

/// One decoded CHIP-8 instruction. `x`/`y` are V register indices, `nnn` a
/// 12-bit address, `kk` an immediate byte and `n` a nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Sys(u16),
    Cls,
    Ret,
    Jp(u16),
    Call(u16),
    SeImm(u8, u8),
    SneImm(u8, u8),
    SeReg(u8, u8),
    LdImm(u8, u8),
    AddImm(u8, u8),
    LdReg(u8, u8),
    Or(u8, u8),
    And(u8, u8),
    Xor(u8, u8),
    AddReg(u8, u8),
    Sub(u8, u8),
    Shr(u8, u8),
    Subn(u8, u8),
    Shl(u8, u8),
    SneReg(u8, u8),
    LdI(u16),
    JpV0(u16),
    Rnd(u8, u8),
    Drw(u8, u8, u8),
    Skp(u8),
    Sknp(u8),
    LdFromDt(u8),
    LdKey(u8),
    LdToDt(u8),
    LdToSt(u8),
    AddI(u8),
    LdFont(u8),
    LdBcd(u8),
    Store(u8),
    Load(u8),
}

impl Instruction {
    /// split an opcode into its fields and match it; `None` for words that
    /// aren't CHIP-8 instructions
    pub fn decode(opcode: u16) -> Option<Instruction> {
        use Instruction::*;

        let nnn = opcode & 0x0fff;
        let kk = opcode as u8;
        let n = (opcode & 0x000f) as u8;
        let x = ((opcode >> 8) & 0x0f) as u8;
        let y = ((opcode >> 4) & 0x0f) as u8;

        let instruction = match opcode >> 12 {
            0x0 => match opcode {
                0x00e0 => Cls,
                0x00ee => Ret,
                _ => Sys(nnn),
            },
            0x1 => Jp(nnn),
            0x2 => Call(nnn),
            0x3 => SeImm(x, kk),
            0x4 => SneImm(x, kk),
            0x5 if n == 0 => SeReg(x, y),
            0x6 => LdImm(x, kk),
            0x7 => AddImm(x, kk),
            0x8 => match n {
                0x0 => LdReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => Sub(x, y),
                0x6 => Shr(x, y),
                0x7 => Subn(x, y),
                0xe => Shl(x, y),
                _ => return None,
            },
            0x9 if n == 0 => SneReg(x, y),
            0xa => LdI(nnn),
            0xb => JpV0(nnn),
            0xc => Rnd(x, kk),
            0xd => Drw(x, y, n),
            0xe => match kk {
                0x9e => Skp(x),
                0xa1 => Sknp(x),
                _ => return None,
            },
            0xf => match kk {
                0x07 => LdFromDt(x),
                0x0a => LdKey(x),
                0x15 => LdToDt(x),
                0x18 => LdToSt(x),
                0x1e => AddI(x),
                0x29 => LdFont(x),
                0x33 => LdBcd(x),
                0x55 => Store(x),
                0x65 => Load(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }
}

/// mnemonics follow Cowgod's reference
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Sys(nnn) => write!(f, "SYS  #{:03X}", nnn),
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(nnn) => write!(f, "JP   #{:03X}", nnn),
            Call(nnn) => write!(f, "CALL #{:03X}", nnn),
            SeImm(x, kk) => write!(f, "SE   V{:X}, #{:02X}", x, kk),
            SneImm(x, kk) => write!(f, "SNE  V{:X}, #{:02X}", x, kk),
            SeReg(x, y) => write!(f, "SE   V{:X}, V{:X}", x, y),
            LdImm(x, kk) => write!(f, "LD   V{:X}, #{:02X}", x, kk),
            AddImm(x, kk) => write!(f, "ADD  V{:X}, #{:02X}", x, kk),
            LdReg(x, y) => write!(f, "LD   V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR   V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND  V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR  V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB  V{:X}, V{:X}", x, y),
            Shr(x, y) => write!(f, "SHR  V{:X}, V{:X}", x, y),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, y) => write!(f, "SHL  V{:X}, V{:X}", x, y),
            SneReg(x, y) => write!(f, "SNE  V{:X}, V{:X}", x, y),
            LdI(nnn) => write!(f, "LD   I, #{:03X}", nnn),
            JpV0(nnn) => write!(f, "JP   V0, #{:03X}", nnn),
            Rnd(x, kk) => write!(f, "RND  V{:X}, #{:02X}", x, kk),
            Drw(x, y, n) => write!(f, "DRW  V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP  V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdFromDt(x) => write!(f, "LD   V{:X}, DT", x),
            LdKey(x) => write!(f, "LD   V{:X}, K", x),
            LdToDt(x) => write!(f, "LD   DT, V{:X}", x),
            LdToSt(x) => write!(f, "LD   ST, V{:X}", x),
            AddI(x) => write!(f, "ADD  I, V{:X}", x),
            LdFont(x) => write!(f, "LD   F, V{:X}", x),
            LdBcd(x) => write!(f, "LD   B, V{:X}", x),
            Store(x) => write!(f, "LD   [I], V{:X}", x),
            Load(x) => write!(f, "LD   V{:X}, [I]", x),
        }
    }
}

/// one row of the disassembly pane: address, raw word and mnemonic
pub fn disassemble_word(addr: u16, opcode: u16) -> String {
    match Instruction::decode(opcode) {
        Some(instruction) => format!("{:04X} {:04X}  {}", addr, opcode, instruction),
        None => format!("{:04X} {:04X}  ??", addr, opcode),
    }
}
