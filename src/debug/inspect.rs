//! Plain formatting of machine state. Nothing here keeps state between
//! frames.

use crate::display::DrawSink;
use crate::machine::MachineView;
use std::io::{self, Write};

/// cells between the V register column and the pointer/timer column
const SECOND_COLUMN: u16 = 12;

const DUMP_ROWS: usize = 8;
const DUMP_ROW_BYTES: usize = 8;

/// Draw V0-VF down the left, and PC, SP, I and the timers beside them.
pub fn paint_registers(vm: &dyn MachineView, sink: &mut dyn DrawSink, x: u16, y: u16) {
    for (row, line) in register_lines(vm).iter().enumerate() {
        sink.draw_text(line, x, y + row as u16);
    }
    for (row, line) in pointer_lines(vm) {
        sink.draw_text(&line, x + SECOND_COLUMN, y + row);
    }
}

pub fn register_lines(vm: &dyn MachineView) -> Vec<String> {
    vm.registers()
        .iter()
        .enumerate()
        .map(|(i, v)| format!("  V{:X} - #{:02X}", i, v))
        .collect()
}

/// each line paired with the row it sits on; gaps group the pointers
/// apart from the timers
pub fn pointer_lines(vm: &dyn MachineView) -> Vec<(u16, String)> {
    vec![
        (0, format!("PC - #{:04X}", vm.program_counter())),
        (1, format!("SP - #{:04X}", vm.stack_pointer())),
        (3, format!("I  - #{:04X}", vm.index())),
        (5, format!("DT - #{:02X}", vm.delay_timer())),
        (6, format!("ST - #{:02X}", vm.sound_timer())),
    ]
}

/// Eight rows of eight bytes from I rounded down to a 16 byte boundary.
/// Rows that would run off the end of memory are left out.
pub fn memory_dump_lines(vm: &dyn MachineView) -> Vec<String> {
    let memory = vm.memory();
    let base = (vm.index() & 0xfff0) as usize;

    (0..DUMP_ROWS)
        .filter_map(|row| {
            let addr = base + row * DUMP_ROW_BYTES;
            let bytes = memory.get(addr..addr + DUMP_ROW_BYTES)?;
            let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            Some(format!(" {:04X} - {}", addr, hex.join(" ")))
        })
        .collect()
}

/// Print the dump near I; on stdout this ends up in the log pane.
pub fn dump_memory(vm: &dyn MachineView, out: &mut impl Write) -> Result<(), io::Error> {
    writeln!(out)?;
    writeln!(out, "Memory dump near I...")?;
    for line in memory_dump_lines(vm) {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

const HELP: &[&str] = &[
    "",
    "Virtual keys:",
    " 1-2-3-4",
    " Q-W-E-R",
    " A-S-D-F",
    " Z-X-C-V",
    "",
    "Emulation keys:",
    " F1       - Help",
    " PG U/D   - Scroll log a page",
    " UP/DOWN  - Scroll log a line",
    " HOME/END - Log start/end",
    " BACK     - Reboot",
    " SPACE    - Pause/debug",
    " F10      - Step",
    " F11      - Dump memory",
    " ESC      - Quit",
];

pub fn print_help(out: &mut impl Write) -> Result<(), io::Error> {
    for line in HELP {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DrawCall, RecordingSink};

    /// a machine made of bare fields
    struct FakeMachine {
        pc: u16,
        sp: u16,
        i: u16,
        v: [u8; 16],
        memory: Vec<u8>,
    }

    impl FakeMachine {
        fn new(size: usize) -> Self {
            FakeMachine {
                pc: 0x200,
                sp: 0xecf,
                i: 0,
                v: [0; 16],
                memory: (0..size).map(|b| b as u8).collect(),
            }
        }
    }

    impl MachineView for FakeMachine {
        fn program_counter(&self) -> u16 {
            self.pc
        }
        fn stack_pointer(&self) -> u16 {
            self.sp
        }
        fn index(&self) -> u16 {
            self.i
        }
        fn registers(&self) -> &[u8; 16] {
            &self.v
        }
        fn delay_timer(&self) -> u8 {
            0x3c
        }
        fn sound_timer(&self) -> u8 {
            0x01
        }
        fn memory(&self) -> &[u8] {
            &self.memory
        }
        fn disassemble(&self, addr: u16) -> String {
            format!("{:04X}", addr)
        }
    }

    #[test]
    fn test_register_lines() {
        let mut m = FakeMachine::new(0x1000);
        m.v[0xa] = 0x7f;
        let lines = register_lines(&m);
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "  V0 - #00");
        assert_eq!(lines[10], "  VA - #7F");
    }

    #[test]
    fn test_pointer_lines() {
        let m = FakeMachine::new(0x1000);
        let lines = pointer_lines(&m);
        assert_eq!(lines[0], (0, "PC - #0200".to_string()));
        assert_eq!(lines[1], (1, "SP - #0ECF".to_string()));
        assert_eq!(lines[2], (3, "I  - #0000".to_string()));
        assert_eq!(lines[3], (5, "DT - #3C".to_string()));
        assert_eq!(lines[4], (6, "ST - #01".to_string()));
    }

    #[test]
    fn test_paint_registers_positions() {
        let m = FakeMachine::new(0x1000);
        let mut sink = RecordingSink::new();
        paint_registers(&m, &mut sink, 1, 2);
        assert_eq!(sink.calls.len(), 21);
        assert_eq!(
            sink.calls[15],
            DrawCall::Text("  VF - #00".to_string(), 1, 17)
        );
        assert_eq!(
            sink.calls[18],
            DrawCall::Text("I  - #0000".to_string(), 13, 5)
        );
        assert!(sink.rects().is_empty());
    }

    #[test]
    fn test_dump_aligns_to_16_bytes() {
        let mut m = FakeMachine::new(0x1000);
        m.i = 0x305;
        let lines = memory_dump_lines(&m);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], " 0300 - 00 01 02 03 04 05 06 07");
        assert_eq!(lines[7], " 0338 - 38 39 3A 3B 3C 3D 3E 3F");
    }

    #[test]
    fn test_dump_skips_rows_past_memory() {
        let mut m = FakeMachine::new(0x1000);
        m.i = 0xfff;
        let lines = memory_dump_lines(&m);
        // base 0xff0 leaves room for two rows
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with(" 0FF8 - "));

        // a short memory cuts the last row off
        let mut m = FakeMachine::new(0x338 + 7);
        m.i = 0x300;
        assert_eq!(memory_dump_lines(&m).len(), 7);
    }

    #[test]
    fn test_dump_memory_writes_header() -> Result<(), io::Error> {
        let m = FakeMachine::new(0x1000);
        let mut out = Vec::new();
        dump_memory(&m, &mut out)?;
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Memory dump near I...");
        assert_eq!(lines.len(), 10);
        Ok(())
    }

    #[test]
    fn test_help_fits_the_log() -> Result<(), io::Error> {
        let mut out = Vec::new();
        print_help(&mut out)?;
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("F10      - Step"));
        assert!(text.lines().all(|l| l.len() < 45));
        Ok(())
    }
}
