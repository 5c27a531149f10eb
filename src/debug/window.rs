/// instructions shown in the disassembly pane
pub const WINDOW_ROWS: u16 = 19;
pub const INSTRUCTION_BYTES: u16 = 2;
/// bytes of memory the pane covers
pub const WINDOW_BYTES: u16 = WINDOW_ROWS * INSTRUCTION_BYTES;

/// room left above the program counter after re-centring
const LEAD_BYTES: u16 = INSTRUCTION_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// keep showing from `base`
    Stable { base: u16 },
    /// pick a new base around the program counter on the next frame
    NeedsRecenter,
}

/// Picks which slice of memory the disassembly pane shows.
///
/// The base only moves when the program counter gets to the top slot (or
/// above it), runs off the bottom, or sits on an odd offset from the base.
/// Straight-line code therefore walks down a still window instead of
/// dragging it along one instruction at a time.
#[derive(Debug)]
pub struct DisassemblyWindow {
    state: WindowState,
}

impl Default for DisassemblyWindow {
    fn default() -> Self {
        DisassemblyWindow {
            state: WindowState::NeedsRecenter,
        }
    }
}

impl DisassemblyWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// forget the current base, e.g. after a reboot
    pub fn reset(&mut self) {
        self.state = WindowState::NeedsRecenter;
    }

    /// Advance the state machine for this frame's program counter and
    /// return the base address to draw from.
    pub fn track(&mut self, pc: u16) -> u16 {
        if let WindowState::Stable { base } = self.state {
            if needs_recenter(base, pc) {
                self.state = WindowState::NeedsRecenter;
            }
        }
        match self.state {
            WindowState::Stable { base } => base,
            WindowState::NeedsRecenter => {
                let base = pc.wrapping_sub(LEAD_BYTES);
                self.state = WindowState::Stable { base };
                base
            }
        }
    }

    /// the base currently shown; before any frame is tracked, where the
    /// next `track(pc)` would put it
    pub fn base(&self, pc: u16) -> u16 {
        match self.state {
            WindowState::Stable { base } => base,
            WindowState::NeedsRecenter => pc.wrapping_sub(LEAD_BYTES),
        }
    }
}

/// Addresses are not clamped to memory; wrapping past 0xFFFF is left to the
/// machine's disassembler, which shows nothing for words it doesn't have.
fn needs_recenter(base: u16, pc: u16) -> bool {
    let offset = pc.wrapping_sub(base);
    offset <= LEAD_BYTES || offset >= WINDOW_BYTES || offset & 1 == 1
}

/// the address of each row of the pane, top to bottom
pub fn slots(base: u16) -> impl Iterator<Item = u16> {
    (0..WINDOW_ROWS).map(move |row| base.wrapping_add(row * INSTRUCTION_BYTES))
}
