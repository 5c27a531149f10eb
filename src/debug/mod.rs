//! The live debugger drawn alongside the CHIP-8 screen: disassembly around
//! the program counter, registers, and a scrollable log of everything the
//! process printed.
//!
//! All of the state here belongs to the UI thread. The only thing shared with
//! another thread is the capture channel, which is read without blocking.

pub mod capture;
pub mod inspect;
pub mod pager;
pub mod window;

use crate::display::{DrawSink, Overlay, Pane};
use crate::machine::MachineView;
use capture::LineSource;
use pager::LogPager;
use tui::style::Color;
use window::DisassemblyWindow;

/// highlight behind the current instruction while free-running
pub const RUNNING_HIGHLIGHT: Color = Color::Rgb(57, 102, 176);
/// and while paused or stepping
pub const PAUSED_HIGHLIGHT: Color = Color::Rgb(176, 32, 57);

/// cells covered by the current instruction highlight
const HIGHLIGHT_WIDTH: u16 = 26;

/// Everything the debugger remembers from one frame to the next.
#[derive(Debug, Default)]
pub struct DebugSession {
    paused: bool,
    pager: LogPager,
    window: DisassemblyWindow,
}

impl DebugSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn pager(&self) -> &LogPager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut LogPager {
        &mut self.pager
    }

    pub fn window(&self) -> &DisassemblyWindow {
        &self.window
    }

    /// pull at most one captured line into the log
    pub fn drain(&mut self, source: &impl LineSource) {
        self.pager.drain_pending(source);
    }

    /// Once per frame, whether or not any pane is on screen: take a captured
    /// line and move the disassembly window along with the program counter.
    pub fn update(&mut self, vm: &dyn MachineView, source: &impl LineSource) {
        self.drain(source);
        self.window.track(vm.program_counter());
    }

    /// The machine restarted: re-centre the disassembly and run again. The
    /// log carries on, since it belongs to the process, not the machine.
    pub fn reboot(&mut self) {
        self.window.reset();
        self.paused = false;
    }

    /// nineteen instructions, with the one about to execute highlighted
    pub fn paint_disassembly(&self, vm: &dyn MachineView, sink: &mut dyn DrawSink) {
        let pc = vm.program_counter();
        let base = self.window.base(pc);
        let highlight = if self.paused {
            PAUSED_HIGHLIGHT
        } else {
            RUNNING_HIGHLIGHT
        };

        for (row, addr) in window::slots(base).enumerate() {
            let y = row as u16;
            if addr == pc {
                sink.fill_rect(0, y, HIGHLIGHT_WIDTH, 1, highlight);
            }
            sink.draw_text(&vm.disassemble(addr), 0, y);
        }
    }

    pub fn paint_registers(&self, vm: &dyn MachineView, sink: &mut dyn DrawSink) {
        inspect::paint_registers(vm, sink, 0, 0);
    }

    pub fn paint_log(&self, sink: &mut dyn DrawSink) {
        for (row, line) in self.pager.visible_window().iter().enumerate() {
            sink.draw_text(line, 0, row as u16);
        }
    }

    /// borrow the session and machine as an Overlay for one frame
    pub fn frame<'a>(&'a self, vm: &'a dyn MachineView) -> FrameOverlay<'a> {
        FrameOverlay { session: self, vm }
    }
}

/// one frame's worth of debugger painting
pub struct FrameOverlay<'a> {
    session: &'a DebugSession,
    vm: &'a dyn MachineView,
}

impl Overlay for FrameOverlay<'_> {
    fn paint(&mut self, pane: Pane, sink: &mut dyn DrawSink) {
        match pane {
            Pane::Disassembly => self.session.paint_disassembly(self.vm, sink),
            Pane::Registers => self.session.paint_registers(self.vm, sink),
            Pane::Log => self.session.paint_log(sink),
        }
    }
}
