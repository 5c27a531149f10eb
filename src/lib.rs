//! CHIP-8 on a COSMAC VIP, in a terminal, with a live debugger beside the
//! screen.
//!
//! ## Design
//!
//! * authentic memory map to the 4K COSMAC VIP: stack, variables and display
//!   page all live in RAM where the original interpreter put them
//! * abstract display, input and sound behind traits so they can be swapped
//!   for dummies in tests; starting with TUI in-console
//! * CHIP-8 instructions run a fixed number per 60Hz frame then sleep, to
//!   match timings; so not quite authentic
//! * the debugger only ever *reads* the machine, through `MachineView`
//!
//! Model
//!
//! Environment
//!  |-- config, display, input, sound
//!  |-- stdout capture -> debug log
//!  |-- interpreter(memory)
//!  |    `-- instruction set
//!  `-- emulator main loop, once per frame
//!       |-- input.take_actions() -> pause/step/scroll/dump/help/reboot/quit
//!       |-- unless paused: interpreter.step() * cycles; tick timers
//!       |-- sound follows the tone timer
//!       |-- debugger update: take one captured line, move the window with PC
//!       `-- display.draw(screen, debugger panes), for whichever panes fit
//!            |-- disassembly window around PC
//!            |-- registers
//!            `-- log: 16 lines ending at the cursor
//!
//! Threads: the UI runs everything above on one thread. Two more only read
//! the stdout pipe and offer lines over a rendezvous channel, so none of the
//! debugger's state needs a lock.
pub mod config;
pub mod debug;
pub mod display;
pub mod emulator;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod sound;
