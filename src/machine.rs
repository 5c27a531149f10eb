/// Read-only view of a CHIP-8 machine, as consumed by the debugger panes.
///
/// Nothing here may mutate the machine; the debugger is an observer.
pub trait MachineView {
    /// address of the next instruction to execute
    fn program_counter(&self) -> u16;

    /// address of the top of the call stack
    fn stack_pointer(&self) -> u16;

    /// the I register
    fn index(&self) -> u16;

    /// V0..VF
    fn registers(&self) -> &[u8; 16];

    fn delay_timer(&self) -> u8;

    fn sound_timer(&self) -> u8;

    /// the whole of RAM
    fn memory(&self) -> &[u8];

    /// human-readable form of the instruction word at `addr`; blank when
    /// there is no full word there
    fn disassemble(&self, addr: u16) -> String;
}
