use std::io;
use thiserror::Error;

/// Faults raised by the CHIP-8 machine itself
#[derive(Debug, Error)]
pub enum VmError {
    #[error("program is {len} bytes but only {max} bytes of program memory exist")]
    ProgramTooLarge { len: usize, max: usize },

    #[error("unknown opcode #{opcode:04X} at #{addr:04X}")]
    UnknownOpcode { opcode: u16, addr: u16 },

    #[error("stack overflow calling #{target:04X} from #{addr:04X}")]
    StackOverflow { addr: u16, target: u16 },

    #[error("stack underflow returning from #{addr:04X}")]
    StackUnderflow { addr: u16 },

    #[error("program counter #{addr:04X} is outside memory")]
    PcOutOfRange { addr: u16 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Faults setting up the stdout capture for the debug log. Always fatal.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not create the capture pipe: {0}")]
    Pipe(#[source] io::Error),

    #[error("could not redirect output into the capture pipe: {0}")]
    Redirect(#[source] io::Error),

    #[error("could not start the capture thread: {0}")]
    Thread(#[source] io::Error),
}
