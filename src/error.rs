use std::io;
use thiserror::Error;

/// Everything the VM and its collaborators can report. None of these leave the
/// machine in a state it can't continue from.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("return with an empty call stack at {pc:#05x}")]
    StackUnderflow { pc: u16 },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("bad configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("sound device: {0}")]
    Sound(String),
}

pub type Result<T> = std::result::Result<T, VmError>;
