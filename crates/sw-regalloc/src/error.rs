use sw_bytecode::{BytecodeError, Opcode, Slot};
use thiserror::Error;

/// Fatal conditions of register legalization. Any of them aborts the
/// function being legalized; nothing is retried or downgraded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegAllocError {
    #[error("register pool exhausted: function needs more than {limit} slots")]
    PoolExhausted { limit: u32 },
    #[error("no scratch register available for {opcode}: need {needed} free slot(s) below {limit}")]
    ScratchExhausted {
        opcode: Opcode,
        needed: usize,
        limit: u32,
    },
    #[error(
        "register run of {opcode} is not contiguous at operand {position}: expected {expected}, found {found}"
    )]
    RangeDiscontinuous {
        opcode: Opcode,
        position: usize,
        expected: Slot,
        found: Slot,
    },
    #[error(transparent)]
    Malformed(#[from] BytecodeError),
    #[error("legalized output failed verification: {message}")]
    Verification { message: String },
}

impl RegAllocError {
    pub(crate) fn verification(message: impl Into<String>) -> Self {
        RegAllocError::Verification {
            message: message.into(),
        }
    }
}
