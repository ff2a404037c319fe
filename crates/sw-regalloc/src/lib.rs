//! Register legalization: turns a function's virtual registers into frame
//! slots and rewrites every instruction whose register operands do not fit
//! the encoding it is emitted with.
//!
//! The pass runs once per function after code generation:
//!
//! 1. locals, temporaries and materialized cache registers receive slots
//!    `0..n` in that order ([`Allocator`]);
//! 2. each instruction is checked against its candidate formats and, when
//!    no format fits, surrounded by moves through scratch slots
//!    ([`legalize`], [`range`]);
//! 3. parameters receive entry slots above everything else and a move per
//!    parameter is prepended ([`prologue`]).

pub mod assign;
pub mod error;
pub mod format;
pub mod legalize;
pub mod options;
pub mod pass;
pub mod prologue;
pub mod range;
pub mod verify;

pub use assign::Allocator;
pub use error::RegAllocError;
pub use format::{score, select_format};
pub use options::RegAllocOptions;
pub use pass::{
    legalize_stream, run_program, FrameLayout, FunctionPass, RegAllocPass, RegAllocReport,
    StreamStats,
};
pub use verify::verify_function;
