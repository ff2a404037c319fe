//! Instruction-stream data model shared by the code generator, the register
//! legalization pass and the emitter.

pub mod cache;
pub mod function;
pub mod inst;
pub mod isa;
pub mod operand;
pub mod pretty;
pub mod validate;
pub mod vreg;

pub use cache::{CacheKind, VRegCache};
pub use function::{Function, Program};
pub use inst::{Inst, RangeRun};
pub use isa::Opcode;
pub use operand::{Format, FormatSlot, LabelId, Operand, OperandRole};
pub use pretty::{format_function, format_inst};
pub use validate::{validate_function, BytecodeError};
pub use vreg::{RegisterFile, Slot, VReg, MAX_REGISTERS, MAX_WIDTH};
