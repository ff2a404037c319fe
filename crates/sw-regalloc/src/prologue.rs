use sw_bytecode::{Function, Inst};

use crate::assign::Allocator;
use crate::error::RegAllocError;
use crate::legalize::inserted_mov;

/// Gives every parameter an entry slot above the body's slots and returns
/// the moves that copy each entry slot into its parameter local, in declared
/// parameter order.
pub fn parameter_moves(
    allocator: &mut Allocator,
    function: &mut Function,
) -> Result<Vec<Inst>, RegAllocError> {
    let locals = function.parameter_locals().to_vec();
    let mut moves = Vec::with_capacity(locals.len());
    for local in locals {
        let entry = function.regs.create();
        allocator.assign(&mut function.regs, entry)?;
        moves.push(inserted_mov(local, entry, None, &function.regs));
    }
    Ok(moves)
}
