use sw_bytecode::{Inst, Operand, RegisterFile, Slot, VReg};

use crate::assign::Allocator;
use crate::error::RegAllocError;
use crate::legalize::{inserted_mov, Legalized};

/// Where a range instruction's run sits relative to its start-width limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPlacement {
    /// Contiguous and encodable as is.
    Legal,
    /// Contiguous, but the first slot does not fit the start field.
    NeedsAdjust { start: Slot, limit: u32 },
}

/// Exclusive bound on the run's first slot, from the width the first format
/// declares at the run's position.
pub fn run_limit(inst: &Inst) -> u32 {
    match inst.range {
        Some(range) => inst
            .formats
            .first()
            .and_then(|format| format.slot(range.first))
            .map_or(0, |field| field.limit()),
        None => 0,
    }
}

fn run_slots(inst: &Inst, regs: &RegisterFile) -> Vec<Slot> {
    inst.run()
        .iter()
        .filter_map(Operand::as_reg)
        .map(|reg| regs.expect_slot(reg))
        .collect()
}

/// Checks that the run occupies ascending consecutive slots. A gap is fatal
/// whether or not the run start fits.
pub fn check_contiguous(inst: &Inst, regs: &RegisterFile) -> Result<RunPlacement, RegAllocError> {
    let first = inst.range.map_or(0, |range| range.first);
    let slots = run_slots(inst, regs);
    let Some(&start) = slots.first() else {
        return Ok(RunPlacement::Legal);
    };

    for (offset, pair) in slots.windows(2).enumerate() {
        let expected = Slot(pair[0].0 + 1);
        if pair[1] != expected {
            return Err(RegAllocError::RangeDiscontinuous {
                opcode: inst.opcode,
                position: first + offset + 1,
                expected,
                found: pair[1],
            });
        }
    }

    let limit = run_limit(inst);
    if start.0 < limit {
        Ok(RunPlacement::Legal)
    } else {
        Ok(RunPlacement::NeedsAdjust { start, limit })
    }
}

/// Copies a contiguous run whose start is too high into a block of free slots
/// below `limit`, saving each block slot in a spill register around the
/// instruction.
pub fn adjust(
    allocator: &mut Allocator,
    regs: &mut RegisterFile,
    mut inst: Inst,
    limit: u32,
) -> Result<Legalized, RegAllocError> {
    let mut spills = Vec::new();
    let result = copy_run(allocator, regs, &mut inst, limit, &mut spills);

    for spill in spills.iter().rev() {
        allocator.release_spill(*spill);
    }
    allocator.clear_busy();
    let (head, tail) = result?;

    inst.format = Some(0);
    Ok(Legalized { head, inst, tail })
}

fn copy_run(
    allocator: &mut Allocator,
    regs: &mut RegisterFile,
    inst: &mut Inst,
    limit: u32,
    spills: &mut Vec<VReg>,
) -> Result<(Vec<Inst>, Vec<Inst>), RegAllocError> {
    for reg in inst.registers() {
        allocator.mark_busy(regs.expect_slot(reg));
    }

    let first = inst.range.map_or(0, |range| range.first);
    let count = inst.operands.len() - first;
    for _ in 0..count {
        spills.push(allocator.acquire_spill(regs)?);
    }

    let block = allocator
        .find_scratch_block(count, limit)
        .ok_or(RegAllocError::ScratchExhausted {
            opcode: inst.opcode,
            needed: count,
            limit,
        })?;

    let mut head = Vec::with_capacity(count * 2);
    let mut restores = Vec::with_capacity(count);
    for (offset, spill) in spills.iter().enumerate() {
        let scratch = allocator.reg_at(Slot(block.0 + offset as u32));
        let position = first + offset;
        let Some(original) = inst.operands[position].as_reg() else {
            continue;
        };
        head.push(inserted_mov(*spill, scratch, inst.span, regs));
        head.push(inserted_mov(scratch, original, inst.span, regs));
        restores.push(inserted_mov(scratch, *spill, inst.span, regs));
        inst.operands[position] = Operand::Reg(scratch);
    }
    restores.reverse();

    sw_core::trace!(
        "{}: run of {} moved to {}..{}",
        inst.opcode,
        count,
        block,
        Slot(block.0 + count as u32)
    );
    Ok((head, restores))
}
