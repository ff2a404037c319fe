use sw_bytecode::{Inst, Operand, RegisterFile, VReg};
use sw_core::span::Span;

use crate::assign::Allocator;
use crate::error::RegAllocError;
use crate::format::select_format;

/// An instruction together with the moves that must surround it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legalized {
    pub head: Vec<Inst>,
    pub inst: Inst,
    pub tail: Vec<Inst>,
}

impl Legalized {
    pub fn unchanged(inst: Inst) -> Self {
        Self {
            head: Vec::new(),
            inst,
            tail: Vec::new(),
        }
    }

    pub fn moves(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn into_insts(self) -> impl Iterator<Item = Inst> {
        self.head
            .into_iter()
            .chain(std::iter::once(self.inst))
            .chain(self.tail)
    }
}

/// `mov.dyn dst, src` in its narrowest encoding, tagged with `span`.
pub fn inserted_mov(dst: VReg, src: VReg, span: Option<Span>, regs: &RegisterFile) -> Inst {
    let mut mov = Inst::mov(dst, src);
    mov.span = span;
    mov.format = select_format(&mov, regs).map(|(index, _)| index);
    mov
}

/// Rewrites every operand of `inst` that overflows format `format_index`
/// onto a scratch slot below its width limit. The scratch slot's old value is
/// parked in a spill register for the duration of the instruction.
pub fn legalize_operands(
    allocator: &mut Allocator,
    regs: &mut RegisterFile,
    mut inst: Inst,
    format_index: usize,
) -> Result<Legalized, RegAllocError> {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut spills = Vec::new();

    let rewritten = rewrite_operands(
        allocator,
        regs,
        &mut inst,
        format_index,
        &mut head,
        &mut tail,
        &mut spills,
    );

    for spill in spills.into_iter().rev() {
        allocator.release_spill(spill);
    }
    allocator.clear_busy();
    rewritten?;

    inst.format = Some(format_index);
    Ok(Legalized { head, inst, tail })
}

fn rewrite_operands(
    allocator: &mut Allocator,
    regs: &mut RegisterFile,
    inst: &mut Inst,
    format_index: usize,
    head: &mut Vec<Inst>,
    tail: &mut Vec<Inst>,
    spills: &mut Vec<VReg>,
) -> Result<(), RegAllocError> {
    let format = inst.formats[format_index].clone();
    for reg in inst.registers() {
        allocator.mark_busy(regs.expect_slot(reg));
    }

    for (position, field) in format.slots.iter().enumerate() {
        let Some(original) = inst.operands.get(position).and_then(Operand::as_reg) else {
            continue;
        };
        if regs.expect_slot(original).fits(field.width) {
            continue;
        }

        let spill = allocator.acquire_spill(regs)?;
        spills.push(spill);
        let limit = field.limit();
        let scratch_slot = allocator
            .find_scratch(limit)
            .ok_or(RegAllocError::ScratchExhausted {
                opcode: inst.opcode,
                needed: 1,
                limit,
            })?;
        let scratch = allocator.reg_at(scratch_slot);

        head.push(inserted_mov(spill, scratch, inst.span, regs));
        if field.role.reads() {
            head.push(inserted_mov(scratch, original, inst.span, regs));
        }
        if field.role.writes() {
            tail.push(inserted_mov(original, scratch, inst.span, regs));
        }
        tail.push(inserted_mov(scratch, spill, inst.span, regs));

        sw_core::trace!(
            "{}: operand {} moved from {} to {}",
            inst.opcode,
            position,
            regs.expect_slot(original),
            scratch_slot
        );
        inst.operands[position] = Operand::Reg(scratch);
    }
    Ok(())
}
