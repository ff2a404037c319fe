use serde::{Deserialize, Serialize};
use sw_core::span::Span;

use crate::isa::Opcode;
use crate::operand::{Format, Operand};
use crate::vreg::VReg;

/// Marks the trailing operands of a range instruction, starting at operand
/// `first`, as one contiguous register run. The run's start-width is the width
/// the instruction's first format declares at position `first`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeRun {
    pub first: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inst {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub formats: Vec<Format>,
    #[serde(default)]
    pub range: Option<RangeRun>,
    #[serde(default)]
    pub span: Option<Span>,
    /// Index into `formats` chosen by legalization.
    #[serde(default)]
    pub format: Option<usize>,
}

impl Inst {
    /// Builds an instruction with the opcode's formats and range marker from
    /// the ISA table.
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self {
            opcode,
            operands,
            formats: opcode.formats(),
            range: opcode.range_start().map(|first| RangeRun { first }),
            span: None,
            format: None,
        }
    }

    pub fn with_formats(opcode: Opcode, operands: Vec<Operand>, formats: Vec<Format>) -> Self {
        Self {
            opcode,
            operands,
            formats,
            range: None,
            span: None,
            format: None,
        }
    }

    /// `mov.dyn dst, src`
    pub fn mov(dst: VReg, src: VReg) -> Self {
        Self::new(Opcode::Mov, vec![Operand::Reg(dst), Operand::Reg(src)])
    }

    /// Range instruction `opcode count, run...` with the run starting at
    /// operand 1.
    pub fn range_call(opcode: Opcode, run: &[VReg]) -> Self {
        let mut operands = Vec::with_capacity(run.len() + 1);
        operands.push(Operand::Imm(run.len() as i64));
        operands.extend(run.iter().copied().map(Operand::Reg));
        Self::new(opcode, operands)
    }

    pub fn with_range(mut self, first: usize) -> Self {
        self.range = Some(RangeRun { first });
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn is_range(&self) -> bool {
        self.range.is_some()
    }

    pub fn registers(&self) -> impl Iterator<Item = VReg> + '_ {
        self.operands.iter().filter_map(Operand::as_reg)
    }

    /// Operands that form the contiguous run, empty for non-range instructions.
    pub fn run(&self) -> &[Operand] {
        match self.range {
            Some(range) => self.operands.get(range.first..).unwrap_or(&[]),
            None => &[],
        }
    }

    pub fn selected_format(&self) -> Option<&Format> {
        self.format.and_then(|index| self.formats.get(index))
    }

    /// Whether this is a `mov.dyn` between the two given registers.
    pub fn is_mov(&self, dst: VReg, src: VReg) -> bool {
        self.opcode == Opcode::Mov && self.operands == [Operand::Reg(dst), Operand::Reg(src)]
    }
}
