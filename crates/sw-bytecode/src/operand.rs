use serde::{Deserialize, Serialize};

use crate::vreg::{limit_for_width, VReg};

pub type LabelId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Reg(VReg),
    Imm(i64),
    Label(LabelId),
}

impl Operand {
    pub fn as_reg(&self) -> Option<VReg> {
        match self {
            Operand::Reg(reg) => Some(*reg),
            Operand::Imm(_) | Operand::Label(_) => None,
        }
    }
}

impl From<VReg> for Operand {
    fn from(reg: VReg) -> Self {
        Operand::Reg(reg)
    }
}

/// How an instruction uses the operand in a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandRole {
    Src,
    Dst,
    SrcDst,
    /// Immediates, labels, and registers that are reserved rather than read
    /// or written as data.
    NonData,
}

impl OperandRole {
    pub fn reads(self) -> bool {
        matches!(self, OperandRole::Src | OperandRole::SrcDst)
    }

    pub fn writes(self) -> bool {
        matches!(self, OperandRole::Dst | OperandRole::SrcDst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatSlot {
    pub role: OperandRole,
    pub width: u8,
}

impl FormatSlot {
    pub fn new(role: OperandRole, width: u8) -> Self {
        Self { role, width }
    }

    pub fn src(width: u8) -> Self {
        Self::new(OperandRole::Src, width)
    }

    pub fn dst(width: u8) -> Self {
        Self::new(OperandRole::Dst, width)
    }

    pub fn src_dst(width: u8) -> Self {
        Self::new(OperandRole::SrcDst, width)
    }

    pub fn imm(width: u8) -> Self {
        Self::new(OperandRole::NonData, width)
    }

    /// Exclusive upper bound on slot numbers this position can encode.
    pub fn limit(&self) -> u32 {
        limit_for_width(self.width)
    }
}

/// One encoding alternative of an instruction: a width and role per operand
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Format {
    pub slots: Vec<FormatSlot>,
}

impl Format {
    pub fn new(slots: Vec<FormatSlot>) -> Self {
        Self { slots }
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, position: usize) -> Option<&FormatSlot> {
        self.slots.get(position)
    }
}

impl FromIterator<FormatSlot> for Format {
    fn from_iter<T: IntoIterator<Item = FormatSlot>>(iter: T) -> Self {
        Format::new(iter.into_iter().collect())
    }
}
