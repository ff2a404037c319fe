use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Hard cap on frame slots per function.
pub const MAX_REGISTERS: u32 = 65536;

/// Widest register operand encoding the VM has (`v16`).
pub const MAX_WIDTH: u8 = 16;

/// Virtual register handed out by the code generator. It is an index into the
/// owning function's [`RegisterFile`]; the final frame slot lives there.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display("%{_0}")]
pub struct VReg(pub u32);

impl VReg {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Final frame slot number, as it appears in the encoded instruction.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display("v{_0}")]
pub struct Slot(pub u32);

impl Slot {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this slot number can be written into a field `width` bits wide.
    pub fn fits(self, width: u8) -> bool {
        self.0 < limit_for_width(width)
    }
}

/// Exclusive upper bound of slot numbers encodable in `width` bits.
pub fn limit_for_width(width: u8) -> u32 {
    1u32 << width.min(MAX_WIDTH)
}

/// Arena of virtual registers for one function.
///
/// Each register is bound to a slot at most once; binding twice means the
/// allocator handed out the same register twice, which is a bug in the pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFile {
    slots: Vec<Option<Slot>>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn create(&mut self) -> VReg {
        let reg = VReg(self.slots.len() as u32);
        self.slots.push(None);
        reg
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, reg: VReg) -> bool {
        reg.index() < self.slots.len()
    }

    pub fn slot(&self, reg: VReg) -> Option<Slot> {
        self.slots.get(reg.index()).copied().flatten()
    }

    /// Slot of a register the caller knows to be assigned.
    pub fn expect_slot(&self, reg: VReg) -> Slot {
        match self.slot(reg) {
            Some(slot) => slot,
            None => panic!("register {} read before it was assigned a slot", reg),
        }
    }

    pub fn bind(&mut self, reg: VReg, slot: Slot) {
        let entry = &mut self.slots[reg.index()];
        if let Some(previous) = entry {
            panic!(
                "register {} already bound to {}, refusing to rebind to {}",
                reg, previous, slot
            );
        }
        *entry = Some(slot);
    }

    pub fn iter(&self) -> impl Iterator<Item = (VReg, Option<Slot>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (VReg(index as u32), *slot))
    }
}
