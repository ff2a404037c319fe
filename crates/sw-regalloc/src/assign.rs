use sw_bytecode::{RegisterFile, Slot, VReg};

use crate::error::RegAllocError;

#[derive(Debug, Clone, Copy)]
struct UsedSlot {
    reg: VReg,
    /// Set while the slot is an operand, spill or scratch of the instruction
    /// being legalized.
    busy: bool,
}

/// Per-function slot state: the assignment counter, the slot table and the
/// spill pool.
#[derive(Debug)]
pub struct Allocator {
    limit: u32,
    next: u32,
    used: Vec<Option<UsedSlot>>,
    spills: Vec<VReg>,
    busy: Vec<Slot>,
    spills_created: usize,
}

impl Allocator {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            next: 0,
            used: Vec::new(),
            spills: Vec::new(),
            busy: Vec::new(),
            spills_created: 0,
        }
    }

    /// Rebuilds the slot table of a function whose registers are already
    /// bound, so an assigned stream can be legalized again.
    pub fn adopt(regs: &RegisterFile, limit: u32) -> Result<Self, RegAllocError> {
        let mut allocator = Self::new(limit);
        for (reg, slot) in regs.iter() {
            let Some(slot) = slot else { continue };
            if slot.0 >= limit {
                return Err(RegAllocError::PoolExhausted { limit });
            }
            allocator.record(reg, slot);
            allocator.next = allocator.next.max(slot.0 + 1);
        }
        Ok(allocator)
    }

    /// Binds the next free slot to `reg`.
    pub fn assign(&mut self, regs: &mut RegisterFile, reg: VReg) -> Result<Slot, RegAllocError> {
        if self.next >= self.limit {
            return Err(RegAllocError::PoolExhausted { limit: self.limit });
        }
        let slot = Slot(self.next);
        self.next += 1;
        regs.bind(reg, slot);
        self.record(reg, slot);
        Ok(slot)
    }

    fn record(&mut self, reg: VReg, slot: Slot) {
        if self.used.len() <= slot.index() {
            self.used.resize(slot.index() + 1, None);
        }
        self.used[slot.index()] = Some(UsedSlot { reg, busy: false });
    }

    /// Takes the most recently released spill whose slot is not busy,
    /// creating one when there is none. A pooled spill already serving as
    /// scratch for this instruction is skipped. The returned spill's slot is
    /// marked busy so it is never picked as scratch for the same instruction.
    pub fn acquire_spill(&mut self, regs: &mut RegisterFile) -> Result<VReg, RegAllocError> {
        let pooled = self
            .spills
            .iter()
            .rposition(|reg| !self.is_busy(regs.expect_slot(*reg)));
        let reg = match pooled {
            Some(index) => self.spills.remove(index),
            None => {
                let reg = regs.create();
                self.assign(regs, reg)?;
                self.spills_created += 1;
                reg
            }
        };
        self.mark_busy(regs.expect_slot(reg));
        Ok(reg)
    }

    pub fn release_spill(&mut self, reg: VReg) {
        self.spills.push(reg);
    }

    pub fn mark_busy(&mut self, slot: Slot) {
        let entry = match self.used.get_mut(slot.index()) {
            Some(Some(entry)) => entry,
            _ => panic!("slot {} marked busy but it was never assigned", slot),
        };
        if !entry.busy {
            entry.busy = true;
            self.busy.push(slot);
        }
    }

    pub fn is_busy(&self, slot: Slot) -> bool {
        matches!(self.used.get(slot.index()), Some(Some(entry)) if entry.busy)
    }

    /// Lowest assigned, non-busy slot below `limit`, marked busy on return.
    pub fn find_scratch(&mut self, limit: u32) -> Option<Slot> {
        let end = (limit as usize).min(self.used.len());
        let index = (0..end).find(|&index| self.is_free(index))?;
        let slot = Slot(index as u32);
        self.mark_busy(slot);
        Some(slot)
    }

    /// Lowest start of `count` consecutive free slots that all lie below
    /// `limit`. The whole block is marked busy on return.
    pub fn find_scratch_block(&mut self, count: usize, limit: u32) -> Option<Slot> {
        let end = (limit as usize).min(self.used.len());
        if count == 0 || count > end {
            return None;
        }
        let start = (0..=end - count).find(|&start| (start..start + count).all(|i| self.is_free(i)))?;
        for index in start..start + count {
            self.mark_busy(Slot(index as u32));
        }
        Some(Slot(start as u32))
    }

    fn is_free(&self, index: usize) -> bool {
        matches!(self.used.get(index), Some(Some(entry)) if !entry.busy)
    }

    /// Register occupying `slot`.
    pub fn reg_at(&self, slot: Slot) -> VReg {
        match self.used.get(slot.index()) {
            Some(Some(entry)) => entry.reg,
            _ => panic!("slot {} has no register", slot),
        }
    }

    /// Resets every busy flag set since the last call.
    pub fn clear_busy(&mut self) {
        for slot in self.busy.drain(..) {
            match self.used.get_mut(slot.index()) {
                Some(Some(entry)) if entry.busy => entry.busy = false,
                _ => panic!("busy log names slot {} which is not busy", slot),
            }
        }
    }

    pub fn has_busy(&self) -> bool {
        !self.busy.is_empty()
    }

    /// Slots handed out so far, which is the frame size once the pass ends.
    pub fn total(&self) -> u32 {
        self.next
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn spills_created(&self) -> usize {
        self.spills_created
    }
}
