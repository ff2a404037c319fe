use sw_bytecode::{Format, Inst, RegisterFile};

/// Number of register operands whose slot does not fit the width `format`
/// declares for their position.
pub fn score(inst: &Inst, format: &Format, regs: &RegisterFile) -> usize {
    inst.operands
        .iter()
        .zip(&format.slots)
        .filter(|(operand, slot)| match operand.as_reg() {
            Some(reg) => !regs.expect_slot(reg).fits(slot.width),
            None => false,
        })
        .count()
}

/// First format with the lowest score, as `(index, score)`. `None` only when
/// the instruction carries no formats at all.
pub fn select_format(inst: &Inst, regs: &RegisterFile) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (index, format) in inst.formats.iter().enumerate() {
        let current = score(inst, format, regs);
        if best.map_or(true, |(_, lowest)| current < lowest) {
            best = Some((index, current));
        }
        if current == 0 {
            break;
        }
    }
    best
}
