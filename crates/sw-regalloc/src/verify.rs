//! Post-pass checks over a legalized function.
//!
//! Nothing here repairs anything: a failure means the pass produced bad
//! output, and it surfaces as [`RegAllocError::Verification`].

use std::collections::HashMap;

use sw_bytecode::{Function, Inst, Opcode, Operand, Slot, VReg};

use crate::error::RegAllocError;
use crate::format::score;
use crate::range::{check_contiguous, RunPlacement};

pub fn verify_function(function: &Function, limit: u32) -> Result<(), RegAllocError> {
    let total = function
        .total_registers
        .ok_or_else(|| RegAllocError::verification("frame size was never recorded"))?;
    verify_slots(function, limit, total)?;
    for (index, inst) in function.insts.iter().enumerate() {
        verify_inst(function, inst).map_err(|message| {
            RegAllocError::verification(format!(
                "instruction {} ({}): {}",
                index, inst.opcode, message
            ))
        })?;
    }
    verify_prologue(function, total)
}

/// Every bound slot is unique, under the cap and inside the frame.
fn verify_slots(function: &Function, limit: u32, total: u32) -> Result<(), RegAllocError> {
    let mut owners: HashMap<Slot, VReg> = HashMap::new();
    for (reg, slot) in function.regs.iter() {
        let Some(slot) = slot else { continue };
        if slot.0 >= limit || slot.0 >= total {
            return Err(RegAllocError::verification(format!(
                "{} was given {} outside a frame of {} (cap {})",
                reg, slot, total, limit
            )));
        }
        if let Some(previous) = owners.insert(slot, reg) {
            return Err(RegAllocError::verification(format!(
                "{} and {} share {}",
                previous, reg, slot
            )));
        }
    }
    Ok(())
}

fn verify_inst(function: &Function, inst: &Inst) -> Result<(), String> {
    if let Some(reg) = inst.registers().find(|reg| function.regs.slot(*reg).is_none()) {
        return Err(format!("{} has no slot", reg));
    }
    let format = inst
        .selected_format()
        .ok_or_else(|| "no format selected".to_string())?;

    if let Some(range) = inst.range {
        let prefix = inst.operands.get(..range.first).unwrap_or(&[]);
        for (position, reg) in prefix
            .iter()
            .enumerate()
            .filter_map(|(position, op)| op.as_reg().map(|reg| (position, reg)))
        {
            let fits = format
                .slot(position)
                .is_some_and(|field| function.regs.expect_slot(reg).fits(field.width));
            if !fits {
                return Err(format!(
                    "operand {} ({}) lies outside the run and does not fit",
                    position, reg
                ));
            }
        }
        return match check_contiguous(inst, &function.regs) {
            Ok(RunPlacement::Legal) => Ok(()),
            Ok(RunPlacement::NeedsAdjust { start, limit }) => {
                Err(format!("run starts at {} but must start below {}", start, limit))
            }
            Err(err) => Err(err.to_string()),
        };
    }

    let overflowing = score(inst, format, &function.regs);
    if overflowing > 0 {
        return Err(format!(
            "{} operand(s) do not fit the selected format",
            overflowing
        ));
    }
    Ok(())
}

/// The stream opens with one move per parameter, in declared order, each
/// reading an entry slot above the body's slots.
fn verify_prologue(function: &Function, total: u32) -> Result<(), RegAllocError> {
    let params = function.parameter_locals();
    if function.insts.len() < params.len() {
        return Err(RegAllocError::verification(format!(
            "{} parameters but only {} instructions",
            params.len(),
            function.insts.len()
        )));
    }
    let body_slots = total.saturating_sub(params.len() as u32);
    for (index, (local, inst)) in params.iter().zip(&function.insts).enumerate() {
        let entry = match inst.operands.as_slice() {
            [Operand::Reg(dst), Operand::Reg(src)] if inst.opcode == Opcode::Mov && dst == local => {
                *src
            }
            _ => {
                return Err(RegAllocError::verification(format!(
                    "instruction {} is not the move into parameter {}",
                    index, local
                )))
            }
        };
        let slot = function.regs.expect_slot(entry);
        if slot.0 < body_slots {
            return Err(RegAllocError::verification(format!(
                "parameter {} is read from {} inside the body frame",
                local, slot
            )));
        }
    }
    Ok(())
}
